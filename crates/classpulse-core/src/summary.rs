//! Aggregations behind the parent dashboard

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{round_to, ExamType, ScoreRecord, StudentActivity, StudySession};

/// Headline numbers for a child
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildStatistics {
    /// Minutes across completed sessions in the window
    pub total_study_minutes: i64,
    /// Activities logged in the window
    pub activities_this_week: usize,
    /// Mean of the recent scores, two decimals
    pub average_score: f64,
    /// Number of recent scores averaged
    pub recent_records_count: usize,
}

impl ChildStatistics {
    /// Compute from already-windowed inputs
    pub fn compute(
        recent_records: &[ScoreRecord],
        recent_activities: &[StudentActivity],
        recent_sessions: &[StudySession],
    ) -> Self {
        let total_study_minutes = recent_sessions
            .iter()
            .map(|s| i64::from(s.duration_minutes.unwrap_or(0)))
            .sum();

        Self {
            total_study_minutes,
            activities_this_week: recent_activities.len(),
            average_score: average_score(recent_records),
            recent_records_count: recent_records.len(),
        }
    }
}

/// Mean score rounded to two decimals, 0 when there are no records
pub fn average_score(records: &[ScoreRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let total: f64 = records.iter().map(|r| r.score).sum();
    round_to(total / records.len() as f64, 2)
}

/// One point on a subject's score history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformancePoint {
    /// Score on a 0-100 scale
    pub score: f64,
    /// When the score was recorded
    pub date: DateTime<Utc>,
    /// Assessment category
    pub exam_type: ExamType,
    /// Teacher who recorded it
    pub teacher_id: Uuid,
    /// That teacher's full name, if the account still exists
    pub teacher_name: Option<String>,
}

/// Score history for one subject
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectPerformance {
    /// Subject label
    pub subject: String,
    /// Scores in the order they were recorded
    pub points: Vec<PerformancePoint>,
}

/// Group records by subject.
///
/// Subjects appear in the order they are first seen; points keep the order
/// of `records`, which callers pass oldest first. `teacher_names` maps
/// teacher IDs to full names.
pub fn performance_by_subject(
    records: &[ScoreRecord],
    teacher_names: &HashMap<Uuid, String>,
) -> Vec<SubjectPerformance> {
    let mut groups: Vec<SubjectPerformance> = Vec::new();

    for record in records {
        let point = PerformancePoint {
            score: record.score,
            date: record.recorded_at,
            exam_type: record.exam_type,
            teacher_id: record.teacher_id,
            teacher_name: teacher_names.get(&record.teacher_id).cloned(),
        };

        match groups.iter_mut().find(|g| g.subject == record.subject) {
            Some(group) => group.points.push(point),
            None => groups.push(SubjectPerformance {
                subject: record.subject.clone(),
                points: vec![point],
            }),
        }
    }

    groups
}
