//! Score record data model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Default maximum score when none is supplied
pub const DEFAULT_MAX_SCORE: f64 = 100.0;

/// Category of a graded assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamType {
    /// Short in-class test
    Quiz,
    /// Mid-term exam
    Midterm,
    /// End-of-term exam
    Final,
    /// Graded homework
    Assignment,
    /// Graded project
    Project,
}

impl ExamType {
    /// Stable storage representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::Midterm => "midterm",
            Self::Final => "final",
            Self::Assignment => "assignment",
            Self::Project => "project",
        }
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ExamType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "quiz" => Ok(Self::Quiz),
            "midterm" => Ok(Self::Midterm),
            "final" => Ok(Self::Final),
            "assignment" => Ok(Self::Assignment),
            "project" => Ok(Self::Project),
            other => Err(Error::validation(format!("unknown exam type: {other}"))),
        }
    }
}

/// One graded assessment. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Unique identifier
    pub id: Uuid,

    /// Student the score belongs to
    pub student_id: Uuid,

    /// Teacher who recorded it
    pub teacher_id: Uuid,

    /// Free-text subject label
    pub subject: String,

    /// Score on a 0-100 scale
    pub score: f64,

    /// Maximum score label; not used for normalization
    pub max_score: f64,

    /// Assessment category
    pub exam_type: ExamType,

    /// Optional teacher note
    pub remarks: Option<String>,

    /// When the score was recorded
    pub recorded_at: DateTime<Utc>,
}

/// Input for recording a new score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreInput {
    /// Student being graded
    pub student_id: Uuid,
    /// Subject label, not blank
    pub subject: String,
    /// Score between 0 and 100
    pub score: f64,
    /// Positive label, 100 when omitted
    pub max_score: Option<f64>,
    /// Assessment category
    pub exam_type: ExamType,
    /// Optional teacher note
    pub remarks: Option<String>,
}

impl ScoreInput {
    /// Check field constraints
    pub fn validate(&self) -> Result<()> {
        super::require_text("subject", &self.subject)?;

        if !(0.0..=100.0).contains(&self.score) {
            return Err(Error::validation(format!(
                "score must be between 0 and 100, got {}",
                self.score
            )));
        }

        if let Some(max) = self.max_score {
            if max.is_nan() || max <= 0.0 {
                return Err(Error::validation("max_score must be positive"));
            }
        }

        Ok(())
    }

    /// Build the record this input describes, graded by `teacher_id`
    pub fn into_record(self, teacher_id: Uuid) -> Result<ScoreRecord> {
        self.validate()?;

        Ok(ScoreRecord {
            id: Uuid::new_v4(),
            student_id: self.student_id,
            teacher_id,
            subject: self.subject.trim().to_string(),
            score: self.score,
            max_score: self.max_score.unwrap_or(DEFAULT_MAX_SCORE),
            exam_type: self.exam_type,
            remarks: self.remarks,
            recorded_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn input(score: f64) -> ScoreInput {
        ScoreInput {
            student_id: Uuid::new_v4(),
            subject: "Math".to_string(),
            score,
            max_score: None,
            exam_type: ExamType::Quiz,
            remarks: None,
        }
    }

    #[rstest]
    #[case(0.0, true)]
    #[case(100.0, true)]
    #[case(57.5, true)]
    #[case(-1.0, false)]
    #[case(100.5, false)]
    #[case(f64::NAN, false)]
    fn test_score_range(#[case] score: f64, #[case] ok: bool) {
        assert_eq!(input(score).validate().is_ok(), ok);
    }

    #[test]
    fn test_blank_subject_rejected() {
        let mut bad = input(50.0);
        bad.subject = "  ".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_into_record_defaults_max_score() {
        let teacher = Uuid::new_v4();
        let record = input(70.0).into_record(teacher).unwrap();
        assert_eq!(record.teacher_id, teacher);
        assert!((record.max_score - DEFAULT_MAX_SCORE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_exam_type_wire_names() {
        let parsed: ExamType = serde_json::from_str("\"midterm\"").unwrap();
        assert_eq!(parsed, ExamType::Midterm);
        assert!("essay".parse::<ExamType>().is_err());
    }
}
