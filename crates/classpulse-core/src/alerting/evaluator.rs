//! Performance drop evaluation

use std::sync::Arc;

use tracing::{debug, info};

use crate::db::Store;
use crate::error::Result;
use crate::models::{NewAlert, PerformanceAlert, ScoreRecord};

use crate::models::round_to;

use super::policy::{format_alert_message, raw_drop_percentage, DropPolicy};

/// Decide whether `new_score` warrants an alert, given the latest prior score
/// for the same student and subject.
pub fn evaluate(
    new_score: &ScoreRecord,
    prior: Option<&ScoreRecord>,
    policy: &DropPolicy,
) -> Option<NewAlert> {
    let prior = prior?;
    let previous = prior.score;
    let current = new_score.score;

    if !policy.is_drop(previous, current) {
        return None;
    }

    let raw_drop = raw_drop_percentage(previous, current);

    Some(NewAlert {
        student_id: new_score.student_id,
        teacher_id: new_score.teacher_id,
        subject: new_score.subject.clone(),
        previous_score: previous,
        current_score: current,
        drop_percentage: round_to(raw_drop, 2),
        message: format_alert_message(&new_score.subject, raw_drop, previous, current),
        resolved: false,
    })
}

/// Runs the drop check for each newly recorded score.
///
/// Holds no state between calls. Concurrent submissions for the same
/// student and subject are not coordinated.
#[derive(Clone)]
pub struct AlertEvaluator {
    store: Arc<dyn Store>,
    policy: DropPolicy,
}

impl AlertEvaluator {
    /// Create a new alert evaluator
    pub fn new(store: Arc<dyn Store>, policy: DropPolicy) -> Self {
        Self { store, policy }
    }

    /// The policy in effect
    pub fn policy(&self) -> &DropPolicy {
        &self.policy
    }

    /// Look up the prior score, decide, and persist an alert if warranted.
    ///
    /// Store failures are returned unchanged.
    pub async fn process(&self, record: &ScoreRecord) -> Result<Option<PerformanceAlert>> {
        let prior = self
            .store
            .most_recent_prior_score(record.student_id, &record.subject, record.id)
            .await?;

        let Some(request) = evaluate(record, prior.as_ref(), &self.policy) else {
            debug!(
                student_id = %record.student_id,
                subject = %record.subject,
                has_prior = prior.is_some(),
                "No performance drop"
            );
            return Ok(None);
        };

        let alert = self.store.create_alert(request).await?;

        info!(
            alert_id = %alert.id,
            student_id = %alert.student_id,
            subject = %alert.subject,
            drop_percentage = alert.drop_percentage,
            "Performance alert raised"
        );

        Ok(Some(alert))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::ExamType;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn record(student_id: Uuid, subject: &str, score: f64, minutes_ago: i64) -> ScoreRecord {
        ScoreRecord {
            id: Uuid::new_v4(),
            student_id,
            teacher_id: Uuid::new_v4(),
            subject: subject.to_string(),
            score,
            max_score: 100.0,
            exam_type: ExamType::Quiz,
            remarks: None,
            recorded_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn test_evaluate_without_prior() {
        let new = record(Uuid::new_v4(), "Math", 10.0, 0);
        assert!(evaluate(&new, None, &DropPolicy::default()).is_none());
    }

    #[test]
    fn test_evaluate_builds_request() {
        let student = Uuid::new_v4();
        let prior = record(student, "Math", 50.0, 10);
        let new = record(student, "Math", 39.0, 0);

        let alert = evaluate(&new, Some(&prior), &DropPolicy::default()).unwrap();

        assert_eq!(alert.student_id, student);
        assert_eq!(alert.teacher_id, new.teacher_id);
        assert!((alert.drop_percentage - 22.0).abs() < 1e-9);
        assert!(!alert.resolved);
        assert_eq!(
            alert.message,
            "Academic performance dropped by 22.0% in Math. Previous: 50, Current: 39"
        );
    }

    #[test]
    fn test_evaluate_message_uses_unrounded_drop() {
        let student = Uuid::new_v4();
        let prior = record(student, "Math", 22.0, 10);
        let new = record(student, "Math", 10.0, 0);

        let alert = evaluate(&new, Some(&prior), &DropPolicy::default()).unwrap();

        assert!((alert.drop_percentage - 54.55).abs() < 1e-9);
        assert_eq!(
            alert.message,
            "Academic performance dropped by 54.5% in Math. Previous: 22, Current: 10"
        );
    }

    #[test]
    fn test_evaluate_boundary() {
        let student = Uuid::new_v4();
        let prior = record(student, "Math", 100.0, 10);

        let at_threshold = record(student, "Math", 80.0, 0);
        let alert = evaluate(&at_threshold, Some(&prior), &DropPolicy::default()).unwrap();
        assert!((alert.drop_percentage - 20.0).abs() < 1e-9);

        let above = record(student, "Math", 81.0, 0);
        assert!(evaluate(&above, Some(&prior), &DropPolicy::default()).is_none());
    }

    #[test]
    fn test_evaluate_zero_previous() {
        let student = Uuid::new_v4();
        let prior = record(student, "Math", 0.0, 10);
        let new = record(student, "Math", 0.0, 0);
        assert!(evaluate(&new, Some(&prior), &DropPolicy::default()).is_none());
    }

    #[tokio::test]
    async fn test_process_uses_latest_prior_only() {
        let store = Arc::new(MemoryStore::new());
        let student = Uuid::new_v4();

        // Older history is irrelevant: 90 -> 70 -> 60 compares 60 against 70.
        store.insert_score(record(student, "Math", 90.0, 30)).await.unwrap();
        store.insert_score(record(student, "Math", 70.0, 20)).await.unwrap();
        store.insert_score(record(student, "Science", 100.0, 5)).await.unwrap();
        let new = store.insert_score(record(student, "Math", 60.0, 0)).await.unwrap();

        let evaluator = AlertEvaluator::new(store.clone(), DropPolicy::default());
        assert!(evaluator.process(&new).await.unwrap().is_none());
        assert!(store.list_alerts_for_student(student).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_process_persists_alert() {
        let store = Arc::new(MemoryStore::new());
        let student = Uuid::new_v4();

        store.insert_score(record(student, "Math", 100.0, 10)).await.unwrap();
        let new = store.insert_score(record(student, "Math", 80.0, 0)).await.unwrap();

        let evaluator = AlertEvaluator::new(store.clone(), DropPolicy::default());
        let alert = evaluator.process(&new).await.unwrap().unwrap();

        let stored = store.list_alerts_for_student(student).await.unwrap();
        assert_eq!(stored, vec![alert]);
    }

    #[tokio::test]
    async fn test_process_first_score_never_alerts() {
        let store = Arc::new(MemoryStore::new());
        let new = store
            .insert_score(record(Uuid::new_v4(), "Math", 5.0, 0))
            .await
            .unwrap();

        let evaluator = AlertEvaluator::new(store, DropPolicy::default());
        assert!(evaluator.process(&new).await.unwrap().is_none());
    }
}
