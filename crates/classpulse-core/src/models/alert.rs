//! Performance alert data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A flagged academic decline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceAlert {
    /// Unique identifier
    pub id: Uuid,

    /// Student whose score dropped
    pub student_id: Uuid,

    /// Teacher who recorded the triggering score
    pub teacher_id: Uuid,

    /// Subject of both scores
    pub subject: String,

    /// Score before the drop
    pub previous_score: f64,

    /// Score that triggered the alert
    pub current_score: f64,

    /// Relative decline in percent, two decimals
    pub drop_percentage: f64,

    /// Human-readable message
    pub message: String,

    /// Whether a teacher has handled the alert
    pub resolved: bool,

    /// When the alert was raised
    pub created_at: DateTime<Utc>,
}

/// Creation request produced by the evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAlert {
    /// Student whose score dropped
    pub student_id: Uuid,
    /// Teacher who recorded the new score
    pub teacher_id: Uuid,
    /// Subject of both scores
    pub subject: String,
    /// Latest prior score
    pub previous_score: f64,
    /// The new score
    pub current_score: f64,
    /// Relative decline in percent, two decimals
    pub drop_percentage: f64,
    /// Human-readable summary
    pub message: String,
    /// Always `false` for a fresh alert
    pub resolved: bool,
}

impl NewAlert {
    /// Assign identity and timestamp
    pub fn into_alert(self) -> PerformanceAlert {
        PerformanceAlert {
            id: Uuid::new_v4(),
            student_id: self.student_id,
            teacher_id: self.teacher_id,
            subject: self.subject,
            previous_score: self.previous_score,
            current_score: self.current_score,
            drop_percentage: self.drop_percentage,
            message: self.message,
            resolved: self.resolved,
            created_at: Utc::now(),
        }
    }
}

impl PerformanceAlert {
    /// Mark as resolved. Returns false if it already was.
    pub fn resolve(&mut self) -> bool {
        let changed = !self.resolved;
        self.resolved = true;
        changed
    }
}
