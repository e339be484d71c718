//! Alerting system for ClassPulse
//!
//! Detects sharp score drops for a student in a subject and raises
//! performance alerts for teachers and parents.

mod evaluator;
mod policy;

pub use evaluator::{evaluate, AlertEvaluator};
pub use policy::{
    drop_percentage, format_alert_message, raw_drop_percentage, DropPolicy, DEFAULT_DROP_THRESHOLD,
};
