//! Score drop policy

use serde::{Deserialize, Serialize};

use crate::config::AlertingConfig;
use crate::models::round_to;

/// A score at or below `previous * DEFAULT_DROP_THRESHOLD` is a drop (20% or more)
pub const DEFAULT_DROP_THRESHOLD: f64 = 0.8;

/// Decides whether a score change counts as a performance drop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropPolicy {
    /// Multiplier applied to the previous score
    pub threshold: f64,
}

impl Default for DropPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_DROP_THRESHOLD,
        }
    }
}

impl From<&AlertingConfig> for DropPolicy {
    fn from(config: &AlertingConfig) -> Self {
        Self {
            threshold: config.drop_threshold,
        }
    }
}

impl DropPolicy {
    /// Create a policy with a custom threshold
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Check if moving from `previous` to `current` is a drop.
    ///
    /// A non-positive previous score never counts, since the relative
    /// decline is undefined.
    pub fn is_drop(&self, previous: f64, current: f64) -> bool {
        if previous <= 0.0 {
            return false;
        }
        current <= previous * self.threshold
    }
}

/// Relative decline in percent, unrounded
pub fn raw_drop_percentage(previous: f64, current: f64) -> f64 {
    (previous - current) / previous * 100.0
}

/// Relative decline in percent, rounded half-up to two decimals
pub fn drop_percentage(previous: f64, current: f64) -> f64 {
    round_to(raw_drop_percentage(previous, current), 2)
}

/// Alert text shown to teachers and parents.
///
/// `raw_drop` must be the unrounded decline; it is rounded to one decimal
/// here and nowhere else.
pub fn format_alert_message(subject: &str, raw_drop: f64, previous: f64, current: f64) -> String {
    format!(
        "Academic performance dropped by {:.1}% in {}. Previous: {}, Current: {}",
        round_to(raw_drop, 1),
        subject,
        previous,
        current
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(100.0, 80.0, true)]
    #[case(100.0, 81.0, false)]
    #[case(50.0, 39.0, true)]
    #[case(75.0, 75.0, false)]
    #[case(60.0, 90.0, false)]
    #[case(0.0, 0.0, false)]
    #[case(0.0, 50.0, false)]
    fn test_is_drop(#[case] previous: f64, #[case] current: f64, #[case] expected: bool) {
        assert_eq!(DropPolicy::default().is_drop(previous, current), expected);
    }

    #[test]
    fn test_custom_threshold() {
        let strict = DropPolicy::new(0.9);
        assert!(strict.is_drop(100.0, 90.0));
        assert!(!DropPolicy::default().is_drop(100.0, 90.0));
    }

    #[test]
    fn test_drop_percentage_rounding() {
        assert!((drop_percentage(100.0, 80.0) - 20.0).abs() < 1e-9);
        assert!((drop_percentage(50.0, 39.0) - 22.0).abs() < 1e-9);
        assert!((drop_percentage(90.0, 60.0) - 33.33).abs() < 1e-9);
        assert!((drop_percentage(30.0, 20.0) - 33.33).abs() < 1e-9);
    }

    #[test]
    fn test_message_format() {
        assert_eq!(
            format_alert_message("Math", 22.0, 50.0, 39.0),
            "Academic performance dropped by 22.0% in Math. Previous: 50, Current: 39"
        );
        assert_eq!(
            format_alert_message("Biology", raw_drop_percentage(90.0, 60.0), 90.0, 60.0),
            "Academic performance dropped by 33.3% in Biology. Previous: 90, Current: 60"
        );
        assert_eq!(
            format_alert_message("Chem", 25.5, 88.5, 65.93),
            "Academic performance dropped by 25.5% in Chem. Previous: 88.5, Current: 65.93"
        );
    }

    #[rstest]
    #[case(22.0, 10.0, 54.55, "54.5%")]
    #[case(11.0, 5.0, 54.55, "54.5%")]
    #[case(66.0, 30.0, 54.55, "54.5%")]
    #[case(33.0, 15.0, 54.55, "54.5%")]
    fn test_message_rounds_raw_drop_once(
        #[case] previous: f64,
        #[case] current: f64,
        #[case] stored: f64,
        #[case] shown: &str,
    ) {
        assert!((drop_percentage(previous, current) - stored).abs() < 1e-9);

        let message = format_alert_message("Math", raw_drop_percentage(previous, current), previous, current);
        assert!(message.contains(shown), "{message}");
    }

    proptest! {
        #[test]
        fn prop_trigger_matches_threshold(previous in 0.01f64..=100.0, current in 0.0f64..=100.0) {
            let policy = DropPolicy::default();
            prop_assert_eq!(policy.is_drop(previous, current), current <= previous * 0.8);
        }

        #[test]
        fn prop_zero_previous_never_triggers(current in 0.0f64..=100.0) {
            prop_assert!(!DropPolicy::default().is_drop(0.0, current));
        }

        #[test]
        fn prop_equal_scores_never_trigger(score in 0.0f64..=100.0) {
            prop_assert!(!DropPolicy::default().is_drop(score, score));
        }
    }
}
