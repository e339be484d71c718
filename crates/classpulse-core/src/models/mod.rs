//! Data models for ClassPulse

mod activity;
mod alert;
mod remark;
mod score;
mod user;

pub use activity::*;
pub use alert::*;
pub use remark::*;
pub use score::*;
pub use user::*;

/// Round half-up to `places` decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub(crate) fn require_text(field: &str, value: &str) -> crate::error::Result<()> {
    if value.trim().is_empty() {
        return Err(crate::error::Error::validation(format!("{field} is required")));
    }
    Ok(())
}
