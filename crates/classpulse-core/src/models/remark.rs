//! Teacher remarks

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Tone of a remark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemarkType {
    /// Praise
    Positive,
    /// Plain observation
    #[default]
    Neutral,
    /// Something to follow up on
    Concern,
}

impl RemarkType {
    /// Stable storage representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Concern => "concern",
        }
    }
}

impl fmt::Display for RemarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RemarkType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "positive" => Ok(Self::Positive),
            "neutral" => Ok(Self::Neutral),
            "concern" => Ok(Self::Concern),
            other => Err(Error::validation(format!("unknown remark type: {other}"))),
        }
    }
}

/// A note left by a teacher about a student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherRemark {
    /// Unique identifier
    pub id: Uuid,
    /// Student the remark is about
    pub student_id: Uuid,
    /// Teacher who wrote it
    pub teacher_id: Uuid,
    /// Subject label
    pub subject: String,
    /// Remark text
    pub remark: String,
    /// Tone
    #[serde(rename = "type")]
    pub remark_type: RemarkType,
    /// When it was written
    pub created_at: DateTime<Utc>,
}

/// Input for adding a remark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemarkInput {
    /// Student the remark is about
    pub student_id: Uuid,
    /// Subject label
    pub subject: String,
    /// Remark text
    pub remark: String,
    /// Tone, neutral when omitted
    #[serde(rename = "type", default)]
    pub remark_type: Option<RemarkType>,
}

impl RemarkInput {
    /// Validate and build the remark written by `teacher_id`
    pub fn into_remark(self, teacher_id: Uuid) -> Result<TeacherRemark> {
        super::require_text("subject", &self.subject)?;
        super::require_text("remark", &self.remark)?;

        Ok(TeacherRemark {
            id: Uuid::new_v4(),
            student_id: self.student_id,
            teacher_id,
            subject: self.subject,
            remark: self.remark,
            remark_type: self.remark_type.unwrap_or_default(),
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_defaults_to_neutral() {
        let input: RemarkInput = serde_json::from_value(serde_json::json!({
            "student_id": Uuid::new_v4(),
            "subject": "History",
            "remark": "Good participation"
        }))
        .unwrap();

        let remark = input.into_remark(Uuid::new_v4()).unwrap();
        assert_eq!(remark.remark_type, RemarkType::Neutral);
    }

    #[test]
    fn test_empty_remark_rejected() {
        let input = RemarkInput {
            student_id: Uuid::new_v4(),
            subject: "History".into(),
            remark: String::new(),
            remark_type: Some(RemarkType::Concern),
        };
        assert!(input.into_remark(Uuid::new_v4()).is_err());
    }
}
