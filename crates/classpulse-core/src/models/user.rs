//! Users and roles

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// Role a user acts under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Logs activities and study sessions
    Student,
    /// Records scores and remarks, resolves alerts
    Teacher,
    /// Read-only view of a linked child
    Parent,
}

impl Role {
    /// Stable storage representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Parent => "parent",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            "parent" => Ok(Self::Parent),
            other => Err(Error::validation(format!("unknown role: {other}"))),
        }
    }
}

/// A user account. Credentials are handled upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,

    /// Login name
    pub username: String,

    /// Display name
    pub full_name: String,

    /// Role
    pub role: Role,

    /// Supervising teacher (students only)
    pub assigned_teacher: Option<Uuid>,

    /// Linked child (parents only)
    pub child_id: Option<Uuid>,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a user with no links
    pub fn new(username: impl Into<String>, full_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            full_name: full_name.into(),
            role,
            assigned_teacher: None,
            child_id: None,
            created_at: Utc::now(),
        }
    }

    /// Assign a supervising teacher
    pub fn with_teacher(mut self, teacher_id: Uuid) -> Self {
        self.assigned_teacher = Some(teacher_id);
        self
    }

    /// Link a child account
    pub fn with_child(mut self, child_id: Uuid) -> Self {
        self.child_id = Some(child_id);
        self
    }
}

/// Public view of a student, as shown to parents
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    /// User ID
    pub id: Uuid,
    /// Login name
    pub username: String,
    /// Display name
    pub full_name: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip_and_unknown() {
        for role in [Role::Student, Role::Teacher, Role::Parent] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("admin".parse::<Role>().is_err());
    }
}
