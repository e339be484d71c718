//! Student activities, study sessions and focus exercises

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Kind of self-reported activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    /// Homework or coursework
    Assignment,
    /// Reading outside class
    Reading,
    /// Exercises and drills
    Practice,
    /// Longer-running project work
    Project,
    /// Anything else
    Other,
}

impl ActivityType {
    /// Stable storage representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assignment => "assignment",
            Self::Reading => "reading",
            Self::Practice => "practice",
            Self::Project => "project",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "assignment" => Ok(Self::Assignment),
            "reading" => Ok(Self::Reading),
            "practice" => Ok(Self::Practice),
            "project" => Ok(Self::Project),
            "other" => Ok(Self::Other),
            other => Err(Error::validation(format!("unknown activity type: {other}"))),
        }
    }
}

/// A logged activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentActivity {
    /// Unique identifier
    pub id: Uuid,
    /// Student who logged it
    pub student_id: Uuid,
    /// Kind of activity
    pub activity_type: ActivityType,
    /// Subject label
    pub subject: String,
    /// What was done
    pub description: String,
    /// Minutes spent
    pub duration_minutes: i32,
    /// When it was logged
    pub logged_at: DateTime<Utc>,
}

/// Input for logging an activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityInput {
    /// Kind of activity
    pub activity_type: ActivityType,
    /// Subject label
    pub subject: String,
    /// What was done
    pub description: String,
    /// Minutes spent, not negative
    pub duration_minutes: i32,
}

impl ActivityInput {
    /// Validate and build the activity for `student_id`
    pub fn into_activity(self, student_id: Uuid) -> Result<StudentActivity> {
        super::require_text("subject", &self.subject)?;
        super::require_text("description", &self.description)?;
        if self.duration_minutes < 0 {
            return Err(Error::validation("duration_minutes cannot be negative"));
        }

        Ok(StudentActivity {
            id: Uuid::new_v4(),
            student_id,
            activity_type: self.activity_type,
            subject: self.subject,
            description: self.description,
            duration_minutes: self.duration_minutes,
            logged_at: Utc::now(),
        })
    }
}

/// A timed study session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySession {
    /// Unique identifier
    pub id: Uuid,
    /// Student studying
    pub student_id: Uuid,
    /// When the session opened
    pub start_time: DateTime<Utc>,
    /// When it closed, if it has
    pub end_time: Option<DateTime<Utc>>,
    /// Whole minutes, set when the session ends
    pub duration_minutes: Option<i32>,
    /// Optional subject label
    pub subject: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
    /// At most one active session per student
    pub is_active: bool,
}

impl StudySession {
    /// Open a session starting now
    pub fn start(student_id: Uuid, subject: Option<String>, notes: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id,
            start_time: Utc::now(),
            end_time: None,
            duration_minutes: None,
            subject,
            notes,
            is_active: true,
        }
    }

    /// Close the session at `end_time`, replacing notes when given
    pub fn finish(&mut self, end_time: DateTime<Utc>, notes: Option<String>) {
        let elapsed_ms = (end_time - self.start_time).num_milliseconds();
        let minutes = (elapsed_ms as f64 / 60_000.0).round() as i32;

        self.end_time = Some(end_time);
        self.duration_minutes = Some(minutes.max(0));
        self.is_active = false;
        if let Some(notes) = notes.filter(|n| !n.is_empty()) {
            self.notes = Some(notes);
        }
    }
}

/// Request body for starting a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartSessionInput {
    /// Optional subject label
    pub subject: Option<String>,
    /// Optional opening notes
    pub notes: Option<String>,
}

/// Request body for ending a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndSessionInput {
    /// The caller's active session
    pub session_id: Uuid,
    /// Replaces the existing notes when non-empty
    pub notes: Option<String>,
}

/// A suggested focus technique
#[derive(Debug, Clone, Serialize)]
pub struct FocusExercise {
    /// Position in the catalogue
    pub id: u32,
    /// Technique name
    pub title: &'static str,
    /// How to do it
    pub description: &'static str,
    /// Suggested length, human readable
    pub duration: &'static str,
    /// Category label
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// Static catalogue served to students
pub static FOCUS_EXERCISES: [FocusExercise; 5] = [
    FocusExercise {
        id: 1,
        title: "Pomodoro Technique",
        description: "Study for 25 minutes, then take a 5-minute break",
        duration: "25 min",
        kind: "focus",
    },
    FocusExercise {
        id: 2,
        title: "Deep Breathing",
        description: "Take 10 deep breaths to calm your mind before studying",
        duration: "5 min",
        kind: "relaxation",
    },
    FocusExercise {
        id: 3,
        title: "Active Recall",
        description: "After reading, close your book and write down what you remember",
        duration: "15 min",
        kind: "learning",
    },
    FocusExercise {
        id: 4,
        title: "Spaced Repetition",
        description: "Review material at increasing intervals: 1 day, 3 days, 7 days",
        duration: "10 min",
        kind: "review",
    },
    FocusExercise {
        id: 5,
        title: "Mind Mapping",
        description: "Create a visual diagram connecting key concepts",
        duration: "20 min",
        kind: "learning",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_finish_rounds_to_whole_minutes() {
        let mut session = StudySession::start(Uuid::new_v4(), Some("Physics".into()), None);
        let end = session.start_time + Duration::seconds(25 * 60 + 31);

        session.finish(end, Some("chapter 4".into()));

        assert_eq!(session.duration_minutes, Some(26));
        assert!(!session.is_active);
        assert_eq!(session.end_time, Some(end));
        assert_eq!(session.notes.as_deref(), Some("chapter 4"));
    }

    #[test]
    fn test_finish_keeps_notes_without_new_ones() {
        let mut session = StudySession::start(Uuid::new_v4(), None, Some("warmup".into()));
        let end = session.start_time + Duration::minutes(10);
        session.finish(end, None);
        assert_eq!(session.notes.as_deref(), Some("warmup"));
        assert_eq!(session.duration_minutes, Some(10));
    }

    #[test]
    fn test_negative_duration_rejected() {
        let input = ActivityInput {
            activity_type: ActivityType::Reading,
            subject: "English".into(),
            description: "Novel".into(),
            duration_minutes: -5,
        };
        assert!(input.into_activity(Uuid::new_v4()).is_err());
    }
}
