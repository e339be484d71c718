//! Database layer for ClassPulse
//!
//! Handlers and the alert evaluator talk to storage through the [`Store`]
//! trait. Two backends are provided: PostgreSQL and an in-process store.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{PostgresPool, PostgresStore};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::{Config, DatabaseBackend};
use crate::error::Result;
use crate::models::{
    NewAlert, PerformanceAlert, ScoreRecord, StudentActivity, StudySession, TeacherRemark, User,
};

/// Filter for session listings
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionFilter {
    /// Only sessions started at or after this instant
    pub since: Option<DateTime<Utc>>,
    /// Only sessions that have ended
    pub completed_only: bool,
    /// Maximum number of rows
    pub limit: Option<i64>,
}

/// Filter for activity listings
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityFilter {
    /// Only activities logged at or after this instant
    pub since: Option<DateTime<Utc>>,
    /// Only activities logged at or before this instant
    pub until: Option<DateTime<Utc>>,
    /// Maximum number of rows
    pub limit: Option<i64>,
}

/// Sort direction for score listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recency {
    /// Latest `recorded_at` first
    NewestFirst,
    /// Earliest `recorded_at` first
    OldestFirst,
}

/// Persistence collaborator for all ClassPulse documents
#[async_trait]
pub trait Store: Send + Sync {
    // --- Users ---

    /// Get a user by ID
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Insert or replace a user
    async fn upsert_user(&self, user: &User) -> Result<()>;

    /// Students supervised by a teacher
    async fn list_students_for_teacher(&self, teacher_id: Uuid) -> Result<Vec<User>>;

    /// The student with `student_id`, if supervised by `teacher_id`
    async fn find_assigned_student(
        &self,
        teacher_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<User>>;

    // --- Scores ---

    /// Store a new score record
    async fn insert_score(&self, record: ScoreRecord) -> Result<ScoreRecord>;

    /// Latest score for a student and subject, ignoring `exclude_id`
    async fn most_recent_prior_score(
        &self,
        student_id: Uuid,
        subject: &str,
        exclude_id: Uuid,
    ) -> Result<Option<ScoreRecord>>;

    /// Scores for a student in the given order
    async fn list_scores(
        &self,
        student_id: Uuid,
        order: Recency,
        limit: Option<i64>,
    ) -> Result<Vec<ScoreRecord>>;

    // --- Alerts ---

    /// Persist an alert, assigning its ID and timestamp
    async fn create_alert(&self, alert: NewAlert) -> Result<PerformanceAlert>;

    /// Unresolved alerts raised by a teacher, newest first
    async fn list_open_alerts_for_teacher(&self, teacher_id: Uuid) -> Result<Vec<PerformanceAlert>>;

    /// All alerts for a student, newest first
    async fn list_alerts_for_student(&self, student_id: Uuid) -> Result<Vec<PerformanceAlert>>;

    /// Mark an alert owned by `teacher_id` resolved. `None` if no such alert.
    async fn resolve_alert(
        &self,
        alert_id: Uuid,
        teacher_id: Uuid,
    ) -> Result<Option<PerformanceAlert>>;

    // --- Remarks ---

    /// Store a remark
    async fn insert_remark(&self, remark: TeacherRemark) -> Result<TeacherRemark>;

    /// Remarks about a student, newest first
    async fn list_remarks(&self, student_id: Uuid, limit: i64) -> Result<Vec<TeacherRemark>>;

    // --- Activities ---

    /// Store an activity
    async fn insert_activity(&self, activity: StudentActivity) -> Result<StudentActivity>;

    /// Activities for a student, newest first
    async fn list_activities(
        &self,
        student_id: Uuid,
        filter: ActivityFilter,
    ) -> Result<Vec<StudentActivity>>;

    // --- Study sessions ---

    /// Store a new session
    async fn insert_session(&self, session: StudySession) -> Result<StudySession>;

    /// Overwrite an existing session
    async fn save_session(&self, session: &StudySession) -> Result<()>;

    /// The student's active session, if any
    async fn find_active_session(&self, student_id: Uuid) -> Result<Option<StudySession>>;

    /// Sessions for a student, newest first
    async fn list_sessions(
        &self,
        student_id: Uuid,
        filter: SessionFilter,
    ) -> Result<Vec<StudySession>>;

    /// Check the store is reachable
    async fn health_check(&self) -> Result<()>;
}

/// Open the store selected by configuration
pub async fn connect(config: &Config) -> Result<Arc<dyn Store>> {
    match config.database.backend {
        DatabaseBackend::Postgres => {
            let pool = PostgresPool::new(&config.database).await?;
            Ok(Arc::new(PostgresStore::new(&pool)))
        }
        DatabaseBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
