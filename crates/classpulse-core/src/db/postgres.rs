//! PostgreSQL connection and queries

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::models::{
    NewAlert, PerformanceAlert, ScoreRecord, StudentActivity, StudySession, TeacherRemark, User,
};

use super::{ActivityFilter, Recency, SessionFilter, Store};

/// PostgreSQL connection pool
#[derive(Clone)]
pub struct PostgresPool {
    pool: PgPool,
}

impl PostgresPool {
    /// Create a new PostgreSQL connection pool
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    /// Run migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Get the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// [`Store`] implementation over PostgreSQL
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a store sharing the given pool
    pub fn new(pool: &PostgresPool) -> Self {
        Self {
            pool: pool.pool.clone(),
        }
    }
}

const SCORE_COLUMNS: &str =
    "id, student_id, teacher_id, subject, score, max_score, exam_type, remarks, recorded_at";

const ALERT_COLUMNS: &str = "id, student_id, teacher_id, subject, previous_score, current_score, \
     drop_percentage, message, resolved, created_at";

const SESSION_COLUMNS: &str =
    "id, student_id, start_time, end_time, duration_minutes, subject, notes, is_active";

fn user_from_row(row: &PgRow) -> Result<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        full_name: row.try_get("full_name")?,
        role: role.parse()?,
        assigned_teacher: row.try_get("assigned_teacher")?,
        child_id: row.try_get("child_id")?,
        created_at: row.try_get("created_at")?,
    })
}

fn score_from_row(row: &PgRow) -> Result<ScoreRecord> {
    let exam_type: String = row.try_get("exam_type")?;
    Ok(ScoreRecord {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        teacher_id: row.try_get("teacher_id")?,
        subject: row.try_get("subject")?,
        score: row.try_get("score")?,
        max_score: row.try_get("max_score")?,
        exam_type: exam_type.parse()?,
        remarks: row.try_get("remarks")?,
        recorded_at: row.try_get("recorded_at")?,
    })
}

fn alert_from_row(row: &PgRow) -> Result<PerformanceAlert> {
    Ok(PerformanceAlert {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        teacher_id: row.try_get("teacher_id")?,
        subject: row.try_get("subject")?,
        previous_score: row.try_get("previous_score")?,
        current_score: row.try_get("current_score")?,
        drop_percentage: row.try_get("drop_percentage")?,
        message: row.try_get("message")?,
        resolved: row.try_get("resolved")?,
        created_at: row.try_get("created_at")?,
    })
}

fn remark_from_row(row: &PgRow) -> Result<TeacherRemark> {
    let remark_type: String = row.try_get("remark_type")?;
    Ok(TeacherRemark {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        teacher_id: row.try_get("teacher_id")?,
        subject: row.try_get("subject")?,
        remark: row.try_get("remark")?,
        remark_type: remark_type.parse()?,
        created_at: row.try_get("created_at")?,
    })
}

fn activity_from_row(row: &PgRow) -> Result<StudentActivity> {
    let activity_type: String = row.try_get("activity_type")?;
    Ok(StudentActivity {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        activity_type: activity_type.parse()?,
        subject: row.try_get("subject")?,
        description: row.try_get("description")?,
        duration_minutes: row.try_get("duration_minutes")?,
        logged_at: row.try_get("logged_at")?,
    })
}

fn session_from_row(row: &PgRow) -> Result<StudySession> {
    Ok(StudySession {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        start_time: row.try_get("start_time")?,
        end_time: row.try_get("end_time")?,
        duration_minutes: row.try_get("duration_minutes")?,
        subject: row.try_get("subject")?,
        notes: row.try_get("notes")?,
        is_active: row.try_get("is_active")?,
    })
}

#[async_trait]
impl Store for PostgresStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn upsert_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, full_name, role, assigned_teacher, child_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                username = EXCLUDED.username,
                full_name = EXCLUDED.full_name,
                role = EXCLUDED.role,
                assigned_teacher = EXCLUDED.assigned_teacher,
                child_id = EXCLUDED.child_id
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .bind(user.assigned_teacher)
        .bind(user.child_id)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_students_for_teacher(&self, teacher_id: Uuid) -> Result<Vec<User>> {
        let rows = sqlx::query(
            "SELECT * FROM users WHERE role = 'student' AND assigned_teacher = $1 ORDER BY full_name",
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(user_from_row).collect()
    }

    async fn find_assigned_student(
        &self,
        teacher_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT * FROM users WHERE id = $1 AND role = 'student' AND assigned_teacher = $2",
        )
        .bind(student_id)
        .bind(teacher_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert_score(&self, record: ScoreRecord) -> Result<ScoreRecord> {
        sqlx::query(&format!(
            "INSERT INTO score_records ({SCORE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(record.id)
        .bind(record.student_id)
        .bind(record.teacher_id)
        .bind(&record.subject)
        .bind(record.score)
        .bind(record.max_score)
        .bind(record.exam_type.as_str())
        .bind(&record.remarks)
        .bind(record.recorded_at)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    async fn most_recent_prior_score(
        &self,
        student_id: Uuid,
        subject: &str,
        exclude_id: Uuid,
    ) -> Result<Option<ScoreRecord>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {SCORE_COLUMNS} FROM score_records
            WHERE student_id = $1 AND subject = $2 AND id <> $3
            ORDER BY recorded_at DESC, seq DESC
            LIMIT 1
            "#
        ))
        .bind(student_id)
        .bind(subject)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(score_from_row).transpose()
    }

    async fn list_scores(
        &self,
        student_id: Uuid,
        order: Recency,
        limit: Option<i64>,
    ) -> Result<Vec<ScoreRecord>> {
        let ordering = match order {
            Recency::NewestFirst => "recorded_at DESC, seq DESC",
            Recency::OldestFirst => "recorded_at ASC, seq ASC",
        };

        let rows = sqlx::query(&format!(
            "SELECT {SCORE_COLUMNS} FROM score_records WHERE student_id = $1 ORDER BY {ordering} LIMIT $2"
        ))
        .bind(student_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(score_from_row).collect()
    }

    async fn create_alert(&self, alert: NewAlert) -> Result<PerformanceAlert> {
        let alert = alert.into_alert();

        sqlx::query(&format!(
            "INSERT INTO performance_alerts ({ALERT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
        ))
        .bind(alert.id)
        .bind(alert.student_id)
        .bind(alert.teacher_id)
        .bind(&alert.subject)
        .bind(alert.previous_score)
        .bind(alert.current_score)
        .bind(alert.drop_percentage)
        .bind(&alert.message)
        .bind(alert.resolved)
        .bind(alert.created_at)
        .execute(&self.pool)
        .await?;

        Ok(alert)
    }

    async fn list_open_alerts_for_teacher(&self, teacher_id: Uuid) -> Result<Vec<PerformanceAlert>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ALERT_COLUMNS} FROM performance_alerts
            WHERE teacher_id = $1 AND resolved = false
            ORDER BY created_at DESC
            "#
        ))
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(alert_from_row).collect()
    }

    async fn list_alerts_for_student(&self, student_id: Uuid) -> Result<Vec<PerformanceAlert>> {
        let rows = sqlx::query(&format!(
            "SELECT {ALERT_COLUMNS} FROM performance_alerts WHERE student_id = $1 ORDER BY created_at DESC"
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(alert_from_row).collect()
    }

    async fn resolve_alert(
        &self,
        alert_id: Uuid,
        teacher_id: Uuid,
    ) -> Result<Option<PerformanceAlert>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE performance_alerts SET resolved = true
            WHERE id = $1 AND teacher_id = $2
            RETURNING {ALERT_COLUMNS}
            "#
        ))
        .bind(alert_id)
        .bind(teacher_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(alert_from_row).transpose()
    }

    async fn insert_remark(&self, remark: TeacherRemark) -> Result<TeacherRemark> {
        sqlx::query(
            r#"
            INSERT INTO teacher_remarks (id, student_id, teacher_id, subject, remark, remark_type, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(remark.id)
        .bind(remark.student_id)
        .bind(remark.teacher_id)
        .bind(&remark.subject)
        .bind(&remark.remark)
        .bind(remark.remark_type.as_str())
        .bind(remark.created_at)
        .execute(&self.pool)
        .await?;

        Ok(remark)
    }

    async fn list_remarks(&self, student_id: Uuid, limit: i64) -> Result<Vec<TeacherRemark>> {
        let rows = sqlx::query(
            "SELECT * FROM teacher_remarks WHERE student_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(student_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(remark_from_row).collect()
    }

    async fn insert_activity(&self, activity: StudentActivity) -> Result<StudentActivity> {
        sqlx::query(
            r#"
            INSERT INTO student_activities
                (id, student_id, activity_type, subject, description, duration_minutes, logged_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(activity.id)
        .bind(activity.student_id)
        .bind(activity.activity_type.as_str())
        .bind(&activity.subject)
        .bind(&activity.description)
        .bind(activity.duration_minutes)
        .bind(activity.logged_at)
        .execute(&self.pool)
        .await?;

        Ok(activity)
    }

    async fn list_activities(
        &self,
        student_id: Uuid,
        filter: ActivityFilter,
    ) -> Result<Vec<StudentActivity>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM student_activities
            WHERE student_id = $1
              AND ($2::timestamptz IS NULL OR logged_at >= $2)
              AND ($3::timestamptz IS NULL OR logged_at <= $3)
            ORDER BY logged_at DESC
            LIMIT $4
            "#,
        )
        .bind(student_id)
        .bind(filter.since)
        .bind(filter.until)
        .bind(filter.limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(activity_from_row).collect()
    }

    async fn insert_session(&self, session: StudySession) -> Result<StudySession> {
        sqlx::query(&format!(
            "INSERT INTO study_sessions ({SESSION_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        ))
        .bind(session.id)
        .bind(session.student_id)
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(session.duration_minutes)
        .bind(&session.subject)
        .bind(&session.notes)
        .bind(session.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => Error::conflict(format!(
                "student {} already has an active study session",
                session.student_id
            )),
            other => Error::Database(other),
        })?;

        Ok(session)
    }

    async fn save_session(&self, session: &StudySession) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE study_sessions SET
                end_time = $2,
                duration_minutes = $3,
                subject = $4,
                notes = $5,
                is_active = $6
            WHERE id = $1
            "#,
        )
        .bind(session.id)
        .bind(session.end_time)
        .bind(session.duration_minutes)
        .bind(&session.subject)
        .bind(&session.notes)
        .bind(session.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_active_session(&self, student_id: Uuid) -> Result<Option<StudySession>> {
        let row = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM study_sessions WHERE student_id = $1 AND is_active = true LIMIT 1"
        ))
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(session_from_row).transpose()
    }

    async fn list_sessions(
        &self,
        student_id: Uuid,
        filter: SessionFilter,
    ) -> Result<Vec<StudySession>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {SESSION_COLUMNS} FROM study_sessions
            WHERE student_id = $1
              AND ($2::timestamptz IS NULL OR start_time >= $2)
              AND (NOT $3 OR is_active = false)
            ORDER BY start_time DESC
            LIMIT $4
            "#
        ))
        .bind(student_id)
        .bind(filter.since)
        .bind(filter.completed_only)
        .bind(filter.limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(session_from_row).collect()
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
