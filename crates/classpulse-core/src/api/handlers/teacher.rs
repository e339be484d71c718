//! Teacher endpoints: supervised students, scores, remarks, alerts

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::api::extract::ApiJson;
use crate::api::middleware::CurrentUser;
use crate::db::{ActivityFilter, Recency, SessionFilter};
use crate::error::{Error, Result};
use crate::models::{
    PerformanceAlert, RemarkInput, ScoreInput, ScoreRecord, StudentActivity, StudySession,
    TeacherRemark, User, UserSummary,
};

use super::{load_users, AppState};

const ACTIVITY_LIST_LIMIT: i64 = 50;
const SESSION_LIST_LIMIT: i64 = 20;

/// Load a student only if supervised by `teacher`
async fn assigned_student(state: &AppState, teacher: &User, student_id: Uuid) -> Result<User> {
    state
        .store
        .find_assigned_student(teacher.id, student_id)
        .await?
        .ok_or_else(|| Error::not_found("Assigned student", student_id))
}

/// Students supervised by the caller
pub async fn list_students(
    State(state): State<AppState>,
    Extension(CurrentUser(teacher)): Extension<CurrentUser>,
) -> Result<Json<Vec<User>>> {
    Ok(Json(state.store.list_students_for_teacher(teacher.id).await?))
}

/// A supervised student's recent activities
pub async fn student_activities(
    State(state): State<AppState>,
    Extension(CurrentUser(teacher)): Extension<CurrentUser>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<Vec<StudentActivity>>> {
    let student = assigned_student(&state, &teacher, student_id).await?;

    let activities = state
        .store
        .list_activities(
            student.id,
            ActivityFilter {
                limit: Some(ACTIVITY_LIST_LIMIT),
                ..ActivityFilter::default()
            },
        )
        .await?;

    Ok(Json(activities))
}

/// A supervised student's recent study sessions
pub async fn student_sessions(
    State(state): State<AppState>,
    Extension(CurrentUser(teacher)): Extension<CurrentUser>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<Vec<StudySession>>> {
    let student = assigned_student(&state, &teacher, student_id).await?;

    let sessions = state
        .store
        .list_sessions(
            student.id,
            SessionFilter {
                limit: Some(SESSION_LIST_LIMIT),
                ..SessionFilter::default()
            },
        )
        .await?;

    Ok(Json(sessions))
}

/// All score records of a supervised student, newest first
pub async fn student_records(
    State(state): State<AppState>,
    Extension(CurrentUser(teacher)): Extension<CurrentUser>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<Vec<ScoreRecord>>> {
    let student = assigned_student(&state, &teacher, student_id).await?;
    let records = state
        .store
        .list_scores(student.id, Recency::NewestFirst, None)
        .await?;
    Ok(Json(records))
}

/// Response for a recorded score
#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    /// The stored record
    pub record: ScoreRecord,
    /// Alert raised by this score, if any
    pub alert: Option<PerformanceAlert>,
}

/// Record a score and check it for a performance drop
pub async fn add_score(
    State(state): State<AppState>,
    Extension(CurrentUser(teacher)): Extension<CurrentUser>,
    ApiJson(input): ApiJson<ScoreInput>,
) -> Result<(StatusCode, Json<ScoreResponse>)> {
    assigned_student(&state, &teacher, input.student_id).await?;

    let record = input.into_record(teacher.id)?;
    let record = state.store.insert_score(record).await?;

    info!(
        record_id = %record.id,
        student_id = %record.student_id,
        subject = %record.subject,
        score = record.score,
        "Score recorded"
    );

    let alert = state.evaluator.process(&record).await?;

    Ok((StatusCode::CREATED, Json(ScoreResponse { record, alert })))
}

/// Leave a remark about a supervised student
pub async fn add_remark(
    State(state): State<AppState>,
    Extension(CurrentUser(teacher)): Extension<CurrentUser>,
    ApiJson(input): ApiJson<RemarkInput>,
) -> Result<(StatusCode, Json<TeacherRemark>)> {
    assigned_student(&state, &teacher, input.student_id).await?;

    let remark = input.into_remark(teacher.id)?;
    let remark = state.store.insert_remark(remark).await?;
    Ok((StatusCode::CREATED, Json(remark)))
}

/// An alert with the student it concerns
#[derive(Debug, Serialize)]
pub struct StudentAlert {
    /// The alert, serialized inline
    #[serde(flatten)]
    pub alert: PerformanceAlert,
    /// `None` if the student account no longer exists
    pub student: Option<UserSummary>,
}

/// Unresolved alerts raised from the caller's scores
pub async fn list_alerts(
    State(state): State<AppState>,
    Extension(CurrentUser(teacher)): Extension<CurrentUser>,
) -> Result<Json<Vec<StudentAlert>>> {
    let alerts = state.store.list_open_alerts_for_teacher(teacher.id).await?;
    let students = load_users(state.store.as_ref(), alerts.iter().map(|a| a.student_id)).await?;

    let alerts = alerts
        .into_iter()
        .map(|alert| StudentAlert {
            student: students.get(&alert.student_id).map(UserSummary::from),
            alert,
        })
        .collect();

    Ok(Json(alerts))
}

/// Mark one of the caller's alerts resolved. Repeating is harmless.
pub async fn resolve_alert(
    State(state): State<AppState>,
    Extension(CurrentUser(teacher)): Extension<CurrentUser>,
    Path(alert_id): Path<Uuid>,
) -> Result<Json<PerformanceAlert>> {
    let alert = state
        .store
        .resolve_alert(alert_id, teacher.id)
        .await?
        .ok_or_else(|| Error::not_found("Alert", alert_id))?;

    info!(alert_id = %alert.id, teacher_id = %teacher.id, "Alert resolved");
    Ok(Json(alert))
}
