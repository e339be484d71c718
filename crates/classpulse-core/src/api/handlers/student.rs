//! Student endpoints: activities, study sessions, focus exercises

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{Duration, NaiveTime, Utc};
use tracing::info;

use crate::api::extract::ApiJson;
use crate::api::middleware::CurrentUser;
use crate::db::{ActivityFilter, SessionFilter};
use crate::error::{Error, Result};
use crate::models::{
    ActivityInput, EndSessionInput, FocusExercise, StartSessionInput, StudentActivity,
    StudySession, FOCUS_EXERCISES,
};

use super::AppState;

const ACTIVITY_LIST_LIMIT: i64 = 50;
const SESSION_LIST_LIMIT: i64 = 20;
const SESSION_ALREADY_ACTIVE: &str = "You already have an active study session";

/// Log an activity
pub async fn create_activity(
    State(state): State<AppState>,
    Extension(CurrentUser(student)): Extension<CurrentUser>,
    ApiJson(input): ApiJson<ActivityInput>,
) -> Result<(StatusCode, Json<StudentActivity>)> {
    let activity = input.into_activity(student.id)?;
    let activity = state.store.insert_activity(activity).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

/// Activities logged during the current UTC day
pub async fn today_activities(
    State(state): State<AppState>,
    Extension(CurrentUser(student)): Extension<CurrentUser>,
) -> Result<Json<Vec<StudentActivity>>> {
    let start = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
    let end = start + Duration::days(1) - Duration::milliseconds(1);

    let activities = state
        .store
        .list_activities(
            student.id,
            ActivityFilter {
                since: Some(start),
                until: Some(end),
                limit: None,
            },
        )
        .await?;

    Ok(Json(activities))
}

/// Most recent activities
pub async fn list_activities(
    State(state): State<AppState>,
    Extension(CurrentUser(student)): Extension<CurrentUser>,
) -> Result<Json<Vec<StudentActivity>>> {
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

/// Open a study session; only one may be active at a time
pub async fn start_session(
    State(state): State<AppState>,
    Extension(CurrentUser(student)): Extension<CurrentUser>,
    input: Option<ApiJson<StartSessionInput>>,
) -> Result<(StatusCode, Json<StudySession>)> {
    if state.store.find_active_session(student.id).await?.is_some() {
        return Err(Error::bad_request(SESSION_ALREADY_ACTIVE));
    }

    let input = input.map(|ApiJson(input)| input).unwrap_or_default();
    let session = StudySession::start(student.id, input.subject, input.notes);
    // A concurrent start can win between the check above and this insert
    let session = state
        .store
        .insert_session(session)
        .await
        .map_err(|e| match e {
            Error::Conflict(_) => Error::bad_request(SESSION_ALREADY_ACTIVE),
            other => other,
        })?;

    info!(student_id = %student.id, session_id = %session.id, "Study session started");
    Ok((StatusCode::CREATED, Json(session)))
}

/// Close the caller's active session
pub async fn end_session(
    State(state): State<AppState>,
    Extension(CurrentUser(student)): Extension<CurrentUser>,
    ApiJson(input): ApiJson<EndSessionInput>,
) -> Result<Json<StudySession>> {
    let mut session = state
        .store
        .find_active_session(student.id)
        .await?
        .filter(|s| s.id == input.session_id)
        .ok_or_else(|| Error::not_found("Active session", input.session_id))?;

    session.finish(Utc::now(), input.notes);
    state.store.save_session(&session).await?;

    info!(
        student_id = %student.id,
        session_id = %session.id,
        duration_minutes = session.duration_minutes,
        "Study session ended"
    );
    Ok(Json(session))
}

/// The caller's active session, or `null`
pub async fn active_session(
    State(state): State<AppState>,
    Extension(CurrentUser(student)): Extension<CurrentUser>,
) -> Result<Json<Option<StudySession>>> {
    Ok(Json(state.store.find_active_session(student.id).await?))
}

/// Most recent sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(CurrentUser(student)): Extension<CurrentUser>,
) -> Result<Json<Vec<StudySession>>> {
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

/// Static focus exercise suggestions
pub async fn exercises() -> Json<&'static [FocusExercise]> {
    Json(&FOCUS_EXERCISES[..])
}
