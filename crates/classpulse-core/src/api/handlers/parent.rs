//! Parent endpoints: read-only view of the linked child

use axum::{extract::State, Extension, Json};
use chrono::{Duration, Utc};
use serde::Serialize;

use crate::api::middleware::CurrentUser;
use crate::db::{ActivityFilter, Recency, SessionFilter};
use crate::error::{Error, Result};
use crate::models::{
    PerformanceAlert, ScoreRecord, StudentActivity, StudySession, TeacherRemark, User,
    UserSummary,
};
use crate::summary::{performance_by_subject, ChildStatistics, SubjectPerformance};

use super::{full_names, with_teacher_names, AppState, WithTeacher};

const RECENT_RECORDS_LIMIT: i64 = 10;
const REMARKS_LIMIT: i64 = 20;
const STATUS_WINDOW_DAYS: i64 = 7;

async fn linked_child(state: &AppState, parent: &User) -> Result<User> {
    let child_id = parent
        .child_id
        .ok_or_else(|| Error::bad_request("No child assigned to this parent account"))?;

    state
        .store
        .get_user(child_id)
        .await?
        .ok_or_else(|| Error::not_found("Child", child_id))
}

/// Dashboard payload for a parent
#[derive(Debug, Serialize)]
pub struct ChildStatusResponse {
    /// The linked child
    pub child: UserSummary,
    /// Headline numbers over the window
    pub statistics: ChildStatistics,
    /// Latest scores, newest first
    pub recent_records: Vec<WithTeacher<ScoreRecord>>,
    /// Activities logged in the window
    pub recent_activities: Vec<StudentActivity>,
    /// Sessions completed in the window
    pub recent_sessions: Vec<StudySession>,
}

/// Recent scores, activities and completed sessions of the child
pub async fn child_status(
    State(state): State<AppState>,
    Extension(CurrentUser(parent)): Extension<CurrentUser>,
) -> Result<Json<ChildStatusResponse>> {
    let child = linked_child(&state, &parent).await?;
    let week_ago = Utc::now() - Duration::days(STATUS_WINDOW_DAYS);

    let recent_records = state
        .store
        .list_scores(child.id, Recency::NewestFirst, Some(RECENT_RECORDS_LIMIT))
        .await?;

    let recent_activities = state
        .store
        .list_activities(
            child.id,
            ActivityFilter {
                since: Some(week_ago),
                ..ActivityFilter::default()
            },
        )
        .await?;

    let recent_sessions = state
        .store
        .list_sessions(
            child.id,
            SessionFilter {
                since: Some(week_ago),
                completed_only: true,
                limit: None,
            },
        )
        .await?;

    let statistics = ChildStatistics::compute(&recent_records, &recent_activities, &recent_sessions);
    let recent_records =
        with_teacher_names(state.store.as_ref(), recent_records, |r| r.teacher_id).await?;

    Ok(Json(ChildStatusResponse {
        child: UserSummary::from(&child),
        statistics,
        recent_records,
        recent_activities,
        recent_sessions,
    }))
}

/// Latest teacher remarks about the child
pub async fn remarks(
    State(state): State<AppState>,
    Extension(CurrentUser(parent)): Extension<CurrentUser>,
) -> Result<Json<Vec<WithTeacher<TeacherRemark>>>> {
    let child_id = parent
        .child_id
        .ok_or_else(|| Error::bad_request("No child assigned to this parent account"))?;

    let remarks = state.store.list_remarks(child_id, REMARKS_LIMIT).await?;
    let remarks = with_teacher_names(state.store.as_ref(), remarks, |r| r.teacher_id).await?;
    Ok(Json(remarks))
}

/// Every alert raised for the child, resolved or not
pub async fn alerts(
    State(state): State<AppState>,
    Extension(CurrentUser(parent)): Extension<CurrentUser>,
) -> Result<Json<Vec<WithTeacher<PerformanceAlert>>>> {
    let child_id = parent
        .child_id
        .ok_or_else(|| Error::bad_request("No child assigned to this parent account"))?;

    let alerts = state.store.list_alerts_for_student(child_id).await?;
    let alerts = with_teacher_names(state.store.as_ref(), alerts, |a| a.teacher_id).await?;
    Ok(Json(alerts))
}

/// Score history grouped by subject
#[derive(Debug, Serialize)]
pub struct PerformanceResponse {
    /// Points per subject, subjects in first-seen order
    pub performance_by_subject: Vec<SubjectPerformance>,
    /// Every record, oldest first
    pub all_records: Vec<WithTeacher<ScoreRecord>>,
}

/// The child's full score history, oldest first
pub async fn performance(
    State(state): State<AppState>,
    Extension(CurrentUser(parent)): Extension<CurrentUser>,
) -> Result<Json<PerformanceResponse>> {
    let child_id = parent
        .child_id
        .ok_or_else(|| Error::bad_request("No child assigned to this parent account"))?;

    let all_records = state
        .store
        .list_scores(child_id, Recency::OldestFirst, None)
        .await?;

    let teacher_names = full_names(state.store.as_ref(), all_records.iter().map(|r| r.teacher_id)).await?;
    let performance_by_subject = performance_by_subject(&all_records, &teacher_names);

    let all_records = all_records
        .into_iter()
        .map(|record| WithTeacher {
            teacher_name: teacher_names.get(&record.teacher_id).cloned(),
            item: record,
        })
        .collect();

    Ok(Json(PerformanceResponse {
        performance_by_subject,
        all_records,
    }))
}
