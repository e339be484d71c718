//! API routes

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};

use super::handlers::{self, parent, student, teacher, AppState};
use super::middleware::{require_parent, require_student, require_teacher};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let students = Router::new()
        .route(
            "/activity",
            post(student::create_activity).get(student::list_activities),
        )
        .route("/activity/today", get(student::today_activities))
        .route("/session/start", post(student::start_session))
        .route("/session/end", post(student::end_session))
        .route("/session/active", get(student::active_session))
        .route("/sessions", get(student::list_sessions))
        .route("/exercises", get(student::exercises))
        .route_layer(from_fn_with_state(state.clone(), require_student));

    let teachers = Router::new()
        .route("/students", get(teacher::list_students))
        .route("/students/:id/activities", get(teacher::student_activities))
        .route("/students/:id/sessions", get(teacher::student_sessions))
        .route("/students/:id/records", get(teacher::student_records))
        .route("/score", post(teacher::add_score))
        .route("/remark", post(teacher::add_remark))
        .route("/alerts", get(teacher::list_alerts))
        .route("/alerts/:id/resolve", put(teacher::resolve_alert))
        .route_layer(from_fn_with_state(state.clone(), require_teacher));

    let parents = Router::new()
        .route("/status", get(parent::child_status))
        .route("/remarks", get(parent::remarks))
        .route("/alerts", get(parent::alerts))
        .route("/performance", get(parent::performance))
        .route_layer(from_fn_with_state(state.clone(), require_parent));

    Router::new()
        // Health
        .route("/health", get(handlers::health))

        // Role groups
        .nest("/api/students", students)
        .nest("/api/teachers", teachers)
        .nest("/api/parents", parents)

        .with_state(state)
}
