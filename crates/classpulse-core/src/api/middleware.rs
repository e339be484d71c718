//! Caller identity and role guards
//!
//! Authentication happens upstream; the gateway forwards the authenticated
//! user's ID in the `X-User-Id` header. The guards load that user and check
//! the role required by the route group.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Role, User};

use super::handlers::AppState;

/// Header carrying the authenticated user ID
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, placed in request extensions by the guards
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

fn user_id_from_headers(headers: &HeaderMap) -> Result<Uuid> {
    let value = headers
        .get(USER_ID_HEADER)
        .ok_or_else(|| Error::Unauthorized("missing X-User-Id header".to_string()))?;

    value
        .to_str()
        .ok()
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .ok_or_else(|| Error::Unauthorized("malformed X-User-Id header".to_string()))
}

async fn authorize(state: &AppState, role: Role, mut req: Request, next: Next) -> Result<Response> {
    let user_id = user_id_from_headers(req.headers())?;

    let user = state
        .store
        .get_user(user_id)
        .await?
        .ok_or_else(|| Error::Unauthorized(format!("unknown user {user_id}")))?;

    if user.role != role {
        debug!(user_id = %user.id, role = %user.role, required = %role, "Role check failed");
        return Err(Error::Forbidden(format!("{role} role required")));
    }

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

/// Allow only students
pub async fn require_student(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response> {
    authorize(&state, Role::Student, req, next).await
}

/// Allow only teachers
pub async fn require_teacher(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response> {
    authorize(&state, Role::Teacher, req, next).await
}

/// Allow only parents
pub async fn require_parent(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response> {
    authorize(&state, Role::Parent, req, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_user_id_header_parsing() {
        let mut headers = HeaderMap::new();
        assert!(matches!(user_id_from_headers(&headers), Err(Error::Unauthorized(_))));

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert!(matches!(user_id_from_headers(&headers), Err(Error::Unauthorized(_))));

        let id = Uuid::new_v4();
        headers.insert(USER_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(user_id_from_headers(&headers).unwrap(), id);
    }
}
