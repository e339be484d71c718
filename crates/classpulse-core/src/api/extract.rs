//! Request extractors

use axum::extract::FromRequest;

use crate::error::Error;

/// `axum::Json` whose rejections are reported as [`Error::BadRequest`],
/// so malformed bodies get the same `{"message": ...}` shape as other errors.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);
