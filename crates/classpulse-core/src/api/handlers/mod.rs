//! API handlers for the HTTP REST API

pub mod parent;
pub mod student;
pub mod teacher;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::alerting::AlertEvaluator;
use crate::db::Store;
use crate::error::Result;
use crate::models::User;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Backing store
    pub store: Arc<dyn Store>,
    /// Drop check run after each recorded score
    pub evaluator: AlertEvaluator,
}

impl AppState {
    /// Build state around a store, evaluating drops with `evaluator`
    pub fn new(store: Arc<dyn Store>, evaluator: AlertEvaluator) -> Self {
        Self { store, evaluator }
    }
}

/// A record together with the name of the teacher behind it
#[derive(Debug, Clone, Serialize)]
pub struct WithTeacher<T> {
    /// The record itself, serialized inline
    #[serde(flatten)]
    pub item: T,
    /// Teacher's full name, `None` if the account no longer exists
    pub teacher_name: Option<String>,
}

/// Load the users behind `ids`, skipping IDs with no account
pub(crate) async fn load_users(
    store: &dyn Store,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, User>> {
    let ids: BTreeSet<Uuid> = ids.into_iter().collect();
    let mut users = HashMap::with_capacity(ids.len());

    for id in ids {
        if let Some(user) = store.get_user(id).await? {
            users.insert(id, user);
        }
    }

    Ok(users)
}

/// Full names of the users behind `ids`
pub(crate) async fn full_names(
    store: &dyn Store,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, String>> {
    Ok(load_users(store, ids)
        .await?
        .into_iter()
        .map(|(id, user)| (id, user.full_name))
        .collect())
}

/// Attach teacher names to `items`
pub(crate) async fn with_teacher_names<T>(
    store: &dyn Store,
    items: Vec<T>,
    teacher_of: fn(&T) -> Uuid,
) -> Result<Vec<WithTeacher<T>>> {
    let names = full_names(store, items.iter().map(teacher_of)).await?;

    Ok(items
        .into_iter()
        .map(|item| {
            let teacher_name = names.get(&teacher_of(&item)).cloned();
            WithTeacher { item, teacher_name }
        })
        .collect())
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests
    pub status: String,
    /// Crate version
    pub version: String,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
