//! Shared fixtures for router tests

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use classpulse::alerting::{AlertEvaluator, DropPolicy};
use classpulse::api::{create_router, AppState, USER_ID_HEADER};
use classpulse::db::{ActivityFilter, MemoryStore, Recency, SessionFilter, Store};
use classpulse::models::{
    NewAlert, PerformanceAlert, Role, ScoreRecord, StudentActivity, StudySession, TeacherRemark,
    User,
};
use classpulse::{Error, Result};

/// Failures to inject into a [`FaultyStore`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
    /// `most_recent_prior_score` fails
    pub prior_lookup: bool,
    /// `create_alert` fails
    pub create_alert: bool,
    /// `find_active_session` never sees an active session, as when a
    /// concurrent start slips in between the check and the insert
    pub stale_active_session: bool,
}

/// Memory store that fails selected operations
pub struct FaultyStore {
    inner: MemoryStore,
    faults: Faults,
}

impl FaultyStore {
    pub fn new(faults: Faults) -> Self {
        Self {
            inner: MemoryStore::new(),
            faults,
        }
    }
}

#[async_trait]
impl Store for FaultyStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        self.inner.get_user(id).await
    }

    async fn upsert_user(&self, user: &User) -> Result<()> {
        self.inner.upsert_user(user).await
    }

    async fn list_students_for_teacher(&self, teacher_id: Uuid) -> Result<Vec<User>> {
        self.inner.list_students_for_teacher(teacher_id).await
    }

    async fn find_assigned_student(
        &self,
        teacher_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<User>> {
        self.inner.find_assigned_student(teacher_id, student_id).await
    }

    async fn insert_score(&self, record: ScoreRecord) -> Result<ScoreRecord> {
        self.inner.insert_score(record).await
    }

    async fn most_recent_prior_score(
        &self,
        student_id: Uuid,
        subject: &str,
        exclude_id: Uuid,
    ) -> Result<Option<ScoreRecord>> {
        if self.faults.prior_lookup {
            return Err(Error::internal("score lookup unavailable"));
        }
        self.inner
            .most_recent_prior_score(student_id, subject, exclude_id)
            .await
    }

    async fn list_scores(
        &self,
        student_id: Uuid,
        order: Recency,
        limit: Option<i64>,
    ) -> Result<Vec<ScoreRecord>> {
        self.inner.list_scores(student_id, order, limit).await
    }

    async fn create_alert(&self, alert: NewAlert) -> Result<PerformanceAlert> {
        if self.faults.create_alert {
            return Err(Error::internal("alert write rejected"));
        }
        self.inner.create_alert(alert).await
    }

    async fn list_open_alerts_for_teacher(&self, teacher_id: Uuid) -> Result<Vec<PerformanceAlert>> {
        self.inner.list_open_alerts_for_teacher(teacher_id).await
    }

    async fn list_alerts_for_student(&self, student_id: Uuid) -> Result<Vec<PerformanceAlert>> {
        self.inner.list_alerts_for_student(student_id).await
    }

    async fn resolve_alert(
        &self,
        alert_id: Uuid,
        teacher_id: Uuid,
    ) -> Result<Option<PerformanceAlert>> {
        self.inner.resolve_alert(alert_id, teacher_id).await
    }

    async fn insert_remark(&self, remark: TeacherRemark) -> Result<TeacherRemark> {
        self.inner.insert_remark(remark).await
    }

    async fn list_remarks(&self, student_id: Uuid, limit: i64) -> Result<Vec<TeacherRemark>> {
        self.inner.list_remarks(student_id, limit).await
    }

    async fn insert_activity(&self, activity: StudentActivity) -> Result<StudentActivity> {
        self.inner.insert_activity(activity).await
    }

    async fn list_activities(
        &self,
        student_id: Uuid,
        filter: ActivityFilter,
    ) -> Result<Vec<StudentActivity>> {
        self.inner.list_activities(student_id, filter).await
    }

    async fn insert_session(&self, session: StudySession) -> Result<StudySession> {
        self.inner.insert_session(session).await
    }

    async fn save_session(&self, session: &StudySession) -> Result<()> {
        self.inner.save_session(session).await
    }

    async fn find_active_session(&self, student_id: Uuid) -> Result<Option<StudySession>> {
        if self.faults.stale_active_session {
            return Ok(None);
        }
        self.inner.find_active_session(student_id).await
    }

    async fn list_sessions(
        &self,
        student_id: Uuid,
        filter: SessionFilter,
    ) -> Result<Vec<StudySession>> {
        self.inner.list_sessions(student_id, filter).await
    }

    async fn health_check(&self) -> Result<()> {
        self.inner.health_check().await
    }
}

/// A router over a fresh store with one teacher, student and parent
pub struct School {
    pub app: Router,
    pub store: Arc<dyn Store>,
    pub teacher: User,
    pub student: User,
    pub parent: User,
}

impl School {
    pub async fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new())).await
    }

    /// Same fixture over a store that fails as described by `faults`
    pub async fn faulty(faults: Faults) -> Self {
        Self::with_store(Arc::new(FaultyStore::new(faults))).await
    }

    pub async fn with_store(store: Arc<dyn Store>) -> Self {
        let teacher = User::new("ms.rivera", "Elena Rivera", Role::Teacher);
        let student = User::new("sam", "Sam Okafor", Role::Student).with_teacher(teacher.id);
        let parent = User::new("ada", "Ada Okafor", Role::Parent).with_child(student.id);

        for user in [&teacher, &student, &parent] {
            store.upsert_user(user).await.unwrap();
        }

        let evaluator = AlertEvaluator::new(Arc::clone(&store), DropPolicy::default());
        let app = create_router(AppState::new(Arc::clone(&store), evaluator));

        Self {
            app,
            store,
            teacher,
            student,
            parent,
        }
    }

    /// Add another user to the store
    pub async fn add_user(&self, user: &User) {
        self.store.upsert_user(user).await.unwrap();
    }

    /// Send a request as `user` (or anonymously) and decode the JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        user: Option<Uuid>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = match body {
            Some(json) => self.request(method, uri, user, "application/json", json.to_string()),
            None => {
                let mut builder = Request::builder().method(method).uri(uri);
                if let Some(id) = user {
                    builder = builder.header(USER_ID_HEADER, id.to_string());
                }
                builder.body(Body::empty()).unwrap()
            }
        };

        self.dispatch(request).await
    }

    /// Send a raw body with an explicit content type
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        user: Uuid,
        content_type: &str,
        body: &str,
    ) -> (StatusCode, Value) {
        let request = self.request(method, uri, Some(user), content_type, body.to_string());
        self.dispatch(request).await
    }

    fn request(
        &self,
        method: Method,
        uri: &str,
        user: Option<Uuid>,
        content_type: &str,
        body: String,
    ) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", content_type);
        if let Some(id) = user {
            builder = builder.header(USER_ID_HEADER, id.to_string());
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str, user: Uuid) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(user), None).await
    }

    pub async fn post(&self, uri: &str, user: Uuid, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(user), Some(body)).await
    }

    pub async fn put(&self, uri: &str, user: Uuid) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(user), None).await
    }

    /// Submit a score for the fixture student, returning status and body
    pub async fn try_score(&self, subject: &str, score: f64) -> (StatusCode, Value) {
        self.post(
            "/api/teachers/score",
            self.teacher.id,
            serde_json::json!({
                "student_id": self.student.id,
                "subject": subject,
                "score": score,
                "exam_type": "quiz"
            }),
        )
        .await
    }

    /// Record a score for the fixture student
    pub async fn score(&self, subject: &str, score: f64) -> Value {
        let (status, body) = self.try_score(subject, score).await;
        assert_eq!(status, StatusCode::CREATED, "score submission failed: {body}");
        body
    }
}
