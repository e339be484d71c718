//! In-process store

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    NewAlert, PerformanceAlert, Role, ScoreRecord, StudentActivity, StudySession, TeacherRemark,
    User,
};

use super::{ActivityFilter, Recency, SessionFilter, Store};

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    scores: Vec<ScoreRecord>,
    alerts: Vec<PerformanceAlert>,
    remarks: Vec<TeacherRemark>,
    activities: Vec<StudentActivity>,
    sessions: Vec<StudySession>,
}

/// Store backed by process memory. Contents are lost on drop.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first; among equal timestamps the later insert wins.
fn newest_first<T: Clone>(
    items: impl DoubleEndedIterator<Item = T>,
    key: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<T> {
    let mut out: Vec<T> = items.rev().collect();
    out.sort_by(|a, b| key(b).cmp(&key(a)));
    out
}

fn take<T>(mut items: Vec<T>, limit: Option<i64>) -> Vec<T> {
    if let Some(limit) = limit {
        items.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
    }
    items
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.inner.read().users.get(&id).cloned())
    }

    async fn upsert_user(&self, user: &User) -> Result<()> {
        self.inner.write().users.insert(user.id, user.clone());
        Ok(())
    }

    async fn list_students_for_teacher(&self, teacher_id: Uuid) -> Result<Vec<User>> {
        let inner = self.inner.read();
        let mut students: Vec<User> = inner
            .users
            .values()
            .filter(|u| u.role == Role::Student && u.assigned_teacher == Some(teacher_id))
            .cloned()
            .collect();
        students.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(students)
    }

    async fn find_assigned_student(
        &self,
        teacher_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<User>> {
        Ok(self
            .inner
            .read()
            .users
            .get(&student_id)
            .filter(|u| u.role == Role::Student && u.assigned_teacher == Some(teacher_id))
            .cloned())
    }

    async fn insert_score(&self, record: ScoreRecord) -> Result<ScoreRecord> {
        self.inner.write().scores.push(record.clone());
        Ok(record)
    }

    async fn most_recent_prior_score(
        &self,
        student_id: Uuid,
        subject: &str,
        exclude_id: Uuid,
    ) -> Result<Option<ScoreRecord>> {
        let inner = self.inner.read();
        Ok(inner
            .scores
            .iter()
            .filter(|r| r.student_id == student_id && r.subject == subject && r.id != exclude_id)
            .max_by_key(|r| r.recorded_at)
            .cloned())
    }

    async fn list_scores(
        &self,
        student_id: Uuid,
        order: Recency,
        limit: Option<i64>,
    ) -> Result<Vec<ScoreRecord>> {
        let inner = self.inner.read();
        let matching = inner.scores.iter().filter(|r| r.student_id == student_id).cloned();

        let mut records = newest_first(matching, |r| r.recorded_at);
        if order == Recency::OldestFirst {
            records.reverse();
        }
        Ok(take(records, limit))
    }

    async fn create_alert(&self, alert: NewAlert) -> Result<PerformanceAlert> {
        let alert = alert.into_alert();
        self.inner.write().alerts.push(alert.clone());
        Ok(alert)
    }

    async fn list_open_alerts_for_teacher(&self, teacher_id: Uuid) -> Result<Vec<PerformanceAlert>> {
        let inner = self.inner.read();
        let matching = inner
            .alerts
            .iter()
            .filter(|a| a.teacher_id == teacher_id && !a.resolved)
            .cloned();
        Ok(newest_first(matching, |a| a.created_at))
    }

    async fn list_alerts_for_student(&self, student_id: Uuid) -> Result<Vec<PerformanceAlert>> {
        let inner = self.inner.read();
        let matching = inner.alerts.iter().filter(|a| a.student_id == student_id).cloned();
        Ok(newest_first(matching, |a| a.created_at))
    }

    async fn resolve_alert(
        &self,
        alert_id: Uuid,
        teacher_id: Uuid,
    ) -> Result<Option<PerformanceAlert>> {
        let mut inner = self.inner.write();
        Ok(inner
            .alerts
            .iter_mut()
            .find(|a| a.id == alert_id && a.teacher_id == teacher_id)
            .map(|alert| {
                alert.resolve();
                alert.clone()
            }))
    }

    async fn insert_remark(&self, remark: TeacherRemark) -> Result<TeacherRemark> {
        self.inner.write().remarks.push(remark.clone());
        Ok(remark)
    }

    async fn list_remarks(&self, student_id: Uuid, limit: i64) -> Result<Vec<TeacherRemark>> {
        let inner = self.inner.read();
        let matching = inner.remarks.iter().filter(|r| r.student_id == student_id).cloned();
        Ok(take(newest_first(matching, |r| r.created_at), Some(limit)))
    }

    async fn insert_activity(&self, activity: StudentActivity) -> Result<StudentActivity> {
        self.inner.write().activities.push(activity.clone());
        Ok(activity)
    }

    async fn list_activities(
        &self,
        student_id: Uuid,
        filter: ActivityFilter,
    ) -> Result<Vec<StudentActivity>> {
        let inner = self.inner.read();
        let matching = inner
            .activities
            .iter()
            .filter(|a| a.student_id == student_id)
            .filter(|a| filter.since.map_or(true, |since| a.logged_at >= since))
            .filter(|a| filter.until.map_or(true, |until| a.logged_at <= until))
            .cloned();
        Ok(take(newest_first(matching, |a| a.logged_at), filter.limit))
    }

    async fn insert_session(&self, session: StudySession) -> Result<StudySession> {
        let mut inner = self.inner.write();
        let already_active = session.is_active
            && inner
                .sessions
                .iter()
                .any(|s| s.student_id == session.student_id && s.is_active);
        if already_active {
            return Err(Error::conflict(format!(
                "student {} already has an active study session",
                session.student_id
            )));
        }

        inner.sessions.push(session.clone());
        Ok(session)
    }

    async fn save_session(&self, session: &StudySession) -> Result<()> {
        let mut inner = self.inner.write();
        if let Some(existing) = inner.sessions.iter_mut().find(|s| s.id == session.id) {
            *existing = session.clone();
        }
        Ok(())
    }

    async fn find_active_session(&self, student_id: Uuid) -> Result<Option<StudySession>> {
        Ok(self
            .inner
            .read()
            .sessions
            .iter()
            .find(|s| s.student_id == student_id && s.is_active)
            .cloned())
    }

    async fn list_sessions(
        &self,
        student_id: Uuid,
        filter: SessionFilter,
    ) -> Result<Vec<StudySession>> {
        let inner = self.inner.read();
        let matching = inner
            .sessions
            .iter()
            .filter(|s| s.student_id == student_id)
            .filter(|s| filter.since.map_or(true, |since| s.start_time >= since))
            .filter(|s| !filter.completed_only || !s.is_active)
            .cloned();
        Ok(take(newest_first(matching, |s| s.start_time), filter.limit))
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
