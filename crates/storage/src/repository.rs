use async_trait::async_trait;
use prep_core::model::{InterviewSession, SessionId, UserId, UserProgress};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for interview sessions.
///
/// Sessions are read and written as whole documents, one record per
/// `session_id`; there are no partial updates.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist or replace a session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn upsert_session(&self, session: &InterviewSession) -> Result<(), StorageError>;

    /// Fetch a session by id. `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_session(&self, id: SessionId) -> Result<Option<InterviewSession>, StorageError>;

    /// All sessions belonging to a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_sessions_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<InterviewSession>, StorageError>;
}

/// Repository contract for per-user progress rollups, one record per user.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Persist or replace a user's progress rollup.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the rollup cannot be stored.
    async fn upsert_progress(&self, progress: &UserProgress) -> Result<(), StorageError>;

    /// Fetch a user's progress rollup. `None` when never computed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_progress(&self, user_id: UserId) -> Result<Option<UserProgress>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    sessions: Arc<Mutex<HashMap<SessionId, InterviewSession>>>,
    progress: Arc<Mutex<HashMap<UserId, UserProgress>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn upsert_session(&self, session: &InterviewSession) -> Result<(), StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(session.session_id(), session.clone());
        Ok(())
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<InterviewSession>, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_sessions_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<InterviewSession>, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut sessions: Vec<InterviewSession> = guard
            .values()
            .filter(|s| s.user_id() == Some(user_id))
            .cloned()
            .collect();
        sessions.sort_by_key(prep_core::model::InterviewSession::created_at);
        Ok(sessions)
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn upsert_progress(&self, progress: &UserProgress) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(progress.user_id, progress.clone());
        Ok(())
    }

    async fn get_progress(&self, user_id: UserId) -> Result<Option<UserProgress>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&user_id).cloned())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub sessions: Arc<dyn SessionRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let sessions: Arc<dyn SessionRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        Self { sessions, progress }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prep_core::model::{
        Difficulty, ExperienceLevel, GeneratedQuestion, InterviewMode, QuestionType,
        SessionConfig, SessionKind,
    };
    use prep_core::time::fixed_now;

    fn build_session(user_id: Option<UserId>) -> InterviewSession {
        let questions = [GeneratedQuestion {
            question: "Q".into(),
            question_type: QuestionType::Technical,
            difficulty: Difficulty::Medium,
            category: "general".into(),
            skills_tested: Vec::new(),
            expected_duration_minutes: 5,
        }];
        InterviewSession::new(
            SessionId::random(),
            user_id,
            SessionConfig {
                candidate_name: "Ada".into(),
                candidate_email: "ada@example.com".into(),
                target_role: "Backend Engineer".into(),
                target_company: None,
                experience_level: ExperienceLevel::Mid,
                interview_mode: InterviewMode::Practice,
                session_kind: SessionKind::Technical,
            },
            &questions,
            fixed_now(),
        )
    }

    #[tokio::test]
    async fn round_trips_session() {
        let repo = InMemoryRepository::new();
        let session = build_session(None);
        repo.upsert_session(&session).await.unwrap();

        let fetched = repo.get_session(session.session_id()).await.unwrap();
        assert_eq!(fetched, Some(session));
    }

    #[tokio::test]
    async fn missing_session_is_none() {
        let repo = InMemoryRepository::new();
        let fetched = repo.get_session(SessionId::random()).await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn lists_only_the_users_sessions() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        let mine = build_session(Some(user));
        let theirs = build_session(Some(UserId::random()));
        let anonymous = build_session(None);
        repo.upsert_session(&mine).await.unwrap();
        repo.upsert_session(&theirs).await.unwrap();
        repo.upsert_session(&anonymous).await.unwrap();

        let listed = repo.list_sessions_for_user(user).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].session_id(), mine.session_id());
    }

    #[tokio::test]
    async fn round_trips_progress() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        assert!(repo.get_progress(user).await.unwrap().is_none());

        let progress = UserProgress::empty(user, fixed_now());
        repo.upsert_progress(&progress).await.unwrap();
        assert_eq!(repo.get_progress(user).await.unwrap(), Some(progress));
    }
}
