use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex as AsyncMutex;

use prep_core::Clock;
use prep_core::model::{
    ExperienceLevel, InterviewMode, InterviewSession, SessionConfig, SessionId, SessionKind,
    SessionStateError, UserId, UserProgress,
};
use storage::repository::{ProgressRepository, SessionRepository};

use crate::answer_evaluator::{EvaluateAnswers, EvaluationRequest};
use crate::error::SessionManagerError;
use crate::question_generator::{GenerateQuestions, GenerationRequest};

/// Upper bound on questions per session.
const MAX_QUESTIONS: usize = 50;

//
// ─── CREATE REQUEST ────────────────────────────────────────────────────────────
//

/// Inputs for creating a session. The per-type counts decide the question mix
/// and the derived session kind.
#[derive(Debug, Clone)]
pub struct CreateSessionRequest {
    pub user_id: Option<UserId>,
    pub candidate_name: String,
    pub candidate_email: String,
    pub target_role: String,
    pub target_company: Option<String>,
    pub experience_level: ExperienceLevel,
    pub interview_mode: InterviewMode,
    pub resume_context: Option<String>,
    pub focus_areas: Vec<String>,
    pub num_technical: u8,
    pub num_behavioral: u8,
    pub num_situational: u8,
    pub num_system_design: u8,
}

impl CreateSessionRequest {
    fn total_questions(&self) -> usize {
        usize::from(self.num_technical)
            + usize::from(self.num_behavioral)
            + usize::from(self.num_situational)
            + usize::from(self.num_system_design)
    }

    /// A single-type request gets that kind; anything else is mixed.
    fn session_kind(&self) -> SessionKind {
        let technical = self.num_technical > 0;
        let behavioral = self.num_behavioral > 0 || self.num_situational > 0;
        let design = self.num_system_design > 0;
        match (technical, behavioral, design) {
            (true, false, false) => SessionKind::Technical,
            (false, true, false) => SessionKind::Behavioral,
            (false, false, true) => SessionKind::SystemDesign,
            _ => SessionKind::Mixed,
        }
    }

    fn generation_request(&self) -> GenerationRequest {
        GenerationRequest {
            target_role: self.target_role.clone(),
            target_company: self.target_company.clone(),
            experience_level: self.experience_level,
            resume_context: self.resume_context.clone(),
            focus_areas: self.focus_areas.clone(),
            num_technical: self.num_technical,
            num_behavioral: self.num_behavioral,
            num_situational: self.num_situational,
            num_system_design: self.num_system_design,
        }
    }
}

//
// ─── SESSION MANAGER ───────────────────────────────────────────────────────────
//

/// Orchestrates the interview lifecycle: question generation at creation,
/// evaluator-backed answer submission, skip and completion handling, and the
/// per-user progress rollup.
///
/// Mutating operations on one session are serialized through a per-session
/// lock, so concurrent submissions cannot race on the counters.
pub struct SessionManager {
    clock: Clock,
    sessions: Arc<dyn SessionRepository>,
    progress: Arc<dyn ProgressRepository>,
    generator: Arc<dyn GenerateQuestions>,
    evaluator: Arc<dyn EvaluateAnswers>,
    session_locks: Mutex<HashMap<SessionId, Arc<AsyncMutex<()>>>>,
    progress_cache: Mutex<HashMap<UserId, UserProgress>>,
    milestone_history: Mutex<HashMap<(UserId, &'static str), DateTime<Utc>>>,
}

impl SessionManager {
    #[must_use]
    pub fn new(
        clock: Clock,
        sessions: Arc<dyn SessionRepository>,
        progress: Arc<dyn ProgressRepository>,
        generator: Arc<dyn GenerateQuestions>,
        evaluator: Arc<dyn EvaluateAnswers>,
    ) -> Self {
        Self {
            clock,
            sessions,
            progress,
            generator,
            evaluator,
            session_locks: Mutex::new(HashMap::new()),
            progress_cache: Mutex::new(HashMap::new()),
            milestone_history: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn clock(&self) -> Clock {
        self.clock
    }

    pub(crate) fn sessions_repo(&self) -> &dyn SessionRepository {
        self.sessions.as_ref()
    }

    pub(crate) fn progress_repo(&self) -> &dyn ProgressRepository {
        self.progress.as_ref()
    }

    pub(crate) fn progress_cache(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<UserId, UserProgress>> {
        self.progress_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn milestone_history(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<(UserId, &'static str), DateTime<Utc>>> {
        self.milestone_history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock keyed by session id, serializing mutations per session.
    fn session_lock(&self, id: SessionId) -> Arc<AsyncMutex<()>> {
        let mut guard = self
            .session_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(guard.entry(id).or_default())
    }

    pub(crate) async fn load(
        &self,
        id: SessionId,
    ) -> Result<InterviewSession, SessionManagerError> {
        self.sessions
            .get_session(id)
            .await?
            .ok_or(SessionManagerError::SessionNotFound(id))
    }

    //
    // ─── LIFECYCLE OPERATIONS ──────────────────────────────────────────────────
    //

    /// Creates a session: validates the request, generates the question mix,
    /// seeds one response slot per question, persists in `Scheduled` state.
    ///
    /// # Errors
    ///
    /// Returns `SessionManagerError::InvalidRequest` for bad inputs, and
    /// generator or storage errors otherwise.
    pub async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<InterviewSession, SessionManagerError> {
        if request.target_role.trim().is_empty() {
            return Err(SessionManagerError::InvalidRequest(
                "target_role must not be empty".into(),
            ));
        }
        let total = request.total_questions();
        if total == 0 {
            return Err(SessionManagerError::InvalidRequest(
                "at least one question must be requested".into(),
            ));
        }
        if total > MAX_QUESTIONS {
            return Err(SessionManagerError::InvalidRequest(format!(
                "at most {MAX_QUESTIONS} questions per session (requested {total})"
            )));
        }

        let question_set = self
            .generator
            .generate_questions(&request.generation_request())
            .await?;

        let config = SessionConfig {
            candidate_name: request.candidate_name.clone(),
            candidate_email: request.candidate_email.clone(),
            target_role: request.target_role.clone(),
            target_company: request.target_company.clone(),
            experience_level: request.experience_level,
            interview_mode: request.interview_mode,
            session_kind: request.session_kind(),
        };

        let session = InterviewSession::new(
            SessionId::random(),
            request.user_id,
            config,
            &question_set.questions,
            self.clock.now(),
        );
        self.sessions.upsert_session(&session).await?;

        tracing::info!(
            session_id = %session.session_id(),
            questions = session.total_questions(),
            "created session"
        );
        Ok(session)
    }

    /// Starts a scheduled session.
    ///
    /// # Errors
    ///
    /// Returns an invalid-state error unless the session is `Scheduled`.
    pub async fn start_session(
        &self,
        id: SessionId,
    ) -> Result<InterviewSession, SessionManagerError> {
        let lock = self.session_lock(id);
        let _guard = lock.lock().await;

        let mut session = self.load(id).await?;
        session.start(self.clock.now())?;
        self.sessions.upsert_session(&session).await?;
        Ok(session)
    }

    /// Submits an answer for the question at `question_index`.
    ///
    /// The evaluator runs before any mutation: the answer text, score,
    /// evaluation id, and feedback are applied together, so a scoring failure
    /// leaves the session exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns state errors for invalid submissions, evaluator errors when
    /// both the model path and its fallback fail, and storage errors.
    pub async fn submit_answer(
        &self,
        id: SessionId,
        question_index: usize,
        answer_text: String,
        time_spent_seconds: u32,
    ) -> Result<InterviewSession, SessionManagerError> {
        let lock = self.session_lock(id);
        let _guard = lock.lock().await;

        let mut session = self.load(id).await?;
        session.ensure_can_respond(question_index)?;
        let slot = session.response(question_index).ok_or(
            SessionStateError::QuestionIndexOutOfBounds {
                index: question_index,
                total: session.total_questions(),
            },
        )?;

        let evaluation_request = EvaluationRequest {
            session_id: id,
            question_id: slot.question_id(),
            question: slot.question().to_string(),
            question_type: slot.question_type(),
            difficulty: slot.difficulty(),
            answer_text: answer_text.clone(),
            expected_points: slot.skills_tested().to_vec(),
            target_role: session.config().target_role.clone(),
            experience_level: session.config().experience_level,
        };
        let evaluation = self.evaluator.evaluate_answer(&evaluation_request).await?;

        session.record_answer(
            question_index,
            answer_text,
            time_spent_seconds,
            &evaluation,
            self.clock.now(),
        )?;
        self.sessions.upsert_session(&session).await?;

        tracing::debug!(
            session_id = %id,
            question_index,
            score = evaluation.overall_score,
            "answer recorded"
        );
        Ok(session)
    }

    /// Skips the question at `question_index`. No evaluator call is made and
    /// no time is recorded for the slot.
    ///
    /// # Errors
    ///
    /// Returns state errors for invalid skips and storage errors.
    pub async fn skip_question(
        &self,
        id: SessionId,
        question_index: usize,
    ) -> Result<InterviewSession, SessionManagerError> {
        let lock = self.session_lock(id);
        let _guard = lock.lock().await;

        let mut session = self.load(id).await?;
        session.record_skip(question_index, 0, self.clock.now())?;
        self.sessions.upsert_session(&session).await?;
        Ok(session)
    }

    /// Completes a session: recomputes metrics, derives the session summary
    /// from the stored scores, and refreshes the owner's progress rollup.
    ///
    /// Completing with zero answered questions succeeds with empty summary
    /// fields.
    ///
    /// # Errors
    ///
    /// Returns an invalid-state error unless the session is `InProgress` or
    /// `Paused`, and storage errors otherwise.
    pub async fn complete_session(
        &self,
        id: SessionId,
    ) -> Result<InterviewSession, SessionManagerError> {
        let lock = self.session_lock(id);
        let _guard = lock.lock().await;

        let mut session = self.load(id).await?;
        session.complete(self.clock.now())?;

        let evaluations = session.minimal_evaluations();
        if !evaluations.is_empty() {
            match self.evaluator.summarize_session(id, &evaluations) {
                Ok(summary) => session.apply_summary(&summary),
                Err(err) => {
                    tracing::warn!(session_id = %id, error = %err, "session summary unavailable");
                }
            }
        }
        self.sessions.upsert_session(&session).await?;

        if let Some(user_id) = session.user_id() {
            self.refresh_user_progress(user_id).await?;
        }

        tracing::info!(
            session_id = %id,
            answered = session.questions_answered(),
            skipped = session.questions_skipped(),
            "session completed"
        );
        Ok(session)
    }

    /// Pauses an in-progress session.
    ///
    /// # Errors
    ///
    /// Returns an invalid-state error unless the session is `InProgress`.
    pub async fn pause_session(
        &self,
        id: SessionId,
    ) -> Result<InterviewSession, SessionManagerError> {
        let lock = self.session_lock(id);
        let _guard = lock.lock().await;

        let mut session = self.load(id).await?;
        session.pause()?;
        self.sessions.upsert_session(&session).await?;
        Ok(session)
    }

    /// Resumes a paused session.
    ///
    /// # Errors
    ///
    /// Returns an invalid-state error unless the session is `Paused`.
    pub async fn resume_session(
        &self,
        id: SessionId,
    ) -> Result<InterviewSession, SessionManagerError> {
        let lock = self.session_lock(id);
        let _guard = lock.lock().await;

        let mut session = self.load(id).await?;
        session.resume()?;
        self.sessions.upsert_session(&session).await?;
        Ok(session)
    }

    /// Cancels a session from any non-terminal state.
    ///
    /// # Errors
    ///
    /// Returns an invalid-state error if the session is already terminal.
    pub async fn cancel_session(
        &self,
        id: SessionId,
    ) -> Result<InterviewSession, SessionManagerError> {
        let lock = self.session_lock(id);
        let _guard = lock.lock().await;

        let mut session = self.load(id).await?;
        session.cancel()?;
        self.sessions.upsert_session(&session).await?;
        Ok(session)
    }

    /// Fetches a session by id.
    ///
    /// # Errors
    ///
    /// Returns `SessionManagerError::SessionNotFound` when missing.
    pub async fn get_session(
        &self,
        id: SessionId,
    ) -> Result<InterviewSession, SessionManagerError> {
        self.load(id).await
    }

    /// All sessions belonging to a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns storage errors.
    pub async fn get_user_sessions(
        &self,
        user_id: UserId,
    ) -> Result<Vec<InterviewSession>, SessionManagerError> {
        Ok(self.sessions.list_sessions_for_user(user_id).await?)
    }
}
