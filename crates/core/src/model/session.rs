use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::evaluation::{AnswerEvaluation, SessionSummary};
use crate::model::ids::{SessionId, UserId};
use crate::model::question::GeneratedQuestion;
use crate::model::response::{QuestionResponse, ResponseState};
use crate::model::stats;

//
// ─── SESSION CONFIGURATION ─────────────────────────────────────────────────────
//

/// Seniority bracket the questions are pitched at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Junior,
    Mid,
    Senior,
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Junior => "junior",
            Self::Mid => "mid",
            Self::Senior => "senior",
        };
        write!(f, "{name}")
    }
}

/// How the session is intended to be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewMode {
    Practice,
    Mock,
    Real,
    Assessment,
}

impl fmt::Display for InterviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Practice => "practice",
            Self::Mock => "mock",
            Self::Real => "real",
            Self::Assessment => "assessment",
        };
        write!(f, "{name}")
    }
}

/// Dominant question mix of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Technical,
    Behavioral,
    SystemDesign,
    Mixed,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Technical => "technical",
            Self::Behavioral => "behavioral",
            Self::SystemDesign => "system_design",
            Self::Mixed => "mixed",
        };
        write!(f, "{name}")
    }
}

/// Immutable configuration captured when the session is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub candidate_name: String,
    pub candidate_email: String,
    pub target_role: String,
    pub target_company: Option<String>,
    pub experience_level: ExperienceLevel,
    pub interview_mode: InterviewMode,
    pub session_kind: SessionKind,
}

//
// ─── SESSION STATUS ────────────────────────────────────────────────────────────
//

/// Session lifecycle state machine.
///
/// `Scheduled → InProgress → Completed`, with `Paused` and `Cancelled`
/// reachable from `InProgress`. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    InProgress,
    Paused,
    Completed,
    Cancelled,
}

impl SessionStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{name}")
    }
}

/// Errors raised by session lifecycle operations. The session is left
/// unmodified whenever one of these is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("cannot {action} a session in status {from}")]
    InvalidTransition {
        from: SessionStatus,
        action: &'static str,
    },

    #[error("question index {index} out of bounds (session has {total} questions)")]
    QuestionIndexOutOfBounds { index: usize, total: usize },

    #[error("question {index} was already answered")]
    AlreadyAnswered { index: usize },

    #[error("question {index} was already skipped")]
    AlreadySkipped { index: usize },
}

//
// ─── INTERVIEW SESSION ─────────────────────────────────────────────────────────
//

/// One candidate's interview attempt: an ordered list of question slots plus
/// lifecycle state and derived metrics.
///
/// Invariants upheld by the mutators:
/// - `questions_answered + questions_skipped <= total_questions`
/// - `current_question_index` never decreases
/// - terminal sessions reject every further mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSession {
    session_id: SessionId,
    user_id: Option<UserId>,
    config: SessionConfig,

    status: SessionStatus,
    current_question_index: usize,
    questions_answered: u32,
    questions_skipped: u32,
    responses: Vec<QuestionResponse>,

    average_score: Option<f64>,
    technical_score: Option<f64>,
    behavioral_score: Option<f64>,
    total_duration_seconds: u64,
    session_summary: Option<String>,
    strengths: Vec<String>,
    weaknesses: Vec<String>,
    recommendations: Vec<String>,

    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl InterviewSession {
    /// Creates a session in `Scheduled` state, seeding one untouched response
    /// slot per generated question in generator order. The number of slots is
    /// fixed here and never changes.
    #[must_use]
    pub fn new(
        session_id: SessionId,
        user_id: Option<UserId>,
        config: SessionConfig,
        questions: &[GeneratedQuestion],
        created_at: DateTime<Utc>,
    ) -> Self {
        let responses = questions
            .iter()
            .enumerate()
            .map(|(index, question)| QuestionResponse::placeholder(index, question))
            .collect();

        Self {
            session_id,
            user_id,
            config,
            status: SessionStatus::Scheduled,
            current_question_index: 0,
            questions_answered: 0,
            questions_skipped: 0,
            responses,
            average_score: None,
            technical_score: None,
            behavioral_score: None,
            total_duration_seconds: 0,
            session_summary: None,
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            recommendations: Vec::new(),
            created_at,
            started_at: None,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.responses.len()
    }

    #[must_use]
    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    #[must_use]
    pub fn questions_answered(&self) -> u32 {
        self.questions_answered
    }

    #[must_use]
    pub fn questions_skipped(&self) -> u32 {
        self.questions_skipped
    }

    #[must_use]
    pub fn responses(&self) -> &[QuestionResponse] {
        &self.responses
    }

    /// The response slot at `index`, if in bounds.
    #[must_use]
    pub fn response(&self, index: usize) -> Option<&QuestionResponse> {
        self.responses.get(index)
    }

    #[must_use]
    pub fn average_score(&self) -> Option<f64> {
        self.average_score
    }

    #[must_use]
    pub fn technical_score(&self) -> Option<f64> {
        self.technical_score
    }

    #[must_use]
    pub fn behavioral_score(&self) -> Option<f64> {
        self.behavioral_score
    }

    #[must_use]
    pub fn total_duration_seconds(&self) -> u64 {
        self.total_duration_seconds
    }

    #[must_use]
    pub fn session_summary(&self) -> Option<&str> {
        self.session_summary.as_deref()
    }

    #[must_use]
    pub fn strengths(&self) -> &[String] {
        &self.strengths
    }

    #[must_use]
    pub fn weaknesses(&self) -> &[String] {
        &self.weaknesses
    }

    #[must_use]
    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    //
    // ─── LIFECYCLE TRANSITIONS ─────────────────────────────────────────────────
    //

    /// `Scheduled → InProgress`, stamping `started_at`.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::InvalidTransition` unless the session is
    /// still `Scheduled`.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), SessionStateError> {
        if self.status != SessionStatus::Scheduled {
            return Err(SessionStateError::InvalidTransition {
                from: self.status,
                action: "start",
            });
        }
        self.status = SessionStatus::InProgress;
        self.started_at = Some(now);
        Ok(())
    }

    /// `InProgress → Paused`.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::InvalidTransition` unless in progress.
    pub fn pause(&mut self) -> Result<(), SessionStateError> {
        if self.status != SessionStatus::InProgress {
            return Err(SessionStateError::InvalidTransition {
                from: self.status,
                action: "pause",
            });
        }
        self.status = SessionStatus::Paused;
        Ok(())
    }

    /// `Paused → InProgress`.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::InvalidTransition` unless paused.
    pub fn resume(&mut self) -> Result<(), SessionStateError> {
        if self.status != SessionStatus::Paused {
            return Err(SessionStateError::InvalidTransition {
                from: self.status,
                action: "resume",
            });
        }
        self.status = SessionStatus::InProgress;
        Ok(())
    }

    /// Moves to `Cancelled` from any non-terminal state.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::InvalidTransition` if already terminal.
    pub fn cancel(&mut self) -> Result<(), SessionStateError> {
        if self.status.is_terminal() {
            return Err(SessionStateError::InvalidTransition {
                from: self.status,
                action: "cancel",
            });
        }
        self.status = SessionStatus::Cancelled;
        Ok(())
    }

    /// Moves to `Completed`, stamping `completed_at` and recomputing metrics.
    ///
    /// Completing with zero answered questions succeeds; summary fields stay
    /// empty until `apply_summary` is called.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::InvalidTransition` unless the session is
    /// `InProgress` or `Paused`.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), SessionStateError> {
        if !matches!(
            self.status,
            SessionStatus::InProgress | SessionStatus::Paused
        ) {
            return Err(SessionStateError::InvalidTransition {
                from: self.status,
                action: "complete",
            });
        }
        self.status = SessionStatus::Completed;
        self.completed_at = Some(now);
        self.recalculate_metrics();
        Ok(())
    }

    //
    // ─── ANSWER AND SKIP ───────────────────────────────────────────────────────
    //

    /// Checks that `index` names an untouched slot in an in-progress session.
    ///
    /// Callers use this before paying for an evaluation so an invalid submit
    /// never reaches the evaluator.
    ///
    /// # Errors
    ///
    /// Returns the same errors `record_answer` would.
    pub fn ensure_can_respond(&self, index: usize) -> Result<(), SessionStateError> {
        if self.status != SessionStatus::InProgress {
            return Err(SessionStateError::InvalidTransition {
                from: self.status,
                action: "answer",
            });
        }
        let response =
            self.responses
                .get(index)
                .ok_or(SessionStateError::QuestionIndexOutOfBounds {
                    index,
                    total: self.responses.len(),
                })?;
        match response.state() {
            ResponseState::Untouched => Ok(()),
            ResponseState::Answered => Err(SessionStateError::AlreadyAnswered { index }),
            ResponseState::Skipped => Err(SessionStateError::AlreadySkipped { index }),
        }
    }

    /// Applies an answer and its evaluation atomically: answer fields, score,
    /// evaluation id, and feedback land together or not at all.
    ///
    /// Advances `current_question_index` to at least `index + 1` and
    /// recomputes session metrics.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError` if the session is not in progress, the
    /// index is out of bounds, or the slot was already answered or skipped.
    pub fn record_answer(
        &mut self,
        index: usize,
        answer_text: String,
        time_spent_seconds: u32,
        evaluation: &AnswerEvaluation,
        now: DateTime<Utc>,
    ) -> Result<(), SessionStateError> {
        self.ensure_can_respond(index)?;

        self.responses[index].apply_answer(
            answer_text,
            time_spent_seconds,
            evaluation.overall_score,
            evaluation.evaluation_id,
            evaluation.summary.clone(),
            now,
        );
        self.questions_answered += 1;
        self.advance_to(index + 1);
        self.recalculate_metrics();
        Ok(())
    }

    /// Marks the slot at `index` skipped without involving the evaluator.
    ///
    /// # Errors
    ///
    /// Same failure modes as `record_answer`.
    pub fn record_skip(
        &mut self,
        index: usize,
        time_spent_seconds: u32,
        now: DateTime<Utc>,
    ) -> Result<(), SessionStateError> {
        self.ensure_can_respond(index)?;

        self.responses[index].apply_skip(time_spent_seconds, now);
        self.questions_skipped += 1;
        self.advance_to(index + 1);
        self.recalculate_metrics();
        Ok(())
    }

    fn advance_to(&mut self, next: usize) {
        // Monotonic: answering an earlier untouched slot never rewinds.
        self.current_question_index = self.current_question_index.max(next);
    }

    //
    // ─── DERIVED METRICS ───────────────────────────────────────────────────────
    //

    /// Recomputes the derived score and duration fields from the responses.
    ///
    /// Averages cover non-skipped, scored responses only; a session with every
    /// question skipped has `average_score` `None`, not zero. Duration is
    /// additive over whatever time is recorded on all slots, skips included.
    fn recalculate_metrics(&mut self) {
        let scored: Vec<f64> = self
            .responses
            .iter()
            .filter(|r| r.is_scored())
            .filter_map(|r| r.evaluation_score())
            .collect();
        self.average_score = stats::mean(&scored);

        let technical: Vec<f64> = self
            .responses
            .iter()
            .filter(|r| r.is_scored() && r.question_type().is_technical_like())
            .filter_map(|r| r.evaluation_score())
            .collect();
        self.technical_score = stats::mean(&technical);

        let behavioral: Vec<f64> = self
            .responses
            .iter()
            .filter(|r| r.is_scored() && r.question_type().is_behavioral_like())
            .filter_map(|r| r.evaluation_score())
            .collect();
        self.behavioral_score = stats::mean(&behavioral);

        self.total_duration_seconds = self
            .responses
            .iter()
            .map(|r| u64::from(r.time_spent_seconds()))
            .sum();
    }

    /// Rebuilds minimal evaluation records from the stored scores, for the
    /// session-summary routine at completion time.
    #[must_use]
    pub fn minimal_evaluations(&self) -> Vec<AnswerEvaluation> {
        self.responses
            .iter()
            .filter(|r| r.is_scored())
            .filter_map(|r| {
                let score = r.evaluation_score()?;
                let id = r.evaluation_id()?;
                Some(AnswerEvaluation::minimal(
                    id,
                    r.question_id(),
                    r.question_type(),
                    score,
                ))
            })
            .collect()
    }

    /// Copies a computed session summary onto the derived summary fields.
    pub fn apply_summary(&mut self, summary: &SessionSummary) {
        self.session_summary = Some(summary.describe());
        self.strengths = summary.top_strengths.clone();
        self.weaknesses = summary.top_weaknesses.clone();
        self.recommendations = summary.advice();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::evaluation::AnswerEvaluation;
    use crate::model::ids::EvaluationId;
    use crate::model::question::{Difficulty, QuestionType};
    use crate::time::fixed_now;

    fn config() -> SessionConfig {
        SessionConfig {
            candidate_name: "Ada".into(),
            candidate_email: "ada@example.com".into(),
            target_role: "Backend Engineer".into(),
            target_company: None,
            experience_level: ExperienceLevel::Mid,
            interview_mode: InterviewMode::Practice,
            session_kind: SessionKind::Mixed,
        }
    }

    fn question(question_type: QuestionType) -> GeneratedQuestion {
        GeneratedQuestion {
            question: "Q".into(),
            question_type,
            difficulty: Difficulty::Medium,
            category: "general".into(),
            skills_tested: Vec::new(),
            expected_duration_minutes: 5,
        }
    }

    fn evaluation(score: f64) -> AnswerEvaluation {
        AnswerEvaluation::minimal(
            EvaluationId::random(),
            0,
            QuestionType::Technical,
            score,
        )
    }

    fn in_progress_session(questions: &[GeneratedQuestion]) -> InterviewSession {
        let mut session = InterviewSession::new(
            SessionId::random(),
            None,
            config(),
            questions,
            fixed_now(),
        );
        session.start(fixed_now()).unwrap();
        session
    }

    #[test]
    fn new_session_is_scheduled_with_fixed_slots() {
        let questions = vec![
            question(QuestionType::Technical),
            question(QuestionType::Technical),
            question(QuestionType::Behavioral),
        ];
        let session = InterviewSession::new(
            SessionId::random(),
            None,
            config(),
            &questions,
            fixed_now(),
        );
        assert_eq!(session.status(), SessionStatus::Scheduled);
        assert_eq!(session.total_questions(), 3);
        assert_eq!(session.current_question_index(), 0);
        assert_eq!(session.average_score(), None);
    }

    #[test]
    fn start_rejects_non_scheduled() {
        let mut session = in_progress_session(&[question(QuestionType::Technical)]);
        let err = session.start(fixed_now()).unwrap_err();
        assert!(matches!(
            err,
            SessionStateError::InvalidTransition {
                from: SessionStatus::InProgress,
                ..
            }
        ));
        // status untouched by the failed transition
        assert_eq!(session.status(), SessionStatus::InProgress);
    }

    #[test]
    fn answer_advances_and_counts() {
        let mut session = in_progress_session(&[
            question(QuestionType::Technical),
            question(QuestionType::Technical),
        ]);
        session
            .record_answer(0, "answer".into(), 200, &evaluation(80.0), fixed_now())
            .unwrap();
        assert_eq!(session.questions_answered(), 1);
        assert_eq!(session.current_question_index(), 1);
        assert_eq!(session.average_score(), Some(80.0));
        assert_eq!(session.total_duration_seconds(), 200);
    }

    #[test]
    fn answer_requires_in_progress() {
        let questions = [question(QuestionType::Technical)];
        let mut session = InterviewSession::new(
            SessionId::random(),
            None,
            config(),
            &questions,
            fixed_now(),
        );
        let err = session
            .record_answer(0, "a".into(), 1, &evaluation(50.0), fixed_now())
            .unwrap_err();
        assert!(matches!(err, SessionStateError::InvalidTransition { .. }));
    }

    #[test]
    fn out_of_bounds_index_is_rejected_without_mutation() {
        let mut session = in_progress_session(&[question(QuestionType::Technical)]);
        let err = session
            .record_answer(5, "a".into(), 1, &evaluation(50.0), fixed_now())
            .unwrap_err();
        assert!(matches!(
            err,
            SessionStateError::QuestionIndexOutOfBounds { index: 5, total: 1 }
        ));
        assert_eq!(session.questions_answered(), 0);
        assert_eq!(session.current_question_index(), 0);
    }

    #[test]
    fn reanswer_and_reskip_are_rejected() {
        let mut session = in_progress_session(&[
            question(QuestionType::Technical),
            question(QuestionType::Behavioral),
        ]);
        session
            .record_answer(0, "a".into(), 1, &evaluation(60.0), fixed_now())
            .unwrap();
        session.record_skip(1, 0, fixed_now()).unwrap();

        assert!(matches!(
            session
                .record_answer(0, "b".into(), 1, &evaluation(90.0), fixed_now())
                .unwrap_err(),
            SessionStateError::AlreadyAnswered { index: 0 }
        ));
        assert!(matches!(
            session.record_skip(1, 0, fixed_now()).unwrap_err(),
            SessionStateError::AlreadySkipped { index: 1 }
        ));
        assert_eq!(session.questions_answered(), 1);
        assert_eq!(session.questions_skipped(), 1);
    }

    #[test]
    fn index_is_monotonic_when_answering_backwards() {
        let mut session = in_progress_session(&[
            question(QuestionType::Technical),
            question(QuestionType::Technical),
            question(QuestionType::Technical),
        ]);
        session
            .record_answer(2, "a".into(), 1, &evaluation(70.0), fixed_now())
            .unwrap();
        assert_eq!(session.current_question_index(), 3);
        session
            .record_answer(0, "b".into(), 1, &evaluation(70.0), fixed_now())
            .unwrap();
        assert_eq!(session.current_question_index(), 3);
    }

    #[test]
    fn skip_excluded_from_average() {
        let mut session = in_progress_session(&[
            question(QuestionType::Technical),
            question(QuestionType::Technical),
            question(QuestionType::Behavioral),
        ]);
        session
            .record_answer(0, "a".into(), 10, &evaluation(80.0), fixed_now())
            .unwrap();
        session.record_skip(1, 0, fixed_now()).unwrap();
        session
            .record_answer(2, "b".into(), 10, &evaluation(60.0), fixed_now())
            .unwrap();
        session.complete(fixed_now()).unwrap();

        assert_eq!(session.average_score(), Some(70.0));
        assert_eq!(session.questions_skipped(), 1);
    }

    #[test]
    fn all_skipped_session_has_no_average() {
        let mut session = in_progress_session(&[
            question(QuestionType::Technical),
            question(QuestionType::Behavioral),
        ]);
        session.record_skip(0, 0, fixed_now()).unwrap();
        session.record_skip(1, 0, fixed_now()).unwrap();
        session.complete(fixed_now()).unwrap();
        assert_eq!(session.average_score(), None);
    }

    #[test]
    fn sub_scores_split_by_question_type() {
        let mut session = in_progress_session(&[
            question(QuestionType::Technical),
            question(QuestionType::SystemDesign),
            question(QuestionType::Behavioral),
        ]);
        session
            .record_answer(0, "a".into(), 1, &evaluation(90.0), fixed_now())
            .unwrap();
        session
            .record_answer(1, "b".into(), 1, &evaluation(70.0), fixed_now())
            .unwrap();
        session
            .record_answer(2, "c".into(), 1, &evaluation(50.0), fixed_now())
            .unwrap();

        assert_eq!(session.technical_score(), Some(80.0));
        assert_eq!(session.behavioral_score(), Some(50.0));
    }

    #[test]
    fn complete_rejects_mutations_afterwards() {
        let mut session = in_progress_session(&[question(QuestionType::Technical)]);
        session.complete(fixed_now()).unwrap();
        assert_eq!(session.status(), SessionStatus::Completed);
        assert!(session
            .record_answer(0, "a".into(), 1, &evaluation(50.0), fixed_now())
            .is_err());
        assert!(session.record_skip(0, 0, fixed_now()).is_err());
        assert!(session.cancel().is_err());
    }

    #[test]
    fn pause_resume_round_trip() {
        let mut session = in_progress_session(&[question(QuestionType::Technical)]);
        session.pause().unwrap();
        assert!(session
            .record_answer(0, "a".into(), 1, &evaluation(50.0), fixed_now())
            .is_err());
        session.resume().unwrap();
        session
            .record_answer(0, "a".into(), 1, &evaluation(50.0), fixed_now())
            .unwrap();
        assert_eq!(session.questions_answered(), 1);
    }

    #[test]
    fn invariant_answered_plus_skipped_bounded() {
        let questions = vec![question(QuestionType::Technical); 3];
        let mut session = in_progress_session(&questions);
        session
            .record_answer(0, "a".into(), 1, &evaluation(50.0), fixed_now())
            .unwrap();
        session.record_skip(1, 0, fixed_now()).unwrap();
        session
            .record_answer(2, "c".into(), 1, &evaluation(50.0), fixed_now())
            .unwrap();
        let touched = session.questions_answered() + session.questions_skipped();
        assert!(touched as usize <= session.total_questions());
        // every further attempt fails, so the bound cannot be exceeded
        assert!(session.record_skip(0, 0, fixed_now()).is_err());
    }
}
