use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::EvaluationId;
use crate::model::question::{Difficulty, GeneratedQuestion, QuestionType};

/// Where a question slot is in its lifecycle. Exactly one state holds at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseState {
    Untouched,
    Answered,
    Skipped,
}

/// One question's record within a session: the immutable question copied from
/// the generator plus the candidate's answer, score, and feedback (or a skip
/// marker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResponse {
    question_id: u32,
    question: String,
    question_type: QuestionType,
    difficulty: Difficulty,
    category: String,
    skills_tested: Vec<String>,
    expected_duration_minutes: u32,

    answer_text: Option<String>,
    time_spent_seconds: u32,
    answered_at: Option<DateTime<Utc>>,
    evaluation_score: Option<f64>,
    evaluation_id: Option<EvaluationId>,
    feedback_summary: Option<String>,
    is_skipped: bool,
    skipped_at: Option<DateTime<Utc>>,
}

impl QuestionResponse {
    /// Builds the untouched placeholder seeded at session creation.
    ///
    /// `question_id` is derived from the question's index in the session.
    #[must_use]
    pub fn placeholder(index: usize, question: &GeneratedQuestion) -> Self {
        Self {
            question_id: u32::try_from(index).unwrap_or(u32::MAX),
            question: question.question.clone(),
            question_type: question.question_type,
            difficulty: question.difficulty,
            category: question.category.clone(),
            skills_tested: question.skills_tested.clone(),
            expected_duration_minutes: question.expected_duration_minutes,
            answer_text: None,
            time_spent_seconds: 0,
            answered_at: None,
            evaluation_score: None,
            evaluation_id: None,
            feedback_summary: None,
            is_skipped: false,
            skipped_at: None,
        }
    }

    #[must_use]
    pub fn question_id(&self) -> u32 {
        self.question_id
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        self.question_type
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn skills_tested(&self) -> &[String] {
        &self.skills_tested
    }

    #[must_use]
    pub fn expected_duration_minutes(&self) -> u32 {
        self.expected_duration_minutes
    }

    #[must_use]
    pub fn answer_text(&self) -> Option<&str> {
        self.answer_text.as_deref()
    }

    #[must_use]
    pub fn time_spent_seconds(&self) -> u32 {
        self.time_spent_seconds
    }

    #[must_use]
    pub fn answered_at(&self) -> Option<DateTime<Utc>> {
        self.answered_at
    }

    #[must_use]
    pub fn evaluation_score(&self) -> Option<f64> {
        self.evaluation_score
    }

    #[must_use]
    pub fn evaluation_id(&self) -> Option<EvaluationId> {
        self.evaluation_id
    }

    #[must_use]
    pub fn feedback_summary(&self) -> Option<&str> {
        self.feedback_summary.as_deref()
    }

    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.is_skipped
    }

    #[must_use]
    pub fn skipped_at(&self) -> Option<DateTime<Utc>> {
        self.skipped_at
    }

    #[must_use]
    pub fn state(&self) -> ResponseState {
        if self.is_skipped {
            ResponseState::Skipped
        } else if self.answered_at.is_some() {
            ResponseState::Answered
        } else {
            ResponseState::Untouched
        }
    }

    /// True when this slot counts toward score averages: answered and scored.
    #[must_use]
    pub fn is_scored(&self) -> bool {
        !self.is_skipped && self.evaluation_score.is_some()
    }

    /// Applies answer text and its evaluation in one step.
    ///
    /// The session aggregate checks the slot is untouched before calling;
    /// callers outside this crate go through `InterviewSession`.
    pub(crate) fn apply_answer(
        &mut self,
        answer_text: String,
        time_spent_seconds: u32,
        score: f64,
        evaluation_id: EvaluationId,
        feedback_summary: String,
        now: DateTime<Utc>,
    ) {
        debug_assert_eq!(self.state(), ResponseState::Untouched);
        self.answer_text = Some(answer_text);
        self.time_spent_seconds = time_spent_seconds;
        self.answered_at = Some(now);
        self.evaluation_score = Some(score.clamp(0.0, 100.0));
        self.evaluation_id = Some(evaluation_id);
        self.feedback_summary = Some(feedback_summary);
    }

    /// Marks the slot skipped. Skips may still record elapsed time.
    pub(crate) fn apply_skip(&mut self, time_spent_seconds: u32, now: DateTime<Utc>) {
        debug_assert_eq!(self.state(), ResponseState::Untouched);
        self.is_skipped = true;
        self.skipped_at = Some(now);
        self.time_spent_seconds = time_spent_seconds;
    }
}
