use serde::{Deserialize, Serialize};
use std::fmt;

//
// ─── QUESTION TAXONOMY ─────────────────────────────────────────────────────────
//

/// Category of interview question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Technical,
    Behavioral,
    Situational,
    SystemDesign,
}

impl QuestionType {
    /// Types that count toward the technical sub-score.
    #[must_use]
    pub fn is_technical_like(self) -> bool {
        matches!(self, Self::Technical | Self::SystemDesign)
    }

    /// Types that count toward the behavioral sub-score.
    #[must_use]
    pub fn is_behavioral_like(self) -> bool {
        matches!(self, Self::Behavioral | Self::Situational)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Technical => "technical",
            Self::Behavioral => "behavioral",
            Self::Situational => "situational",
            Self::SystemDesign => "system_design",
        };
        write!(f, "{name}")
    }
}

/// Difficulty tag carried by every generated question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        };
        write!(f, "{name}")
    }
}

//
// ─── GENERATED QUESTIONS ───────────────────────────────────────────────────────
//

/// One question produced by the generator.
///
/// Immutable once generated; sessions copy these fields into their
/// per-question response slots at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question: String,
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub category: String,
    pub skills_tested: Vec<String>,
    pub expected_duration_minutes: u32,
}

/// Ordered set of questions for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionSet {
    pub questions: Vec<GeneratedQuestion>,
}

impl QuestionSet {
    #[must_use]
    pub fn new(questions: Vec<GeneratedQuestion>) -> Self {
        Self { questions }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Number of questions of the given type.
    #[must_use]
    pub fn count_of(&self, question_type: QuestionType) -> usize {
        self.questions
            .iter()
            .filter(|q| q.question_type == question_type)
            .count()
    }
}
