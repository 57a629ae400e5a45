mod analytics;
mod evaluation;
mod ids;
mod learning_path;
mod milestone;
mod progress;
mod question;
mod response;
mod session;
pub(crate) mod stats;

pub use analytics::{AnalyticsPeriod, ComparisonError, ProgressAnalytics, SessionComparison};
pub use evaluation::{
    AnswerEvaluation, CriterionScore, FeedbackItem, FeedbackKind, HiringRecommendation,
    ScoreLevel, SessionSummary, SummaryError,
};
pub use ids::{EvaluationId, ParseIdError, SessionId, UserId};
pub use learning_path::{ChecklistItem, LearningPath, LearningResource, ProficiencyTier};
pub use milestone::{milestone_catalog, MilestoneDef, MilestoneMetric, MilestoneStatus};
pub use progress::UserProgress;
pub use question::{Difficulty, GeneratedQuestion, QuestionSet, QuestionType};
pub use response::{QuestionResponse, ResponseState};
pub use session::{
    ExperienceLevel, InterviewMode, InterviewSession, SessionConfig, SessionKind,
    SessionStateError, SessionStatus,
};
