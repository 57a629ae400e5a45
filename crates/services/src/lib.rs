#![forbid(unsafe_code)]

pub mod answer_evaluator;
pub mod app_services;
pub mod error;
pub mod llm;
pub mod question_generator;
pub mod sessions;

pub use prep_core::Clock;

pub use answer_evaluator::{AnswerEvaluator, EvaluateAnswers, EvaluationRequest};
pub use app_services::AppServices;
pub use error::{EvaluatorError, GeneratorError, LlmError, SessionManagerError};
pub use llm::{LanguageModel, LlmClient, LlmConfig};
pub use question_generator::{GenerateQuestions, GenerationRequest, QuestionGenerator};
pub use sessions::{CreateSessionRequest, SessionManager};
