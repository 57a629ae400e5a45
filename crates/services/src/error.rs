//! Shared error types for the services crate.

use thiserror::Error;

use prep_core::model::{ComparisonError, SessionId, SessionStateError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the LLM gateway.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LlmError {
    #[error("language model is not configured")]
    Disabled,
    #[error("language model returned an empty response")]
    EmptyResponse,
    #[error("language model request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("language model returned malformed JSON: {0}")]
    MalformedJson(String),
}

impl LlmError {
    /// Transient failures are worth retrying: rate limiting, server errors,
    /// and transport-level failures.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpStatus(status) => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            Self::Http(_) => true,
            Self::Disabled | Self::EmptyResponse | Self::MalformedJson(_) => false,
        }
    }
}

/// Errors emitted by question generator implementations.
///
/// The bundled generator degrades to its template bank instead of surfacing
/// LLM failures; this exists for implementations without a fallback.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GeneratorError {
    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Errors emitted by answer evaluator implementations.
///
/// The bundled evaluator falls back to its heuristic scorer, so callers
/// normally never see these; a failure here reaches the session manager
/// unmodified and aborts the submission before any mutation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EvaluatorError {
    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Errors emitted by `SessionManager` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionManagerError {
    #[error("session {0} not found")]
    SessionNotFound(SessionId),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    State(#[from] SessionStateError),
    #[error(transparent)]
    Comparison(#[from] ComparisonError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Evaluator(#[from] EvaluatorError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
