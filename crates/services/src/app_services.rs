use std::sync::Arc;

use prep_core::Clock;
use storage::repository::Storage;

use crate::answer_evaluator::AnswerEvaluator;
use crate::error::AppServicesError;
use crate::llm::{LanguageModel, LlmClient};
use crate::question_generator::QuestionGenerator;
use crate::sessions::SessionManager;

/// Assembles the engine: storage, the LLM gateway, the generator and
/// evaluator built on it, and the session manager on top.
#[derive(Clone)]
pub struct AppServices {
    session_manager: Arc<SessionManager>,
    llm_enabled: bool,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, clock))
    }

    /// Build services on the in-memory repository, for tests and demos.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(Storage::in_memory(), clock)
    }

    fn from_storage(storage: Storage, clock: Clock) -> Self {
        let client = LlmClient::from_env();
        let llm_enabled = client.enabled();
        if !llm_enabled {
            tracing::info!("no language model configured, generator and evaluator use fallbacks");
        }
        let model: Arc<dyn LanguageModel> = Arc::new(client);

        let generator = Arc::new(QuestionGenerator::new(Arc::clone(&model)));
        let evaluator = Arc::new(AnswerEvaluator::new(model));
        let session_manager = Arc::new(SessionManager::new(
            clock,
            storage.sessions,
            storage.progress,
            generator,
            evaluator,
        ));

        Self {
            session_manager,
            llm_enabled,
        }
    }

    #[must_use]
    pub fn session_manager(&self) -> Arc<SessionManager> {
        Arc::clone(&self.session_manager)
    }

    /// Whether a real language model is configured, as opposed to the
    /// deterministic fallbacks.
    #[must_use]
    pub fn llm_enabled(&self) -> bool {
        self.llm_enabled
    }
}
