//! Thin gateway over an OpenAI-compatible chat-completions API.
//!
//! Collaborators depend on the `LanguageModel` trait; the concrete client
//! carries env-based configuration and bounded retry on transient failures.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE_MS: u64 = 200;
const BACKOFF_JITTER_MS: u64 = 100;

/// A chat-completion capability: prompt in, text out.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate free-form text from a prompt.
    ///
    /// # Errors
    ///
    /// Returns `LlmError` when the request cannot be completed.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Generate a JSON value from a prompt, tolerating markdown code fences
    /// around the payload.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MalformedJson` when the reply does not parse.
    async fn generate_json(&self, prompt: &str) -> Result<serde_json::Value, LlmError> {
        let raw = self.generate(prompt).await?;
        parse_json_payload(&raw)
    }
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl LlmConfig {
    /// Reads configuration from `PREP_AI_API_KEY`, `PREP_AI_BASE_URL`, and
    /// `PREP_AI_MODEL`. `None` when no API key is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("PREP_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("PREP_AI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let model = env::var("PREP_AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// HTTP client for the chat-completions endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    config: Option<LlmConfig>,
    max_attempts: u32,
}

impl LlmClient {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(LlmConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<LlmConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    async fn request(&self, config: &LlmConfig, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: 0.2,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LlmError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)?;

        Ok(content.trim().to_string())
    }

    fn backoff(attempt: u32) -> Duration {
        let jitter = rand::rng().random_range(0..BACKOFF_JITTER_MS);
        Duration::from_millis(BACKOFF_BASE_MS * u64::from(attempt) + jitter)
    }
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let config = self.config.as_ref().ok_or(LlmError::Disabled)?;

        let mut attempt = 1;
        loop {
            match self.request(config, prompt).await {
                Ok(text) => return Ok(text),
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    tracing::warn!(attempt, error = %err, "transient language model failure, retrying");
                    tokio::time::sleep(Self::backoff(attempt)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Extracts a JSON value from a model reply, stripping an optional markdown
/// code fence first.
///
/// # Errors
///
/// Returns `LlmError::MalformedJson` when the remaining text does not parse.
pub fn parse_json_payload(raw: &str) -> Result<serde_json::Value, LlmError> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map_or(trimmed, |rest| rest.strip_suffix("```").unwrap_or(rest));
    serde_json::from_str(body.trim()).map_err(|e| LlmError::MalformedJson(e.to_string()))
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
