//! Language Model Gateway
//!
//! Uniform call interface over the generation backends. Backends are
//! polymorphic over one capability: accept ordered chat messages,
//! return text. Production code uses `OllamaBackend` or
//! `OpenAiCompatBackend`; test code uses `ScriptedBackend` with
//! pre-configured replies and no network.
//!
//! The gateway post-processes every response: `<think>...</think>`
//! reasoning spans are removed unconditionally and the remainder is
//! trimmed. Backend failures surface as `LlmError`, never as error
//! text pretending to be an answer.

pub mod ollama;
pub mod openai_compat;

use crate::config::LlmProvider;
use crate::message::ChatMessage;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

pub use ollama::OllamaBackend;
pub use openai_compat::OpenAiCompatBackend;

/// LLM gateway errors
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(String),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed backend response: {0}")]
    Malformed(String),
}

/// Trait abstraction over chat-completion backends
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send ordered messages to the backend and return the raw reply text
    async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<String, LlmError>;

    /// List model identifiers available from the backend
    async fn list_models(&self) -> Result<Vec<String>, LlmError>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

/// Matches one reasoning span, non-greedy, across newlines
static THINK_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("hardcoded regex"));

/// Remove `<think>...</think>` spans and trim surrounding whitespace.
/// Text outside the marker spans is left untouched.
pub fn strip_reasoning(text: &str) -> String {
    THINK_SPAN.replace_all(text, "").trim().to_string()
}

/// Uniform call interface over one generation backend
pub struct LlmGateway {
    backend: Box<dyn ChatBackend>,
    model: String,
}

impl LlmGateway {
    /// Build the gateway for a configured provider
    pub fn for_provider(provider: LlmProvider, model: impl Into<String>) -> Self {
        let backend: Box<dyn ChatBackend> = match provider {
            LlmProvider::Ollama => Box::new(OllamaBackend::new()),
            LlmProvider::LmStudio => Box::new(OpenAiCompatBackend::new()),
        };
        Self {
            backend,
            model: model.into(),
        }
    }

    /// Build the gateway around an arbitrary backend (used by tests)
    pub fn with_backend(backend: Box<dyn ChatBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    /// Primary generation model
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate a reply to the full conversation with the primary model
    pub async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.generate_with_model(&self.model, messages).await
    }

    /// Generate a reply with an explicit model (pipeline stages may use
    /// a different model than the primary one)
    pub async fn generate_with_model(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<String, LlmError> {
        info!(
            "[>]  LLM call [{}] via {} ({} messages)",
            model,
            self.backend.name(),
            messages.len()
        );

        let raw = self.backend.chat(model, messages).await?;
        let cleaned = strip_reasoning(&raw);

        debug!(
            "[<]  LLM response ({} chars raw, {} after cleanup)",
            raw.len(),
            cleaned.len()
        );
        Ok(cleaned)
    }

    /// One-shot helper: send a single user prompt, return the cleaned reply
    pub async fn prompt(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        self.generate_with_model(model, &[ChatMessage::user(prompt)])
            .await
    }

    /// List models available from the backend
    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        self.backend.list_models().await
    }
}

// ============================================================================
// Scripted backend (testing)
// ============================================================================

/// Chat backend with pre-configured replies for deterministic tests.
///
/// Replies are consumed in order; an exhausted script is an error so a
/// test that triggers more LLM calls than it scripted fails loudly.
/// Clones share the same script and call log.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    replies: Arc<Mutex<VecDeque<Result<String, String>>>>,
    calls: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn push_reply(&self, text: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(text.into()));
    }

    /// Queue a transport failure
    pub fn push_failure(&self, message: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Err(message.into()));
    }

    /// Number of chat calls received so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Messages passed to the n-th chat call (0-based)
    pub fn call(&self, n: usize) -> Vec<ChatMessage> {
        self.calls.lock().unwrap()[n].clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn chat(&self, _model: &str, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(messages.to_vec());

        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(LlmError::Network(message)),
            None => Err(LlmError::Network("scripted replies exhausted".to_string())),
        }
    }

    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        Ok(vec![])
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
