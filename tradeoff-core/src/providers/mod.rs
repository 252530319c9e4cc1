//! LLM provider abstraction.
//!
//! The analysis proxy only ever talks to an [`LlmProvider`]: one prompt in,
//! one text completion out. The production implementation speaks the
//! OpenAI chat-completions wire format, which Perplexity, OpenAI, Ollama,
//! vLLM and friends all accept.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatibleProvider;

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

use crate::config::LlmConfig;
use crate::error::{ConfigError, LlmError};
use crate::types::{CompletionRequest, CompletionResponse, TokenUsage};

/// Trait for LLM providers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Perform a full completion and return the response.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Return the model name.
    fn model_name(&self) -> &str;
}

/// Create the configured provider, resolving its API key.
///
/// A missing key is a startup error, never an upstream one.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, ConfigError> {
    let provider = OpenAiCompatibleProvider::new(config)?;
    info!(
        provider = %config.provider,
        model = %config.model,
        base_url = provider.base_url(),
        "LLM provider ready"
    );
    Ok(Arc::new(provider))
}

/// A scripted LLM provider for tests and local development.
///
/// Outcomes are returned in queue order; once the queue is drained every call
/// fails with a connection error so a test never silently passes on a
/// response it did not script.
pub struct MockLlmProvider {
    model: String,
    outcomes: Mutex<VecDeque<Result<CompletionResponse, LlmError>>>,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl MockLlmProvider {
    pub fn new() -> Self {
        Self {
            model: "mock-model".to_string(),
            outcomes: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a provider whose first call returns `text`.
    pub fn with_response(text: &str) -> Self {
        let provider = Self::new();
        provider.queue_response(text);
        provider
    }

    /// Queue a successful completion with the given text.
    pub fn queue_response(&self, text: &str) {
        self.push(Ok(Self::text_response(text)));
    }

    /// Queue a failure.
    pub fn queue_error(&self, error: LlmError) {
        self.push(Err(error));
    }

    fn push(&self, outcome: Result<CompletionResponse, LlmError>) {
        self.outcomes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(outcome);
    }

    /// Number of `complete` calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request received, if any.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Create a simple text response.
    pub fn text_response(text: &str) -> CompletionResponse {
        CompletionResponse {
            text: text.to_string(),
            usage: TokenUsage {
                input_tokens: 100,
                output_tokens: 50,
            },
            model: "mock-model".to_string(),
            finish_reason: Some("stop".to_string()),
        }
    }
}

impl Default for MockLlmProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request);
        self.outcomes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .unwrap_or_else(|| {
                Err(LlmError::Connection {
                    message: "mock provider has no scripted responses left".to_string(),
                })
            })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
