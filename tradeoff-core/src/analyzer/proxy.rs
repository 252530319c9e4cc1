//! LLM-backed analyzer with bounded retry.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::Analyzer;
use crate::config::{RetryConfig, ServiceConfig};
use crate::error::{AnalysisError, LlmError};
use crate::parse;
use crate::prompt;
use crate::providers::LlmProvider;
use crate::types::{CompletionRequest, CompletionResponse, ComparisonRequest, ComparisonResponse};

/// Sends the rendered prompt to an [`LlmProvider`] and parses the reply.
pub struct AnalysisProxy {
    provider: Arc<dyn LlmProvider>,
    retry: RetryConfig,
    temperature: f32,
    max_tokens: usize,
}

impl AnalysisProxy {
    pub fn new(provider: Arc<dyn LlmProvider>, config: &ServiceConfig) -> Self {
        Self {
            provider,
            retry: config.retry.clone(),
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
        }
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Call the provider, retrying transient failures with exponential backoff.
    async fn complete_with_retry(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, AnalysisError> {
        let max_attempts = self.retry.max_attempts.max(1);

        let mut attempt = 1;
        loop {
            let error = match self.provider.complete(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if !e.is_transient() => return Err(AnalysisError::Upstream(e)),
                Err(e) => e,
            };

            if attempt >= max_attempts {
                return Err(AnalysisError::RetriesExhausted {
                    attempts: attempt,
                    source: error,
                });
            }

            let hint = match &error {
                LlmError::RateLimited { retry_after_secs } => {
                    Some(Duration::from_secs(*retry_after_secs))
                }
                _ => None,
            };
            let wait = self.retry.backoff(attempt, hint);
            info!(
                attempt,
                max_attempts,
                backoff_ms = wait.as_millis() as u64,
                error = %error,
                "Retrying after transient error"
            );
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }
}

#[async_trait]
impl Analyzer for AnalysisProxy {
    async fn analyze(
        &self,
        request: &ComparisonRequest,
    ) -> Result<ComparisonResponse, AnalysisError> {
        let completion = CompletionRequest {
            messages: prompt::build_messages(request),
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
            model: None,
        };

        let response = self.complete_with_retry(completion).await?;
        debug!(
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            finish_reason = ?response.finish_reason,
            "Completion received"
        );

        let report = parse::parse_response(request, &response.text).inspect_err(|e| {
            debug!(reason = %e.reason, raw = %e.raw, "Model output rejected");
        })?;

        let phrases = parse::winner_language(&report);
        if !phrases.is_empty() {
            warn!(phrases = ?phrases, "Model output contains winner-declaring language");
        }
        Ok(report)
    }

    fn kind(&self) -> &'static str {
        "llm"
    }
}
