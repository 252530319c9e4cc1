//! OpenAI-compatible LLM provider.
//!
//! Supports Perplexity, OpenAI, Azure OpenAI, Ollama, vLLM, LM Studio, and any
//! endpoint that follows the OpenAI chat completions API format.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use super::LlmProvider;
use crate::config::LlmConfig;
use crate::error::{ConfigError, LlmError};
use crate::types::{CompletionRequest, CompletionResponse, Message, TokenUsage};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// OpenAI-compatible LLM provider.
pub struct OpenAiCompatibleProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    provider: String,
    timeout_secs: u64,
}

impl OpenAiCompatibleProvider {
    /// Create a new provider from configuration.
    ///
    /// Reads the API key from `config.api_key` or the environment variable
    /// named by `config.api_key_env`.
    pub fn new(config: &LlmConfig) -> Result<Self, ConfigError> {
        let api_key = config.resolve_api_key()?;
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::Invalid {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url,
            api_key,
            model: config.model.clone(),
            provider: config.provider.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Convert internal messages to OpenAI JSON format.
    fn messages_to_json(messages: &[Message]) -> Vec<Value> {
        messages
            .iter()
            .map(|msg| {
                json!({
                    "role": msg.role.as_str(),
                    "content": msg.content,
                })
            })
            .collect()
    }

    /// Build the JSON request body.
    fn request_body(&self, request: &CompletionRequest) -> Value {
        let mut body = json!({
            "model": request.model.as_deref().unwrap_or(&self.model),
            "messages": Self::messages_to_json(&request.messages),
            "temperature": request.temperature,
            "stream": false,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        body
    }

    /// Parse an OpenAI-format response body into a CompletionResponse.
    fn parse_response(body: &Value, model: &str) -> Result<CompletionResponse, LlmError> {
        let choice =
            body.get("choices")
                .and_then(|c| c.get(0))
                .ok_or_else(|| LlmError::ResponseParse {
                    message: "No choices in response".to_string(),
                })?;

        let text = choice
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| LlmError::ResponseParse {
                message: "No text content in choice".to_string(),
            })?
            .to_string();

        let finish_reason = choice
            .get("finish_reason")
            .and_then(|f| f.as_str())
            .map(|s| s.to_string());

        let usage_obj = body.get("usage");
        let usage = TokenUsage {
            input_tokens: usage_obj
                .and_then(|u| u.get("prompt_tokens"))
                .and_then(|t| t.as_u64())
                .unwrap_or(0) as usize,
            output_tokens: usage_obj
                .and_then(|u| u.get("completion_tokens"))
                .and_then(|t| t.as_u64())
                .unwrap_or(0) as usize,
        };

        let resp_model = body
            .get("model")
            .and_then(|m| m.as_str())
            .unwrap_or(model)
            .to_string();

        Ok(CompletionResponse {
            text,
            usage,
            model: resp_model,
            finish_reason,
        })
    }

    /// Pull the provider's error message out of an OpenAI-style error body.
    fn error_message(body: &str) -> String {
        serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("message").or(Some(e)))
                    .and_then(|m| m.as_str())
                    .map(|s| s.to_string())
            })
            .unwrap_or_else(|| body.chars().take(200).collect())
    }

    /// Whether a 429 body describes an exhausted quota rather than a burst limit.
    fn is_quota_error(body: &str) -> bool {
        let code = serde_json::from_str::<Value>(body).ok().and_then(|v| {
            let err = v.get("error")?;
            err.get("code")
                .or_else(|| err.get("type"))
                .and_then(|c| c.as_str())
                .map(|s| s.to_string())
        });
        if code.as_deref() == Some("insufficient_quota") {
            return true;
        }
        let lower = body.to_lowercase();
        lower.contains("quota") || lower.contains("billing")
    }

    /// Retry-after seconds from the header, then the message hint, then a default.
    fn retry_after_secs(headers: &HeaderMap, body: &str) -> u64 {
        headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .or_else(|| {
                // "Rate limit reached ... try again in 7s"
                Self::error_message(body)
                    .split("in ")
                    .last()
                    .and_then(|s| s.trim().trim_end_matches('.').trim_end_matches('s').parse().ok())
            })
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
    }

    /// Map an HTTP status code to the appropriate LlmError.
    fn map_http_error(
        &self,
        status: reqwest::StatusCode,
        headers: &HeaderMap,
        body: &str,
    ) -> LlmError {
        match status.as_u16() {
            401 | 403 => {
                debug!(body = %body, status = status.as_u16(), "Authentication failed");
                LlmError::AuthFailed {
                    provider: self.provider.clone(),
                }
            }
            402 => LlmError::QuotaExceeded {
                message: Self::error_message(body),
            },
            429 if Self::is_quota_error(body) => LlmError::QuotaExceeded {
                message: Self::error_message(body),
            },
            429 => LlmError::RateLimited {
                retry_after_secs: Self::retry_after_secs(headers, body),
            },
            code if code >= 500 => LlmError::ServerError {
                status: code,
                message: Self::error_message(body),
            },
            code => LlmError::BadRequest {
                status: code,
                message: Self::error_message(body),
            },
        }
    }

    /// Map a transport-level failure.
    fn map_transport_error(&self, error: reqwest::Error) -> LlmError {
        if error.is_timeout() {
            LlmError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            LlmError::Connection {
                message: format!("Request failed: {}", error),
            }
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.request_body(&request);

        debug!(url = %url, model = %self.model, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let response_body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            return Err(self.map_http_error(status, &headers, &response_body));
        }

        let json: Value =
            serde_json::from_str(&response_body).map_err(|e| LlmError::ResponseParse {
                message: format!("Invalid JSON: {}", e),
            })?;

        Self::parse_response(&json, &self.model)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
