//! Error types for the Tradeoff core library.
//!
//! Uses `thiserror` for public API error types with structured error variants
//! covering request validation, upstream LLM calls, model-output parsing,
//! and configuration.

use serde::Serialize;

/// Errors from the upstream text-generation service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LlmError {
    #[error("Provider connection failed: {message}")]
    Connection { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Provider server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Provider quota exceeded: {message}")]
    QuotaExceeded { message: String },

    #[error("Provider rejected the request ({status}): {message}")]
    BadRequest { status: u16, message: String },

    #[error("API response parse error: {message}")]
    ResponseParse { message: String },
}

impl LlmError {
    /// Whether the failure is worth retrying (network, timeout, rate limit, 5xx).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmError::Connection { .. }
                | LlmError::Timeout { .. }
                | LlmError::RateLimited { .. }
                | LlmError::ServerError { .. }
        )
    }
}

/// A single violated constraint on an inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Field path, e.g. `options` or `criteria[1]`.
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every structural violation found in a comparison request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} invalid field(s): {}", .violations.len(), join_violations(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Whether any violation refers to `field` or one of its elements.
    pub fn mentions(&self, field: &str) -> bool {
        self.violations
            .iter()
            .any(|v| v.field == field || v.field.starts_with(&format!("{field}[")))
    }
}

/// Model output could not be reconciled with the response shape.
///
/// The raw text is kept for logging and never rendered by `Display`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{reason}")]
pub struct ParseError {
    pub reason: String,
    pub raw: String,
}

impl ParseError {
    pub fn new(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            raw: raw.into(),
        }
    }
}

/// Umbrella error for everything that can go wrong inside the analysis proxy.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Upstream failed after {attempts} attempt(s): {source}")]
    RetriesExhausted { attempts: usize, source: LlmError },

    #[error("Upstream rejected the request: {0}")]
    Upstream(LlmError),

    #[error("Model output could not be parsed: {0}")]
    Parse(#[from] ParseError),

    #[error("Analysis timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

impl AnalysisError {
    /// Stable label for logs and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::RetriesExhausted { .. } => "upstream_transient",
            AnalysisError::Upstream(_) => "upstream_permanent",
            AnalysisError::Parse(_) => "parse",
            AnalysisError::Timeout { .. } => "timeout",
        }
    }
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not set: {var}")]
    EnvVarMissing { var: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}
