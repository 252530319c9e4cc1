//! Configuration system for Tradeoff.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! explicit config file -> environment -> CLI overrides. The configuration is
//! built once at process start and handed to the analyzer and gateway; nothing
//! reads the environment mid-request.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Default number of attempts for one upstream call (first try included).
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
/// Default base delay for exponential backoff, in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
/// Default upper bound for a single backoff delay, in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 8_000;

/// Top-level configuration for the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub analyzer: AnalyzerMode,
}

/// Which analyzer backs `/compare`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerMode {
    /// Call the configured text-generation service.
    #[default]
    Llm,
    /// Deterministic offline analysis, no network access.
    Mock,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Upper bound for one `/compare` call, in seconds (0 = no limit).
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_secs: 120,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

/// LLM provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider label used in logs and auth errors.
    pub provider: String,
    /// Model identifier (e.g., "sonar", "gpt-4o-mini").
    pub model: String,
    /// Base URL of an OpenAI-compatible chat completions API.
    pub base_url: Option<String>,
    /// Environment variable name containing the API key.
    pub api_key_env: String,
    /// Explicit API key; takes precedence over `api_key_env`. Never serialized.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens to generate in a response.
    pub max_tokens: usize,
    /// Per-attempt HTTP timeout, in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "perplexity".to_string(),
            model: "sonar".to_string(),
            base_url: Some("https://api.perplexity.ai".to_string()),
            api_key_env: "PERPLEXITY_API_KEY".to_string(),
            api_key: None,
            temperature: 0.7,
            max_tokens: 2000,
            timeout_secs: 30,
        }
    }
}

impl LlmConfig {
    /// Resolve the API key from the explicit value or the named env var.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::EnvVarMissing {
                var: self.api_key_env.clone(),
            })
    }
}

/// Retry policy for transient upstream failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, first try included.
    pub max_attempts: usize,
    /// Delay before the second attempt; doubles on each further attempt.
    pub base_delay_ms: u64,
    /// Cap for any single delay.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

impl RetryConfig {
    /// Total backoff sleep when every attempt fails, hints aside.
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts.max(1)).map(|n| self.backoff(n, None)).sum()
    }

    /// A policy that retries immediately, used by tests.
    pub fn immediate(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    /// Delay after the failed attempt number `attempt` (1-based).
    ///
    /// Exponential in the attempt number, raised to `hint` when the provider
    /// asked for a longer wait, and never above `max_delay_ms`.
    pub fn backoff(&self, attempt: usize, hint: Option<Duration>) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16) as u32;
        let computed = self.base_delay_ms.saturating_mul(1u64 << exponent);
        let hinted = hint.map(|h| h.as_millis() as u64).unwrap_or(0);
        Duration::from_millis(computed.max(hinted).min(self.max_delay_ms))
    }
}

impl ServiceConfig {
    /// Validate the configuration and return human-readable warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            warnings.push(format!(
                "llm.temperature ({}) is outside 0.0..=2.0",
                self.llm.temperature
            ));
        }
        if self.llm.max_tokens == 0 {
            warnings.push("llm.max_tokens is 0; the model cannot produce output".to_string());
        }
        if self.retry.max_attempts == 0 {
            warnings.push("retry.max_attempts is 0; treating it as 1".to_string());
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            warnings.push(format!(
                "retry.base_delay_ms ({}) exceeds retry.max_delay_ms ({}); every delay is capped",
                self.retry.base_delay_ms, self.retry.max_delay_ms
            ));
        }
        if let Some(limit) = self.server.request_timeout() {
            let worst = Duration::from_secs(self.llm.timeout_secs)
                .saturating_mul(self.retry.max_attempts.max(1) as u32)
                + self.retry.total_backoff();
            if worst > limit {
                warnings.push(format!(
                    "server.request_timeout_secs ({}) is shorter than a full retry run ({}s); \
                     late attempts will be cut off",
                    limit.as_secs(),
                    worst.as_secs()
                ));
            }
        }
        warnings
    }
}

/// Values set explicitly on the command line.
///
/// Only the fields that are `Some` are layered over the loaded configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub analyzer: Option<AnalyzerMode>,
}

/// Load configuration with layered merging.
///
/// Priority (highest first):
/// 1. Explicit overrides
/// 2. `HOST` / `PORT` environment variables
/// 3. Environment variables prefixed with `TRADEOFF_` (`TRADEOFF_LLM__MODEL`)
/// 4. Explicit config file
/// 5. User config (`~/.config/tradeoff/config.toml`)
/// 6. Built-in defaults
pub fn load_config(
    config_file: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<ServiceConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(ServiceConfig::default()));

    if let Some(dirs) = directories::ProjectDirs::from("dev", "tradeoff", "tradeoff") {
        let user_config = dirs.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(path) = config_file {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("TRADEOFF_").split("__"));
    figment = figment.merge(
        Env::raw()
            .only(&["host", "port"])
            .map(|key| format!("server.{}", key.as_str().to_ascii_lowercase()).into()),
    );

    if let Some(host) = &overrides.host {
        figment = figment.merge(Serialized::default("server.host", host));
    }
    if let Some(port) = overrides.port {
        figment = figment.merge(Serialized::default("server.port", port));
    }
    if let Some(mode) = overrides.analyzer {
        figment = figment.merge(Serialized::default("analyzer", mode));
    }

    figment.extract().map_err(Box::new)
}
