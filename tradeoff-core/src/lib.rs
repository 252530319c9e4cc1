//! # Tradeoff Core
//!
//! Core library for the Comparison Tool API.
//! Validates decision-comparison requests, asks an LLM for a neutral
//! trade-off analysis, parses and reconciles its output, and serves the
//! result over HTTP.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod gateway;
pub mod parse;
pub mod prompt;
pub mod providers;
pub mod types;
pub mod validation;

// Re-export commonly used types at the crate root.
pub use analyzer::{AnalysisProxy, Analyzer, MockAnalyzer, build_analyzer};
pub use config::{AnalyzerMode, ConfigOverrides, ServiceConfig, load_config};
pub use error::{
    AnalysisError, ConfigError, FieldViolation, LlmError, ParseError, ValidationError,
};
pub use gateway::{ApiError, AppState};
pub use providers::{LlmProvider, MockLlmProvider, OpenAiCompatibleProvider};
pub use types::{ComparisonRequest, ComparisonResponse, OptionAnalysis};
pub use validation::validate_request;
