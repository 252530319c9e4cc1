//! Analyzers turn a validated request into a trade-off report.
//!
//! [`AnalysisProxy`] asks the configured LLM; [`MockAnalyzer`] produces a
//! deterministic report offline. The gateway only sees `dyn Analyzer`.

pub mod mock;
pub mod proxy;

pub use mock::MockAnalyzer;
pub use proxy::AnalysisProxy;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::config::{AnalyzerMode, ServiceConfig};
use crate::error::{AnalysisError, ConfigError};
use crate::providers::create_provider;
use crate::types::{ComparisonRequest, ComparisonResponse};

/// Produces a [`ComparisonResponse`] for a validated request.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(
        &self,
        request: &ComparisonRequest,
    ) -> Result<ComparisonResponse, AnalysisError>;

    /// Short label reported by `/health` ("llm" or "mock").
    fn kind(&self) -> &'static str;
}

/// Build the analyzer selected by `config.analyzer`.
///
/// In `llm` mode a missing API key is an error; there is no fallback to the
/// offline analyzer.
pub fn build_analyzer(config: &ServiceConfig) -> Result<Arc<dyn Analyzer>, ConfigError> {
    match config.analyzer {
        AnalyzerMode::Mock => {
            info!("Using offline mock analyzer");
            Ok(Arc::new(MockAnalyzer::new()))
        }
        AnalyzerMode::Llm => {
            let provider = create_provider(&config.llm)?;
            info!(max_attempts = config.retry.max_attempts, "Using LLM analyzer");
            Ok(Arc::new(AnalysisProxy::new(provider, config)))
        }
    }
}
