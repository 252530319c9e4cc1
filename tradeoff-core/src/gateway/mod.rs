//! # HTTP Gateway
//!
//! JSON-over-HTTP surface of the service: a discovery document at `/`, a
//! health probe at `/health`, and the comparison endpoint at `/compare`.

mod error;
mod server;

pub use error::ApiError;
pub use server::{router, run};

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::analyzer::Analyzer;

/// Shared state handed to every handler.
///
/// Immutable after startup; handlers never write to it.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<dyn Analyzer>,
    /// Upper bound for one analysis (`None` = unbounded).
    pub request_timeout: Option<Duration>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(analyzer: Arc<dyn Analyzer>, request_timeout: Option<Duration>) -> Self {
        Self {
            analyzer,
            request_timeout,
            started_at: Utc::now(),
        }
    }

    /// Uptime in seconds since the state was created.
    pub fn uptime_secs(&self) -> u64 {
        (Utc::now() - self.started_at).num_seconds().max(0) as u64
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("analyzer", &self.analyzer.kind())
            .field("request_timeout", &self.request_timeout)
            .field("started_at", &self.started_at)
            .finish()
    }
}
