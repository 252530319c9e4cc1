//! HTTP server built on axum.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use super::{ApiError, AppState};
use crate::analyzer::Analyzer;
use crate::config::ServiceConfig;
use crate::error::AnalysisError;
use crate::types::{ComparisonRequest, ComparisonResponse};
use crate::validation::validate_request;

const SERVICE_NAME: &str = "comparison-tool-api";

/// Build the axum Router with `/`, `/health` and `/compare` routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/compare", post(compare_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Service discovery document.
async fn root_handler() -> impl IntoResponse {
    Json(json!({
        "message": "Comparison Tool API",
        "description": "LLM-powered comparison API that explains trade-offs without declaring winners",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/": "GET - this document",
            "/health": "GET - service health",
            "/compare": "POST - compare options against criteria",
        },
    }))
}

/// Health check endpoint.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "analyzer": state.analyzer.kind(),
        "uptime_secs": state.uptime_secs(),
    }))
}

/// Validate the body, run the analyzer, and shape the reply.
async fn compare_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ComparisonResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("compare", %request_id);

    async move {
        let raw: Value = serde_json::from_slice(&body).inspect_err(|e| {
            warn!(error = %e, "Rejected malformed JSON body");
        })?;
        let request = validate_request(&raw).inspect_err(|e| {
            warn!(violations = e.violations.len(), error = %e, "Rejected invalid request");
        })?;

        info!(
            options = request.options().len(),
            criteria = request.criteria().len(),
            has_context = request.context().is_some(),
            analyzer = state.analyzer.kind(),
            "Comparison request accepted"
        );

        let started = Instant::now();
        let report = analyze_with_timeout(&state, &request)
            .await
            .inspect_err(|e| {
                error!(kind = e.kind(), error = %e, "Analysis failed");
            })?;

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Comparison completed"
        );
        Ok::<_, ApiError>(Json(report))
    }
    .instrument(span)
    .await
}

async fn analyze_with_timeout(
    state: &AppState,
    request: &ComparisonRequest,
) -> Result<ComparisonResponse, AnalysisError> {
    let analysis = state.analyzer.analyze(request);
    match state.request_timeout {
        Some(limit) => tokio::time::timeout(limit, analysis)
            .await
            .unwrap_or(Err(AnalysisError::Timeout {
                timeout_secs: limit.as_secs(),
            })),
        None => analysis.await,
    }
}

/// Start the HTTP server on the configured address.
///
/// Runs until Ctrl-C, then drains in-flight requests.
pub async fn run(config: &ServiceConfig, analyzer: Arc<dyn Analyzer>) -> Result<(), std::io::Error> {
    let state = AppState::new(analyzer, config.server.request_timeout());
    let kind = state.analyzer.kind();
    let app = router(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, analyzer = kind, "Comparison Tool API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::MockAnalyzer;
    use async_trait::async_trait;
    use axum::body::Body;
    use std::time::Duration;
    use tower::ServiceExt;

    /// Analyzer that never finishes within any test timeout.
    struct StalledAnalyzer;

    #[async_trait]
    impl Analyzer for StalledAnalyzer {
        async fn analyze(
            &self,
            _request: &ComparisonRequest,
        ) -> Result<ComparisonResponse, AnalysisError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(AnalysisError::Timeout { timeout_secs: 60 })
        }

        fn kind(&self) -> &'static str {
            "stalled"
        }
    }

    fn mock_state() -> AppState {
        AppState::new(Arc::new(MockAnalyzer::new()), None)
    }

    async fn send(app: Router, req: axum::http::Request<Body>) -> (u16, Value) {
        let resp = ServiceExt::<axum::http::Request<Body>>::oneshot(app, req)
            .await
            .unwrap();
        let status = resp.status().as_u16();
        let body = axum::body::to_bytes(resp.into_body(), 100_000)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn post_compare(body: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method("POST")
            .uri("/compare")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_router_builds() {
        let _app = router(mock_state());
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let req = axum::http::Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(router(mock_state()), req).await;
        assert_eq!(status, 200);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "comparison-tool-api");
        assert_eq!(json["analyzer"], "mock");
        assert!(json["uptime_secs"].as_u64().unwrap() < 5);
    }

    #[tokio::test]
    async fn test_root_endpoint() {
        let req = axum::http::Request::builder()
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(router(mock_state()), req).await;
        assert_eq!(status, 200);
        assert_eq!(json["message"], "Comparison Tool API");
        assert!(json["endpoints"]["/compare"].is_string());
    }

    #[tokio::test]
    async fn test_compare_with_mock_analyzer() {
        let body = r#"{"question": "Q?", "options": ["A", "B"], "criteria": ["cost"]}"#;
        let (status, json) = send(router(mock_state()), post_compare(body)).await;
        assert_eq!(status, 200);
        assert_eq!(json["question"], "Q?");
        assert!(json["analysis"]["A"].is_object());
        assert!(json["analysis"]["B"].is_object());
        assert!(json["context_notes"].is_null());
    }

    #[tokio::test]
    async fn test_compare_timeout_is_500() {
        let state = AppState::new(Arc::new(StalledAnalyzer), Some(Duration::from_millis(20)));
        let body = r#"{"question": "Q?", "options": ["A", "B"], "criteria": ["cost"]}"#;
        let (status, json) = send(router(state), post_compare(body)).await;
        assert_eq!(status, 500);
        assert_eq!(json["error"], "Analysis failed");
    }

    #[tokio::test]
    async fn test_cors_headers_present() {
        let req = axum::http::Request::builder()
            .uri("/health")
            .header("origin", "http://example.com")
            .body(Body::empty())
            .unwrap();
        let resp = ServiceExt::<axum::http::Request<Body>>::oneshot(router(mock_state()), req)
            .await
            .unwrap();
        assert!(resp.headers().contains_key("access-control-allow-origin"));
    }
}
