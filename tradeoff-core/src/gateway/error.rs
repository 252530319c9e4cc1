//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::{AnalysisError, ValidationError};

/// Message returned for every internal failure. The cause is only logged.
pub const GENERIC_ANALYSIS_MESSAGE: &str =
    "The comparison could not be completed. Please try again later.";

/// Errors a `/compare` call can end in.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request body is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Analysis(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::MalformedJson(e) => json!({
                "error": "Invalid JSON",
                "message": "The request body could not be parsed as JSON.",
                "details": e.to_string(),
            }),
            ApiError::Validation(e) => json!({
                "error": "Validation failed",
                "message": e.to_string(),
                "details": e.violations,
            }),
            ApiError::Analysis(_) => json!({
                "error": "Analysis failed",
                "message": GENERIC_ANALYSIS_MESSAGE,
            }),
        };
        (self.status(), Json(body)).into_response()
    }
}
