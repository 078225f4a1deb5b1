use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::ranking::comparison::ComparisonError;
use crate::ranking::RankingError;
use crate::validation::ValidationError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Schema(#[from] ValidationError),

    #[error(transparent)]
    Ranking(#[from] RankingError),

    #[error(transparent)]
    Comparison(#[from] ComparisonError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Schema(e) => (StatusCode::BAD_REQUEST, "SCHEMA_ERROR", e.to_string()),
            AppError::Ranking(e) => (StatusCode::BAD_REQUEST, "BATCH_ERROR", e.to_string()),
            AppError::Comparison(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INCOMPARABLE",
                e.to_string(),
            ),
            AppError::Analysis(AnalysisError::TaskFailed(msg)) => {
                tracing::error!("Analysis task failed: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
            AppError::Analysis(e) => (StatusCode::UNPROCESSABLE_ENTITY, "ANALYSIS_ERROR", e.to_string()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
