//! Axum route handler for single-candidate analysis.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::analysis::AnalysisError;
use crate::errors::AppError;
use crate::models::candidate::FullCandidateAnalysis;
use crate::models::job::JobDescriptionData;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub job_description: JobDescriptionData,
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// Parsed resume as the upstream parser produced it; shape is checked by the analyzer.
    #[serde(default)]
    pub resume: Option<Value>,
}

fn default_file_name() -> String {
    "resume".to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/candidates/analyze
///
/// Analyses one resume against one job description. A resume that cannot be
/// parsed comes back as `success: false`; a missing job description is a 400.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<FullCandidateAnalysis>, AppError> {
    if request.job_description.is_empty() {
        return Err(AppError::Validation(
            "job_description must contain a title, skills or requirements".to_string(),
        ));
    }

    let analyzer = state.analyzer();
    let as_of = Utc::now().date_naive();
    let analysis = tokio::task::spawn_blocking(move || {
        analyzer.analyze(
            &request.file_name,
            request.resume.as_ref(),
            &request.job_description,
            as_of,
        )
    })
    .await
    .map_err(|e| AnalysisError::TaskFailed(e.to_string()))?;

    Ok(Json(analysis))
}
