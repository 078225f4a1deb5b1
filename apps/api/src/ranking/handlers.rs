//! Axum route handlers for batch ranking and pairwise comparison.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::analysis::AnalysisError;
use crate::errors::AppError;
use crate::models::candidate::FullCandidateAnalysis;
use crate::models::job::JobDescriptionData;
use crate::ranking::comparison::{compare, CandidateComparison};
use crate::ranking::ranker::{CandidateInput, RankingResult};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    /// Correlation id for logs; generated when absent.
    pub request_id: Option<Uuid>,
    pub job_description: JobDescriptionData,
    pub resumes: Vec<CandidateInput>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CompareRequest {
    Cached {
        analysis_1: Box<FullCandidateAnalysis>,
        analysis_2: Box<FullCandidateAnalysis>,
        file_name_1: Option<String>,
        file_name_2: Option<String>,
    },
    OnDemand {
        job_description: JobDescriptionData,
        resume_1: Value,
        resume_2: Value,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/candidates/rank
///
/// Analyses every resume against the job description and ranks the successes.
/// The batch is cancelled on shutdown or when the client goes away.
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(request): Json<RankRequest>,
) -> Result<Json<RankingResult>, AppError> {
    let request_id = request.request_id.unwrap_or_else(Uuid::new_v4);
    let cancel = state.shutdown.child_token();
    // Dropping the request future cancels the batch.
    let _guard = cancel.clone().drop_guard();

    let result = state
        .ranking_engine()
        .rank(
            request.job_description,
            request.resumes,
            Utc::now().date_naive(),
            cancel,
            request_id,
        )
        .await?;

    Ok(Json(result))
}

/// POST /api/v1/candidates/compare
///
/// Compares two cached analyses, or analyses two resumes first.
pub async fn handle_compare(
    State(state): State<AppState>,
    Json(request): Json<CompareRequest>,
) -> Result<Json<CandidateComparison>, AppError> {
    let (analysis_1, analysis_2) = match request {
        CompareRequest::Cached {
            mut analysis_1,
            mut analysis_2,
            file_name_1,
            file_name_2,
        } => {
            if let Some(name) = file_name_1 {
                analysis_1.file_name = name;
            }
            if let Some(name) = file_name_2 {
                analysis_2.file_name = name;
            }
            (*analysis_1, *analysis_2)
        }
        CompareRequest::OnDemand {
            job_description,
            resume_1,
            resume_2,
        } => {
            if job_description.is_empty() {
                return Err(AppError::Validation(
                    "job_description must contain a title, skills or requirements".to_string(),
                ));
            }
            let analyzer = state.analyzer();
            let as_of = Utc::now().date_naive();
            tokio::task::spawn_blocking(move || {
                (
                    analyzer.analyze("resume_1", Some(&resume_1), &job_description, as_of),
                    analyzer.analyze("resume_2", Some(&resume_2), &job_description, as_of),
                )
            })
            .await
            .map_err(|e| AnalysisError::TaskFailed(e.to_string()))?
        }
    };

    Ok(Json(compare(&analysis_1, &analysis_2)?))
}
