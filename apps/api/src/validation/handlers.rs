//! Axum route handler for document validation.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;

use crate::errors::AppError;
use crate::state::AppState;
use crate::validation::document::DocumentValidationAggregator;
use crate::validation::models::{DocumentSchema, ExtractionOutput, ValidationSummary};
use crate::validation::schemas::preset_schema;
use crate::validation::ValidationError;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub document_type: Option<String>,
    pub schema: Option<DocumentSchema>,
    pub extraction: ExtractionOutput,
}

impl ValidateRequest {
    /// An explicit schema wins; otherwise the preset for the named or detected type.
    fn resolve_schema(&self) -> Result<DocumentSchema, ValidationError> {
        if let Some(schema) = &self.schema {
            return Ok(schema.clone());
        }
        let document_type = self
            .document_type
            .as_deref()
            .or(self.extraction.detected_type.as_deref())
            .ok_or(ValidationError::MissingSchema)?;
        preset_schema(document_type)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/validate
///
/// Scores an extractor's output against a schema. Per-field problems come back
/// as issues in the summary; only a broken schema is an error.
pub async fn handle_validate(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> Result<Json<ValidationSummary>, AppError> {
    let schema = request.resolve_schema()?;
    let aggregator =
        DocumentValidationAggregator::new(schema, state.config.scoring.min_validation_score)?;

    let summary = aggregator.validate(&request.extraction, Utc::now().date_naive());
    tracing::info!(
        document_type = aggregator.document_type(),
        is_valid = summary.is_valid,
        overall_score = summary.overall_score,
        "Validation complete"
    );
    Ok(Json(summary))
}
