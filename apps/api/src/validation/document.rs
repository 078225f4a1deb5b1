//! Document-level validation: every expected field scored once, then folded
//! into a single `ValidationSummary`.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::validation::consistency;
use crate::validation::field::FieldValidator;
use crate::validation::models::{
    DocumentSchema, ExtractionOutput, IssueSeverity, ValidationSummary,
};
use crate::validation::ValidationError;

pub const DEFAULT_MIN_VALID_SCORE: f64 = 0.5;

/// A schema whose rules have been checked and compiled.
#[derive(Debug, Clone)]
pub struct DocumentValidationAggregator {
    document_type: String,
    validators: Vec<FieldValidator>,
    min_valid_score: f64,
}

impl DocumentValidationAggregator {
    /// Fails on structural schema problems; nothing is scored until the schema is sound.
    pub fn new(schema: DocumentSchema, min_valid_score: f64) -> Result<Self, ValidationError> {
        if schema.fields.is_empty() {
            return Err(ValidationError::EmptySchema);
        }
        let mut seen = HashSet::new();
        for rule in &schema.fields {
            if !seen.insert(rule.name.trim().to_string()) {
                return Err(ValidationError::DuplicateField(rule.name.clone()));
            }
        }
        let validators = schema
            .fields
            .into_iter()
            .map(FieldValidator::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            document_type: schema.document_type,
            validators,
            min_valid_score: min_valid_score.clamp(0.0, 1.0),
        })
    }

    pub fn document_type(&self) -> &str {
        &self.document_type
    }

    pub fn validate(&self, output: &ExtractionOutput, as_of: NaiveDate) -> ValidationSummary {
        let mut field_scores = Vec::with_capacity(self.validators.len());
        let mut issues = Vec::new();
        let mut weighted = 0.0;
        let mut total_weight = 0.0;

        for validator in &self.validators {
            let rule = validator.rule();
            let extracted = output.field(&rule.name);
            let (score, field_issues) = validator.validate(extracted.as_ref(), as_of);

            let weight = rule.requirement.weight();
            weighted += score.score * weight;
            total_weight += weight;

            field_scores.push(score);
            issues.extend(field_issues);
        }

        if self.document_type.eq_ignore_ascii_case("invoice") {
            issues.extend(consistency::check_invoice(output));
        }

        let overall_score = if total_weight > 0.0 {
            ((weighted / total_weight) * 1000.0).round() / 1000.0
        } else {
            0.0
        };
        let critical_issues = issues.iter().filter(|i| i.severity == IssueSeverity::Critical).count();
        let warning_issues = issues.iter().filter(|i| i.severity == IssueSeverity::Warning).count();
        let fields_extracted = field_scores.iter().filter(|s| s.score > 0.0).count();

        let summary = ValidationSummary {
            is_valid: critical_issues == 0 && overall_score >= self.min_valid_score,
            overall_score,
            fields_expected: field_scores.len(),
            field_scores,
            issues,
            critical_issues,
            warning_issues,
            fields_extracted,
        };
        debug!(
            document_type = %self.document_type,
            overall_score = summary.overall_score,
            critical = summary.critical_issues,
            warnings = summary.warning_issues,
            "Document validated"
        );
        summary
    }
}

/// One-shot helper for callers that validate a schema only once.
pub fn validate(
    schema: DocumentSchema,
    output: &ExtractionOutput,
    min_valid_score: f64,
    as_of: NaiveDate,
) -> Result<ValidationSummary, ValidationError> {
    Ok(DocumentValidationAggregator::new(schema, min_valid_score)?.validate(output, as_of))
}
