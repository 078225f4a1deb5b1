//! Preset schemas for the document types the extractor recognises.
//!
//! Each preset carries few enough optional fields that a document with every
//! required field clean clears the default validity threshold on its own.

use crate::validation::models::{DocumentSchema, FieldRule, FieldType, Requirement};
use crate::validation::ValidationError;

pub const INVOICE_NUMBER_PATTERN: &str = r"^[A-Za-z0-9\-_/]+$";
pub const CURRENCY_CODES: &[&str] = &["USD", "EUR", "GBP", "CAD", "AUD", "INR"];

/// Looks up the preset for a document type (case-insensitive).
pub fn preset_schema(document_type: &str) -> Result<DocumentSchema, ValidationError> {
    match document_type.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
        "invoice" => Ok(invoice_schema()),
        "resume" | "cv" => Ok(resume_schema()),
        "job_description" | "jd" => Ok(job_description_schema()),
        other => Err(ValidationError::UnknownDocumentType(other.to_string())),
    }
}

pub fn invoice_schema() -> DocumentSchema {
    use FieldType::*;
    use Requirement::*;
    DocumentSchema {
        document_type: "invoice".to_string(),
        fields: vec![
            FieldRule::new("invoice_number", Text, CriticalRequired)
                .pattern(INVOICE_NUMBER_PATTERN)
                .length(2, 50),
            FieldRule::new("total_amount", CurrencyAmount, CriticalRequired).range(Some(0.0), None),
            FieldRule::new("invoice_date", Date, Required).no_future().max_age(5),
            FieldRule::new("vendor_name", Text, Required),
            FieldRule::new("subtotal", CurrencyAmount, Optional).range(Some(0.0), None),
            FieldRule::new("tax_amount", CurrencyAmount, Optional).range(Some(0.0), None),
            FieldRule::new("currency", Text, Optional).allowed(CURRENCY_CODES),
            FieldRule::new("line_items", List, Optional),
        ],
    }
}

pub fn resume_schema() -> DocumentSchema {
    use FieldType::*;
    use Requirement::*;
    DocumentSchema {
        document_type: "resume".to_string(),
        fields: vec![
            FieldRule::new("candidate_name", Text, CriticalRequired).length(2, 120),
            FieldRule::new("email", Email, Optional),
            FieldRule::new("skills", List, Required),
            FieldRule::new("experience", List, Required),
            FieldRule::new("education", List, Optional),
            FieldRule::new("total_experience_years", Number, Optional).range(Some(0.0), Some(70.0)),
        ],
    }
}

pub fn job_description_schema() -> DocumentSchema {
    use FieldType::*;
    use Requirement::*;
    DocumentSchema {
        document_type: "job_description".to_string(),
        fields: vec![
            FieldRule::new("job_title", Text, CriticalRequired),
            FieldRule::new("required_skills", List, Required),
            FieldRule::new("preferred_skills", List, Optional),
            FieldRule::new("experience_years_min", Number, Optional).range(Some(0.0), Some(50.0)),
            FieldRule::new("required_education", Text, Optional),
        ],
    }
}
