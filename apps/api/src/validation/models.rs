use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Schema
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    Integer,
    CurrencyAmount,
    Date,
    Email,
    Boolean,
    List,
}

impl FieldType {
    pub fn label(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::CurrencyAmount => "currency amount",
            FieldType::Date => "date",
            FieldType::Email => "email address",
            FieldType::Boolean => "boolean",
            FieldType::List => "list",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    #[default]
    Optional,
    Required,
    /// Required, and counted twice in the document score.
    CriticalRequired,
}

impl Requirement {
    pub fn is_required(self) -> bool {
        !matches!(self, Requirement::Optional)
    }

    pub fn weight(self) -> f64 {
        match self {
            Requirement::CriticalRequired => 2.0,
            _ => 1.0,
        }
    }
}

/// What one expected field should look like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    pub name: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub requirement: Requirement,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
    /// Case-insensitive.
    #[serde(default)]
    pub allowed_values: Vec<String>,
    #[serde(default = "default_allow_future")]
    pub allow_future: bool,
    #[serde(default)]
    pub max_age_years: Option<u32>,
}

fn default_allow_future() -> bool {
    true
}

impl FieldRule {
    pub fn new(name: &str, field_type: FieldType, requirement: Requirement) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            requirement,
            pattern: None,
            min: None,
            max: None,
            min_length: None,
            max_length: None,
            allowed_values: Vec::new(),
            allow_future: true,
            max_age_years: None,
        }
    }

    pub fn pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }

    pub fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn length(mut self, min: usize, max: usize) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    pub fn allowed(mut self, values: &[&str]) -> Self {
        self.allowed_values = values.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn no_future(mut self) -> Self {
        self.allow_future = false;
        self
    }

    pub fn max_age(mut self, years: u32) -> Self {
        self.max_age_years = Some(years);
        self
    }
}

/// Ordered set of expected fields for one document type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSchema {
    pub document_type: String,
    pub fields: Vec<FieldRule>,
}

// ────────────────────────────────────────────────────────────────────────────
// Extractor output
// ────────────────────────────────────────────────────────────────────────────

/// A value as the extractor emitted it, before any normalisation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<RawValue>),
    Record(BTreeMap<String, RawValue>),
}

impl RawValue {
    /// Absent in substance: null, blank text or an empty list.
    pub fn is_missing(&self) -> bool {
        match self {
            RawValue::Null => true,
            RawValue::Text(s) => s.trim().is_empty(),
            RawValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "boolean",
            RawValue::Number(_) => "number",
            RawValue::Text(_) => "text",
            RawValue::List(_) => "list",
            RawValue::Record(_) => "object",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedField {
    pub name: String,
    pub raw_value: RawValue,
    pub source_confidence: f64,
}

/// What the upstream extractor returns for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionOutput {
    pub fields: BTreeMap<String, RawValue>,
    /// Per-field confidence in [0, 1]; absent fields count as fully confident.
    pub confidence: BTreeMap<String, f64>,
    pub page_count: Option<u32>,
    pub detected_type: Option<String>,
    pub detection_confidence: Option<f64>,
}

impl ExtractionOutput {
    pub fn field(&self, name: &str) -> Option<ExtractedField> {
        let raw_value = self.fields.get(name)?.clone();
        Some(ExtractedField {
            name: name.to_string(),
            raw_value,
            source_confidence: self.confidence.get(name).copied().unwrap_or(1.0),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Results
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    Unknown,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            ConfidenceLevel::High
        } else if score >= 0.5 {
            ConfidenceLevel::Medium
        } else if score > 0.0 {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::Unknown
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    Extracted,
    Normalized,
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldScore {
    pub field_name: String,
    pub score: f64,
    pub confidence: ConfidenceLevel,
    pub extracted_value: RawValue,
    pub source: FieldSource,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field_name: String,
    pub is_valid: bool,
    pub severity: IssueSeverity,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn critical(field_name: &str, message: impl Into<String>) -> Self {
        Self::new(field_name, false, IssueSeverity::Critical, message)
    }

    pub fn warning(field_name: &str, message: impl Into<String>) -> Self {
        Self::new(field_name, false, IssueSeverity::Warning, message)
    }

    pub fn info(field_name: &str, message: impl Into<String>) -> Self {
        Self::new(field_name, true, IssueSeverity::Info, message)
    }

    fn new(field_name: &str, is_valid: bool, severity: IssueSeverity, message: impl Into<String>) -> Self {
        Self {
            field_name: field_name.to_string(),
            is_valid,
            severity,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub is_valid: bool,
    /// Weighted mean of field scores, in [0, 1].
    pub overall_score: f64,
    pub field_scores: Vec<FieldScore>,
    pub issues: Vec<ValidationIssue>,
    pub critical_issues: usize,
    pub warning_issues: usize,
    pub fields_extracted: usize,
    pub fields_expected: usize,
}
