//! Scores one extracted field against its rule.
//!
//! Scoring starts at 1.0 and only ever goes down: a value of the wrong kind scores
//! 0 (kept, with a warning), a constraint violation caps at 0.6, and the
//! extractor's own confidence multiplies whatever is left. Absent fields score 0
//! rather than failing.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::parsing::{parse_amount, parse_date};
use crate::validation::models::{
    ConfidenceLevel, ExtractedField, FieldRule, FieldScore, FieldSource, FieldType, RawValue,
    ValidationIssue,
};
use crate::validation::ValidationError;

const CONSTRAINT_CAP: f64 = 0.6;
const LOW_SOURCE_CONFIDENCE: f64 = 0.5;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});
static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid iso date regex"));

/// A value coerced into the rule's type.
#[derive(Debug, Clone, PartialEq)]
enum Typed {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
    List(usize),
}

/// Outcome of coercing a raw value into the expected type.
#[derive(Debug, Clone, PartialEq)]
enum Coercion {
    Exact(Typed),
    Normalized(Typed),
    /// Usable, but not the kind the rule asks for.
    WrongKind,
    Unrepresentable,
}

/// A rule with its pattern compiled once.
#[derive(Debug, Clone)]
pub struct FieldValidator {
    rule: FieldRule,
    pattern: Option<Regex>,
}

impl FieldValidator {
    pub fn new(rule: FieldRule) -> Result<Self, ValidationError> {
        if rule.name.trim().is_empty() {
            return Err(ValidationError::BlankFieldName);
        }
        if let (Some(min), Some(max)) = (rule.min, rule.max) {
            if min > max {
                return Err(ValidationError::InvalidRange {
                    field: rule.name.clone(),
                    min: min.to_string(),
                    max: max.to_string(),
                });
            }
        }
        if let (Some(min), Some(max)) = (rule.min_length, rule.max_length) {
            if min > max {
                return Err(ValidationError::InvalidRange {
                    field: rule.name.clone(),
                    min: min.to_string(),
                    max: max.to_string(),
                });
            }
        }
        let pattern = match rule.pattern.as_deref() {
            Some(p) => Some(Regex::new(p).map_err(|e| ValidationError::InvalidPattern {
                field: rule.name.clone(),
                message: e.to_string(),
            })?),
            None => None,
        };
        Ok(Self { rule, pattern })
    }

    pub fn rule(&self) -> &FieldRule {
        &self.rule
    }

    /// Scores the field. `None` means the extractor did not return it at all.
    pub fn validate(&self, field: Option<&ExtractedField>, as_of: NaiveDate) -> (FieldScore, Vec<ValidationIssue>) {
        let name = self.rule.name.as_str();
        let field = match field {
            Some(f) if !f.raw_value.is_missing() => f,
            _ => return self.missing(),
        };

        let mut issues = Vec::new();
        let mut warnings = Vec::new();
        let mut score: f64 = 1.0;
        let mut source = FieldSource::Extracted;

        let typed = match self.coerce(&field.raw_value) {
            Coercion::Exact(v) => Some(v),
            Coercion::Normalized(v) => {
                source = FieldSource::Normalized;
                Some(v)
            }
            Coercion::WrongKind => {
                let message = format!(
                    "Expected {}, got {}",
                    self.rule.field_type.label(),
                    field.raw_value.kind()
                );
                score = 0.0;
                warnings.push(message.clone());
                issues.push(
                    ValidationIssue::warning(name, message)
                        .with_suggestion(format!("Check that {name} was read from the right place")),
                );
                source = FieldSource::Normalized;
                None
            }
            Coercion::Unrepresentable => {
                let message = format!(
                    "{name} cannot be read as {} (got {})",
                    self.rule.field_type.label(),
                    field.raw_value.kind()
                );
                let issue = if self.rule.requirement.is_required() {
                    ValidationIssue::critical(name, message.clone())
                } else {
                    ValidationIssue::warning(name, message.clone())
                };
                issues.push(issue);
                let score = FieldScore {
                    field_name: name.to_string(),
                    score: 0.0,
                    confidence: ConfidenceLevel::Unknown,
                    extracted_value: field.raw_value.clone(),
                    source: FieldSource::Extracted,
                    warnings: vec![message],
                };
                return (score, issues);
            }
        };

        if let Some(value) = &typed {
            for violation in self.violations(value, as_of) {
                score = score.min(CONSTRAINT_CAP);
                warnings.push(violation.clone());
                issues.push(ValidationIssue::warning(name, violation));
            }
        }

        let source_confidence = field.source_confidence.clamp(0.0, 1.0);
        score *= source_confidence;
        if source_confidence < LOW_SOURCE_CONFIDENCE {
            warnings.push(format!("Low extraction confidence ({source_confidence:.2})"));
        }

        let score = (score * 1000.0).round() / 1000.0;
        (
            FieldScore {
                field_name: name.to_string(),
                score,
                confidence: ConfidenceLevel::from_score(score),
                extracted_value: field.raw_value.clone(),
                source,
                warnings,
            },
            issues,
        )
    }

    fn missing(&self) -> (FieldScore, Vec<ValidationIssue>) {
        let name = self.rule.name.as_str();
        let issue = if self.rule.requirement.is_required() {
            ValidationIssue::critical(name, format!("Required field {name} is missing"))
                .with_suggestion("Check the document for this field or re-run extraction")
        } else {
            ValidationIssue::info(name, format!("Optional field {name} was not found"))
        };
        (
            FieldScore {
                field_name: name.to_string(),
                score: 0.0,
                confidence: ConfidenceLevel::Unknown,
                extracted_value: RawValue::Null,
                source: FieldSource::Missing,
                warnings: Vec::new(),
            },
            vec![issue],
        )
    }

    fn coerce(&self, raw: &RawValue) -> Coercion {
        use Coercion::*;
        match (self.rule.field_type, raw) {
            (_, RawValue::Null) | (_, RawValue::Record(_)) => Unrepresentable,

            (FieldType::Text, RawValue::Text(s)) => Exact(Typed::Text(s.trim().to_string())),
            (FieldType::Text, RawValue::Number(_) | RawValue::Bool(_)) => WrongKind,

            (FieldType::Email, RawValue::Text(s)) => Exact(Typed::Text(s.trim().to_string())),

            (FieldType::Number | FieldType::CurrencyAmount, RawValue::Number(n)) => Exact(Typed::Number(*n)),
            (FieldType::Number | FieldType::CurrencyAmount, RawValue::Text(s)) => {
                match parse_amount(s) {
                    Some(n) => Normalized(Typed::Number(n)),
                    None => Unrepresentable,
                }
            }

            (FieldType::Integer, RawValue::Number(n)) if n.fract() == 0.0 => Exact(Typed::Number(*n)),
            (FieldType::Integer, RawValue::Number(_)) => WrongKind,
            (FieldType::Integer, RawValue::Text(s)) => match parse_amount(s) {
                Some(n) if n.fract() == 0.0 => Normalized(Typed::Number(n)),
                Some(_) => WrongKind,
                None => Unrepresentable,
            },

            (FieldType::Date, RawValue::Text(s)) => match parse_date(s) {
                Some(d) if ISO_DATE.is_match(s.trim()) => Exact(Typed::Date(d)),
                Some(d) => Normalized(Typed::Date(d)),
                None => Unrepresentable,
            },
            // A bare year.
            (FieldType::Date, RawValue::Number(n)) if n.fract() == 0.0 && (1900.0..=2100.0).contains(n) => {
                WrongKind
            }

            (FieldType::Boolean, RawValue::Bool(b)) => Exact(Typed::Bool(*b)),
            (FieldType::Boolean, RawValue::Text(s)) => match s.trim().to_lowercase().as_str() {
                "true" => Normalized(Typed::Bool(true)),
                "false" => Normalized(Typed::Bool(false)),
                "yes" | "y" | "1" => WrongKind,
                "no" | "n" | "0" => WrongKind,
                _ => Unrepresentable,
            },
            (FieldType::Boolean, RawValue::Number(n)) if *n == 0.0 || *n == 1.0 => WrongKind,

            (FieldType::List, RawValue::List(items)) => Exact(Typed::List(items.len())),
            (FieldType::List, RawValue::Text(_) | RawValue::Number(_) | RawValue::Bool(_)) => WrongKind,

            _ => Unrepresentable,
        }
    }

    fn violations(&self, value: &Typed, as_of: NaiveDate) -> Vec<String> {
        let rule = &self.rule;
        let name = rule.name.as_str();
        let mut out = Vec::new();

        match value {
            Typed::Text(text) => {
                if rule.field_type == FieldType::Email && !EMAIL.is_match(text) {
                    out.push(format!("{name} is not a valid email address"));
                }
                if let Some(pattern) = &self.pattern {
                    if !pattern.is_match(text) {
                        out.push(format!("{name} does not match the expected format"));
                    }
                }
                out.extend(self.length_violation(text.chars().count()));
                if !rule.allowed_values.is_empty()
                    && !rule.allowed_values.iter().any(|v| v.eq_ignore_ascii_case(text))
                {
                    out.push(format!(
                        "{name} '{text}' is not one of: {}",
                        rule.allowed_values.join(", ")
                    ));
                }
            }
            Typed::Number(n) => {
                if let Some(min) = rule.min.filter(|min| n < min) {
                    out.push(format!("{name} {n} is below the minimum of {min}"));
                }
                if let Some(max) = rule.max.filter(|max| n > max) {
                    out.push(format!("{name} {n} is above the maximum of {max}"));
                }
            }
            Typed::Date(date) => {
                if !rule.allow_future && *date > as_of {
                    out.push(format!("{name} is in the future"));
                }
                if let Some(years) = rule.max_age_years {
                    let oldest = as_of
                        .with_year(as_of.year() - years as i32)
                        .unwrap_or(as_of - chrono::Duration::days(365 * years as i64));
                    if *date < oldest {
                        out.push(format!("{name} is more than {years} years old"));
                    }
                }
            }
            Typed::List(len) => out.extend(self.length_violation(*len)),
            Typed::Bool(_) => {}
        }
        out
    }

    fn length_violation(&self, len: usize) -> Option<String> {
        let name = self.rule.name.as_str();
        match (self.rule.min_length, self.rule.max_length) {
            (Some(min), _) if len < min => Some(format!("{name} is shorter than {min}")),
            (_, Some(max)) if len > max => Some(format!("{name} is longer than {max}")),
            _ => None,
        }
    }
}
