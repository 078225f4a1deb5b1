//! Extraction validation: per-field scoring against a schema and a document-level summary.

pub mod consistency;
pub mod document;
pub mod field;
pub mod handlers;
pub mod models;
pub mod schemas;

use thiserror::Error;

/// Structural problems with a schema. Per-field problems are reported as
/// `ValidationIssue`s, never raised.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("schema must declare at least one field")]
    EmptySchema,

    #[error("schema field names must not be blank")]
    BlankFieldName,

    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),

    #[error("invalid pattern for field '{field}': {message}")]
    InvalidPattern { field: String, message: String },

    #[error("invalid range for field '{field}': minimum {min} exceeds maximum {max}")]
    InvalidRange { field: String, min: String, max: String },

    #[error("no preset schema for document type '{0}'")]
    UnknownDocumentType(String),

    #[error("no schema given and the document type is unknown")]
    MissingSchema,
}
