//! Candidate analysis: career statistics, skill matching, fit scoring and red flags for
//! one resume against one job description.

pub mod analyzer;
pub mod ats;
pub mod career;
pub mod fit_scoring;
pub mod handlers;
pub mod insights;
pub mod red_flags;
pub mod skills;

use thiserror::Error;

/// Why a single candidate could not be analysed. Recorded on that candidate's result;
/// never aborts a batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("resume data is missing")]
    MissingResume,

    #[error("resume data is malformed: {0}")]
    MalformedResume(String),

    #[error("resume data contains no usable fields")]
    EmptyResume,

    #[error("job description is missing")]
    MissingJobDescription,

    #[error("timeout")]
    Timeout,

    #[error("cancelled")]
    Cancelled,

    #[error("analysis task failed: {0}")]
    TaskFailed(String),
}
