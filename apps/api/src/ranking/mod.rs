//! Batch ranking and pairwise comparison of analysed candidates.

pub mod comparison;
pub mod handlers;
pub mod ranker;

use thiserror::Error;

/// Structural problems that fail a whole ranking call. Per-candidate failures are
/// never raised; they are recorded on that candidate's analysis.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankingError {
    #[error("at least one resume is required")]
    EmptyBatch,

    #[error("batch of {size} resumes exceeds the limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    #[error("file name '{0}' appears more than once in the batch")]
    DuplicateFileName(String),

    #[error("every resume needs a non-blank file name")]
    BlankFileName,

    #[error("job description is missing")]
    MissingJobDescription,
}
