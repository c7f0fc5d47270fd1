//! Errors produced by the merge layer.

use record::RecordId;
use thiserror::Error;

/// A collaborator (store, archive, adapter) failure, wrapped with the
/// operation that was in flight.
#[derive(Debug, Error)]
#[error("adapter error during {operation}: {message}")]
pub struct AdapterError {
    pub operation: String,
    pub message: String,
}

impl AdapterError {
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while merging source records.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Merge requires at least one source record.
    #[error("merge requires at least one source record")]
    NoSources,

    /// Invalid merge configuration.
    #[error("invalid merge config: {0}")]
    InvalidConfig(String),

    /// A collaborator failed; the merge did not commit.
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

/// Errors raised while unmerging a golden record.
#[derive(Debug, Error)]
pub enum UnmergeError {
    /// No provenance exists for the golden record.
    #[error("no provenance found for golden record {0}")]
    NotFound(RecordId),

    /// The golden record was already unmerged; unmerge is one-shot.
    #[error("golden record {0} is already unmerged")]
    AlreadyUnmerged(RecordId),

    /// The archive holds no source records for the golden record.
    #[error("no archived source records for golden record {0}")]
    MissingArchive(RecordId),

    /// A collaborator failed; the unmerge did not commit.
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}
