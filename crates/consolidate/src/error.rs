//! Errors produced by the consolidation layer.

use thiserror::Error;

pub use merge::AdapterError;

/// Errors raised while building mappings or running consolidation.
#[derive(Debug, Error)]
pub enum ConsolidateError {
    /// Two mapping entries write the same target field.
    #[error("duplicate mapping target field: {0:?}")]
    DuplicateTarget(String),

    /// A mapping definition failed structural validation.
    #[error("invalid mapping: {0}")]
    InvalidMapping(String),

    /// A consolidation run was configured without sources.
    #[error("consolidation requires at least one source")]
    NoSources,

    /// Matching configuration failed validation.
    #[error(transparent)]
    Match(#[from] matcher::MatchError),

    /// A collaborator failed, wrapped with the originating source.
    #[error("source {source_id:?}: {error}")]
    Adapter {
        source_id: String,
        #[source]
        error: AdapterError,
    },
}

/// A single record that could not be mapped. Collected, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MappingFailure {
    pub source_id: String,
    /// Index of the record within its source's fetch.
    pub record_index: usize,
    pub message: String,
}
