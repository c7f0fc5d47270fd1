//! The converged error type for the umbrella crate.

use thiserror::Error;

/// Failures surfaced at the engine boundary.
///
/// Stage crates keep their own error types; this enum converges them so
/// applications can depend on `reclink` alone. Configuration and
/// invariant errors surface immediately; per-record data faults never
/// appear here; they are collected into result `errors` lists by the
/// stage that observed them.
#[derive(Debug, Error)]
pub enum ReclinkError {
    /// Build-time configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Matching or blocking validation/runtime error.
    #[error(transparent)]
    Match(#[from] matcher::MatchError),

    /// Merge failure.
    #[error(transparent)]
    Merge(#[from] merge::MergeError),

    /// Unmerge failure (including double unmerge).
    #[error(transparent)]
    Unmerge(#[from] merge::UnmergeError),

    /// Consolidation failure.
    #[error(transparent)]
    Consolidate(#[from] consolidate::ConsolidateError),

    /// A collaborator failed outside a more specific operation.
    #[error(transparent)]
    Adapter(#[from] merge::AdapterError),
}
