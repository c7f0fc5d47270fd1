//! Errors produced by the matching layer.

use blocking::BlockingError;
use thiserror::Error;

/// Errors raised while validating matching configuration or running the
/// engine.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Invalid matching configuration (build time).
    #[error("invalid matching config: {0}")]
    InvalidConfig(String),

    /// A matching field is missing from the schema (build time).
    #[error("matching field {0:?} is not defined in the schema")]
    UnknownField(String),

    /// Blocking configuration failed validation.
    #[error("blocking error: {0}")]
    Blocking(#[from] BlockingError),
}
