//! Errors produced by the blocking layer.

use thiserror::Error;

/// Errors raised while validating or running blocking strategies.
#[derive(Debug, Error)]
pub enum BlockingError {
    /// A strategy failed structural validation.
    #[error("invalid blocking config: {0}")]
    InvalidConfig(String),
}
