//! Errors produced by the comparator layer.

use thiserror::Error;

/// Errors raised while resolving or validating comparator configuration.
#[derive(Debug, Error)]
pub enum CompareError {
    /// A strategy name did not resolve to a registered comparator.
    #[error("unknown comparator strategy: {0:?}")]
    UnknownStrategy(String),

    /// Strategy parameters failed validation.
    #[error("invalid comparator options: {0}")]
    InvalidOptions(String),
}
