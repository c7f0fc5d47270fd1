//! Errors produced by the normalization layer.

use thiserror::Error;

/// Errors raised while resolving or applying normalizers.
///
/// At resolution time (the scorer boundary) these are non-fatal: the
/// registry logs and falls back to the raw value. At build time they are
/// surfaced to the caller as configuration errors.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// A normalizer name did not resolve to a built-in or a registered
    /// custom normalizer.
    #[error("unknown normalizer: {0:?}")]
    UnknownNormalizer(String),

    /// Normalizer options failed to parse.
    #[error("invalid options for normalizer {name:?}: {message}")]
    InvalidOptions { name: String, message: String },

    /// A normalizer failed on a specific value.
    #[error("normalizer {name:?} failed: {message}")]
    Failed { name: String, message: String },
}
