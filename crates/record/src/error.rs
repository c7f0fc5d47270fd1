//! Error types for the record data model.

use thiserror::Error;

/// Errors raised by the record layer.
#[derive(Debug, Error)]
pub enum RecordError {
    /// A value could not be coerced into the requested target type.
    #[error("cannot coerce {from} value {value:?} to {target}")]
    Coercion {
        value: String,
        from: &'static str,
        target: &'static str,
    },

    /// A schema definition failed validation.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}
