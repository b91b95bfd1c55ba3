//! Core error model.

use thiserror::Error;

/// Result type used by the core primitives.
pub type CoreResult<T> = Result<T, CoreError>;

/// Failure to construct or convert a core primitive.
///
/// These are deterministic input errors; nothing here is transient.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An identifier was invalid (e.g. parse failure, blank value).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A payload could not be converted to or from its JSON form.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A packed message was unpacked as the wrong type.
    #[error("type mismatch (expected: {expected}, actual: {actual})")]
    TypeMismatch { expected: String, actual: String },
}

impl CoreError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}
