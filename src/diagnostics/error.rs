//! Fatal error types for the translation pipeline.

use thiserror::Error;

/// Errors that abort a translation.
///
/// Everything else the pipeline notices is reported as a
/// [`Diagnostic`](super::Diagnostic) on the result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranslateError {
    /// The SQuery text could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// The query referenced something the schema does not know.
    #[error("validation error: {0}")]
    Validation(String),

    /// The root entity has no table binding.
    #[error("entity '{0}' is not mapped to any SQL table")]
    UnknownEntity(String),

    /// The input URL could not be processed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// An internal invariant was violated.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TranslateError {
    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Create a parse error at a byte offset.
    pub fn parse_at(message: impl Into<String>, offset: u32) -> Self {
        Self::Parse(format!("{} (at offset {offset})", message.into()))
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an invalid-URL error.
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
