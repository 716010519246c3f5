use thiserror::Error;

use crate::ResponsePath;

/// Result type for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;

/// A response that cannot be decoded, or a value that cannot be encoded.
///
/// Errors are reported per top-level call; nothing is retried.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// A non-null field is missing or null.
    #[error("unexpected null value at '{path}'")]
    UnexpectedNullValue { path: ResponsePath },

    #[error("malformed response at '{path}': {message}")]
    MalformedResponse { path: ResponsePath, message: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AdapterError {
    pub fn unexpected_null(path: ResponsePath) -> Self {
        AdapterError::UnexpectedNullValue { path }
    }

    pub fn malformed(path: ResponsePath, message: impl Into<String>) -> Self {
        AdapterError::MalformedResponse {
            path,
            message: message.into(),
        }
    }

    /// Path of the offending value, if the error points at one.
    pub fn path(&self) -> Option<&ResponsePath> {
        match self {
            AdapterError::UnexpectedNullValue { path }
            | AdapterError::MalformedResponse { path, .. } => Some(path),
            AdapterError::Json(_) => None,
        }
    }
}
