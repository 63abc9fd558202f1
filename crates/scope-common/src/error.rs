//! Error types for the radar scope crates.

use thiserror::Error;

/// Result type alias using ScopeError.
pub type ScopeResult<T> = Result<T, ScopeError>;

/// Errors raised at construction and IO boundaries.
///
/// The per-tick rendering path never returns these: bad inputs there are
/// clamped or skipped and logged, leaving the previous raster in place.
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("Invalid sensor frame: {0}")]
    InvalidFrame(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Encoding failed: {0}")]
    EncodeError(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl ScopeError {
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ScopeError {
    fn from(err: std::io::Error) -> Self {
        ScopeError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ScopeError {
    fn from(err: serde_json::Error) -> Self {
        ScopeError::InvalidConfig(format!("JSON error: {}", err))
    }
}
