//! Error types for the layout analysis core.

use thiserror::Error;

/// Primary error type for layout analysis operations.
///
/// Every variant names the algorithm that rejected its input so callers can
/// tell which stage of a pipeline failed. "No result" outcomes (no
/// intersection, nothing contained, empty query) are `Option` or empty
/// collections, never errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("{algorithm}: invalid argument: {message}")]
    InvalidArgument {
        algorithm: &'static str,
        message: String,
    },

    #[error("{algorithm}: unsupported input: {message}")]
    Unsupported {
        algorithm: &'static str,
        message: String,
    },
}

impl LayoutError {
    pub(crate) fn invalid(algorithm: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            algorithm,
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(algorithm: &'static str, message: impl Into<String>) -> Self {
        Self::Unsupported {
            algorithm,
            message: message.into(),
        }
    }
}

/// Convenience Result type alias for LayoutError.
pub type Result<T> = std::result::Result<T, LayoutError>;
