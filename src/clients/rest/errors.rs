//! REST-specific error types for the Cumulocity API client.
//!
//! - [`RestError::InvalidPath`]: When a REST API path fails validation
//! - [`RestError::InvalidFile`]: When a file to upload cannot be read
//! - [`RestError::Http`]: Wraps underlying HTTP errors

use crate::clients::HttpError;
use thiserror::Error;

/// Error type for REST API operations.
///
/// # Example
///
/// ```rust
/// use c8y_api::clients::rest::RestError;
///
/// let error = RestError::InvalidPath { path: "".to_string() };
/// assert!(error.to_string().contains("Invalid"));
/// ```
#[derive(Debug, Error)]
pub enum RestError {
    /// The REST API path is invalid.
    ///
    /// This error is returned when a path is empty after normalization.
    #[error("Invalid REST API path: {path}")]
    InvalidPath {
        /// The invalid path that was provided.
        path: String,
    },

    /// A file could not be read for upload.
    #[error("Cannot read file '{path}': {message}")]
    InvalidFile {
        /// The path of the file.
        path: String,
        /// The underlying I/O error message.
        message: String,
    },

    /// An HTTP-level error occurred.
    #[error(transparent)]
    Http(#[from] HttpError),
}

impl RestError {
    /// Returns the HTTP status code if the error came from a response.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status_code(),
            Self::InvalidPath { .. } | Self::InvalidFile { .. } => None,
        }
    }
}
