//! Resource-specific error types for REST API operations.
//!
//! This module contains error types for resource operations, extending
//! the base [`RestError`](crate::clients::RestError) with resource-specific
//! semantics like `NotFound` and precondition failures.
//!
//! # Error Handling
//!
//! HTTP status codes are mapped to semantic error variants:
//!
//! - **404**: [`ResourceError::NotFound`] - Resource doesn't exist
//! - **422**: [`ResourceError::ValidationFailed`] - The platform rejected the payload
//! - **Other 4xx/5xx**: [`ResourceError::Rest`] - Wrapped REST error
//!
//! Preconditions (attached client, identifier, filter bounds) are checked
//! before any request is sent and reported with their own variants.
//!
//! # Example
//!
//! ```rust,ignore
//! use c8y_api::rest::ResourceError;
//!
//! match events.get("12345").await {
//!     Ok(event) => println!("Found: {:?}", event.text),
//!     Err(ResourceError::NotFound { resource, id }) => {
//!         println!("{} with id {} not found", resource, id);
//!     }
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```

use crate::clients::{HttpError, RestError};
use thiserror::Error;

/// Error type for REST resource operations.
///
/// # Example
///
/// ```rust
/// use c8y_api::rest::ResourceError;
///
/// let error = ResourceError::NotFound {
///     resource: "Event",
///     id: "123".to_string(),
/// };
/// assert!(error.to_string().contains("Event"));
/// assert!(error.to_string().contains("123"));
/// ```
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The resource was not found (HTTP 404).
    #[error("{resource} with id {id} not found")]
    NotFound {
        /// The type name of the resource (e.g., "Event", "Alarm").
        resource: &'static str,
        /// The ID that was requested.
        id: String,
    },

    /// The platform rejected the payload (HTTP 422).
    #[error("Validation of {resource} failed: {message}")]
    ValidationFailed {
        /// The type name of the resource.
        resource: &'static str,
        /// The platform's error message.
        message: String,
    },

    /// The object has no REST client attached.
    #[error("Cannot {operation} {resource}: no REST client attached")]
    MissingClient {
        /// The type name of the resource.
        resource: &'static str,
        /// The operation being attempted (e.g., "create", "delete").
        operation: &'static str,
    },

    /// The object has no database ID.
    #[error("Cannot {operation} {resource}: the object has no database ID")]
    MissingId {
        /// The type name of the resource.
        resource: &'static str,
        /// The operation being attempted.
        operation: &'static str,
    },

    /// The object lacks the fields identifying it (alarm type and source).
    #[error("Cannot {operation} {resource}: '{field}' must be set to identify the object")]
    MissingIdentity {
        /// The type name of the resource.
        resource: &'static str,
        /// The operation being attempted.
        operation: &'static str,
        /// The missing identifying field.
        field: &'static str,
    },

    /// A required key is absent from a JSON document.
    #[error("Cannot parse {resource}: missing required key '{key}'")]
    MissingField {
        /// The type name of the resource.
        resource: &'static str,
        /// The missing key as JSON pointer (e.g., `/source/id`).
        key: &'static str,
    },

    /// A JSON document could not be parsed.
    #[error("Cannot parse {resource}: {message}")]
    Parse {
        /// The type name of the resource.
        resource: &'static str,
        /// Details about the parse failure.
        message: String,
    },

    /// No valid path matches the provided IDs and operation.
    #[error("Cannot resolve path for {resource}::{operation} with provided IDs")]
    PathResolutionFailed {
        /// The type name of the resource.
        resource: &'static str,
        /// The operation being attempted.
        operation: &'static str,
    },

    /// A delete-by-filter (or apply-by-filter) without any filter.
    #[error("Refusing to {operation} all {resource} objects: no filter given")]
    UnboundedDelete {
        /// The type name of the resource.
        resource: &'static str,
        /// The operation being attempted.
        operation: &'static str,
    },

    /// Two filters map to the same query key.
    #[error("Conflicting filters: '{first}' and '{second}' both set '{key}'")]
    ConflictingFilters {
        /// The query key set twice.
        key: &'static str,
        /// The first filter.
        first: &'static str,
        /// The second filter.
        second: &'static str,
    },

    /// A date/time string could not be parsed.
    #[error("Invalid timestamp '{value}'. Expected ISO 8601 with time zone (e.g., '2024-01-31T12:00:00.000Z').")]
    InvalidTimestamp {
        /// The rejected value.
        value: String,
    },

    /// A page size of zero was requested.
    #[error("Invalid page size {page_size}. The page size must be greater than zero.")]
    InvalidPageSize {
        /// The rejected page size.
        page_size: u32,
    },

    /// An HTTP-level error occurred.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// A REST-level error occurred.
    #[error(transparent)]
    Rest(#[from] RestError),
}

impl ResourceError {
    /// Maps a REST error to a semantic resource error.
    ///
    /// - 404 -> `NotFound`
    /// - 422 -> `ValidationFailed`
    /// - Other -> `Rest`
    ///
    /// # Example
    ///
    /// ```rust
    /// use c8y_api::clients::{HttpError, HttpResponseError, RestError};
    /// use c8y_api::rest::ResourceError;
    ///
    /// let error = RestError::Http(HttpError::Response(HttpResponseError {
    ///     code: 404,
    ///     message: r#"{"error":"event/Not Found"}"#.to_string(),
    ///     error_reference: None,
    /// }));
    ///
    /// let error = ResourceError::from_rest_error(error, "Event", Some("123"));
    /// assert!(matches!(error, ResourceError::NotFound { .. }));
    /// ```
    #[must_use]
    pub fn from_rest_error(error: RestError, resource: &'static str, id: Option<&str>) -> Self {
        match error {
            RestError::Http(HttpError::Response(response)) => match response.code {
                404 => Self::NotFound {
                    resource,
                    id: id.unwrap_or("unknown").to_string(),
                },
                422 => Self::ValidationFailed {
                    resource,
                    message: response.message,
                },
                _ => Self::Rest(RestError::Http(HttpError::Response(response))),
            },
            other => Self::Rest(other),
        }
    }

    /// Returns the HTTP status code if the error came from a response.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::ValidationFailed { .. } => Some(422),
            Self::Http(e) => e.status_code(),
            Self::Rest(e) => e.status_code(),
            _ => None,
        }
    }
}

// Verify ResourceError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceError>();
};
