//! Error types for the Cumulocity API client.
//!
//! This module contains error types used throughout the crate for
//! configuration and validation errors.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use c8y_api::{ConfigError, Username};
//!
//! let result = Username::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyUsername)));
//! ```

use thiserror::Error;

/// Errors that can occur during client configuration.
///
/// This enum represents all possible errors that can occur when creating
/// or validating configuration types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Base URL is invalid.
    #[error("Invalid base URL '{url}'. Expected a host name with optional scheme and port (e.g., 'https://tenant.cumulocity.com').")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// Tenant ID is invalid.
    #[error("Invalid tenant ID '{tenant_id}'. Tenant IDs must not be empty or contain '/' or ':'.")]
    InvalidTenantId {
        /// The invalid tenant ID that was provided.
        tenant_id: String,
    },

    /// Username cannot be empty.
    #[error("Username cannot be empty. Please provide a valid Cumulocity username.")]
    EmptyUsername,

    /// Password cannot be empty.
    #[error("Password cannot be empty. Please provide the password for the configured user.")]
    EmptyPassword,

    /// The default page size must be positive.
    #[error("Invalid page size {page_size}. The page size must be greater than zero.")]
    InvalidPageSize {
        /// The rejected page size.
        page_size: u32,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}
