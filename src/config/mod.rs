//! Configuration types for the Cumulocity API client.
//!
//! This module provides the configuration used to connect to a Cumulocity
//! tenant.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`C8yConfig`]: The main configuration struct holding connection settings
//! - [`C8yConfigBuilder`]: A builder for constructing [`C8yConfig`] instances
//! - [`BaseUrl`]: A normalized tenant base URL
//! - [`TenantId`]: A validated tenant ID
//! - [`Username`]: A validated user name
//! - [`Password`]: A validated password with masked debug output
//!
//! # Example
//!
//! ```rust
//! use c8y_api::{C8yConfig, BaseUrl, TenantId, Username, Password};
//!
//! let config = C8yConfig::builder()
//!     .base_url(BaseUrl::new("tenant.cumulocity.com").unwrap())
//!     .tenant_id(TenantId::new("t12345").unwrap())
//!     .username(Username::new("admin").unwrap())
//!     .password(Password::new("secret").unwrap())
//!     .build()
//!     .unwrap();
//! ```

mod newtypes;

pub use newtypes::{BaseUrl, Password, TenantId, Username};

use crate::error::ConfigError;

/// Default number of objects requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Configuration for the Cumulocity API client.
///
/// # Thread Safety
///
/// `C8yConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
///
/// # Example
///
/// ```rust
/// use c8y_api::{C8yConfig, BaseUrl, Username, Password};
///
/// let config = C8yConfig::builder()
///     .base_url(BaseUrl::new("https://tenant.cumulocity.com").unwrap())
///     .username(Username::new("admin").unwrap())
///     .password(Password::new("secret").unwrap())
///     .page_size(250)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.page_size(), 250);
/// ```
#[derive(Clone, Debug)]
pub struct C8yConfig {
    base_url: BaseUrl,
    tenant_id: Option<TenantId>,
    username: Username,
    password: Password,
    application_key: Option<String>,
    user_agent_prefix: Option<String>,
    tries: u32,
    page_size: u32,
}

impl C8yConfig {
    /// Creates a new builder for constructing a `C8yConfig`.
    #[must_use]
    pub fn builder() -> C8yConfigBuilder {
        C8yConfigBuilder::new()
    }

    /// Returns the tenant base URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the tenant ID, if configured.
    #[must_use]
    pub const fn tenant_id(&self) -> Option<&TenantId> {
        self.tenant_id.as_ref()
    }

    /// Returns the user name.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Returns the password.
    #[must_use]
    pub const fn password(&self) -> &Password {
        &self.password
    }

    /// Returns the application key sent as `X-Cumulocity-Application-Key`.
    #[must_use]
    pub fn application_key(&self) -> Option<&str> {
        self.application_key.as_deref()
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the number of attempts made for retryable responses.
    #[must_use]
    pub const fn tries(&self) -> u32 {
        self.tries
    }

    /// Returns the page size used when a filter does not set one.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }
}

// Verify C8yConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<C8yConfig>();
};

/// Builder for constructing [`C8yConfig`] instances.
///
/// Required fields are `base_url`, `username` and `password`.
///
/// # Defaults
///
/// - `tenant_id`: `None` (the user name is sent without tenant prefix)
/// - `application_key`: `None`
/// - `user_agent_prefix`: `None`
/// - `tries`: `1`
/// - `page_size`: [`DEFAULT_PAGE_SIZE`]
#[derive(Debug, Default)]
pub struct C8yConfigBuilder {
    base_url: Option<BaseUrl>,
    tenant_id: Option<TenantId>,
    username: Option<Username>,
    password: Option<Password>,
    application_key: Option<String>,
    user_agent_prefix: Option<String>,
    tries: Option<u32>,
    page_size: Option<u32>,
}

impl C8yConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tenant base URL (required).
    #[must_use]
    pub fn base_url(mut self, url: BaseUrl) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the tenant ID used as user name prefix.
    #[must_use]
    pub fn tenant_id(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    /// Sets the user name (required).
    #[must_use]
    pub fn username(mut self, username: Username) -> Self {
        self.username = Some(username);
        self
    }

    /// Sets the password (required).
    #[must_use]
    pub fn password(mut self, password: Password) -> Self {
        self.password = Some(password);
        self
    }

    /// Sets the application key for microservice or web app requests.
    #[must_use]
    pub fn application_key(mut self, key: impl Into<String>) -> Self {
        self.application_key = Some(key.into());
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets the number of attempts for retryable responses (429 and 500).
    ///
    /// A value of `0` is treated as `1`.
    #[must_use]
    pub const fn tries(mut self, tries: u32) -> Self {
        self.tries = Some(tries);
        self
    }

    /// Sets the default page size for collection queries.
    #[must_use]
    pub const fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Builds the [`C8yConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `base_url`, `username`
    /// or `password` are not set, and [`ConfigError::InvalidPageSize`] for a
    /// page size of zero.
    pub fn build(self) -> Result<C8yConfig, ConfigError> {
        let base_url = self
            .base_url
            .ok_or(ConfigError::MissingRequiredField { field: "base_url" })?;
        let username = self
            .username
            .ok_or(ConfigError::MissingRequiredField { field: "username" })?;
        let password = self
            .password
            .ok_or(ConfigError::MissingRequiredField { field: "password" })?;

        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(ConfigError::InvalidPageSize { page_size });
        }

        Ok(C8yConfig {
            base_url,
            tenant_id: self.tenant_id,
            username,
            password,
            application_key: self.application_key,
            user_agent_prefix: self.user_agent_prefix,
            tries: self.tries.unwrap_or(1).max(1),
            page_size,
        })
    }
}
