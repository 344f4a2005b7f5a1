//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A normalized Cumulocity base URL.
///
/// Tenants are commonly configured as a bare host name, sometimes copied
/// together with a path from the browser. The base URL keeps only the scheme,
/// host and port.
///
/// # Normalization
///
/// - `tenant.cumulocity.com` becomes `https://tenant.cumulocity.com`
/// - `https://tenant.cumulocity.com/apps/cockpit/` becomes `https://tenant.cumulocity.com`
/// - `http://localhost:8111` is used as-is
///
/// # Example
///
/// ```rust
/// use c8y_api::BaseUrl;
///
/// let url = BaseUrl::new("tenant.cumulocity.com/apps/devicemanagement").unwrap();
/// assert_eq!(url.as_ref(), "https://tenant.cumulocity.com");
/// assert_eq!(url.scheme(), "https");
/// assert_eq!(url.host(), "tenant.cumulocity.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUrl {
    url: String,
    scheme_end: usize,
}

impl BaseUrl {
    const DEFAULT_SCHEME: &'static str = "https";

    /// Creates a new normalized base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if no host can be found or the
    /// scheme is malformed.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = url.into();
        let trimmed = raw.trim();
        let invalid = || ConfigError::InvalidBaseUrl { url: raw.clone() };

        let (scheme, remainder) = match trimmed.find("://") {
            Some(index) => (&trimmed[..index], &trimmed[index + 3..]),
            None => (Self::DEFAULT_SCHEME, trimmed),
        };

        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        // Authority ends at path, query or fragment
        let authority_end = remainder.find(['/', '?', '#']).unwrap_or(remainder.len());
        let authority = &remainder[..authority_end];
        let host = authority.split(':').next().unwrap_or_default();
        if host.is_empty() || authority.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        let scheme = scheme.to_ascii_lowercase();
        Ok(Self {
            scheme_end: scheme.len(),
            url: format!("{scheme}://{authority}"),
        })
    }

    /// Returns the URL scheme (e.g., "https").
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.url[..self.scheme_end]
    }

    /// Returns the host and optional port (e.g., "localhost:8111").
    #[must_use]
    pub fn host(&self) -> &str {
        &self.url[self.scheme_end + 3..]
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl Serialize for BaseUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.url)
    }
}

impl<'de> Deserialize<'de> for BaseUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// A validated Cumulocity tenant ID (e.g., `t12345`).
///
/// The tenant ID prefixes the user name in the Basic authorization header,
/// so it cannot contain the separators used there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a new validated tenant ID.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTenantId`] if the ID is empty or
    /// contains `/` or `:`.
    pub fn new(tenant_id: impl Into<String>) -> Result<Self, ConfigError> {
        let tenant_id = tenant_id.into();
        let tenant_id = tenant_id.trim().to_string();
        if tenant_id.is_empty() || tenant_id.contains(['/', ':']) {
            return Err(ConfigError::InvalidTenantId { tenant_id });
        }
        Ok(Self(tenant_id))
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated Cumulocity user name.
///
/// # Example
///
/// ```rust
/// use c8y_api::Username;
///
/// let user = Username::new("admin").unwrap();
/// assert_eq!(user.as_ref(), "admin");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    /// Creates a new validated user name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyUsername`] if the name is empty.
    pub fn new(username: impl Into<String>) -> Result<Self, ConfigError> {
        let username = username.into();
        if username.is_empty() {
            return Err(ConfigError::EmptyUsername);
        }
        Ok(Self(username))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated Cumulocity password.
///
/// # Security
///
/// The `Debug` implementation masks the value, displaying only
/// `Password(*****)` instead of the actual password.
///
/// # Example
///
/// ```rust
/// use c8y_api::Password;
///
/// let password = Password::new("secret").unwrap();
/// assert_eq!(format!("{:?}", password), "Password(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Creates a new validated password.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyPassword`] if the password is empty.
    pub fn new(password: impl Into<String>) -> Result<Self, ConfigError> {
        let password = password.into();
        if password.is_empty() {
            return Err(ConfigError::EmptyPassword);
        }
        Ok(Self(password))
    }
}

impl AsRef<str> for Password {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(*****)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_adds_default_scheme() {
        let url = BaseUrl::new("tenant.cumulocity.com").unwrap();
        assert_eq!(url.as_ref(), "https://tenant.cumulocity.com");
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn test_base_url_strips_path_and_query() {
        let url = BaseUrl::new("https://tenant.cumulocity.com/apps/cockpit/?x=1").unwrap();
        assert_eq!(url.as_ref(), "https://tenant.cumulocity.com");

        let url = BaseUrl::new("tenant.cumulocity.com/").unwrap();
        assert_eq!(url.as_ref(), "https://tenant.cumulocity.com");
    }

    #[test]
    fn test_base_url_keeps_port_and_http_scheme() {
        let url = BaseUrl::new("http://127.0.0.1:8111").unwrap();
        assert_eq!(url.as_ref(), "http://127.0.0.1:8111");
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.host(), "127.0.0.1:8111");
    }

    #[test]
    fn test_base_url_rejects_invalid() {
        assert!(BaseUrl::new("").is_err());
        assert!(BaseUrl::new("https://").is_err());
        assert!(BaseUrl::new("://example.com").is_err());
        assert!(BaseUrl::new("https://:8080").is_err());
        assert!(BaseUrl::new("my tenant.com").is_err());
    }

    #[test]
    fn test_base_url_round_trip_serialization() {
        let original = BaseUrl::new("tenant.cumulocity.com").unwrap();
        let json = serde_json::to_string(&original).unwrap();
        assert_eq!(json, r#""https://tenant.cumulocity.com""#);
        let restored: BaseUrl = serde_json::from_str(&json).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn test_tenant_id_rejects_separators() {
        assert!(TenantId::new("t12345").is_ok());
        assert!(TenantId::new("").is_err());
        assert!(TenantId::new("t1/admin").is_err());
        assert!(TenantId::new("t1:x").is_err());
    }

    #[test]
    fn test_username_rejects_empty_string() {
        let result = Username::new("");
        assert!(matches!(result, Err(ConfigError::EmptyUsername)));
    }

    #[test]
    fn test_password_masks_value_in_debug() {
        let password = Password::new("super-secret").unwrap();
        let debug_output = format!("{:?}", password);
        assert_eq!(debug_output, "Password(*****)");
        assert!(!debug_output.contains("super-secret"));
    }
}
