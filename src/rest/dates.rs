//! Conversion between ISO 8601 strings and [`chrono`] date/time values.
//!
//! The platform expects timestamps with millisecond precision and an
//! explicit UTC offset, e.g. `2024-01-31T12:00:00.000+00:00`.
//!
//! # Example
//!
//! ```rust
//! use c8y_api::rest::dates::{to_datetime, to_timestring};
//!
//! let dt = to_datetime("2024-01-31T13:00:00.000+01:00").unwrap();
//! assert_eq!(to_timestring(dt), "2024-01-31T12:00:00.000+00:00");
//! ```

use chrono::{DateTime, SecondsFormat, Utc};

use crate::rest::ResourceError;

/// Formats a date/time as UTC with millisecond precision.
#[must_use]
pub fn to_timestring(datetime: DateTime<Utc>) -> String {
    datetime.to_rfc3339_opts(SecondsFormat::Millis, false)
}

/// Parses an ISO 8601 timestamp with time zone into UTC.
///
/// A trailing `Z` and numeric offsets are both accepted.
///
/// # Errors
///
/// Returns [`ResourceError::InvalidTimestamp`] if the value is not a valid
/// RFC 3339 timestamp.
pub fn to_datetime(value: &str) -> Result<DateTime<Utc>, ResourceError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ResourceError::InvalidTimestamp {
            value: value.to_string(),
        })
}

/// Returns the current UTC time as timestamp string.
#[must_use]
pub fn now_timestring() -> String {
    to_timestring(Utc::now())
}

/// A time value accepted by filters.
///
/// # Example
///
/// ```rust
/// use c8y_api::rest::dates::TimeArg;
/// use chrono::{TimeZone, Utc};
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();
///
/// let text = TimeArg::from("2024-01-31T12:00:00Z");
/// assert_eq!(text.normalize(now).unwrap(), "2024-01-31T12:00:00.000+00:00");
///
/// assert_eq!(TimeArg::Now.normalize(now).unwrap(), "2024-01-31T12:00:00.000+00:00");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeArg {
    /// A pre-formatted ISO 8601 string.
    Text(String),
    /// A date/time value.
    DateTime(DateTime<Utc>),
    /// The time the query is built.
    Now,
}

impl TimeArg {
    /// Normalizes the value to a platform timestamp string.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidTimestamp`] for unparsable text.
    pub fn normalize(&self, now: DateTime<Utc>) -> Result<String, ResourceError> {
        match self {
            Self::Text(text) => to_datetime(text).map(to_timestring),
            Self::DateTime(dt) => Ok(to_timestring(*dt)),
            Self::Now => Ok(to_timestring(now)),
        }
    }
}

impl From<&str> for TimeArg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TimeArg {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for TimeArg {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}
