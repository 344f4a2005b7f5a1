//! Structured query construction for collection operations.
//!
//! A filter is turned into a [`Query`] in two layers:
//!
//! - the *base query* holds the selection criteria only and is shared by
//!   reads, counts, bulk updates and bulk deletes;
//! - the *page query* adds `revert`, `pageSize` and `currentPage`.
//!
//! # Example
//!
//! ```rust
//! use c8y_api::rest::{Filter, EventFilter};
//!
//! let filter = EventFilter::new()
//!     .resource_type("c8y_Alert")
//!     .source("12345")
//!     .before("2024-01-31T12:00:00Z");
//!
//! let query = filter.base_query().unwrap();
//! assert_eq!(query.get("type"), Some("c8y_Alert"));
//! assert_eq!(query.get("dateTo"), Some("2024-01-31T12:00:00.000+00:00"));
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::rest::dates::{to_timestring, TimeArg};
use crate::rest::ResourceError;

fn age_bound(now: DateTime<Utc>, age: Duration) -> Result<String, ResourceError> {
    now.checked_sub_signed(age)
        .map(to_timestring)
        .ok_or_else(|| ResourceError::InvalidTimestamp {
            value: format!("now - {age}"),
        })
}

/// An ordered set of query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(BTreeMap<String, String>);

impl Query {
    /// Creates an empty query.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Sets a parameter, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the value of a parameter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns `true` if the parameter is set.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns `true` if no parameter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Renders the parameters as URL-encoded query string (without `?`).
    ///
    /// ```rust
    /// use c8y_api::rest::Query;
    ///
    /// let mut query = Query::new();
    /// query.insert("type", "a b");
    /// query.insert("source", "42");
    /// assert_eq!(query.to_query_string(), "source=42&type=a%20b");
    /// ```
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Consumes the query and returns the parameter map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

/// Selection criteria shared by all resource filters.
///
/// Use the builder methods of [`Filter`] to populate it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseFilter {
    /// Resource type (`type`).
    pub resource_type: Option<String>,
    /// Source managed object ID (`source`).
    pub source: Option<String>,
    /// Fragment that must be present (`fragmentType`).
    pub fragment: Option<String>,
    /// Lower bound of the object's time (`dateFrom`).
    pub date_from: Option<TimeArg>,
    /// Upper bound of the object's time (`dateTo`).
    pub date_to: Option<TimeArg>,
    /// Lower bound of the creation time (`createdFrom`).
    pub created_from: Option<TimeArg>,
    /// Upper bound of the creation time (`createdTo`).
    pub created_to: Option<TimeArg>,
    /// Lower bound of the last update time (`lastUpdatedFrom`).
    pub last_updated_from: Option<TimeArg>,
    /// Upper bound of the last update time (`lastUpdatedTo`).
    pub last_updated_to: Option<TimeArg>,
    /// Minimum age; maps to `dateTo = now - min_age`.
    pub min_age: Option<Duration>,
    /// Maximum age; maps to `dateFrom = now - max_age`.
    pub max_age: Option<Duration>,
    /// Reverse the sort order (`revert=true`).
    pub reverse: bool,
    /// Page size (`pageSize`).
    pub page_size: Option<u32>,
    /// Fetch exactly this page (`currentPage`) and stop.
    pub page_number: Option<u32>,
    /// Maximum number of objects to hand out.
    pub limit: Option<usize>,
}

/// A resource filter.
///
/// Implementors expose their [`BaseFilter`] and may add resource-specific
/// query keys in [`Filter::extra_query`]. All builder methods are provided;
/// aliases such as [`Filter::before`] and [`Filter::date_to`] set the same
/// field, so they always produce identical queries.
pub trait Filter: Sized {
    /// Returns the shared selection criteria.
    fn base(&self) -> &BaseFilter;

    /// Returns the shared selection criteria for modification.
    fn base_mut(&mut self) -> &mut BaseFilter;

    /// Adds resource-specific keys to the base query.
    fn extra_query(&self, _query: &mut Query) {}

    /// Filters by resource type.
    #[must_use]
    fn resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.base_mut().resource_type = Some(resource_type.into());
        self
    }

    /// Filters by source managed object ID.
    #[must_use]
    fn source(mut self, source: impl Into<String>) -> Self {
        self.base_mut().source = Some(source.into());
        self
    }

    /// Only objects carrying this fragment.
    #[must_use]
    fn fragment(mut self, fragment: impl Into<String>) -> Self {
        self.base_mut().fragment = Some(fragment.into());
        self
    }

    /// Only objects with a time before the given value.
    #[must_use]
    fn before(self, time: impl Into<TimeArg>) -> Self {
        self.date_to(time)
    }

    /// Alias of [`Filter::before`].
    #[must_use]
    fn date_to(mut self, time: impl Into<TimeArg>) -> Self {
        self.base_mut().date_to = Some(time.into());
        self
    }

    /// Only objects with a time after the given value.
    #[must_use]
    fn after(self, time: impl Into<TimeArg>) -> Self {
        self.date_from(time)
    }

    /// Alias of [`Filter::after`].
    #[must_use]
    fn date_from(mut self, time: impl Into<TimeArg>) -> Self {
        self.base_mut().date_from = Some(time.into());
        self
    }

    /// Only objects created before the given value.
    #[must_use]
    fn created_before(self, time: impl Into<TimeArg>) -> Self {
        self.created_to(time)
    }

    /// Alias of [`Filter::created_before`].
    #[must_use]
    fn created_to(mut self, time: impl Into<TimeArg>) -> Self {
        self.base_mut().created_to = Some(time.into());
        self
    }

    /// Only objects created after the given value.
    #[must_use]
    fn created_after(self, time: impl Into<TimeArg>) -> Self {
        self.created_from(time)
    }

    /// Alias of [`Filter::created_after`].
    #[must_use]
    fn created_from(mut self, time: impl Into<TimeArg>) -> Self {
        self.base_mut().created_from = Some(time.into());
        self
    }

    /// Only objects last updated before the given value.
    #[must_use]
    fn updated_before(self, time: impl Into<TimeArg>) -> Self {
        self.last_updated_to(time)
    }

    /// Alias of [`Filter::updated_before`].
    #[must_use]
    fn last_updated_to(mut self, time: impl Into<TimeArg>) -> Self {
        self.base_mut().last_updated_to = Some(time.into());
        self
    }

    /// Only objects last updated after the given value.
    #[must_use]
    fn updated_after(self, time: impl Into<TimeArg>) -> Self {
        self.last_updated_from(time)
    }

    /// Alias of [`Filter::updated_after`].
    #[must_use]
    fn last_updated_from(mut self, time: impl Into<TimeArg>) -> Self {
        self.base_mut().last_updated_from = Some(time.into());
        self
    }

    /// Only objects at least this old.
    #[must_use]
    fn min_age(mut self, age: Duration) -> Self {
        self.base_mut().min_age = Some(age);
        self
    }

    /// Only objects at most this old.
    #[must_use]
    fn max_age(mut self, age: Duration) -> Self {
        self.base_mut().max_age = Some(age);
        self
    }

    /// Reverses the sort order (most recent first).
    #[must_use]
    fn reverse(mut self, reverse: bool) -> Self {
        self.base_mut().reverse = reverse;
        self
    }

    /// Sets the number of objects requested per page.
    #[must_use]
    fn page_size(mut self, page_size: u32) -> Self {
        self.base_mut().page_size = Some(page_size);
        self
    }

    /// Fetches only the given page (1-based).
    #[must_use]
    fn page_number(mut self, page_number: u32) -> Self {
        self.base_mut().page_number = Some(page_number);
        self
    }

    /// Caps the total number of objects returned.
    #[must_use]
    fn limit(mut self, limit: usize) -> Self {
        self.base_mut().limit = Some(limit);
        self
    }

    /// Builds the base query relative to the current time.
    ///
    /// # Errors
    ///
    /// See [`Filter::base_query_at`].
    fn base_query(&self) -> Result<Query, ResourceError> {
        self.base_query_at(Utc::now())
    }

    /// Builds the base query, resolving ages relative to `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ConflictingFilters`] if an explicit bound and
    /// an age map to the same key, and [`ResourceError::InvalidTimestamp`]
    /// for unparsable time strings or ages reaching outside the representable
    /// time range.
    fn base_query_at(&self, now: DateTime<Utc>) -> Result<Query, ResourceError> {
        let base = self.base();
        let mut query = Query::new();

        if let Some(resource_type) = &base.resource_type {
            query.insert("type", resource_type.as_str());
        }
        if let Some(source) = &base.source {
            query.insert("source", source.as_str());
        }
        if let Some(fragment) = &base.fragment {
            query.insert("fragmentType", fragment.as_str());
        }

        let bounds = [
            ("dateFrom", &base.date_from),
            ("dateTo", &base.date_to),
            ("createdFrom", &base.created_from),
            ("createdTo", &base.created_to),
            ("lastUpdatedFrom", &base.last_updated_from),
            ("lastUpdatedTo", &base.last_updated_to),
        ];
        for (key, value) in bounds {
            if let Some(value) = value {
                query.insert(key, value.normalize(now)?);
            }
        }

        if let Some(min_age) = base.min_age {
            if base.date_to.is_some() {
                return Err(ResourceError::ConflictingFilters {
                    key: "dateTo",
                    first: "before",
                    second: "min_age",
                });
            }
            query.insert("dateTo", age_bound(now, min_age)?);
        }
        if let Some(max_age) = base.max_age {
            if base.date_from.is_some() {
                return Err(ResourceError::ConflictingFilters {
                    key: "dateFrom",
                    first: "after",
                    second: "max_age",
                });
            }
            query.insert("dateFrom", age_bound(now, max_age)?);
        }

        self.extra_query(&mut query);
        Ok(query)
    }

    /// Builds the page query: the base query plus `revert`, `pageSize` and,
    /// when a page number is set, `currentPage`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidPageSize`] for a page size of zero,
    /// plus the errors of [`Filter::base_query_at`].
    fn page_query_at(
        &self,
        now: DateTime<Utc>,
        default_page_size: u32,
    ) -> Result<Query, ResourceError> {
        let mut query = self.base_query_at(now)?;
        let base = self.base();

        if base.reverse {
            query.insert("revert", "true");
        }

        let page_size = base.page_size.unwrap_or(default_page_size);
        if page_size == 0 {
            return Err(ResourceError::InvalidPageSize { page_size });
        }
        query.insert("pageSize", page_size.to_string());

        if let Some(page_number) = base.page_number {
            query.insert("currentPage", page_number.to_string());
        }

        Ok(query)
    }
}

/// A filter without resource-specific keys.
///
/// Used for events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    base: BaseFilter,
}

impl EventFilter {
    /// Creates an empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Filter for EventFilter {
    fn base(&self) -> &BaseFilter {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseFilter {
        &mut self.base
    }
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Query>();
    assert_send_sync::<EventFilter>();
};
