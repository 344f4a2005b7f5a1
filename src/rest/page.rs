//! A single page of a collection response.
//!
//! Collection responses have the shape
//! `{"events": [...], "statistics": {...}, "next": "...", "self": "..."}`,
//! where the array key depends on the resource.

use std::ops::Deref;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::clients::RestClient;
use crate::rest::{C8yResource, ResourceError, TrackedResource};

/// Paging statistics reported by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStatistics {
    /// The 1-based number of this page.
    pub current_page: Option<u32>,
    /// The page size used by the platform.
    pub page_size: Option<u32>,
    /// Total number of pages, only reported when requested.
    pub total_pages: Option<u32>,
}

/// Parsed objects of one page plus paging metadata.
///
/// Implements `Deref<Target = [TrackedResource<T>]>`.
#[derive(Debug, Clone)]
pub struct Page<T> {
    items: Vec<TrackedResource<T>>,
    statistics: Option<PageStatistics>,
    next: Option<String>,
}

impl<T: C8yResource> Page<T> {
    /// Parses a collection response, attaching `client` to every object.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Parse`] if the collection key is missing or
    /// not an array, and the errors of [`TrackedResource::from_json`] for
    /// malformed objects.
    pub fn from_json(body: &Value, client: &Arc<RestClient>) -> Result<Self, ResourceError> {
        let array = body
            .get(T::COLLECTION_KEY)
            .and_then(Value::as_array)
            .ok_or_else(|| ResourceError::Parse {
                resource: T::NAME,
                message: format!("missing collection key '{}'", T::COLLECTION_KEY),
            })?;

        let items = array
            .iter()
            .map(|json| TrackedResource::<T>::from_json(json).map(|r| r.with_client(Arc::clone(client))))
            .collect::<Result<Vec<_>, _>>()?;

        let statistics = body
            .get("statistics")
            .and_then(|s| serde_json::from_value(s.clone()).ok());
        let next = body.get("next").and_then(Value::as_str).map(String::from);

        Ok(Self {
            items,
            statistics,
            next,
        })
    }
}

impl<T> Page<T> {
    /// Returns the paging statistics, if reported.
    #[must_use]
    pub const fn statistics(&self) -> Option<&PageStatistics> {
        self.statistics.as_ref()
    }

    /// Returns the URL of the next page, if reported.
    #[must_use]
    pub fn next(&self) -> Option<&str> {
        self.next.as_deref()
    }

    /// Consumes the page and returns its objects.
    #[must_use]
    pub fn into_items(self) -> Vec<TrackedResource<T>> {
        self.items
    }
}

impl<T> Deref for Page<T> {
    type Target = [TrackedResource<T>];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}
