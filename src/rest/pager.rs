//! Lazy page-by-page retrieval of collection results.
//!
//! A [`Pager`] hands out objects one at a time. A page is requested only
//! when the buffered objects of the previous page are used up, so
//! [`Pager::try_next`] is the only place where network I/O happens.
//!
//! Paging ends when
//!
//! - `limit` objects were handed out (no further request is made),
//! - a page is empty,
//! - a page is shorter than the page size and `statistics.pageSize`
//!   confirms that size was used (the platform caps large page sizes),
//! - a fixed page number was requested (exactly one page is fetched), or
//! - the pager is dropped.
//!
//! # Example
//!
//! ```rust,ignore
//! use c8y_api::rest::{EventFilter, Filter};
//!
//! let mut pager = events.select(EventFilter::new().resource_type("c8y_Test").limit(5))?;
//! while let Some(event) = pager.try_next().await? {
//!     println!("{:?}", event.text);
//! }
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;

use crate::clients::RestClient;
use crate::rest::{C8yResource, Filter, Page, Query, ResourceError, ResourceOperation, TrackedResource};

/// A forward-only, lazily fetched sequence of objects.
#[derive(Debug)]
pub struct Pager<T> {
    client: Arc<RestClient>,
    path: String,
    query: Query,
    page_size: u32,
    next_page: u32,
    single_page: bool,
    limit: Option<usize>,
    buffer: VecDeque<TrackedResource<T>>,
    handed_out: usize,
    pages_fetched: usize,
    exhausted: bool,
}

impl<T: C8yResource> Pager<T> {
    /// Creates a pager for the objects matching `filter`.
    ///
    /// No request is sent until [`Pager::try_next`] is called.
    ///
    /// # Errors
    ///
    /// Returns the query construction errors of [`Filter::page_query_at`].
    pub fn new(client: Arc<RestClient>, filter: &T::Filter) -> Result<Self, ResourceError> {
        let default_page_size = client.page_size();
        let query = filter.page_query_at(Utc::now(), default_page_size)?;
        let path = T::resolve_path(ResourceOperation::Select, None)?;

        let base = filter.base();
        Ok(Self {
            client,
            path,
            query,
            page_size: base.page_size.unwrap_or(default_page_size),
            next_page: base.page_number.unwrap_or(1),
            single_page: base.page_number.is_some(),
            limit: base.limit,
            buffer: VecDeque::new(),
            handed_out: 0,
            pages_fetched: 0,
            exhausted: false,
        })
    }

    /// Returns the next object, fetching the next page if necessary.
    ///
    /// Returns `Ok(None)` once the sequence is finished.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if a page request or its parsing fails.
    pub async fn try_next(&mut self) -> Result<Option<TrackedResource<T>>, ResourceError> {
        if self.limit.is_some_and(|limit| self.handed_out >= limit) {
            return Ok(None);
        }

        if self.buffer.is_empty() && !self.exhausted {
            self.fetch_page().await?;
        }

        let item = self.buffer.pop_front();
        if item.is_some() {
            self.handed_out += 1;
        }
        Ok(item)
    }

    /// Drains the pager into a vector.
    ///
    /// # Errors
    ///
    /// Returns the first error of [`Pager::try_next`].
    pub async fn collect_all(mut self) -> Result<Vec<TrackedResource<T>>, ResourceError> {
        let mut items = Vec::new();
        while let Some(item) = self.try_next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Returns the number of page requests sent so far.
    #[must_use]
    pub const fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Returns the query sent with every page request (without `currentPage`
    /// unless a fixed page was requested).
    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }

    async fn fetch_page(&mut self) -> Result<(), ResourceError> {
        let mut query = self.query.clone();
        query.insert("currentPage", self.next_page.to_string());

        let response = self
            .client
            .get(&self.path, Some(query.into_inner()), None)
            .await
            .map_err(|e| ResourceError::from_rest_error(e, T::NAME, None))?;
        let page = Page::<T>::from_json(&response.body, &self.client)?;
        self.pages_fetched += 1;

        tracing::debug!(
            resource = T::NAME,
            page = self.next_page,
            items = page.len(),
            "Fetched page"
        );

        let page_size = usize::try_from(self.page_size).unwrap_or(usize::MAX);
        let size_confirmed = page
            .statistics()
            .is_some_and(|stats| stats.page_size == Some(self.page_size));
        let short = size_confirmed && page.len() < page_size;
        if self.single_page || page.is_empty() || short {
            self.exhausted = true;
        }
        match self.next_page.checked_add(1) {
            Some(next) => self.next_page = next,
            None => self.exhausted = true,
        }
        self.buffer.extend(page.into_items());
        Ok(())
    }
}

// Verify Pager is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Pager<crate::rest::resources::Event>>();
};
