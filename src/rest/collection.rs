//! Collection accessors.
//!
//! A [`ResourceCollection<T>`] is the stateless entry point for reading and
//! bulk-modifying objects of one resource type. It holds a shared
//! [`RestClient`] and owns no model objects.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use c8y_api::rest::{EventFilter, Filter};
//! use c8y_api::rest::resources::Events;
//!
//! let events = Events::new(Arc::new(client));
//!
//! let recent = events
//!     .get_all(EventFilter::new().source("12345").max_age(chrono::Duration::hours(1)))
//!     .await?;
//!
//! events.delete_by(EventFilter::new().resource_type("c8y_Obsolete")).await?;
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;

use crate::clients::RestClient;
use crate::rest::tracking::serialize;
use crate::rest::{C8yResource, Filter, Pager, Query, ResourceError, ResourceOperation, TrackedResource};

/// Stateless accessor for the objects of one resource type.
#[derive(Debug)]
pub struct ResourceCollection<T> {
    client: Arc<RestClient>,
    _resource: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceCollection<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            _resource: PhantomData,
        }
    }
}

impl<T: C8yResource> ResourceCollection<T> {
    /// Creates an accessor using the given client.
    #[must_use]
    pub const fn new(client: Arc<RestClient>) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    /// Returns the client used by this accessor.
    #[must_use]
    pub const fn client(&self) -> &Arc<RestClient> {
        &self.client
    }

    /// Returns the collection path of the resource (e.g., `/event/events`).
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::PathResolutionFailed`] if the resource
    /// declares no select path.
    pub fn resource_path(&self) -> Result<String, ResourceError> {
        T::resolve_path(ResourceOperation::Select, None)
    }

    /// Reads a single object by ID.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] if the object doesn't exist.
    pub async fn get(&self, id: &str) -> Result<TrackedResource<T>, ResourceError> {
        let path = T::resolve_path(ResourceOperation::Get, Some(id))?;
        let response = self
            .client
            .get(&path, None, Some(T::ACCEPT))
            .await
            .map_err(|e| ResourceError::from_rest_error(e, T::NAME, Some(id)))?;

        Ok(TrackedResource::<T>::from_json(&response.body)?.with_client(Arc::clone(&self.client)))
    }

    /// Returns a lazy sequence of the objects matching `filter`.
    ///
    /// No request is sent until the pager is advanced.
    ///
    /// # Errors
    ///
    /// Returns filter errors ([`ResourceError::ConflictingFilters`],
    /// [`ResourceError::InvalidTimestamp`], [`ResourceError::InvalidPageSize`])
    /// immediately.
    pub fn select(&self, filter: T::Filter) -> Result<Pager<T>, ResourceError> {
        Pager::new(Arc::clone(&self.client), &filter)
    }

    /// Reads all objects matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`ResourceCollection::select`] and of the page
    /// requests.
    pub async fn get_all(&self, filter: T::Filter) -> Result<Vec<TrackedResource<T>>, ResourceError> {
        self.select(filter)?.collect_all().await
    }

    /// Creates objects in bulk.
    ///
    /// Defaults such as an unset time are written back into the given
    /// objects before their full payload is sent.
    ///
    /// # Errors
    ///
    /// Returns the first failing request's error; objects before it were
    /// created.
    pub async fn create(
        &self,
        objects: &mut [TrackedResource<T>],
    ) -> Result<Vec<TrackedResource<T>>, ResourceError> {
        let path = T::resolve_path(ResourceOperation::Create, None)?;
        let mut created = Vec::with_capacity(objects.len());

        for object in objects.iter_mut() {
            object.prepare_for_create();
            let body = object.to_full_json()?;
            let response = self
                .client
                .post(&path, body, Some(T::ACCEPT))
                .await
                .map_err(|e| ResourceError::from_rest_error(e, T::NAME, None))?;
            created.push(
                TrackedResource::<T>::from_json(&response.body)?.with_client(Arc::clone(&self.client)),
            );
        }

        Ok(created)
    }

    /// Sends the diff payload of each object.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingId`] before any request if an object
    /// has no ID.
    pub async fn update(&self, objects: &[TrackedResource<T>]) -> Result<(), ResourceError> {
        let mut requests = Vec::with_capacity(objects.len());
        for object in objects {
            let id = object.require_id("update")?;
            requests.push((id, object.to_diff_json()?));
        }

        for (id, body) in requests {
            self.put_json(id, body).await?;
        }
        Ok(())
    }

    /// Applies the diff payload of `template` to each of the given objects.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] if one of the objects doesn't exist.
    pub async fn apply_to(
        &self,
        template: &TrackedResource<T>,
        ids: &[&str],
    ) -> Result<(), ResourceError> {
        let body = template.to_diff_json()?;
        self.apply_json_to(&body, ids).await
    }

    /// Applies a JSON document to each of the given objects.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] if one of the objects doesn't exist.
    pub async fn apply_json_to(&self, json: &Value, ids: &[&str]) -> Result<(), ResourceError> {
        for &id in ids {
            self.put_json(id, json.clone()).await?;
        }
        Ok(())
    }

    /// Deletes all objects matching `filter`.
    ///
    /// Only the base query is sent; pagination settings of the filter are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnboundedDelete`] before any request if the
    /// filter selects everything.
    pub async fn delete_by(&self, filter: T::Filter) -> Result<(), ResourceError> {
        let query = self.bounded_query(&filter, "delete_by")?;
        let path = T::resolve_path(ResourceOperation::DeleteBy, None)?;

        tracing::info!(
            resource = T::NAME,
            query = %query.to_query_string(),
            "Deleting by filter"
        );

        self.client
            .delete(&path, Some(query.into_inner()))
            .await
            .map_err(|e| ResourceError::from_rest_error(e, T::NAME, None))?;
        Ok(())
    }

    pub(crate) fn bounded_query(
        &self,
        filter: &T::Filter,
        operation: &'static str,
    ) -> Result<Query, ResourceError> {
        let query = filter.base_query()?;
        if query.is_empty() {
            return Err(ResourceError::UnboundedDelete {
                resource: T::NAME,
                operation,
            });
        }
        Ok(query)
    }

    async fn put_json(&self, id: &str, body: Value) -> Result<(), ResourceError> {
        let path = T::resolve_path(ResourceOperation::Update, Some(id))?;
        self.client
            .put(&path, body, None, Some(T::ACCEPT))
            .await
            .map_err(|e| ResourceError::from_rest_error(e, T::NAME, Some(id)))?;
        Ok(())
    }
}

/// Serializes a resource with its create-time defaults filled in.
pub(crate) fn create_payload<T: C8yResource>(resource: &T) -> Result<Value, ResourceError> {
    let mut resource = resource.clone();
    resource.prepare_for_create();
    serialize(&resource)
}

// Verify ResourceCollection is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceCollection<crate::rest::resources::Event>>();
};
