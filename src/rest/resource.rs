//! Resource trait and model CRUD operations.
//!
//! This module defines the [`C8yResource`] trait, which describes how a
//! platform object maps onto JSON and onto the REST API, and the server
//! operations of [`TrackedResource`] built on top of it.
//!
//! # Implementing a Resource
//!
//! 1. Define a struct with serde derives. Read-only server fields use
//!    `skip_serializing`, everything unknown goes into a flattened
//!    `fragments` map.
//! 2. Implement `C8yResource` with the paths, media type and key sets.
//!
//! # Example
//!
//! ```rust,ignore
//! use c8y_api::rest::{C8yResource, EventFilter, ResourceOperation, ResourcePath};
//! use c8y_api::HttpMethod;
//!
//! impl C8yResource for Event {
//!     type Filter = EventFilter;
//!
//!     const NAME: &'static str = "Event";
//!     const COLLECTION_KEY: &'static str = "events";
//!     const ACCEPT: &'static str = "application/vnd.com.nsn.cumulocity.event+json";
//!     const PATHS: &'static [ResourcePath] = &[
//!         ResourcePath::new(HttpMethod::Get, ResourceOperation::Get, &["id"], "/event/events/{id}"),
//!         // ...
//!     ];
//!     const REQUIRED_KEYS: &'static [&'static str] = &["/type", "/time", "/source/id"];
//!     const UPDATABLE_KEYS: &'static [&'static str] = &["text"];
//!     const SCHEMA_KEYS: &'static [&'static str] = &["id", "self", "type", "time", "text", "source"];
//!
//!     // accessors ...
//! }
//!
//! // Usage:
//! let event = TrackedResource::new(Event::new("c8y_Test", "12345", "hello"))
//!     .with_client(client.clone());
//! let created = event.create().await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::clients::RestClient;
use crate::rest::collection::create_payload;
use crate::rest::{
    build_path, get_path, Filter, Query, ResourceError, ResourceOperation, ResourcePath,
    TrackedResource,
};

/// A platform object that can be parsed, serialized and sent to the API.
///
/// # Associated Constants
///
/// - `NAME`: The resource name used in errors and logs (e.g., "Event")
/// - `COLLECTION_KEY`: The key holding the objects in collection responses
/// - `ACCEPT`: The vendor media type of a single object
/// - `PATHS`: Available paths for the supported operations
/// - `REQUIRED_KEYS`: JSON pointers that must be present when parsing
/// - `UPDATABLE_KEYS`: Top-level keys eligible for diff payloads
/// - `SCHEMA_KEYS`: All top-level keys of the fixed schema; any other key is a fragment
pub trait C8yResource: Serialize + DeserializeOwned + Clone + Send + Sync + Sized {
    /// The filter used to select objects of this resource.
    type Filter: Filter + Send + Sync;

    /// The resource name (e.g., "Event").
    const NAME: &'static str;

    /// The key of the object array in collection responses (e.g., "events").
    const COLLECTION_KEY: &'static str;

    /// The media type requested for single objects.
    const ACCEPT: &'static str;

    /// Available paths for this resource.
    const PATHS: &'static [ResourcePath];

    /// Keys (as JSON pointers) that must be present in parsed documents.
    const REQUIRED_KEYS: &'static [&'static str];

    /// Top-level keys that may be sent in diff payloads.
    const UPDATABLE_KEYS: &'static [&'static str];

    /// Top-level keys of the fixed schema.
    const SCHEMA_KEYS: &'static [&'static str];

    /// Returns the database ID, `None` for objects not yet created.
    fn id(&self) -> Option<&str>;

    /// Fills in defaults before the object is created (e.g., the current time).
    fn prepare_for_create(&mut self) {}

    /// Returns the query of a delete-by-filter that removes this object.
    ///
    /// Resources deleted by ID return `Ok(None)`, which is the default.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingIdentity`] when identifying fields are
    /// not set.
    fn delete_query(&self) -> Result<Option<Query>, ResourceError> {
        Ok(None)
    }

    /// Resolves the path of an operation.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingId`] if the operation addresses a
    /// single object and no ID is given, and
    /// [`ResourceError::PathResolutionFailed`] if the resource does not
    /// declare a path for the operation.
    fn resolve_path(operation: ResourceOperation, id: Option<&str>) -> Result<String, ResourceError> {
        if operation.needs_id() && id.is_none() {
            return Err(ResourceError::MissingId {
                resource: Self::NAME,
                operation: operation.as_str(),
            });
        }

        let mut ids: HashMap<&str, &str> = HashMap::new();
        if let Some(id) = id {
            ids.insert("id", id);
        }

        let available_ids: Vec<&str> = ids.keys().copied().collect();
        let path = get_path(Self::PATHS, operation, &available_ids).ok_or(
            ResourceError::PathResolutionFailed {
                resource: Self::NAME,
                operation: operation.as_str(),
            },
        )?;

        Ok(build_path(path.template, &ids))
    }
}

impl<T: C8yResource> TrackedResource<T> {
    pub(crate) fn require_client(
        &self,
        operation: &'static str,
    ) -> Result<&Arc<RestClient>, ResourceError> {
        self.client().ok_or(ResourceError::MissingClient {
            resource: T::NAME,
            operation,
        })
    }

    pub(crate) fn require_id(&self, operation: &'static str) -> Result<&str, ResourceError> {
        self.id().ok_or(ResourceError::MissingId {
            resource: T::NAME,
            operation,
        })
    }

    /// Creates the object in the database.
    ///
    /// The full payload is sent; unset defaults such as the time are filled
    /// in on the sent copy only.
    ///
    /// # Returns
    ///
    /// A fresh object representing what was created (including the ID),
    /// with the client attached.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingClient`] before any request if no
    /// client is attached.
    pub async fn create(&self) -> Result<Self, ResourceError> {
        let client = self.require_client("create")?;

        let body = create_payload(self.inner())?;

        let path = T::resolve_path(ResourceOperation::Create, None)?;
        let response = client
            .post(&path, body, Some(T::ACCEPT))
            .await
            .map_err(|e| ResourceError::from_rest_error(e, T::NAME, None))?;

        Ok(Self::from_json(&response.body)?.with_client(Arc::clone(client)))
    }

    /// Sends the diff payload to the database.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingClient`] or [`ResourceError::MissingId`]
    /// before any request, [`ResourceError::NotFound`] if the object no
    /// longer exists.
    pub async fn update(&self) -> Result<Self, ResourceError> {
        let client = self.require_client("update")?;
        let id = self.require_id("update")?;

        let body = self.to_diff_json()?;
        let path = T::resolve_path(ResourceOperation::Update, Some(id))?;
        let response = client
            .put(&path, body, None, Some(T::ACCEPT))
            .await
            .map_err(|e| ResourceError::from_rest_error(e, T::NAME, Some(id)))?;

        Ok(Self::from_json(&response.body)?.with_client(Arc::clone(client)))
    }

    /// Applies this object's changes to another object.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingClient`] before any request,
    /// [`ResourceError::NotFound`] if the other object doesn't exist.
    pub async fn apply_to(&self, other_id: &str) -> Result<Self, ResourceError> {
        let client = self.require_client("apply_to")?;

        let body = self.to_diff_json()?;
        let path = T::resolve_path(ResourceOperation::Update, Some(other_id))?;
        let response = client
            .put(&path, body, None, Some(T::ACCEPT))
            .await
            .map_err(|e| ResourceError::from_rest_error(e, T::NAME, Some(other_id)))?;

        Ok(Self::from_json(&response.body)?.with_client(Arc::clone(client)))
    }

    /// Deletes the object from the database.
    ///
    /// Objects are deleted by ID, unless the resource identifies them by
    /// other fields (see [`C8yResource::delete_query`]).
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingClient`], [`ResourceError::MissingId`]
    /// or [`ResourceError::MissingIdentity`] before any request.
    pub async fn delete(&self) -> Result<(), ResourceError> {
        let client = self.require_client("delete")?;

        if let Some(query) = self.delete_query()? {
            let path = T::resolve_path(ResourceOperation::DeleteBy, None)?;
            tracing::info!(resource = T::NAME, query = %query.to_query_string(), "Deleting by filter");
            client
                .delete(&path, Some(query.into_inner()))
                .await
                .map_err(|e| ResourceError::from_rest_error(e, T::NAME, None))?;
            return Ok(());
        }

        let id = self.require_id("delete")?;
        let path = T::resolve_path(ResourceOperation::Delete, Some(id))?;
        client
            .delete(&path, None)
            .await
            .map_err(|e| ResourceError::from_rest_error(e, T::NAME, Some(id)))?;
        Ok(())
    }
}
