//! Change tracking for partial updates.
//!
//! This module provides [`TrackedResource<T>`], the model object of the
//! library. It wraps a resource with a baseline snapshot and an optional
//! REST client. Only updatable fields and fragments that differ from the
//! baseline are sent when the object is updated.
//!
//! # How It Works
//!
//! When a resource is constructed, loaded from the API or after a successful
//! write, its serialized state is captured as JSON. The diff payload is
//! computed by comparing the current serialization with that baseline:
//!
//! - only keys listed in [`C8yResource::UPDATABLE_KEYS`] and fragment keys
//!   are eligible;
//! - a changed key is sent with its complete current value;
//! - a key removed since the baseline is sent as `null`, which is how the
//!   platform deletes a fragment.
//!
//! # Example
//!
//! ```rust
//! use c8y_api::rest::TrackedResource;
//! use c8y_api::rest::resources::Event;
//! use serde_json::json;
//!
//! let mut event = TrackedResource::new(Event::new("c8y_Test", "12345", "initial"));
//! assert!(!event.is_dirty());
//!
//! event.text = Some("changed".to_string());
//! event.fragments.insert("c8y_Custom".to_string(), json!({"value": 1}));
//!
//! let diff = event.to_diff_json().unwrap();
//! assert_eq!(diff, json!({"text": "changed", "c8y_Custom": {"value": 1}}));
//! ```

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::clients::RestClient;
use crate::rest::{C8yResource, ResourceError};

/// A resource with a change-tracking baseline and an optional REST client.
///
/// Implements `Deref<Target = T>` and `DerefMut`, so fields of the wrapped
/// resource can be read and written directly.
///
/// Server operations (`create`, `update`, `apply_to`, `delete`) need an
/// attached client, see [`TrackedResource::with_client`].
#[derive(Debug, Clone)]
pub struct TrackedResource<T> {
    /// The actual resource data.
    resource: T,
    /// The serialized state at construction, load or after the last write.
    original_state: Option<Value>,
    /// The client used for server operations.
    client: Option<Arc<RestClient>>,
}

impl<T: C8yResource> TrackedResource<T> {
    /// Wraps a resource, taking its current state as baseline.
    #[must_use]
    pub fn new(resource: T) -> Self {
        let original_state = serde_json::to_value(&resource).ok();
        Self {
            resource,
            original_state,
            client: None,
        }
    }

    /// Parses a resource from a JSON document.
    ///
    /// Known keys map to typed fields; every other key becomes a fragment.
    /// The parsed state is the baseline.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingField`] if one of
    /// [`C8yResource::REQUIRED_KEYS`] is absent or `null`, and
    /// [`ResourceError::Parse`] if a key has an unexpected shape.
    ///
    /// # Example
    ///
    /// ```rust
    /// use c8y_api::rest::{ResourceError, TrackedResource};
    /// use c8y_api::rest::resources::Event;
    /// use serde_json::json;
    ///
    /// let event = TrackedResource::<Event>::from_json(&json!({
    ///     "id": "42",
    ///     "type": "c8y_Test",
    ///     "time": "2024-01-31T12:00:00.000Z",
    ///     "source": {"id": "12345"},
    ///     "c8y_Custom": {"value": 1}
    /// })).unwrap();
    /// assert_eq!(event.id.as_deref(), Some("42"));
    /// assert!(event.fragments.contains_key("c8y_Custom"));
    ///
    /// let result = TrackedResource::<Event>::from_json(&json!({"type": "c8y_Test"}));
    /// assert!(matches!(result, Err(ResourceError::MissingField { key: "/time", .. })));
    /// ```
    pub fn from_json(json: &Value) -> Result<Self, ResourceError> {
        for &key in T::REQUIRED_KEYS {
            if json.pointer(key).map_or(true, Value::is_null) {
                return Err(ResourceError::MissingField {
                    resource: T::NAME,
                    key,
                });
            }
        }

        let resource: T =
            serde_json::from_value(json.clone()).map_err(|e| ResourceError::Parse {
                resource: T::NAME,
                message: e.to_string(),
            })?;

        Ok(Self::new(resource))
    }

    /// Attaches a REST client, enabling server operations.
    #[must_use]
    pub fn with_client(mut self, client: Arc<RestClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Returns the attached REST client.
    #[must_use]
    pub const fn client(&self) -> Option<&Arc<RestClient>> {
        self.client.as_ref()
    }

    /// Returns `true` if the object has no database ID yet.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.resource.id().is_none()
    }

    /// Serializes the object.
    ///
    /// With `only_updated` the diff payload is returned, otherwise the full
    /// payload. Read-only server fields are never included.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Parse`] if the resource cannot be serialized.
    pub fn to_json(&self, only_updated: bool) -> Result<Value, ResourceError> {
        if only_updated {
            self.to_diff_json()
        } else {
            self.to_full_json()
        }
    }

    /// Serializes all writable fields and fragments.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Parse`] if the resource cannot be serialized.
    pub fn to_full_json(&self) -> Result<Value, ResourceError> {
        serialize(&self.resource)
    }

    /// Serializes the updatable fields and fragments changed since the baseline.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Parse`] if the resource cannot be serialized.
    pub fn to_diff_json(&self) -> Result<Value, ResourceError> {
        let current = self.to_full_json()?;
        let empty = Map::new();
        let current = current.as_object().unwrap_or(&empty);
        let original = self.original_state.as_ref().and_then(Value::as_object);

        let mut diff = Map::new();
        for (key, value) in current {
            if is_diffable::<T>(key) && original.and_then(|o| o.get(key)) != Some(value) {
                diff.insert(key.clone(), value.clone());
            }
        }

        // Removed keys
        if let Some(original) = original {
            for key in original.keys() {
                if is_diffable::<T>(key) && !current.contains_key(key) {
                    diff.insert(key.clone(), Value::Null);
                }
            }
        }

        Ok(Value::Object(diff))
    }

    /// Returns `true` if the object differs from its baseline.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        match &self.original_state {
            None => true,
            Some(original) => serde_json::to_value(&self.resource).ok().as_ref() != Some(original),
        }
    }

    /// Returns the top-level keys that differ from the baseline.
    ///
    /// Unlike [`TrackedResource::to_diff_json`], this includes keys that are
    /// not updatable.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<String> {
        let current = serde_json::to_value(&self.resource).unwrap_or(Value::Null);
        let empty = Map::new();
        let current = current.as_object().unwrap_or(&empty);
        let original = self
            .original_state
            .as_ref()
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        let mut changed: Vec<String> = current
            .iter()
            .filter(|(key, value)| original.get(key.as_str()) != Some(*value))
            .map(|(key, _)| key.clone())
            .collect();
        changed.extend(
            original
                .keys()
                .filter(|key| !current.contains_key(key.as_str()))
                .cloned(),
        );
        changed.sort();
        changed
    }

    /// Takes the current state as new baseline.
    pub fn mark_clean(&mut self) {
        self.original_state = serde_json::to_value(&self.resource).ok();
    }

    /// Returns a reference to the wrapped resource.
    #[must_use]
    pub const fn inner(&self) -> &T {
        &self.resource
    }

    /// Consumes the wrapper and returns the resource.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.resource
    }
}

fn is_diffable<T: C8yResource>(key: &str) -> bool {
    T::UPDATABLE_KEYS.contains(&key) || !T::SCHEMA_KEYS.contains(&key)
}

pub(crate) fn serialize<T: C8yResource>(resource: &T) -> Result<Value, ResourceError> {
    serde_json::to_value(resource).map_err(|e| ResourceError::Parse {
        resource: T::NAME,
        message: format!("cannot serialize: {e}"),
    })
}

impl<T> Deref for TrackedResource<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.resource
    }
}

impl<T> DerefMut for TrackedResource<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.resource
    }
}
