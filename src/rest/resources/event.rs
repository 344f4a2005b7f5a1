//! Event resource implementation.
//!
//! Events are time-stamped records raised by a device (its *source*), e.g.
//! a door being opened or a location update. They can carry arbitrary
//! fragments and a single binary attachment.
//!
//! # Paths
//!
//! - `/event/events` (select, create, delete by filter)
//! - `/event/events/{id}` (get, update, delete)
//! - `/event/events/{id}/binaries` (attachment)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use c8y_api::{FilePart, TrackedResource};
//! use c8y_api::rest::resources::{Event, Events};
//!
//! let events = Events::new(client.clone());
//!
//! let event = TrackedResource::new(Event::new("c8y_DoorOpened", "12345", "Door was opened"))
//!     .with_client(client.clone());
//! let created = event.create().await?;
//!
//! created.create_attachment(FilePart::new(b"log".to_vec(), "door.log")).await?;
//! let bytes = events.download_attachment(created.id.as_deref().unwrap()).await?;
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::clients::{FilePart, HttpMethod};
use crate::rest::dates::{now_timestring, to_datetime, TimeArg};
use crate::rest::resources::SourceRef;
use crate::rest::{
    C8yResource, EventFilter, ResourceCollection, ResourceError, ResourceOperation,
    ResourcePath, TrackedResource,
};

/// Fragment marking an event that has a binary attachment.
pub const BINARY_FRAGMENT: &str = "c8y_IsBinary";

const ATTACHMENT_ACCEPT: &str = "application/json";

/// An event raised by a device.
///
/// Typed fields cover the fixed schema; every other key is kept in
/// `fragments`. Only `text` and fragments can be updated.
///
/// # Read-only Fields
///
/// `id`, `self_url`, `creation_time` and `last_updated` are set by the
/// platform and never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Event {
    /// The database ID.
    #[serde(default, skip_serializing)]
    pub id: Option<String>,

    /// The URL of this object.
    #[serde(rename = "self", default, skip_serializing)]
    pub self_url: Option<String>,

    /// The event type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,

    /// When the event happened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    /// Description of the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// The device that raised the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,

    /// When the event was stored.
    #[serde(rename = "creationTime", default, skip_serializing)]
    pub creation_time: Option<String>,

    /// When the event was last modified.
    #[serde(rename = "lastUpdated", default, skip_serializing)]
    pub last_updated: Option<String>,

    /// Custom fragments.
    #[serde(flatten)]
    pub fragments: Map<String, Value>,
}

impl Event {
    /// Creates an event without time; the current time is used on creation.
    #[must_use]
    pub fn new(
        event_type: impl Into<String>,
        source: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            event_type: Some(event_type.into()),
            source: Some(SourceRef::new(source)),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Sets the time of the event.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidTimestamp`] for an unparsable string.
    ///
    /// # Example
    ///
    /// ```rust
    /// use c8y_api::rest::dates::TimeArg;
    /// use c8y_api::rest::resources::Event;
    ///
    /// let event = Event::new("c8y_Test", "1", "x")
    ///     .with_time("2024-01-31T13:00:00+01:00")
    ///     .unwrap();
    /// assert_eq!(event.time.as_deref(), Some("2024-01-31T12:00:00.000+00:00"));
    ///
    /// let event = Event::new("c8y_Test", "1", "x").with_time(TimeArg::Now).unwrap();
    /// assert!(event.time.is_some());
    /// ```
    pub fn with_time(mut self, time: impl Into<TimeArg>) -> Result<Self, ResourceError> {
        self.time = Some(time.into().normalize(Utc::now())?);
        Ok(self)
    }

    /// Adds a fragment.
    #[must_use]
    pub fn with_fragment(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fragments.insert(name.into(), value);
        self
    }

    /// Returns the event time.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidTimestamp`] if the stored value is malformed.
    pub fn datetime(&self) -> Result<Option<DateTime<Utc>>, ResourceError> {
        self.time.as_deref().map(to_datetime).transpose()
    }

    /// Returns the creation time.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidTimestamp`] if the stored value is malformed.
    pub fn creation_datetime(&self) -> Result<Option<DateTime<Utc>>, ResourceError> {
        self.creation_time.as_deref().map(to_datetime).transpose()
    }

    /// Returns the last update time.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidTimestamp`] if the stored value is malformed.
    pub fn updated_datetime(&self) -> Result<Option<DateTime<Utc>>, ResourceError> {
        self.last_updated.as_deref().map(to_datetime).transpose()
    }

    /// Returns `true` if the event carries the binary attachment marker.
    ///
    /// This does not query the database; an attachment added after the
    /// event was read is not reflected.
    #[must_use]
    pub fn has_attachment(&self) -> bool {
        self.fragments.contains_key(BINARY_FRAGMENT)
    }
}

impl C8yResource for Event {
    type Filter = EventFilter;

    const NAME: &'static str = "Event";
    const COLLECTION_KEY: &'static str = "events";
    const ACCEPT: &'static str = "application/vnd.com.nsn.cumulocity.event+json";

    const PATHS: &'static [ResourcePath] = &[
        ResourcePath::new(HttpMethod::Get, ResourceOperation::Get, &["id"], "/event/events/{id}"),
        ResourcePath::new(HttpMethod::Get, ResourceOperation::Select, &[], "/event/events"),
        ResourcePath::new(HttpMethod::Post, ResourceOperation::Create, &[], "/event/events"),
        ResourcePath::new(HttpMethod::Put, ResourceOperation::Update, &["id"], "/event/events/{id}"),
        ResourcePath::new(
            HttpMethod::Delete,
            ResourceOperation::Delete,
            &["id"],
            "/event/events/{id}",
        ),
        ResourcePath::new(HttpMethod::Delete, ResourceOperation::DeleteBy, &[], "/event/events"),
        ResourcePath::new(
            HttpMethod::Post,
            ResourceOperation::CreateAttachment,
            &["id"],
            "/event/events/{id}/binaries",
        ),
        ResourcePath::new(
            HttpMethod::Put,
            ResourceOperation::UpdateAttachment,
            &["id"],
            "/event/events/{id}/binaries",
        ),
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::DownloadAttachment,
            &["id"],
            "/event/events/{id}/binaries",
        ),
        ResourcePath::new(
            HttpMethod::Delete,
            ResourceOperation::DeleteAttachment,
            &["id"],
            "/event/events/{id}/binaries",
        ),
    ];

    const REQUIRED_KEYS: &'static [&'static str] = &["/type", "/time", "/source/id"];
    const UPDATABLE_KEYS: &'static [&'static str] = &["text"];
    const SCHEMA_KEYS: &'static [&'static str] = &[
        "id",
        "self",
        "type",
        "time",
        "text",
        "source",
        "creationTime",
        "lastUpdated",
    ];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn prepare_for_create(&mut self) {
        if self.time.is_none() {
            self.time = Some(now_timestring());
        }
    }
}

/// Metadata of an event's binary attachment.
///
/// Keys not listed here are kept in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EventBinary {
    /// The file name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The content type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,

    /// The ID of the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// The URL of the attachment.
    #[serde(rename = "self", skip_serializing_if = "Option::is_none")]
    pub self_url: Option<String>,

    /// Other keys of the response.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventBinary {
    fn from_json(json: &Value) -> Result<Self, ResourceError> {
        serde_json::from_value(json.clone()).map_err(|e| ResourceError::Parse {
            resource: "EventBinary",
            message: e.to_string(),
        })
    }
}

/// Accessor for the events of a tenant.
pub type Events = ResourceCollection<Event>;

impl ResourceCollection<Event> {
    /// Deletes events by ID.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] for the first ID that doesn't exist.
    pub async fn delete(&self, ids: &[&str]) -> Result<(), ResourceError> {
        for &id in ids {
            let path = Event::resolve_path(ResourceOperation::Delete, Some(id))?;
            self.client()
                .delete(&path, None)
                .await
                .map_err(|e| ResourceError::from_rest_error(e, Event::NAME, Some(id)))?;
        }
        Ok(())
    }

    /// Returns the attachment path of an event.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::PathResolutionFailed`] if the path cannot be built.
    pub fn attachment_path(&self, id: &str) -> Result<String, ResourceError> {
        Event::resolve_path(ResourceOperation::DownloadAttachment, Some(id))
    }

    /// Uploads an attachment as multipart form.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] if the event doesn't exist, or an
    /// HTTP 409 as [`ResourceError::Rest`] if it already has an attachment.
    pub async fn create_attachment(
        &self,
        id: &str,
        file: FilePart,
    ) -> Result<EventBinary, ResourceError> {
        let path = Event::resolve_path(ResourceOperation::CreateAttachment, Some(id))?;
        let response = self
            .client()
            .post_file(&path, file, Some(ATTACHMENT_ACCEPT))
            .await
            .map_err(|e| ResourceError::from_rest_error(e, Event::NAME, Some(id)))?;
        EventBinary::from_json(&response.body)
    }

    /// Replaces an attachment with the raw file content.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] if the event doesn't exist.
    pub async fn update_attachment(
        &self,
        id: &str,
        file: FilePart,
    ) -> Result<EventBinary, ResourceError> {
        let path = Event::resolve_path(ResourceOperation::UpdateAttachment, Some(id))?;
        let response = self
            .client()
            .put_file(&path, file, Some(ATTACHMENT_ACCEPT))
            .await
            .map_err(|e| ResourceError::from_rest_error(e, Event::NAME, Some(id)))?;
        EventBinary::from_json(&response.body)
    }

    /// Downloads an attachment.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] if the event or the attachment
    /// doesn't exist.
    pub async fn download_attachment(&self, id: &str) -> Result<Vec<u8>, ResourceError> {
        let path = Event::resolve_path(ResourceOperation::DownloadAttachment, Some(id))?;
        self.client()
            .get_file(&path)
            .await
            .map_err(|e| ResourceError::from_rest_error(e, Event::NAME, Some(id)))
    }

    /// Removes an attachment.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] if the event or the attachment
    /// doesn't exist.
    pub async fn delete_attachment(&self, id: &str) -> Result<(), ResourceError> {
        let path = Event::resolve_path(ResourceOperation::DeleteAttachment, Some(id))?;
        self.client()
            .delete(&path, None)
            .await
            .map_err(|e| ResourceError::from_rest_error(e, Event::NAME, Some(id)))?;
        Ok(())
    }
}

impl TrackedResource<Event> {
    fn attachment_target(&self, operation: &'static str) -> Result<(Events, &str), ResourceError> {
        let client = self.require_client(operation)?;
        let id = self.require_id(operation)?;
        Ok((Events::new(Arc::clone(client)), id))
    }

    /// Uploads an attachment for this event.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingClient`] or [`ResourceError::MissingId`]
    /// before any request.
    pub async fn create_attachment(&self, file: FilePart) -> Result<EventBinary, ResourceError> {
        let (events, id) = self.attachment_target("create_attachment")?;
        events.create_attachment(id, file).await
    }

    /// Replaces the attachment of this event.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingClient`] or [`ResourceError::MissingId`]
    /// before any request.
    pub async fn update_attachment(&self, file: FilePart) -> Result<EventBinary, ResourceError> {
        let (events, id) = self.attachment_target("update_attachment")?;
        events.update_attachment(id, file).await
    }

    /// Downloads the attachment of this event.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingClient`] or [`ResourceError::MissingId`]
    /// before any request.
    pub async fn download_attachment(&self) -> Result<Vec<u8>, ResourceError> {
        let (events, id) = self.attachment_target("download_attachment")?;
        events.download_attachment(id).await
    }

    /// Removes the attachment of this event.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingClient`] or [`ResourceError::MissingId`]
    /// before any request.
    pub async fn delete_attachment(&self) -> Result<(), ResourceError> {
        let (events, id) = self.attachment_target("delete_attachment")?;
        events.delete_attachment(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_new_event_serializes_writable_fields() {
        let event = Event::new("c8y_Test", "12345", "hello")
            .with_fragment("c8y_Custom", json!({"a": 1}));

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "type": "c8y_Test",
                "text": "hello",
                "source": {"id": "12345"},
                "c8y_Custom": {"a": 1}
            })
        );
    }

    #[test]
    fn test_prepare_for_create_keeps_existing_time() {
        let mut event = Event::new("t", "1", "x")
            .with_time(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
            .unwrap();
        event.prepare_for_create();
        assert_eq!(event.time.as_deref(), Some("2024-01-01T00:00:00.000+00:00"));

        let mut event = Event::new("t", "1", "x");
        event.prepare_for_create();
        assert!(event.datetime().unwrap().is_some());
    }

    #[test]
    fn test_datetime_accessors() {
        let event: Event = serde_json::from_value(json!({
            "type": "t",
            "time": "2024-01-31T12:00:00.000Z",
            "creationTime": "2024-01-31T12:00:01.000+00:00",
            "source": {"id": "1"}
        }))
        .unwrap();

        assert_eq!(
            event.datetime().unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap())
        );
        assert_eq!(
            event.creation_datetime().unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 1).unwrap())
        );
        assert_eq!(event.updated_datetime().unwrap(), None);
    }

    #[test]
    fn test_has_attachment_checks_marker_fragment() {
        let event = Event::new("t", "1", "x");
        assert!(!event.has_attachment());

        let event = event.with_fragment(BINARY_FRAGMENT, json!({"name": "a.txt"}));
        assert!(event.has_attachment());
    }

    #[test]
    fn test_event_binary_keeps_unknown_keys() {
        let binary = EventBinary::from_json(&json!({
            "self": "https://t.example.com/event/events/42/binaries",
            "name": "log.txt",
            "type": "text/plain",
            "length": 3,
            "source": "42",
            "custom": true
        }))
        .unwrap();

        assert_eq!(binary.name.as_deref(), Some("log.txt"));
        assert_eq!(binary.content_type.as_deref(), Some("text/plain"));
        assert_eq!(binary.length, Some(3));
        assert_eq!(binary.extra["custom"], json!(true));
    }

    #[tokio::test]
    async fn test_attachment_operations_require_client() {
        let event = TrackedResource::new(Event::new("t", "1", "x"));
        let result = event.download_attachment().await;
        assert!(matches!(
            result,
            Err(ResourceError::MissingClient {
                operation: "download_attachment",
                ..
            })
        ));
    }
}
