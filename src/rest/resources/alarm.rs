//! Alarm resource implementation.
//!
//! Alarms signal a condition of a device that requires attention. Unlike
//! events they have a lifecycle (`status`) and a `severity`, and the
//! platform de-duplicates them: raising an alarm with the same type and
//! source as an active one increments its `count`.
//!
//! Alarms are identified by type and source; deleting an alarm object
//! deletes all alarms of that type for that source.
//!
//! # Example
//!
//! ```rust,ignore
//! use c8y_api::rest::Filter;
//! use c8y_api::rest::resources::{AlarmFilter, AlarmSeverity, AlarmStatus, Alarms};
//!
//! let alarms = Alarms::new(client.clone());
//!
//! let active = alarms
//!     .count(AlarmFilter::new().source("12345").status(AlarmStatus::Active))
//!     .await?;
//!
//! let mut template = TrackedResource::new(Alarm::default());
//! template.status = Some(AlarmStatus::Cleared);
//! alarms
//!     .apply_by(&template, AlarmFilter::new().severity(AlarmSeverity::Warning))
//!     .await?;
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::clients::HttpMethod;
use crate::rest::dates::{now_timestring, to_datetime, TimeArg};
use crate::rest::resources::SourceRef;
use crate::rest::{
    BaseFilter, C8yResource, Filter, Query, ResourceCollection, ResourceError, ResourceOperation,
    ResourcePath, TrackedResource,
};

/// Alarm severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmSeverity {
    /// Immediate action required.
    Critical,
    /// Serious problem.
    Major,
    /// Minor problem.
    Minor,
    /// Potential problem.
    Warning,
}

impl AlarmSeverity {
    /// Returns the platform representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Major => "MAJOR",
            Self::Minor => "MINOR",
            Self::Warning => "WARNING",
        }
    }
}

impl fmt::Display for AlarmSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alarm lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmStatus {
    /// Raised and not yet handled.
    Active,
    /// Seen by an operator.
    Acknowledged,
    /// Resolved.
    Cleared,
}

impl AlarmStatus {
    /// Returns the platform representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Acknowledged => "ACKNOWLEDGED",
            Self::Cleared => "CLEARED",
        }
    }
}

impl fmt::Display for AlarmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An alarm raised by a device.
///
/// `text`, `status`, `severity` and fragments can be updated. `count` and
/// `first_occurrence_time` are maintained by the platform.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Alarm {
    /// The database ID.
    #[serde(default, skip_serializing)]
    pub id: Option<String>,

    /// The URL of this object.
    #[serde(rename = "self", default, skip_serializing)]
    pub self_url: Option<String>,

    /// The alarm type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub alarm_type: Option<String>,

    /// When the alarm was raised.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    /// Description of the alarm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// The device that raised the alarm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,

    /// The lifecycle state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AlarmStatus>,

    /// The severity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<AlarmSeverity>,

    /// How often the alarm was raised while active.
    #[serde(default, skip_serializing)]
    pub count: Option<u64>,

    /// When the alarm was first raised.
    #[serde(rename = "firstOccurrenceTime", default, skip_serializing)]
    pub first_occurrence_time: Option<String>,

    /// When the alarm was stored.
    #[serde(rename = "creationTime", default, skip_serializing)]
    pub creation_time: Option<String>,

    /// When the alarm was last modified.
    #[serde(rename = "lastUpdated", default, skip_serializing)]
    pub last_updated: Option<String>,

    /// Custom fragments.
    #[serde(flatten)]
    pub fragments: Map<String, Value>,
}

impl Alarm {
    /// Creates an alarm without time or status.
    #[must_use]
    pub fn new(
        alarm_type: impl Into<String>,
        source: impl Into<String>,
        text: impl Into<String>,
        severity: AlarmSeverity,
    ) -> Self {
        Self {
            alarm_type: Some(alarm_type.into()),
            source: Some(SourceRef::new(source)),
            text: Some(text.into()),
            severity: Some(severity),
            ..Default::default()
        }
    }

    /// Sets the time of the alarm.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidTimestamp`] for an unparsable string.
    pub fn with_time(mut self, time: impl Into<TimeArg>) -> Result<Self, ResourceError> {
        self.time = Some(time.into().normalize(Utc::now())?);
        Ok(self)
    }

    /// Sets the status of the alarm.
    #[must_use]
    pub fn with_status(mut self, status: AlarmStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Adds a fragment.
    #[must_use]
    pub fn with_fragment(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fragments.insert(name.into(), value);
        self
    }

    /// Returns the alarm time.
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

    /// Returns the time of the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidTimestamp`] if the stored value is malformed.
    pub fn first_occurrence_datetime(&self) -> Result<Option<DateTime<Utc>>, ResourceError> {
        self.first_occurrence_time
            .as_deref()
            .map(to_datetime)
            .transpose()
    }
}

impl C8yResource for Alarm {
    type Filter = AlarmFilter;

    const NAME: &'static str = "Alarm";
    const COLLECTION_KEY: &'static str = "alarms";
    const ACCEPT: &'static str = "application/vnd.com.nsn.cumulocity.alarm+json";

    const PATHS: &'static [ResourcePath] = &[
        ResourcePath::new(HttpMethod::Get, ResourceOperation::Get, &["id"], "/alarm/alarms/{id}"),
        ResourcePath::new(HttpMethod::Get, ResourceOperation::Select, &[], "/alarm/alarms"),
        ResourcePath::new(HttpMethod::Get, ResourceOperation::Count, &[], "/alarm/alarms/count"),
        ResourcePath::new(HttpMethod::Post, ResourceOperation::Create, &[], "/alarm/alarms"),
        ResourcePath::new(HttpMethod::Put, ResourceOperation::Update, &["id"], "/alarm/alarms/{id}"),
        ResourcePath::new(HttpMethod::Put, ResourceOperation::ApplyBy, &[], "/alarm/alarms"),
        ResourcePath::new(HttpMethod::Delete, ResourceOperation::DeleteBy, &[], "/alarm/alarms"),
    ];

    const REQUIRED_KEYS: &'static [&'static str] = &["/type", "/time", "/source/id"];
    const UPDATABLE_KEYS: &'static [&'static str] = &["text", "status", "severity"];
    const SCHEMA_KEYS: &'static [&'static str] = &[
        "id",
        "self",
        "type",
        "time",
        "text",
        "source",
        "status",
        "severity",
        "count",
        "firstOccurrenceTime",
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

    fn delete_query(&self) -> Result<Option<Query>, ResourceError> {
        let alarm_type = self
            .alarm_type
            .as_deref()
            .ok_or(ResourceError::MissingIdentity {
                resource: Self::NAME,
                operation: "delete",
                field: "type",
            })?;
        let source = self
            .source
            .as_ref()
            .ok_or(ResourceError::MissingIdentity {
                resource: Self::NAME,
                operation: "delete",
                field: "source",
            })?;

        let mut query = Query::new();
        query.insert("type", alarm_type);
        query.insert("source", source.id.as_str());
        Ok(Some(query))
    }
}

/// Filter for alarms.
///
/// Adds `status`, `severity` and `resolved` to the shared criteria.
///
/// # Example
///
/// ```rust
/// use c8y_api::rest::Filter;
/// use c8y_api::rest::resources::{AlarmFilter, AlarmStatus};
///
/// let query = AlarmFilter::new()
///     .source("12345")
///     .status(AlarmStatus::Active)
///     .base_query()
///     .unwrap();
/// assert_eq!(query.get("status"), Some("ACTIVE"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlarmFilter {
    base: BaseFilter,
    status: Option<AlarmStatus>,
    severity: Option<AlarmSeverity>,
    resolved: Option<bool>,
}

impl AlarmFilter {
    /// Creates an empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only alarms with this status.
    #[must_use]
    pub fn status(mut self, status: AlarmStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Only alarms with this severity.
    #[must_use]
    pub fn severity(mut self, severity: AlarmSeverity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Only cleared (`true`) or uncleared (`false`) alarms.
    #[must_use]
    pub fn resolved(mut self, resolved: bool) -> Self {
        self.resolved = Some(resolved);
        self
    }
}

impl Filter for AlarmFilter {
    fn base(&self) -> &BaseFilter {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseFilter {
        &mut self.base
    }

    fn extra_query(&self, query: &mut Query) {
        if let Some(status) = self.status {
            query.insert("status", status.as_str());
        }
        if let Some(severity) = self.severity {
            query.insert("severity", severity.as_str());
        }
        if let Some(resolved) = self.resolved {
            query.insert("resolved", resolved.to_string());
        }
    }
}

/// Accessor for the alarms of a tenant.
pub type Alarms = ResourceCollection<Alarm>;

impl ResourceCollection<Alarm> {
    /// Counts the alarms matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Parse`] if the response is not a number.
    pub async fn count(&self, filter: AlarmFilter) -> Result<u64, ResourceError> {
        let query = filter.base_query()?;
        let path = Alarm::resolve_path(ResourceOperation::Count, None)?;

        let query = (!query.is_empty()).then(|| query.into_inner());
        let response = self
            .client()
            .get(&path, query, None)
            .await
            .map_err(|e| ResourceError::from_rest_error(e, Alarm::NAME, None))?;

        response.body.as_u64().ok_or_else(|| ResourceError::Parse {
            resource: Alarm::NAME,
            message: format!("expected a count, got '{}'", response.text()),
        })
    }

    /// Applies the full payload of `template` to all alarms matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnboundedDelete`] before any request if the
    /// filter selects everything.
    pub async fn apply_by(
        &self,
        template: &TrackedResource<Alarm>,
        filter: AlarmFilter,
    ) -> Result<(), ResourceError> {
        let query = self.bounded_query(&filter, "apply_by")?;
        let path = Alarm::resolve_path(ResourceOperation::ApplyBy, None)?;
        let body = template.to_full_json()?;

        tracing::info!(
            resource = Alarm::NAME,
            query = %query.to_query_string(),
            "Updating by filter"
        );

        self.client()
            .put(&path, body, Some(query.into_inner()), None)
            .await
            .map_err(|e| ResourceError::from_rest_error(e, Alarm::NAME, None))?;
        Ok(())
    }

    /// Deletes alarms by their type and source.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingIdentity`] before any request if an
    /// alarm lacks type or source.
    pub async fn delete(&self, alarms: &[TrackedResource<Alarm>]) -> Result<(), ResourceError> {
        let mut queries = Vec::with_capacity(alarms.len());
        for alarm in alarms {
            if let Some(query) = alarm.delete_query()? {
                queries.push(query);
            }
        }

        let path = Alarm::resolve_path(ResourceOperation::DeleteBy, None)?;
        for query in queries {
            tracing::info!(
                resource = Alarm::NAME,
                query = %query.to_query_string(),
                "Deleting by filter"
            );
            self.client()
                .delete(&path, Some(query.into_inner()))
                .await
                .map_err(|e| ResourceError::from_rest_error(e, Alarm::NAME, None))?;
        }
        Ok(())
    }
}
