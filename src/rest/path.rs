//! Path building infrastructure for REST resources.
//!
//! Each resource declares a table of [`ResourcePath`]s, one per operation
//! it supports. Operations on a single object need the object's `id`;
//! collection operations (select, count, delete-by-filter) need none.
//!
//! # Example
//!
//! ```rust
//! use c8y_api::rest::{ResourcePath, ResourceOperation, get_path, build_path};
//! use c8y_api::HttpMethod;
//! use std::collections::HashMap;
//!
//! const PATHS: &[ResourcePath] = &[
//!     ResourcePath::new(HttpMethod::Get, ResourceOperation::Get, &["id"], "/event/events/{id}"),
//!     ResourcePath::new(HttpMethod::Get, ResourceOperation::Select, &[], "/event/events"),
//! ];
//!
//! let path = get_path(PATHS, ResourceOperation::Get, &["id"]).unwrap();
//!
//! let mut ids = HashMap::new();
//! ids.insert("id", "4711");
//! assert_eq!(build_path(path.template, &ids), "/event/events/4711");
//! ```

use crate::clients::HttpMethod;
use std::collections::HashMap;
use std::fmt::Display;

/// Operations that can be performed on a REST resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceOperation {
    /// Read a single object by ID (GET /resources/{id}).
    Get,
    /// Read a page of objects (GET /resources).
    Select,
    /// Count objects matching a filter (GET /resources/count).
    Count,
    /// Create a new object (POST /resources).
    Create,
    /// Update an existing object (PUT /resources/{id}).
    Update,
    /// Update all objects matching a filter (PUT /resources).
    ApplyBy,
    /// Delete a single object (DELETE /resources/{id}).
    Delete,
    /// Delete all objects matching a filter (DELETE /resources).
    DeleteBy,
    /// Upload a binary attachment (POST /resources/{id}/binaries).
    CreateAttachment,
    /// Replace a binary attachment (PUT /resources/{id}/binaries).
    UpdateAttachment,
    /// Download a binary attachment (GET /resources/{id}/binaries).
    DownloadAttachment,
    /// Remove a binary attachment (DELETE /resources/{id}/binaries).
    DeleteAttachment,
}

impl ResourceOperation {
    /// Returns the default HTTP method for this operation.
    #[must_use]
    pub const fn default_http_method(&self) -> HttpMethod {
        match self {
            Self::Get | Self::Select | Self::Count | Self::DownloadAttachment => HttpMethod::Get,
            Self::Create | Self::CreateAttachment => HttpMethod::Post,
            Self::Update | Self::ApplyBy | Self::UpdateAttachment => HttpMethod::Put,
            Self::Delete | Self::DeleteBy | Self::DeleteAttachment => HttpMethod::Delete,
        }
    }

    /// Returns the operation name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Select => "select",
            Self::Count => "count",
            Self::Create => "create",
            Self::Update => "update",
            Self::ApplyBy => "apply_by",
            Self::Delete => "delete",
            Self::DeleteBy => "delete_by",
            Self::CreateAttachment => "create_attachment",
            Self::UpdateAttachment => "update_attachment",
            Self::DownloadAttachment => "download_attachment",
            Self::DeleteAttachment => "delete_attachment",
        }
    }

    /// Returns `true` if the operation addresses a single object by ID.
    #[must_use]
    pub const fn needs_id(&self) -> bool {
        matches!(
            self,
            Self::Get
                | Self::Update
                | Self::Delete
                | Self::CreateAttachment
                | Self::UpdateAttachment
                | Self::DownloadAttachment
                | Self::DeleteAttachment
        )
    }
}

/// A path configuration for a REST resource operation.
///
/// Templates use `{id_name}` placeholders for ID interpolation, e.g.
/// `/event/events/{id}/binaries`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourcePath {
    /// The HTTP method for this path.
    pub http_method: HttpMethod,
    /// The operation this path is used for.
    pub operation: ResourceOperation,
    /// Required ID parameters.
    pub ids: &'static [&'static str],
    /// The URL template with `{id}` placeholders.
    pub template: &'static str,
}

impl ResourcePath {
    /// Creates a new `ResourcePath`.
    ///
    /// This is a `const fn` to allow paths to be defined as constants.
    #[must_use]
    pub const fn new(
        http_method: HttpMethod,
        operation: ResourceOperation,
        ids: &'static [&'static str],
        template: &'static str,
    ) -> Self {
        Self {
            http_method,
            operation,
            ids,
            template,
        }
    }

    /// Returns the number of required IDs for this path.
    #[must_use]
    pub const fn id_count(&self) -> usize {
        self.ids.len()
    }

    /// Checks if all required IDs are available.
    #[must_use]
    pub fn matches_ids(&self, available_ids: &[&str]) -> bool {
        self.ids.iter().all(|id| available_ids.contains(id))
    }
}

/// Selects the best matching path for an operation.
///
/// Among the paths declared for `operation` whose IDs are all available,
/// the one with the most IDs wins.
#[must_use]
pub fn get_path<'a>(
    paths: &'a [ResourcePath],
    operation: ResourceOperation,
    available_ids: &[&str],
) -> Option<&'a ResourcePath> {
    paths
        .iter()
        .filter(|p| p.operation == operation)
        .filter(|p| p.matches_ids(available_ids))
        .max_by_key(|p| p.id_count())
}

/// Builds a URL path from a template by interpolating IDs.
///
/// Values are percent-encoded, so an ID can never escape its path segment.
///
/// # Example
///
/// ```rust
/// use c8y_api::rest::build_path;
/// use std::collections::HashMap;
///
/// let mut ids = HashMap::new();
/// ids.insert("id", "a/b");
///
/// assert_eq!(build_path("/event/events/{id}", &ids), "/event/events/a%2Fb");
/// ```
#[must_use]
#[allow(clippy::implicit_hasher)]
pub fn build_path<V: Display>(template: &str, ids: &HashMap<&str, V>) -> String {
    let mut result = template.to_string();

    for (key, value) in ids {
        let placeholder = format!("{{{key}}}");
        let value = value.to_string();
        result = result.replace(&placeholder, &urlencoding::encode(&value));
    }

    result
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceOperation>();
    assert_send_sync::<ResourcePath>();
};
