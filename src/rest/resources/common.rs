//! Types shared by several resources.

use serde::{Deserialize, Serialize};

/// Reference to the managed object (device or asset) an object belongs to.
///
/// Serialized as `{"id": "..."}`. Other keys the platform adds to the
/// reference (`name`, `self`) are ignored when parsing.
///
/// # Example
///
/// ```rust
/// use c8y_api::rest::resources::SourceRef;
///
/// let source = SourceRef::new("12345");
/// assert_eq!(serde_json::to_value(&source).unwrap(), serde_json::json!({"id": "12345"}));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SourceRef {
    /// The managed object ID.
    pub id: String,
}

impl SourceRef {
    /// Creates a reference to the given managed object.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl From<&str> for SourceRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
