//! REST resource infrastructure for the Cumulocity API.
//!
//! This module maps platform objects onto the REST API:
//!
//! - **[`C8yResource`] trait**: JSON mapping, paths and key sets of a resource
//! - **[`TrackedResource<T>`]**: The model object, with change tracking and
//!   the `create`, `update`, `apply_to` and `delete` operations
//! - **[`ResourceCollection<T>`]**: Stateless collection accessor
//! - **[`Filter`] and [`Query`]**: Structured query construction
//! - **[`Pager<T>`]**: Lazy page-by-page retrieval
//! - **[`dates`]**: Timestamp conversion
//! - **[`ResourceError`]**: Semantic error types for resource operations
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use c8y_api::{C8yConfig, RestClient};
//! use c8y_api::rest::{Filter, TrackedResource};
//! use c8y_api::rest::resources::{Event, EventFilter, Events};
//!
//! let client = Arc::new(RestClient::new(&config)?);
//! let events = Events::new(Arc::clone(&client));
//!
//! // Create
//! let event = TrackedResource::new(Event::new("c8y_Test", "12345", "hello"))
//!     .with_client(Arc::clone(&client));
//! let mut created = event.create().await?;
//!
//! // Partial update: only `text` is sent
//! created.text = Some("updated".to_string());
//! let updated = created.update().await?;
//!
//! // Read lazily
//! let mut pager = events.select(EventFilter::new().source("12345").page_size(100))?;
//! while let Some(event) = pager.try_next().await? {
//!     println!("{:?}", event.text);
//! }
//!
//! // Delete
//! updated.delete().await?;
//! ```

mod collection;
pub mod dates;
mod errors;
mod page;
mod pager;
mod path;
mod query;
mod resource;
mod tracking;

pub mod resources;

// Public exports
pub use collection::ResourceCollection;
pub use errors::ResourceError;
pub use page::{Page, PageStatistics};
pub use pager::Pager;
pub use path::{build_path, get_path, ResourceOperation, ResourcePath};
pub use query::{BaseFilter, EventFilter, Filter, Query};
pub use resource::C8yResource;
pub use tracking::TrackedResource;
