//! # Cumulocity IoT API for Rust
//!
//! A client library for the Cumulocity IoT REST API, mapping platform
//! objects such as events and alarms onto typed Rust structs.
//!
//! ## Overview
//!
//! This library provides:
//! - Type-safe configuration via [`C8yConfig`] and [`C8yConfigBuilder`]
//! - Validated newtypes for the tenant URL and credentials
//! - Async HTTP client with Basic authentication and retry handling
//! - JSON mapping with open fragment maps for custom data
//! - Change tracking so updates only send what was modified
//! - Structured filters and lazy page-by-page retrieval
//! - Binary attachments of events
//!
//! ## Quick Start
//!
//! ```rust
//! use c8y_api::{C8yConfig, BaseUrl, TenantId, Username, Password};
//!
//! let config = C8yConfig::builder()
//!     .base_url(BaseUrl::new("example.cumulocity.com").unwrap())
//!     .tenant_id(TenantId::new("t12345").unwrap())
//!     .username(Username::new("device-admin").unwrap())
//!     .password(Password::new("secret").unwrap())
//!     .tries(3)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.base_url().as_ref(), "https://example.cumulocity.com");
//! ```
//!
//! ## Working with Events
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use c8y_api::{RestClient, TrackedResource};
//! use c8y_api::rest::Filter;
//! use c8y_api::rest::resources::{Event, EventFilter, Events};
//!
//! let client = Arc::new(RestClient::new(&config)?);
//! let events = Events::new(Arc::clone(&client));
//!
//! // Create an event; the time defaults to now
//! let event = TrackedResource::new(Event::new("c8y_DoorOpened", "12345", "Door opened"))
//!     .with_client(Arc::clone(&client));
//! let created = event.create().await?;
//!
//! // Read the last hour of events of the device
//! let recent = events
//!     .get_all(EventFilter::new().source("12345").max_age(chrono::Duration::hours(1)))
//!     .await?;
//! ```
//!
//! ## Working with Alarms
//!
//! ```rust,ignore
//! use c8y_api::rest::Filter;
//! use c8y_api::rest::resources::{AlarmFilter, AlarmStatus, Alarms};
//!
//! let alarms = Alarms::new(Arc::clone(&client));
//! let active = alarms
//!     .count(AlarmFilter::new().source("12345").status(AlarmStatus::Active))
//!     .await?;
//! ```
//!
//! ## Logging
//!
//! The library emits [`tracing`] events (requests and page fetches at
//! `debug`, retries at `warn`, bulk deletions at `info`). Install a
//! subscriber in the application to see them.
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: Newtypes validate on construction; preconditions
//!   are checked before any request
//! - **Thread-safe**: All types are `Send + Sync`
//! - **Async-first**: Designed for use with Tokio async runtime

pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

// Re-export public types at crate root for convenience
pub use config::{
    BaseUrl, C8yConfig, C8yConfigBuilder, Password, TenantId, Username, DEFAULT_PAGE_SIZE,
};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    FilePart, HttpClient, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder, HttpResponse,
    HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError, RequestBody,
    RestClient, RestError,
};

// Re-export resource types
pub use rest::{ResourceCollection, ResourceError, TrackedResource};
