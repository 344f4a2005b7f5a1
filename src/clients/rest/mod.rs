//! REST API client for the Cumulocity platform.
//!
//! This module provides a higher-level REST API client built on top of the
//! [`HttpClient`](crate::clients::HttpClient).
//!
//! # Overview
//!
//! - [`RestClient`]: The REST API client with JSON and binary verbs
//! - [`RestError`]: Error type for REST API operations
//!
//! # Example
//!
//! ```rust,ignore
//! use c8y_api::{RestClient, C8yConfig, BaseUrl, Username, Password};
//!
//! let config = C8yConfig::builder()
//!     .base_url(BaseUrl::new("tenant.cumulocity.com").unwrap())
//!     .username(Username::new("admin").unwrap())
//!     .password(Password::new("secret").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let client = RestClient::new(&config)?;
//! let response = client.get("/event/events", None, None).await?;
//! println!("Events: {}", response.body["events"]);
//! ```
//!
//! # Path Normalization
//!
//! Paths always start with a single `/` and never end with one:
//! `event/events/` becomes `/event/events`. An empty path is rejected.
//!
//! # Retry Behavior
//!
//! Every request is attempted up to `tries` times (see
//! [`C8yConfigBuilder::tries`](crate::config::C8yConfigBuilder::tries)) when
//! the platform answers 429 or 500.

mod client;
mod errors;

pub use client::RestClient;
pub use errors::RestError;
