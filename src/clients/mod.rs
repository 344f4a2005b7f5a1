//! HTTP client types for Cumulocity API communication.
//!
//! This module provides the transport layer for making authenticated
//! requests to the Cumulocity REST API. It handles request/response
//! processing and retry logic.
//!
//! # Overview
//!
//! - [`HttpClient`]: The async HTTP client for API communication
//! - [`HttpRequest`]: A request to be sent to the API
//! - [`HttpResponse`]: A parsed response from the API
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PUT, DELETE)
//! - [`RequestBody`]: JSON, raw binary or multipart request bodies
//! - [`FilePart`]: A file to upload
//! - [`rest::RestClient`]: Higher-level REST API client
//! - [`rest::RestError`]: REST-specific error types
//!
//! # Retry Behavior
//!
//! - **429 (Too Many Requests)**: Retries using `Retry-After` header value, or 1 second if not present
//! - **500 (Server Error)**: Retries with fixed 1-second delay
//! - **Other errors**: Returns immediately without retry
//!
//! The default `tries` is 1, meaning no automatic retries.

mod errors;
mod http_client;
mod http_request;
mod http_response;
pub mod rest;

pub use errors::{
    HttpError, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};
pub use http_client::{HttpClient, APPLICATION_KEY_HEADER, SDK_VERSION};
pub use http_request::{
    FilePart, HttpMethod, HttpRequest, HttpRequestBuilder, RequestBody, OCTET_STREAM,
};
pub use http_response::HttpResponse;

pub use rest::{RestClient, RestError};
