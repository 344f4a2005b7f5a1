//! REST client implementation for the Cumulocity API.
//!
//! This module provides the [`RestClient`] type for making REST API requests
//! with automatic path normalization and retry handling.

use std::collections::BTreeMap;

use crate::clients::rest::RestError;
use crate::clients::{FilePart, HttpClient, HttpMethod, HttpRequest, HttpResponse, RequestBody};
use crate::config::C8yConfig;

/// REST API client for the Cumulocity platform.
///
/// Provides the JSON verbs (`get`, `post`, `put`, `delete`) and the binary
/// verbs (`get_file`, `post_file`, `put_file`) used by the resource layer.
/// Every request is attempted up to the configured number of `tries`.
///
/// # Thread Safety
///
/// `RestClient` is `Send + Sync`, making it safe to share across async tasks,
/// typically wrapped in an [`Arc`](std::sync::Arc).
///
/// # Example
///
/// ```rust,ignore
/// use c8y_api::{RestClient, C8yConfig};
///
/// let client = RestClient::new(&config)?;
///
/// // GET request
/// let response = client.get("/event/events/42", None, None).await?;
///
/// // POST request with body
/// let body = serde_json::json!({"type": "c8y_Test", "text": "hello"});
/// let response = client.post("/event/events", body, None).await?;
/// ```
#[derive(Debug)]
pub struct RestClient {
    http_client: HttpClient,
    tries: u32,
    page_size: u32,
}

// Verify RestClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RestClient>();
};

impl RestClient {
    /// Creates a new REST client for the configured tenant.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Http`] if the HTTP client cannot be created.
    pub fn new(config: &C8yConfig) -> Result<Self, RestError> {
        let http_client = HttpClient::new(config)?;

        tracing::debug!(
            base_url = %config.base_url(),
            tries = config.tries(),
            "Created Cumulocity REST client"
        );

        Ok(Self {
            http_client,
            tries: config.tries(),
            page_size: config.page_size(),
        })
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        self.http_client.base_uri()
    }

    /// Returns the default page size for collection queries.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Sends a GET request to the specified path.
    ///
    /// # Arguments
    ///
    /// * `path` - The REST API path (e.g., "/event/events/42")
    /// * `query` - Optional query parameters
    /// * `accept` - Optional `Accept` header override
    ///
    /// # Errors
    ///
    /// Returns [`RestError::InvalidPath`] if the path is invalid (e.g., empty).
    /// Returns [`RestError::Http`] for HTTP-level errors.
    pub async fn get(
        &self,
        path: &str,
        query: Option<BTreeMap<String, String>>,
        accept: Option<&str>,
    ) -> Result<HttpResponse, RestError> {
        self.make_request(HttpMethod::Get, path, None, query, accept)
            .await
    }

    /// Sends a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::InvalidPath`] if the path is invalid.
    /// Returns [`RestError::Http`] for HTTP-level errors.
    pub async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
        accept: Option<&str>,
    ) -> Result<HttpResponse, RestError> {
        self.make_request(
            HttpMethod::Post,
            path,
            Some(RequestBody::Json(body)),
            None,
            accept,
        )
        .await
    }

    /// Sends a PUT request with a JSON body.
    ///
    /// Query parameters are used by bulk updates that select their targets
    /// by filter.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::InvalidPath`] if the path is invalid.
    /// Returns [`RestError::Http`] for HTTP-level errors.
    pub async fn put(
        &self,
        path: &str,
        body: serde_json::Value,
        query: Option<BTreeMap<String, String>>,
        accept: Option<&str>,
    ) -> Result<HttpResponse, RestError> {
        self.make_request(
            HttpMethod::Put,
            path,
            Some(RequestBody::Json(body)),
            query,
            accept,
        )
        .await
    }

    /// Sends a DELETE request to the specified path.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::InvalidPath`] if the path is invalid.
    /// Returns [`RestError::Http`] for HTTP-level errors.
    pub async fn delete(
        &self,
        path: &str,
        query: Option<BTreeMap<String, String>>,
    ) -> Result<HttpResponse, RestError> {
        self.make_request(HttpMethod::Delete, path, None, query, None)
            .await
    }

    /// Downloads binary content from the specified path.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::InvalidPath`] if the path is invalid.
    /// Returns [`RestError::Http`] for HTTP-level errors.
    pub async fn get_file(&self, path: &str) -> Result<Vec<u8>, RestError> {
        let response = self
            .make_request(HttpMethod::Get, path, None, None, Some("*/*"))
            .await?;
        Ok(response.bytes)
    }

    /// Uploads a file as `multipart/form-data` with a single `file` part.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::InvalidPath`] if the path is invalid.
    /// Returns [`RestError::Http`] for HTTP-level errors.
    pub async fn post_file(
        &self,
        path: &str,
        file: FilePart,
        accept: Option<&str>,
    ) -> Result<HttpResponse, RestError> {
        self.make_request(
            HttpMethod::Post,
            path,
            Some(RequestBody::Multipart(file)),
            None,
            accept,
        )
        .await
    }

    /// Replaces binary content with the raw file bytes.
    ///
    /// The file's content type is sent as `Content-Type`.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::InvalidPath`] if the path is invalid.
    /// Returns [`RestError::Http`] for HTTP-level errors.
    pub async fn put_file(
        &self,
        path: &str,
        file: FilePart,
        accept: Option<&str>,
    ) -> Result<HttpResponse, RestError> {
        let body = RequestBody::Binary {
            content_type: file.mime_type().to_string(),
            bytes: file.bytes().to_vec(),
        };
        self.make_request(HttpMethod::Put, path, Some(body), None, accept)
            .await
    }

    async fn make_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<RequestBody>,
        query: Option<BTreeMap<String, String>>,
        accept: Option<&str>,
    ) -> Result<HttpResponse, RestError> {
        let normalized_path = normalize_path(path)?;

        let mut builder = HttpRequest::builder(method, normalized_path).tries(self.tries);

        if let Some(body) = body {
            builder = builder.body(body);
        }

        if let Some(query) = query {
            if !query.is_empty() {
                builder = builder.query(query);
            }
        }

        if let Some(accept) = accept {
            builder = builder.accept(accept);
        }

        let request = builder.build().map_err(|e| RestError::Http(e.into()))?;

        self.http_client.request(request).await.map_err(Into::into)
    }
}

/// Normalizes a REST API path.
///
/// This function:
/// 1. Ensures exactly one leading `/`
/// 2. Strips trailing `/` characters
/// 3. Returns an error for empty paths
fn normalize_path(path: &str) -> Result<String, RestError> {
    let trimmed = path.trim().trim_matches('/');

    if trimmed.is_empty() {
        return Err(RestError::InvalidPath {
            path: path.to_string(),
        });
    }

    Ok(format!("/{trimmed}"))
}
