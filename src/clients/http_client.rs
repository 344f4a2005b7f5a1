//! HTTP client for Cumulocity API communication.
//!
//! This module provides the [`HttpClient`] type for making authenticated
//! requests to the Cumulocity REST API with automatic retry handling.

use std::collections::HashMap;
use std::fmt;

use base64::Engine;

use crate::clients::errors::{HttpError, HttpResponseError, MaxHttpRetriesExceededError};
use crate::clients::http_request::{HttpMethod, HttpRequest, RequestBody};
use crate::clients::http_response::HttpResponse;
use crate::config::C8yConfig;

/// Fixed retry wait time in seconds.
pub const RETRY_WAIT_TIME: u64 = 1;

/// Library version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Header carrying the application key of microservices and web apps.
pub const APPLICATION_KEY_HEADER: &str = "X-Cumulocity-Application-Key";

/// HTTP client for making requests to the Cumulocity API.
///
/// The client handles:
/// - Base URI construction from the configured tenant URL
/// - Default headers including User-Agent and Basic authorization
/// - Automatic retry logic for 429 and 500 responses
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use c8y_api::clients::{HttpClient, HttpRequest, HttpMethod};
///
/// let client = HttpClient::new(&config)?;
///
/// let request = HttpRequest::builder(HttpMethod::Get, "/event/events")
///     .build()
///     .unwrap();
///
/// let response = client.request(request).await?;
/// ```
pub struct HttpClient {
    client: reqwest::Client,
    /// Base URI (e.g., `https://tenant.cumulocity.com`).
    base_uri: String,
    /// Default headers to include in all requests.
    default_headers: HashMap<String, String>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client for the configured tenant.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the underlying reqwest client cannot
    /// be created (e.g., TLS initialization failure).
    pub fn new(config: &C8yConfig) -> Result<Self, HttpError> {
        let base_uri = config.base_url().as_ref().to_string();

        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent = format!(
            "{user_agent_prefix}Cumulocity API Library v{SDK_VERSION} | Rust {rust_version}"
        );

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());
        default_headers.insert(
            "Authorization".to_string(),
            Self::basic_authorization(config),
        );
        if let Some(key) = config.application_key() {
            default_headers.insert(APPLICATION_KEY_HEADER.to_string(), key.to_string());
        }

        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            base_uri,
            default_headers,
        })
    }

    /// Builds the Basic authorization header value.
    ///
    /// The user is prefixed with `{tenant}/` when a tenant ID is configured.
    fn basic_authorization(config: &C8yConfig) -> String {
        let user = config.tenant_id().map_or_else(
            || config.username().as_ref().to_string(),
            |tenant| format!("{}/{}", tenant.as_ref(), config.username().as_ref()),
        );
        let credentials = format!("{user}:{}", config.password().as_ref());
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        )
    }

    /// Returns the base URI for this client.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Sends an HTTP request to the Cumulocity API.
    ///
    /// This method handles:
    /// - Request validation
    /// - URL construction
    /// - Header merging
    /// - Response parsing
    /// - Retry logic for 429 and 500 responses
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - Network error occurs (`Network`)
    /// - Non-2xx response received (`Response`)
    /// - Max retries exceeded (`MaxRetries`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = format!("{}{}", self.base_uri, request.path);

        let mut headers = self.default_headers.clone();
        if let Some(accept) = &request.accept {
            headers.insert("Accept".to_string(), accept.clone());
        }
        if let Some(extra) = &request.extra_headers {
            for (key, value) in extra {
                headers.insert(key.clone(), value.clone());
            }
        }

        let mut tries: u32 = 0;
        loop {
            tries += 1;

            let mut req_builder = match request.http_method {
                HttpMethod::Get => self.client.get(&url),
                HttpMethod::Post => self.client.post(&url),
                HttpMethod::Put => self.client.put(&url),
                HttpMethod::Delete => self.client.delete(&url),
            };

            for (key, value) in &headers {
                req_builder = req_builder.header(key, value);
            }

            if let Some(query) = &request.query {
                req_builder = req_builder.query(query);
            }

            // Bodies are rebuilt per attempt, a multipart form cannot be cloned
            match &request.body {
                Some(RequestBody::Json(value)) => {
                    req_builder = req_builder
                        .header(reqwest::header::CONTENT_TYPE, "application/json")
                        .body(value.to_string());
                }
                Some(RequestBody::Binary {
                    bytes,
                    content_type,
                }) => {
                    req_builder = req_builder
                        .header(reqwest::header::CONTENT_TYPE, content_type.as_str())
                        .body(bytes.clone());
                }
                Some(RequestBody::Multipart(file)) => {
                    let part = reqwest::multipart::Part::bytes(file.bytes().to_vec())
                        .file_name(file.file_name().to_string())
                        .mime_str(file.mime_type())?;
                    req_builder =
                        req_builder.multipart(reqwest::multipart::Form::new().part("file", part));
                }
                None => {}
            }

            tracing::debug!(
                method = %request.http_method,
                path = %request.path,
                attempt = tries,
                "Sending request to Cumulocity"
            );

            let res = req_builder.send().await?;

            let code = res.status().as_u16();
            let res_headers = Self::parse_response_headers(res.headers());
            let bytes = res.bytes().await?.to_vec();

            let response = HttpResponse::new(code, res_headers, bytes);

            if response.is_ok() {
                return Ok(response);
            }

            let error_message = Self::serialize_error(&response);
            let error_reference = Self::error_reference(&response);

            let should_retry = code == 429 || code == 500;
            if !should_retry {
                return Err(HttpError::Response(HttpResponseError {
                    code,
                    message: error_message,
                    error_reference,
                }));
            }

            if tries >= request.tries {
                if request.tries <= 1 {
                    return Err(HttpError::Response(HttpResponseError {
                        code,
                        message: error_message,
                        error_reference,
                    }));
                }
                return Err(HttpError::MaxRetries(MaxHttpRetriesExceededError {
                    code,
                    tries: request.tries,
                    message: error_message,
                    error_reference,
                }));
            }

            let delay = Self::calculate_retry_delay(&response, code);
            tracing::warn!(
                status = code,
                path = %request.path,
                attempt = tries,
                delay_secs = delay.as_secs_f64(),
                "Retrying Cumulocity request"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Parses response headers into a `HashMap` with lower-cased names.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    /// Calculates the retry delay based on response and status code.
    fn calculate_retry_delay(response: &HttpResponse, status: u16) -> std::time::Duration {
        // 500 always waits the fixed delay
        if status == 429 {
            // Negative, non-finite and out-of-range values fall back too
            if let Some(delay) = response
                .retry_request_after
                .and_then(|secs| std::time::Duration::try_from_secs_f64(secs).ok())
            {
                return delay;
            }
        }
        std::time::Duration::from_secs(RETRY_WAIT_TIME)
    }

    fn error_reference(response: &HttpResponse) -> Option<String> {
        response
            .body
            .get("error")
            .and_then(serde_json::Value::as_str)
            .map(String::from)
    }

    /// Serializes a Cumulocity error document into a JSON message.
    ///
    /// Non-JSON error bodies are kept as `raw_body`.
    fn serialize_error(response: &HttpResponse) -> String {
        let mut error_body = serde_json::Map::new();

        for key in ["error", "message", "info"] {
            if let Some(value) = response.body.get(key) {
                error_body.insert(key.to_string(), value.clone());
            }
        }

        if error_body.is_empty() && !response.bytes.is_empty() {
            error_body.insert(
                "raw_body".to_string(),
                serde_json::Value::String(response.text()),
            );
        }

        serde_json::to_string(&error_body).unwrap_or_else(|_| "{}".to_string())
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_uri", &self.base_uri)
            .finish_non_exhaustive()
    }
}
