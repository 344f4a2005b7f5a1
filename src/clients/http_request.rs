//! HTTP request types for the Cumulocity API client.
//!
//! This module provides the [`HttpRequest`] type and its builder for
//! constructing requests to the Cumulocity REST API.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use crate::clients::errors::InvalidHttpRequestError;
use crate::clients::rest::RestError;

/// Content type used for binary uploads when none is given.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// HTTP methods supported by the Cumulocity REST API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET method for retrieving resources.
    Get,
    /// HTTP POST method for creating resources.
    Post,
    /// HTTP PUT method for updating resources.
    Put,
    /// HTTP DELETE method for removing resources.
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Post => write!(f, "post"),
            Self::Put => write!(f, "put"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// A file to be uploaded, e.g. as an event attachment.
///
/// # Example
///
/// ```rust
/// use c8y_api::clients::FilePart;
///
/// let file = FilePart::new(b"hello".to_vec(), "hello.txt").content_type("text/plain");
/// assert_eq!(file.file_name(), "hello.txt");
/// assert_eq!(file.mime_type(), "text/plain");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FilePart {
    bytes: Vec<u8>,
    file_name: String,
    content_type: String,
}

impl FilePart {
    /// Creates a file part from in-memory bytes with the default
    /// `application/octet-stream` content type.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>, file_name: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: file_name.into(),
            content_type: OCTET_STREAM.to_string(),
        }
    }

    /// Reads a file from disk. The file name is taken from the path.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::InvalidFile`] if the file cannot be read.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, RestError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| RestError::InvalidFile {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "file".to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(bytes, file_name))
    }

    /// Sets the content type of the file.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Returns the file contents.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns the content type.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.content_type
    }
}

impl fmt::Debug for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// The body of a request.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    /// A JSON document sent as `application/json`.
    Json(serde_json::Value),
    /// Raw bytes sent with the given content type.
    Binary {
        /// The payload.
        bytes: Vec<u8>,
        /// The `Content-Type` header value.
        content_type: String,
    },
    /// A `multipart/form-data` form with a single `file` part.
    Multipart(FilePart),
}

/// An HTTP request to be sent to the Cumulocity API.
///
/// Use [`HttpRequest::builder`] to construct requests with the builder pattern.
///
/// # Example
///
/// ```rust
/// use c8y_api::clients::{HttpRequest, HttpMethod, RequestBody};
/// use serde_json::json;
///
/// // GET request
/// let get_request = HttpRequest::builder(HttpMethod::Get, "/event/events")
///     .query_param("pageSize", "10")
///     .build()
///     .unwrap();
///
/// // POST request with JSON body
/// let post_request = HttpRequest::builder(HttpMethod::Post, "/event/events")
///     .body(RequestBody::Json(json!({"type": "c8y_Test"})))
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The HTTP method for this request.
    pub http_method: HttpMethod,
    /// The absolute path (starting with `/`) for this request.
    pub path: String,
    /// The request body, if any.
    pub body: Option<RequestBody>,
    /// Query parameters to append to the URL.
    pub query: Option<BTreeMap<String, String>>,
    /// Overrides the default `Accept` header.
    pub accept: Option<String>,
    /// Additional headers to include in the request.
    pub extra_headers: Option<HashMap<String, String>>,
    /// Number of times to attempt the request (default: 1).
    pub tries: u32,
}

impl HttpRequest {
    /// Creates a new builder for constructing an `HttpRequest`.
    #[must_use]
    pub fn builder(method: HttpMethod, path: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, path)
    }

    /// Validates the request, ensuring it meets all requirements.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if:
    /// - `http_method` is `Post` or `Put` but `body` is `None`
    /// - `http_method` is `Get` or `Delete` but `body` is `Some`
    pub fn verify(&self) -> Result<(), InvalidHttpRequestError> {
        let method = self.http_method.to_string();
        match (self.http_method, &self.body) {
            (HttpMethod::Post | HttpMethod::Put, None) => {
                Err(InvalidHttpRequestError::MissingBody { method })
            }
            (HttpMethod::Get | HttpMethod::Delete, Some(_)) => {
                Err(InvalidHttpRequestError::UnexpectedBody { method })
            }
            _ => Ok(()),
        }
    }
}

/// Builder for constructing [`HttpRequest`] instances.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    http_method: HttpMethod,
    path: String,
    body: Option<RequestBody>,
    query: Option<BTreeMap<String, String>>,
    accept: Option<String>,
    extra_headers: Option<HashMap<String, String>>,
    tries: u32,
}

impl HttpRequestBuilder {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            http_method: method,
            path: path.into(),
            body: None,
            query: None,
            accept: None,
            extra_headers: None,
            tries: 1,
        }
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets all query parameters at once.
    #[must_use]
    pub fn query(mut self, query: BTreeMap<String, String>) -> Self {
        self.query = Some(query);
        self
    }

    /// Adds a single query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Sets the `Accept` header for this request.
    #[must_use]
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Adds a single extra header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Sets the number of times to attempt the request.
    ///
    /// Default is 1 (no retries).
    #[must_use]
    pub const fn tries(mut self, tries: u32) -> Self {
        self.tries = tries;
        self
    }

    /// Builds the [`HttpRequest`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the request fails validation.
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        let request = HttpRequest {
            http_method: self.http_method,
            path: self.path,
            body: self.body,
            query: self.query,
            accept: self.accept,
            extra_headers: self.extra_headers,
            tries: self.tries,
        };
        request.verify()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "get");
        assert_eq!(HttpMethod::Post.to_string(), "post");
        assert_eq!(HttpMethod::Put.to_string(), "put");
        assert_eq!(HttpMethod::Delete.to_string(), "delete");
    }

    #[test]
    fn test_builder_creates_valid_get_request() {
        let request = HttpRequest::builder(HttpMethod::Get, "/event/events/1")
            .accept("application/vnd.com.nsn.cumulocity.event+json")
            .build()
            .unwrap();

        assert_eq!(request.http_method, HttpMethod::Get);
        assert_eq!(request.path, "/event/events/1");
        assert!(request.body.is_none());
        assert_eq!(
            request.accept.as_deref(),
            Some("application/vnd.com.nsn.cumulocity.event+json")
        );
        assert_eq!(request.tries, 1);
    }

    #[test]
    fn test_builder_creates_valid_post_request() {
        let request = HttpRequest::builder(HttpMethod::Post, "/event/events")
            .body(RequestBody::Json(json!({"type": "c8y_Test"})))
            .build()
            .unwrap();

        assert_eq!(request.http_method, HttpMethod::Post);
        assert_eq!(
            request.body,
            Some(RequestBody::Json(json!({"type": "c8y_Test"})))
        );
    }

    #[test]
    fn test_verify_requires_body_for_put() {
        let result = HttpRequest::builder(HttpMethod::Put, "/event/events/1").build();

        assert!(matches!(
            result,
            Err(InvalidHttpRequestError::MissingBody { method }) if method == "put"
        ));
    }

    #[test]
    fn test_verify_rejects_body_for_delete() {
        let result = HttpRequest::builder(HttpMethod::Delete, "/event/events/1")
            .body(RequestBody::Json(json!({})))
            .build();

        assert!(matches!(
            result,
            Err(InvalidHttpRequestError::UnexpectedBody { method }) if method == "delete"
        ));
    }

    #[test]
    fn test_builder_with_query_params_is_ordered() {
        let request = HttpRequest::builder(HttpMethod::Get, "/event/events")
            .query_param("type", "c8y_Test")
            .query_param("pageSize", "50")
            .build()
            .unwrap();

        let query = request.query.unwrap();
        let keys: Vec<&str> = query.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["pageSize", "type"]);
    }

    #[test]
    fn test_file_part_defaults_to_octet_stream() {
        let file = FilePart::new(vec![1, 2, 3], "data.bin");
        assert_eq!(file.mime_type(), OCTET_STREAM);
        assert_eq!(file.bytes(), &[1, 2, 3]);
        assert!(format!("{file:?}").contains("len: 3"));
    }

    #[tokio::test]
    async fn test_file_part_from_missing_path_fails() {
        let result = FilePart::from_path("/definitely/not/here.bin").await;
        assert!(matches!(result, Err(RestError::InvalidFile { .. })));
    }
}
