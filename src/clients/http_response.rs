//! HTTP response types for the Cumulocity API client.
//!
//! This module provides the [`HttpResponse`] type for accessing API response
//! data.

use std::collections::HashMap;

/// An HTTP response from the Cumulocity API.
///
/// Contains the response status code, headers, the body parsed as JSON and
/// the raw body bytes. Binary downloads (attachments) use the raw bytes.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers with lower-cased names (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body; an empty object when the body is empty or not JSON.
    pub body: serde_json::Value,
    /// The raw response body.
    pub bytes: Vec<u8>,
    /// Seconds to wait before retrying (from `Retry-After` header).
    pub retry_request_after: Option<f64>,
}

impl HttpResponse {
    /// Creates a new `HttpResponse` from status, headers and raw body.
    ///
    /// The body is parsed as JSON when possible. The `Retry-After` header is
    /// parsed into `retry_request_after`.
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, bytes: Vec<u8>) -> Self {
        let body = if bytes.is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| serde_json::json!({}))
        };

        let retry_request_after = headers
            .get("retry-after")
            .and_then(|values| values.first())
            .and_then(|value| value.parse::<f64>().ok());

        Self {
            code,
            headers,
            body,
            bytes,
            retry_request_after,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the first value of a header (name is matched case-insensitively).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the `Content-Type` header value, if present.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Returns the body as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_ok_returns_true_for_2xx() {
        for code in 200..=299 {
            let response = HttpResponse::new(code, HashMap::new(), Vec::new());
            assert!(
                response.is_ok(),
                "Expected is_ok() to be true for code {code}"
            );
        }
    }

    #[test]
    fn test_is_ok_returns_false_for_4xx_and_5xx() {
        for code in [400, 401, 404, 422, 429, 500] {
            let response = HttpResponse::new(code, HashMap::new(), Vec::new());
            assert!(!response.is_ok());
        }
    }

    #[test]
    fn test_json_body_is_parsed() {
        let response = HttpResponse::new(200, HashMap::new(), br#"{"id":"42"}"#.to_vec());
        assert_eq!(response.body, json!({"id": "42"}));
    }

    #[test]
    fn test_binary_body_keeps_bytes_and_empty_json() {
        let response = HttpResponse::new(200, HashMap::new(), vec![0xff, 0x00, 0x10]);
        assert_eq!(response.body, json!({}));
        assert_eq!(response.bytes, vec![0xff, 0x00, 0x10]);
    }

    #[test]
    fn test_retry_after_parsing() {
        let mut headers = HashMap::new();
        headers.insert("retry-after".to_string(), vec!["2.5".to_string()]);

        let response = HttpResponse::new(429, headers, Vec::new());
        assert!((response.retry_request_after.unwrap() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), vec!["text/plain".to_string()]);

        let response = HttpResponse::new(200, headers, b"hello".to_vec());
        assert_eq!(response.header("Content-Type"), Some("text/plain"));
        assert_eq!(response.content_type(), Some("text/plain"));
        assert_eq!(response.text(), "hello");
    }
}
