//! Integration tests for event attachments.
//!
//! A stateful mock keeps the uploaded content so the full lifecycle
//! (upload, download, replace, delete) can be verified.

use std::sync::{Arc, Mutex};

use c8y_api::clients::FilePart;
use c8y_api::rest::resources::{Event, Events, BINARY_FRAGMENT};
use c8y_api::rest::ResourceError;
use c8y_api::{BaseUrl, C8yConfig, Password, RestClient, TrackedResource, Username};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const BINARIES_PATH: &str = "/event/events/1/binaries";

type Storage = Arc<Mutex<Option<Vec<u8>>>>;

/// Extracts the content of the single part of a multipart body.
fn multipart_content(body: &[u8]) -> Vec<u8> {
    let delimiter_end = body
        .windows(2)
        .position(|w| w == b"\r\n")
        .expect("multipart delimiter");
    let mut closing = b"\r\n".to_vec();
    closing.extend_from_slice(&body[..delimiter_end]);

    let content_start = body
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("part headers")
        + 4;
    let content_len = body[content_start..]
        .windows(closing.len())
        .position(|w| w == closing.as_slice())
        .expect("closing delimiter");
    body[content_start..content_start + content_len].to_vec()
}

fn binary_metadata(length: usize) -> serde_json::Value {
    json!({
        "name": "notes.txt",
        "type": "text/plain",
        "length": length,
        "source": "1",
        "self": "https://t.example.com/event/events/1/binaries",
        "created": "2024-03-08T10:00:00.000+00:00"
    })
}

struct Upload(Storage);

impl Respond for Upload {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut stored = self.0.lock().unwrap();
        if stored.is_some() {
            return ResponseTemplate::new(409)
                .set_body_json(json!({"error": "event/Duplicate binary"}));
        }
        let content = multipart_content(&request.body);
        let length = content.len();
        *stored = Some(content);
        ResponseTemplate::new(201).set_body_json(binary_metadata(length))
    }
}

struct Replace(Storage);

impl Respond for Replace {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let length = request.body.len();
        *self.0.lock().unwrap() = Some(request.body.clone());
        ResponseTemplate::new(201).set_body_json(binary_metadata(length))
    }
}

struct Download(Storage);

impl Respond for Download {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        match self.0.lock().unwrap().as_ref() {
            Some(content) => ResponseTemplate::new(200).set_body_bytes(content.clone()),
            None => ResponseTemplate::new(404)
                .set_body_json(json!({"error": "event/Not Found", "message": "no binary"})),
        }
    }
}

struct Remove(Storage);

impl Respond for Remove {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        match self.0.lock().unwrap().take() {
            Some(_) => ResponseTemplate::new(204),
            None => ResponseTemplate::new(404),
        }
    }
}

async fn start_server() -> MockServer {
    let server = MockServer::start().await;
    let storage: Storage = Arc::new(Mutex::new(None));

    Mock::given(method("POST"))
        .and(path(BINARIES_PATH))
        .respond_with(Upload(Arc::clone(&storage)))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(BINARIES_PATH))
        .respond_with(Replace(Arc::clone(&storage)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(BINARIES_PATH))
        .respond_with(Download(Arc::clone(&storage)))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(BINARIES_PATH))
        .respond_with(Remove(storage))
        .mount(&server)
        .await;

    server
}

fn create_client(server: &MockServer) -> Arc<RestClient> {
    let config = C8yConfig::builder()
        .base_url(BaseUrl::new(server.uri()).unwrap())
        .username(Username::new("admin").unwrap())
        .password(Password::new("secret").unwrap())
        .build()
        .unwrap();
    Arc::new(RestClient::new(&config).unwrap())
}

#[tokio::test]
async fn test_attachment_lifecycle_by_id() {
    let server = start_server().await;
    let events = Events::new(create_client(&server));
    let content = b"line one\r\nline two\n\x00\xff".to_vec();

    assert_eq!(events.attachment_path("1").unwrap(), BINARIES_PATH);

    let binary = events
        .create_attachment("1", FilePart::new(content.clone(), "notes.txt"))
        .await
        .unwrap();
    assert_eq!(binary.name.as_deref(), Some("notes.txt"));
    assert_eq!(binary.length, Some(content.len() as u64));
    assert!(binary.extra.contains_key("created"));

    let downloaded = events.download_attachment("1").await.unwrap();
    assert_eq!(downloaded, content);

    // A second upload conflicts with the existing attachment
    let result = events
        .create_attachment("1", FilePart::new(b"other".to_vec(), "other.txt"))
        .await;
    assert_eq!(result.unwrap_err().status_code(), Some(409));

    events.delete_attachment("1").await.unwrap();

    let result = events.download_attachment("1").await;
    assert!(matches!(result, Err(ResourceError::NotFound { .. })));
}

#[tokio::test]
async fn test_attachment_lifecycle_on_tracked_event() {
    let server = start_server().await;
    let client = create_client(&server);

    let event = TrackedResource::<Event>::from_json(&json!({
        "id": "1",
        "type": "c8y_Test",
        "time": "2024-03-08T10:00:00.000+00:00",
        "source": {"id": "100"},
        "c8y_IsBinary": {}
    }))
    .unwrap()
    .with_client(client);
    assert!(event.fragments.contains_key(BINARY_FRAGMENT));
    assert!(event.has_attachment());

    event
        .create_attachment(FilePart::new(b"first".to_vec(), "notes.txt"))
        .await
        .unwrap();
    assert_eq!(event.download_attachment().await.unwrap(), b"first".to_vec());

    let binary = event
        .update_attachment(
            FilePart::new(b"second version".to_vec(), "notes.txt").content_type("text/plain"),
        )
        .await
        .unwrap();
    assert_eq!(binary.content_type.as_deref(), Some("text/plain"));
    assert_eq!(
        event.download_attachment().await.unwrap(),
        b"second version".to_vec()
    );

    event.delete_attachment().await.unwrap();
    let result = event.download_attachment().await;
    assert!(matches!(result, Err(ResourceError::NotFound { .. })));
}

#[tokio::test]
async fn test_attachment_on_new_event_requires_id() {
    let server = start_server().await;
    let event = TrackedResource::new(Event::new("c8y_Test", "100", "no id"))
        .with_client(create_client(&server));

    let result = event.download_attachment().await;

    assert!(matches!(result, Err(ResourceError::MissingId { .. })));
    assert!(server.received_requests().await.unwrap().is_empty());
}
