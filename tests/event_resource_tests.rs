//! Integration tests for the event resource.
//!
//! These tests run the event accessor and tracked events against a mock
//! Cumulocity server and verify the requests sent for each operation.

use std::collections::HashMap;
use std::sync::Arc;

use c8y_api::rest::resources::{Event, EventFilter, Events};
use c8y_api::rest::{Filter, ResourceError};
use c8y_api::{BaseUrl, C8yConfig, Password, RestClient, TrackedResource, Username};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const EVENT_ACCEPT: &str = "application/vnd.com.nsn.cumulocity.event+json";

fn create_client(server: &MockServer) -> Arc<RestClient> {
    let config = C8yConfig::builder()
        .base_url(BaseUrl::new(server.uri()).unwrap())
        .username(Username::new("admin").unwrap())
        .password(Password::new("secret").unwrap())
        .build()
        .unwrap();
    Arc::new(RestClient::new(&config).unwrap())
}

fn event_json(id: &str) -> Value {
    json!({
        "id": id,
        "self": format!("https://t.example.com/event/events/{id}"),
        "type": "c8y_Test",
        "time": "2024-03-08T10:00:00.000+00:00",
        "text": format!("event {id}"),
        "source": {"id": "100", "self": "https://t.example.com/inventory/managedObjects/100"},
        "creationTime": "2024-03-08T10:00:01.000+00:00",
        "lastUpdated": "2024-03-08T10:00:01.000+00:00",
        "c8y_Position": {"lat": 51.2, "lng": 6.7}
    })
}

fn events_page(ids: &[&str], page: u32, page_size: u32) -> Value {
    json!({
        "events": ids.iter().map(|id| event_json(id)).collect::<Vec<_>>(),
        "statistics": {"currentPage": page, "pageSize": page_size},
        "self": "https://t.example.com/event/events"
    })
}

fn query_of(request: &Request) -> HashMap<String, String> {
    request.url.query_pairs().into_owned().collect()
}

// ============================================================================
// Get Tests
// ============================================================================

#[tokio::test]
async fn test_get_parses_event_and_attaches_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/event/events/1"))
        .and(header("Accept", EVENT_ACCEPT))
        .respond_with(ResponseTemplate::new(200).set_body_json(event_json("1")))
        .expect(1)
        .mount(&server)
        .await;

    let events = Events::new(create_client(&server));
    let event = events.get("1").await.unwrap();

    assert_eq!(event.id.as_deref(), Some("1"));
    assert_eq!(event.event_type.as_deref(), Some("c8y_Test"));
    assert_eq!(event.source.as_ref().unwrap().id, "100");
    assert_eq!(event.fragments["c8y_Position"]["lat"], 51.2);
    assert_eq!(
        event.datetime().unwrap(),
        Some(Utc.with_ymd_and_hms(2024, 3, 8, 10, 0, 0).unwrap())
    );
    assert!(event.client().is_some());
    assert!(!event.is_dirty());
}

#[tokio::test]
async fn test_get_missing_event_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/event/events/999"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "event/Not Found"})),
        )
        .mount(&server)
        .await;

    let events = Events::new(create_client(&server));
    let result = events.get("999").await;

    match result {
        Err(ResourceError::NotFound { resource, id }) => {
            assert_eq!(resource, "Event");
            assert_eq!(id, "999");
        }
        other => panic!("Expected NotFound, got {other:?}"),
    }
}

// ============================================================================
// Select Tests
// ============================================================================

#[tokio::test]
async fn test_select_is_lazy_and_respects_limit() {
    let server = MockServer::start().await;
    for (page, ids) in [(1, ["1", "2"]), (2, ["3", "4"]), (3, ["5", "6"])] {
        Mock::given(method("GET"))
            .and(path("/event/events"))
            .and(query_param("currentPage", page.to_string().as_str()))
            .and(query_param("pageSize", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(events_page(&ids, page, 2)))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/event/events"))
        .and(query_param("currentPage", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_page(&[], 4, 2)))
        .expect(0)
        .mount(&server)
        .await;

    let events = Events::new(create_client(&server));
    let mut pager = events
        .select(EventFilter::new().page_size(2).limit(5))
        .unwrap();

    assert!(server.received_requests().await.unwrap().is_empty());

    let mut ids = Vec::new();
    while let Some(event) = pager.try_next().await.unwrap() {
        ids.push(event.id.clone().unwrap());
    }

    assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    assert_eq!(pager.pages_fetched(), 3);
    assert!(pager.try_next().await.unwrap().is_none());
    assert_eq!(pager.pages_fetched(), 3);
}

#[tokio::test]
async fn test_select_stops_on_short_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/event/events"))
        .and(query_param("currentPage", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_page(&["1", "2"], 1, 3)))
        .expect(1)
        .mount(&server)
        .await;

    let events = Events::new(create_client(&server));
    let all = events
        .get_all(EventFilter::new().page_size(3))
        .await
        .unwrap();

    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|event| event.client().is_some()));
}

#[tokio::test]
async fn test_select_continues_when_platform_caps_page_size() {
    let server = MockServer::start().await;
    let pages: [&[&str]; 4] = [&["1", "2"], &["3", "4"], &["5", "6"], &[]];
    for (index, ids) in pages.iter().enumerate() {
        let page = u32::try_from(index).unwrap() + 1;
        Mock::given(method("GET"))
            .and(path("/event/events"))
            .and(query_param("pageSize", "5"))
            .and(query_param("currentPage", page.to_string().as_str()))
            // The platform reports the reduced size it actually used
            .respond_with(ResponseTemplate::new(200).set_body_json(events_page(ids, page, 2)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let events = Events::new(create_client(&server));
    let all = events
        .get_all(EventFilter::new().page_size(5))
        .await
        .unwrap();

    let ids: Vec<_> = all.iter().map(|event| event.id.clone().unwrap()).collect();
    assert_eq!(ids, ["1", "2", "3", "4", "5", "6"]);
}

#[tokio::test]
async fn test_select_last_page_number() {
    let server = MockServer::start().await;
    let last = u32::MAX.to_string();
    Mock::given(method("GET"))
        .and(path("/event/events"))
        .and(query_param("currentPage", last.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_page(&["1"], 1, 1000)))
        .expect(1)
        .mount(&server)
        .await;

    let events = Events::new(create_client(&server));
    let all = events
        .get_all(EventFilter::new().page_number(u32::MAX))
        .await
        .unwrap();

    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_select_single_page_mode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/event/events"))
        .and(query_param("currentPage", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_page(&["3", "4"], 2, 2)))
        .expect(1)
        .mount(&server)
        .await;

    let events = Events::new(create_client(&server));
    let mut pager = events
        .select(EventFilter::new().page_size(2).page_number(2))
        .unwrap();

    let mut count = 0;
    while pager.try_next().await.unwrap().is_some() {
        count += 1;
    }

    assert_eq!(count, 2);
    assert_eq!(pager.pages_fetched(), 1);
}

#[tokio::test]
async fn test_select_sends_filter_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/event/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_page(&[], 1, 1000)))
        .mount(&server)
        .await;

    let events = Events::new(create_client(&server));
    let after = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let all = events
        .get_all(
            EventFilter::new()
                .resource_type("c8y_Test")
                .source("100")
                .fragment("c8y_Position")
                .after(after)
                .reverse(true),
        )
        .await
        .unwrap();
    assert!(all.is_empty());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let query = query_of(&requests[0]);
    assert_eq!(query["type"], "c8y_Test");
    assert_eq!(query["source"], "100");
    assert_eq!(query["fragmentType"], "c8y_Position");
    assert_eq!(query["dateFrom"], "2024-01-01T00:00:00.000+00:00");
    assert_eq!(query["revert"], "true");
    assert_eq!(query["pageSize"], "1000");
    assert_eq!(query["currentPage"], "1");
}

#[test]
fn test_filter_aliases_produce_identical_queries() {
    let time = Utc.with_ymd_and_hms(2024, 2, 1, 8, 30, 0).unwrap();

    let pairs = [
        (EventFilter::new().before(time), EventFilter::new().date_to(time)),
        (EventFilter::new().after(time), EventFilter::new().date_from(time)),
        (
            EventFilter::new().created_before(time),
            EventFilter::new().created_to(time),
        ),
        (
            EventFilter::new().created_after(time),
            EventFilter::new().created_from(time),
        ),
        (
            EventFilter::new().updated_before(time),
            EventFilter::new().last_updated_to(time),
        ),
        (
            EventFilter::new().updated_after(time),
            EventFilter::new().last_updated_from(time),
        ),
    ];

    for (alias, canonical) in pairs {
        assert_eq!(alias.base_query().unwrap(), canonical.base_query().unwrap());
    }
}

#[test]
fn test_conflicting_age_and_bound_are_rejected() {
    let result = EventFilter::new()
        .before("2024-01-01T00:00:00Z")
        .min_age(Duration::hours(1))
        .base_query();
    assert!(matches!(result, Err(ResourceError::ConflictingFilters { .. })));
}

// ============================================================================
// Create, Update and Delete Tests
// ============================================================================

#[tokio::test]
async fn test_bulk_create_defaults_time_and_sends_full_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/event/events"))
        .and(header("Accept", EVENT_ACCEPT))
        .respond_with(ResponseTemplate::new(201).set_body_json(event_json("10")))
        .expect(1)
        .mount(&server)
        .await;

    let events = Events::new(create_client(&server));
    let mut objects = vec![TrackedResource::new(
        Event::new("c8y_Test", "100", "created").with_fragment("c8y_Custom", json!({"a": 1})),
    )];

    let created = events.create(&mut objects).await.unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].id.as_deref(), Some("10"));
    assert!(objects[0].time.is_some());

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["type"], "c8y_Test");
    assert_eq!(body["source"]["id"], "100");
    assert_eq!(body["c8y_Custom"]["a"], 1);
    assert_eq!(body["time"], json!(objects[0].time));
    assert!(body.get("id").is_none());
    assert!(body.get("creationTime").is_none());
}

#[tokio::test]
async fn test_tracked_create_returns_fresh_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/event/events"))
        .respond_with(ResponseTemplate::new(201).set_body_json(event_json("11")))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let event = TrackedResource::new(Event::new("c8y_Test", "100", "created"))
        .with_client(Arc::clone(&client));

    let created = event.create().await.unwrap();

    assert_eq!(created.id.as_deref(), Some("11"));
    assert!(created.client().is_some());
    assert!(event.time.is_none());
}

#[tokio::test]
async fn test_update_sends_only_changed_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/event/events/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(event_json("1")))
        .mount(&server)
        .await;

    let mut updated = event_json("1");
    updated["text"] = json!("changed");
    Mock::given(method("PUT"))
        .and(path("/event/events/1"))
        .and(body_json(json!({"text": "changed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(updated))
        .expect(1)
        .mount(&server)
        .await;

    let events = Events::new(create_client(&server));
    let mut event = events.get("1").await.unwrap();
    event.text = Some("changed".to_string());
    assert_eq!(event.changed_fields(), vec!["text".to_string()]);

    let result = event.update().await.unwrap();
    assert_eq!(result.text.as_deref(), Some("changed"));
    assert!(!result.is_dirty());
}

#[tokio::test]
async fn test_apply_to_sends_template_diff_to_each_id() {
    let server = MockServer::start().await;
    for id in ["1", "2"] {
        Mock::given(method("PUT"))
            .and(path(format!("/event/events/{id}").as_str()))
            .and(body_json(json!({"text": "bulk"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(event_json(id)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let events = Events::new(create_client(&server));
    let mut template = TrackedResource::new(Event::default());
    template.text = Some("bulk".to_string());

    events.apply_to(&template, &["1", "2"]).await.unwrap();
}

#[tokio::test]
async fn test_delete_by_sends_base_query_only() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/event/events"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let events = Events::new(create_client(&server));
    events
        .delete_by(
            EventFilter::new()
                .resource_type("c8y_Obsolete")
                .page_size(5)
                .reverse(true),
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let query = query_of(&requests[0]);
    assert_eq!(query.len(), 1);
    assert_eq!(query["type"], "c8y_Obsolete");
}

#[tokio::test]
async fn test_delete_by_without_filter_sends_nothing() {
    let server = MockServer::start().await;
    let events = Events::new(create_client(&server));

    let result = events.delete_by(EventFilter::new()).await;

    assert!(matches!(result, Err(ResourceError::UnboundedDelete { .. })));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_by_ids_and_tracked_delete() {
    let server = MockServer::start().await;
    for id in ["1", "2", "3"] {
        Mock::given(method("DELETE"))
            .and(path(format!("/event/events/{id}").as_str()))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/event/events/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(event_json("3")))
        .mount(&server)
        .await;

    let events = Events::new(create_client(&server));
    events.delete(&["1", "2"]).await.unwrap();

    let event = events.get("3").await.unwrap();
    tokio_test::assert_ok!(event.delete().await);
}
