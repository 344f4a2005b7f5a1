//! Integration tests for the Cumulocity API library.
//!
//! These tests verify end-to-end functionality of the configuration system
//! and the wiring from configuration to resource accessors.

use std::sync::Arc;

use c8y_api::rest::resources::{Alarms, Events};
use c8y_api::{
    BaseUrl, C8yConfig, ConfigError, Password, RestClient, TenantId, Username, DEFAULT_PAGE_SIZE,
};

#[test]
fn test_full_workflow_create_newtypes_build_config_access_fields() {
    let config = C8yConfig::builder()
        .base_url(BaseUrl::new("https://tenant.cumulocity.com/apps/cockpit/").unwrap())
        .tenant_id(TenantId::new("t12345").unwrap())
        .username(Username::new("device-admin").unwrap())
        .password(Password::new("secret").unwrap())
        .application_key("my-app-key")
        .user_agent_prefix("TestApp/1.0")
        .tries(3)
        .build()
        .unwrap();

    assert_eq!(config.base_url().as_ref(), "https://tenant.cumulocity.com");
    assert_eq!(config.tenant_id().unwrap().as_ref(), "t12345");
    assert_eq!(config.username().as_ref(), "device-admin");
    assert_eq!(config.application_key(), Some("my-app-key"));
    assert_eq!(config.user_agent_prefix(), Some("TestApp/1.0"));
    assert_eq!(config.tries(), 3);
    assert_eq!(config.page_size(), DEFAULT_PAGE_SIZE);
}

#[test]
fn test_missing_required_fields_are_reported_in_order() {
    let result = C8yConfig::builder().build();
    assert!(matches!(
        result,
        Err(ConfigError::MissingRequiredField { field: "base_url" })
    ));

    let result = C8yConfig::builder()
        .base_url(BaseUrl::new("tenant.cumulocity.com").unwrap())
        .build();
    assert!(matches!(
        result,
        Err(ConfigError::MissingRequiredField { field: "username" })
    ));

    let result = C8yConfig::builder()
        .base_url(BaseUrl::new("tenant.cumulocity.com").unwrap())
        .username(Username::new("admin").unwrap())
        .build();
    assert!(matches!(
        result,
        Err(ConfigError::MissingRequiredField { field: "password" })
    ));
}

#[test]
fn test_invalid_newtypes_are_rejected() {
    assert!(matches!(
        Username::new(""),
        Err(ConfigError::EmptyUsername)
    ));
    assert!(matches!(
        Password::new(""),
        Err(ConfigError::EmptyPassword)
    ));
    assert!(BaseUrl::new("").is_err());
}

#[test]
fn test_password_is_masked_in_debug_output() {
    let config = C8yConfig::builder()
        .base_url(BaseUrl::new("tenant.cumulocity.com").unwrap())
        .username(Username::new("admin").unwrap())
        .password(Password::new("super-secret-password").unwrap())
        .build()
        .unwrap();

    let debug = format!("{config:?}");
    assert!(!debug.contains("super-secret-password"));
}

#[test]
fn test_multi_tenant_scenario_independent_clients() {
    let config_a = C8yConfig::builder()
        .base_url(BaseUrl::new("tenant-a.cumulocity.com").unwrap())
        .username(Username::new("admin").unwrap())
        .password(Password::new("secret-a").unwrap())
        .build()
        .unwrap();
    let config_b = C8yConfig::builder()
        .base_url(BaseUrl::new("tenant-b.cumulocity.com").unwrap())
        .username(Username::new("admin").unwrap())
        .password(Password::new("secret-b").unwrap())
        .page_size(50)
        .build()
        .unwrap();

    let client_a = Arc::new(RestClient::new(&config_a).unwrap());
    let client_b = Arc::new(RestClient::new(&config_b).unwrap());

    assert_eq!(client_a.base_uri(), "https://tenant-a.cumulocity.com");
    assert_eq!(client_b.base_uri(), "https://tenant-b.cumulocity.com");
    assert_eq!(client_a.page_size(), DEFAULT_PAGE_SIZE);
    assert_eq!(client_b.page_size(), 50);

    let events = Events::new(Arc::clone(&client_a));
    let alarms = Alarms::new(Arc::clone(&client_b));
    assert_eq!(events.resource_path().unwrap(), "/event/events");
    assert_eq!(alarms.resource_path().unwrap(), "/alarm/alarms");
    assert!(Arc::ptr_eq(events.client(), &client_a));
}

#[test]
fn test_public_types_are_thread_safe() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<C8yConfig>();
    assert_send_sync::<RestClient>();
    assert_send_sync::<Events>();
    assert_send_sync::<Alarms>();
    assert_send_sync::<c8y_api::TrackedResource<c8y_api::rest::resources::Event>>();
    assert_send_sync::<c8y_api::rest::Pager<c8y_api::rest::resources::Alarm>>();
}
