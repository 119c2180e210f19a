use std::time::Duration;

use errors::StoreError;
use storage::RestTenantStore;
use tenant_core::{TenantFilter, TenantId, TenantStore};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACME_ID: &str = "55502b1e-8c4d-4f1a-9a57-0c6c5b9e4a11";

fn store_for(mock_server: &MockServer) -> RestTenantStore {
    RestTenantStore::new(
        &mock_server.uri(),
        "organizations",
        Some("anon-key".to_string()),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_find_by_subdomain_returns_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/organizations"))
        .and(query_param("subdomain", "ilike.acme"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "id": ACME_ID,
                "name": "Acme Community Church",
                "subdomain": "acme",
                "custom_domain": null,
                "website_enabled": true
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server);
    let record = store
        .find_one(&TenantFilter::by_subdomain("acme"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(record.id, TenantId::parse(ACME_ID).unwrap());
    assert_eq!(record.display_name, "Acme Community Church");
    assert!(record.is_servable);
}

#[tokio::test]
async fn test_empty_array_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/organizations"))
        .and(query_param("custom_domain", "ilike.ghost.org"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server);
    let result = store
        .find_one(&TenantFilter::by_custom_domain("ghost.org"))
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server);
    let err = store
        .find_one(&TenantFilter::by_subdomain("acme"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        StoreError::Unavailable {
            backend: "rest".to_string(),
            status: 503,
        },
    );
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_client_error_is_permanent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_string("column does not exist"))
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server);
    let err = store
        .find_one(&TenantFilter::by_subdomain("acme"))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::QueryError { .. }));
    assert!(!err.is_transient());
    assert!(err.to_string().contains("column does not exist"));
}

#[tokio::test]
async fn test_malformed_body_is_serialization_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server);
    let err = store
        .find_one(&TenantFilter::by_subdomain("acme"))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::SerializationError { .. }));
}

#[tokio::test]
async fn test_unreachable_backend_is_connection_error() {
    let store = RestTenantStore::new(
        "http://127.0.0.1:9",
        "organizations",
        None,
        Duration::from_secs(2),
    )
    .unwrap();

    let err = store
        .find_one(&TenantFilter::by_subdomain("acme"))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::ConnectionError { .. }));
    assert!(err.is_transient());
}
