//! Mock server helpers for repository endpoints

use custodian_core::config::NetworkConfig;
use custodian_core::SchemaValidator;
use custodian_repository::RepositoryClient;
use serde_json::Value;
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Client pointed at the mock server
pub fn client_for(server: &MockServer) -> RepositoryClient {
    RepositoryClient::new(
        &Url::parse(&server.uri()).unwrap(),
        &NetworkConfig::default(),
        Arc::new(SchemaValidator::new().unwrap()),
    )
    .unwrap()
}

/// Serve a JSON document at `route`
pub async fn mock_json(server: &MockServer, route: &str, body: &Value) {
    Mock::given(method("GET"))
        .and(path(route.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Serve raw bytes at `route`
pub async fn mock_bytes(server: &MockServer, route: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

/// Answer `route` with a bare status code
pub async fn mock_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route.to_string()))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
