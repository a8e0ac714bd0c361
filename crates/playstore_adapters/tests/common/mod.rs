#![allow(dead_code)]

use playstore_adapters::{ClientOptions, PlayStoreClient};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

pub const TEST_KEY_PEM: &str = include_str!("../fixtures/test_key.pem");

pub const PACKAGE: &str = "com.example.app";
pub const ACCESS_TOKEN: &str = "ya29.test-access-token";
pub const BEARER: &str = "Bearer ya29.test-access-token";

/// Service account key whose token endpoint is `token_uri`
pub fn service_account_json(token_uri: &str) -> Vec<u8> {
    service_account_json_with_key(token_uri, TEST_KEY_PEM)
}

pub fn service_account_json_with_key(token_uri: &str, private_key: &str) -> Vec<u8> {
    json!({
        "type": "service_account",
        "project_id": "billing-test",
        "private_key_id": "key-1",
        "private_key": private_key,
        "client_email": "verifier@billing-test.iam.gserviceaccount.com",
        "client_id": "1234567890",
        "auth_uri": "https://accounts.google.com/o/oauth2/auth",
        "token_uri": token_uri
    })
    .to_string()
    .into_bytes()
}

pub fn token_uri(server: &MockServer) -> String {
    format!("{}/token", server.uri())
}

/// Token endpoint mock accepting JWT-bearer grants
pub fn token_mock(expires_in: u64) -> Mock {
    token_mock_builder().respond_with(token_response(expires_in))
}

/// Token endpoint matchers, before a response is attached
pub fn token_mock_builder() -> MockBuilder {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .and(body_string_contains("assertion="))
}

pub fn token_response(expires_in: u64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": ACCESS_TOKEN,
        "token_type": "Bearer",
        "expires_in": expires_in
    }))
}

/// Client whose token endpoint and API both point at `server`
pub async fn client_for(server: &MockServer) -> PlayStoreClient {
    token_mock(3600).mount(server).await;
    PlayStoreClient::new(
        &service_account_json(&token_uri(server)),
        ClientOptions::new().with_base_url(server.uri()),
    )
    .await
    .expect("client construction failed")
}

pub fn purchases_path(rest: &str) -> String {
    format!(
        "/androidpublisher/v3/applications/{}/purchases/{}",
        PACKAGE, rest
    )
}
