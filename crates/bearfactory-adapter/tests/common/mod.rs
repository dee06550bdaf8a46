/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for bearfactory-adapter tests

use bearfactory_adapter::{ClientConfig, Credentials, FactoryClient};
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client wired to the mock server for both services, with test keys
pub fn client_for(server: &MockServer) -> FactoryClient {
    let mut client = FactoryClient::with_config_and_base_urls(
        ClientConfig::default(),
        &server.uri(),
        Some(&server.uri()),
    )
    .expect("client init");
    client.set_credentials(test_credentials());
    client
}

pub fn test_credentials() -> Credentials {
    Credentials {
        gemini_api_key: Some("gemini-test-key".to_string()),
        supabase_anon_key: Some("supabase-anon-key".to_string()),
    }
}

/// Gemini response body wrapping the given text
pub fn generation_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [
            {
                "content": { "parts": [ { "text": text } ], "role": "model" },
                "finishReason": "STOP"
            }
        ]
    })
}
