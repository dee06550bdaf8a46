/*
[INPUT]:  Mock HTTP responses
[OUTPUT]: Test results for HTTP client
[POS]:    Integration tests - HTTP endpoints
[UPDATE]: When HTTP endpoints change
*/

mod common;

use bearfactory_adapter::{
    ClientConfig, DEFAULT_MODEL, FactoryClient, FactoryError, NewHighScore, Relevance,
};
use common::{client_for, generation_body, setup_mock_server, test_credentials};
use rstest::rstest;
use std::time::Duration;
use tokio_test::assert_ok;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

const TEN_LINES: &str = "Relevant: Outline the first episode\n\
Relevant: Pick recording software\n\
Relevant: Invite two guests\n\
Relevant: Design cover artwork\n\
Relevant: Publish trailer episode\n\
Irrelevant: Reorganize the garage\n\
Irrelevant: Binge a cooking show\n\
Irrelevant: Tweak podcast font again\n\
Irrelevant: Research medieval castles\n\
Irrelevant: Polish old shoes";

#[test]
fn test_client_creation() {
    let client = assert_ok!(FactoryClient::new());
    assert_eq!(client.model(), DEFAULT_MODEL);
    assert!(!client.has_leaderboard());
}

#[test]
fn test_client_with_config() {
    let config = ClientConfig::default();
    let _client = assert_ok!(FactoryClient::with_config(config));
}

#[test]
fn test_client_rejects_bad_leaderboard_url() {
    let result = FactoryClient::with_config_and_base_urls(
        ClientConfig::default(),
        "https://generativelanguage.googleapis.com",
        Some("not a url"),
    );
    assert!(matches!(result, Err(FactoryError::UrlParse(_))));
}

#[test]
fn test_client_credentials_roundtrip() {
    let mut client = assert_ok!(FactoryClient::new());
    client.set_credentials(test_credentials());

    let stored = client.credentials();
    assert_eq!(stored.gemini_api_key.as_deref(), Some("gemini-test-key"));
    assert_eq!(stored.supabase_anon_key.as_deref(), Some("supabase-anon-key"));
}

#[tokio::test]
async fn test_generate_tasks_with_custom_model() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-pro:generateContent"))
        .and(query_param("key", "gemini-test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(generation_body(TEN_LINES)))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.set_model("gemini-1.5-pro");

    let tasks = assert_ok!(client.generate_tasks("Launch a podcast").await);
    assert_eq!(tasks.len(), 10);
    assert_eq!(tasks[0].relevance, Relevance::Relevant);
    assert_eq!(tasks[9].relevance, Relevance::Irrelevant);
    assert_eq!(tasks[9].text, "Polish old shoes");
}

#[rstest]
#[case::prose_only("Sure! Here are some ideas for your goal.")]
#[case::missing_irrelevant("Relevant: a\nRelevant: b\nRelevant: c\nRelevant: d\nRelevant: e")]
#[case::four_and_five(
    "Relevant: a\nRelevant: b\nRelevant: c\nRelevant: d\n\
     Irrelevant: v\nIrrelevant: w\nIrrelevant: x\nIrrelevant: y\nIrrelevant: z"
)]
#[tokio::test]
async fn test_generate_tasks_insufficient_items(#[case] text: &str) {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(generation_body(text)))
        .mount(&server)
        .await;

    let err = client_for(&server).generate_tasks("goal").await.unwrap_err();
    assert!(matches!(err, FactoryError::InvalidResponse(_)), "got {err:?}");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_generate_tasks_malformed_json() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).generate_tasks("goal").await.unwrap_err();
    assert!(matches!(err, FactoryError::Serialization(_)));
}

#[tokio::test]
async fn test_generate_tasks_timeout() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(generation_body(TEN_LINES))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let config = ClientConfig {
        timeout: Duration::from_millis(100),
        connect_timeout: Duration::from_millis(100),
    };
    let mut client =
        assert_ok!(FactoryClient::with_config_and_base_urls(config, &server.uri(), None));
    client.set_credentials(test_credentials());

    let err = client.generate_tasks("goal").await.unwrap_err();
    assert!(matches!(err, FactoryError::Timeout { .. }), "got {err:?}");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_save_then_list_high_scores() {
    let server = setup_mock_server().await;
    let stored = serde_json::json!({
        "id": "b1d3",
        "player_name": "Kodiak",
        "score": 1180,
        "goal": "Learn to code",
        "accuracy": 80.0,
        "tasks_completed": 10,
        "created_at": "2026-10-01T08:30:00.123456+00:00"
    });

    Mock::given(method("POST"))
        .and(path("/rest/v1/high_scores"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([stored])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/high_scores"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([stored])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let entry = NewHighScore {
        player_name: "Kodiak".to_string(),
        score: 1180,
        goal: "Learn to code".to_string(),
        accuracy: 80.0,
        tasks_completed: 10,
    };

    let saved = assert_ok!(client.insert_high_score(&entry).await);
    assert_eq!(saved.id, "b1d3");

    let top = assert_ok!(client.top_high_scores(3).await);
    assert_eq!(top, vec![saved]);
}

#[tokio::test]
async fn test_insert_empty_representation_is_invalid() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/high_scores"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let entry = NewHighScore {
        player_name: "Kodiak".to_string(),
        score: 0,
        goal: "g".to_string(),
        accuracy: 0.0,
        tasks_completed: 10,
    };
    let err = client_for(&server).insert_high_score(&entry).await.unwrap_err();
    assert!(matches!(err, FactoryError::InvalidResponse(_)));
}
