/*
[INPUT]:  Mock Gemini and PostgREST endpoints
[OUTPUT]: Verified provider, leaderboard, and session wiring over HTTP
[POS]:    Integration tests - game crate collaborators
[UPDATE]: When changing how config builds providers or stores
*/

mod common;

use std::sync::Arc;
use std::time::Duration;

use bearfactory_game::{
    FallbackTaskProvider, GameError, GameSession, LeaderboardStore, Phase, RemoteLeaderboard,
    RemoteTaskProvider, RoundSummary, ScoreSubmission, TaskProvider,
};
use common::*;
use tokio_test::assert_ok;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_generation(server: &MockServer, status: u16, text: &str) {
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "gemini-test-key"))
        .respond_with(ResponseTemplate::new(status).set_body_json(generation_body(text)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn remote_provider_labels_generated_tasks() {
    let server = MockServer::start().await;
    mount_generation(&server, 200, GENERATED_TEXT).await;
    let config = config_for(&server);
    let provider = RemoteTaskProvider::new(Arc::new(config.client().unwrap()));

    let tasks = provider.generate("Launch a podcast").await.unwrap();

    assert_eq!(tasks.len(), 10);
    let relevant: Vec<_> = tasks.iter().filter(|task| task.is_relevant()).collect();
    assert_eq!(relevant.len(), 5);
    assert!(relevant.iter().all(|task| task.key().starts_with('r')));
    assert!(
        tasks
            .iter()
            .any(|task| task.text() == "Buy a microphone" && task.is_relevant())
    );
    assert!(
        tasks
            .iter()
            .any(|task| task.text() == "Polish old shoes" && !task.is_relevant())
    );
}

#[tokio::test]
async fn remote_provider_surfaces_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    let provider = RemoteTaskProvider::new(Arc::new(config_for(&server).client().unwrap()));

    let err = provider.generate("Launch a podcast").await.unwrap_err();
    assert!(matches!(err, GameError::ProviderUnavailable(_)));
}

#[tokio::test]
async fn fallback_provider_covers_malformed_output() {
    let server = MockServer::start().await;
    mount_generation(&server, 200, "Sure! Here are some ideas.").await;
    let client = Arc::new(config_for(&server).client().unwrap());
    let provider = FallbackTaskProvider::new(RemoteTaskProvider::new(client));

    let tasks = provider.generate("Launch a podcast").await.unwrap();

    assert_eq!(tasks.len(), 10);
    assert!(
        tasks
            .iter()
            .filter(|task| task.is_relevant())
            .all(|task| task.text().contains("launch a podcast"))
    );
}

#[tokio::test]
async fn configured_provider_without_key_still_yields_tasks() {
    let server = MockServer::start().await;
    let mut config = config_for(&server);
    config.provider.api_key = None;
    let provider = config.task_provider(Arc::new(config.client().unwrap()));

    let tasks = assert_ok!(provider.generate("Plant a garden").await);
    assert_eq!(tasks.len(), 10);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn submission_saves_once_through_remote_store() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(HIGH_SCORES_PATH))
        .and(header("apikey", "supabase-anon-key"))
        .and(body_partial_json(serde_json::json!([
            { "player_name": "Bruno", "score": 1500, "accuracy": 100.0, "tasks_completed": 10 }
        ])))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!([high_score_row(
                7, "Bruno", 1500
            )])),
        )
        .expect(1)
        .mount(&server)
        .await;
    let store = RemoteLeaderboard::new(Arc::new(config_for(&server).client().unwrap()));
    let mut submission = ScoreSubmission::new(RoundSummary {
        goal: "Launch a podcast".to_string(),
        score: 1500,
        correct_sorts: 10,
        missed: 0,
        total_tasks: 10,
    });

    let row = submission.submit(&store, "  Bruno ").await.unwrap();
    assert_eq!(row.id, "7");

    let again = submission.submit(&store, "Bruno").await.unwrap_err();
    assert!(matches!(again, GameError::AlreadySaved));
}

#[tokio::test]
async fn remote_store_failure_keeps_submission_open() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(HIGH_SCORES_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;
    let store = RemoteLeaderboard::new(Arc::new(config_for(&server).client().unwrap()));
    let mut submission = ScoreSubmission::new(RoundSummary {
        goal: "Launch a podcast".to_string(),
        score: 300,
        correct_sorts: 3,
        missed: 7,
        total_tasks: 10,
    });

    let err = submission.submit(&store, "Bruno").await.unwrap_err();
    assert!(matches!(err, GameError::PersistenceFailure(_)));
    assert!(err.is_retryable());
    assert!(!submission.is_saved());
}

#[tokio::test]
async fn configured_store_lists_top_scores() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(HIGH_SCORES_PATH))
        .and(query_param("order", "score.desc"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            high_score_row(1, "Bruno", 1500),
            high_score_row(2, "Kodiak", 1200)
        ])))
        .mount(&server)
        .await;
    let config = config_for(&server);
    let store = config.leaderboard_store(Arc::new(config.client().unwrap()));

    let rows = assert_ok!(store.top(2).await);
    let names: Vec<_> = rows.iter().map(|row| row.player_name.as_str()).collect();
    assert_eq!(names, ["Bruno", "Kodiak"]);
}

#[tokio::test]
async fn session_plays_generated_tasks() {
    let server = MockServer::start().await;
    mount_generation(&server, 200, GENERATED_TEXT).await;
    let config = config_for(&server);
    let client = Arc::new(config.client().unwrap());
    let shutdown = CancellationToken::new();
    let (handle, task) = GameSession::spawn(
        config.machine(),
        config.task_provider(client),
        shutdown.clone(),
    );

    assert_ok!(handle.start_round("Launch a podcast").await);
    let mut snapshots = handle.watch();
    let snapshot = tokio::time::timeout(
        Duration::from_secs(5),
        snapshots.wait_for(|snapshot| snapshot.active_task().is_some()),
    )
    .await
    .expect("round never went live")
    .expect("session closed")
    .clone();

    assert_eq!(snapshot.phase, Phase::Playing);
    assert_eq!(snapshot.goal, "Launch a podcast");
    assert_eq!(snapshot.tasks.len(), 10);
    assert!(snapshot.tasks.iter().any(|task| task.text() == "Record a trailer"));

    shutdown.cancel();
    task.await.unwrap();
}
