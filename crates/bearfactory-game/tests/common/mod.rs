/*
[INPUT]:  Mock server handles
[OUTPUT]: Game configs pointed at the mock server and canned response bodies
[POS]:    Test infrastructure - shared across integration tests
[UPDATE]: When adding new test patterns or fixtures
*/

#![allow(dead_code)]

use bearfactory_game::GameConfig;
use wiremock::MockServer;

pub const GENERATE_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";
pub const HIGH_SCORES_PATH: &str = "/rest/v1/high_scores";

pub const GENERATED_TEXT: &str = "Relevant: Outline first episode\n\
    Irrelevant: Alphabetize spice rack\n\
    Relevant: Buy a microphone\n\
    Relevant: Pick a podcast name\n\
    Irrelevant: Binge a cooking show\n\
    Relevant: Record a trailer\n\
    Irrelevant: Reorganize the garage\n\
    Relevant: Submit to directories\n\
    Irrelevant: Polish old shoes\n\
    Irrelevant: Browse vacation photos\n";

/// Config with both services pointed at `server` and tour disabled
pub fn config_for(server: &MockServer) -> GameConfig {
    let mut config = GameConfig::default();
    config.provider.api_key = Some("gemini-test-key".to_string());
    config.provider.base_url = Some(server.uri());
    config.leaderboard.url = Some(server.uri());
    config.leaderboard.anon_key = Some("supabase-anon-key".to_string());
    config.game.tour = false;
    config
}

/// Gemini response body wrapping the given text
pub fn generation_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ], "role": "model" } }
        ]
    })
}

pub fn high_score_row(id: i64, name: &str, score: u32) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "player_name": name,
        "score": score,
        "goal": "Launch a podcast",
        "accuracy": 100.0,
        "tasks_completed": 10,
        "created_at": "2026-09-01T12:00:00Z"
    })
}
