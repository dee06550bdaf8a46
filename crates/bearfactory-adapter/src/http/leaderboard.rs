/*
[INPUT]:  Final round aggregates and Supabase project URL/anon key
[OUTPUT]: Inserted high score rows and top-N listings
[POS]:    HTTP layer - high_scores table via PostgREST
[UPDATE]: When the high_scores schema or ordering changes
*/

use crate::http::{FactoryClient, FactoryError, Result};
use crate::types::{HighScore, NewHighScore};
use reqwest::Method;

const HIGH_SCORES_ENDPOINT: &str = "rest/v1/high_scores";

impl FactoryClient {
    /// Insert one high score and return the stored row
    ///
    /// POST /rest/v1/high_scores (Prefer: return=representation)
    pub async fn insert_high_score(&self, entry: &NewHighScore) -> Result<HighScore> {
        let builder = self
            .leaderboard_request(Method::POST, HIGH_SCORES_ENDPOINT)?
            .header("Prefer", "return=representation")
            .json(&[entry]);
        let rows: Vec<HighScore> = self.send_json(builder).await?;
        rows.into_iter().next().ok_or_else(|| {
            FactoryError::InvalidResponse("insert returned no rows".to_string())
        })
    }

    /// Query the best scores, highest first
    ///
    /// GET /rest/v1/high_scores?select=*&order=score.desc&limit={limit}
    pub async fn top_high_scores(&self, limit: usize) -> Result<Vec<HighScore>> {
        let limit = limit.to_string();
        let builder = self
            .leaderboard_request(Method::GET, HIGH_SCORES_ENDPOINT)?
            .query(&[("select", "*"), ("order", "score.desc"), ("limit", limit.as_str())]);
        self.send_json(builder).await
    }
}

#[cfg(test)]
mod tests {
    use crate::http::{ClientConfig, Credentials, FactoryClient, FactoryError};
    use crate::types::NewHighScore;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> FactoryClient {
        let mut client = FactoryClient::with_config_and_base_urls(
            ClientConfig::default(),
            &server.uri(),
            Some(&server.uri()),
        )
        .expect("client init");
        client.set_credentials(Credentials {
            gemini_api_key: None,
            supabase_anon_key: Some("anon".to_string()),
        });
        client
    }

    fn row(id: i64, name: &str, score: u32) -> serde_json::Value {
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

    #[tokio::test]
    async fn test_insert_high_score() {
        let server = MockServer::start().await;
        let entry = NewHighScore {
            player_name: "Bruno".to_string(),
            score: 1500,
            goal: "Launch a podcast".to_string(),
            accuracy: 100.0,
            tasks_completed: 10,
        };

        Mock::given(method("POST"))
            .and(path("/rest/v1/high_scores"))
            .and(header("apikey", "anon"))
            .and(header("authorization", "Bearer anon"))
            .and(header("prefer", "return=representation"))
            .and(body_json(serde_json::json!([entry])))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!([row(7, "Bruno", 1500)])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let stored = client_for(&server)
            .insert_high_score(&entry)
            .await
            .expect("insert_high_score failed");
        assert_eq!(stored.id, "7");
        assert_eq!(stored.player_name, "Bruno");
        assert_eq!(stored.score, 1500);
    }

    #[tokio::test]
    async fn test_top_high_scores_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/high_scores"))
            .and(query_param("select", "*"))
            .and(query_param("order", "score.desc"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                row(1, "Bruno", 1500),
                row(2, "Kodiak", 1200)
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let scores = client_for(&server)
            .top_high_scores(10)
            .await
            .expect("top_high_scores failed");
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].player_name, "Bruno");
    }

    #[tokio::test]
    async fn test_leaderboard_requires_url() {
        let mut client = FactoryClient::new().expect("client init");
        client.set_credentials(Credentials {
            gemini_api_key: None,
            supabase_anon_key: Some("anon".to_string()),
        });
        assert!(!client.has_leaderboard());

        let err = client.top_high_scores(10).await.unwrap_err();
        assert!(matches!(err, FactoryError::Config(_)));
    }

    #[tokio::test]
    async fn test_insert_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "3"))
            .mount(&server)
            .await;

        let entry = NewHighScore {
            player_name: "Bruno".to_string(),
            score: 10,
            goal: "g".to_string(),
            accuracy: 10.0,
            tasks_completed: 10,
        };
        let err = client_for(&server).insert_high_score(&entry).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(err.retry_delay(), Some(3));
    }
}
