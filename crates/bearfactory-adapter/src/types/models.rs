/*
[INPUT]:  Gemini generated text and Supabase high_scores rows
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
[UPDATE]: 2026-09-02 Accept numeric or string ids for high_scores rows
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::enums::Relevance;

/// One task line extracted from a generation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedTask {
    pub text: String,
    pub relevance: Relevance,
}

/// A row of the `high_scores` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScore {
    #[serde(deserialize_with = "serde_helpers::deserialize_id")]
    pub id: String,
    pub player_name: String,
    pub score: u32,
    pub goal: String,
    pub accuracy: f64,
    pub tasks_completed: u32,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the `high_scores` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHighScore {
    pub player_name: String,
    pub score: u32,
    pub goal: String,
    pub accuracy: f64,
    pub tasks_completed: u32,
}

mod serde_helpers {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        })
    }
}
