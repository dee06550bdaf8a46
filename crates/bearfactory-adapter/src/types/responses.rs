/*
[INPUT]:  Gemini generateContent response schema
[OUTPUT]: Typed response structs with text extraction
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};

use super::requests::Content;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()
            .map(|part| part.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_text_present() {
        let body = r#"{
            "candidates": [
                {
                    "content": { "parts": [ { "text": "Relevant: a" } ], "role": "model" },
                    "finishReason": "STOP"
                }
            ]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(body).expect("parse");
        assert_eq!(response.first_text(), Some("Relevant: a"));
        assert_eq!(response.candidates[0].finish_reason.as_deref(), Some("STOP"));
    }

    #[test]
    fn test_first_text_missing_candidates() {
        let response: GenerateContentResponse =
            serde_json::from_str("{}").expect("parse empty object");
        assert_eq!(response.first_text(), None);
    }
}
