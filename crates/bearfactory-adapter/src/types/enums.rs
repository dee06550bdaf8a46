/*
[INPUT]:  Generated task line prefixes
[OUTPUT]: Typed relevance label with parsing helpers
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When the generation prompt format changes
*/

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    Relevant,
    Irrelevant,
}

impl Relevance {
    /// Line prefix used by the generation prompt, e.g. `Relevant:`
    pub fn prefix(self) -> &'static str {
        match self {
            Relevance::Relevant => "Relevant:",
            Relevance::Irrelevant => "Irrelevant:",
        }
    }

    /// Split a generated line into its label and the trimmed task text.
    ///
    /// Returns `None` for lines that carry neither prefix or whose text is empty.
    pub fn split_line(line: &str) -> Option<(Self, &str)> {
        let line = line.trim();
        [Relevance::Relevant, Relevance::Irrelevant]
            .into_iter()
            .find_map(|label| {
                line.strip_prefix(label.prefix())
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
                    .map(|text| (label, text))
            })
    }

    pub fn is_relevant(self) -> bool {
        matches!(self, Relevance::Relevant)
    }
}
