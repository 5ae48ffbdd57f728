use serde::{Deserialize, Serialize};

/// Where a location clue came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClueSource {
    WebEntity,
    Landmark,
    PageTitle,
}

/// A candidate place name surfaced by visual web search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationClue {
    pub text: String,
    /// Relevance in `0.0..=1.0`.
    pub score: f64,
    pub source: ClueSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl LocationClue {
    pub fn new(text: impl Into<String>, score: f64, source: ClueSource) -> Self {
        Self {
            text: text.into(),
            score,
            source,
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}
