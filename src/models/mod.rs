use serde::{Deserialize, Serialize};

pub use dish::{Catalog, Dish};

use crate::services::{EmotionalContext, ScoredDish};

mod dish;

/// Body accepted by `/search` and `/smart-search`.
///
/// `query` is optional at the wire level so a missing key can be reported
/// as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
}

impl SearchRequest {
    /// The query text, if present and not blank.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref().filter(|q| !q.trim().is_empty())
    }
}

/// `/search` body, used both for ranked results and for the degraded fallback.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse<'a> {
    pub query: &'a str,
    pub result: Vec<&'a Dish>,
}

/// One ranked entry of a `/smart-search` response.
#[derive(Debug, Clone, Serialize)]
pub struct SmartSearchItem<'a> {
    pub dish: &'a Dish,
    pub confidence_score: f32,
    pub reasoning: String,
    pub similarity: f32,
}

impl<'a> From<ScoredDish<'a>> for SmartSearchItem<'a> {
    fn from(scored: ScoredDish<'a>) -> Self {
        Self {
            dish: scored.dish,
            confidence_score: scored.score,
            reasoning: scored.reasoning,
            similarity: scored.similarity,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SmartSearchResponse<'a> {
    pub query: &'a str,
    pub emotional_analysis: EmotionalContext,
    pub explanation: String,
    pub result: Vec<SmartSearchItem<'a>>,
    pub total_found: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub dishes: usize,
}
