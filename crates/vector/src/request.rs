//! Request and response payloads for serving layers
//!
//! A server wrapping the engine deserializes `QueryRequest`, calls
//! `RetrievalEngine::answer` and serializes the `QueryResponse`.

use serde::{Deserialize, Serialize};
use snipsearch_common::{EngineConfig, Result, SnipSearchError};

use crate::types::SearchResult;

/// Incoming query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Free-text question
    pub question: String,

    /// Requested result count (config default when absent)
    #[serde(default)]
    pub n_results: Option<usize>,
}

impl QueryRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            n_results: None,
        }
    }

    pub fn with_n_results(mut self, n_results: usize) -> Self {
        self.n_results = Some(n_results);
        self
    }

    /// Trimmed question and validated result count
    pub fn resolve(&self, config: &EngineConfig) -> Result<(String, usize)> {
        let question = self.question.trim();
        if question.is_empty() {
            return Err(SnipSearchError::invalid_argument("Question cannot be empty"));
        }

        let k = self.n_results.unwrap_or(config.default_top_k);
        if k == 0 || k > config.max_top_k {
            return Err(SnipSearchError::invalid_argument(format!(
                "n_results must be between 1 and {}",
                config.max_top_k
            )));
        }

        Ok((question.to_string(), k))
    }
}

/// One ranked snippet in a response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResultItem {
    pub id: String,
    pub category: String,
    pub content: String,
    pub similarity_score: f32,
    pub distance: f32,
}

impl From<&SearchResult> for QueryResultItem {
    fn from(result: &SearchResult) -> Self {
        Self {
            id: result.snippet.id.clone(),
            category: result.snippet.category.clone(),
            content: result.snippet.text.clone(),
            similarity_score: round4(result.score),
            distance: round4(result.distance()),
        }
    }
}

/// Response for one query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub question: String,
    pub results: Vec<QueryResultItem>,
    pub total_results: usize,
}

impl QueryResponse {
    pub fn new(question: impl Into<String>, results: &[SearchResult]) -> Self {
        let results: Vec<QueryResultItem> = results.iter().map(QueryResultItem::from).collect();
        Self {
            question: question.into(),
            total_results: results.len(),
            results,
        }
    }
}

fn round4(value: f32) -> f32 {
    (value * 10_000.0).round() / 10_000.0
}
