use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dense vector representation of a text
pub type Vector = Vec<f32>;

/// One retrievable unit of text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    /// Unique identifier within a corpus
    pub id: String,

    /// Text that gets vectorized
    pub text: String,

    /// Free-form grouping label
    pub category: String,
}

impl Snippet {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            category: category.into(),
        }
    }
}

/// Index entry: a snippet and its vector
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub snippet: Snippet,
    pub vector: Vector,
}

impl IndexEntry {
    pub fn new(snippet: Snippet, vector: Vector) -> Self {
        Self { snippet, vector }
    }
}

/// Search result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Matched snippet
    pub snippet: Snippet,

    /// Cosine similarity (-1.0 to 1.0)
    pub score: f32,
}

impl SearchResult {
    pub fn new(snippet: Snippet, score: f32) -> Self {
        Self { snippet, score }
    }

    /// Cosine distance (`1 - score`)
    pub fn distance(&self) -> f32 {
        1.0 - self.score
    }
}

/// Summary of the currently built collection
#[derive(Debug, Clone, Serialize)]
pub struct CollectionInfo {
    /// Configured collection name
    pub collection_name: String,

    /// Number of indexed snippets
    pub total_documents: usize,

    /// Dimensionality of every stored vector
    pub vector_dimensions: usize,

    /// Vectorizer that produced the vectors
    pub vectorizer: String,

    /// SHA-256 over snippet ids and texts, in index order
    pub corpus_fingerprint: String,

    /// When the collection was built
    pub built_at: DateTime<Utc>,
}
