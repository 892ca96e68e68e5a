use snipsearch_common::{Result, SnipSearchError};
use tracing::debug;

use crate::similarity::cosine_similarity;
use crate::types::{IndexEntry, SearchResult, Snippet};

/// In-memory vector index
///
/// Entries live in a flat vector in insertion order; search is a linear
/// cosine scan with a stable sort, so equal scores keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimension: Option<usize>,
}

impl VectorIndex {
    /// Create new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the index contents
    ///
    /// Fails when entries disagree on dimensionality; the index is left
    /// unchanged in that case.
    pub fn build(&mut self, entries: Vec<IndexEntry>) -> Result<()> {
        let dimension = entries.first().map(|e| e.vector.len());
        if let Some(expected) = dimension {
            if let Some(bad) = entries.iter().find(|e| e.vector.len() != expected) {
                return Err(SnipSearchError::DimensionMismatch {
                    expected,
                    actual: bad.vector.len(),
                });
            }
        }

        debug!("Index built - {} entries, dimension {:?}", entries.len(), dimension);

        self.entries = entries;
        self.dimension = dimension;
        Ok(())
    }

    /// Top `k` entries by cosine similarity to `query`, highest first
    ///
    /// `k` larger than the index is clamped to its size.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Err(SnipSearchError::invalid_argument("k must be a positive integer"));
        }
        if let Some(expected) = self.dimension {
            if query.len() != expected {
                return Err(SnipSearchError::DimensionMismatch {
                    expected,
                    actual: query.len(),
                });
            }
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(pos, entry)| (pos, cosine_similarity(query, &entry.vector)))
            .collect();

        // stable: ties keep insertion order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(pos, score)| SearchResult::new(self.entries[pos].snippet.clone(), score))
            .collect())
    }

    /// Stored snippets in insertion order
    pub fn snippets(&self) -> impl Iterator<Item = &Snippet> {
        self.entries.iter().map(|e| &e.snippet)
    }

    /// Dimensionality of stored vectors, `None` while empty
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
