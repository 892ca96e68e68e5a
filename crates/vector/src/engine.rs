use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use snipsearch_common::{EngineConfig, Result, SnipSearchError};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::index::VectorIndex;
use crate::request::{QueryRequest, QueryResponse};
use crate::types::{CollectionInfo, IndexEntry, SearchResult, Snippet};
use crate::vectorizer::{self, Vectorizer};

/// Everything produced by one `build`; never mutated afterwards
struct BuiltState {
    vectorizer: Box<dyn Vectorizer>,
    index: VectorIndex,
    fingerprint: String,
    built_at: DateTime<Utc>,
}

/// Snippet retrieval engine
///
/// `query` takes `&self` and may run concurrently from many threads.
/// `build` prepares the new vectorizer and index without holding the lock
/// and swaps them in at the end, so in-flight queries keep reading the
/// previous state and a failed build changes nothing.
pub struct RetrievalEngine {
    prototype: Box<dyn Vectorizer>,
    config: EngineConfig,
    state: RwLock<Option<Arc<BuiltState>>>,
}

impl RetrievalEngine {
    /// Create engine around a vectorizer with default configuration
    pub fn new(vectorizer: Box<dyn Vectorizer>) -> Self {
        Self::with_config(vectorizer, EngineConfig::default())
    }

    pub fn with_config(vectorizer: Box<dyn Vectorizer>, config: EngineConfig) -> Self {
        Self {
            prototype: vectorizer,
            config,
            state: RwLock::new(None),
        }
    }

    /// Create engine with the vectorizer selected by configuration
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let vectorizer = vectorizer::from_config(&config)?;

        info!(
            "Retrieval engine initialized - vectorizer: {}, collection: {}",
            vectorizer.name(),
            config.collection_name
        );

        Ok(Self::with_config(vectorizer, config))
    }

    /// Fit, embed and index a corpus, replacing any previous build
    pub fn build(&self, corpus: Vec<Snippet>) -> Result<()> {
        if corpus.is_empty() {
            return Err(SnipSearchError::EmptyCorpus);
        }

        let mut seen = HashSet::with_capacity(corpus.len());
        for snippet in &corpus {
            if !seen.insert(snippet.id.as_str()) {
                return Err(SnipSearchError::duplicate_id(&snippet.id));
            }
        }

        let texts: Vec<&str> = corpus.iter().map(|s| s.text.as_str()).collect();

        let mut vectorizer = self.prototype.unfitted();
        vectorizer.fit(&texts)?;
        let vectors = vectorizer.embed(&texts)?;
        if vectors.len() != corpus.len() {
            return Err(SnipSearchError::embedding(format!(
                "Vectorizer returned {} vectors for {} documents",
                vectors.len(),
                corpus.len()
            )));
        }

        let fingerprint = corpus_fingerprint(&corpus);
        let entries: Vec<IndexEntry> = corpus
            .into_iter()
            .zip(vectors)
            .map(|(snippet, vector)| IndexEntry::new(snippet, vector))
            .collect();

        let mut index = VectorIndex::new();
        index.build(entries)?;

        info!(
            "Built collection '{}' - {} documents, {} dimensions ({})",
            self.config.collection_name,
            index.len(),
            index.dimension().unwrap_or(0),
            vectorizer.name()
        );

        let built = BuiltState {
            vectorizer,
            index,
            fingerprint,
            built_at: Utc::now(),
        };
        *self.state.write() = Some(Arc::new(built));

        Ok(())
    }

    /// Top `k` snippets for `text`, highest similarity first
    pub fn query(&self, text: &str, k: usize) -> Result<Vec<SearchResult>> {
        let state = self.current()?;

        if text.trim().is_empty() {
            return Err(SnipSearchError::invalid_argument("Query text cannot be empty"));
        }
        if k == 0 {
            return Err(SnipSearchError::invalid_argument("k must be a positive integer"));
        }

        debug!("Querying: '{}' (k={})", text, k);

        let query_vector = state.vectorizer.embed_query(text)?;
        let results = state.index.search(&query_vector, k)?;

        debug!(
            "Query completed - {} results, top score {:?}",
            results.len(),
            results.first().map(|r| r.score)
        );
        Ok(results)
    }

    /// Query with the configured default result count
    pub fn query_default(&self, text: &str) -> Result<Vec<SearchResult>> {
        self.query(text, self.config.default_top_k)
    }

    /// Validate a serving-layer request, run it and shape the response
    pub fn answer(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let (question, k) = request.resolve(&self.config)?;
        let results = self.query(&question, k)?;
        Ok(QueryResponse::new(question, &results))
    }

    /// Summary of the built collection
    pub fn collection_info(&self) -> Result<CollectionInfo> {
        let state = self.current()?;
        Ok(CollectionInfo {
            collection_name: self.config.collection_name.clone(),
            total_documents: state.index.len(),
            vector_dimensions: state.index.dimension().unwrap_or(0),
            vectorizer: state.vectorizer.name().to_string(),
            corpus_fingerprint: state.fingerprint.clone(),
            built_at: state.built_at,
        })
    }

    /// Indexed snippets in insertion order
    pub fn snippets(&self) -> Result<Vec<Snippet>> {
        let state = self.current()?;
        Ok(state.index.snippets().cloned().collect())
    }

    pub fn is_built(&self) -> bool {
        self.state.read().is_some()
    }

    fn current(&self) -> Result<Arc<BuiltState>> {
        self.state.read().clone().ok_or(SnipSearchError::NotBuilt)
    }
}

/// SHA-256 over ids and texts, in order
fn corpus_fingerprint(corpus: &[Snippet]) -> String {
    let mut hasher = Sha256::new();
    for snippet in corpus {
        hasher.update(snippet.id.as_bytes());
        hasher.update([0u8]);
        hasher.update(snippet.text.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}
