//! snipsearch vector retrieval engine
//!
//! Vectorizes a small snippet corpus (TF-IDF, or a pretrained sentence
//! encoder with the `candle` feature), indexes it in memory and answers
//! free-text queries by cosine similarity.

#[cfg(feature = "candle")]
mod dense;
mod engine;
mod index;
mod request;
mod similarity;
mod tfidf;
pub mod tokenizer;
mod types;
mod vectorizer;

#[cfg(feature = "candle")]
pub use dense::DenseVectorizer;
pub use engine::RetrievalEngine;
pub use index::VectorIndex;
pub use request::{QueryRequest, QueryResponse, QueryResultItem};
pub use similarity::{cosine_similarity, l2_norm, l2_normalize};
pub use tfidf::TfidfVectorizer;
pub use types::{CollectionInfo, IndexEntry, SearchResult, Snippet, Vector};
pub use vectorizer::{from_config, Vectorizer};
