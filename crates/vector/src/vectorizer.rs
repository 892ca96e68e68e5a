use snipsearch_common::{EngineConfig, Result, SnipSearchError, VectorizerKind};

use crate::tfidf::TfidfVectorizer;
use crate::types::Vector;

/// Common trait for text vectorizers
///
/// The TF-IDF variant must be fitted on a corpus before it can embed;
/// dense encoders ignore the corpus and only reject an empty one.
pub trait Vectorizer: Send + Sync {
    /// Short name used in logs and collection info
    fn name(&self) -> &str;

    /// Fit the vector space on a corpus
    fn fit(&mut self, corpus: &[&str]) -> Result<()>;

    /// Embed documents in the fitted space
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vector>>;

    /// Embed a query in the fitted space
    fn embed_query(&self, text: &str) -> Result<Vector> {
        let mut vectors = self.embed(&[text])?;
        vectors
            .pop()
            .ok_or_else(|| SnipSearchError::embedding("Vectorizer returned no vector for query"))
    }

    /// Dimensionality of produced vectors, `None` until fitted
    fn dimension(&self) -> Option<usize>;

    /// A fresh, unfitted vectorizer with the same settings
    fn unfitted(&self) -> Box<dyn Vectorizer>;
}

/// Construct the vectorizer selected by configuration
pub fn from_config(config: &EngineConfig) -> Result<Box<dyn Vectorizer>> {
    match config.vectorizer {
        VectorizerKind::Tfidf => Ok(Box::new(TfidfVectorizer::new(config.remove_stop_words))),
        #[cfg(feature = "candle")]
        VectorizerKind::Dense => {
            let dense = crate::dense::DenseVectorizer::from_hub(&config.embedding_model)?;
            tracing::debug!(
                "Selected dense vectorizer - model: {}, dimension: {:?}",
                dense.model_id(),
                dense.dimension()
            );
            Ok(Box::new(dense))
        }
        #[cfg(not(feature = "candle"))]
        VectorizerKind::Dense => Err(SnipSearchError::config(
            "Dense vectorizer requires the `candle` feature",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_tfidf() {
        let vectorizer = from_config(&EngineConfig::default()).unwrap();
        assert_eq!(vectorizer.name(), "tfidf");
        assert!(vectorizer.dimension().is_none());
    }

    #[cfg(not(feature = "candle"))]
    #[test]
    fn test_from_config_dense_without_feature() {
        let config = EngineConfig {
            vectorizer: VectorizerKind::Dense,
            ..EngineConfig::default()
        };
        assert!(matches!(from_config(&config), Err(SnipSearchError::Config(_))));
    }
}
