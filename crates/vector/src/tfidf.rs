use snipsearch_common::{Result, SnipSearchError};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

use crate::similarity::l2_normalize;
use crate::tokenizer::tokenize;
use crate::types::Vector;
use crate::vectorizer::Vectorizer;

/// Vocabulary and IDF weights learned by `fit`
#[derive(Debug, Clone)]
struct TfidfModel {
    /// term -> column, columns ordered by term
    vocabulary: HashMap<String, usize>,
    /// idf per column
    idf: Vec<f32>,
}

/// TF-IDF vectorizer over the corpus vocabulary
///
/// `idf(t) = ln((1 + N) / (1 + df(t))) + 1`, term frequency is the raw count,
/// and every vector is L2-normalized. Tokens outside the fitted vocabulary
/// are dropped.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    remove_stop_words: bool,
    model: Option<TfidfModel>,
}

impl TfidfVectorizer {
    pub fn new(remove_stop_words: bool) -> Self {
        Self {
            remove_stop_words,
            model: None,
        }
    }

    /// IDF weight of a fitted term
    pub fn idf(&self, term: &str) -> Option<f32> {
        let model = self.model.as_ref()?;
        model.vocabulary.get(term).map(|&col| model.idf[col])
    }

    fn model(&self) -> Result<&TfidfModel> {
        self.model.as_ref().ok_or(SnipSearchError::NotFitted)
    }

    fn vectorize(&self, model: &TfidfModel, text: &str) -> Vector {
        let mut vector = vec![0.0f32; model.idf.len()];
        for token in tokenize(text, self.remove_stop_words) {
            if let Some(&col) = model.vocabulary.get(&token) {
                vector[col] += 1.0;
            }
        }
        for (value, idf) in vector.iter_mut().zip(&model.idf) {
            *value *= idf;
        }
        l2_normalize(&mut vector);
        vector
    }
}

impl Vectorizer for TfidfVectorizer {
    fn name(&self) -> &str {
        "tfidf"
    }

    fn fit(&mut self, corpus: &[&str]) -> Result<()> {
        if corpus.is_empty() {
            return Err(SnipSearchError::EmptyCorpus);
        }

        // term -> document frequency, ordered by term
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for doc in corpus {
            let unique: HashSet<String> = tokenize(doc, self.remove_stop_words).into_iter().collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let n = corpus.len() as f32;
        let mut vocabulary = HashMap::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (col, (term, df)) in document_frequency.into_iter().enumerate() {
            idf.push(((1.0 + n) / (1.0 + df as f32)).ln() + 1.0);
            vocabulary.insert(term, col);
        }

        debug!(
            "Fitted TF-IDF on {} documents - {} terms",
            corpus.len(),
            vocabulary.len()
        );

        self.model = Some(TfidfModel { vocabulary, idf });
        Ok(())
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        let model = self.model()?;
        Ok(texts.iter().map(|text| self.vectorize(model, text)).collect())
    }

    fn embed_query(&self, text: &str) -> Result<Vector> {
        let model = self.model()?;
        Ok(self.vectorize(model, text))
    }

    fn dimension(&self) -> Option<usize> {
        self.model.as_ref().map(|model| model.idf.len())
    }

    fn unfitted(&self) -> Box<dyn Vectorizer> {
        Box::new(Self::new(self.remove_stop_words))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::l2_norm;

    fn fitted(corpus: &[&str]) -> TfidfVectorizer {
        let mut vectorizer = TfidfVectorizer::new(false);
        vectorizer.fit(corpus).unwrap();
        vectorizer
    }

    #[test]
    fn test_fit_empty_corpus() {
        let mut vectorizer = TfidfVectorizer::new(true);
        assert!(matches!(vectorizer.fit(&[]), Err(SnipSearchError::EmptyCorpus)));
    }

    #[test]
    fn test_embed_before_fit() {
        let vectorizer = TfidfVectorizer::new(true);
        assert!(matches!(vectorizer.embed(&["hello"]), Err(SnipSearchError::NotFitted)));
        assert!(matches!(vectorizer.embed_query("hello"), Err(SnipSearchError::NotFitted)));
        assert!(vectorizer.dimension().is_none());
    }

    #[test]
    fn test_vocabulary_sorted() {
        let vectorizer = fitted(&["zebra apple", "mango apple"]);
        assert_eq!(vectorizer.dimension(), Some(3));
        // columns follow term order: apple, mango, zebra
        for (col, term) in ["apple", "mango", "zebra"].iter().enumerate() {
            let v = vectorizer.embed_query(term).unwrap();
            assert!((v[col] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_smoothed_idf() {
        let vectorizer = fitted(&["apple banana", "apple cherry"]);
        // N = 2: shared term df = 2, unique term df = 1
        assert!((vectorizer.idf("apple").unwrap() - 1.0).abs() < 1e-6);
        let expected = (3.0f32 / 2.0).ln() + 1.0;
        assert!((vectorizer.idf("banana").unwrap() - expected).abs() < 1e-6);
        assert!(vectorizer.idf("durian").is_none());
    }

    #[test]
    fn test_vectors_normalized() {
        let vectorizer = fitted(&["apple banana apple", "cherry"]);
        let vectors = vectorizer.embed(&["apple banana apple", "cherry"]).unwrap();
        for v in &vectors {
            assert_eq!(v.len(), 3);
            assert!((l2_norm(v) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_term_frequency_weighting() {
        let vectorizer = fitted(&["apple banana", "cherry"]);
        let v = vectorizer.embed_query("apple apple banana").unwrap();
        // same idf for apple and banana, so weights follow raw counts
        assert!((v[0] / v[1] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_out_of_vocabulary_query() {
        let vectorizer = fitted(&["apple banana", "cherry"]);
        let v = vectorizer.embed_query("quantum entanglement").unwrap();
        assert_eq!(v.len(), 3);
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_unfitted_copy() {
        let vectorizer = fitted(&["apple"]);
        let fresh = vectorizer.unfitted();
        assert!(fresh.dimension().is_none());
        assert_eq!(fresh.name(), "tfidf");
    }
}
