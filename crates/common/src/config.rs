use crate::error::SnipSearchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Which vectorization strategy the engine is constructed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorizerKind {
    /// Corpus-fitted TF-IDF
    Tfidf,
    /// Pretrained sentence encoder
    Dense,
}

impl fmt::Display for VectorizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tfidf => write!(f, "tfidf"),
            Self::Dense => write!(f, "dense"),
        }
    }
}

impl FromStr for VectorizerKind {
    type Err = SnipSearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tfidf" | "tf-idf" => Ok(Self::Tfidf),
            "dense" | "embedding" => Ok(Self::Dense),
            other => Err(SnipSearchError::config(format!(
                "Unknown vectorizer '{}', expected 'tfidf' or 'dense'",
                other
            ))),
        }
    }
}

/// Retrieval engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Vectorization strategy
    pub vectorizer: VectorizerKind,

    /// Hugging Face model id for the dense vectorizer
    pub embedding_model: String,

    /// Drop English stop words when tokenizing for TF-IDF
    pub remove_stop_words: bool,

    /// Result count used when a request does not specify one
    pub default_top_k: usize,

    /// Upper bound the serving layer accepts for a request
    pub max_top_k: usize,

    /// Name reported in collection info
    pub collection_name: String,

    /// Log level
    pub log_level: String,

    /// Log directory; console only when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vectorizer: VectorizerKind::Tfidf,
            embedding_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            remove_stop_words: true,
            default_top_k: 3,
            max_top_k: 10,
            collection_name: "tech_snippets".to_string(),
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, SnipSearchError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let defaults = Self::default();

        let vectorizer = match std::env::var("SNIPSEARCH_VECTORIZER") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.vectorizer,
        };

        let config = Self {
            vectorizer,
            embedding_model: std::env::var("SNIPSEARCH_EMBEDDING_MODEL")
                .unwrap_or(defaults.embedding_model),
            remove_stop_words: Self::get_env_bool("SNIPSEARCH_STOP_WORDS")?
                .unwrap_or(defaults.remove_stop_words),
            default_top_k: Self::get_env_usize("SNIPSEARCH_DEFAULT_TOP_K")?
                .unwrap_or(defaults.default_top_k),
            max_top_k: Self::get_env_usize("SNIPSEARCH_MAX_TOP_K")?
                .unwrap_or(defaults.max_top_k),
            collection_name: std::env::var("SNIPSEARCH_COLLECTION")
                .unwrap_or(defaults.collection_name),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: std::env::var("LOG_DIR").ok().map(PathBuf::from),
        };

        config.validate()?;

        Ok(config)
    }

    /// Unset -> `None`; set but not a non-negative integer -> error
    fn get_env_usize(key: &str) -> Result<Option<usize>, SnipSearchError> {
        let Ok(value) = std::env::var(key) else {
            return Ok(None);
        };
        value.trim().parse().map(Some).map_err(|_| {
            SnipSearchError::config(format!("{} must be a non-negative integer, got '{}'", key, value))
        })
    }

    /// Unset -> `None`; set but not a recognised boolean -> error
    fn get_env_bool(key: &str) -> Result<Option<bool>, SnipSearchError> {
        let Ok(value) = std::env::var(key) else {
            return Ok(None);
        };
        match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(SnipSearchError::config(format!(
                "{} must be a boolean (true/false), got '{}'",
                key, value
            ))),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), SnipSearchError> {
        if self.embedding_model.trim().is_empty() {
            return Err(SnipSearchError::config("Embedding model name cannot be empty"));
        }

        if self.default_top_k == 0 {
            return Err(SnipSearchError::config("Default top_k must be at least 1"));
        }

        if self.max_top_k < self.default_top_k {
            return Err(SnipSearchError::config(format!(
                "Max top_k ({}) cannot be smaller than default top_k ({})",
                self.max_top_k, self.default_top_k
            )));
        }

        if self.collection_name.trim().is_empty() {
            return Err(SnipSearchError::config("Collection name cannot be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.vectorizer, VectorizerKind::Tfidf);
        assert_eq!(config.default_top_k, 3);
        assert_eq!(config.max_top_k, 10);
        assert!(config.remove_stop_words);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_validate() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());

        let mut invalid_config = EngineConfig::default();
        invalid_config.default_top_k = 0;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = EngineConfig::default();
        invalid_config.max_top_k = 2;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = EngineConfig::default();
        invalid_config.embedding_model = "  ".to_string();
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = EngineConfig::default();
        invalid_config.collection_name = "\t".to_string();
        assert!(matches!(invalid_config.validate(), Err(SnipSearchError::Config(_))));
    }

    const ENV_KEYS: &[&str] = &[
        "SNIPSEARCH_VECTORIZER",
        "SNIPSEARCH_EMBEDDING_MODEL",
        "SNIPSEARCH_STOP_WORDS",
        "SNIPSEARCH_DEFAULT_TOP_K",
        "SNIPSEARCH_MAX_TOP_K",
        "SNIPSEARCH_COLLECTION",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    // Single test so no other test races on the same process environment
    #[test]
    fn test_from_env() {
        clear_env();
        let config = EngineConfig::from_env().unwrap();
        assert_eq!(config.vectorizer, VectorizerKind::Tfidf);
        assert_eq!(config.default_top_k, 3);
        assert_eq!(config.max_top_k, 10);
        assert!(config.remove_stop_words);
        assert_eq!(config.collection_name, "tech_snippets");

        std::env::set_var("SNIPSEARCH_MAX_TOP_K", "20");
        std::env::set_var("SNIPSEARCH_STOP_WORDS", "off");
        let config = EngineConfig::from_env().unwrap();
        assert_eq!(config.max_top_k, 20);
        assert!(!config.remove_stop_words);

        std::env::set_var("SNIPSEARCH_MAX_TOP_K", "ten");
        assert!(matches!(EngineConfig::from_env(), Err(SnipSearchError::Config(_))));

        std::env::set_var("SNIPSEARCH_MAX_TOP_K", "10");
        std::env::set_var("SNIPSEARCH_STOP_WORDS", "maybe");
        assert!(matches!(EngineConfig::from_env(), Err(SnipSearchError::Config(_))));

        std::env::remove_var("SNIPSEARCH_STOP_WORDS");
        std::env::set_var("SNIPSEARCH_DEFAULT_TOP_K", "-1");
        assert!(matches!(EngineConfig::from_env(), Err(SnipSearchError::Config(_))));

        clear_env();
        std::env::set_var("SNIPSEARCH_VECTORIZER", "bm25");
        assert!(matches!(EngineConfig::from_env(), Err(SnipSearchError::Config(_))));

        clear_env();
    }

    #[test]
    fn test_vectorizer_kind_parse() {
        assert_eq!("tfidf".parse::<VectorizerKind>().unwrap(), VectorizerKind::Tfidf);
        assert_eq!("TF-IDF".parse::<VectorizerKind>().unwrap(), VectorizerKind::Tfidf);
        assert_eq!(" Dense ".parse::<VectorizerKind>().unwrap(), VectorizerKind::Dense);
        assert!("bm25".parse::<VectorizerKind>().is_err());
        assert_eq!(VectorizerKind::Dense.to_string(), "dense");
    }
}
