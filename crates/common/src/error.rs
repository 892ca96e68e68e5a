/// snipsearch error types
#[derive(Debug, thiserror::Error)]
pub enum SnipSearchError {
    /// Fit/build was given no documents
    #[error("Corpus is empty: at least one document is required")]
    EmptyCorpus,

    /// Two snippets in one build share an id
    #[error("Duplicate snippet id: {id}")]
    DuplicateId { id: String },

    /// Vectorizer used before fit
    #[error("Vectorizer has not been fitted")]
    NotFitted,

    /// Engine queried before build
    #[error("Retrieval engine has not been built")]
    NotBuilt,

    /// Caller-supplied argument is out of range or blank
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Vector dimensionality disagrees with the fitted space
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Embedding model load or inference failure
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SnipSearchError {
    /// Create duplicate id error
    pub fn duplicate_id<S: Into<String>>(id: S) -> Self {
        Self::DuplicateId { id: id.into() }
    }

    /// Create invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create embedding error
    pub fn embedding<S: Into<String>>(msg: S) -> Self {
        Self::Embedding(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the caller can fix this by changing its input.
    ///
    /// Sequencing errors (`NotFitted`, `NotBuilt`) are programming errors and
    /// a `DimensionMismatch` means the vectorizer is inconsistent, so both
    /// report `false`. Status-code mapping belongs to the serving layer.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyCorpus
                | Self::DuplicateId { .. }
                | Self::InvalidArgument(_)
                | Self::Json(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SnipSearchError::duplicate_id("ml");
        assert_eq!(err.to_string(), "Duplicate snippet id: ml");

        let err = SnipSearchError::DimensionMismatch {
            expected: 384,
            actual: 12,
        };
        assert!(err.to_string().contains("384"));
        assert!(err.to_string().contains("12"));
    }

    #[test]
    fn test_caller_error_classification() {
        assert!(SnipSearchError::EmptyCorpus.is_caller_error());
        assert!(SnipSearchError::invalid_argument("k must be positive").is_caller_error());
        assert!(!SnipSearchError::NotBuilt.is_caller_error());
        assert!(!SnipSearchError::NotFitted.is_caller_error());
        assert!(!SnipSearchError::embedding("model load failed").is_caller_error());
        assert!(!SnipSearchError::DimensionMismatch {
            expected: 384,
            actual: 383,
        }
        .is_caller_error());
    }
}
