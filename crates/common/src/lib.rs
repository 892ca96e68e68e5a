pub mod config;
pub mod error;
pub mod logger;

// Re-export commonly used types
pub use config::{EngineConfig, VectorizerKind};
pub use error::SnipSearchError;
pub type Result<T> = std::result::Result<T, SnipSearchError>;
