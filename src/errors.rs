//! Error types for the ragjudge service.
//!
//! Every failure from an external collaborator (index, generation model,
//! judge model) is fatal to the current request and surfaces as an explicit
//! error. No retries, no silent fallback answers.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the RAG serving core
#[derive(Error, Debug)]
pub enum RagError {
    /// The retriever could not be reached or returned malformed results
    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    /// The generation model invocation failed
    #[error("Generation model error: {0}")]
    Generation(String),

    /// The judge model invocation failed
    #[error("Judge model error: {0}")]
    Judge(String),

    /// No serialized index at the configured path
    #[error("Vector index not found at {path} (run `ragjudge build-index` first)")]
    IndexNotFound { path: PathBuf },

    /// The loaded index was built with a different embedding configuration
    #[error("Index embedding mismatch: index built with '{indexed}', config expects '{configured}'")]
    IndexMismatch { indexed: String, configured: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Ollama API errors
    #[error("Ollama API error: {0}")]
    OllamaApi(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, RagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RagError::IndexMismatch {
            indexed: "nomic-embed-text".to_string(),
            configured: "all-minilm".to_string(),
        };
        assert!(err.to_string().contains("nomic-embed-text"));
        assert!(err.to_string().contains("all-minilm"));
    }

    #[test]
    fn test_index_not_found_mentions_path() {
        let err = RagError::IndexNotFound {
            path: PathBuf::from("data/index.json"),
        };
        assert!(err.to_string().contains("data/index.json"));
    }
}
