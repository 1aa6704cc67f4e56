//! Error types for MedQuery
//!
//! Every external call (embedding model, vector store, web search, model
//! endpoint) reports failures through [`MedQueryError`]; the presentation
//! layer turns them into inline messages instead of aborting the session.

use thiserror::Error;

/// Main error type for the MedQuery pipeline
#[derive(Error, Debug)]
pub enum MedQueryError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Required API credential absent from the environment
    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),

    /// Embedding model errors (download, tokenization, forward pass)
    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    /// Vector store errors
    #[error("Vector store error: {0}")]
    VectorStoreError(String),

    /// Web search errors
    #[error("Web search error: {0}")]
    WebSearchError(String),

    /// Generative model API errors
    #[error("Model API error: {0}")]
    ModelError(String),

    /// Image decoding / preprocessing errors
    #[error("Image processing error: {0}")]
    ImageError(String),

    /// Document ingestion errors
    #[error("Ingest error: {0}")]
    IngestError(String),

    /// Timeout errors
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, MedQueryError>;

/// Convert anyhow errors to MedQueryError
impl From<anyhow::Error> for MedQueryError {
    fn from(err: anyhow::Error) -> Self {
        MedQueryError::Generic(err.to_string())
    }
}

impl From<image::ImageError> for MedQueryError {
    fn from(err: image::ImageError) -> Self {
        MedQueryError::ImageError(err.to_string())
    }
}

impl From<candle_core::Error> for MedQueryError {
    fn from(err: candle_core::Error) -> Self {
        MedQueryError::EmbeddingError(err.to_string())
    }
}

impl From<qdrant_client::QdrantError> for MedQueryError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        MedQueryError::VectorStoreError(err.to_string())
    }
}

impl MedQueryError {
    /// Whether this failure happened while bringing the pipeline up
    /// (as opposed to while serving a single request).
    pub fn is_initialization(&self) -> bool {
        matches!(
            self,
            MedQueryError::ConfigError(_) | MedQueryError::MissingCredential(_)
        )
    }
}
