//! Vector retrieval adapter
//!
//! The knowledge base lives in a managed vector database. Two backends are
//! supported: Pinecone (serverless index over REST, the default) and Qdrant
//! (through `qdrant-client`). Both speak the [`VectorStore`] trait.

pub mod pinecone;
pub mod qdrant;

pub use pinecone::PineconeStore;
pub use qdrant::QdrantStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{Config, Credentials, VectorBackend};
use crate::errors::Result;

/// Metadata key holding the chunk text
pub const TEXT_KEY: &str = "text";
/// Metadata key holding the originating document path
pub const SOURCE_KEY: &str = "source";
/// Metadata key holding the chunk position within its document
pub const CHUNK_KEY: &str = "chunk";

/// A passage returned by similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    pub id: String,
    pub text: String,
    pub score: f32,
    pub source: Option<String>,
}

impl RetrievedPassage {
    /// First `max_chars` characters of the passage (char-boundary safe)
    pub fn preview(&self, max_chars: usize) -> String {
        self.text.chars().take(max_chars).collect()
    }
}

/// A vector to be written into the index
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub text: String,
    pub source: String,
    pub chunk: usize,
}

/// Fixed configuration of the knowledge-base index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: String,
    pub dimension: usize,
    pub metric: String,
    pub cloud: String,
    pub region: String,
}

impl IndexSpec {
    pub fn from_config(config: &Config) -> Self {
        let vs = &config.vector_store;
        Self {
            name: vs.index_name.clone(),
            dimension: vs.dimension,
            metric: vs.metric.clone(),
            cloud: vs.cloud.clone(),
            region: vs.region.clone(),
        }
    }
}

/// Nearest-neighbour store holding the embedded knowledge base
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the index if it does not exist. Returns true when it was created.
    async fn ensure_index(&self, spec: &IndexSpec) -> Result<bool>;

    /// Verify the index exists and is reachable
    async fn connect_existing(&self) -> Result<()>;

    /// Write vectors into the index, returning how many were accepted
    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize>;

    /// Top-K most similar passages for a query vector
    async fn similarity_search(&self, vector: &[f32], top_k: usize) -> Result<Vec<RetrievedPassage>>;

    /// Number of vectors currently stored
    async fn vector_count(&self) -> Result<u64>;

    /// Backend name used in logs and diagnostics
    fn backend_name(&self) -> &'static str;
}

/// Build the configured vector store. No network traffic happens here.
pub fn build_store(config: &Config, credentials: &Credentials) -> Result<Arc<dyn VectorStore>> {
    let vs = &config.vector_store;
    match vs.backend {
        VectorBackend::Pinecone => Ok(Arc::new(PineconeStore::new(
            credentials.pinecone()?,
            &vs.index_name,
            &vs.pinecone_control_url,
        ))),
        VectorBackend::Qdrant => {
            let url = credentials.qdrant_url.as_deref().unwrap_or(&vs.qdrant_url);
            Ok(Arc::new(QdrantStore::new(
                url,
                credentials.qdrant_api_key.clone(),
                &vs.index_name,
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_on_chars() {
        let passage = RetrievedPassage {
            id: "1".to_string(),
            text: "é".repeat(300),
            score: 0.9,
            source: None,
        };
        let preview = passage.preview(200);
        assert_eq!(preview.chars().count(), 200);
    }

    #[test]
    fn test_preview_short_text_unchanged() {
        let passage = RetrievedPassage {
            id: "1".to_string(),
            text: "Migraine is a primary headache disorder.".to_string(),
            score: 0.8,
            source: Some("Data/medical_book.pdf".to_string()),
        };
        assert_eq!(passage.preview(200), passage.text);
    }

    #[test]
    fn test_index_spec_from_default_config() {
        let spec = IndexSpec::from_config(&Config::default());
        assert_eq!(spec.name, "medicalbot");
        assert_eq!(spec.dimension, 384);
        assert_eq!(spec.metric, "cosine");
        assert_eq!(spec.cloud, "aws");
        assert_eq!(spec.region, "us-east-1");
    }

    #[test]
    fn test_build_pinecone_requires_key() {
        let result = build_store(&Config::default(), &Credentials::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_build_pinecone_with_key() {
        let creds = Credentials {
            pinecone_api_key: Some("pc-test".to_string()),
            ..Default::default()
        };
        let store = build_store(&Config::default(), &creds).unwrap();
        assert_eq!(store.backend_name(), "pinecone");
    }
}
