//! Text embedding adapter
//!
//! Converts text into fixed-length vectors for similarity search. The
//! production implementation runs a sentence-transformers BERT model locally
//! through candle; tests substitute their own [`Embedder`].

pub mod engine;

pub use engine::{SentenceEmbedder, DEFAULT_EMBEDDING_DIM, DEFAULT_MODEL_ID};

use crate::errors::Result;

/// Anything that can turn text into embedding vectors
pub trait Embedder: Send + Sync {
    /// Embed a single query text
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several documents at once
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Length of every vector this embedder returns
    fn dimension(&self) -> usize;
}
