// Similarity retrieval over the knowledge-base index
use std::sync::Arc;

use crate::embedding::Embedder;
use crate::errors::Result;
use crate::vector_db::{RetrievedPassage, VectorStore};

/// Embeds a query and returns the `top_k` nearest passages
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>, top_k: usize) -> Self {
        Self {
            embedder,
            store,
            top_k,
        }
    }

    /// Retrieve passages similar to `query`
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedPassage>> {
        let vector = self.embedder.embed(query)?;
        let mut passages = self.store.similarity_search(&vector, self.top_k).await?;
        passages.truncate(self.top_k);

        tracing::debug!(
            backend = self.store.backend_name(),
            retrieved = passages.len(),
            top_k = self.top_k,
            "similarity search"
        );
        Ok(passages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{passage, MockEmbedder, MockStore};

    #[tokio::test]
    async fn test_retrieve_caps_at_top_k() {
        let store = Arc::new(MockStore::with_passages(vec![
            passage("a"),
            passage("b"),
            passage("c"),
            passage("d"),
        ]));
        let retriever = Retriever::new(Arc::new(MockEmbedder::new(4)), store.clone(), 3);

        let results = retriever.retrieve("What causes a migraine?").await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(store.searches(), 1);
    }

    #[tokio::test]
    async fn test_retrieve_embeds_query() {
        let embedder = Arc::new(MockEmbedder::new(4));
        let retriever = Retriever::new(embedder.clone(), Arc::new(MockStore::default()), 3);

        retriever.retrieve("fever").await.unwrap();
        assert_eq!(embedder.embedded(), vec!["fever".to_string()]);
    }
}
