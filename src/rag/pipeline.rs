// End-to-end medical knowledge pipeline
use std::sync::Arc;

use crate::config::{Config, Credentials};
use crate::embedding::{Embedder, SentenceEmbedder};
use crate::errors::{MedQueryError, Result};
use crate::models::{GeminiClient, GenerativeModel};
use crate::rag::chain::{ChainOutput, RetrievalQa};
use crate::rag::prompt::PromptTemplate;
use crate::rag::retrieval::Retriever;
use crate::vector_db::{build_store, VectorStore};

/// Long-lived handles built once per process: embedder, index and model
pub struct MedicalPipeline {
    chain: RetrievalQa,
    llm: Arc<dyn GenerativeModel>,
    store: Arc<dyn VectorStore>,
}

impl MedicalPipeline {
    /// Load the embedding model, attach to the existing index and create the
    /// model client. Fails if a credential is missing or the index is absent.
    pub async fn initialize(config: &Config, credentials: &Credentials) -> Result<Self> {
        let google_key = credentials.google()?.to_string();
        let store = build_store(config, credentials)?;

        let embedding = config.embedding.clone();
        let embedder = tokio::task::spawn_blocking(move || {
            SentenceEmbedder::from_hub(&embedding.model_id, embedding.max_sequence_length)
        })
        .await
        .map_err(|e| MedQueryError::EmbeddingError(format!("Embedding model loader failed: {}", e)))??;

        if embedder.dimension() != config.vector_store.dimension {
            return Err(MedQueryError::ConfigError(format!(
                "Embedding dimension {} does not match index dimension {}",
                embedder.dimension(),
                config.vector_store.dimension
            )));
        }

        store.connect_existing().await?;
        tracing::info!(
            backend = store.backend_name(),
            index = %config.vector_store.index_name,
            "connected to knowledge base"
        );

        let llm: Arc<dyn GenerativeModel> = Arc::new(GeminiClient::new(&google_key, &config.model));

        Ok(Self::from_parts(
            Arc::new(embedder),
            store,
            llm,
            config.retrieval.top_k,
        ))
    }

    /// Assemble a pipeline from already-built adapters
    pub fn from_parts(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        llm: Arc<dyn GenerativeModel>,
        top_k: usize,
    ) -> Self {
        let retriever = Retriever::new(embedder, store.clone(), top_k);
        let chain = RetrievalQa::new(retriever, llm.clone(), PromptTemplate::question_answering());
        Self { chain, llm, store }
    }

    /// Answer a (web-augmented) query through the retrieval chain
    pub async fn answer(&self, query: &str) -> Result<ChainOutput> {
        self.chain.run(query).await
    }

    /// The model client, shared with image analysis
    pub fn llm(&self) -> Arc<dyn GenerativeModel> {
        self.llm.clone()
    }

    pub fn store(&self) -> Arc<dyn VectorStore> {
        self.store.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{passage, MockEmbedder, MockModel, MockStore};

    #[tokio::test]
    async fn test_initialize_without_credentials_fails() {
        let result = MedicalPipeline::initialize(&Config::default(), &Credentials::default()).await;
        match result {
            Err(e) => assert!(e.is_initialization()),
            Ok(_) => panic!("pipeline must not initialize without credentials"),
        }
    }

    #[tokio::test]
    async fn test_from_parts_answers() {
        let pipeline = MedicalPipeline::from_parts(
            Arc::new(MockEmbedder::new(4)),
            Arc::new(MockStore::with_passages(vec![passage("Influenza is viral.")])),
            Arc::new(MockModel::replying("The flu is caused by influenza viruses.")),
            3,
        );

        let output = pipeline.answer("What causes the flu?").await.unwrap();
        assert_eq!(output.result, "The flu is caused by influenza viruses.");
        assert_eq!(pipeline.llm().model_name(), "mock-model");
        assert_eq!(pipeline.store().backend_name(), "mock");
    }
}
