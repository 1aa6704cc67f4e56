//! Recording adapters shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use medquery::config::Config;
use medquery::embedding::Embedder;
use medquery::models::GenerativeModel;
use medquery::pages::{AppContext, PipelineState};
use medquery::rag::MedicalPipeline;
use medquery::search::{WebResult, WebSearch};
use medquery::vector_db::{IndexSpec, RetrievedPassage, VectorRecord, VectorStore};
use medquery::{MedQueryError, Result};

/// Deterministic embedder: every component is the text length
pub struct LengthEmbedder(pub usize);

impl Embedder for LengthEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(vec![text.chars().count() as f32; self.0])
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimension(&self) -> usize {
        self.0
    }
}

/// Store that answers every query with a fixed passage list
#[derive(Default)]
pub struct FixedStore {
    pub passages: Vec<RetrievedPassage>,
    pub queries: Mutex<Vec<(usize, usize)>>,
    pub records: Mutex<Vec<VectorRecord>>,
}

impl FixedStore {
    pub fn new(passages: Vec<RetrievedPassage>) -> Self {
        Self {
            passages,
            ..Default::default()
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl VectorStore for FixedStore {
    async fn ensure_index(&self, _spec: &IndexSpec) -> Result<bool> {
        Ok(false)
    }

    async fn connect_existing(&self) -> Result<()> {
        Ok(())
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        self.records.lock().unwrap().extend_from_slice(records);
        Ok(records.len())
    }

    async fn similarity_search(&self, vector: &[f32], top_k: usize) -> Result<Vec<RetrievedPassage>> {
        self.queries.lock().unwrap().push((vector.len(), top_k));
        Ok(self.passages.clone())
    }

    async fn vector_count(&self) -> Result<u64> {
        Ok(self.passages.len() as u64 + self.records.lock().unwrap().len() as u64)
    }

    fn backend_name(&self) -> &'static str {
        "fixed"
    }
}

/// Model that records prompts and returns a canned answer
pub struct RecordingModel {
    pub answer: String,
    pub prompts: Mutex<Vec<String>>,
}

impl RecordingModel {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for RecordingModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.answer.clone())
    }

    fn model_name(&self) -> &str {
        "recording"
    }
}

/// Search returning canned results, truncated like the real backend
pub struct CannedSearch {
    pub results: Vec<WebResult>,
    pub queries: Mutex<Vec<String>>,
    pub fail_with: Option<String>,
}

impl CannedSearch {
    pub fn new(results: Vec<WebResult>) -> Self {
        Self {
            results,
            queries: Mutex::new(Vec::new()),
            fail_with: None,
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl WebSearch for CannedSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebResult>> {
        self.queries.lock().unwrap().push(query.to_string());
        if let Some(message) = &self.fail_with {
            return Err(MedQueryError::WebSearchError(message.clone()));
        }
        Ok(self.results.iter().take(max_results).cloned().collect())
    }
}

pub fn passage(n: usize, text: &str) -> RetrievedPassage {
    RetrievedPassage {
        id: format!("passage-{}", n),
        text: text.to_string(),
        score: 1.0 - n as f32 * 0.1,
        source: Some("Data/medical_book.pdf".to_string()),
    }
}

pub fn web(title: &str, link: &str, snippet: &str) -> WebResult {
    WebResult {
        title: title.to_string(),
        link: link.to_string(),
        snippet: snippet.to_string(),
    }
}

pub fn ready_context(
    store: Arc<FixedStore>,
    model: Arc<RecordingModel>,
    search: Arc<CannedSearch>,
) -> AppContext {
    let config = Config::default();
    let pipeline = MedicalPipeline::from_parts(
        Arc::new(LengthEmbedder(config.vector_store.dimension)),
        store,
        model,
        config.retrieval.top_k,
    );
    AppContext::new(config, PipelineState::Ready(pipeline), search)
}
