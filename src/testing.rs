// In-memory adapters for unit tests
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::embedding::Embedder;
use crate::errors::{MedQueryError, Result};
use crate::models::GenerativeModel;
use crate::search::{WebResult, WebSearch};
use crate::vector_db::{IndexSpec, RetrievedPassage, VectorRecord, VectorStore};

pub fn passage(text: &str) -> RetrievedPassage {
    RetrievedPassage {
        id: format!("id-{}", text.len()),
        text: text.to_string(),
        score: 0.8,
        source: Some("Data/medical_book.pdf".to_string()),
    }
}

pub fn web_result(title: &str, link: &str, snippet: &str) -> WebResult {
    WebResult {
        title: title.to_string(),
        link: link.to_string(),
        snippet: snippet.to_string(),
    }
}

pub struct MockEmbedder {
    dimension: usize,
    embedded: Mutex<Vec<String>>,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            embedded: Mutex::new(Vec::new()),
        }
    }

    pub fn embedded(&self) -> Vec<String> {
        self.embedded.lock().unwrap().clone()
    }
}

impl Embedder for MockEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embedded.lock().unwrap().push(text.to_string());
        Ok(vec![text.len() as f32; self.dimension])
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[derive(Default)]
pub struct MockStore {
    passages: Vec<RetrievedPassage>,
    searches: AtomicUsize,
    upserted: Mutex<Vec<VectorRecord>>,
    upsert_calls: AtomicUsize,
    index_exists: bool,
}

impl MockStore {
    pub fn with_passages(passages: Vec<RetrievedPassage>) -> Self {
        Self {
            passages,
            index_exists: true,
            ..Default::default()
        }
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn upserted(&self) -> Vec<VectorRecord> {
        self.upserted.lock().unwrap().clone()
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorStore for MockStore {
    async fn ensure_index(&self, _spec: &IndexSpec) -> Result<bool> {
        Ok(!self.index_exists)
    }

    async fn connect_existing(&self) -> Result<()> {
        Ok(())
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.upserted.lock().unwrap().extend_from_slice(records);
        Ok(records.len())
    }

    async fn similarity_search(&self, _vector: &[f32], _top_k: usize) -> Result<Vec<RetrievedPassage>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        Ok(self.passages.clone())
    }

    async fn vector_count(&self) -> Result<u64> {
        Ok(self.upserted.lock().unwrap().len() as u64)
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}

pub struct MockModel {
    reply: std::result::Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl MockModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for MockModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(MedQueryError::ModelError)
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

pub struct MockSearch {
    results: std::result::Result<Vec<WebResult>, String>,
    queries: Mutex<Vec<String>>,
}

impl MockSearch {
    pub fn returning(results: Vec<WebResult>) -> Self {
        Self {
            results: Ok(results),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            results: Err(message.to_string()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearch for MockSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebResult>> {
        self.queries.lock().unwrap().push(query.to_string());
        match &self.results {
            Ok(results) => Ok(results.iter().take(max_results).cloned().collect()),
            Err(message) => Err(MedQueryError::WebSearchError(message.clone())),
        }
    }
}
