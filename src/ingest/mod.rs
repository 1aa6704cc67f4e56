//! Knowledge-base population
//!
//! One-shot procedure behind `medquery ingest`: read the PDFs in the data
//! directory, split them into overlapping chunks, embed every chunk and
//! upsert the vectors into the index (creating the index first if needed).

pub mod loader;
pub mod splitter;

pub use loader::{discover_pdfs, load_pdf, Document};
pub use splitter::RecursiveCharacterSplitter;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::embedding::Embedder;
use crate::errors::{MedQueryError, Result};
use crate::vector_db::{IndexSpec, VectorRecord, VectorStore};

/// A chunk ready to be embedded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    pub text: String,
    pub source: String,
    pub chunk: usize,
}

/// Summary of an ingest run
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub documents: usize,
    pub skipped: Vec<PathBuf>,
    pub chunks: usize,
    pub vectors_upserted: usize,
    pub index_created: bool,
}

/// Load every PDF in `dir`. Unreadable files are logged and skipped;
/// a directory that yields no documents is an error.
pub async fn load_documents(dir: &Path) -> Result<(Vec<Document>, Vec<PathBuf>)> {
    let mut documents = Vec::new();
    let mut skipped = Vec::new();

    for path in discover_pdfs(dir)? {
        let target = path.clone();
        // pdf-extract can panic on malformed files; isolate each one.
        match tokio::task::spawn_blocking(move || load_pdf(&target)).await {
            Ok(Ok(document)) => {
                tracing::info!(source = %document.source, chars = document.text.len(), "loaded pdf");
                documents.push(document);
            }
            Ok(Err(e)) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping pdf");
                skipped.push(path);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "pdf extraction aborted");
                skipped.push(path);
            }
        }
    }

    if documents.is_empty() {
        return Err(MedQueryError::IngestError(format!(
            "No PDF documents could be loaded from {}",
            dir.display()
        )));
    }
    Ok((documents, skipped))
}

/// Split documents into numbered chunks
pub fn split_documents(documents: &[Document], splitter: &RecursiveCharacterSplitter) -> Vec<DocumentChunk> {
    documents
        .iter()
        .flat_map(|doc| {
            splitter
                .split_text(&doc.text)
                .into_iter()
                .enumerate()
                .map(move |(chunk, text)| DocumentChunk {
                    text,
                    source: doc.source.clone(),
                    chunk,
                })
        })
        .collect()
}

/// Embed chunks and upsert them, batching both steps
pub async fn index_chunks(
    chunks: &[DocumentChunk],
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
    embed_batch_size: usize,
    upsert_batch_size: usize,
) -> Result<usize> {
    let mut upserted = 0;

    for (batch_no, batch) in chunks.chunks(upsert_batch_size.max(1)).enumerate() {
        let mut records = Vec::with_capacity(batch.len());
        for group in batch.chunks(embed_batch_size.max(1)) {
            let texts: Vec<&str> = group.iter().map(|c| c.text.as_str()).collect();
            let vectors = embedder.embed_batch(&texts)?;
            if vectors.len() != group.len() {
                return Err(MedQueryError::EmbeddingError(format!(
                    "Expected {} embeddings, got {}",
                    group.len(),
                    vectors.len()
                )));
            }
            records.extend(group.iter().zip(vectors).map(|(chunk, values)| VectorRecord {
                id: uuid::Uuid::new_v4().to_string(),
                values,
                text: chunk.text.clone(),
                source: chunk.source.clone(),
                chunk: chunk.chunk,
            }));
        }

        upserted += store.upsert(&records).await?;
        tracing::debug!(batch = batch_no + 1, upserted, total = chunks.len(), "upserted batch");
    }

    Ok(upserted)
}

/// Full ingest: load, split, ensure the index, embed and upsert
pub async fn run_ingest(
    config: &Config,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
) -> Result<IngestReport> {
    let spec = IndexSpec::from_config(config);
    if embedder.dimension() != spec.dimension {
        return Err(MedQueryError::ConfigError(format!(
            "Embedding dimension {} does not match index dimension {}",
            embedder.dimension(),
            spec.dimension
        )));
    }

    let data_dir = config.data_dir();
    let (documents, skipped) = load_documents(&data_dir).await?;

    let splitter = RecursiveCharacterSplitter::new(config.ingest.chunk_size, config.ingest.chunk_overlap);
    let chunks = split_documents(&documents, &splitter);
    tracing::info!(documents = documents.len(), chunks = chunks.len(), "documents split");

    let index_created = store.ensure_index(&spec).await?;

    let vectors_upserted = index_chunks(
        &chunks,
        embedder.as_ref(),
        store.as_ref(),
        config.ingest.embed_batch_size,
        config.ingest.upsert_batch_size,
    )
    .await?;

    Ok(IngestReport {
        documents: documents.len(),
        skipped,
        chunks: chunks.len(),
        vectors_upserted,
        index_created,
    })
}
