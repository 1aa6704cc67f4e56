//! MedQuery - medical insights over a retrieval-augmented pipeline
//!
//! Answers free-text medical questions by combining a web search over
//! trusted medical sites with passages retrieved from a vector index of
//! medical reference books, and describes uploaded medical images with a
//! hosted multimodal model.
//!
//! # Architecture
//!
//! - **Services**: embedding model, vector store, web search, generative model
//! - **Pipeline**: retriever + prompt template + model (`rag`)
//! - **Pages**: Text Query and Image Analysis, rendered by the CLI and REPL
//! - **Ingest**: one-shot PDF to vector index population

// Core
pub mod config;
pub mod errors;
pub mod logging;

// External services
pub mod embedding;
pub mod models;
pub mod search;
pub mod vector_db;

// Pipeline and processing
pub mod ingest;
pub mod rag;
pub mod vision;

// Presentation
pub mod cli;
pub mod doctor;
pub mod pages;
pub mod repl;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{Config, Credentials};
pub use errors::{MedQueryError, Result};
pub use pages::{AppContext, PipelineState};
