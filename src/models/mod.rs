//! Generative model adapter
//!
//! Sends a prompt to a hosted large language model and returns its text.
//! The production client talks to the Gemini `generateContent` REST API.

pub mod client;
pub mod types;

pub use client::GeminiClient;
pub use types::{GenerateContentRequest, GenerateContentResponse};

use async_trait::async_trait;

use crate::errors::Result;

/// A text-in, text-out language model
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Send `prompt` and return the model's full text response
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier for logs and diagnostics
    fn model_name(&self) -> &str;
}
