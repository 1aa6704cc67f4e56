// Retrieval QA chain: retrieve -> stuff -> prompt -> generate
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::Result;
use crate::models::GenerativeModel;
use crate::rag::context::stuff_passages;
use crate::rag::prompt::PromptTemplate;
use crate::rag::retrieval::Retriever;
use crate::vector_db::RetrievedPassage;

/// Everything one chain invocation produced
#[derive(Debug, Clone, Serialize)]
pub struct ChainOutput {
    /// Model answer
    pub result: String,
    /// Passages that were stuffed into the prompt
    pub source_documents: Vec<RetrievedPassage>,
    /// Prompt exactly as sent to the model
    pub prompt: String,
}

/// Question answering over retrieved passages
pub struct RetrievalQa {
    retriever: Retriever,
    llm: Arc<dyn GenerativeModel>,
    prompt: PromptTemplate,
}

impl RetrievalQa {
    pub fn new(retriever: Retriever, llm: Arc<dyn GenerativeModel>, prompt: PromptTemplate) -> Self {
        Self {
            retriever,
            llm,
            prompt,
        }
    }

    /// Run the chain. `query` is used both for retrieval and as the question.
    pub async fn run(&self, query: &str) -> Result<ChainOutput> {
        let source_documents = self.retriever.retrieve(query).await?;
        let context = stuff_passages(&source_documents);

        let values = HashMap::from([("context", context.as_str()), ("question", query)]);
        let prompt = self.prompt.render(&values)?;

        let result = self.llm.generate(&prompt).await?;
        tracing::info!(
            model = self.llm.model_name(),
            passages = source_documents.len(),
            answer_chars = result.len(),
            "retrieval chain answered"
        );

        Ok(ChainOutput {
            result,
            source_documents,
            prompt,
        })
    }
}
