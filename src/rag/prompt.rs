// Prompt templates for retrieval-augmented answering
use std::collections::HashMap;

use crate::errors::{MedQueryError, Result};

/// Question-answering template filled with stuffed passages and the question
pub const QA_TEMPLATE: &str = "Use the following pieces of context to answer the question.
If you don't know the answer, just say that you don't know, don't try to make up an answer.

Context: {context}

Question: {question}

Helpful Answer:";

/// A template with named `{placeholders}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
    input_variables: Vec<String>,
}

impl PromptTemplate {
    pub fn new(template: &str, input_variables: &[&str]) -> Self {
        Self {
            template: template.to_string(),
            input_variables: input_variables.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// The `context` + `question` template used by the retrieval chain
    pub fn question_answering() -> Self {
        Self::new(QA_TEMPLATE, &["context", "question"])
    }

    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// Substitute every declared variable. Missing values are an error.
    pub fn render(&self, values: &HashMap<&str, &str>) -> Result<String> {
        if let Some(missing) = self
            .input_variables
            .iter()
            .find(|var| !values.contains_key(var.as_str()))
        {
            return Err(MedQueryError::Generic(format!(
                "Missing prompt variable: {}",
                missing
            )));
        }

        // Single pass, so substituted values are never scanned again.
        let mut rendered = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        while let Some(open) = rest.find('{') {
            rendered.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let value = after
                .find('}')
                .and_then(|close| values.get(&after[..close]).map(|v| (close, *v)))
                .filter(|(close, _)| self.input_variables.iter().any(|v| v == &after[..*close]));
            match value {
                Some((close, v)) => {
                    rendered.push_str(v);
                    rest = &after[close + 1..];
                }
                None => {
                    rendered.push('{');
                    rest = after;
                }
            }
        }
        rendered.push_str(rest);
        Ok(rendered)
    }
}

/// Append the web-search block to the user's question
pub fn augment_question(query: &str, web_block: &str) -> String {
    format!("{}\n\nAdditional Context: {}", query, web_block)
}
