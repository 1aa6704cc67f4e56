//! Text Query page
//!
//! Web search first, then the retrieval chain over the question with the
//! formatted web block appended. The answer and its supporting sources are
//! rendered; the sources panel starts collapsed.

use serde::Serialize;

use super::{AppContext, Severity};
use crate::errors::Result;
use crate::rag::{augment_question, MedicalPipeline};
use crate::search::{format_web_sources, WebResult, WebSearch};
use crate::vector_db::RetrievedPassage;

pub const EMPTY_QUERY_WARNING: &str = "Please enter a medical query";
pub const PIPELINE_UNAVAILABLE: &str = "Could not initialize medical knowledge pipeline";

/// Everything the page shows for a successful query
#[derive(Debug, Clone, Serialize)]
pub struct QueryAnswer {
    pub question: String,
    pub answer: String,
    pub web_sources: Vec<WebResult>,
    pub passages: Vec<RetrievedPassage>,
    pub prompt: String,
}

#[derive(Debug, Clone)]
pub enum TextQueryOutcome {
    EmptyQuery,
    PipelineUnavailable,
    Failed(String),
    Answered(QueryAnswer),
}

/// Handle one submission of the text page
pub async fn run_text_query(ctx: &AppContext, query: &str) -> TextQueryOutcome {
    if query.trim().is_empty() {
        return TextQueryOutcome::EmptyQuery;
    }

    let max_results = ctx.config.search.max_results;
    match answer_query(ctx.search.as_ref(), ctx.pipeline.pipeline(), query, max_results).await {
        Ok(Some(answer)) => TextQueryOutcome::Answered(answer),
        Ok(None) => TextQueryOutcome::PipelineUnavailable,
        Err(e) => {
            tracing::error!(error = %e, "text query failed");
            TextQueryOutcome::Failed(e.to_string())
        }
    }
}

async fn answer_query(
    search: &dyn WebSearch,
    pipeline: Option<&MedicalPipeline>,
    query: &str,
    max_results: usize,
) -> Result<Option<QueryAnswer>> {
    let web_sources = search.search(query, max_results).await?;

    let Some(pipeline) = pipeline else {
        return Ok(None);
    };

    let full_query = augment_question(query, &format_web_sources(&web_sources));
    let output = pipeline.answer(&full_query).await?;

    Ok(Some(QueryAnswer {
        question: query.to_string(),
        answer: output.result,
        web_sources,
        passages: output.source_documents,
        prompt: output.prompt,
    }))
}

impl TextQueryOutcome {
    pub fn severity(&self) -> Severity {
        match self {
            TextQueryOutcome::EmptyQuery => Severity::Warning,
            TextQueryOutcome::PipelineUnavailable | TextQueryOutcome::Failed(_) => Severity::Error,
            TextQueryOutcome::Answered(_) => Severity::Info,
        }
    }

    /// Render as page text. `expand_sources` opens the sources panel.
    pub fn render(&self, preview_chars: usize, expand_sources: bool) -> String {
        match self {
            TextQueryOutcome::EmptyQuery => EMPTY_QUERY_WARNING.to_string(),
            TextQueryOutcome::PipelineUnavailable => PIPELINE_UNAVAILABLE.to_string(),
            TextQueryOutcome::Failed(e) => format!("An error occurred: {}", e),
            TextQueryOutcome::Answered(answer) => {
                let mut out = format!("### Medical Insights\n{}\n\n", answer.answer);
                if expand_sources {
                    out.push_str(&render_sources_panel(answer, preview_chars));
                } else {
                    out.push_str("▸ Supporting Sources (collapsed)\n");
                }
                out
            }
        }
    }
}

/// Expanded "Supporting Sources" panel
pub fn render_sources_panel(answer: &QueryAnswer, preview_chars: usize) -> String {
    let mut out = String::from("▾ Supporting Sources\n#### Web Sources\n");
    for source in &answer.web_sources {
        out.push_str(&format!("- **{}**\n  {}\n", source.title, source.link));
    }
    out.push_str("#### Knowledge Base Sources\n");
    for passage in &answer.passages {
        out.push_str(&format!("- {}...\n", passage.preview(preview_chars)));
    }
    out
}
