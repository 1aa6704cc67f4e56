//! Presentation layer
//!
//! Two pages, "Text Query" and "Image Analysis", share one [`AppContext`]
//! built at startup. Page handlers never return errors: every failure is
//! folded into an outcome enum that renders as an inline message.

pub mod image_analysis;
pub mod text_query;

pub use image_analysis::{run_image_analysis, ImageOutcome};
pub use text_query::{run_text_query, QueryAnswer, TextQueryOutcome};

use std::sync::Arc;

use crate::config::{Config, Credentials};
use crate::rag::MedicalPipeline;
use crate::search::WebSearch;

/// Sidebar disclaimer shown with every page
pub const DISCLAIMER: &str =
    "This AI provides informational support only. Always consult healthcare professionals for medical advice.";

pub const APP_TITLE: &str = "MedQuery AI";

/// How an outcome should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// The two selectable pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    TextQuery,
    ImageAnalysis,
}

impl Page {
    pub fn title(&self) -> &'static str {
        match self {
            Page::TextQuery => "Text Query",
            Page::ImageAnalysis => "Image Analysis",
        }
    }

    pub fn header(&self) -> &'static str {
        match self {
            Page::TextQuery => APP_TITLE,
            Page::ImageAnalysis => "Medical Image Analysis",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "text" | "query" | "text query" | "text-query" => Some(Page::TextQuery),
            "image" | "images" | "image analysis" | "image-analysis" => Some(Page::ImageAnalysis),
            _ => None,
        }
    }
}

/// Result of the once-per-process pipeline initialization
pub enum PipelineState {
    Ready(MedicalPipeline),
    Failed(String),
}

impl PipelineState {
    /// Build the pipeline, capturing any failure instead of returning it
    pub async fn initialize(config: &Config, credentials: &Credentials) -> Self {
        match MedicalPipeline::initialize(config, credentials).await {
            Ok(pipeline) => PipelineState::Ready(pipeline),
            Err(e) => {
                tracing::error!(error = %e, "pipeline initialization failed");
                PipelineState::Failed(e.to_string())
            }
        }
    }

    pub fn pipeline(&self) -> Option<&MedicalPipeline> {
        match self {
            PipelineState::Ready(pipeline) => Some(pipeline),
            PipelineState::Failed(_) => None,
        }
    }

    /// Page-level error for a failed initialization
    pub fn error_banner(&self) -> Option<String> {
        match self {
            PipelineState::Ready(_) => None,
            PipelineState::Failed(e) => Some(format!("RAG Pipeline Initialization Error: {}", e)),
        }
    }
}

/// Everything the page handlers need, built once at startup
pub struct AppContext {
    pub config: Config,
    pub pipeline: PipelineState,
    pub search: Arc<dyn WebSearch>,
}

impl AppContext {
    pub fn new(config: Config, pipeline: PipelineState, search: Arc<dyn WebSearch>) -> Self {
        Self {
            config,
            pipeline,
            search,
        }
    }
}
