//! Image Analysis page

use std::path::Path;

use super::text_query::PIPELINE_UNAVAILABLE;
use super::{AppContext, Severity};
use crate::vision::{analyze_image, ImageAnalysis, Relevance};

pub const NO_IMAGE_WARNING: &str = "Please upload a medical image";
pub const IRRELEVANT_WARNING: &str = "The uploaded image does not appear to be medically relevant.";

#[derive(Debug, Clone)]
pub enum ImageOutcome {
    NoImage,
    Failed(String),
    Analyzed(ImageAnalysis),
}

/// Handle one submission of the image page
pub async fn run_image_analysis(
    ctx: &AppContext,
    image: Option<&Path>,
    question: Option<String>,
) -> ImageOutcome {
    let Some(path) = image else {
        return ImageOutcome::NoImage;
    };

    let Some(pipeline) = ctx.pipeline.pipeline() else {
        tracing::error!("image analysis requested without a model client");
        return ImageOutcome::Failed(PIPELINE_UNAVAILABLE.to_string());
    };

    let question = question.filter(|q| !q.trim().is_empty());
    let llm = pipeline.llm();
    match analyze_image(llm.as_ref(), path, question, ctx.config.image.max_dimension).await {
        Ok(analysis) => ImageOutcome::Analyzed(analysis),
        Err(e) => {
            let chain = error_chain(&e);
            tracing::error!(error = %e, chain = %chain, path = %path.display(), "image analysis failed");
            ImageOutcome::Failed(e.to_string())
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": caused by: ")
}

impl ImageOutcome {
    pub fn severity(&self) -> Severity {
        match self {
            ImageOutcome::NoImage => Severity::Warning,
            ImageOutcome::Failed(_) => Severity::Error,
            ImageOutcome::Analyzed(analysis) => match analysis.relevance {
                Relevance::Relevant => Severity::Info,
                Relevance::FlaggedIrrelevant { .. } => Severity::Warning,
            },
        }
    }

    pub fn render(&self) -> String {
        match self {
            ImageOutcome::NoImage => NO_IMAGE_WARNING.to_string(),
            ImageOutcome::Failed(e) => format!("Image analysis error: {}", e),
            ImageOutcome::Analyzed(analysis) => {
                let mut out = format!("### Image Analysis\n{}\n", analysis.response);
                if let Relevance::FlaggedIrrelevant { .. } = analysis.relevance {
                    out.push_str(&format!(
                        "\n{}\nImage Description: {}\n",
                        IRRELEVANT_WARNING, analysis.response
                    ));
                }
                out
            }
        }
    }
}
