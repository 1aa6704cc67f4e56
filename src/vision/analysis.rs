// Medical image analysis prompt and response screening
use serde::Serialize;
use std::path::Path;

use super::preprocess::{encode_png_base64, load_image_path, preprocess};
use crate::errors::Result;
use crate::models::GenerativeModel;

/// Disclaimer the model is asked to end every analysis with
pub const CONSULT_DISCLAIMER: &str =
    "**Consult an experienced doctor or medical consultant for further evaluation.**";

/// Refusal phrases the prompt instructs the model to use
pub const REFUSAL_PHRASES: [&str; 2] = [
    "I don't know about this image",
    "This image doesn't match medical relevance",
];

/// Phrases that flag a response as not medically relevant
pub const IRRELEVANCE_MARKERS: [&str; 2] = ["Medical Relevance: Low", "Not a Medical Image"];

const IMAGE_PROMPT_HEAD: &str = "Imagine yourself as an experienced doctor or medical consultant. Provide a structured medical analysis of the patient's condition based on the image provided.

### Output Format:
The analysis **must** be presented in a **clear and structured table format** with the following categories:

| **Category**   | **Details** |
|---------------|------------|
| **Disease Name** | [Identify the possible disease based on the image] |
| **Symptoms** | [List key symptoms observed] |
| **Details** | [Provide a brief medical explanation] |
| **Causes** | [List potential causes or risk factors] |
| **Diagnosis** | [Suggest diagnostic methods] |
| **Treatments** | [Mention standard treatments] |
| **Medicine (Generic Name)** | [List medicine molecules or provide a prescription-style format] |
| **Prevention** | [Give preventive measures] |

### Important Guidelines:
- Ensure strict adherence to **table formatting**.
- Use precise medical terminology.
- Describe symptoms and findings objectively.
- If uncertain, provide potential differentials rather than assuming a single diagnosis.
";

/// Fill the analysis template with a base64 PNG
pub fn build_image_prompt(image_base64: &str) -> String {
    format!(
        "{head}\nAt the end, mention: \"{disclaimer}\"\n\n**Image:** {image}\n\n\
         But if you don't know about the image or it seems irrelevant or doesn't matches medical relevance, \
         please don't generate any analysis and respond as follows:\n\"{refuse_unknown}\" or \"{refuse_irrelevant}\"\n",
        head = IMAGE_PROMPT_HEAD,
        disclaimer = CONSULT_DISCLAIMER,
        image = image_base64,
        refuse_unknown = REFUSAL_PHRASES[0],
        refuse_irrelevant = REFUSAL_PHRASES[1],
    )
}

/// Outcome of the string-match relevance heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Relevance {
    Relevant,
    FlaggedIrrelevant { matched: &'static str },
}

/// Flag a response containing one of [`IRRELEVANCE_MARKERS`].
///
/// The refusal phrases the prompt asks for are not markers, so a model that
/// refuses as instructed is reported as `Relevant`.
pub fn assess_relevance(response: &str) -> Relevance {
    IRRELEVANCE_MARKERS
        .iter()
        .find(|marker| response.contains(*marker))
        .map(|matched| Relevance::FlaggedIrrelevant { matched: *matched })
        .unwrap_or(Relevance::Relevant)
}

/// A completed image analysis
#[derive(Debug, Clone, Serialize)]
pub struct ImageAnalysis {
    pub response: String,
    pub relevance: Relevance,
    /// Accepted from the user, not sent to the model
    pub question: Option<String>,
}

/// Load, normalize, encode and analyze the image at `path`
pub async fn analyze_image(
    llm: &dyn GenerativeModel,
    path: &Path,
    question: Option<String>,
    max_dimension: u32,
) -> Result<ImageAnalysis> {
    let image = load_image_path(path)?;
    let (width, height) = (image.width(), image.height());
    let prepared = preprocess(image, max_dimension);
    tracing::debug!(
        path = %path.display(),
        from = ?(width, height),
        to = ?(prepared.width(), prepared.height()),
        "image preprocessed"
    );

    let encoded = encode_png_base64(&prepared)?;
    let response = llm.generate(&build_image_prompt(&encoded)).await?;
    let relevance = assess_relevance(&response);

    Ok(ImageAnalysis {
        response,
        relevance,
        question,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockModel;
    use image::{DynamicImage, ImageFormat, RgbImage};

    #[test]
    fn test_prompt_contains_table_and_image() {
        let prompt = build_image_prompt("iVBORw0KGgo=");
        for category in [
            "Disease Name",
            "Symptoms",
            "Details",
            "Causes",
            "Diagnosis",
            "Treatments",
            "Medicine (Generic Name)",
            "Prevention",
        ] {
            assert!(prompt.contains(&format!("| **{}** |", category)), "{}", category);
        }
        assert!(prompt.contains("**Image:** iVBORw0KGgo="));
        assert!(prompt.contains(CONSULT_DISCLAIMER));
        assert!(prompt.contains("\"I don't know about this image\" or \"This image doesn't match medical relevance\""));
    }

    #[test]
    fn test_relevance_markers() {
        assert_eq!(
            assess_relevance("Medical Relevance: Low. This is a cat."),
            Relevance::FlaggedIrrelevant {
                matched: "Medical Relevance: Low"
            }
        );
        assert_eq!(
            assess_relevance("Not a Medical Image"),
            Relevance::FlaggedIrrelevant {
                matched: "Not a Medical Image"
            }
        );
        assert_eq!(assess_relevance("| **Disease Name** | Psoriasis |"), Relevance::Relevant);
    }

    #[test]
    fn test_instructed_refusal_not_flagged() {
        for phrase in REFUSAL_PHRASES {
            assert_eq!(assess_relevance(phrase), Relevance::Relevant);
        }
    }

    #[tokio::test]
    async fn test_analyze_image_sends_small_png() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rash.jpg");
        DynamicImage::ImageRgb8(RgbImage::new(640, 480))
            .save_with_format(&path, ImageFormat::Jpeg)
            .unwrap();

        let model = MockModel::replying("| **Disease Name** | Contact dermatitis |");
        let analysis = analyze_image(&model, &path, Some("Is this contagious?".to_string()), 224)
            .await
            .unwrap();

        assert_eq!(analysis.relevance, Relevance::Relevant);
        assert_eq!(analysis.question.as_deref(), Some("Is this contagious?"));

        let prompts = model.prompts();
        let prompt = &prompts[0];
        assert!(!prompt.contains("Is this contagious?"));
        let encoded = prompt
            .split("**Image:** ")
            .nth(1)
            .and_then(|rest| rest.split_whitespace().next())
            .unwrap();
        let sent = crate::vision::decode_png_base64(encoded).unwrap();
        assert_eq!((sent.width(), sent.height()), (224, 168));
    }
}
