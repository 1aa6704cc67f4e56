//! Medical image analysis
//!
//! Images bypass retrieval entirely: they are normalized, base64-encoded and
//! embedded in a fixed structured-analysis prompt sent straight to the model.

pub mod analysis;
pub mod preprocess;

pub use analysis::{
    analyze_image, assess_relevance, build_image_prompt, ImageAnalysis, Relevance,
    IRRELEVANCE_MARKERS, REFUSAL_PHRASES,
};
pub use preprocess::{
    decode_png_base64, encode_png_base64, load_image_bytes, load_image_path, preprocess,
};
