//! Image loading and normalization
//!
//! Uploaded images are decoded (PNG or JPEG only), shrunk so that neither
//! side exceeds the configured bound, flattened to 8-bit RGB and re-encoded
//! as base64 PNG for embedding in a text prompt.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::Path;

use crate::errors::{MedQueryError, Result};

/// File extensions accepted for upload
pub const ACCEPTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Decode an uploaded image, rejecting anything that is not PNG or JPEG
pub fn load_image_bytes(bytes: &[u8]) -> Result<DynamicImage> {
    let format = image::guess_format(bytes)
        .map_err(|_| MedQueryError::ImageError("Unrecognized image data".to_string()))?;

    match format {
        ImageFormat::Png | ImageFormat::Jpeg => {}
        other => {
            return Err(MedQueryError::ImageError(format!(
                "Unsupported image format {:?}; upload a PNG or JPEG",
                other
            )))
        }
    }

    Ok(image::load_from_memory_with_format(bytes, format)?)
}

/// Read and decode an image file. The extension must be png, jpg or jpeg.
pub fn load_image_path(path: &Path) -> Result<DynamicImage> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(MedQueryError::ImageError(format!(
            "{} is not a PNG or JPEG file",
            path.display()
        )));
    }

    let bytes = std::fs::read(path)?;
    load_image_bytes(&bytes)
}

/// Shrink to fit within `max_dimension` (aspect preserved, never upscaled)
/// and convert to 3-channel RGB
pub fn preprocess(image: DynamicImage, max_dimension: u32) -> RgbImage {
    let resized = if image.width() > max_dimension || image.height() > max_dimension {
        image.resize(max_dimension, max_dimension, FilterType::Lanczos3)
    } else {
        image
    };
    resized.to_rgb8()
}

/// PNG-encode and base64 the image
pub fn encode_png_base64(image: &RgbImage) -> Result<String> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image.clone()).write_to(&mut buffer, ImageFormat::Png)?;
    Ok(STANDARD.encode(buffer.into_inner()))
}

/// Inverse of [`encode_png_base64`]
pub fn decode_png_base64(encoded: &str) -> Result<RgbImage> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| MedQueryError::ImageError(format!("Invalid base64 image: {}", e)))?;
    let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png)?;
    Ok(image.to_rgb8())
}
