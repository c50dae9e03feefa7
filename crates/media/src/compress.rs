//! Decode, downsize and re-encode uploads.
//!
//! | Step | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, WebP) | `image::load_from_memory` |
//! | Resize | `image::imageops::resize` with `Lanczos3` |
//! | Encode | `image::codecs::jpeg::JpegEncoder` at a fixed quality |
//! | Inline | `base64` standard engine into a `data:` URL |

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use tracing::debug;

use crate::calculations::fit_within_width;
use crate::error::MediaError;

pub const DEFAULT_MAX_WIDTH: u32 = 1200;
pub const DEFAULT_QUALITY: u8 = 70;
pub const OUTPUT_MIME: &str = "image/jpeg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressParams {
    pub max_width: u32,
    /// JPEG quality, 1-100.
    pub quality: u8,
}

impl Default for CompressParams {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            quality: DEFAULT_QUALITY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub original_width: u32,
    pub original_height: u32,
}

impl CompressedImage {
    pub fn mime_type(&self) -> &'static str {
        OUTPUT_MIME
    }

    /// Inline form stored directly in the gallery when no object store is configured.
    pub fn to_data_url(&self) -> String {
        format!("data:{OUTPUT_MIME};base64,{}", STANDARD.encode(&self.bytes))
    }
}

/// Downsize `input` to at most `params.max_width` and re-encode as JPEG.
pub fn compress_image(input: &[u8], params: &CompressParams) -> Result<CompressedImage, MediaError> {
    if input.is_empty() {
        return Err(MediaError::Empty);
    }
    let decoded = image::load_from_memory(input).map_err(MediaError::Decode)?;
    let (original_width, original_height) = (decoded.width(), decoded.height());
    if original_width == 0 || original_height == 0 {
        return Err(MediaError::ZeroSized);
    }

    let (width, height) = fit_within_width((original_width, original_height), params.max_width);
    // JPEG has no alpha channel.
    let rgb = decoded.to_rgb8();
    let resized = if (width, height) == (original_width, original_height) {
        rgb
    } else {
        imageops::resize(&rgb, width, height, FilterType::Lanczos3)
    };

    let mut bytes = Vec::new();
    let quality = params.quality.clamp(1, 100);
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode_image(&resized)
        .map_err(MediaError::Encode)?;

    debug!(
        original_width,
        original_height,
        width,
        height,
        input_bytes = input.len(),
        output_bytes = bytes.len(),
        "compressed gallery image"
    );

    Ok(CompressedImage {
        bytes,
        width,
        height,
        original_width,
        original_height,
    })
}
