// SPDX-License-Identifier: GPL-3.0-only

//! JPEG encoding for still frames
//!
//! Backends that render raw RGB frames (the virtual camera, the directory
//! gallery) go through here so every JPEG in the crate uses the same quality
//! table.

use image::RgbImage;
use tracing::debug;

/// Encoding quality settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingQuality {
    /// Low quality (high compression)
    Low,
    /// Medium quality (balanced)
    Medium,
    /// High quality (low compression)
    #[default]
    High,
    /// Maximum quality (minimal compression)
    Maximum,
}

impl EncodingQuality {
    /// Get JPEG quality value (0-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            EncodingQuality::Low => 60,
            EncodingQuality::Medium => 80,
            EncodingQuality::High => 92,
            EncodingQuality::Maximum => 98,
        }
    }

    /// Map a capture quality name onto an encoder setting
    ///
    /// `"photo"` is the still-capture preset and encodes at maximum quality.
    /// Unknown names yield `None`.
    pub fn from_capture_quality(name: &str) -> Option<Self> {
        match name {
            "low" => Some(EncodingQuality::Low),
            "medium" => Some(EncodingQuality::Medium),
            "high" => Some(EncodingQuality::High),
            "photo" => Some(EncodingQuality::Maximum),
            _ => None,
        }
    }
}

/// Encode an RGB frame as JPEG
pub fn encode_jpeg(image: &RgbImage, quality: EncodingQuality) -> Result<Vec<u8>, String> {
    let mut output = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut output);

    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality.jpeg_quality());

    image
        .write_with_encoder(encoder)
        .map_err(|e| format!("JPEG encoding failed: {}", e))?;

    debug!(
        width = image.width(),
        height = image.height(),
        size = output.len(),
        "Encoded JPEG"
    );
    Ok(output)
}
