//! # Label Image Module
//!
//! Loading, format detection and encoding of supplement label photos before
//! they are sent to the vision model.
//!
//! Format detection sniffs the leading bytes with `image::guess_format` rather
//! than trusting file extensions, and each format has its own size limit
//! (see [`ImageLimits`]).

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{imageops::FilterType, DynamicImage, GrayImage, ImageFormat, ImageOutputFormat};
use log::{debug, info, warn};
use std::io::Cursor;
use std::path::Path;

use crate::scan_config::ImageLimits;
use crate::scan_errors::ScanError;

/// Longest edge, in pixels, of a preprocessed image
pub const PREPROCESS_MAX_EDGE: u32 = 2048;

/// An encoded label image with its detected format
#[derive(Clone, PartialEq)]
pub struct LabelImage {
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl LabelImage {
    /// Read and validate an image file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScanError> {
        Self::from_path_with_limits(path, &ImageLimits::default())
    }

    pub fn from_path_with_limits(path: impl AsRef<Path>, limits: &ImageLimits) -> Result<Self, ScanError> {
        let path = path.as_ref();

        let metadata = std::fs::metadata(path)
            .map_err(|e| ScanError::ImageLoad(format!("{}: {}", path.display(), e)))?;
        if metadata.len() > limits.max_file_size {
            return Err(ScanError::Validation(format!(
                "Image file too large: {} bytes (maximum allowed: {} bytes)",
                metadata.len(),
                limits.max_file_size
            )));
        }

        let bytes = std::fs::read(path)
            .map_err(|e| ScanError::ImageLoad(format!("{}: {}", path.display(), e)))?;

        info!("Read {} bytes from label image {}", bytes.len(), path.display());

        Self::from_bytes_with_limits(bytes, limits)
    }

    /// Validate in-memory image bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ScanError> {
        Self::from_bytes_with_limits(bytes, &ImageLimits::default())
    }

    pub fn from_bytes_with_limits(bytes: Vec<u8>, limits: &ImageLimits) -> Result<Self, ScanError> {
        if bytes.len() < limits.min_format_bytes {
            return Err(ScanError::Validation(format!(
                "Could not read enough bytes to determine image format (read {} bytes, need at least {})",
                bytes.len(),
                limits.min_format_bytes
            )));
        }

        let format = image::guess_format(&bytes)
            .map_err(|e| ScanError::ImageLoad(format!("could not determine image format: {e}")))?;

        let Some(format_max) = format_limit(format, limits) else {
            warn!("Detected unsupported image format: {:?}", format);
            return Err(ScanError::Validation(format!("unsupported image format: {format:?}")));
        };

        let size = bytes.len() as u64;
        if size > format_max || size > limits.max_file_size {
            return Err(ScanError::Validation(format!(
                "{:?} image too large: {} bytes (maximum allowed: {} bytes)",
                format,
                size,
                format_max.min(limits.max_file_size)
            )));
        }

        debug!("Accepted {:?} label image of {} bytes", format, size);

        Ok(Self { bytes, format })
    }

    /// Decode a `data:<mime>;base64,<payload>` URL as sent by web and mobile clients
    pub fn from_data_url(data_url: &str) -> Result<Self, ScanError> {
        let payload = data_url
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
            .map(|(_, payload)| payload)
            .ok_or_else(|| ScanError::Validation("expected a base64 data URL".to_string()))?;

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| ScanError::ImageLoad(format!("invalid base64 payload: {e}")))?;

        Self::from_bytes(bytes)
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// MIME type of the detected format
    pub fn mime_type(&self) -> &'static str {
        match self.format {
            ImageFormat::Png => "image/png",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
            _ => "image/jpeg",
        }
    }

    /// Inline representation accepted by the vision endpoint
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.bytes))
    }

    /// Grayscale, contrast-stretched, size-capped PNG copy for curved or glossy labels
    pub fn preprocess_for_curved_text(&self) -> Result<LabelImage, ScanError> {
        let decoded = image::load_from_memory_with_format(&self.bytes, self.format)?;

        let resized = if decoded.width().max(decoded.height()) > PREPROCESS_MAX_EDGE {
            decoded.resize(PREPROCESS_MAX_EDGE, PREPROCESS_MAX_EDGE, FilterType::Triangle)
        } else {
            decoded
        };

        let mut gray = resized.to_luma8();
        stretch_contrast(&mut gray);

        let mut encoded = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(gray).write_to(&mut encoded, ImageOutputFormat::Png)?;

        let processed = encoded.into_inner();
        debug!(
            "Preprocessed {:?} image: {} bytes -> {} bytes PNG",
            self.format,
            self.bytes.len(),
            processed.len()
        );

        Ok(LabelImage {
            bytes: processed,
            format: ImageFormat::Png,
        })
    }
}

// The payload itself is never printed
impl std::fmt::Debug for LabelImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelImage")
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn format_limit(format: ImageFormat, limits: &ImageLimits) -> Option<u64> {
    match format {
        ImageFormat::Png => Some(limits.png_max),
        ImageFormat::Jpeg => Some(limits.jpeg_max),
        ImageFormat::WebP => Some(limits.webp_max),
        ImageFormat::Gif => Some(limits.gif_max),
        _ => None,
    }
}

/// Linearly map the darkest pixel to 0 and the brightest to 255
fn stretch_contrast(image: &mut GrayImage) {
    let (min, max) = image
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));

    if max <= min {
        return;
    }

    let range = f32::from(max - min);
    for pixel in image.pixels_mut() {
        let stretched = f32::from(pixel[0] - min) * 255.0 / range;
        pixel[0] = stretched.round() as u8;
    }
}
