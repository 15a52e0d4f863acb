/// Compression backed by the `image` crate
///
/// One pass decodes the source, caps its longest side, and re-encodes it in
/// the requested media type. If the result is still over the size cap (or
/// bigger than the source) the quality is stepped down by 5% per pass, and
/// the dimensions too unless the resolution is preserved. Output that still
/// ends up larger than the source is replaced by the source bytes.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use tracing::debug;

use super::{Compress, CompressOptions};
use crate::error::CompressionError;

/// Shrink factor applied per size-reduction pass
const STEP: f32 = 0.95;

#[derive(Debug, Default, Clone, Copy)]
pub struct NativeCompressor;

impl Compress for NativeCompressor {
    fn compress(&self, data: &[u8], options: &CompressOptions) -> Result<Vec<u8>, CompressionError> {
        let format = ImageFormat::from_mime_type(&options.output_type)
            .filter(|format| format.writing_enabled())
            .ok_or_else(|| CompressionError::Unsupported(options.output_type.clone()))?;

        let decoded = image::load_from_memory(data)
            .map_err(|e| CompressionError::Decode(e.to_string()))?;
        let mut img = fit_within(decoded, options.max_dimension);

        let mut quality = options.initial_quality;
        let mut output = encode(&img, format, quality)?;

        let source_size = data.len() as u64;
        let max_bytes = options.max_output_bytes();
        let mut remaining = options.max_iterations;

        while remaining > 0 && too_big(output.len() as u64, max_bytes, source_size) {
            // Lossless output at a fixed size would encode identically again
            if options.preserve_resolution && !uses_quality(format) {
                break;
            }
            remaining -= 1;

            quality *= STEP;
            if !options.preserve_resolution {
                img = scale(&img, STEP);
            }
            output = encode(&img, format, quality)?;

            debug!(
                "Size pass: {} bytes at quality {:.2} ({}x{})",
                output.len(),
                quality,
                img.width(),
                img.height()
            );
        }

        if output.len() as u64 > source_size {
            debug!("Output grew to {} bytes, keeping the {} byte source", output.len(), source_size);
            return Ok(data.to_vec());
        }
        Ok(output)
    }
}

fn too_big(size: u64, max_bytes: u64, source_size: u64) -> bool {
    size > max_bytes || size > source_size
}

fn uses_quality(format: ImageFormat) -> bool {
    matches!(format, ImageFormat::Jpeg)
}

/// Downscale so the longest side is at most `max_dimension`
fn fit_within(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    if max_dimension == 0 || img.width().max(img.height()) <= max_dimension {
        return img;
    }
    img.resize(max_dimension, max_dimension, FilterType::Lanczos3)
}

fn scale(img: &DynamicImage, factor: f32) -> DynamicImage {
    let width = ((img.width() as f32 * factor).round() as u32).max(1);
    let height = ((img.height() as f32 * factor).round() as u32).max(1);
    img.resize_exact(width, height, FilterType::Lanczos3)
}

/// Map a 0.0..=1.0 quality onto the JPEG encoder's 1..=100 scale
fn jpeg_quality(quality: f32) -> u8 {
    ((quality * 100.0).round() as i32).clamp(1, 100) as u8
}

fn encode(img: &DynamicImage, format: ImageFormat, quality: f32) -> Result<Vec<u8>, CompressionError> {
    let mut out = Cursor::new(Vec::new());

    let result = match format {
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel
            let encoder = JpegEncoder::new_with_quality(&mut out, jpeg_quality(quality));
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
        }
        ImageFormat::Png => {
            let encoder = PngEncoder::new_with_quality(&mut out, CompressionType::Best, PngFilter::Adaptive);
            img.write_with_encoder(encoder)
        }
        other => img.write_to(&mut out, other),
    };

    result.map_err(|e| CompressionError::Encode(e.to_string()))?;
    Ok(out.into_inner())
}
