//! Compression capability.
//!
//! The orchestrator only talks to the [`Compress`] trait. [`NativeCompressor`]
//! is the implementation shipped with the app; tests substitute their own.

mod native;

pub use native::NativeCompressor;

use std::sync::Arc;

use crate::error::CompressionError;
use crate::state::{Quality, Settings};

/// Media type used when the source type is not preserved
pub const FALLBACK_OUTPUT_TYPE: &str = "image/jpeg";

/// Configuration passed to the compressor for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressOptions {
    /// Output size the compressor tries to stay under
    pub max_output_size_mb: f64,
    /// Longest side in pixels (0 disables the cap)
    pub max_dimension: u32,
    /// Run on the blocking pool
    pub use_background_worker: bool,
    /// Target quality, 0.0..=1.0
    pub quality: f32,
    /// Keep dimensions while shrinking towards the size cap
    pub preserve_resolution: bool,
    /// Quality of the first encoding pass, 0.0..=1.0
    pub initial_quality: f32,
    /// Media type of the output, e.g. "image/png"
    pub output_type: String,
    /// Upper bound on size-reduction passes
    pub max_iterations: u32,
}

impl CompressOptions {
    /// Options for compressing a `media_type` source at `quality`
    pub fn new(settings: &Settings, quality: Quality, media_type: &str) -> Self {
        let output_type = if settings.preserve_type {
            media_type.to_string()
        } else {
            FALLBACK_OUTPUT_TYPE.to_string()
        };

        Self {
            max_output_size_mb: settings.max_output_size_mb,
            max_dimension: settings.max_dimension,
            use_background_worker: settings.use_background_worker,
            quality: quality.fraction(),
            preserve_resolution: settings.preserve_resolution,
            initial_quality: quality.fraction(),
            output_type,
            max_iterations: settings.max_iterations,
        }
    }

    pub fn max_output_bytes(&self) -> u64 {
        (self.max_output_size_mb * 1024.0 * 1024.0) as u64
    }
}

/// Something that turns an encoded image into a smaller encoded image
pub trait Compress: Send + Sync {
    fn compress(&self, data: &[u8], options: &CompressOptions) -> Result<Vec<u8>, CompressionError>;
}

/// Run a compressor, on the blocking pool if the options ask for it
pub async fn run(
    compressor: Arc<dyn Compress>,
    data: Arc<Vec<u8>>,
    options: CompressOptions,
) -> Result<Vec<u8>, CompressionError> {
    if options.use_background_worker {
        tokio::task::spawn_blocking(move || compressor.compress(&data, &options))
            .await
            .map_err(|e| CompressionError::Task(e.to_string()))?
    } else {
        compressor.compress(&data, &options)
    }
}
