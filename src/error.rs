//! Error types for the image compressor.
//!
//! Errors travel inside UI messages, so every type here is `Clone` and keeps
//! its causes as strings.

use std::path::PathBuf;
use thiserror::Error;

/// Problems with a file the user dropped or picked.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    /// The file's media type is not `image/*`
    #[error("{name} is not an image ({media_type})")]
    NotAnImage { name: String, media_type: String },

    /// The file could not be read from disk
    #[error("Failed to read {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },
}

/// Failures reported by a compression capability.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompressionError {
    /// Output media type cannot be produced
    #[error("Unsupported output type: {0}")]
    Unsupported(String),

    /// Source payload could not be decoded
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Encoder rejected the image
    #[error("Failed to encode image: {0}")]
    Encode(String),

    /// Background worker panicked or was cancelled
    #[error("Compression task failed: {0}")]
    Task(String),
}

/// Top-level error surfaced to the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompressorError {
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("Compression failed: {0}")]
    Compression(#[from] CompressionError),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Settings error: {0}")]
    Config(String),
}

pub type CompressorResult<T> = Result<T, CompressorError>;

impl CompressorError {
    pub fn download<T: Into<String>>(msg: T) -> Self {
        Self::Download(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    /// Text shown in the blocking alert dialog.
    pub fn user_message(&self) -> String {
        match self {
            Self::Input(InputError::NotAnImage { .. }) => "Please select an image file!".to_string(),
            Self::Input(InputError::Read { path, .. }) => {
                format!("Could not read {}.", path.display())
            }
            Self::Compression(_) => "Image compression failed, please try again!".to_string(),
            Self::Download(reason) => format!("Could not save the compressed image: {}", reason),
            Self::Config(reason) => format!("Settings could not be loaded: {}", reason),
        }
    }
}
