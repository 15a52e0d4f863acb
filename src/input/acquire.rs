/// Reading and validating a candidate image
///
/// The media type is taken from the file extension first, like a browser
/// does. Files with an unknown extension get a second chance by sniffing
/// the magic bytes.

use std::path::{Path, PathBuf};

use image::ImageFormat;
use tracing::{debug, warn};

use crate::error::{CompressorResult, InputError};
use crate::state::SourceFile;

/// Media type used when nothing else matches
const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// Extensions offered in the file picker
pub const PICKER_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff", "ico", "tga", "qoi",
];

/// Extensions that can never hold an image, with the type a browser reports
const NON_IMAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    ("htm", "text/html"),
    ("html", "text/html"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    ("docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    ("xls", "application/vnd.ms-excel"),
    ("xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("7z", "application/x-7z-compressed"),
    ("exe", "application/vnd.microsoft.portable-executable"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("flac", "audio/flac"),
    ("mp4", "video/mp4"),
    ("m4v", "video/mp4"),
    ("mov", "video/quicktime"),
    ("mkv", "video/x-matroska"),
    ("avi", "video/x-msvideo"),
    ("webm", "video/webm"),
];

/// Media type implied by the file extension, if it names an image format
pub fn media_type_from_extension(path: &Path) -> Option<&'static str> {
    ImageFormat::from_path(path).ok().map(|format| format.to_mime_type())
}

/// Media type of a known non-image extension
pub fn non_image_media_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_string_lossy().to_ascii_lowercase();
    NON_IMAGE_EXTENSIONS
        .iter()
        .find(|(known, _)| *known == extension)
        .map(|(_, media_type)| *media_type)
}

/// Media type from the name alone; None means the contents must decide
fn media_type_from_name(path: &Path) -> Option<&'static str> {
    media_type_from_extension(path).or_else(|| non_image_media_type(path))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// Reject a path before reading it when its extension already rules out an image.
///
/// Unknown extensions pass; their contents are sniffed after the read.
pub fn check_extension(path: &Path) -> Result<(), InputError> {
    match media_type_from_name(path) {
        Some(media_type) if !is_image(media_type) => Err(InputError::NotAnImage {
            name: file_name(path),
            media_type: media_type.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Media type guessed from the leading bytes
pub fn media_type_from_contents(data: &[u8]) -> Option<&'static str> {
    image::guess_format(data).ok().map(|format| format.to_mime_type())
}

pub fn is_image(media_type: &str) -> bool {
    media_type.starts_with("image/")
}

/// Build a source file from bytes, rejecting anything that is not an image
pub fn identify(name: &str, path: Option<&Path>, data: Vec<u8>) -> Result<SourceFile, InputError> {
    let media_type = path
        .and_then(media_type_from_name)
        .or_else(|| media_type_from_name(Path::new(name)))
        .or_else(|| media_type_from_contents(&data))
        .unwrap_or(UNKNOWN_MEDIA_TYPE);

    if !is_image(media_type) {
        return Err(InputError::NotAnImage {
            name: name.to_string(),
            media_type: media_type.to_string(),
        });
    }

    let mut source = SourceFile::new(name, media_type, data);
    if let Some(path) = path {
        source = source.with_path(path.to_path_buf());
    }
    Ok(source)
}

/// Read a file from disk and validate it
pub async fn load_source(path: PathBuf) -> CompressorResult<SourceFile> {
    let data = tokio::fs::read(&path).await.map_err(|e| {
        warn!("Failed to read {}: {}", path.display(), e);
        InputError::Read {
            path: path.clone(),
            reason: e.to_string(),
        }
    })?;

    let name = file_name(&path);
    let source = identify(&name, Some(&path), data)?;
    debug!("Read {} ({}, {} bytes)", source.name, source.media_type, source.size());
    Ok(source)
}
