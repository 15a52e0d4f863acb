/// Session data model
///
/// A session starts when an image is accepted and ends on reset or when the
/// next image replaces it. It owns the source file and at most one
/// compressed artifact.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::orchestrator::RequestId;

/// Prefix prepended to the original filename when downloading
pub const DOWNLOAD_PREFIX: &str = "compressed_";

/// Compression quality as an integer percentage, always within 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u8);

impl Quality {
    pub const DEFAULT: Quality = Quality(80);
    pub const MAX: u8 = 100;

    /// Values above 100 are clamped
    pub fn new(percent: u8) -> Self {
        Self(percent.min(Self::MAX))
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    /// Quality as the 0.0..=1.0 factor handed to the compressor
    pub fn fraction(self) -> f32 {
        f32::from(self.0) / 100.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Identifies one loaded file; results tagged with an older id are stale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

/// The user's original image
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// Display name (e.g., "holiday.jpg")
    pub name: String,
    /// Where the file was read from, if it came from disk
    pub path: Option<PathBuf>,
    /// Media type such as "image/jpeg"
    pub media_type: String,
    /// Raw file contents
    pub data: Arc<Vec<u8>>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            path: None,
            media_type: media_type.into(),
            data: Arc::new(data),
        }
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Output of one compression run
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedArtifact {
    pub data: Arc<Vec<u8>>,
    /// Quality the request was made with
    pub quality: Quality,
    /// Request that produced this artifact
    pub request: RequestId,
}

impl CompressedArtifact {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// A loaded image and its current compression result
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    source: SourceFile,
    artifact: Option<CompressedArtifact>,
}

impl Session {
    pub fn new(id: SessionId, source: SourceFile) -> Self {
        Self {
            id,
            source,
            artifact: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn source(&self) -> &SourceFile {
        &self.source
    }

    /// The most recently completed artifact, if any
    pub fn artifact(&self) -> Option<&CompressedArtifact> {
        self.artifact.as_ref()
    }

    /// Install a new artifact, returning the one it supersedes
    pub fn install(&mut self, artifact: CompressedArtifact) -> Option<CompressedArtifact> {
        self.artifact.replace(artifact)
    }

    /// Filename offered when saving the artifact
    pub fn download_name(&self) -> String {
        download_name(&self.source.name)
    }
}

/// `"compressed_" + original`
pub fn download_name(original: &str) -> String {
    format!("{}{}", DOWNLOAD_PREFIX, original)
}
