/// Preview/state presenter
///
/// Owns what the window shows: section visibility, the two preview images
/// with their size labels, the savings figure and the status line. Preview
/// handles hold decoded-on-demand image data, so superseded handles are
/// released as soon as they are replaced.

use iced::widget::image::Handle;
use tracing::debug;

use crate::orchestrator::savings_percent;
use crate::state::{CompressedArtifact, SourceFile};

/// Size label shown when nothing is loaded
pub const EMPTY_SIZE_LABEL: &str = "0 KB";

const READY_STATUS: &str = "Drop an image or click to browse.";

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size with up to two decimals, e.g. "1.5 KB"
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// One rendered image and its size
#[derive(Debug, Clone)]
pub struct Preview {
    pub handle: Handle,
    pub size_label: String,
}

impl Preview {
    fn from_bytes(data: &[u8]) -> Self {
        Self {
            handle: Handle::from_bytes(data.to_vec()),
            size_label: format_file_size(data.len() as u64),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Presenter {
    sections_visible: bool,
    original: Option<Preview>,
    compressed: Option<Preview>,
    savings: Option<f64>,
    status: String,
}

impl Default for Presenter {
    fn default() -> Self {
        Self {
            sections_visible: false,
            original: None,
            compressed: None,
            savings: None,
            status: READY_STATUS.to_string(),
        }
    }
}

impl Presenter {
    pub fn sections_visible(&self) -> bool {
        self.sections_visible
    }

    pub fn original(&self) -> Option<&Preview> {
        self.original.as_ref()
    }

    pub fn compressed(&self) -> Option<&Preview> {
        self.compressed.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn original_size_label(&self) -> &str {
        self.original
            .as_ref()
            .map_or(EMPTY_SIZE_LABEL, |p| p.size_label.as_str())
    }

    pub fn compressed_size_label(&self) -> &str {
        self.compressed
            .as_ref()
            .map_or(EMPTY_SIZE_LABEL, |p| p.size_label.as_str())
    }

    /// e.g. "Saved 42.17%"
    pub fn savings_label(&self) -> Option<String> {
        self.savings.map(|percent| {
            if percent >= 0.0 {
                format!("Saved {:.2}%", percent)
            } else {
                format!("Grew {:.2}%", -percent)
            }
        })
    }

    /// Reveal the quality, preview and action regions
    pub fn show_controls(&mut self) {
        self.sections_visible = true;
    }

    /// Show a newly loaded original. Any previews of the previous file are
    /// released; returns how many.
    pub fn show_original(&mut self, source: &SourceFile) -> usize {
        let released = self.release_all();
        self.original = Some(Preview::from_bytes(&source.data));
        released
    }

    /// Install a compressed preview, returning the one it replaces
    pub fn show_compressed(&mut self, original_size: u64, artifact: &CompressedArtifact) -> Option<Preview> {
        self.savings = Some(savings_percent(original_size, artifact.size()));
        let released = self.compressed.replace(Preview::from_bytes(&artifact.data));
        if released.is_some() {
            debug!("Released previous compressed preview");
        }
        released
    }

    /// Back to the initial empty screen. Returns how many previews were released.
    pub fn reset(&mut self) -> usize {
        let released = self.release_all();
        *self = Self::default();
        released
    }

    fn release_all(&mut self) -> usize {
        let released = usize::from(self.original.take().is_some()) + usize::from(self.compressed.take().is_some());
        self.savings = None;
        if released > 0 {
            debug!("Released {} preview handle(s)", released);
        }
        released
    }
}
