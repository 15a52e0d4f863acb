/// Application settings
///
/// Settings are read once at start-up from a JSON file in the user's config
/// directory. Every field has a default, so a partial file is fine and a
/// missing file means "all defaults". The app never writes this file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CompressorError, CompressorResult};
use crate::state::Quality;

/// Tunables for the compression pipeline and UI
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Slider position at start-up and after reset (0-100)
    pub default_quality: u8,

    /// Quiet period after the last slider change before recompressing
    pub debounce_ms: u64,

    /// Output size the compressor tries to stay under
    pub max_output_size_mb: f64,

    /// Longest side in pixels; larger images are downscaled
    pub max_dimension: u32,

    /// Run compression on the blocking pool instead of the UI task
    pub use_background_worker: bool,

    /// Keep dimensions fixed while shrinking towards the size cap
    pub preserve_resolution: bool,

    /// Encode in the source's media type instead of JPEG
    pub preserve_type: bool,

    /// Upper bound on size-reduction passes
    pub max_iterations: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_quality: 80,
            debounce_ms: 300,
            max_output_size_mb: 10.0,
            max_dimension: 1920,
            use_background_worker: true,
            preserve_resolution: true,
            preserve_type: true,
            max_iterations: 10,
        }
    }
}

impl Settings {
    /// Parse from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn default_quality(&self) -> Quality {
        Quality::new(self.default_quality)
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Load settings from the standard location, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            debug!("No config directory available, using default settings");
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(Some(settings)) => {
                info!("Loaded settings from {}", path.display());
                settings
            }
            Ok(None) => {
                debug!("No settings file at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Read a settings file. `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> CompressorResult<Option<Self>> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CompressorError::config(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        Self::from_json(&json).map(Some).map_err(|e| {
            CompressorError::config(format!("invalid settings in {}: {}", path.display(), e))
        })
    }

    /// Where the settings file lives:
    /// - Linux: ~/.config/image-compressor/settings.json
    /// - macOS: ~/Library/Application Support/image-compressor/settings.json
    /// - Windows: %APPDATA%\image-compressor\settings.json
    pub fn settings_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("image-compressor");
        path.push("settings.json");
        Some(path)
    }
}
