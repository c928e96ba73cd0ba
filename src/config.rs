//! Editor settings
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```json
//! { "nudge_step": 0.25, "download_name": "trimmed.wav" }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::audio::Region;
use crate::error::{AudioError, Result};

/// File name used when exporting the active file into a directory
pub const DEFAULT_DOWNLOAD_NAME: &str = "cut_audio.wav";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Seconds moved by each start/end nudge
    pub nudge_step: f64,

    /// Resolution of the region slider in seconds
    pub slider_step: f64,

    /// Region selected when a file is opened
    pub initial_region: Region,

    /// Export file name
    pub download_name: String,

    /// Extensions accepted on upload, without the leading dot
    pub accepted_extensions: Vec<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            nudge_step: 0.1,
            slider_step: 0.01,
            initial_region: Region::new(0.0, 1.0),
            download_name: DEFAULT_DOWNLOAD_NAME.to_string(),
            accepted_extensions: vec!["mp3".to_string(), "wav".to_string()],
        }
    }
}

impl EditorConfig {
    /// Load a JSON config file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| AudioError::FileOpen {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.nudge_step > 0.0 && self.nudge_step.is_finite()) {
            return Err(AudioError::InvalidConfig(format!(
                "nudge_step must be positive, got {}",
                self.nudge_step
            )));
        }

        if !(self.slider_step > 0.0 && self.slider_step.is_finite()) {
            return Err(AudioError::InvalidConfig(format!(
                "slider_step must be positive, got {}",
                self.slider_step
            )));
        }

        if self.initial_region.start < 0.0 || self.initial_region.is_degenerate() {
            return Err(AudioError::InvalidConfig(format!(
                "initial_region must satisfy 0 <= start < end, got {}",
                self.initial_region
            )));
        }

        if self.download_name.trim().is_empty() {
            return Err(AudioError::InvalidConfig(
                "download_name cannot be empty".to_string(),
            ));
        }

        if self.accepted_extensions.is_empty() {
            return Err(AudioError::InvalidConfig(
                "accepted_extensions cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
