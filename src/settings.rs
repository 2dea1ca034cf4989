//! Visual preferences
//!
//! Read once at startup from an inline JSON block in the host page (browser)
//! or a JSON file given on the command line (native). Never written back.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Triangles per circle
    pub fn circle_segments(&self) -> u32 {
        match self {
            QualityPreset::Low => 12,
            QualityPreset::Medium => 24,
            QualityPreset::High => 40,
        }
    }

    /// Whether to draw backdrop stars
    pub fn starfield_enabled(&self) -> bool {
        match self {
            QualityPreset::Low => false,
            QualityPreset::Medium => true,
            QualityPreset::High => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Invincibility blinking and pulsing pickups
    pub flashing_effects: bool,
    /// Accessibility override that disables flashing regardless of the above
    pub reduced_motion: bool,
    /// Show FPS counter
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            flashing_effects: true,
            reduced_motion: false,
            show_fps: false,
        }
    }
}

/// Failure reading a settings document
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "cannot read settings: {err}"),
            Self::Parse(err) => write!(f, "invalid settings JSON: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl Settings {
    /// Element id of the inline configuration block in the host page
    pub const CONFIG_ELEMENT_ID: &'static str = "arcade-config";

    /// Effective flashing (respects reduced_motion)
    pub fn effective_flashing(&self) -> bool {
        self.flashing_effects && !self.reduced_motion
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read settings from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Read the inline configuration block, falling back to defaults (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());

        match json {
            Some(json) if !json.trim().is_empty() => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings ({} quality)", settings.quality.as_str());
                    settings
                }
                Err(err) => {
                    log::warn!("Ignoring page settings: {err}");
                    Self::default()
                }
            },
            _ => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }
}
