//! # Configuration
//!
//! Optional, read-only settings file at
//! `<config_dir>/gamepad-visualizer/config.toml`. Every field has a default,
//! so a missing file (or a missing field) yields the stock behavior. The file
//! is never written.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::controller::backend::RumblePulse;
use crate::controller::poller::PollerSettings;
use crate::render::frame::RenderSettings;

const APP_DIR: &str = "gamepad-visualizer";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Poll and repaint period
    pub tick_interval_ms: u64,
    /// Controller image, relative paths resolve against the working directory first
    pub background_image: PathBuf,
    pub stick_travel: f32,
    pub window: WindowConfig,
    pub rumble: RumbleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval_ms: 30,
            background_image: PathBuf::from("controller_image.png"),
            stick_travel: 20.0,
            window: WindowConfig::default(),
            rumble: RumbleConfig::default(),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RumbleConfig {
    /// Button index that triggers the pulse
    pub button: usize,
    pub low_frequency: f32,
    pub high_frequency: f32,
    pub duration_ms: u32,
}

impl Default for RumbleConfig {
    fn default() -> Self {
        let pulse = RumblePulse::default();
        Self {
            button: PollerSettings::default().rumble_button,
            low_frequency: pulse.low_frequency,
            high_frequency: pulse.high_frequency,
            duration_ms: pulse.duration_ms,
        }
    }
}

impl Config {
    /// Loads the user config, falling back to defaults on any problem
    pub fn load_or_default() -> Self {
        let Some(path) = default_path() else {
            debug!("No config directory on this platform, using defaults");
            return Self::default();
        };
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::from(CONFIG_FILE),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(invalid("tick_interval_ms", "must be greater than zero"));
        }
        if !(self.stick_travel.is_finite() && self.stick_travel >= 0.0) {
            return Err(invalid("stick_travel", "must be a non-negative number"));
        }
        if !(self.window.width > 0.0 && self.window.height > 0.0) {
            return Err(invalid("window", "width and height must be positive"));
        }
        for (field, magnitude) in [
            ("rumble.low_frequency", self.rumble.low_frequency),
            ("rumble.high_frequency", self.rumble.high_frequency),
        ] {
            if !(0.0..=1.0).contains(&magnitude) {
                return Err(invalid(field, "must be within 0.0 and 1.0"));
            }
        }
        if self.rumble.duration_ms == 0 {
            return Err(invalid("rumble.duration_ms", "must be greater than zero"));
        }
        Ok(())
    }

    pub fn poller_settings(&self) -> PollerSettings {
        PollerSettings {
            rumble_button: self.rumble.button,
            rumble: RumblePulse {
                low_frequency: self.rumble.low_frequency,
                high_frequency: self.rumble.high_frequency,
                duration_ms: self.rumble.duration_ms,
            },
        }
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            stick_travel: self.stick_travel,
        }
    }
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
