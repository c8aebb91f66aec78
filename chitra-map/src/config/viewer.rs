//! Main ViewerConfig and its sections.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::source::DatagramConfig;

use super::defaults;
use super::mapper::MapperSettings;

/// `[grid]` section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSection {
    /// Side length in cells
    #[serde(default = "defaults::grid_size")]
    pub size: usize,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            size: defaults::grid_size(),
        }
    }
}

/// `[history]` section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistorySection {
    /// Undo entries kept before the oldest is dropped
    #[serde(default = "defaults::undo_capacity")]
    pub undo_capacity: usize,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            undo_capacity: defaults::undo_capacity(),
        }
    }
}

/// `[viewport]` section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportSection {
    /// Initial cell size in pixels
    #[serde(default = "defaults::cell_size")]
    pub cell_size: i32,

    /// Visible window width (pixels)
    #[serde(default = "defaults::view_width")]
    pub width: i32,

    /// Visible window height (pixels)
    #[serde(default = "defaults::view_height")]
    pub height: i32,

    /// Draw cell grid lines
    #[serde(default = "defaults::enabled")]
    pub draw_grid: bool,

    /// Draw the origin axes and labels
    #[serde(default = "defaults::enabled")]
    pub draw_axis: bool,

    /// Keep the robot in view during playback
    #[serde(default)]
    pub track_robot: bool,
}

impl Default for ViewportSection {
    fn default() -> Self {
        Self {
            cell_size: defaults::cell_size(),
            width: defaults::view_width(),
            height: defaults::view_height(),
            draw_grid: true,
            draw_axis: true,
            track_robot: false,
        }
    }
}

/// `[playback]` section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSection {
    /// Index into the animation delay table (0 slowest)
    #[serde(default = "defaults::playback_speed")]
    pub speed: usize,
}

impl Default for PlaybackSection {
    fn default() -> Self {
        Self {
            speed: defaults::playback_speed(),
        }
    }
}

/// `[network]` section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkSection {
    /// View server host
    #[serde(default = "defaults::host")]
    pub host: String,

    /// View server control port
    #[serde(default = "defaults::control_port")]
    pub control_port: u16,

    /// Step reply timeout; blocks indefinitely when absent
    #[serde(default)]
    pub read_timeout_ms: Option<u64>,
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            control_port: defaults::control_port(),
            read_timeout_ms: None,
        }
    }
}

impl NetworkSection {
    /// Convert to a datagram connection config.
    pub fn to_datagram_config(&self) -> DatagramConfig {
        DatagramConfig {
            host: self.host.clone(),
            control_port: self.control_port,
            read_timeout: self.read_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// `[logging]` section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

/// Full viewer configuration loaded from TOML.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Grid settings
    #[serde(default)]
    pub grid: GridSection,

    /// Undo history settings
    #[serde(default)]
    pub history: HistorySection,

    /// Viewport settings
    #[serde(default)]
    pub viewport: ViewportSection,

    /// Animation settings
    #[serde(default)]
    pub playback: PlaybackSection,

    /// Remote view server
    #[serde(default)]
    pub network: NetworkSection,

    /// External mapper pass-through
    #[serde(default)]
    pub mapper: MapperSettings,

    /// Logging
    #[serde(default)]
    pub logging: LoggingSection,
}

impl ViewerConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load from `path` if it exists, otherwise use defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("{} not found, using default config", path.display());
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: ViewerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to a TOML file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Reject values the viewer cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.grid.size < 2 {
            return Err(Error::Config(format!(
                "grid.size must be at least 2, got {}",
                self.grid.size
            )));
        }
        if self.viewport.width <= 0 || self.viewport.height <= 0 {
            return Err(Error::Config(format!(
                "viewport must have positive size, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        let invalid = self.mapper.invalid_fields();
        if !invalid.is_empty() {
            return Err(Error::Config(format!(
                "invalid mapper settings: {}",
                invalid.join(", ")
            )));
        }
        Ok(())
    }
}
