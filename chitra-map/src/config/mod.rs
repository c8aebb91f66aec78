//! Configuration loading for ChitraMap.
//!
//! Everything lives in one TOML file; every field has a default, so an
//! empty file (or none at all) is a valid configuration.
//!
//! | Section | Description |
//! |---------|-------------|
//! | [`GridSection`] | Grid side length |
//! | [`HistorySection`] | Undo capacity |
//! | [`ViewportSection`] | Initial zoom, window size, overlays, tracking |
//! | [`PlaybackSection`] | Animation speed index |
//! | [`NetworkSection`] | Remote view server |
//! | [`MapperSettings`] | Pass-through for the external sonar mapper |
//! | [`LoggingSection`] | Default log level |
//!
//! ```toml
//! [grid]
//! size = 2000
//!
//! [viewport]
//! cell_size = 4
//! track_robot = true
//!
//! [network]
//! host = "192.168.1.20"
//! control_port = 5600
//!
//! [mapper]
//! sonar_model = "cone"
//! beta = 15
//! ```

mod defaults;
mod mapper;
mod viewer;

pub use mapper::{MapperSettings, MotionModelSettings, SonarModel};
pub use viewer::{
    GridSection, HistorySection, LoggingSection, NetworkSection, PlaybackSection,
    ViewerConfig, ViewportSection,
};
