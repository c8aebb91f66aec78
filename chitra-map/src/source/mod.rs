//! Device sources that supply protocol records to the update engine.
//!
//! | File | Existing | Missing |
//! |------|----------|---------|
//! | `.gd` | static grid, loaded once | `SourceUnavailable` |
//! | `.cd` | [`LogSource`] playback | [`LiveSource`] recording to that path |
//! | `.sd` | [`SonarSource`] playback | `SourceUnavailable` |
//!
//! Network playback uses [`DatagramSource`].

mod coord_log;
mod datagram;
mod live;
mod reader;
mod sonar;

use std::path::Path;

use crate::error::{Error, Result};

pub use coord_log::LogSource;
pub use datagram::{DatagramConfig, DatagramSource};
pub use live::{ChannelDevice, LiveDevice, LiveFeed, LiveLink, LiveSource};
pub use reader::{COMMENT_PREFIX, CommentedLines};
pub use sonar::{SONAR_COUNT, SonarMapper, SonarSource};

/// Where readings come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DataSource {
    /// Nothing opened
    #[default]
    None,
    /// Streaming device
    Live,
    /// Recorded file playback
    Recorded,
    /// Pre-built static map
    Static,
    /// Remote view server
    Network,
}

/// What kind of device produced the readings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RangeDevice {
    /// Nothing opened
    #[default]
    None,
    /// Static grid data
    Static,
    /// Sonar ring through the external mapper
    Sonar,
    /// Logged coordinate data
    Log,
    /// Datagram stream
    Datagram,
}

/// Result of asking a source for its next record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceStep {
    /// Raw protocol text
    Record(String),
    /// Nothing to apply this step; more may follow
    Idle,
    /// No data arrived before the read timeout
    Pending,
    /// End of data
    Exhausted,
    /// Remote side requested shutdown
    Quit,
}

/// A source of protocol records.
pub trait DeviceSource: Send {
    /// Source kind for UI enablement.
    fn data_source(&self) -> DataSource;

    /// Device kind for UI enablement.
    fn range_device(&self) -> RangeDevice;

    /// Fetch the next record.
    fn step(&mut self) -> Result<SourceStep>;

    /// Rewind to the first record.
    fn reset(&mut self) -> Result<()>;

    /// Release the underlying resource. Safe to call more than once.
    fn close(&mut self);

    /// Handles for driving a live session, if this is one.
    fn live_link(&self) -> Option<LiveLink> {
        None
    }
}

/// Data file kinds recognised by extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    /// `.gd` static grid data
    StaticGrid,
    /// `.sd` raw sonar range data
    SonarData,
    /// `.cd` logged coordinate data
    CoordinateLog,
}

impl FileKind {
    /// Classify a path by extension.
    pub fn classify(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("gd") => Ok(FileKind::StaticGrid),
            Some("sd") => Ok(FileKind::SonarData),
            Some("cd") => Ok(FileKind::CoordinateLog),
            _ => Err(Error::SourceUnavailable(format!(
                "{}: unrecognised data file extension (expected .gd, .sd or .cd)",
                path.display()
            ))),
        }
    }

    /// Device kind a file of this kind plays back as.
    pub fn range_device(self) -> RangeDevice {
        match self {
            FileKind::StaticGrid => RangeDevice::Static,
            FileKind::SonarData => RangeDevice::Sonar,
            FileKind::CoordinateLog => RangeDevice::Log,
        }
    }
}
