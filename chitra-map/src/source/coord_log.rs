//! Recorded coordinate log (`.cd`) source.
//!
//! Each entry is two non-comment lines: the pose line and the fill line.
//! The fill line may be empty, or missing on the final entry.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use super::reader::CommentedLines;
use super::{DataSource, DeviceSource, RangeDevice, SourceStep};
use crate::error::{Error, Result};

/// Steps through a recorded `.cd` log one entry at a time.
pub struct LogSource {
    path: PathBuf,
    lines: Option<CommentedLines<BufReader<File>>>,
    entries_read: usize,
}

impl LogSource {
    /// Open a log file for playback.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let lines = Self::open_lines(&path)?;
        log::info!("Opened coordinate log {}", path.display());
        Ok(Self {
            path,
            lines: Some(lines),
            entries_read: 0,
        })
    }

    fn open_lines(path: &Path) -> Result<CommentedLines<BufReader<File>>> {
        let file = File::open(path)
            .map_err(|e| Error::SourceUnavailable(format!("{}: {}", path.display(), e)))?;
        Ok(CommentedLines::new(BufReader::new(file)))
    }

    /// Path of the log being played.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries returned since open or the last reset.
    pub fn entries_read(&self) -> usize {
        self.entries_read
    }
}

impl DeviceSource for LogSource {
    fn data_source(&self) -> DataSource {
        DataSource::Recorded
    }

    fn range_device(&self) -> RangeDevice {
        RangeDevice::Log
    }

    fn step(&mut self) -> Result<SourceStep> {
        let Some(lines) = self.lines.as_mut() else {
            return Ok(SourceStep::Exhausted);
        };

        let Some(pose) = lines.next_content_line()? else {
            return Ok(SourceStep::Exhausted);
        };
        let fill = lines.next_line()?.unwrap_or_default();

        self.entries_read += 1;
        Ok(SourceStep::Record(format!("{}\n{}", pose, fill)))
    }

    fn reset(&mut self) -> Result<()> {
        self.lines = Some(Self::open_lines(&self.path)?);
        self.entries_read = 0;
        log::debug!("Rewound {}", self.path.display());
        Ok(())
    }

    fn close(&mut self) {
        if self.lines.take().is_some() {
            log::debug!("Closed {}", self.path.display());
        }
    }
}
