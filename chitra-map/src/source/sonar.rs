//! Raw sonar range data (`.sd`) source.
//!
//! Each line of an `.sd` file holds one pose plus all sixteen sonar ranges.
//! Converting a range into cell probabilities is the job of an external
//! [`SonarMapper`]; this source only walks the file and cycles through the
//! sonars, skipping those for which the mapper produced nothing (out of
//! range, disabled or obstructed).

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use super::reader::CommentedLines;
use super::{DataSource, DeviceSource, RangeDevice, SourceStep};
use crate::error::{Error, Result};

/// Sonars per raw reading (Pioneer ring).
pub const SONAR_COUNT: usize = 16;

/// Adapter for the external sonar occupancy mapper.
pub trait SonarMapper: Send {
    /// Map one sonar of a raw reading line into a protocol record.
    ///
    /// An empty string means the sonar contributed nothing.
    fn map_reading(&mut self, raw: &str, sonar: usize) -> Result<String>;

    /// Forget accumulated state when playback rewinds.
    fn reset(&mut self) {}
}

impl<M: SonarMapper + ?Sized> SonarMapper for Box<M> {
    fn map_reading(&mut self, raw: &str, sonar: usize) -> Result<String> {
        (**self).map_reading(raw, sonar)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Steps through a recorded `.sd` file through a [`SonarMapper`].
pub struct SonarSource<M: SonarMapper> {
    path: PathBuf,
    lines: Option<CommentedLines<BufReader<File>>>,
    mapper: M,
    /// Raw line currently being mapped
    current: String,
    /// Next sonar to map from `current`
    sonar: usize,
}

impl<M: SonarMapper> SonarSource<M> {
    /// Open a sonar file.
    pub fn open(path: impl AsRef<Path>, mapper: M) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let lines = Self::open_lines(&path)?;
        log::info!("Opened sonar data {}", path.display());
        Ok(Self {
            path,
            lines: Some(lines),
            mapper,
            current: String::new(),
            sonar: 0,
        })
    }

    fn open_lines(path: &Path) -> Result<CommentedLines<BufReader<File>>> {
        let file = File::open(path)
            .map_err(|e| Error::SourceUnavailable(format!("{}: {}", path.display(), e)))?;
        Ok(CommentedLines::new(BufReader::new(file)))
    }

    /// The wrapped mapper.
    pub fn mapper(&self) -> &M {
        &self.mapper
    }
}

impl<M: SonarMapper> DeviceSource for SonarSource<M> {
    fn data_source(&self) -> DataSource {
        DataSource::Recorded
    }

    fn range_device(&self) -> RangeDevice {
        RangeDevice::Sonar
    }

    fn step(&mut self) -> Result<SourceStep> {
        let Some(lines) = self.lines.as_mut() else {
            return Ok(SourceStep::Exhausted);
        };

        loop {
            if self.sonar == 0 {
                match lines.next_content_line()? {
                    Some(line) => self.current = line,
                    None => return Ok(SourceStep::Exhausted),
                }
            }

            let record = self.mapper.map_reading(&self.current, self.sonar)?;
            self.sonar = (self.sonar + 1) % SONAR_COUNT;

            if !record.is_empty() {
                return Ok(SourceStep::Record(record));
            }
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.lines = Some(Self::open_lines(&self.path)?);
        self.sonar = 0;
        self.current.clear();
        self.mapper.reset();
        Ok(())
    }

    fn close(&mut self) {
        self.lines = None;
    }
}
