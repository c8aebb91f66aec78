//! Update engine: applies readings to the grid and keeps history.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::ViewerConfig;
use crate::core::{Cell, RangeReading, Rect, SENTINEL, is_legal_value};
use crate::error::{Error, Result};
use crate::grid::{GridStats, GridStore};
use crate::io::{load_grid_data, save_grid_data};
use crate::protocol::{decode, encode_record};
use crate::source::{
    DataSource, DatagramConfig, DatagramSource, DeviceSource, FileKind, LiveLink, LiveSource,
    LogSource, RangeDevice, SonarMapper, SonarSource, SourceStep,
};

use super::history::{History, UndoEntry};
use super::observer::{ChangeEvent, ChangeObserver};

/// Longest slice of a rejected record echoed into the log.
const LOG_RECORD_PREVIEW: usize = 100;

/// Result of one [`UpdateEngine::update`] step.
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateOutcome {
    /// A reading was applied to the grid
    Applied(RangeReading),
    /// Nothing was applied (empty, malformed or no-op record); more may follow
    Skipped,
    /// The source had nothing ready before its read timeout
    Waiting,
    /// The source has no more data
    Exhausted,
    /// The remote side requested shutdown
    Shutdown,
}

impl UpdateOutcome {
    /// The applied reading, if any.
    pub fn reading(&self) -> Option<&RangeReading> {
        match self {
            UpdateOutcome::Applied(r) => Some(r),
            _ => None,
        }
    }

    /// True when playback should stop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, UpdateOutcome::Exhausted | UpdateOutcome::Shutdown)
    }
}

/// Owner of the grid, its undo/redo history and the active source.
pub struct UpdateEngine {
    grid: GridStore,
    history: History,
    source: Option<Box<dyn DeviceSource>>,
    data_source: DataSource,
    range_device: RangeDevice,
    static_region: Option<Rect>,
    observer: Option<Box<dyn ChangeObserver>>,
}

impl UpdateEngine {
    /// Create an engine around `grid` with no source attached.
    pub fn new(grid: GridStore, undo_capacity: usize) -> Self {
        Self {
            grid,
            history: History::new(undo_capacity),
            source: None,
            data_source: DataSource::None,
            range_device: RangeDevice::None,
            static_region: None,
            observer: None,
        }
    }

    /// Create an engine sized by `config`.
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(
            GridStore::new(config.grid.size),
            config.history.undo_capacity,
        )
    }

    // ========================================================================
    // Sources
    // ========================================================================

    /// Replace the active source, starting from an empty grid.
    pub fn attach_source(&mut self, source: Box<dyn DeviceSource>) {
        self.close();
        self.data_source = source.data_source();
        self.range_device = source.range_device();
        self.static_region = None;
        self.source = Some(source);
        self.grid.clear();
        self.history.clear();
        log::info!(
            "Attached {:?} source ({:?} device)",
            self.data_source,
            self.range_device
        );
        self.notify(ChangeEvent::Reset);
    }

    /// Open a data file, dispatching on its extension.
    ///
    /// `.gd` loads a static map. An existing `.cd` plays back as a log and
    /// a missing one starts a live session recording into it. `.sd` plays
    /// back through `mapper`, which is required.
    pub fn open_file(
        &mut self,
        path: impl AsRef<Path>,
        mapper: Option<Box<dyn SonarMapper>>,
    ) -> Result<()> {
        let path = path.as_ref();
        match FileKind::classify(path)? {
            FileKind::StaticGrid => self.load_static(path).map(|_| ()),
            FileKind::CoordinateLog if path.exists() => {
                self.attach_source(Box::new(LogSource::open(path)?));
                Ok(())
            }
            FileKind::CoordinateLog => {
                self.attach_source(Box::new(LiveSource::new(path)));
                Ok(())
            }
            FileKind::SonarData => {
                let mapper = mapper.ok_or_else(|| {
                    Error::SourceUnavailable(format!(
                        "{}: sonar data requires a sonar mapper",
                        path.display()
                    ))
                })?;
                self.attach_source(Box::new(SonarSource::open(path, mapper)?));
                Ok(())
            }
        }
    }

    /// Connect to a remote view server.
    pub fn connect(&mut self, config: &DatagramConfig) -> Result<()> {
        let source = DatagramSource::connect(config)?;
        self.attach_source(Box::new(source));
        Ok(())
    }

    /// Load a `.gd` static map, replacing the grid contents.
    ///
    /// The file is fully parsed and validated before the grid changes.
    pub fn load_static(&mut self, path: impl AsRef<Path>) -> Result<Rect> {
        let map = load_grid_data(path, self.grid.shift())?;

        self.close();
        self.grid.clear();
        self.history.clear();
        map.apply(&mut self.grid)?;

        self.data_source = DataSource::Static;
        self.range_device = RangeDevice::Static;
        self.static_region = Some(map.region);
        self.notify(ChangeEvent::Reset);
        Ok(map.region)
    }

    /// Close the active source, if any. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.close();
        }
    }

    // ========================================================================
    // Updates
    // ========================================================================

    /// Advance one step.
    ///
    /// Pending redo entries are replayed first; otherwise the next record is
    /// pulled from the active source and decoded.
    pub fn update(&mut self) -> Result<UpdateOutcome> {
        if let Some(reading) = self.history.pop_redo() {
            return Ok(UpdateOutcome::Applied(self.apply_reading(reading)));
        }

        let Some(source) = self.source.as_mut() else {
            return Ok(UpdateOutcome::Exhausted);
        };

        match source.step()? {
            SourceStep::Record(text) => Ok(self.update_record(&text)),
            SourceStep::Idle => Ok(UpdateOutcome::Skipped),
            SourceStep::Pending => Ok(UpdateOutcome::Waiting),
            SourceStep::Exhausted => Ok(UpdateOutcome::Exhausted),
            SourceStep::Quit => Ok(UpdateOutcome::Shutdown),
        }
    }

    /// Decode and apply one protocol record.
    ///
    /// Malformed records are logged and skipped without touching the grid.
    pub fn update_record(&mut self, record: &str) -> UpdateOutcome {
        match decode(record, self.grid.shift()) {
            Ok(Some(reading)) => UpdateOutcome::Applied(self.apply(reading)),
            Ok(None) => UpdateOutcome::Skipped,
            Err(e) => {
                let preview: String = record.chars().take(LOG_RECORD_PREVIEW).collect();
                log::warn!("{} in record '{}'", e, preview);
                UpdateOutcome::Skipped
            }
        }
    }

    /// Apply a reading as a fresh update, discarding pending redo entries.
    pub fn apply(&mut self, reading: RangeReading) -> RangeReading {
        self.history.clear_redo();
        self.apply_reading(reading)
    }

    /// Snapshot the touched cells, write the fill and record the undo entry.
    fn apply_reading(&mut self, reading: RangeReading) -> RangeReading {
        let mut cells: Vec<Cell> = Vec::with_capacity(reading.fill.len());
        let mut prior: Vec<Cell> = Vec::with_capacity(reading.fill.len());
        for cell in &reading.fill {
            if !is_legal_value(cell.pr) {
                log::warn!("Dropping fill ({}, {}) with illegal value {}", cell.x, cell.y, cell.pr);
                continue;
            }
            match self.grid.get(cell.x, cell.y) {
                Ok(value) => {
                    prior.push(Cell::new(cell.x, cell.y, value));
                    cells.push(*cell);
                }
                Err(e) => log::warn!("Dropping fill: {}", e),
            }
        }

        for cell in &cells {
            let current = self.grid.get(cell.x, cell.y).unwrap_or(SENTINEL);
            if !cell.is_path() && current == SENTINEL {
                continue;
            }
            if let Err(e) = self.grid.set(cell.x, cell.y, cell.pr) {
                log::warn!("Skipping write: {}", e);
            }
        }

        self.history.push_undo(UndoEntry {
            reading: reading.clone(),
            prior,
        });
        self.notify(ChangeEvent::Applied(reading.clone()));
        reading
    }

    /// Revert the most recent reading. `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<RangeReading> {
        let entry = self.history.pop_undo()?;
        for cell in entry.prior.iter().rev() {
            if let Err(e) = self.grid.set(cell.x, cell.y, cell.pr) {
                log::warn!("Skipping restore: {}", e);
            }
        }
        self.history.push_redo(entry.reading.clone());
        self.notify(ChangeEvent::Undone(entry.reading.clone()));
        Some(entry.reading)
    }

    /// Re-apply the most recently undone reading.
    pub fn redo(&mut self) -> Option<RangeReading> {
        let reading = self.history.pop_redo()?;
        Some(self.apply_reading(reading))
    }

    /// Rewind the source and clear the grid and history.
    ///
    /// Fails with `UnsupportedOperation` for live and static sources, leaving
    /// all state untouched.
    pub fn reset(&mut self) -> Result<()> {
        let Some(source) = self.source.as_mut() else {
            return Err(Error::UnsupportedOperation(format!(
                "reset of a {:?} source",
                self.data_source
            )));
        };
        source.reset()?;

        self.grid.clear();
        self.history.clear();
        log::info!("Reset {:?} source", self.data_source);
        self.notify(ChangeEvent::Reset);
        Ok(())
    }

    /// Clear the grid and history, keeping the source's read position.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.history.clear();
        self.notify(ChangeEvent::Cleared);
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Save the grid as `.gd`.
    ///
    /// Only static maps and sonar sessions can be saved. The saved region is
    /// the static region if one was loaded, otherwise the bounds of every
    /// known cell.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        match self.range_device {
            RangeDevice::Static | RangeDevice::Sonar => {}
            device => {
                return Err(Error::UnsupportedOperation(format!(
                    "saving a map built from a {:?} device",
                    device
                )));
            }
        }

        let region = self
            .static_region
            .or_else(|| self.grid.known_bounds())
            .ok_or_else(|| Error::InvalidRegion("grid has no known cells".to_string()))?;
        save_grid_data(path, &self.grid, region)
    }

    /// Write the readings still in undo history as a `.cd` log.
    ///
    /// Only the most recent `undo_capacity` readings are kept, so the log
    /// replays the tail of a longer session.
    pub fn write_log<W: Write>(&self, mut out: W) -> Result<()> {
        let shift = self.grid.shift();
        writeln!(out, "% ChitraMap session log")?;
        writeln!(out, "% {} readings", self.history.undo_depth())?;
        for reading in self.history.readings() {
            writeln!(out, "{}", encode_record(reading, shift))?;
        }
        out.flush()?;
        Ok(())
    }

    /// Save the history as a replayable `.cd` log.
    pub fn save_log(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.write_log(BufWriter::new(File::create(path)?))?;
        log::info!(
            "Saved {} readings to {}",
            self.history.undo_depth(),
            path.display()
        );
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Read-only grid access.
    pub fn grid(&self) -> &GridStore {
        &self.grid
    }

    /// Value of one cell.
    pub fn cell_value(&self, x: i32, y: i32) -> Result<f32> {
        self.grid.get(x, y)
    }

    /// Grid side length.
    pub fn grid_size(&self) -> usize {
        self.grid.size()
    }

    /// Loaded static region, if any.
    pub fn dimension(&self) -> Option<Rect> {
        self.static_region
    }

    /// Active source kind.
    pub fn data_source(&self) -> DataSource {
        self.data_source
    }

    /// Active device kind.
    pub fn range_device(&self) -> RangeDevice {
        self.range_device
    }

    /// Live session handles when the source is live.
    pub fn live_link(&self) -> Option<LiveLink> {
        self.source.as_ref().and_then(|s| s.live_link())
    }

    /// Cell counts by category.
    pub fn grid_stats(&self) -> GridStats {
        self.grid.stats()
    }

    /// Undo entries available.
    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    /// Redo entries available.
    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Register the change observer, replacing any previous one.
    pub fn set_observer(&mut self, observer: impl ChangeObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Remove the change observer.
    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    fn notify(&mut self, event: ChangeEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer.change_performed(&event);
        }
    }
}

impl Default for UpdateEngine {
    fn default() -> Self {
        Self::new(GridStore::default(), super::MAX_UNDO_HISTORY)
    }
}

impl Drop for UpdateEngine {
    fn drop(&mut self) {
        self.close();
    }
}
