//! Live device feed.
//!
//! A live device produces records on its own thread. [`LiveFeed`] runs it,
//! appends every record to the session log and applies it through the
//! shared engine's lock. The engine itself only sees a [`LiveSource`],
//! which never yields records from `step` and cannot be rewound.
//!
//! ```text
//! LiveDevice thread ──record──▶ recorder (.cd) ──▶ engine.lock().update_record()
//!        ▲
//!        └── running flag (cleared by LiveSource::close or LiveFeed::stop)
//! ```

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};

use super::{DataSource, DeviceSource, RangeDevice, SourceStep};
use crate::engine::{SharedEngine, UpdateOutcome};
use crate::error::{Error, Result};

/// How often a channel-backed device rechecks the running flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A device that pushes records as they become available.
pub trait LiveDevice: Send + 'static {
    /// Produce records until `running` is cleared or the device stops.
    ///
    /// The feed clears `running` once this returns.
    fn run(&mut self, running: &AtomicBool, emit: &mut dyn FnMut(&str)) -> Result<()>;
}

/// Live device fed from a channel (e.g. by an external mapper adapter).
pub struct ChannelDevice {
    rx: Receiver<String>,
}

impl ChannelDevice {
    /// Wrap a receiver of protocol records.
    pub fn new(rx: Receiver<String>) -> Self {
        Self { rx }
    }
}

impl LiveDevice for ChannelDevice {
    fn run(&mut self, running: &AtomicBool, emit: &mut dyn FnMut(&str)) -> Result<()> {
        while running.load(Ordering::Relaxed) {
            match self.rx.recv_timeout(POLL_INTERVAL) {
                Ok(record) => emit(&record),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        Ok(())
    }
}

/// Handles shared between a [`LiveSource`] and its [`LiveFeed`].
#[derive(Clone, Debug)]
pub struct LiveLink {
    /// Cleared to stop the device thread
    pub running: Arc<AtomicBool>,
    /// Session recording path
    pub record_path: PathBuf,
}

/// Engine-side placeholder for a live session.
pub struct LiveSource {
    link: LiveLink,
}

impl LiveSource {
    /// Prepare a live session recording into `record_path`.
    pub fn new(record_path: impl AsRef<Path>) -> Self {
        Self {
            link: LiveLink {
                running: Arc::new(AtomicBool::new(true)),
                record_path: record_path.as_ref().to_path_buf(),
            },
        }
    }
}

impl DeviceSource for LiveSource {
    fn data_source(&self) -> DataSource {
        DataSource::Live
    }

    fn range_device(&self) -> RangeDevice {
        RangeDevice::Log
    }

    fn step(&mut self) -> Result<SourceStep> {
        Ok(SourceStep::Idle)
    }

    fn reset(&mut self) -> Result<()> {
        Err(Error::UnsupportedOperation(
            "a streaming live source cannot be rewound".to_string(),
        ))
    }

    fn close(&mut self) {
        self.link.running.store(false, Ordering::Relaxed);
    }

    fn live_link(&self) -> Option<LiveLink> {
        Some(self.link.clone())
    }
}

/// Appends live records to the session log in `.cd` entry form.
struct Recorder {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl Recorder {
    fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Error::SourceUnavailable(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
        })
    }

    fn append(&mut self, record: &str) -> std::io::Result<()> {
        let (pose, fill) = record.split_once('\n').unwrap_or((record, ""));
        writeln!(self.writer, "{}", pose.trim_end())?;
        writeln!(self.writer, "{}", fill.trim_end())?;
        self.writer.flush()
    }
}

/// Running live device thread.
pub struct LiveFeed {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl LiveFeed {
    /// Start `device` against the engine's live source.
    ///
    /// Fails with `UnsupportedOperation` if the engine is not in live mode.
    pub fn start(engine: SharedEngine, mut device: Box<dyn LiveDevice>) -> Result<Self> {
        let link = engine.lock().live_link().ok_or_else(|| {
            Error::UnsupportedOperation("engine has no live source".to_string())
        })?;
        let mut recorder = Recorder::create(&link.record_path)?;
        let running = Arc::clone(&link.running);

        let handle = std::thread::Builder::new()
            .name("live-feed".to_string())
            .spawn(move || {
                log::info!("Live feed recording to {}", recorder.path.display());
                let mut applied = 0usize;
                let mut emit = |record: &str| {
                    if let Err(e) = recorder.append(record) {
                        log::warn!("Failed to record live entry: {}", e);
                    }
                    if let UpdateOutcome::Applied(_) = engine.lock().update_record(record) {
                        applied += 1;
                    }
                };
                if let Err(e) = device.run(&link.running, &mut emit) {
                    log::error!("Live device stopped: {}", e);
                }
                link.running.store(false, Ordering::Relaxed);
                log::info!("Live feed finished after {} readings", applied);
            })?;

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    /// True while the device thread has not been joined.
    pub fn is_running(&self) -> bool {
        self.handle.is_some() && self.running.load(Ordering::Relaxed)
    }

    /// Signal the device and join its thread.
    ///
    /// Idempotent. Must not be called while holding the engine lock.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log::error!("Live feed thread panicked");
        }
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.stop();
    }
}
