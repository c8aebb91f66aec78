//! Grid update engine.
//!
//! The engine exclusively owns the [`GridStore`](crate::grid::GridStore)
//! and the undo/redo history. Everything that changes a cell goes through
//! it.
//!
//! # Step
//!
//! ```text
//! update()
//!   ├── redo stack non-empty ──▶ replay popped reading
//!   └── source.step()
//!         ├── Record(text) ──▶ decode ──▶ apply (clears redo)
//!         ├── Idle ──────────▶ Skipped
//!         ├── Pending ───────▶ Waiting
//!         ├── Exhausted ─────▶ Exhausted
//!         └── Quit ──────────▶ Shutdown
//!
//! apply(reading)
//!   1. drop out-of-grid or illegal fills (logged)
//!   2. snapshot every remaining cell into an UndoEntry
//!   3. write fills; ordinary values never overwrite a path cell
//!   4. push the UndoEntry (oldest dropped past capacity)
//!   5. notify the observer
//! ```
//!
//! # Sharing
//!
//! A live feed applies readings from its own thread, so the engine is
//! shared as a [`SharedEngine`]. Holding the lock across one `update`,
//! `undo` or `clear` call is the only mutation boundary.

mod history;
mod observer;
mod update;

use std::sync::Arc;

use parking_lot::Mutex;

pub use history::{History, MAX_UNDO_HISTORY, UndoEntry};
pub use observer::{ChangeEvent, ChangeObserver, ChannelObserver};
pub use update::{UpdateEngine, UpdateOutcome};

/// Engine handle shared between the playback driver and live feeds.
pub type SharedEngine = Arc<Mutex<UpdateEngine>>;

impl UpdateEngine {
    /// Wrap the engine for sharing across threads.
    pub fn into_shared(self) -> SharedEngine {
        Arc::new(Mutex::new(self))
    }
}
