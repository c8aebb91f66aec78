//! Animation speed steps.

use std::time::Duration;

/// Delay between animation steps in milliseconds, slowest first.
pub const STEP_DELAYS_MS: [u64; 11] = [5000, 4000, 3000, 2000, 1000, 500, 250, 120, 60, 30, 1];

/// Position in [`STEP_DELAYS_MS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackSpeed {
    index: usize,
}

impl PlaybackSpeed {
    /// Speed at `index`, clamped to the table.
    pub fn new(index: usize) -> Self {
        Self {
            index: index.min(STEP_DELAYS_MS.len() - 1),
        }
    }

    /// Table index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// One step faster; saturates at the fastest speed.
    pub fn faster(&mut self) {
        *self = Self::new(self.index + 1);
    }

    /// One step slower; saturates at the slowest speed.
    pub fn slower(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn fastest(&mut self) {
        self.index = STEP_DELAYS_MS.len() - 1;
    }

    pub fn slowest(&mut self) {
        self.index = 0;
    }

    /// Pause between two steps.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(STEP_DELAYS_MS[self.index])
    }
}

impl Default for PlaybackSpeed {
    fn default() -> Self {
        Self::new(STEP_DELAYS_MS.len() - 1)
    }
}
