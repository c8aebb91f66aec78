//! Headless timed playback.

use std::thread;

use crate::error::Result;
use crate::viewport::Repaint;

use super::speed::PlaybackSpeed;
use super::view::{MapView, ViewMode};

/// Totals for one [`Player::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackSummary {
    /// Steps taken
    pub steps: usize,
    /// Readings applied at the end of the run
    pub applied: usize,
    /// Steps that produced a repaint
    pub repaints: usize,
    /// True if the run stopped because the data ran out or the server quit
    pub finished: bool,
}

/// Steps a [`MapView`] on a timer.
pub struct Player;

impl Player {
    /// Step `view` every `speed.delay()` until the source is exhausted, the
    /// server shuts down, a live feed stops, or `max_steps` is reached.
    pub fn run(
        view: &mut MapView,
        speed: PlaybackSpeed,
        max_steps: Option<usize>,
    ) -> Result<PlaybackSummary> {
        let mut summary = PlaybackSummary::default();
        if view.mode() == ViewMode::Static {
            summary.applied = view.applied();
            summary.finished = true;
            return Ok(summary);
        }

        log::info!(
            "Playing {:?} source at {} ms per step",
            view.mode(),
            speed.delay().as_millis()
        );

        while max_steps.is_none_or(|max| summary.steps < max) {
            if summary.steps > 0 {
                thread::sleep(speed.delay());
            }
            // sampled before the step drains events
            let feed_stopped = view.mode() == ViewMode::Live && !view.is_live();
            let repaint = view.step()?;
            summary.steps += 1;
            if repaint != Repaint::None {
                summary.repaints += 1;
            }

            if view.needs_reset() || view.is_shutdown() || feed_stopped {
                summary.finished = true;
                break;
            }
        }

        summary.applied = view.applied();
        log::info!(
            "Playback stopped after {} steps ({} readings applied)",
            summary.steps,
            summary.applied
        );
        Ok(summary)
    }
}
