//! Map view driver: engine steps in, repaint requests out.

use std::sync::atomic::Ordering;

use crossbeam_channel::Receiver;

use crate::core::Rect;
use crate::engine::{ChangeEvent, ChannelObserver, SharedEngine, UpdateOutcome};
use crate::error::Result;
use crate::source::DataSource;
use crate::viewport::{Frame, Repaint, Viewport, render};

/// How the view is being fed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    /// A loaded `.gd` map; nothing to step
    Static,
    /// Recorded or networked playback driven by [`MapView::step`]
    Animated,
    /// Readings arrive from a live feed thread
    Live,
}

impl ViewMode {
    /// Mode for an engine's data source.
    pub fn for_source(source: DataSource) -> Self {
        match source {
            DataSource::Static => ViewMode::Static,
            DataSource::Live => ViewMode::Live,
            DataSource::None | DataSource::Recorded | DataSource::Network => ViewMode::Animated,
        }
    }
}

/// Drives an engine and translates its changes into viewport repaints.
///
/// The view registers itself as the engine's change observer, so repaints
/// for readings applied by a live feed thread show up on the next call.
pub struct MapView {
    engine: SharedEngine,
    viewport: Viewport,
    mode: ViewMode,
    events: Receiver<ChangeEvent>,
    needs_reset: bool,
    shutdown: bool,
    applied: usize,
}

impl MapView {
    /// Attach a view to `engine`, centered on the static region in static
    /// mode and on the array origin otherwise.
    pub fn new(engine: SharedEngine, viewport: Viewport) -> Self {
        let (observer, events) = ChannelObserver::new();
        let (mode, region) = {
            let mut guard = engine.lock();
            guard.set_observer(observer);
            (ViewMode::for_source(guard.data_source()), guard.dimension())
        };

        let mut view = Self {
            engine,
            viewport,
            mode,
            events,
            needs_reset: false,
            shutdown: false,
            applied: 0,
        };
        view.recenter(region);
        view
    }

    fn recenter(&mut self, region: Option<Rect>) {
        match (self.mode, region) {
            (ViewMode::Static, Some(region)) => self.viewport.scroll_to_map_center(region),
            _ => self.viewport.scroll_to_origin(),
        }
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Advance one step and report what must be repainted.
    ///
    /// After the source reported exhaustion the map is reset before stepping.
    pub fn step(&mut self) -> Result<Repaint> {
        if self.mode == ViewMode::Static {
            return Ok(self.drain());
        }

        let mut repaint = Repaint::None;
        if self.needs_reset {
            repaint = self.reset()?;
        }

        let outcome = self.engine.lock().update()?;
        self.note_outcome(&outcome);
        Ok(repaint.merge(self.drain()))
    }

    /// Apply every pending reading, then request a single full repaint.
    ///
    /// Runs until the source is exhausted, shuts down, or has nothing ready
    /// before its read timeout.
    pub fn build_all(&mut self) -> Result<Repaint> {
        if self.mode != ViewMode::Animated {
            return Ok(self.drain());
        }
        if self.needs_reset {
            self.reset()?;
        }

        loop {
            let outcome = self.engine.lock().update()?;
            self.note_outcome(&outcome);
            // keeps the robot position current without queuing repaints
            self.drain();
            if outcome.is_terminal() || outcome == UpdateOutcome::Waiting {
                break;
            }
        }
        log::info!("Built map from {} readings", self.applied);
        Ok(Repaint::Full)
    }

    fn note_outcome(&mut self, outcome: &UpdateOutcome) {
        match outcome {
            UpdateOutcome::Exhausted => {
                if !self.needs_reset {
                    log::info!("End of data after {} readings", self.applied);
                }
                self.needs_reset = true;
            }
            UpdateOutcome::Shutdown => {
                log::info!("Server requested shutdown");
                self.shutdown = true;
            }
            UpdateOutcome::Applied(_) | UpdateOutcome::Skipped | UpdateOutcome::Waiting => {}
        }
    }

    /// Revert the last reading.
    pub fn undo(&mut self) -> Repaint {
        if self.engine.lock().undo().is_some() {
            self.needs_reset = false;
        }
        self.drain()
    }

    /// Re-apply the last undone reading.
    pub fn redo(&mut self) -> Repaint {
        self.engine.lock().redo();
        self.drain()
    }

    /// Clear the grid, keeping the source position.
    pub fn clear(&mut self) -> Repaint {
        self.engine.lock().clear();
        self.drain()
    }

    /// Rewind the source and start over.
    pub fn reset(&mut self) -> Result<Repaint> {
        let region = {
            let mut engine = self.engine.lock();
            engine.reset()?;
            engine.dimension()
        };
        self.needs_reset = false;
        self.shutdown = false;
        self.applied = 0;
        self.viewport.reset_tracking();
        self.recenter(region);
        Ok(self.drain())
    }

    /// Fold queued change events into one repaint request.
    fn drain(&mut self) -> Repaint {
        let shift = self.engine.lock().grid().shift();
        let mut repaint = Repaint::None;
        for event in self.events.try_iter() {
            let next = match &event {
                ChangeEvent::Applied(reading) => {
                    self.applied += 1;
                    self.viewport.on_reading(reading, shift)
                }
                ChangeEvent::Undone(reading) => {
                    self.applied = self.applied.saturating_sub(1);
                    match reading.boundary.and_then(|b| self.viewport.dirty_rect(b)) {
                        Some(rect) => Repaint::Region(rect),
                        None => Repaint::None,
                    }
                }
                ChangeEvent::Cleared | ChangeEvent::Reset => Repaint::Full,
            };
            repaint = repaint.merge(next);
        }
        repaint
    }

    // ========================================================================
    // State
    // ========================================================================

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// True once the source is exhausted and the next step will reset.
    pub fn needs_reset(&self) -> bool {
        self.needs_reset
    }

    /// True once the server asked the session to end.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown
    }

    /// True when a live feed is still delivering readings.
    pub fn is_live(&self) -> bool {
        self.engine
            .lock()
            .live_link()
            .is_some_and(|link| link.running.load(Ordering::Relaxed))
    }

    /// Readings currently applied since the last reset.
    pub fn applied(&self) -> usize {
        self.applied
    }

    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Render a canvas region.
    pub fn render(&self, clip: Rect) -> Frame {
        render(self.engine.lock().grid(), &self.viewport, clip)
    }

    /// Render the visible window.
    pub fn snapshot(&self) -> Frame {
        self.render(self.viewport.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::UpdateEngine;
    use crate::grid::GridStore;
    use crate::source::{DeviceSource, RangeDevice, SourceStep};

    /// Replays records, rewinding on reset.
    struct Records {
        records: Vec<&'static str>,
        next: usize,
    }

    impl DeviceSource for Records {
        fn data_source(&self) -> DataSource {
            DataSource::Recorded
        }

        fn range_device(&self) -> RangeDevice {
            RangeDevice::Log
        }

        fn step(&mut self) -> Result<SourceStep> {
            let step = match self.records.get(self.next) {
                Some(record) => SourceStep::Record(record.to_string()),
                None => SourceStep::Exhausted,
            };
            self.next += 1;
            Ok(step)
        }

        fn reset(&mut self) -> Result<()> {
            self.next = 0;
            Ok(())
        }

        fn close(&mut self) {}
    }

    fn view(records: Vec<&'static str>) -> MapView {
        let mut engine = UpdateEngine::new(GridStore::new(100), 160);
        engine.attach_source(Box::new(Records { records, next: 0 }));
        let mut viewport = Viewport::new(100, 4, 200, 200);
        viewport.draw_axis = false;
        MapView::new(engine.into_shared(), viewport)
    }

    #[test]
    fn test_animated_mode_centers_on_origin() {
        let view = view(vec![]);
        assert_eq!(view.mode(), ViewMode::Animated);
        // cell (50, 50) center is pixel (202, 198)
        assert_eq!(view.viewport().view(), Rect::new(102, 98, 200, 200));
    }

    #[test]
    fn test_step_repaints_touched_region() {
        let mut view = view(vec!["0 0 0 0 0\n1 1 0.2"]);
        let repaint = view.step().unwrap();
        // fill (51, 49) and path (50, 50); boundary (50, 48, 2, 2)
        assert_eq!(repaint, Repaint::Region(Rect::new(196, 188, 16, 16)));
        assert_eq!(view.applied(), 1);
    }

    #[test]
    fn test_exhaustion_resets_on_next_step() {
        let mut view = view(vec!["0 0 0 0 0\n1 1 0.2"]);
        view.step().unwrap();
        view.step().unwrap();
        assert!(view.needs_reset());

        // reset then replay the first reading
        let repaint = view.step().unwrap();
        assert_eq!(repaint, Repaint::Full);
        assert!(!view.needs_reset());
        assert_eq!(view.applied(), 1);
        assert_eq!(view.engine().lock().undo_depth(), 1);
    }

    #[test]
    fn test_build_all_single_full_repaint() {
        let mut view = view(vec!["0 0 0 0 0\n1 1 0.2", "0 0 1 0 0\n2 2 0.3"]);
        assert_eq!(view.build_all().unwrap(), Repaint::Full);
        assert_eq!(view.applied(), 2);
        assert!(view.needs_reset());
        assert_eq!(view.step().unwrap(), Repaint::Full);
    }

    #[test]
    fn test_undo_repaints_boundary_and_cancels_reset() {
        let mut view = view(vec!["0 0 0 0 0\n1 1 0.2"]);
        view.step().unwrap();
        view.step().unwrap();
        assert!(view.needs_reset());

        let repaint = view.undo();
        assert_eq!(repaint, Repaint::Region(Rect::new(196, 188, 16, 16)));
        assert!(!view.needs_reset());
        assert_eq!(view.engine().lock().cell_value(51, 49).unwrap(), 0.5);

        // next step replays from redo instead of resetting
        assert!(matches!(view.step().unwrap(), Repaint::Region(_)));
        assert_eq!(view.engine().lock().cell_value(51, 49).unwrap(), 0.2);
    }

    #[test]
    fn test_clear_repaints_fully() {
        let mut view = view(vec!["0 0 0 0 0\n1 1 0.2"]);
        view.step().unwrap();
        assert_eq!(view.clear(), Repaint::Full);
        assert_eq!(view.engine().lock().grid_stats().known(), 0);
    }

    #[test]
    fn test_no_source_exhausts_then_reset_fails() {
        let engine = UpdateEngine::new(GridStore::new(100), 160).into_shared();
        let mut view = MapView::new(engine, Viewport::new(100, 4, 200, 200));
        assert_eq!(view.mode(), ViewMode::Animated);
        view.step().unwrap();
        assert!(view.needs_reset());
        assert!(view.step().is_err());
    }
}
