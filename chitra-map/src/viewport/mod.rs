//! Viewport: visible region, zoom, robot tracking and dirty regions.
//!
//! Pixel space is the full canvas of `grid_size * cell_size` pixels per
//! side. The view is the window onto it that is currently visible.
//!
//! ```text
//!  canvas (0,0)
//!    ┌──────────────────────────────────┐
//!    │        view                      │
//!    │     ┌──────────┐                 │
//!    │     │    +     │  + visual center│
//!    │     └──────────┘                 │
//!    │                                  │
//!    └──────────────────────────────────┘ (N*cs, N*cs)
//! ```
//!
//! Cell `(cx, cy)` is painted at pixel `(cx * cs, (cy - 1) * cs)`, one row
//! above its index, matching the boundary produced by the decoder.

mod color;
mod render;

use crate::config::ViewportSection;
use crate::core::{MidShift, RangeReading, Rect};

pub use color::{
    AXIS_COLOR, BACKGROUND, MAJOR_LINE, MINOR_LINE, PATH_COLOR, Rgba, cell_color,
};
pub use render::{
    CELL_LABEL_MIN_SIZE, Frame, GRID_LINE_INTERVAL, Label, LabelKind, label_interval, render,
};

/// Smallest cell size in pixels.
pub const MIN_CELL_SIZE: i32 = 2;

/// Largest cell size in pixels.
pub const MAX_CELL_SIZE: i32 = 30;

/// Robot tracking recenters every `TRACK_SPAN / cell_size` updates.
const TRACK_SPAN: i32 = 1280;

/// What needs redrawing after a change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repaint {
    /// Nothing changed on screen
    None,
    /// Only this pixel region changed
    Region(Rect),
    /// Redraw the whole view
    Full,
}

impl Repaint {
    /// Combine two repaint requests.
    pub fn merge(self, other: Repaint) -> Repaint {
        match (self, other) {
            (Repaint::Full, _) | (_, Repaint::Full) => Repaint::Full,
            (Repaint::None, r) | (r, Repaint::None) => r,
            (Repaint::Region(a), Repaint::Region(b)) => Repaint::Region(a.union(&b)),
        }
    }
}

/// Viewport state.
#[derive(Clone, Debug)]
pub struct Viewport {
    grid_size: i32,
    cell_size: i32,
    view: Rect,
    /// Draw cell grid lines
    pub draw_grid: bool,
    /// Draw origin axes and labels
    pub draw_axis: bool,
    track_robot: bool,
    robot: Option<(i32, i32)>,
    track_counter: usize,
    drag_start: Option<(i32, i32)>,
}

impl Viewport {
    /// Create a viewport over a `grid_size` grid, scrolled to the top-left.
    pub fn new(grid_size: usize, cell_size: i32, width: i32, height: i32) -> Self {
        Self {
            grid_size: grid_size as i32,
            cell_size: cell_size.clamp(MIN_CELL_SIZE, MAX_CELL_SIZE),
            view: Rect::new(0, 0, width.max(1), height.max(1)),
            draw_grid: true,
            draw_axis: true,
            track_robot: false,
            robot: None,
            track_counter: 0,
            drag_start: None,
        }
    }

    /// Create a viewport from the `[viewport]` config section.
    pub fn from_config(config: &ViewportSection, grid_size: usize) -> Self {
        let mut viewport = Self::new(grid_size, config.cell_size, config.width, config.height);
        viewport.draw_grid = config.draw_grid;
        viewport.draw_axis = config.draw_axis;
        viewport.track_robot = config.track_robot;
        viewport
    }

    /// Cell size in pixels.
    pub fn cell_size(&self) -> i32 {
        self.cell_size
    }

    /// Visible pixel rectangle.
    pub fn view(&self) -> Rect {
        self.view
    }

    /// Grid side length in cells.
    pub fn grid_size(&self) -> usize {
        self.grid_size as usize
    }

    /// Canvas side length in pixels.
    pub fn canvas_extent(&self) -> i32 {
        self.grid_size * self.cell_size
    }

    /// Full canvas rectangle.
    pub fn canvas(&self) -> Rect {
        let extent = self.canvas_extent();
        Rect::new(0, 0, extent, extent)
    }

    /// Change the visible window size.
    pub fn resize(&mut self, width: i32, height: i32) {
        self.view.width = width.max(1);
        self.view.height = height.max(1);
        self.scroll_to(self.view.x, self.view.y);
    }

    // ========================================================================
    // Scrolling
    // ========================================================================

    /// Move the view's top-left corner, clamped to the canvas.
    pub fn scroll_to(&mut self, x: i32, y: i32) {
        let extent = self.canvas_extent();
        let max_x = (extent - self.view.width).max(0);
        let max_y = (extent - self.view.height).max(0);
        self.view.x = x.clamp(0, max_x);
        self.view.y = y.clamp(0, max_y);
    }

    /// Center the view on a canvas pixel (e.g. a mouse click).
    pub fn scroll_to_point_center(&mut self, x: i32, y: i32) {
        self.scroll_to(x - self.view.width / 2, y - self.view.height / 2);
    }

    /// Center the view on an array-space cell.
    pub fn scroll_to_cell(&mut self, cx: i32, cy: i32) {
        let half = self.cell_size / 2;
        self.scroll_to_point_center(cx * self.cell_size + half, (cy - 1) * self.cell_size + half);
    }

    /// Center the view on the array origin (device `(0, 0)`).
    pub fn scroll_to_origin(&mut self) {
        let mid = self.grid_size / 2;
        self.scroll_to_cell(mid, mid);
    }

    /// Center the view on a static map region.
    pub fn scroll_to_map_center(&mut self, region: Rect) {
        self.scroll_to_cell(
            region.x + region.width / 2,
            region.y + region.height / 2,
        );
    }

    /// Center the view on the last robot position, if known.
    pub fn scroll_to_robot(&mut self) {
        if let Some((x, y)) = self.robot {
            self.scroll_to_cell(x, y);
        }
    }

    /// Grid-space coordinate at the center of the view.
    pub fn visual_center(&self) -> (f64, f64) {
        let cs = f64::from(self.cell_size);
        (
            f64::from(self.view.x + self.view.width / 2) / cs,
            f64::from(self.view.y + self.view.height / 2) / cs,
        )
    }

    /// Array-space cell painted at a canvas pixel.
    pub fn cell_at(&self, x: i32, y: i32) -> (i32, i32) {
        (x / self.cell_size, y / self.cell_size + 1)
    }

    // ========================================================================
    // Zoom
    // ========================================================================

    /// Set the cell size, keeping the visual center fixed in grid space.
    pub fn zoom_to(&mut self, size: i32) -> Repaint {
        let size = size.clamp(MIN_CELL_SIZE, MAX_CELL_SIZE);
        if size == self.cell_size {
            return Repaint::None;
        }

        let (gx, gy) = self.visual_center();
        self.cell_size = size;
        let cs = f64::from(size);
        self.scroll_to_point_center((gx * cs).round() as i32, (gy * cs).round() as i32);
        log::debug!("Zoomed to {} px cells", size);
        Repaint::Full
    }

    /// Zoom in one pixel per cell.
    pub fn zoom_in(&mut self) -> Repaint {
        self.zoom_to(self.cell_size + 1)
    }

    /// Zoom out one pixel per cell.
    pub fn zoom_out(&mut self) -> Repaint {
        self.zoom_to(self.cell_size - 1)
    }

    /// Zoom to the largest cell size.
    pub fn zoom_in_max(&mut self) -> Repaint {
        self.zoom_to(MAX_CELL_SIZE)
    }

    /// Zoom to the smallest cell size.
    pub fn zoom_out_max(&mut self) -> Repaint {
        self.zoom_to(MIN_CELL_SIZE)
    }

    // ========================================================================
    // Updates
    // ========================================================================

    /// Enable or disable robot tracking.
    pub fn set_track_robot(&mut self, track: bool) {
        self.track_robot = track;
        self.track_counter = 0;
    }

    /// Is robot tracking enabled?
    pub fn track_robot(&self) -> bool {
        self.track_robot
    }

    /// Last known robot cell (array space).
    pub fn robot(&self) -> Option<(i32, i32)> {
        self.robot
    }

    /// Forget the robot position and tracking counter.
    pub fn reset_tracking(&mut self) {
        self.robot = None;
        self.track_counter = 0;
    }

    /// Updates between tracking recenters at the current zoom.
    pub fn track_interval(&self) -> usize {
        (TRACK_SPAN / self.cell_size).max(1) as usize
    }

    /// Pixel region to redraw for a grid-space boundary.
    ///
    /// Grows by one cell on every side and is clipped to the canvas.
    pub fn dirty_rect(&self, boundary: Rect) -> Option<Rect> {
        let cs = self.cell_size;
        let pixels = Rect::new(
            (boundary.x - 1) * cs,
            (boundary.y - 1) * cs,
            (boundary.width + 2) * cs,
            (boundary.height + 2) * cs,
        );
        pixels.intersect(&self.canvas())
    }

    /// Repaint needed after `reading` was applied.
    ///
    /// Records the robot position and, when tracking, recenters on it every
    /// [`track_interval`](Self::track_interval) updates.
    pub fn on_reading(&mut self, reading: &RangeReading, shift: MidShift) -> Repaint {
        if let Some(cell) = shift.to_grid_cell(reading.pose.x, reading.pose.y) {
            self.robot = Some(cell);
        }

        if self.track_robot {
            let count = self.track_counter;
            self.track_counter += 1;
            if count % self.track_interval() == 0 {
                self.scroll_to_robot();
                return Repaint::Full;
            }
        }

        match reading.boundary.and_then(|b| self.dirty_rect(b)) {
            Some(rect) => Repaint::Region(rect),
            None => Repaint::None,
        }
    }

    // ========================================================================
    // Drag panning
    // ========================================================================

    /// Start dragging at a canvas pixel.
    pub fn begin_drag(&mut self, x: i32, y: i32) {
        self.drag_start = Some((x, y));
    }

    /// Continue a drag to a canvas pixel.
    ///
    /// The view moves by the distance from the drag start. With `lock_axis`
    /// only the dominant direction moves. Returns true if the view moved.
    pub fn drag_to(&mut self, x: i32, y: i32, lock_axis: bool) -> bool {
        let Some((start_x, start_y)) = self.drag_start else {
            return false;
        };

        let mut dx = start_x - x;
        let mut dy = start_y - y;
        if lock_axis {
            if dx.abs() > dy.abs() {
                dy = 0;
            } else {
                dx = 0;
            }
        }

        let before = (self.view.x, self.view.y);
        self.scroll_to(self.view.x + dx, self.view.y + dy);
        self.drag_start = Some((x + dx, y + dy));
        before != (self.view.x, self.view.y)
    }

    /// Finish dragging.
    pub fn end_drag(&mut self) {
        self.drag_start = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Pose;

    fn viewport() -> Viewport {
        let mut viewport = Viewport::new(2000, 4, 800, 600);
        viewport.scroll_to_origin();
        viewport
    }

    #[test]
    fn test_zoom_clamps() {
        let mut viewport = viewport();
        viewport.zoom_to(100);
        assert_eq!(viewport.cell_size(), MAX_CELL_SIZE);
        viewport.zoom_to(0);
        assert_eq!(viewport.cell_size(), MIN_CELL_SIZE);
        assert_eq!(viewport.zoom_out(), Repaint::None);
    }

    #[test]
    fn test_zoom_preserves_focal_point() {
        let mut viewport = viewport();
        viewport.scroll_to(3000, 2500);
        let (gx, gy) = viewport.visual_center();

        viewport.zoom_to(10);
        let (zx, zy) = viewport.visual_center();
        assert!((zx - gx).abs() <= 1.0 && (zy - gy).abs() <= 1.0);

        viewport.zoom_to(4);
        let (bx, by) = viewport.visual_center();
        assert!((bx - gx).abs() <= 1.0 && (by - gy).abs() <= 1.0);
    }

    #[test]
    fn test_scroll_clamped_to_canvas() {
        let mut viewport = Viewport::new(500, 4, 800, 600);
        viewport.scroll_to(-50, 10_000);
        assert_eq!((viewport.view().x, viewport.view().y), (0, 1400));

        // canvas smaller than the view pins to the origin
        let mut small = Viewport::new(50, 2, 800, 600);
        small.scroll_to(30, 30);
        assert_eq!((small.view().x, small.view().y), (0, 0));
    }

    #[test]
    fn test_dirty_rect_grows_and_clips() {
        let viewport = viewport();
        assert_eq!(
            viewport.dirty_rect(Rect::new(10, 20, 3, 2)),
            Some(Rect::new(36, 76, 20, 16))
        );
        assert_eq!(
            viewport.dirty_rect(Rect::new(0, 0, 1, 1)),
            Some(Rect::new(0, 0, 8, 8))
        );
        assert_eq!(viewport.dirty_rect(Rect::new(5000, 5000, 1, 1)), None);
    }

    #[test]
    fn test_tracking_interval() {
        let mut viewport = viewport();
        viewport.set_track_robot(true);
        assert_eq!(viewport.track_interval(), 320);

        let shift = MidShift::new(2000);
        let reading = RangeReading {
            pose: Pose::new(100, 0, 0),
            boundary: Some(Rect::cell(1100, 999)),
            ..Default::default()
        };
        // first update recenters, the next 319 only repaint their region
        assert_eq!(viewport.on_reading(&reading, shift), Repaint::Full);
        assert_eq!(viewport.robot(), Some((1100, 1000)));
        for _ in 1..320 {
            assert!(matches!(
                viewport.on_reading(&reading, shift),
                Repaint::Region(_)
            ));
        }
        assert_eq!(viewport.on_reading(&reading, shift), Repaint::Full);

        viewport.zoom_to(30);
        assert_eq!(viewport.track_interval(), 42);
    }

    #[test]
    fn test_tracking_centers_robot() {
        let mut viewport = viewport();
        viewport.set_track_robot(true);
        let reading = RangeReading {
            pose: Pose::new(100, 50, 0),
            ..Default::default()
        };
        viewport.on_reading(&reading, MidShift::new(2000));
        let (cx, cy) = viewport.visual_center();
        assert!((cx - 1100.0).abs() <= 1.0);
        assert!((cy - 949.0).abs() <= 1.0);
    }

    #[test]
    fn test_drag_moves_view_and_keeps_start() {
        let mut viewport = viewport();
        let origin = viewport.view();

        viewport.begin_drag(500, 500);
        assert!(viewport.drag_to(480, 470, false));
        assert_eq!(viewport.view().x, origin.x + 20);
        assert_eq!(viewport.view().y, origin.y + 30);

        // pointer continues from the new canvas position; no further motion
        assert!(!viewport.drag_to(500, 500, false));
        viewport.end_drag();
        assert!(!viewport.drag_to(0, 0, false));
    }

    #[test]
    fn test_drag_axis_lock() {
        let mut viewport = viewport();
        let origin = viewport.view();
        viewport.begin_drag(500, 500);
        viewport.drag_to(490, 470, true);
        assert_eq!(viewport.view().x, origin.x);
        assert_eq!(viewport.view().y, origin.y + 30);
    }

    #[test]
    fn test_repaint_merge() {
        let a = Repaint::Region(Rect::new(0, 0, 4, 4));
        let b = Repaint::Region(Rect::new(8, 8, 4, 4));
        assert_eq!(a.merge(b), Repaint::Region(Rect::new(0, 0, 12, 12)));
        assert_eq!(a.merge(Repaint::None), a);
        assert_eq!(Repaint::None.merge(Repaint::Full), Repaint::Full);
    }
}
