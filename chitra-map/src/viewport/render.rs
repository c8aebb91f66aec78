//! Grid rendering.
//!
//! [`render`] is a pure function of the grid and viewport state. It paints
//! one clip rectangle of the canvas into an RGBA frame, in this order:
//!
//! 1. white background
//! 2. grid lines (minor every cell, major every [`GRID_LINE_INTERVAL`])
//! 3. cells, inset by one pixel when grid lines are drawn
//! 4. origin axes, two pixels wide
//!
//! Text is not rasterized; axis and value labels are returned as
//! positioned strings for the caller to draw.

use crate::core::{Rect, UNKNOWN};
use crate::grid::GridStore;

use super::Viewport;
use super::color::{AXIS_COLOR, MAJOR_LINE, MINOR_LINE, Rgba, cell_color};

/// Cells between major grid lines.
pub const GRID_LINE_INTERVAL: i32 = 10;

/// Cell size from which cell values are labelled.
pub const CELL_LABEL_MIN_SIZE: i32 = 28;

/// Axis label spacing in cells, keyed by cell size upper bound.
const LABEL_INTERVALS: [(i32, i32); 5] = [(4, 50), (6, 20), (10, 10), (20, 5), (i32::MAX, 2)];

/// Axis label spacing in cells for a cell size.
pub fn label_interval(cell_size: i32) -> i32 {
    LABEL_INTERVALS
        .iter()
        .find(|(below, _)| cell_size < *below)
        .map_or(2, |&(_, interval)| interval)
}

/// What a label annotates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelKind {
    /// Device x coordinate along the horizontal axis
    AxisX,
    /// Device y coordinate along the vertical axis
    AxisY,
    /// Cell probability
    CellValue,
}

/// A string anchored at a canvas pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    /// Anchor x, canvas pixels
    pub x: i32,
    /// Anchor y, canvas pixels
    pub y: i32,
    /// Label text
    pub text: String,
    /// What the label annotates
    pub kind: LabelKind,
}

/// Rendered RGBA8 pixels for a canvas region.
#[derive(Clone, Debug)]
pub struct Frame {
    region: Rect,
    pixels: Vec<u8>,
    labels: Vec<Label>,
}

impl Frame {
    /// White frame covering `region`.
    pub fn new(region: Rect) -> Self {
        Self {
            region,
            pixels: vec![255; byte_len(region)],
            labels: Vec::new(),
        }
    }

    /// Canvas region covered.
    pub fn region(&self) -> Rect {
        self.region
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.region.width.max(0) as usize
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.region.height.max(0) as usize
    }

    /// Row-major RGBA8 data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Labels to draw over the pixels.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// RGBA at a canvas pixel, `None` outside the frame.
    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        if !self.region.contains(x, y) {
            return None;
        }
        let i = self.offset(x, y);
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.pixels[i..i + 4]);
        Some(px)
    }

    fn offset(&self, x: i32, y: i32) -> usize {
        let col = (x - self.region.x) as usize;
        let row = (y - self.region.y) as usize;
        (row * self.width() + col) * 4
    }

    /// Fill a canvas rectangle, clipped to the frame.
    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let Some(area) = rect.intersect(&self.region) else {
            return;
        };
        let [r, g, b] = color.over_white();
        for y in area.y..area.bottom() {
            let start = self.offset(area.x, y);
            let end = start + area.width as usize * 4;
            for px in self.pixels[start..end].chunks_exact_mut(4) {
                px.copy_from_slice(&[r, g, b, 255]);
            }
        }
    }
}

/// RGBA8 buffer size for a region, computed without i32 overflow.
fn byte_len(region: Rect) -> usize {
    region.width.max(0) as usize * region.height.max(0) as usize * 4
}

/// Render `clip` (canvas pixels) of the grid.
pub fn render(grid: &GridStore, viewport: &Viewport, clip: Rect) -> Frame {
    let Some(region) = clip.intersect(&viewport.canvas()) else {
        return Frame::new(Rect::new(clip.x, clip.y, 0, 0));
    };
    let mut frame = Frame::new(region);
    let cs = viewport.cell_size();

    // Cell columns and rows touching the region; rows paint one above.
    let first_col = region.x / cs;
    let last_col = (region.right() - 1) / cs;
    let first_row = region.y / cs + 1;
    let last_row = ((region.bottom() - 1) / cs + 1).min(grid.size() as i32 - 1);

    if viewport.draw_grid {
        draw_grid_lines(&mut frame, cs, (first_col, last_col + 1), (first_row - 1, last_row));
    }

    let inset = i32::from(viewport.draw_grid);
    for cy in first_row..=last_row {
        let Ok(row) = grid.row(cy) else { continue };
        for cx in first_col..=last_col {
            let value = row[cx as usize];
            if value == UNKNOWN {
                continue;
            }
            let x = cx * cs;
            let y = (cy - 1) * cs;
            frame.fill_rect(
                Rect::new(x + inset, y + inset, cs - inset, cs - inset),
                cell_color(value),
            );
            if cs >= CELL_LABEL_MIN_SIZE && value > 0.0 {
                frame.labels.push(Label {
                    x: x + cs / 2,
                    y: y + cs / 2,
                    text: format!("{:.2}", value),
                    kind: LabelKind::CellValue,
                });
            }
        }
    }

    if viewport.draw_axis {
        draw_axes(&mut frame, grid, cs);
    }

    frame
}

/// Lines on cell edges `cols.0..=cols.1` and `rows.0..=rows.1`.
fn draw_grid_lines(frame: &mut Frame, cs: i32, cols: (i32, i32), rows: (i32, i32)) {
    let region = frame.region();
    for col in cols.0..=cols.1 {
        let color = if col % GRID_LINE_INTERVAL == 0 { MAJOR_LINE } else { MINOR_LINE };
        frame.fill_rect(Rect::new(col * cs, region.y, 1, region.height), color);
    }
    for row in rows.0..=rows.1 {
        let color = if row % GRID_LINE_INTERVAL == 0 { MAJOR_LINE } else { MINOR_LINE };
        frame.fill_rect(Rect::new(region.x, row * cs, region.width, 1), color);
    }
}

/// Axes through the array origin, with device-space coordinate labels.
fn draw_axes(frame: &mut Frame, grid: &GridStore, cs: i32) {
    let region = frame.region();
    let mid = grid.mid();
    let axis = mid * cs;
    let step = label_interval(cs) * cs;

    frame.fill_rect(Rect::new(axis, region.y, 2, region.height), AXIS_COLOR);
    frame.fill_rect(Rect::new(region.x, axis, region.width, 2), AXIS_COLOR);

    let labelled_cells = cs >= CELL_LABEL_MIN_SIZE;

    // Y axis: labels left of the line
    if axis + 2 > region.x && axis < region.right() {
        let mut y = region.y.div_euclid(step) * step;
        while y < region.bottom() {
            let cy = y / cs;
            let covered = labelled_cells
                && grid
                    .get(mid - 1, cy + 1)
                    .is_ok_and(|v| v > 0.0 && v != UNKNOWN);
            if cy != mid && !covered {
                frame.labels.push(Label {
                    x: axis - 2,
                    y,
                    text: (mid - cy).to_string(),
                    kind: LabelKind::AxisY,
                });
            }
            y += step;
        }
    }

    // X axis: labels below the line
    if axis + 2 > region.y && axis < region.bottom() {
        let mut x = region.x.div_euclid(step) * step;
        while x < region.right() {
            let cx = x / cs;
            frame.labels.push(Label {
                x,
                y: axis + 2,
                text: (cx - mid).to_string(),
                kind: LabelKind::AxisX,
            });
            x += step;
        }
    }
}
