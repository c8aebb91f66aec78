//! Cells, poses, rectangles and decoded readings.

use std::fmt;

/// Cell value marking the robot's traversed path.
///
/// Ordinary probability fills never overwrite a cell holding this value.
pub const SENTINEL: f32 = -1.0;

/// Probability of a cell nothing is known about.
pub const UNKNOWN: f32 = 0.5;

/// Returns true if `value` may be stored in a grid cell.
#[inline]
pub fn is_legal_value(value: f32) -> bool {
    value == SENTINEL || (0.0..=1.0).contains(&value)
}

/// An array-space coordinate plus a value (probability or sentinel).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    /// Column index
    pub x: i32,
    /// Row index
    pub y: i32,
    /// Probability in [0, 1] or [`SENTINEL`]
    pub pr: f32,
}

impl Cell {
    /// Create a new cell.
    #[inline]
    pub const fn new(x: i32, y: i32, pr: f32) -> Self {
        Self { x, y, pr }
    }

    /// Create a robot path cell.
    #[inline]
    pub const fn path(x: i32, y: i32) -> Self {
        Self::new(x, y, SENTINEL)
    }

    /// Is this a path (sentinel) cell?
    #[inline]
    pub fn is_path(&self) -> bool {
        self.pr == SENTINEL
    }
}

/// Robot pose in device space (origin at the grid's logical center).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pose {
    /// X position in cells
    pub x: i32,
    /// Y position in cells (positive up)
    pub y: i32,
    /// Heading in degrees
    pub theta: i32,
}

impl Pose {
    /// Create a new pose.
    pub const fn new(x: i32, y: i32, theta: i32) -> Self {
        Self { x, y, theta }
    }
}

/// Axis-aligned integer rectangle, `[x, x + width) x [y, y + height)`.
///
/// Used both for grid-space boundaries (cells) and pixel-space regions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A 1x1 rectangle covering a single cell.
    #[inline]
    pub const fn cell(x: i32, y: i32) -> Self {
        Self::new(x, y, 1, 1)
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// True if the rectangle covers no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// True if the point lies inside.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Grow to cover the cell at (x, y).
    pub fn include(&mut self, x: i32, y: i32) {
        let left = self.x.min(x);
        let top = self.y.min(y);
        let right = self.right().max(x + 1);
        let bottom = self.bottom().max(y + 1);
        *self = Self::new(left, top, right - left, bottom - top);
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let left = self.x.min(other.x);
        let top = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }

    /// Overlapping area, or `None` if the rectangles are disjoint.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right > left && bottom > top {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }
}

/// One decoded protocol record.
///
/// `pose` is in device space; `fill` and `boundary` are in array space so
/// they can be applied to the grid directly. When the pose lies inside the
/// grid, the last fill entry is the robot's own path cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RangeReading {
    /// Sonar (or logged object) number
    pub device_id: i32,
    /// Range reported by the device
    pub range: i32,
    /// Robot pose (device space)
    pub pose: Pose,
    /// Cell updates, in application order
    pub fill: Vec<Cell>,
    /// Array-space area touched by `fill`, `None` when nothing was touched
    pub boundary: Option<Rect>,
}

impl RangeReading {
    /// The trailing robot path cell, if the pose was inside the grid.
    pub fn path_cell(&self) -> Option<&Cell> {
        self.fill.last().filter(|c| c.is_path())
    }

    /// Fill entries other than the trailing path cell.
    pub fn ordinary_fills(&self) -> &[Cell] {
        match self.path_cell() {
            Some(_) => &self.fill[..self.fill.len() - 1],
            None => &self.fill,
        }
    }
}

impl fmt::Display for RangeReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pose ({}, {}, {}) sonar {} range {} cells {}",
            self.pose.x,
            self.pose.y,
            self.pose.theta,
            self.device_id,
            self.range,
            self.fill.len()
        )
    }
}
