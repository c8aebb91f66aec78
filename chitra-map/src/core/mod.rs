//! Core types shared by every layer.
//!
//! ## Coordinate Spaces
//!
//! ```text
//! device space                 array space
//!        +y                    (0,0) ───────► x
//!         ▲                      │
//!         │                      │   MID = N / 2
//!  ───────┼───────► +x           ▼
//!         │                      y
//!
//! array_x = MID + device_x
//! array_y = MID - device_y      (y is inverted)
//! ```

mod types;

pub use types::{Cell, Pose, RangeReading, Rect, SENTINEL, UNKNOWN, is_legal_value};

/// Conversion between device space and array space for an N x N grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MidShift {
    size: usize,
}

impl MidShift {
    /// Create the transform for a grid of side `size`.
    pub const fn new(size: usize) -> Self {
        Self { size }
    }

    /// Grid side length.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Array index of the device origin.
    #[inline]
    pub fn mid(&self) -> i32 {
        (self.size / 2) as i32
    }

    /// Device coordinates to array indices, `None` if the shift overflows.
    ///
    /// The result is not bounds-checked; see [`in_bounds`](Self::in_bounds).
    #[inline]
    pub fn to_array(&self, x: i32, y: i32) -> Option<(i32, i32)> {
        Some((self.mid().checked_add(x)?, self.mid().checked_sub(y)?))
    }

    /// Array indices to device coordinates, `None` if the shift overflows.
    #[inline]
    pub fn to_device(&self, x: i32, y: i32) -> Option<(i32, i32)> {
        Some((x.checked_sub(self.mid())?, self.mid().checked_sub(y)?))
    }

    /// Array index for a device coordinate that lies inside the grid.
    #[inline]
    pub fn to_grid_cell(&self, x: i32, y: i32) -> Option<(i32, i32)> {
        self.to_array(x, y).filter(|&(ax, ay)| self.in_bounds(ax, ay))
    }

    /// True if the array index lies in `[0, N)` on both axes.
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.size && (y as usize) < self.size
    }
}
