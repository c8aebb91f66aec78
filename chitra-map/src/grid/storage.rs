//! Grid storage core implementation.

use serde::{Deserialize, Serialize};

use crate::core::{MidShift, Rect, SENTINEL, UNKNOWN, is_legal_value};
use crate::error::{Error, Result};

/// Square matrix of occupancy probabilities.
///
/// Cells are stored row-major (`index = y * size + x`). Every cell holds
/// either a probability in [0, 1] or [`SENTINEL`].
#[derive(Clone, Debug)]
pub struct GridStore {
    cells: Vec<f32>,
    size: usize,
}

impl GridStore {
    /// Default grid side length.
    pub const DEFAULT_SIZE: usize = 2000;

    /// Create a grid of `size` x `size` unknown cells.
    pub fn new(size: usize) -> Self {
        Self {
            cells: vec![UNKNOWN; size * size],
            size,
        }
    }

    /// Grid side length.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Array index of the device-space origin.
    #[inline]
    pub fn mid(&self) -> i32 {
        self.shift().mid()
    }

    /// Device/array transform for this grid.
    #[inline]
    pub fn shift(&self) -> MidShift {
        MidShift::new(self.size)
    }

    /// Check if array coordinates are within bounds.
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.shift().in_bounds(x, y)
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Result<usize> {
        if self.in_bounds(x, y) {
            Ok(y as usize * self.size + x as usize)
        } else {
            Err(Error::OutOfBounds {
                x,
                y,
                size: self.size,
            })
        }
    }

    /// Read a cell.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Result<f32> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Write a cell. Rejects values that are neither probabilities nor the sentinel.
    pub fn set(&mut self, x: i32, y: i32, value: f32) -> Result<()> {
        let i = self.index(x, y)?;
        if !is_legal_value(value) {
            return Err(Error::InvalidCellValue { x, y, value });
        }
        self.cells[i] = value;
        Ok(())
    }

    /// Reset every cell to unknown.
    ///
    /// Undo history lives with the update engine, which discards it
    /// alongside this call.
    pub fn clear(&mut self) {
        self.cells.fill(UNKNOWN);
    }

    /// Reallocate as a `size` x `size` grid of unknown cells.
    pub fn reinit(&mut self, size: usize) {
        self.size = size;
        self.cells = vec![UNKNOWN; size * size];
    }

    /// One row of cells.
    pub fn row(&self, y: i32) -> Result<&[f32]> {
        let start = self.index(0, y)?;
        Ok(&self.cells[start..start + self.size])
    }

    /// Count cells by category.
    pub fn stats(&self) -> GridStats {
        let mut stats = GridStats::default();
        for &value in &self.cells {
            if value == SENTINEL {
                stats.path += 1;
            } else if value == UNKNOWN {
                stats.unknown += 1;
            } else if value > UNKNOWN {
                stats.occupied += 1;
            } else {
                stats.free += 1;
            }
        }
        stats
    }

    /// Bounding box of every cell that is not unknown.
    pub fn known_bounds(&self) -> Option<Rect> {
        let mut bounds: Option<Rect> = None;
        for (i, &value) in self.cells.iter().enumerate() {
            if value == UNKNOWN {
                continue;
            }
            let x = (i % self.size) as i32;
            let y = (i / self.size) as i32;
            match bounds.as_mut() {
                Some(rect) => rect.include(x, y),
                None => bounds = Some(Rect::cell(x, y)),
            }
        }
        bounds
    }
}

impl Default for GridStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE)
    }
}

/// Cell counts by category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridStats {
    /// Cells at exactly 0.5
    pub unknown: usize,
    /// Cells below 0.5
    pub free: usize,
    /// Cells above 0.5
    pub occupied: usize,
    /// Robot path cells
    pub path: usize,
}

impl GridStats {
    /// Cells that have been observed.
    pub fn known(&self) -> usize {
        self.free + self.occupied + self.path
    }

    /// Total cells.
    pub fn total(&self) -> usize {
        self.unknown + self.known()
    }
}
