//! Occupancy probability grid.
//!
//! - [`GridStore`]: fixed-size N x N matrix of `f32` probabilities with
//!   bounds-checked access
//! - [`GridStats`]: cell counts by category
//!
//! Values are either a probability in [0, 1] or the path sentinel (`-1`).
//! Out-of-bounds reads and writes return [`Error::OutOfBounds`]; callers
//! applying protocol input log the error and skip the cell.
//!
//! [`Error::OutOfBounds`]: crate::Error::OutOfBounds

mod storage;

pub use storage::{GridStats, GridStore};
