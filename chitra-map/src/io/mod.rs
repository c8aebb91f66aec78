//! File formats.
//!
//! | Module | Format | Direction |
//! |--------|--------|-----------|
//! | `grid_data` | `.gd` static grid text | read and write |
//! | `ppm` | binary PPM snapshot of a [`Frame`](crate::viewport::Frame) | write |

mod grid_data;
mod ppm;

pub use grid_data::{StaticMap, load_grid_data, parse_grid_data, save_grid_data, write_grid_data};
