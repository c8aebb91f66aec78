//! # ChitraMap
//!
//! Occupancy grid viewer core: decodes sonar map updates, applies them to a
//! probability grid with bounded undo/redo, and renders the grid through a
//! zoomable viewport.
//!
//! ## Overview
//!
//! - **Grid Store** ([`grid`]): N x N probabilities, `-1` marking the robot path
//! - **Protocol** ([`protocol`]): two-line text records to readings and back
//! - **Update Engine** ([`engine`]): apply, undo, redo, reset, clear
//! - **Sources** ([`source`]): recorded logs, sonar data, live feeds, UDP
//! - **Viewport** ([`viewport`]): zoom, tracking, dirty regions, rendering
//! - **Static maps** ([`io`]): `.gd` grid data load and save
//! - **Playback** ([`playback`]): timed stepping for the UI or headless runs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chitra_map::engine::{UpdateEngine, UpdateOutcome};
//! use chitra_map::grid::GridStore;
//!
//! let mut engine = UpdateEngine::new(GridStore::new(2000), 160);
//! engine.open_file("run1.cd", None)?;
//! while let UpdateOutcome::Applied(reading) = engine.update()? {
//!     println!("{}", reading);
//! }
//! ```
//!
//! ## Coordinate System
//!
//! Device space has its origin at the grid center with +y up. Array space
//! indexes rows top-down: `array = (MID + x, MID - y)` with `MID = N / 2`.

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod grid;
pub mod io;
pub mod playback;
pub mod protocol;
pub mod source;
pub mod viewport;

pub use core::{Cell, MidShift, Pose, RangeReading, Rect};
pub use engine::{SharedEngine, UpdateEngine, UpdateOutcome};
pub use error::{Error, Result};
pub use grid::{GridStats, GridStore};
