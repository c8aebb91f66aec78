//! Cell color mapping.
//!
//! | Value | Color |
//! |-------|-------|
//! | sentinel | blue (robot path) |
//! | v > 0.95 | `(1-v, 1-v, 1-v)`, opaque |
//! | 0.7 < v <= 0.95 | `(1.7-v, 0, 0)`, alpha v |
//! | v != 0.5 | `(v/2, 1-v, 0)`, alpha v |
//! | 0.5 | white (unknown) |
//!
//! Translucent colors are composited over the white background.

use crate::core::UNKNOWN;

/// Floating-point RGBA color, channels in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Opacity, 1.0 is opaque
    pub a: f32,
}

impl Rgba {
    /// Create a new color.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque gray.
    pub const fn gray(level: f32) -> Self {
        Self::new(level, level, level, 1.0)
    }

    /// Composite over white and quantize to 8 bits per channel.
    pub fn over_white(self) -> [u8; 3] {
        let a = self.a.clamp(0.0, 1.0);
        let blend = |c: f32| {
            let v = c.clamp(0.0, 1.0) * a + (1.0 - a);
            (v * 255.0).round() as u8
        };
        [blend(self.r), blend(self.g), blend(self.b)]
    }
}

/// Robot path cells.
pub const PATH_COLOR: Rgba = Rgba::new(0.0, 0.0, 1.0, 1.0);

/// Background and unknown cells.
pub const BACKGROUND: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

/// Minor grid lines (every cell).
pub const MINOR_LINE: Rgba = Rgba::gray(0.9);

/// Major grid lines (every ten cells).
pub const MAJOR_LINE: Rgba = Rgba::gray(0.75);

/// Axis lines and labels.
pub const AXIS_COLOR: Rgba = Rgba::gray(0.0);

/// Map a cell value to its display color.
pub fn cell_color(value: f32) -> Rgba {
    if value < 0.0 {
        PATH_COLOR
    } else if value > 0.95 {
        Rgba::gray(1.0 - value)
    } else if value > 0.7 {
        Rgba::new(1.7 - value, 0.0, 0.0, value)
    } else if value != UNKNOWN {
        Rgba::new(value / 2.0, 1.0 - value, 0.0, value)
    } else {
        BACKGROUND
    }
}
