//! Text record encoder.

use std::fmt::Write;

use crate::core::{MidShift, RangeReading};

/// Encode a reading as a two-line protocol record.
///
/// Fill coordinates are converted back to device space and probabilities
/// written with four decimals. The synthetic path cell is omitted since
/// decoding regenerates it from the pose.
pub fn encode_record(reading: &RangeReading, shift: MidShift) -> String {
    let mut out = String::with_capacity(32 + reading.fill.len() * 16);
    let _ = writeln!(
        out,
        "{} {} {} {} {}",
        reading.pose.x, reading.pose.y, reading.pose.theta, reading.device_id, reading.range
    );
    for cell in reading.ordinary_fills() {
        let Some((x, y)) = shift.to_device(cell.x, cell.y) else {
            log::warn!("Dropping fill ({}, {}) with no device coordinate", cell.x, cell.y);
            continue;
        };
        let _ = write!(out, "{} {} {:.4};", x, y, cell.pr);
    }
    out
}
