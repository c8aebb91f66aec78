//! Text record decoder.

use crate::core::{Cell, MidShift, Pose, RangeReading, Rect, is_legal_value};
use crate::error::{Error, Result};

/// Decode one update record.
///
/// Returns `Ok(None)` for empty input and `Err(MalformedRecord)` when the
/// record cannot be parsed. Fill tokens that fall outside the grid (or whose
/// value is not a legal cell value) are skipped. When the pose itself is
/// outside the grid the reading carries its metadata but no fill and no
/// boundary.
pub fn decode(input: &str, shift: MidShift) -> Result<Option<RangeReading>> {
    if input.trim().is_empty() {
        return Ok(None);
    }

    let segments = split_segments(input);
    if segments.is_empty() || segments.len() > 2 {
        return Err(Error::MalformedRecord(format!(
            "expected 1 or 2 lines, found {}",
            segments.len()
        )));
    }

    let header = parse_header(segments[0])?;
    let mut reading = RangeReading {
        device_id: header.device_id,
        range: header.range,
        pose: header.pose,
        fill: Vec::new(),
        boundary: None,
    };

    let Some((pose_x, pose_y)) = shift.to_grid_cell(header.pose.x, header.pose.y) else {
        log::warn!(
            "Pose ({}, {}) out of bounds for {}x{} grid",
            header.pose.x,
            header.pose.y,
            shift.size(),
            shift.size()
        );
        return Ok(Some(reading));
    };

    // Cells paint one row above their index; the boundary follows suit.
    let mut boundary = Rect::cell(pose_x, pose_y - 1);

    if let Some(fill_line) = segments.get(1) {
        for token in fill_line.split(';') {
            if token.trim().is_empty() {
                continue;
            }
            let Some(cell) = parse_fill(token, shift)? else {
                continue;
            };
            boundary.include(cell.x, cell.y - 1);
            reading.fill.push(cell);
        }
    }

    reading.fill.push(Cell::path(pose_x, pose_y));
    reading.boundary = Some(boundary);
    Ok(Some(reading))
}

/// Split on newlines, dropping trailing empty lines.
fn split_segments(input: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = input
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    while segments.last().is_some_and(|s| s.trim().is_empty()) {
        segments.pop();
    }
    segments
}

struct Header {
    pose: Pose,
    device_id: i32,
    range: i32,
}

fn parse_header(line: &str) -> Result<Header> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(Error::MalformedRecord(format!(
            "expected 5 pose fields, found {}",
            fields.len()
        )));
    }

    let mut values = [0i32; 5];
    for (value, field) in values.iter_mut().zip(&fields) {
        *value = parse_int(field)?;
    }

    Ok(Header {
        pose: Pose::new(values[0], values[1], values[2]),
        device_id: values[3],
        range: values[4],
    })
}

fn parse_fill(token: &str, shift: MidShift) -> Result<Option<Cell>> {
    let fields: Vec<&str> = token.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(Error::MalformedRecord(format!(
            "fill '{}' has {} fields, expected 3",
            token.trim(),
            fields.len()
        )));
    }

    let dx = parse_int(fields[0])?;
    let dy = parse_int(fields[1])?;
    let pr: f32 = fields[2]
        .parse()
        .map_err(|_| Error::MalformedRecord(format!("invalid probability '{}'", fields[2])))?;

    let Some((x, y)) = shift.to_grid_cell(dx, dy) else {
        log::debug!("Skipping fill ({}, {}) outside grid", dx, dy);
        return Ok(None);
    };
    if !is_legal_value(pr) {
        log::warn!("Skipping fill ({}, {}) with illegal value {}", dx, dy, pr);
        return Ok(None);
    }

    Ok(Some(Cell::new(x, y, pr)))
}

fn parse_int(field: &str) -> Result<i32> {
    field
        .parse()
        .map_err(|_| Error::MalformedRecord(format!("invalid integer '{}'", field)))
}
