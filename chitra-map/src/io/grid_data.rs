//! Static grid data (`.gd`) reader and writer.
//!
//! ```text
//! % comment lines start with '%'
//! (ulx,uly) (lrx,lry)          device-space corners, inclusive
//! v v v ... v                  one row per grid row from uly down to lry,
//! ...                          one value per column from ulx to lrx
//! ```
//!
//! Values are probabilities or `-1` for path cells. The whole file is
//! parsed and its bounds validated before the grid is touched.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::core::{MidShift, Rect, SENTINEL, is_legal_value};
use crate::error::{Error, Result};
use crate::grid::GridStore;
use crate::source::CommentedLines;

/// A parsed static map, ready to be written into a grid.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticMap {
    /// Array-space region covered (inclusive of both corners)
    pub region: Rect,
    /// Row-major values, `region.height` rows of `region.width`; `None`
    /// for rows missing from the file
    pub rows: Vec<Option<Vec<f32>>>,
}

impl StaticMap {
    /// Write every present row into `grid`.
    ///
    /// The region was validated against the grid size at parse time.
    pub fn apply(&self, grid: &mut GridStore) -> Result<()> {
        for (dy, row) in self.rows.iter().enumerate() {
            let Some(row) = row else { continue };
            let y = self.region.y + dy as i32;
            for (dx, &value) in row.iter().enumerate() {
                grid.set(self.region.x + dx as i32, y, value)?;
            }
        }
        Ok(())
    }
}

/// Open and parse a `.gd` file.
pub fn load_grid_data(path: impl AsRef<Path>, shift: MidShift) -> Result<StaticMap> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| Error::SourceUnavailable(format!("{}: {}", path.display(), e)))?;
    let map = parse_grid_data(BufReader::new(file), shift)?;
    log::info!(
        "Loaded static map {} ({}x{} cells)",
        path.display(),
        map.region.width,
        map.region.height
    );
    Ok(map)
}

/// Parse `.gd` text.
pub fn parse_grid_data<R: BufRead>(reader: R, shift: MidShift) -> Result<StaticMap> {
    let mut lines = CommentedLines::new(reader);

    let header = lines
        .next_content_line()?
        .ok_or_else(|| Error::InvalidRegion("missing bounds line".to_string()))?;
    let region = parse_bounds(&header, shift)?;

    let mut rows = Vec::with_capacity(region.height as usize);
    for i in 0..region.height {
        let Some(line) = lines.next_line()? else {
            log::warn!(
                "Static map ends after {} of {} rows; remaining rows left unknown",
                i,
                region.height
            );
            rows.resize(region.height as usize, None);
            break;
        };
        rows.push(Some(parse_row(&line, region, region.y + i)));
    }

    Ok(StaticMap { region, rows })
}

/// Parse `(ulx,uly) (lrx,lry)` into an array-space rectangle.
fn parse_bounds(header: &str, shift: MidShift) -> Result<Rect> {
    let cleaned: String = header
        .chars()
        .map(|c| if matches!(c, '(' | ')' | ',') { ' ' } else { c })
        .collect();
    let values: Vec<i32> = cleaned
        .split_whitespace()
        .map(|f| f.parse())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| Error::InvalidRegion(format!("unparsable bounds '{}'", header)))?;
    let &[ulx, uly, lrx, lry] = values.as_slice() else {
        return Err(Error::InvalidRegion(format!(
            "expected 4 bound coordinates, found {} in '{}'",
            values.len(),
            header
        )));
    };

    let corners = shift.to_grid_cell(ulx, uly).zip(shift.to_grid_cell(lrx, lry));
    let Some(((left, top), (right, bottom))) = corners else {
        return Err(Error::InvalidRegion(format!(
            "bounds ({},{}) ({},{}) exceed the {}x{} grid",
            ulx,
            uly,
            lrx,
            lry,
            shift.size(),
            shift.size()
        )));
    };
    if right < left || bottom < top {
        return Err(Error::InvalidRegion(format!(
            "upper-left ({},{}) is not above and left of lower-right ({},{})",
            ulx, uly, lrx, lry
        )));
    }

    Ok(Rect::new(left, top, right - left + 1, bottom - top + 1))
}

fn parse_row(line: &str, region: Rect, y: i32) -> Vec<f32> {
    let mut fields = line.split_whitespace();
    let mut row = Vec::with_capacity(region.width as usize);
    for x in region.x..region.right() {
        let value = match fields.next() {
            Some(field) => match field.parse::<f32>() {
                Ok(v) if is_legal_value(v) => v,
                _ => {
                    log::warn!("Static cell ({}, {}) = '{}' stored as path", x, y, field);
                    SENTINEL
                }
            },
            None => {
                log::warn!("Static cell ({}, {}) missing, stored as path", x, y);
                SENTINEL
            }
        };
        row.push(value);
    }
    row
}

/// Write `region` of `grid` as `.gd` text.
pub fn write_grid_data<W: Write>(mut out: W, grid: &GridStore, region: Rect) -> Result<()> {
    let shift = grid.shift();
    if region.is_empty()
        || !shift.in_bounds(region.x, region.y)
        || !shift.in_bounds(region.right() - 1, region.bottom() - 1)
    {
        return Err(Error::InvalidRegion(format!(
            "cannot save {:?} from a {}x{} grid",
            region,
            grid.size(),
            grid.size()
        )));
    }

    let corners = shift
        .to_device(region.x, region.y)
        .zip(shift.to_device(region.right() - 1, region.bottom() - 1));
    let Some(((ulx, uly), (lrx, lry))) = corners else {
        return Err(Error::InvalidRegion(format!("cannot save {:?}", region)));
    };

    writeln!(out, "% ChitraMap grid data")?;
    writeln!(out, "% {}x{} cells", region.width, region.height)?;
    writeln!(out, "({},{}) ({},{})", ulx, uly, lrx, lry)?;

    for y in region.y..region.bottom() {
        let row = grid.row(y)?;
        let cells = &row[region.x as usize..region.right() as usize];
        for (i, &value) in cells.iter().enumerate() {
            if i > 0 {
                out.write_all(b" ")?;
            }
            if value == SENTINEL {
                out.write_all(b"-1")?;
            } else {
                write!(out, "{:.4}", value)?;
            }
        }
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Save `region` of `grid` to a `.gd` file.
pub fn save_grid_data(path: impl AsRef<Path>, grid: &GridStore, region: Rect) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_grid_data(BufWriter::new(file), grid, region)?;
    log::info!("Saved {}x{} cells to {}", region.width, region.height, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UNKNOWN;
    use std::io::Cursor;

    const SHIFT: MidShift = MidShift::new(20);

    #[test]
    fn test_parse_region_and_rows() {
        let text = "% lab\n(-1,1) (1,0)\n0.1 0.2 0.3\n0.4 -1 0.6\n";
        let map = parse_grid_data(Cursor::new(text), SHIFT).unwrap();

        // mid 10: ul (-1,1) -> (9,9), lr (1,0) -> (11,10)
        assert_eq!(map.region, Rect::new(9, 9, 3, 2));
        assert_eq!(map.rows[0], Some(vec![0.1, 0.2, 0.3]));
        assert_eq!(map.rows[1], Some(vec![0.4, SENTINEL, 0.6]));
    }

    #[test]
    fn test_bad_values_become_path() {
        let text = "(0,0) (2,0)\n0.5 junk\n";
        let map = parse_grid_data(Cursor::new(text), SHIFT).unwrap();
        assert_eq!(map.rows[0], Some(vec![0.5, SENTINEL, SENTINEL]));
    }

    #[test]
    fn test_missing_rows_left_unknown() {
        let text = "(0,1) (0,0)\n0.9\n";
        let map = parse_grid_data(Cursor::new(text), SHIFT).unwrap();
        assert_eq!(map.rows, vec![Some(vec![0.9]), None]);

        let mut grid = GridStore::new(20);
        map.apply(&mut grid).unwrap();
        assert_eq!(grid.get(10, 9).unwrap(), 0.9);
        assert_eq!(grid.get(10, 10).unwrap(), UNKNOWN);
    }

    #[test]
    fn test_out_of_range_bounds() {
        let text = "(-11,0) (0,0)\n";
        assert!(matches!(
            parse_grid_data(Cursor::new(text), SHIFT),
            Err(Error::InvalidRegion(_))
        ));
        assert!(matches!(
            parse_grid_data(Cursor::new("(2,0) (1,0)\n"), SHIFT),
            Err(Error::InvalidRegion(_))
        ));
        assert!(matches!(
            parse_grid_data(Cursor::new("% only comments\n"), SHIFT),
            Err(Error::InvalidRegion(_))
        ));
    }

    #[test]
    fn test_extreme_bounds_are_invalid() {
        for text in [
            "(2147483647,0) (0,0)\n",
            "(0,0) (0,-2147483648)\n",
            "(-2147483648,2147483647) (0,0)\n",
        ] {
            assert!(matches!(
                parse_grid_data(Cursor::new(text), SHIFT),
                Err(Error::InvalidRegion(_))
            ));
        }
    }

    #[test]
    fn test_write_format() {
        let mut grid = GridStore::new(20);
        grid.set(10, 10, 0.25).unwrap();
        grid.set(11, 10, SENTINEL).unwrap();

        let mut out = Vec::new();
        write_grid_data(&mut out, &grid, Rect::new(10, 10, 2, 1)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("(0,0) (1,0)\n0.2500 -1\n"));
    }

    #[test]
    fn test_written_map_reloads() {
        let mut grid = GridStore::new(20);
        grid.set(5, 6, 0.75).unwrap();
        grid.set(6, 7, SENTINEL).unwrap();
        let region = grid.known_bounds().unwrap();

        let mut out = Vec::new();
        write_grid_data(&mut out, &grid, region).unwrap();
        let map = parse_grid_data(Cursor::new(out), SHIFT).unwrap();

        let mut reloaded = GridStore::new(20);
        map.apply(&mut reloaded).unwrap();
        assert_eq!(map.region, region);
        assert_eq!(reloaded.get(5, 6).unwrap(), 0.75);
        assert_eq!(reloaded.get(6, 7).unwrap(), SENTINEL);
        assert_eq!(reloaded.get(6, 6).unwrap(), UNKNOWN);
    }
}
