//! Shared helpers for ChitraMap integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Grid side used by most tests (origin at array (50, 50)).
pub const GRID_SIZE: usize = 100;

/// One protocol record: pose line then fill line.
pub fn record(x: i32, y: i32, device: i32, fills: &[(i32, i32, f32)]) -> String {
    let fill: Vec<String> = fills
        .iter()
        .map(|(fx, fy, pr)| format!("{} {} {:.4}", fx, fy, pr))
        .collect();
    format!("{} {} 0 {} 100\n{}", x, y, device, fill.join(";"))
}

/// A robot driving along +x, each step marking the cell ahead as occupied.
pub fn straight_run(steps: i32) -> Vec<String> {
    (0..steps)
        .map(|i| record(i % 40, 0, i % 16, &[(i % 40, 3, 0.9), (i % 40, 1, 0.1)]))
        .collect()
}

/// Write `contents` into `dir/name`.
pub fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

/// Write records as a `.cd` log.
pub fn write_log(dir: &TempDir, name: &str, records: &[String]) -> PathBuf {
    let mut contents = String::from("% test log\n");
    for record in records {
        contents.push_str(record);
        contents.push('\n');
    }
    write_file(dir, name, &contents)
}

/// Read a file to a string.
pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}
