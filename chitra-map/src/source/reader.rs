//! Line reader that skips `%` comment lines.

use std::io::BufRead;

use crate::error::Result;

/// Comment marker shared by `.cd`, `.sd` and `.gd` files.
pub const COMMENT_PREFIX: char = '%';

/// Yields lines with their terminator removed, skipping comment lines.
///
/// Blank lines are returned as empty strings; log entries use them for an
/// empty fill list.
pub struct CommentedLines<R> {
    reader: R,
    buf: String,
    line_number: usize,
}

impl<R: BufRead> CommentedLines<R> {
    /// Wrap a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line_number: 0,
        }
    }

    /// Next non-comment line, or `None` at end of input.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.buf.trim_end_matches(['\n', '\r']);
            if line.trim_start().starts_with(COMMENT_PREFIX) {
                continue;
            }
            return Ok(Some(line.to_string()));
        }
    }

    /// Next line that is neither a comment nor blank.
    pub fn next_content_line(&mut self) -> Result<Option<String>> {
        while let Some(line) = self.next_line()? {
            if !line.trim().is_empty() {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }

    /// 1-based number of the line most recently read.
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}
