//! Binary PPM (P6) export of rendered frames.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::viewport::Frame;

impl Frame {
    /// Write the frame as binary PPM, dropping the alpha channel.
    pub fn write_ppm<W: Write>(&self, mut out: W) -> Result<()> {
        writeln!(out, "P6")?;
        writeln!(out, "{} {}", self.width(), self.height())?;
        writeln!(out, "255")?;

        let rgb: Vec<u8> = self
            .pixels()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        out.write_all(&rgb)?;
        out.flush()?;
        Ok(())
    }

    /// Save the frame to a `.ppm` file.
    pub fn save_ppm(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.write_ppm(BufWriter::new(File::create(path)?))?;
        log::info!(
            "Saved {}x{} snapshot to {}",
            self.width(),
            self.height(),
            path.display()
        );
        Ok(())
    }
}
