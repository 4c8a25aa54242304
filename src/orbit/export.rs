//! JSON Lines export of composed frames.
//!
//! One line per frame: `{"frame": n, "commands": [...]}`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::render::RenderCommand;
use crate::error::{ViewerError, ViewerResult};

/// One exported frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub frame: usize,
    pub commands: Vec<RenderCommand>,
}

/// Exporter writing to a buffered file.
pub type FileExporter = FrameExporter<BufWriter<File>>;

/// Streaming frame exporter.
pub struct FrameExporter<W: Write> {
    writer: W,
    frame_count: usize,
}

impl FileExporter {
    /// Create an exporter writing to a new file.
    ///
    /// # Errors
    ///
    /// Returns error if file creation fails.
    pub fn create(path: &Path) -> ViewerResult<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> FrameExporter<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            frame_count: 0,
        }
    }

    /// Append the next frame.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the write fails.
    pub fn write_frame(&mut self, commands: &[RenderCommand]) -> ViewerResult<()> {
        let record = FrameRecord {
            frame: self.frame_count,
            commands: commands.to_vec(),
        };
        let json = serde_json::to_string(&record)
            .map_err(|e| ViewerError::serialization(format!("frame {}: {e}", self.frame_count)))?;
        writeln!(self.writer, "{json}")?;
        self.frame_count += 1;
        Ok(())
    }

    /// Flush and return the writer with the number of frames written.
    ///
    /// # Errors
    ///
    /// Returns error if flush fails.
    pub fn finish(mut self) -> ViewerResult<(W, usize)> {
        self.writer.flush()?;
        Ok((self.writer, self.frame_count))
    }

    /// Frames written so far.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }
}
