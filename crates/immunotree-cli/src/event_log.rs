use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("event log I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("event serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Append-only NDJSON sink: one JSON object per line.
pub struct EventLog {
    writer: BufWriter<File>,
    lines: u64,
}

impl EventLog {
    /// Open `path` for append, creating it if missing.
    pub fn open_append(path: impl AsRef<Path>) -> Result<Self, EventLogError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(EventLog {
            writer: BufWriter::new(file),
            lines: 0,
        })
    }

    pub fn write_event<T: Serialize>(&mut self, event: &T) -> Result<(), EventLogError> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.lines += 1;
        Ok(())
    }

    /// Lines written since the log was opened.
    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn flush(&mut self) -> Result<(), EventLogError> {
        self.writer.flush()?;
        Ok(())
    }
}
