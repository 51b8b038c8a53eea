//! Simulation output.
//!
//! Append-only JSONL event logging plus periodic world snapshots, the
//! artifacts the out-of-process UI and API layers poll.

pub mod snapshot;

pub use snapshot::SnapshotWriter;

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use agora_events::Event;

use crate::error::OutputError;

/// Writes resolved events to a JSONL file, one per line, in log order.
pub struct EventLogger {
    writer: Option<BufWriter<File>>,
    path: PathBuf,
    event_count: u64,
}

impl EventLogger {
    /// Create a new event logger writing to the specified path.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, OutputError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(|source| OutputError::Io {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            path,
            event_count: 0,
        })
    }

    /// Create a logger that discards events (for testing).
    pub fn null() -> Self {
        Self {
            writer: None,
            path: PathBuf::new(),
            event_count: 0,
        }
    }

    /// Get the current event count.
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Log an event to the file.
    pub fn log(&mut self, event: &Event) -> Result<(), OutputError> {
        self.event_count += 1;
        if let Some(writer) = self.writer.as_mut() {
            let json = event.to_jsonl()?;
            writeln!(writer, "{}", json).map_err(|source| OutputError::Io {
                path: self.path.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Log multiple events.
    pub fn log_batch(&mut self, events: &[Event]) -> Result<(), OutputError> {
        for event in events {
            self.log(event)?;
        }
        Ok(())
    }

    /// Flush the buffer to disk.
    pub fn flush(&mut self) -> Result<(), OutputError> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush().map_err(|source| OutputError::Io {
                path: self.path.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            tracing::warn!(%err, "failed to flush event logger");
        }
    }
}
