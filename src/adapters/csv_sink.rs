//! Append-only CSV data log.
//!
//! Implements [`RecordSink`] on a plain file.  A new or empty file gets
//! [`CSV_HEADER`] first; an existing file is appended to.  Each record is
//! flushed as soon as it is written, so a pulled SD card loses at most
//! the line in flight.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;

use crate::app::ports::{RecordSink, SinkError};
use crate::clock::Timestamp;
use crate::datalog::{CSV_HEADER, LogRecord};

pub struct CsvFileSink {
    path: PathBuf,
    file: Option<File>,
    last_timestamp: Option<Timestamp>,
}

impl CsvFileSink {
    /// Open (or create) `path`.  A failure here is not fatal: the sink
    /// reports [`SinkError::Unavailable`] and retries on the next append.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut sink = Self {
            path: path.into(),
            file: None,
            last_timestamp: None,
        };
        let _ = sink.ensure_open();
        sink
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_open(&mut self) -> Result<&mut File, SinkError> {
        if self.file.is_none() {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .map_err(|_| SinkError::Unavailable)?;
            let empty = file.metadata().map(|m| m.len() == 0).unwrap_or(true);
            if empty {
                writeln!(file, "{CSV_HEADER}").map_err(|_| SinkError::IoError)?;
            }
            info!("CsvFileSink: logging to {}", self.path.display());
            self.file = Some(file);
        }
        self.file.as_mut().ok_or(SinkError::Unavailable)
    }
}

impl RecordSink for CsvFileSink {
    fn append(&mut self, record: &LogRecord) -> Result<(), SinkError> {
        if self.last_timestamp.is_some_and(|last| record.timestamp <= last) {
            return Err(SinkError::OutOfOrder);
        }

        let line = record.to_csv();
        let file = self.ensure_open()?;
        let written = writeln!(file, "{line}").and_then(|()| file.flush());
        if written.is_err() {
            // Drop the handle; the next append reopens the file.
            self.file = None;
            return Err(SinkError::IoError);
        }
        self.last_timestamp = Some(record.timestamp);
        Ok(())
    }
}
