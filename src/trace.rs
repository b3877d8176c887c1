//! Per-line state snapshots.
//!
//! An [`Observer`] sees every accepted log entry together with the validator
//! state right after it was applied. [`SnapshotEmitter`] records those
//! snapshots as NDJSON, one object per line:
//!
//! ```json
//! {"line":5,"entry":"5: N 1: boarding","ferry":{"port":"0","state":"ArrivedBoarding",...},"trucks":1,"cars":0}
//! ```

use crate::error::Error;
use crate::event::LogEntry;
use crate::ferry::FerryRecord;
use crate::validator::Validator;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Hook called by [`Validator::run`] after each accepted line.
pub trait Observer {
    fn on_entry(&mut self, entry: &LogEntry, validator: &Validator);
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn on_entry(&mut self, _entry: &LogEntry, _validator: &Validator) {}
}

#[derive(Serialize)]
struct Snapshot<'a> {
    line: usize,
    entry: String,
    ferry: &'a FerryRecord,
    trucks: u32,
    cars: u32,
}

/// Records validator snapshots as NDJSON.
///
/// A write failure while observing does not abort the analysis; emission
/// stops and the error is returned from [`SnapshotEmitter::finish`].
pub struct SnapshotEmitter {
    writer: std::io::BufWriter<std::fs::File>,
    count: usize,
    failed: Option<Error>,
}

impl SnapshotEmitter {
    /// Create a new emitter writing to the given file path.
    pub fn new(path: &Path) -> Result<Self, Error> {
        let file = std::fs::File::create(path)?;
        Ok(Self {
            writer: std::io::BufWriter::new(file),
            count: 0,
            failed: None,
        })
    }

    /// Write one snapshot line.
    pub fn emit(&mut self, entry: &LogEntry, validator: &Validator) -> Result<(), Error> {
        let started = validator.started();
        let snapshot = Snapshot {
            line: validator.lines(),
            entry: entry.to_string(),
            ferry: validator.ferry(),
            trucks: started.trucks,
            cars: started.cars,
        };
        serde_json::to_writer(&mut self.writer, &snapshot)?;
        self.writer.write_all(b"\n")?;

        self.count += 1;
        Ok(())
    }

    /// Flush buffered output and return the number of snapshots written.
    pub fn finish(mut self) -> Result<usize, Error> {
        if let Some(err) = self.failed.take() {
            return Err(err);
        }
        self.writer.flush()?;
        Ok(self.count)
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl Observer for SnapshotEmitter {
    fn on_entry(&mut self, entry: &LogEntry, validator: &Validator) {
        if self.failed.is_some() {
            return;
        }
        if let Err(err) = self.emit(entry, validator) {
            warn!(error = %err, "Stopped writing snapshot trace");
            self.failed = Some(err);
        }
    }
}
