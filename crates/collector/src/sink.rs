//! # Aggregating Sink
//!
//! The single output stream shared by every worker. Each record is written
//! with one `write_all` while the lock is held, so records from different
//! workers never interleave. The lock covers a single append and nothing
//! else.

use crate::CollectorError;
use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

struct SinkState<W> {
    writer: W,
    records: usize,
}

pub struct Sink<W: Write> {
    state: Mutex<SinkState<W>>,
}

impl Sink<BufWriter<File>> {
    /// Create (or truncate) the output file.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Io`] if the file cannot be opened.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, CollectorError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| CollectorError::io(path, source))?;
        tracing::info!("Writing trajectories to {:?}", path);
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> Sink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            state: Mutex::new(SinkState { writer, records: 0 }),
        }
    }

    /// Append one complete record, including its line terminator.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Write`] if the underlying writer fails; the
    /// record is not counted.
    pub fn append(&self, line: &str) -> Result<(), CollectorError> {
        let mut state = self.state.lock();
        state
            .writer
            .write_all(line.as_bytes())
            .map_err(CollectorError::Write)?;
        state.records += 1;
        Ok(())
    }

    /// Records appended so far.
    pub fn records(&self) -> usize {
        self.state.lock().records
    }

    /// Flush and hand back the writer. Dropping the returned file closes it.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Write`] if the final flush fails.
    pub fn finish(self) -> Result<W, CollectorError> {
        let mut state = self.state.into_inner();
        state.writer.flush().map_err(CollectorError::Write)?;
        Ok(state.writer)
    }
}
