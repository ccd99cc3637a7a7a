//! Result sinks.
//!
//! Where finished games go. The session only ever calls [`ResultSink::record`];
//! durability is the sink's business, and a failing sink never takes the
//! session down with it.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::record::result::GameRecord;

/// Sink failures.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Reading or appending the results file failed.
    #[error("io error on {}: {source}", path.display())]
    Io {
        /// File being written.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// A record did not (de)serialize.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// A writer panicked while holding the sink.
    #[error("sink poisoned")]
    Poisoned,
}

/// Storage for finished games.
pub trait ResultSink: Send + Sync {
    /// Store one finished game.
    fn record(&self, record: &GameRecord) -> Result<(), RecordError>;
}

// =============================================================================
// MEMORY
// =============================================================================

/// Keeps records in memory. Used when no results file is configured, and in
/// tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<GameRecord>>,
}

impl MemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, oldest first.
    pub fn records(&self) -> Vec<GameRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl ResultSink for MemorySink {
    fn record(&self, record: &GameRecord) -> Result<(), RecordError> {
        let mut records = self.records.lock().map_err(|_| RecordError::Poisoned)?;
        records.push(record.clone());
        debug!(id = %record.id, total = records.len(), "Game recorded in memory");
        Ok(())
    }
}

// =============================================================================
// JSON LINES
// =============================================================================

/// Appends one JSON object per finished game to a file.
#[derive(Debug)]
pub struct JsonLinesSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonLinesSink {
    /// Sink appending to `path`. The file is created on first write.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn new(path: impl AsRef<Path>) -> Self {
        info!("Results will be appended to file");
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// Target file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record back, skipping blank lines.
    pub fn read_all(&self) -> Result<Vec<GameRecord>, RecordError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| RecordError::Io {
            path: self.path.clone(),
            source,
        })?;
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(RecordError::from))
            .collect()
    }
}

impl ResultSink for JsonLinesSink {
    #[instrument(skip(self, record), fields(id = %record.id, game = %record.game))]
    fn record(&self, record: &GameRecord) -> Result<(), RecordError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.lock.lock().map_err(|_| RecordError::Poisoned)?;
        let io_err = |source| RecordError::Io { path: self.path.clone(), source };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        file.write_all(line.as_bytes()).map_err(io_err)?;

        info!(winner = ?record.winner, "Game recorded");
        Ok(())
    }
}
