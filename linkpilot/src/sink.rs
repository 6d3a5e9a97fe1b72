//! Durable record of links that ran out of attempts.

use crate::errors::AutomationError;
use std::cell::RefCell;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default failure log name; reruns keep appending to it
pub const DEFAULT_FAILURE_LOG: &str = "not_downloaded_tracks.txt";

pub trait FailureSink {
    /// Appends one identifier. Never deduplicates.
    fn record(&self, identifier: &str) -> Result<(), AutomationError>;
}

/// One identifier per line, appended across runs
#[derive(Debug, Clone)]
pub struct FileFailureSink {
    path: PathBuf,
}

impl FileFailureSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FailureSink for FileFailureSink {
    fn record(&self, identifier: &str) -> Result<(), AutomationError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{identifier}")?;
        file.flush()?;
        info!(link = identifier, path = %self.path.display(), "recorded failed link");
        Ok(())
    }
}

/// Keeps records in memory; handy for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryFailureSink {
    records: RefCell<Vec<String>>,
}

impl MemoryFailureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<String> {
        self.records.borrow().clone()
    }
}

impl FailureSink for MemoryFailureSink {
    fn record(&self, identifier: &str) -> Result<(), AutomationError> {
        self.records.borrow_mut().push(identifier.to_string());
        Ok(())
    }
}
