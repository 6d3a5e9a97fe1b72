//! Where the links come from.

use crate::errors::AutomationError;
use std::path::PathBuf;
use tracing::{debug, info};

/// Column the playlist matcher writes target URLs into
pub const DEFAULT_LINK_COLUMN: &str = "Tidal URL";

pub trait LinkSource {
    /// Ordered, non-empty identifiers.
    ///
    /// Fails with `SourceUnavailable` when the backing list cannot be read and
    /// with `SourceEmpty` when it holds no usable entry.
    fn list(&self) -> Result<Vec<String>, AutomationError>;
}

/// Reads links from one column of a CSV file with a header row.
///
/// Rows where the column is missing or blank are skipped.
#[derive(Debug, Clone)]
pub struct CsvLinkSource {
    path: PathBuf,
    column: String,
}

impl CsvLinkSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            column: DEFAULT_LINK_COLUMN.to_string(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    fn unavailable(&self, reason: impl std::fmt::Display) -> AutomationError {
        AutomationError::SourceUnavailable(format!("{}: {reason}", self.path.display()))
    }
}

impl LinkSource for CsvLinkSource {
    fn list(&self) -> Result<Vec<String>, AutomationError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.unavailable(e))?;

        let headers = reader.headers().map_err(|e| self.unavailable(e))?;
        let index = headers
            .iter()
            .position(|h| h.trim() == self.column)
            .ok_or_else(|| self.unavailable(format!("no '{}' column", self.column)))?;

        let mut links = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| self.unavailable(e))?;
            match record.get(index).map(str::trim) {
                Some(link) if !link.is_empty() => links.push(link.to_string()),
                _ => debug!(row = row + 1, "skipping row without a link"),
            }
        }

        if links.is_empty() {
            return Err(AutomationError::SourceEmpty(format!(
                "{} has no '{}' values",
                self.path.display(),
                self.column
            )));
        }
        info!(count = links.len(), path = %self.path.display(), "loaded links");
        Ok(links)
    }
}

/// A fixed, in-memory list of links
#[derive(Debug, Clone, Default)]
pub struct StaticLinkSource {
    links: Vec<String>,
}

impl StaticLinkSource {
    pub fn new<I, S>(links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            links: links.into_iter().map(Into::into).collect(),
        }
    }
}

impl LinkSource for StaticLinkSource {
    fn list(&self) -> Result<Vec<String>, AutomationError> {
        let links: Vec<String> = self
            .links
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        if links.is_empty() {
            return Err(AutomationError::SourceEmpty(
                "no links were provided".to_string(),
            ));
        }
        Ok(links)
    }
}
