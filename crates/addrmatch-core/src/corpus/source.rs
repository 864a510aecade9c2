//! Corpus sources

use std::path::{Path, PathBuf};

use super::error::{LoadError, LoadResult};

/// Default address column name
pub const DEFAULT_COLUMN: &str = "Address";

/// A line-oriented source of raw address values.
///
/// `read` returns the address field of every record in source order,
/// untrimmed; empty values are filtered by the loader.
pub trait CorpusSource: Send + Sync {
    /// Human-readable origin, used in logs and health output
    fn describe(&self) -> String;

    /// Read the whole source end to end
    fn read(&self) -> LoadResult<Vec<String>>;
}

/// CSV file with a header row naming the address column
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    column: String,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_column(path, DEFAULT_COLUMN)
    }

    pub fn with_column(path: impl Into<PathBuf>, column: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            column: column.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}

impl CorpusSource for CsvSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> LoadResult<Vec<String>> {
        let file = std::fs::File::open(&self.path).map_err(|source| LoadError::Open {
            path: self.path.clone(),
            source,
        })?;

        // Ragged rows are tolerated; a short row simply has no address
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

        let column = reader
            .headers()?
            .iter()
            .position(|h| h.trim() == self.column)
            .ok_or_else(|| LoadError::MissingColumn {
                path: self.path.clone(),
                column: self.column.clone(),
            })?;

        let mut values = Vec::new();
        for record in reader.records() {
            let record = record?;
            values.push(record.get(column).unwrap_or_default().to_string());
        }

        Ok(values)
    }
}

/// In-memory records
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<String>,
}

impl MemorySource {
    pub fn new<I, S>(records: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            records: records.into_iter().map(Into::into).collect(),
        }
    }
}

impl CorpusSource for MemorySource {
    fn describe(&self) -> String {
        format!("memory ({} records)", self.records.len())
    }

    fn read(&self) -> LoadResult<Vec<String>> {
        Ok(self.records.clone())
    }
}
