use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

mod entities;

pub use entities::{CREATED_FORMAT, LogRecord, Record, parse_created};

/// Failures of the record store. These are not client errors and are passed
/// through to the caller untouched.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read record file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse record file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of candidate records for a search
pub trait RecordStore {
    type Record: Record + Clone;

    /// Fetch the full candidate collection
    fn fetch_all(&self) -> Result<Vec<Self::Record>, StorageError>;
}

/// Record store backed by an in-memory vector
#[derive(Debug, Clone, Default)]
pub struct MemoryStore<R> {
    records: Vec<R>,
}

impl<R> MemoryStore<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R: Record + Clone> RecordStore for MemoryStore<R> {
    type Record = R;

    fn fetch_all(&self) -> Result<Vec<R>, StorageError> {
        Ok(self.records.clone())
    }
}

/// Record store reading a JSON array of log records from disk on every fetch
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for JsonFileStore {
    type Record = LogRecord;

    fn fetch_all(&self) -> Result<Vec<LogRecord>, StorageError> {
        load_records(&self.path)
    }
}

/// Load log records from a JSON array file
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<LogRecord>, StorageError> {
    let path = path.as_ref();
    let path_display = path.display().to_string();
    debug!(path = %path_display, "reading record file");

    let raw = fs::read_to_string(path).map_err(|source| StorageError::Read {
        path: path_display.clone(),
        source,
    })?;
    let records = parse_records(&raw).map_err(|source| StorageError::Parse {
        path: path_display.clone(),
        source,
    })?;

    info!(path = %path_display, count = records.len(), "loaded log records");
    Ok(records)
}

/// Parse log records from JSON array text
pub fn parse_records(raw: &str) -> Result<Vec<LogRecord>, serde_json::Error> {
    serde_json::from_str(raw)
}
