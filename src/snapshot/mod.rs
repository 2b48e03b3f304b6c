//! Snapshots of the live record set for export and import.
//!
//! A [`Snapshot`] is independent of the slot layout: it is just the live
//! records in storage order. It can be written to and read from CSV and JSON.
//!
//! Loading isolates bad entries: a row that cannot be parsed is skipped and
//! reported in [`LoadedSnapshot::skipped`], while a document that cannot be
//! read at all is an error.

pub mod csv;
pub mod json;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::record::Record;

/// An ordered set of records detached from any store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    records: Vec<Record>,
}

impl Snapshot {
    /// Creates a snapshot from records.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// The records, in order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consumes the snapshot and returns its records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the snapshot holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Writes the snapshot to `path` in `format`.
    pub fn save(&self, path: &Path, format: SnapshotFormat) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        match format {
            SnapshotFormat::Csv => csv::write(self, &mut writer)?,
            SnapshotFormat::Json => json::write(self, &mut writer)?,
        }
        writer.flush()?;
        log::info!("Saved {} records to {:?}", self.len(), path);
        Ok(())
    }

    /// Reads a snapshot from `path` in `format`.
    pub fn load(path: &Path, format: SnapshotFormat) -> Result<LoadedSnapshot> {
        let reader = BufReader::new(File::open(path)?);
        let loaded = match format {
            SnapshotFormat::Csv => csv::read(reader)?,
            SnapshotFormat::Json => json::read(reader)?,
        };
        log::info!(
            "Loaded {} records from {:?}, {} entries skipped",
            loaded.snapshot.len(),
            path,
            loaded.skipped.len()
        );
        Ok(loaded)
    }
}

/// Supported snapshot document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// A JSON array of record objects.
    Json,
}

impl SnapshotFormat {
    /// Picks the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(SnapshotFormat::Csv),
            Some("json") => Ok(SnapshotFormat::Json),
            _ => Err(Error::invalid_argument(format!(
                "cannot tell snapshot format of {:?}",
                path
            ))),
        }
    }
}

/// A snapshot entry that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// CSV line number, or index in the JSON array.
    pub position: u64,
    /// Parse error.
    pub reason: String,
}

/// Result of reading a snapshot document.
#[derive(Debug, Clone, Default)]
pub struct LoadedSnapshot {
    /// Entries that parsed.
    pub snapshot: Snapshot,
    /// Entries that did not.
    pub skipped: Vec<SkippedEntry>,
}
