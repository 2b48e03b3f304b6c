//! The record store capability.
//!
//! Everything above the storage layer (the command line, snapshot import,
//! the logging and timing decorators) talks to a store through
//! [`RecordStore`]. The concrete variant is picked once at construction time.

use crate::error::Result;
use crate::record::{Record, RecordParams, RecordQuery};
use crate::snapshot::Snapshot;

/// Slot counts of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStat {
    /// All slots, live and deleted.
    pub total: u64,
    /// Slots holding a live record.
    pub live: u64,
}

impl StoreStat {
    /// Slots that are deleted but not yet reclaimed.
    pub fn deleted(&self) -> u64 {
        self.total - self.live
    }
}

/// Outcome of a compaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionStats {
    /// Slots carried over to the compacted file.
    pub surviving: u64,
    /// Slots in the file before compaction.
    pub total_before: u64,
}

impl CompactionStats {
    /// Slots that were reclaimed.
    pub fn reclaimed(&self) -> u64 {
        self.total_before - self.surviving
    }
}

/// A snapshot record that `restore` could not apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreFailure {
    /// Id carried by the rejected record.
    pub id: i32,
    /// Why it was rejected.
    pub reason: String,
}

/// Outcome of a `restore`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Records that were updated or appended.
    pub applied: usize,
    /// Records that were skipped.
    pub failures: Vec<RestoreFailure>,
}

/// Capability shared by every record store variant.
pub trait RecordStore {
    /// Validate `params`, assign the next id and store the record.
    /// Returns the new id.
    fn create(&mut self, params: RecordParams) -> Result<i32>;

    /// Replace the fields of the live record `id`.
    fn update(&mut self, id: i32, params: RecordParams) -> Result<()>;

    /// Delete the live record `id`.
    fn remove(&mut self, id: i32) -> Result<()>;

    /// Store a record under a caller-chosen id, placed after the greatest
    /// smaller id.
    fn insert(&mut self, id: i32, params: RecordParams) -> Result<()>;

    /// All live records in storage order.
    fn records(&self) -> Result<Vec<Record>>;

    /// Live records matching `query`, in storage order.
    fn find(&self, query: &RecordQuery) -> Result<Vec<Record>> {
        Ok(self.records()?.into_iter().filter(|r| query.matches(r)).collect())
    }

    /// Total and live slot counts.
    fn stat(&self) -> Result<StoreStat>;

    /// Reclaim the space of deleted records.
    fn defragment(&mut self) -> Result<CompactionStats>;

    /// Capture the live records for export.
    fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot::new(self.records()?))
    }

    /// Import a snapshot: update records whose id is live, add the others.
    fn restore(&mut self, snapshot: &Snapshot) -> Result<RestoreReport>;
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn create(&mut self, params: RecordParams) -> Result<i32> {
        (**self).create(params)
    }

    fn update(&mut self, id: i32, params: RecordParams) -> Result<()> {
        (**self).update(id, params)
    }

    fn remove(&mut self, id: i32) -> Result<()> {
        (**self).remove(id)
    }

    fn insert(&mut self, id: i32, params: RecordParams) -> Result<()> {
        (**self).insert(id, params)
    }

    fn records(&self) -> Result<Vec<Record>> {
        (**self).records()
    }

    fn find(&self, query: &RecordQuery) -> Result<Vec<Record>> {
        (**self).find(query)
    }

    fn stat(&self) -> Result<StoreStat> {
        (**self).stat()
    }

    fn defragment(&mut self) -> Result<CompactionStats> {
        (**self).defragment()
    }

    fn snapshot(&self) -> Result<Snapshot> {
        (**self).snapshot()
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<RestoreReport> {
        (**self).restore(snapshot)
    }
}
