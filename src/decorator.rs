//! Decorators that wrap any [`RecordStore`].
//!
//! Both decorators implement [`RecordStore`] themselves, so they stack:
//! `TimingStore::new(LoggingStore::new(store))`.

use std::time::Instant;

use crate::error::Result;
use crate::record::{Record, RecordParams, RecordQuery};
use crate::snapshot::Snapshot;
use crate::store::{CompactionStats, RecordStore, RestoreReport, StoreStat};

/// Logs every call with its arguments and outcome.
#[derive(Debug)]
pub struct LoggingStore<S> {
    inner: S,
}

impl<S: RecordStore> LoggingStore<S> {
    /// Wraps `inner`.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Unwraps the decorated store.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

fn logged<T: std::fmt::Debug>(call: String, result: Result<T>) -> Result<T> {
    match &result {
        Ok(value) => log::info!("{} returned {:?}", call, value),
        Err(e) => log::info!("{} failed: {}", call, e),
    }
    result
}

impl<S: RecordStore> RecordStore for LoggingStore<S> {
    fn create(&mut self, params: RecordParams) -> Result<i32> {
        let call = format!("create({:?})", params);
        logged(call, self.inner.create(params))
    }

    fn update(&mut self, id: i32, params: RecordParams) -> Result<()> {
        let call = format!("update({}, {:?})", id, params);
        logged(call, self.inner.update(id, params))
    }

    fn remove(&mut self, id: i32) -> Result<()> {
        logged(format!("remove({})", id), self.inner.remove(id))
    }

    fn insert(&mut self, id: i32, params: RecordParams) -> Result<()> {
        let call = format!("insert({}, {:?})", id, params);
        logged(call, self.inner.insert(id, params))
    }

    fn records(&self) -> Result<Vec<Record>> {
        let result = self.inner.records();
        match &result {
            Ok(records) => log::info!("records() returned {} records", records.len()),
            Err(e) => log::info!("records() failed: {}", e),
        }
        result
    }

    fn find(&self, query: &RecordQuery) -> Result<Vec<Record>> {
        let result = self.inner.find(query);
        match &result {
            Ok(records) => log::info!("find({:?}) returned {} records", query, records.len()),
            Err(e) => log::info!("find({:?}) failed: {}", query, e),
        }
        result
    }

    fn stat(&self) -> Result<StoreStat> {
        logged("stat()".to_string(), self.inner.stat())
    }

    fn defragment(&mut self) -> Result<CompactionStats> {
        logged("defragment()".to_string(), self.inner.defragment())
    }

    fn snapshot(&self) -> Result<Snapshot> {
        let result = self.inner.snapshot();
        match &result {
            Ok(snapshot) => log::info!("snapshot() captured {} records", snapshot.len()),
            Err(e) => log::info!("snapshot() failed: {}", e),
        }
        result
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<RestoreReport> {
        let call = format!("restore({} records)", snapshot.len());
        logged(call, self.inner.restore(snapshot))
    }
}

/// Logs how long every call takes.
#[derive(Debug)]
pub struct TimingStore<S> {
    inner: S,
}

impl<S: RecordStore> TimingStore<S> {
    /// Wraps `inner`.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Unwraps the decorated store.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

fn timed<T>(method: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = f();
    log::info!("{} took {:?}", method, start.elapsed());
    result
}

impl<S: RecordStore> RecordStore for TimingStore<S> {
    fn create(&mut self, params: RecordParams) -> Result<i32> {
        timed("create", || self.inner.create(params))
    }

    fn update(&mut self, id: i32, params: RecordParams) -> Result<()> {
        timed("update", || self.inner.update(id, params))
    }

    fn remove(&mut self, id: i32) -> Result<()> {
        timed("remove", || self.inner.remove(id))
    }

    fn insert(&mut self, id: i32, params: RecordParams) -> Result<()> {
        timed("insert", || self.inner.insert(id, params))
    }

    fn records(&self) -> Result<Vec<Record>> {
        timed("records", || self.inner.records())
    }

    fn find(&self, query: &RecordQuery) -> Result<Vec<Record>> {
        timed("find", || self.inner.find(query))
    }

    fn stat(&self) -> Result<StoreStat> {
        timed("stat", || self.inner.stat())
    }

    fn defragment(&mut self) -> Result<CompactionStats> {
        timed("defragment", || self.inner.defragment())
    }

    fn snapshot(&self) -> Result<Snapshot> {
        timed("snapshot", || self.inner.snapshot())
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<RestoreReport> {
        timed("restore", || self.inner.restore(snapshot))
    }
}
