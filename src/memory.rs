//! In-memory record store.
//!
//! Keeps records in a map ordered by id. Nothing is persisted and removal is
//! physical, so there is never anything to defragment.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::record::{Record, RecordParams};
use crate::snapshot::Snapshot;
use crate::store::{CompactionStats, RecordStore, RestoreFailure, RestoreReport, StoreStat};
use crate::validation::{ValidationError, Validator};

/// A record store that lives only in memory.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: BTreeMap<i32, Record>,
    validator: Validator,
}

impl MemoryRecordStore {
    /// Creates an empty store that checks mutations with `validator`.
    pub fn new(validator: Validator) -> Self {
        Self { records: BTreeMap::new(), validator }
    }

    /// Returns the record with `id`.
    pub fn get(&self, id: i32) -> Option<&Record> {
        self.records.get(&id)
    }
}

impl RecordStore for MemoryRecordStore {
    fn create(&mut self, params: RecordParams) -> Result<i32> {
        self.validator.validate(&params)?;

        let id = match self.records.keys().next_back() {
            Some(max) => max
                .checked_add(1)
                .ok_or_else(|| Error::invalid_state("record ids are exhausted"))?,
            None => 1,
        };
        self.records.insert(id, Record::new(id, params));
        Ok(id)
    }

    fn update(&mut self, id: i32, params: RecordParams) -> Result<()> {
        self.validator.validate(&params)?;

        let record = self.records.get_mut(&id).ok_or(Error::NotFound(id))?;
        *record = Record::new(id, params);
        Ok(())
    }

    fn remove(&mut self, id: i32) -> Result<()> {
        self.records.remove(&id).map(|_| ()).ok_or(Error::NotFound(id))
    }

    fn insert(&mut self, id: i32, params: RecordParams) -> Result<()> {
        self.validator.validate(&params)?;
        if id <= 0 {
            return Err(Error::invalid_argument(format!("record id {} is not positive", id)));
        }
        if self.records.contains_key(&id) {
            return Err(Error::DuplicateId(id));
        }
        self.records.insert(id, Record::new(id, params));
        Ok(())
    }

    fn records(&self) -> Result<Vec<Record>> {
        Ok(self.records.values().cloned().collect())
    }

    fn stat(&self) -> Result<StoreStat> {
        let count = self.records.len() as u64;
        Ok(StoreStat { total: count, live: count })
    }

    fn defragment(&mut self) -> Result<CompactionStats> {
        let count = self.records.len() as u64;
        Ok(CompactionStats { surviving: count, total_before: count })
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<RestoreReport> {
        let mut report = RestoreReport::default();

        for record in snapshot.records() {
            let checked = if record.id <= 0 {
                Err(ValidationError::new("id", format!("{} is not positive", record.id)))
            } else {
                self.validator.validate(&record.params())
            };

            match checked {
                Ok(()) => {
                    self.records.insert(record.id, record.clone());
                    report.applied += 1;
                }
                Err(e) => {
                    log::warn!("Skipping snapshot record #{}: {}", record.id, e);
                    report.failures.push(RestoreFailure { id: record.id, reason: e.to_string() });
                }
            }
        }
        Ok(report)
    }
}
