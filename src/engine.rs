//! File-backed record store.
//!
//! [`FileRecordStore`] implements every mutation on top of the slot layer:
//! it locates records with a [`SlotCursor`], translates them with the slot
//! codec and writes through the [`SlotStore`].
//!
//! ## Physical order
//!
//! Records land in the file by two different paths:
//!
//! - `create` and `restore` append at the end of the file, whatever the id
//! - `insert` rewrites the whole file with the new slot placed right after
//!   the live record holding the greatest smaller id (or first, if none)
//!
//! Ids are therefore ascending in physical order only among records written
//! through `insert`. Appended records stay where they were appended.
//!
//! ## Whole-file rewrites
//!
//! `insert` and `defragment` write the new file to `<path>.tmp`, promote it
//! over the canonical path (copying the old file to `<path>.bak` when
//! backups are enabled) and reopen the handle before returning. A failure
//! before the promotion leaves the canonical file untouched.

use std::fs;
use std::io::ErrorKind;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use crate::config::Options;
use crate::error::{Error, Result};
use crate::record::{Record, RecordParams};
use crate::slot::store::{self, SlotStore};
use crate::slot::{codec, SlotContent, SlotCursor, SLOT_SIZE};
use crate::snapshot::Snapshot;
use crate::store::{CompactionStats, RecordStore, RestoreFailure, RestoreReport, StoreStat};
use crate::swap;
use crate::validation::{ValidationError, Validator};

/// A record store backed by a fixed-layout slot file.
///
/// # Example
///
/// ```rust,no_run
/// use recordbook::{FileRecordStore, Options, RecordParams, RecordStore};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// # fn main() -> Result<(), recordbook::Error> {
/// let mut store = FileRecordStore::open("records.bin", Options::default())?;
///
/// let id = store.create(RecordParams {
///     first_name: "Alice".to_string(),
///     last_name: "Smith".to_string(),
///     date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
///     prop_short: 1,
///     prop_decimal: Decimal::new(15, 1),
///     prop_char: 'A',
/// })?;
///
/// store.remove(id)?;
/// let stat = store.stat()?;
/// assert_eq!(stat.deleted(), 1);
/// # Ok(())
/// # }
/// ```
pub struct FileRecordStore {
    /// Slot file handle; replaced after every whole-file rewrite
    slots: SlotStore,
    /// Rules every mutation is checked against
    validator: Validator,
    /// Keep `<path>.bak` on rewrites
    keep_backup: bool,
}

impl FileRecordStore {
    /// Opens (or creates) the slot file at `path`.
    ///
    /// A staging file left behind by an interrupted rewrite is removed; the
    /// canonical file is what the store continues from.
    pub fn open<P: AsRef<Path>>(path: P, options: Options) -> Result<Self> {
        options.validate()?;

        let slots = SlotStore::open(path, &options)?;
        if swap::remove_staging(slots.path())? {
            log::warn!("Removed staging file left by an interrupted rewrite of {:?}", slots.path());
        }

        log::info!("Opened record store {:?} ({} slots)", slots.path(), slots.slot_count()?);

        Ok(Self {
            slots,
            validator: Validator::for_profile(options.validation),
            keep_backup: options.keep_backup,
        })
    }

    /// Replaces the validator chosen by the options.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Path of the slot file.
    pub fn path(&self) -> &Path {
        self.slots.path()
    }

    /// Path where the previous file is kept after a rewrite.
    pub fn backup_path(&self) -> PathBuf {
        swap::backup_path(self.slots.path())
    }

    /// Returns the first live record with `id`.
    pub fn get(&self, id: i32) -> Result<Option<Record>> {
        let mut found = None;
        self.scan(|_, content| match content {
            SlotContent::Live(record) if record.id == id => {
                found = Some(record);
                ControlFlow::Break(())
            }
            _ => ControlFlow::Continue(()),
        })?;
        Ok(found)
    }

    /// Copies the live slots, byte for byte and without gaps, into a new
    /// file at `destination`.
    ///
    /// The store itself is not modified; see [`RecordStore::defragment`] for
    /// compacting in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `destination` names the store's
    /// own file, under any spelling or through a symlink.
    pub fn compact_into(&self, destination: &Path) -> Result<CompactionStats> {
        if self.is_store_file(destination)? {
            return Err(Error::invalid_argument(format!(
                "compaction destination {:?} is the store file itself",
                destination
            )));
        }

        let mut total_before = 0u64;
        let mut live_offsets = Vec::new();
        self.scan(|offset, content| {
            total_before += 1;
            if !content.is_tombstoned() {
                live_offsets.push(offset as usize);
            }
            ControlFlow::Continue(())
        })?;

        let data = self.slots.read_all()?;
        let mut compacted = Vec::with_capacity(live_offsets.len() * SLOT_SIZE);
        for offset in &live_offsets {
            compacted.extend_from_slice(&data[*offset..*offset + SLOT_SIZE]);
        }
        store::write_file(destination, &compacted)?;

        let stats = CompactionStats { surviving: live_offsets.len() as u64, total_before };
        log::info!(
            "Compacted {:?} into {:?}: {} of {} slots kept",
            self.slots.path(),
            destination,
            stats.surviving,
            stats.total_before
        );
        Ok(stats)
    }

    /// Returns true if `path` resolves to the slot file of this store.
    fn is_store_file(&self, path: &Path) -> Result<bool> {
        if path == self.slots.path() {
            return Ok(true);
        }
        match fs::canonicalize(path) {
            Ok(resolved) => Ok(resolved == fs::canonicalize(self.slots.path())?),
            // Nothing there yet, so it cannot be the store file
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Visits every slot in physical order until `visit` breaks.
    fn scan<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(u64, SlotContent) -> ControlFlow<()>,
    {
        let mut cursor = SlotCursor::new(&self.slots);
        let mut visited = 0u64;
        while cursor.advance()? {
            let Some(offset) = cursor.offset() else { break };
            visited += 1;
            if visit(offset, cursor.current()?).is_break() {
                break;
            }
        }
        log::debug!("Scanned {} slots of {:?}", visited, self.slots.path());
        Ok(())
    }

    /// Offset of the first live slot holding `id`.
    fn find_slot(&self, id: i32) -> Result<Option<u64>> {
        let mut found = None;
        self.scan(|offset, content| match content.record() {
            Some(record) if record.id == id => {
                found = Some(offset);
                ControlFlow::Break(())
            }
            _ => ControlFlow::Continue(()),
        })?;
        Ok(found)
    }

    fn next_id(&self) -> Result<i32> {
        let mut max_id = 0;
        self.scan(|_, content| {
            if let Some(record) = content.record() {
                max_id = max_id.max(record.id);
            }
            ControlFlow::Continue(())
        })?;
        max_id.checked_add(1).ok_or_else(|| Error::invalid_state("record ids are exhausted"))
    }

    /// Writes `bytes` as the new file contents through the staging file.
    fn rewrite(&mut self, bytes: &[u8]) -> Result<()> {
        let staging = self.slots.replace_with(bytes)?;
        let backup = self.keep_backup.then(|| self.backup_path());
        swap::promote(&staging, self.slots.path(), backup.as_deref())?;
        self.slots.reopen()
    }

    fn restore_one(&mut self, record: &Record) -> Result<()> {
        if record.id <= 0 {
            return Err(ValidationError::new("id", format!("{} is not positive", record.id)).into());
        }
        let params = record.params();
        self.validator.validate(&params)?;

        match self.find_slot(record.id)? {
            Some(_) => self.update(record.id, params),
            None => {
                let bytes = codec::encode(record)?;
                self.slots.append_slot(&bytes)?;
                Ok(())
            }
        }
    }
}

impl RecordStore for FileRecordStore {
    fn create(&mut self, params: RecordParams) -> Result<i32> {
        self.validator.validate(&params)?;

        let id = self.next_id()?;
        let bytes = codec::encode(&Record::new(id, params))?;
        let offset = self.slots.append_slot(&bytes)?;

        log::debug!("Created record #{} at offset {}", id, offset);
        Ok(id)
    }

    fn update(&mut self, id: i32, params: RecordParams) -> Result<()> {
        self.validator.validate(&params)?;

        let offset = self.find_slot(id)?.ok_or(Error::NotFound(id))?;
        let bytes = codec::encode(&Record::new(id, params))?;
        self.slots.write_slot(offset, &bytes)?;

        log::debug!("Updated record #{} at offset {}", id, offset);
        Ok(())
    }

    fn remove(&mut self, id: i32) -> Result<()> {
        let offset = self.find_slot(id)?.ok_or(Error::NotFound(id))?;
        self.slots.mark_tombstone(offset)?;

        log::debug!("Removed record #{} at offset {}", id, offset);
        Ok(())
    }

    fn insert(&mut self, id: i32, params: RecordParams) -> Result<()> {
        self.validator.validate(&params)?;
        if id <= 0 {
            return Err(Error::invalid_argument(format!("record id {} is not positive", id)));
        }
        let bytes = codec::encode(&Record::new(id, params))?;

        let mut duplicate = false;
        let mut predecessor: Option<(i32, u64)> = None;
        self.scan(|offset, content| {
            if let Some(record) = content.record() {
                if record.id == id {
                    duplicate = true;
                    return ControlFlow::Break(());
                }
                if record.id < id && predecessor.map_or(true, |(prev, _)| record.id > prev) {
                    predecessor = Some((record.id, offset));
                }
            }
            ControlFlow::Continue(())
        })?;

        if duplicate {
            return Err(Error::DuplicateId(id));
        }

        let data = self.slots.read_all()?;
        let split = predecessor.map_or(0, |(_, offset)| offset as usize + SLOT_SIZE);

        let mut replacement = Vec::with_capacity(data.len() + SLOT_SIZE);
        replacement.extend_from_slice(&data[..split]);
        replacement.extend_from_slice(&bytes);
        replacement.extend_from_slice(&data[split..]);

        self.rewrite(&replacement)?;

        log::info!(
            "Inserted record #{} at offset {} of {:?}",
            id,
            split,
            self.slots.path()
        );
        Ok(())
    }

    fn records(&self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        self.scan(|_, content| {
            if let SlotContent::Live(record) = content {
                records.push(record);
            }
            ControlFlow::Continue(())
        })?;
        Ok(records)
    }

    fn stat(&self) -> Result<StoreStat> {
        let total = self.slots.slot_count()?;
        let mut live = 0;
        self.scan(|_, content| {
            if !content.is_tombstoned() {
                live += 1;
            }
            ControlFlow::Continue(())
        })?;
        Ok(StoreStat { total, live })
    }

    fn defragment(&mut self) -> Result<CompactionStats> {
        let staging = swap::staging_path(self.slots.path());
        let stats = self.compact_into(&staging)?;

        let backup = self.keep_backup.then(|| self.backup_path());
        swap::promote(&staging, self.slots.path(), backup.as_deref())?;
        self.slots.reopen()?;

        log::info!(
            "Defragmented {:?}: reclaimed {} slots",
            self.slots.path(),
            stats.reclaimed()
        );
        Ok(stats)
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<RestoreReport> {
        let mut report = RestoreReport::default();

        for record in snapshot.records() {
            match self.restore_one(record) {
                Ok(()) => report.applied += 1,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    log::warn!("Skipping snapshot record #{}: {}", record.id, e);
                    report.failures.push(RestoreFailure { id: record.id, reason: e.to_string() });
                }
            }
        }

        log::info!(
            "Restored {} records into {:?}, {} skipped",
            report.applied,
            self.slots.path(),
            report.failures.len()
        );
        Ok(report)
    }
}
