//! Slot store: whole-slot I/O against the backing file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::{codec, SLOT_SIZE, TOMBSTONE_FLAG};
use crate::config::Options;
use crate::error::{Error, Result};
use crate::swap;

/// Owner of the slot file handle.
///
/// Every write covers a whole slot (or, for tombstoning, the flag word of one),
/// so the file length stays a multiple of [`SLOT_SIZE`]. With `sync_writes`
/// on, each write is synced to the device before the call returns.
pub struct SlotStore {
    /// Path to the canonical slot file
    path: PathBuf,
    /// Open read/write handle; `None` once a reopen has failed
    file: Option<File>,
    /// fsync after each write
    sync_writes: bool,
}

impl SlotStore {
    /// Open the slot file at `path`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] if the file is missing and
    ///   `create_if_missing` is off, or exists and `error_if_exists` is on
    /// - [`Error::CorruptSlot`] if the file length is not a whole number of slots
    pub fn open<P: AsRef<Path>>(path: P, options: &Options) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if path.exists() {
            if options.error_if_exists {
                return Err(Error::invalid_state(format!(
                    "slot file already exists: {}",
                    path.display()
                )));
            }
        } else if !options.create_if_missing {
            return Err(Error::invalid_state(format!(
                "slot file does not exist: {}",
                path.display()
            )));
        }

        let file = OpenOptions::new().read(true).write(true).create(true).open(&path)?;
        let store = Self { path, file: Some(file), sync_writes: options.sync_writes };
        store.check_length()?;

        log::debug!("Opened slot file {:?} with {} slots", store.path, store.slot_count()?);
        Ok(store)
    }

    /// Reopen the handle against the canonical path.
    ///
    /// Required after the file was swapped underneath this store. The old
    /// handle is dropped first: if the open fails, every later call returns
    /// [`Error::InvalidState`] instead of touching the replaced file.
    pub fn reopen(&mut self) -> Result<()> {
        self.file = None;
        let file = OpenOptions::new().read(true).write(true).open(&self.path)?;
        self.file = Some(file);
        self.check_length()
    }

    fn file(&self) -> Result<&File> {
        self.file.as_ref().ok_or_else(|| {
            Error::invalid_state(format!("slot file {:?} has no open handle", self.path))
        })
    }

    fn check_length(&self) -> Result<()> {
        let len = self.len()?;
        if len % SLOT_SIZE as u64 != 0 {
            return Err(Error::corrupt_slot(format!(
                "file length {} of {:?} is not a multiple of the slot size {}",
                len, self.path, SLOT_SIZE
            )));
        }
        Ok(())
    }

    /// Path of the canonical slot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current file length in bytes.
    pub fn len(&self) -> Result<u64> {
        Ok(self.file()?.metadata()?.len())
    }

    /// Returns true if the file holds no slots.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Number of slots in the file, live and tombstoned.
    pub fn slot_count(&self) -> Result<u64> {
        Ok(self.len()? / SLOT_SIZE as u64)
    }

    /// Read the entire file into memory.
    pub fn read_all(&self) -> Result<Vec<u8>> {
        let mut file = self.file()?;
        file.seek(SeekFrom::Start(0))?;

        let mut buf = Vec::with_capacity(self.len()? as usize);
        file.read_to_end(&mut buf)?;

        if buf.len() % SLOT_SIZE != 0 {
            return Err(Error::corrupt_slot(format!(
                "read {} bytes, not a multiple of the slot size {}",
                buf.len(),
                SLOT_SIZE
            )));
        }
        Ok(buf)
    }

    /// Overwrite the slot that starts at `offset`.
    pub fn write_slot(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        check_slot_bytes(bytes)?;
        self.check_existing_offset(offset)?;

        let mut file = self.file()?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(bytes)?;
        self.sync()?;

        log::debug!("Wrote slot at offset {} of {:?}", offset, self.path);
        Ok(())
    }

    /// Set the tombstone bit of the slot at `offset`.
    ///
    /// Only the two flag bytes are written; the payload stays on disk as is.
    pub fn mark_tombstone(&mut self, offset: u64) -> Result<()> {
        self.check_existing_offset(offset)?;

        let mut flags = [0u8; 2];
        let mut file = self.file()?;
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(&mut flags)?;
        let flags = codec::read_flags(&flags)? | TOMBSTONE_FLAG;

        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&flags.to_le_bytes())?;
        self.sync()?;

        log::debug!("Tombstoned slot at offset {} of {:?}", offset, self.path);
        Ok(())
    }

    /// Append one slot at the end of the file and return its offset.
    pub fn append_slot(&mut self, bytes: &[u8]) -> Result<u64> {
        check_slot_bytes(bytes)?;

        let mut file = self.file()?;
        let offset = file.seek(SeekFrom::End(0))?;
        file.write_all(bytes)?;
        self.sync()?;

        log::debug!("Appended slot at offset {} of {:?}", offset, self.path);
        Ok(offset)
    }

    /// Write a complete replacement file to the staging path.
    ///
    /// The canonical file is left untouched; the caller promotes the returned
    /// staging path with [`swap::promote`] and then calls [`reopen`](Self::reopen).
    pub fn replace_with(&self, new_bytes: &[u8]) -> Result<PathBuf> {
        let staging = swap::staging_path(&self.path);
        write_file(&staging, new_bytes)?;
        Ok(staging)
    }

    fn check_existing_offset(&self, offset: u64) -> Result<()> {
        if offset % SLOT_SIZE as u64 != 0 {
            return Err(Error::invalid_argument(format!(
                "offset {} is not on a slot boundary",
                offset
            )));
        }
        let len = self.len()?;
        if offset + SLOT_SIZE as u64 > len {
            return Err(Error::invalid_argument(format!(
                "offset {} is past the last slot (file length {})",
                offset, len
            )));
        }
        Ok(())
    }

    // `File` has no user-space buffer; without `sync_data` a write only
    // reaches the OS page cache.
    fn sync(&self) -> Result<()> {
        if self.sync_writes {
            self.file()?.sync_data()?;
        }
        Ok(())
    }
}

/// Write `bytes` as a complete slot file at `path` and sync it to disk.
///
/// An existing file at `path` is truncated.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if bytes.len() % SLOT_SIZE != 0 {
        return Err(Error::invalid_argument(format!(
            "{} bytes is not a whole number of slots",
            bytes.len()
        )));
    }

    let file = OpenOptions::new().create(true).write(true).truncate(true).open(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;

    let file = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    file.sync_all()?;

    log::debug!("Wrote {} slots to {:?}", bytes.len() / SLOT_SIZE, path);
    Ok(())
}

fn check_slot_bytes(bytes: &[u8]) -> Result<()> {
    if bytes.len() != SLOT_SIZE {
        return Err(Error::invalid_argument(format!(
            "slot write of {} bytes, expected {}",
            bytes.len(),
            SLOT_SIZE
        )));
    }
    Ok(())
}
