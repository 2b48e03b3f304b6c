//! Forward-only cursor over the slots of a [`SlotStore`].

use super::codec::{self, SlotContent};
use super::store::SlotStore;
use super::{slot_offset, SLOT_SIZE};
use crate::error::{Error, Result};

/// Where a [`SlotCursor`] currently points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorPosition {
    /// Before the first slot; `current` is not available.
    BeforeStart,
    /// On the slot with the given index.
    At(u64),
}

/// A stateful forward-only scan over a slot file.
///
/// The cursor keeps no copy of the file: every call to
/// [`current`](Self::current) reads the file again, so it always sees what is
/// on disk at that moment.
///
/// # Example
///
/// ```rust,no_run
/// use recordbook::slot::{SlotContent, SlotCursor, SlotStore};
/// use recordbook::Options;
///
/// # fn main() -> Result<(), recordbook::Error> {
/// let store = SlotStore::open("records.bin", &Options::default())?;
/// let mut cursor = SlotCursor::new(&store);
///
/// while cursor.advance()? {
///     match cursor.current()? {
///         SlotContent::Live(record) => println!("{}", record),
///         SlotContent::Tombstoned => continue,
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct SlotCursor<'a> {
    store: &'a SlotStore,
    position: CursorPosition,
}

impl<'a> SlotCursor<'a> {
    /// Create a cursor positioned before the first slot.
    pub fn new(store: &'a SlotStore) -> Self {
        Self { store, position: CursorPosition::BeforeStart }
    }

    /// Move to the next slot.
    ///
    /// Returns `false` and stays put if there is no next slot.
    pub fn advance(&mut self) -> Result<bool> {
        let next = match self.position {
            CursorPosition::BeforeStart => 0,
            CursorPosition::At(index) => index + 1,
        };

        if slot_offset(next) + SLOT_SIZE as u64 > self.store.len()? {
            return Ok(false);
        }

        self.position = CursorPosition::At(next);
        Ok(true)
    }

    /// Decode the slot under the cursor.
    ///
    /// A tombstoned slot is reported as [`SlotContent::Tombstoned`]; callers
    /// scanning the file skip it rather than treat it as an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the cursor has not been advanced
    /// onto a slot, and [`Error::CorruptSlot`] if the slot cannot be decoded.
    pub fn current(&self) -> Result<SlotContent> {
        let offset = self.offset().ok_or_else(|| {
            Error::invalid_state("cursor is positioned before the first slot")
        })? as usize;

        let data = self.store.read_all()?;
        let end = (offset + SLOT_SIZE).min(data.len());
        codec::decode(&data[offset.min(end)..end])
    }

    /// Return to the position before the first slot.
    pub fn reset(&mut self) {
        self.position = CursorPosition::BeforeStart;
    }

    /// Current position.
    pub fn position(&self) -> CursorPosition {
        self.position
    }

    /// Byte offset of the current slot, if positioned on one.
    pub fn offset(&self) -> Option<u64> {
        match self.position {
            CursorPosition::BeforeStart => None,
            CursorPosition::At(index) => Some(slot_offset(index)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;
    use crate::record::Record;
    use crate::slot::codec::encode;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use tempfile::NamedTempFile;

    fn record(id: i32) -> Record {
        Record {
            id,
            first_name: format!("First{}", id),
            last_name: "Last".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1980, 6, 15).unwrap(),
            prop_short: id as i16,
            prop_decimal: Decimal::new(id as i64, 0),
            prop_char: 'x',
        }
    }

    #[test]
    fn test_empty_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = SlotStore::open(temp_file.path(), &Options::default()).unwrap();
        let mut cursor = SlotCursor::new(&store);

        assert!(!cursor.advance().unwrap());
        assert_eq!(cursor.position(), CursorPosition::BeforeStart);
        assert!(matches!(cursor.current(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_scan_live_and_tombstoned() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut store = SlotStore::open(temp_file.path(), &Options::default()).unwrap();
        for id in 1..=3 {
            store.append_slot(&encode(&record(id)).unwrap()).unwrap();
        }
        store.mark_tombstone(slot_offset(1)).unwrap();

        let mut cursor = SlotCursor::new(&store);
        let mut seen = Vec::new();
        while cursor.advance().unwrap() {
            seen.push(cursor.current().unwrap());
        }

        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], SlotContent::Live(record(1)));
        assert!(seen[1].is_tombstoned());
        assert_eq!(seen[2], SlotContent::Live(record(3)));
        assert_eq!(cursor.position(), CursorPosition::At(2));
    }

    #[test]
    fn test_current_rereads_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut store = SlotStore::open(temp_file.path(), &Options::default()).unwrap();
        store.append_slot(&encode(&record(1)).unwrap()).unwrap();

        {
            let mut cursor = SlotCursor::new(&store);
            assert!(cursor.advance().unwrap());
            assert_eq!(cursor.offset(), Some(0));
            assert!(!cursor.current().unwrap().is_tombstoned());
        }

        store.mark_tombstone(0).unwrap();

        let mut cursor = SlotCursor::new(&store);
        cursor.advance().unwrap();
        assert!(cursor.current().unwrap().is_tombstoned());
    }

    #[test]
    fn test_reset() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut store = SlotStore::open(temp_file.path(), &Options::default()).unwrap();
        store.append_slot(&encode(&record(1)).unwrap()).unwrap();
        store.append_slot(&encode(&record(2)).unwrap()).unwrap();

        let mut cursor = SlotCursor::new(&store);
        cursor.advance().unwrap();
        cursor.advance().unwrap();
        assert!(!cursor.advance().unwrap());
        assert_eq!(cursor.position(), CursorPosition::At(1));

        cursor.reset();
        assert_eq!(cursor.position(), CursorPosition::BeforeStart);
        assert!(cursor.advance().unwrap());
        assert_eq!(cursor.current().unwrap().into_record().unwrap().id, 1);
    }
}
