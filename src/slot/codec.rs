//! Slot codec: one [`Record`] to and from one fixed-size slot buffer.
//!
//! Name fields are written as UTF-16LE and padded with zero bytes. On the way
//! back only letters and digits survive: the padding is dropped, but so is
//! any punctuation or whitespace that was part of the name.

use bytes::{Buf, BufMut, BytesMut};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::{NAME_UNITS, NAME_WIDTH, SLOT_SIZE, TOMBSTONE_FLAG};
use crate::error::{Error, Result};
use crate::record::Record;

/// What a slot holds once its flags have been read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotContent {
    /// A live record.
    Live(Record),
    /// A deleted slot whose payload must not be interpreted.
    Tombstoned,
}

impl SlotContent {
    /// Returns the record if the slot is live.
    pub fn into_record(self) -> Option<Record> {
        match self {
            SlotContent::Live(record) => Some(record),
            SlotContent::Tombstoned => None,
        }
    }

    /// Returns a reference to the record if the slot is live.
    pub fn record(&self) -> Option<&Record> {
        match self {
            SlotContent::Live(record) => Some(record),
            SlotContent::Tombstoned => None,
        }
    }

    /// Returns true if the slot is tombstoned.
    pub fn is_tombstoned(&self) -> bool {
        matches!(self, SlotContent::Tombstoned)
    }
}

/// Encode a record into a slot buffer of exactly [`SLOT_SIZE`] bytes.
///
/// The flag word is written as zero (live).
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if a name needs more than
/// [`NAME_UNITS`] UTF-16 code units or `prop_char` is outside U+0000..=U+00FF.
pub fn encode(record: &Record) -> Result<Vec<u8>> {
    let mut buf = BytesMut::with_capacity(SLOT_SIZE);

    buf.put_i16_le(0);
    buf.put_i32_le(record.id);

    put_name(&mut buf, "first name", &record.first_name)?;
    put_name(&mut buf, "last name", &record.last_name)?;

    buf.put_i32_le(record.date_of_birth.year());
    buf.put_i32_le(record.date_of_birth.month() as i32);
    buf.put_i32_le(record.date_of_birth.day() as i32);

    buf.put_i16_le(record.prop_short);
    put_decimal(&mut buf, record.prop_decimal);

    let prop_char = u8::try_from(record.prop_char).map_err(|_| {
        Error::invalid_argument(format!(
            "character {:?} does not fit in a single byte",
            record.prop_char
        ))
    })?;
    buf.put_u8(prop_char);

    debug_assert_eq!(buf.len(), SLOT_SIZE);
    Ok(buf.to_vec())
}

/// Decode a slot buffer.
///
/// The flags are read first; a tombstoned slot is reported without looking at
/// the rest of the buffer.
///
/// # Errors
///
/// Returns [`Error::CorruptSlot`] if the buffer is shorter than a slot or the
/// stored birth date is not a calendar date.
pub fn decode(mut data: &[u8]) -> Result<SlotContent> {
    if data.len() < SLOT_SIZE {
        return Err(Error::corrupt_slot(format!(
            "slot too short: {} bytes, expected {}",
            data.len(),
            SLOT_SIZE
        )));
    }

    let flags = data.get_i16_le();
    if is_tombstone(flags) {
        return Ok(SlotContent::Tombstoned);
    }

    let id = data.get_i32_le();
    let first_name = take_name(&mut data);
    let last_name = take_name(&mut data);

    let year = data.get_i32_le();
    let month = data.get_i32_le();
    let day = data.get_i32_le();
    let date_of_birth = calendar_date(year, month, day).ok_or_else(|| {
        Error::corrupt_slot(format!(
            "record #{} has invalid birth date {}-{}-{}",
            id, year, month, day
        ))
    })?;

    let prop_short = data.get_i16_le();
    let prop_decimal = take_decimal(&mut data);
    let prop_char = char::from(data.get_u8());

    Ok(SlotContent::Live(Record {
        id,
        first_name,
        last_name,
        date_of_birth,
        prop_short,
        prop_decimal,
        prop_char,
    }))
}

/// Read the flag word at the start of a slot buffer.
pub fn read_flags(data: &[u8]) -> Result<i16> {
    if data.len() < 2 {
        return Err(Error::corrupt_slot(format!("flags need 2 bytes, got {}", data.len())));
    }
    Ok(i16::from_le_bytes([data[0], data[1]]))
}

/// Returns true if the tombstone bit is set in `flags`.
pub fn is_tombstone(flags: i16) -> bool {
    flags & TOMBSTONE_FLAG != 0
}

fn put_name(buf: &mut BytesMut, field: &str, name: &str) -> Result<()> {
    let units: Vec<u16> = name.encode_utf16().collect();
    if units.len() > NAME_UNITS {
        return Err(Error::invalid_argument(format!(
            "{} is {} UTF-16 units long, at most {} fit in a slot",
            field,
            units.len(),
            NAME_UNITS
        )));
    }

    for unit in &units {
        buf.put_u16_le(*unit);
    }
    buf.put_bytes(0, NAME_WIDTH - units.len() * 2);
    Ok(())
}

fn take_name(data: &mut &[u8]) -> String {
    let raw = &data[..NAME_WIDTH];
    let units = raw.chunks_exact(2).map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    let name = char::decode_utf16(units)
        .filter_map(|c| c.ok())
        .filter(|c| c.is_alphanumeric())
        .collect();
    data.advance(NAME_WIDTH);
    name
}

// Stored in the .NET decimal order: lo, mid, hi, then the flags word holding
// sign and scale. `Decimal::serialize` puts the flags first.
fn put_decimal(buf: &mut BytesMut, value: Decimal) {
    let raw = value.serialize();
    buf.put_slice(&raw[4..16]);
    buf.put_slice(&raw[0..4]);
}

fn take_decimal(data: &mut &[u8]) -> Decimal {
    let mut raw = [0u8; 16];
    raw[4..16].copy_from_slice(&data[..12]);
    raw[0..4].copy_from_slice(&data[12..16]);
    data.advance(16);
    Decimal::deserialize(raw)
}

fn calendar_date(year: i32, month: i32, day: i32) -> Option<NaiveDate> {
    let month = u32::try_from(month).ok()?;
    let day = u32::try_from(day).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
