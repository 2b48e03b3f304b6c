//! Fixed-layout slot file.
//!
//! A slot file is a plain sequence of 277-byte slots. Each slot holds one
//! encoded record together with a 16-bit flag word; bit 2 of the flags marks
//! the slot as tombstoned. There is no header, footer or index: the slot
//! index of a record is simply its byte offset divided by [`SLOT_SIZE`].
//!
//! ## Layout
//!
//! | Field       | Bytes       | Encoding                          |
//! |-------------|-------------|-----------------------------------|
//! | flags       | `[0, 2)`    | `i16` LE                          |
//! | id          | `[2, 6)`    | `i32` LE                          |
//! | first name  | `[6, 126)`  | UTF-16LE, zero padded             |
//! | last name   | `[126, 246)`| UTF-16LE, zero padded             |
//! | birth year  | `[246, 250)`| `i32` LE                          |
//! | birth month | `[250, 254)`| `i32` LE                          |
//! | birth day   | `[254, 258)`| `i32` LE                          |
//! | prop_short  | `[258, 260)`| `i16` LE                          |
//! | prop_decimal| `[260, 276)`| 128-bit decimal (lo, mid, hi, flags) |
//! | prop_char   | `[276, 277)`| one byte (U+0000..=U+00FF)        |
//!
//! ## Components
//!
//! - [`codec`]: encodes a [`Record`](crate::Record) into a slot and back
//! - [`store`]: owns the file handle and performs whole-slot I/O
//! - [`cursor`]: forward-only scan that reports each slot as live or tombstoned

pub mod codec;
pub mod cursor;
pub mod store;

pub use codec::{decode, encode, SlotContent};
pub use cursor::SlotCursor;
pub use store::SlotStore;

/// Size of one slot in bytes.
pub const SLOT_SIZE: usize = 277;

/// Flag bit that marks a slot as logically deleted.
pub const TOMBSTONE_FLAG: i16 = 1 << 2;

/// Width in bytes of each name field.
pub const NAME_WIDTH: usize = 120;

/// Maximum number of UTF-16 code units a name field can hold.
pub const NAME_UNITS: usize = NAME_WIDTH / 2;

/// Offset of the flag word.
pub const FLAGS_OFFSET: usize = 0;
/// Offset of the record id.
pub const ID_OFFSET: usize = 2;
/// Offset of the first name.
pub const FIRST_NAME_OFFSET: usize = 6;
/// Offset of the last name.
pub const LAST_NAME_OFFSET: usize = FIRST_NAME_OFFSET + NAME_WIDTH;
/// Offset of the birth year.
pub const YEAR_OFFSET: usize = LAST_NAME_OFFSET + NAME_WIDTH;
/// Offset of the birth month.
pub const MONTH_OFFSET: usize = YEAR_OFFSET + 4;
/// Offset of the birth day.
pub const DAY_OFFSET: usize = MONTH_OFFSET + 4;
/// Offset of the short property.
pub const PROP_SHORT_OFFSET: usize = DAY_OFFSET + 4;
/// Offset of the decimal property.
pub const PROP_DECIMAL_OFFSET: usize = PROP_SHORT_OFFSET + 2;
/// Offset of the character property.
pub const PROP_CHAR_OFFSET: usize = PROP_DECIMAL_OFFSET + 16;

/// Byte offset of the slot at `index`.
pub fn slot_offset(index: u64) -> u64 {
    index * SLOT_SIZE as u64
}

/// Slot index of the slot that starts at `offset`.
pub fn slot_index(offset: u64) -> u64 {
    offset / SLOT_SIZE as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_offsets() {
        assert_eq!(LAST_NAME_OFFSET, 126);
        assert_eq!(YEAR_OFFSET, 246);
        assert_eq!(MONTH_OFFSET, 250);
        assert_eq!(DAY_OFFSET, 254);
        assert_eq!(PROP_SHORT_OFFSET, 258);
        assert_eq!(PROP_DECIMAL_OFFSET, 260);
        assert_eq!(PROP_CHAR_OFFSET, 276);
        assert_eq!(PROP_CHAR_OFFSET + 1, SLOT_SIZE);
    }

    #[test]
    fn test_slot_offset_and_index() {
        assert_eq!(slot_offset(0), 0);
        assert_eq!(slot_offset(3), 831);
        assert_eq!(slot_index(831), 3);
        assert_eq!(slot_index(slot_offset(42)), 42);
    }
}
