//! CSV snapshot codec.
//!
//! Columns: `id,first_name,last_name,date_of_birth,prop_short,prop_decimal,prop_char`.
//! Dates are ISO `YYYY-MM-DD`.

use std::io::{Read, Write};

use csv::{ReaderBuilder, Trim, WriterBuilder};

use super::{LoadedSnapshot, SkippedEntry, Snapshot};
use crate::error::Result;
use crate::record::Record;

/// Writes `snapshot` as CSV with a header row.
pub fn write<W: Write>(snapshot: &Snapshot, writer: W) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for record in snapshot.records() {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads CSV produced by [`write`], skipping rows that do not parse.
pub fn read<R: Read>(reader: R) -> Result<LoadedSnapshot> {
    let mut reader = ReaderBuilder::new().has_headers(true).trim(Trim::All).from_reader(reader);

    let mut records = Vec::new();
    let mut skipped = Vec::new();
    for (row, result) in reader.deserialize::<Record>().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let position = e.position().map_or(row as u64 + 2, |p| p.line());
                log::warn!("Skipping CSV line {}: {}", position, e);
                skipped.push(SkippedEntry { position, reason: e.to_string() });
            }
        }
    }

    Ok(LoadedSnapshot { snapshot: Snapshot::new(records), skipped })
}
