//! JSON snapshot codec: an array of record objects.

use std::io::{Read, Write};

use serde_json::Value;

use super::{LoadedSnapshot, SkippedEntry, Snapshot};
use crate::error::Result;
use crate::record::Record;

/// Writes `snapshot` as a pretty-printed JSON array.
pub fn write<W: Write>(snapshot: &Snapshot, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, snapshot.records())?;
    Ok(())
}

/// Reads a JSON array of records, skipping elements that do not parse.
///
/// A document that is not a JSON array fails as a whole.
pub fn read<R: Read>(reader: R) -> Result<LoadedSnapshot> {
    let values: Vec<Value> = serde_json::from_reader(reader)?;

    let mut records = Vec::with_capacity(values.len());
    let mut skipped = Vec::new();
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<Record>(value) {
            Ok(record) => records.push(record),
            Err(e) => {
                log::warn!("Skipping JSON element {}: {}", index, e);
                skipped.push(SkippedEntry { position: index as u64, reason: e.to_string() });
            }
        }
    }

    Ok(LoadedSnapshot { snapshot: Snapshot::new(records), skipped })
}
