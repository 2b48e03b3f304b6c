//! # recordbook - A Personal Record Manager
//!
//! recordbook stores personal records in a single binary file made of
//! fixed-size slots. Every record occupies exactly one 277-byte slot, so a
//! record can be found, overwritten or deleted by plain offset arithmetic.
//!
//! ## Architecture
//!
//! The storage engine consists of a few small layers:
//!
//! - **Slot codec**: fixed-width binary encoding of one record
//! - **Slot store**: owns the file handle and performs whole-slot reads and writes
//! - **Slot cursor**: forward-only scan reporting each slot as live or tombstoned
//! - **File record store**: create, update, tombstone delete, ordered insert,
//!   defragmentation and snapshot restore on top of the layers above
//!
//! Around the engine sit the [`RecordStore`] capability trait, an in-memory
//! variant, logging and timing decorators, a composable [`Validator`] and
//! CSV/JSON snapshot codecs.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use recordbook::{FileRecordStore, Options, RecordParams, RecordStore};
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! # fn main() -> Result<(), recordbook::Error> {
//! // Open or create a slot file
//! let mut store = FileRecordStore::open("./records.bin", Options::default())?;
//!
//! // Create a record; the store picks the id
//! let id = store.create(RecordParams {
//!     first_name: "Alice".to_string(),
//!     last_name: "Smith".to_string(),
//!     date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
//!     prop_short: 1,
//!     prop_decimal: Decimal::new(15, 1),
//!     prop_char: 'A',
//! })?;
//!
//! // Delete it and reclaim the slot
//! store.remove(id)?;
//! store.defragment()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Module declarations
pub mod config;
pub mod decorator;
pub mod engine;
pub mod error;
pub mod memory;
pub mod record;
pub mod slot;
pub mod snapshot;
pub mod store;
pub mod swap;
pub mod validation;

// Re-exports
pub use config::{Options, ValidationProfile};
pub use decorator::{LoggingStore, TimingStore};
pub use engine::FileRecordStore;
pub use error::{Error, Result};
pub use memory::MemoryRecordStore;
pub use record::{Record, RecordParams, RecordQuery};
pub use snapshot::{LoadedSnapshot, Snapshot, SnapshotFormat};
pub use store::{CompactionStats, RecordStore, RestoreFailure, RestoreReport, StoreStat};
pub use validation::{ValidationError, Validator};
