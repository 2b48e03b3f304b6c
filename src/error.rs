//! Error types for the recordbook store.

use std::io;

use thiserror::Error;

use crate::validation::ValidationError;

/// The result type used throughout recordbook.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for recordbook operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying file could not be read, written or seeked.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A slot could not be decoded: the buffer is too short or holds
    /// values that cannot belong to a record.
    #[error("Corrupt slot: {0}")]
    CorruptSlot(String),

    /// A field violates the active validation rules.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// An ordered insert targeted an id that is already live.
    #[error("Record #{0} already exists")]
    DuplicateId(i32),

    /// No live record carries the requested id.
    #[error("Record #{0} not found")]
    NotFound(i32),

    /// An argument cannot be represented in the slot layout or is otherwise invalid.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The store or cursor is in a state that does not allow the operation.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A snapshot document could not be read or written.
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl Error {
    /// Creates a new corrupt slot error.
    pub fn corrupt_slot(msg: impl Into<String>) -> Self {
        Error::CorruptSlot(msg.into())
    }

    /// Creates a new invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Creates a new invalid state error.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Error::InvalidState(msg.into())
    }

    /// Returns true when the error means the backing medium is unusable.
    ///
    /// Batch operations skip records that fail for any other reason but
    /// abort on fatal errors.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Io(_) | Error::CorruptSlot(_))
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        if !err.is_io_error() {
            return Error::Snapshot(err.to_string());
        }
        match err.into_kind() {
            csv::ErrorKind::Io(io_err) => Error::Io(io_err),
            kind => Error::Snapshot(format!("{:?}", kind)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            return Error::Io(err.into());
        }
        Error::Snapshot(err.to_string())
    }
}
