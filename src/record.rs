//! The personal record model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Field values of a record, without its id.
///
/// This is what callers hand to `create`, `update` and `insert`; the store
/// decides (or is told) the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordParams {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Date of birth.
    pub date_of_birth: NaiveDate,
    /// Small integer property.
    pub prop_short: i16,
    /// Fixed-point decimal property.
    #[serde(with = "rust_decimal::serde::str")]
    pub prop_decimal: Decimal,
    /// Single character property.
    pub prop_char: char,
}

/// A stored personal record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Unique, positive identifier.
    pub id: i32,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Date of birth.
    pub date_of_birth: NaiveDate,
    /// Small integer property.
    pub prop_short: i16,
    /// Fixed-point decimal property.
    #[serde(with = "rust_decimal::serde::str")]
    pub prop_decimal: Decimal,
    /// Single character property.
    pub prop_char: char,
}

impl Record {
    /// Builds a record from an id and its field values.
    pub fn new(id: i32, params: RecordParams) -> Self {
        let RecordParams {
            first_name,
            last_name,
            date_of_birth,
            prop_short,
            prop_decimal,
            prop_char,
        } = params;
        Self { id, first_name, last_name, date_of_birth, prop_short, prop_decimal, prop_char }
    }

    /// Returns the field values of this record without the id.
    pub fn params(&self) -> RecordParams {
        RecordParams {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            date_of_birth: self.date_of_birth,
            prop_short: self.prop_short,
            prop_decimal: self.prop_decimal,
            prop_char: self.prop_char,
        }
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{}, {}, {}, {}, {}, {}, {}",
            self.id,
            self.first_name,
            self.last_name,
            self.date_of_birth.format("%Y-%b-%d"),
            self.prop_short,
            self.prop_decimal,
            self.prop_char
        )
    }
}

/// Search criteria for `find`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordQuery {
    /// Case-insensitive match on the first name.
    FirstName(String),
    /// Case-insensitive match on the last name.
    LastName(String),
    /// Exact match on the date of birth.
    DateOfBirth(NaiveDate),
}

impl RecordQuery {
    /// Returns true if `record` satisfies the query.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            RecordQuery::FirstName(name) => record.first_name.to_lowercase() == name.to_lowercase(),
            RecordQuery::LastName(name) => record.last_name.to_lowercase() == name.to_lowercase(),
            RecordQuery::DateOfBirth(date) => record.date_of_birth == *date,
        }
    }
}
