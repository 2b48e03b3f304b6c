//! Record validation.
//!
//! A [`Validator`] is an ordered list of independent rules. Each rule looks at
//! the field values of a record and either accepts them or names the field it
//! rejects. Rules run in insertion order and the first failure wins.
//!
//! ```rust
//! use recordbook::validation::{self, Validator};
//!
//! let validator = Validator::new()
//!     .with_rule(validation::first_name_length(2, 20))
//!     .with_rule(validation::prop_short_range(0, 100));
//! assert_eq!(validator.len(), 2);
//! ```

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::ValidationProfile;
use crate::record::RecordParams;

/// A field that violates a validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Name of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

/// A single validation rule.
pub type Rule = Box<dyn Fn(&RecordParams) -> Result<(), ValidationError>>;

/// An ordered, composable set of validation rules.
#[derive(Default)]
pub struct Validator {
    rules: Vec<Rule>,
}

impl Validator {
    /// Creates a validator with no rules; it accepts everything.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Adds a rule and returns the validator.
    pub fn with_rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&RecordParams) -> Result<(), ValidationError> + 'static,
    {
        self.push(rule);
        self
    }

    /// Adds a rule at the end of the list.
    pub fn push<F>(&mut self, rule: F)
    where
        F: Fn(&RecordParams) -> Result<(), ValidationError> + 'static,
    {
        self.rules.push(Box::new(rule));
    }

    /// Removes all rules.
    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs every rule in order and returns the first failure.
    pub fn validate(&self, params: &RecordParams) -> Result<(), ValidationError> {
        self.rules.iter().try_for_each(|rule| rule(params))
    }

    /// Builds the validator for a built-in profile.
    pub fn for_profile(profile: ValidationProfile) -> Self {
        match profile {
            ValidationProfile::Default => Self::default_rules(),
            ValidationProfile::Custom => Self::custom_rules(),
        }
    }

    /// The standard rule set.
    pub fn default_rules() -> Self {
        Self::new()
            .with_rule(first_name_length(2, 60))
            .with_rule(last_name_length(2, 60))
            .with_rule(date_of_birth_range(ymd(1950, 1, 1)))
            .with_rule(prop_short_range(0, i16::MAX))
            .with_rule(prop_decimal_range(Decimal::ZERO, Decimal::new(1_000_000, 0)))
            .with_rule(prop_char_rule("a letter or digit", |c| c.is_alphanumeric()))
    }

    /// The stricter custom rule set.
    pub fn custom_rules() -> Self {
        Self::new()
            .with_rule(first_name_length(3, 30))
            .with_rule(last_name_length(3, 30))
            .with_rule(letters_only("first_name", |p| p.first_name.as_str()))
            .with_rule(letters_only("last_name", |p| p.last_name.as_str()))
            .with_rule(date_of_birth_range(ymd(1900, 1, 1)))
            .with_rule(prop_short_range(1, 1000))
            .with_rule(prop_decimal_range(Decimal::ZERO, Decimal::new(10_000, 0)))
            .with_rule(prop_char_rule("an uppercase ASCII letter", |c| c.is_ascii_uppercase()))
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator").field("rules", &self.rules.len()).finish()
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

fn name_length(
    field: &'static str,
    get: fn(&RecordParams) -> &str,
    min: usize,
    max: usize,
) -> impl Fn(&RecordParams) -> Result<(), ValidationError> {
    move |params| {
        let name = get(params);
        if name.trim().is_empty() {
            return Err(ValidationError::new(field, "must not be blank"));
        }
        let len = name.chars().count();
        if len < min || len > max {
            return Err(ValidationError::new(
                field,
                format!("length {} is outside {}..={}", len, min, max),
            ));
        }
        Ok(())
    }
}

/// First name must be non-blank with `min..=max` characters.
pub fn first_name_length(
    min: usize,
    max: usize,
) -> impl Fn(&RecordParams) -> Result<(), ValidationError> {
    name_length("first_name", |p| p.first_name.as_str(), min, max)
}

/// Last name must be non-blank with `min..=max` characters.
pub fn last_name_length(
    min: usize,
    max: usize,
) -> impl Fn(&RecordParams) -> Result<(), ValidationError> {
    name_length("last_name", |p| p.last_name.as_str(), min, max)
}

/// The selected name must consist of letters only.
pub fn letters_only(
    field: &'static str,
    get: fn(&RecordParams) -> &str,
) -> impl Fn(&RecordParams) -> Result<(), ValidationError> {
    move |params| {
        if get(params).chars().all(char::is_alphabetic) {
            Ok(())
        } else {
            Err(ValidationError::new(field, "must contain letters only"))
        }
    }
}

/// Date of birth must lie between `min` and today, inclusive.
pub fn date_of_birth_range(
    min: NaiveDate,
) -> impl Fn(&RecordParams) -> Result<(), ValidationError> {
    move |params| {
        let today = chrono::Local::now().date_naive();
        let date = params.date_of_birth;
        if date < min || date > today {
            return Err(ValidationError::new(
                "date_of_birth",
                format!("{} is outside {}..={}", date, min, today),
            ));
        }
        Ok(())
    }
}

/// `prop_short` must lie in `min..=max`.
pub fn prop_short_range(
    min: i16,
    max: i16,
) -> impl Fn(&RecordParams) -> Result<(), ValidationError> {
    move |params| {
        if (min..=max).contains(&params.prop_short) {
            Ok(())
        } else {
            Err(ValidationError::new(
                "prop_short",
                format!("{} is outside {}..={}", params.prop_short, min, max),
            ))
        }
    }
}

/// `prop_decimal` must lie in `min..=max`.
pub fn prop_decimal_range(
    min: Decimal,
    max: Decimal,
) -> impl Fn(&RecordParams) -> Result<(), ValidationError> {
    move |params| {
        if params.prop_decimal >= min && params.prop_decimal <= max {
            Ok(())
        } else {
            Err(ValidationError::new(
                "prop_decimal",
                format!("{} is outside {}..={}", params.prop_decimal, min, max),
            ))
        }
    }
}

/// `prop_char` must satisfy `accept`; `expected` describes it in the error.
pub fn prop_char_rule(
    expected: &'static str,
    accept: fn(char) -> bool,
) -> impl Fn(&RecordParams) -> Result<(), ValidationError> {
    move |params| {
        if accept(params.prop_char) {
            Ok(())
        } else {
            Err(ValidationError::new(
                "prop_char",
                format!("{:?} is not {}", params.prop_char, expected),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> RecordParams {
        RecordParams {
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            date_of_birth: ymd(1990, 1, 1),
            prop_short: 1,
            prop_decimal: Decimal::new(15, 1),
            prop_char: 'A',
        }
    }

    #[test]
    fn test_empty_validator_accepts_everything() {
        let validator = Validator::new();
        assert!(validator.is_empty());

        let mut p = params();
        p.first_name = String::new();
        assert!(validator.validate(&p).is_ok());
    }

    #[test]
    fn test_default_rules() {
        let validator = Validator::default_rules();
        assert!(validator.validate(&params()).is_ok());

        let mut p = params();
        p.first_name = "A".to_string();
        assert_eq!(validator.validate(&p).unwrap_err().field, "first_name");

        let mut p = params();
        p.last_name = "   ".to_string();
        assert_eq!(validator.validate(&p).unwrap_err().field, "last_name");

        let mut p = params();
        p.date_of_birth = ymd(1949, 12, 31);
        assert_eq!(validator.validate(&p).unwrap_err().field, "date_of_birth");

        let mut p = params();
        p.prop_short = -1;
        assert_eq!(validator.validate(&p).unwrap_err().field, "prop_short");

        let mut p = params();
        p.prop_decimal = Decimal::new(-1, 0);
        assert_eq!(validator.validate(&p).unwrap_err().field, "prop_decimal");

        let mut p = params();
        p.prop_char = '#';
        assert_eq!(validator.validate(&p).unwrap_err().field, "prop_char");
    }

    #[test]
    fn test_future_birth_date_rejected() {
        let mut p = params();
        p.date_of_birth = chrono::Local::now().date_naive() + chrono::Days::new(1);
        assert!(Validator::default_rules().validate(&p).is_err());
    }

    #[test]
    fn test_custom_rules() {
        let validator = Validator::custom_rules();
        assert!(validator.validate(&params()).is_ok());

        let mut p = params();
        p.first_name = "Al".to_string();
        assert!(validator.validate(&p).is_err());

        let mut p = params();
        p.last_name = "Smith2".to_string();
        assert_eq!(validator.validate(&p).unwrap_err().field, "last_name");

        let mut p = params();
        p.prop_char = 'a';
        assert_eq!(validator.validate(&p).unwrap_err().field, "prop_char");

        let mut p = params();
        p.prop_short = 0;
        assert_eq!(validator.validate(&p).unwrap_err().field, "prop_short");
    }

    #[test]
    fn test_rules_run_in_order() {
        let validator = Validator::new()
            .with_rule(|_: &RecordParams| Err(ValidationError::new("first", "always")))
            .with_rule(|_: &RecordParams| Err(ValidationError::new("second", "always")));
        assert_eq!(validator.validate(&params()).unwrap_err().field, "first");
    }

    #[test]
    fn test_compose_and_clear() {
        let mut validator = Validator::new();
        validator.push(prop_short_range(10, 20));
        assert_eq!(validator.len(), 1);
        assert!(validator.validate(&params()).is_err());

        validator.clear();
        assert!(validator.validate(&params()).is_ok());
    }

    #[test]
    fn test_for_profile() {
        assert_eq!(Validator::for_profile(ValidationProfile::Default).len(), 6);
        assert_eq!(Validator::for_profile(ValidationProfile::Custom).len(), 8);
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::new("prop_short", "5 is outside 10..=20");
        assert_eq!(err.to_string(), "prop_short: 5 is outside 10..=20");
    }
}
