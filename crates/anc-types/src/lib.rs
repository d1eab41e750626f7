//! Validated primitives shared by the ANC crates.
//!
//! - [`PatientId`]: a trimmed, non-empty register identifier.
//! - [`ClinicalDate`]: a calendar date parsed from the dashboard's ISO strings.

use chrono::{Days, NaiveDate};
use std::cmp::Ordering;
use std::fmt;

/// Errors that can occur when creating validated primitives.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TypesError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input could not be read as a calendar date
    #[error("invalid date: {0:?}")]
    InvalidDate(String),
}

/// Identifier of a patient in the register.
///
/// The dashboard hands out short identifiers (`"u1"`, `"P-2024-001"`), so no format is
/// imposed beyond being non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatientId(String);

impl PatientId {
    /// Creates a new `PatientId`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::Empty`] if nothing is left after trimming.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TypesError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TypesError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive substring match, used by register search.
    pub fn contains_ignore_case(&self, needle_lower: &str) -> bool {
        self.0.to_lowercase().contains(needle_lower)
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for PatientId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PatientId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PatientId::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A calendar date as recorded on a visit or patient card.
///
/// The dashboard stores dates as `YYYY-MM-DD` strings, and "today" as the date part of an
/// ISO timestamp. Both forms are accepted; anything after a `T` is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClinicalDate(NaiveDate);

impl ClinicalDate {
    /// Wire format used when rendering dates.
    pub const FORMAT: &'static str = "%Y-%m-%d";

    /// Parses `YYYY-MM-DD` or an ISO timestamp whose date part is `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::InvalidDate`] for empty or malformed input.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let trimmed = raw.trim();
        let date_part = trimmed.split_once('T').map_or(trimmed, |(date, _)| date);
        NaiveDate::parse_from_str(date_part, Self::FORMAT)
            .map(Self)
            .map_err(|_| TypesError::InvalidDate(raw.to_string()))
    }

    /// Lenient form of [`ClinicalDate::parse`] for optional fields.
    pub fn parse_opt(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|r| Self::parse(r).ok())
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn naive(self) -> NaiveDate {
        self.0
    }

    /// Whole days from `self` to `later`; negative when `later` is earlier.
    pub fn days_until(self, later: ClinicalDate) -> i64 {
        (later.0 - self.0).num_days()
    }

    /// Adds `days` calendar days, returning `None` past the representable range.
    pub fn add_days(self, days: u64) -> Option<Self> {
        self.0.checked_add_days(Days::new(days)).map(Self)
    }
}

impl From<NaiveDate> for ClinicalDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl PartialEq<NaiveDate> for ClinicalDate {
    fn eq(&self, other: &NaiveDate) -> bool {
        self.0 == *other
    }
}

impl PartialOrd<NaiveDate> for ClinicalDate {
    fn partial_cmp(&self, other: &NaiveDate) -> Option<Ordering> {
        Some(self.0.cmp(other))
    }
}

impl fmt::Display for ClinicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl std::str::FromStr for ClinicalDate {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for ClinicalDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for ClinicalDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ClinicalDate::parse(&s).map_err(serde::de::Error::custom)
    }
}
