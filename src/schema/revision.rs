//! YANG module revision dates

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const REVISION_FORMAT: &str = "%Y-%m-%d";

/// Malformed revision string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid revision '{0}', expected YYYY-MM-DD")]
pub struct InvalidRevision(pub String);

/// A module revision in `YYYY-MM-DD` form
///
/// Ordering follows the calendar, so the newest revision sorts last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Revision(NaiveDate);

impl Revision {
    /// Build a revision from calendar parts
    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Calendar date of this revision
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.0
    }
}

impl FromStr for Revision {
    type Err = InvalidRevision;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // chrono accepts unpadded fields, revisions are always exactly ten characters
        if s.len() != 10 {
            return Err(InvalidRevision(s.to_string()));
        }
        NaiveDate::parse_from_str(s, REVISION_FORMAT)
            .map(Self)
            .map_err(|_| InvalidRevision(s.to_string()))
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(REVISION_FORMAT))
    }
}

impl Serialize for Revision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Revision {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
