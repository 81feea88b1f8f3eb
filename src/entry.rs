use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use jiff::{tz::TimeZone, Timestamp};
use serde_derive::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StampError {
    #[error("Timestamp {0:?} is not of the form YYYY-MM-DDTHH:MM:SS.mmmZ")]
    Malformed(String),
    #[error("Timestamp out of range: {0} ms since the epoch")]
    OutOfRange(i64),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Inconsistency {
    #[error("entry {0:?} is still open but is not the last one")]
    OpenNotLast(String),
    #[error("interrupted entry {0:?} was never closed")]
    OpenOnStack(String),
    #[error("entry without a name")]
    EmptyName,
    #[error("entry {0:?} has an end without total_mins or the other way round")]
    HalfClosed(String),
}

/// 0000-01-01T00:00:00.000Z, the earliest instant with a four digit year.
const MIN_MILLIS: i64 = -62_167_219_200_000;
/// 9999-12-31T23:59:59.999Z
const MAX_MILLIS: i64 = 253_402_300_799_999;

/// A UTC instant with millisecond precision, written as
/// `YYYY-MM-DDTHH:MM:SS.mmmZ` and read back only in exactly that shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stamp(Timestamp);

impl Stamp {
    pub fn now() -> Self {
        let now = Timestamp::now();
        Self::from_millisecond(now.as_millisecond()).unwrap_or(Self(now))
    }

    /// Only years 0000 to 9999 are accepted, the range the text form covers.
    pub fn from_millisecond(millis: i64) -> Result<Self, StampError> {
        if !(MIN_MILLIS..=MAX_MILLIS).contains(&millis) {
            return Err(StampError::OutOfRange(millis));
        }
        Timestamp::from_millisecond(millis)
            .map(Self)
            .map_err(|_| StampError::OutOfRange(millis))
    }

    pub fn as_millisecond(self) -> i64 {
        self.0.as_millisecond()
    }

    /// Time from `earlier` up to `self`, zero if `earlier` is later.
    pub fn saturating_since(self, earlier: Stamp) -> Duration {
        let millis = self.as_millisecond().saturating_sub(earlier.as_millisecond());
        Duration::from_millis(u64::try_from(millis).unwrap_or(0))
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dt = self.0.to_zoned(TimeZone::UTC).datetime();
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
            dt.year(),
            dt.month(),
            dt.day(),
            dt.hour(),
            dt.minute(),
            dt.second(),
            dt.millisecond()
        )
    }
}

impl FromStr for Stamp {
    type Err = StampError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let malformed = || StampError::Malformed(input.to_owned());
        let timestamp: Timestamp = input.parse().map_err(|_| malformed())?;

        // Reject anything jiff accepts that we wouldn't have written
        // ourselves: offsets, missing or extra fraction digits, lowercase.
        let stamp = Self(timestamp);
        if stamp.to_string() == input {
            Ok(stamp)
        } else {
            Err(malformed())
        }
    }
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WorkEntry {
    pub name: String,
    #[serde_as(as = "DisplayFromStr")]
    pub start: Stamp,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<Stamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_mins: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl WorkEntry {
    pub fn open(name: &str, start: Stamp) -> Self {
        Self {
            name: name.to_owned(),
            start,
            end: None,
            total_mins: None,
            tags: BTreeSet::new(),
            notes: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Sets `end` and derives `total_mins`. Closing twice keeps the first end.
    pub(crate) fn close(&mut self, end: Stamp) {
        if self.end.is_some() {
            return;
        }
        self.end = Some(end);
        self.total_mins = Some(total_minutes(self.start, end));
    }

    /// Contribution to the log: up to `end` when closed, up to `now` otherwise.
    pub fn elapsed(&self, now: Stamp) -> Duration {
        self.end.unwrap_or(now).saturating_since(self.start)
    }
}

/// Minutes between `start` and `end`, rounded to two decimals.
#[allow(clippy::cast_precision_loss)] // ms spans stay far below 2^52
pub fn total_minutes(start: Stamp, end: Stamp) -> f64 {
    let millis = end.saturating_since(start).as_millis() as f64;
    (millis / 600.0).round() / 100.0
}

/// The whole sheet: every work entry ever recorded plus the suspended tasks.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Document {
    pub work: Vec<WorkEntry>,
    #[serde(default)]
    pub interrupt_stack: Vec<WorkEntry>,
}

impl Document {
    pub fn current(&self) -> Option<&WorkEntry> {
        self.work.last().filter(|entry| entry.is_open())
    }

    pub(crate) fn current_mut(&mut self) -> Option<&mut WorkEntry> {
        self.work.last_mut().filter(|entry| entry.is_open())
    }

    pub fn check_consistent(&self) -> Result<(), Inconsistency> {
        let mut all = self.work.iter().chain(&self.interrupt_stack);
        if all.any(|entry| entry.name.is_empty()) {
            return Err(Inconsistency::EmptyName);
        }

        let mut all = self.work.iter().chain(&self.interrupt_stack);
        if let Some(entry) = all.find(|e| e.end.is_some() != e.total_mins.is_some()) {
            return Err(Inconsistency::HalfClosed(entry.name.clone()));
        }

        let before_last = self.work.len().saturating_sub(1);
        if let Some(entry) = self.work[..before_last].iter().find(|e| e.is_open()) {
            return Err(Inconsistency::OpenNotLast(entry.name.clone()));
        }

        if let Some(entry) = self.interrupt_stack.iter().find(|e| e.is_open()) {
            return Err(Inconsistency::OpenOnStack(entry.name.clone()));
        }

        Ok(())
    }
}
