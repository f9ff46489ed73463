//! Weekly repeat flags for recurring schedules.
//!
//! Weekday indices follow the convention used across the storage boundary:
//! `0 = Sunday` through `6 = Saturday`. Internally the set is a 7-bit mask.

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

const ALL_DAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Index of a weekday with Sunday as 0.
pub fn weekday_index(day: Weekday) -> u8 {
    day.num_days_from_sunday() as u8
}

/// Weekday for a Sunday-based index, or `None` outside 0-6.
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    ALL_DAYS.get(index as usize).copied()
}

/// Set of weekdays on which a schedule repeats. Empty means non-repeating.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct RepeatDays(u8);

impl RepeatDays {
    /// The empty set: the schedule occurs only on its start date.
    pub const NEVER: RepeatDays = RepeatDays(0);

    /// Build a set from Sunday-based indices. Duplicates are ignored.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidWeekday` for any index above 6.
    pub fn from_indices<I>(indices: I) -> Result<Self>
    where
        I: IntoIterator<Item = u8>,
    {
        let mut mask = 0u8;
        for index in indices {
            if index > 6 {
                return Err(ScheduleError::InvalidWeekday(index));
            }
            mask |= 1 << index;
        }
        Ok(RepeatDays(mask))
    }

    pub fn from_weekdays<I>(days: I) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        days.into_iter().fold(RepeatDays::NEVER, |set, day| set.with(day))
    }

    /// Returns a copy of the set with `day` added.
    pub fn with(self, day: Weekday) -> Self {
        RepeatDays(self.0 | (1 << weekday_index(day)))
    }

    pub fn insert(&mut self, day: Weekday) {
        *self = self.with(day);
    }

    pub fn remove(&mut self, day: Weekday) {
        self.0 &= !(1 << weekday_index(day));
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << weekday_index(day)) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// True when the two sets share at least one weekday.
    pub fn intersects(&self, other: &RepeatDays) -> bool {
        self.0 & other.0 != 0
    }

    /// Weekdays in the set, Sunday first.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        ALL_DAYS.iter().copied().filter(move |d| self.contains(*d))
    }

    /// Sunday-based indices in ascending order.
    pub fn indices(&self) -> Vec<u8> {
        self.iter().map(weekday_index).collect()
    }

    /// RFC 5545 `BYDAY` value, e.g. `MO,WE`. Empty for a non-repeating set.
    pub fn byday(&self) -> String {
        self.iter()
            .map(|d| match d {
                Weekday::Sun => "SU",
                Weekday::Mon => "MO",
                Weekday::Tue => "TU",
                Weekday::Wed => "WE",
                Weekday::Thu => "TH",
                Weekday::Fri => "FR",
                Weekday::Sat => "SA",
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl TryFrom<Vec<u8>> for RepeatDays {
    type Error = ScheduleError;

    fn try_from(indices: Vec<u8>) -> Result<Self> {
        RepeatDays::from_indices(indices)
    }
}

impl From<RepeatDays> for Vec<u8> {
    fn from(days: RepeatDays) -> Self {
        days.indices()
    }
}

impl fmt::Debug for RepeatDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Parses a comma-separated list of indices (`1,3`) or English day names
/// (`mon,wed`, `Tuesday`). An empty string or `never` yields the empty set.
impl FromStr for RepeatDays {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("never") {
            return Ok(RepeatDays::NEVER);
        }

        let mut days = RepeatDays::NEVER;
        for part in trimmed.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if let Ok(index) = part.parse::<u8>() {
                let day = weekday_from_index(index).ok_or(ScheduleError::InvalidWeekday(index))?;
                days.insert(day);
                continue;
            }
            let day: Weekday = part
                .parse()
                .map_err(|_| ScheduleError::InvalidRule(format!("unknown weekday '{}'", part)))?;
            days.insert(day);
        }
        Ok(days)
    }
}
