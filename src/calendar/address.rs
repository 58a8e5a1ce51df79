use std::{fmt::Display, path::PathBuf};

use chrono::{Datelike, NaiveDate, Weekday};

/// Identifies a week file: an ISO week-numbering year and an ISO week inside of it.
/// Serialized as `YYYY/WW` which is also the path of the file under the logs root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekAddress {
    pub year: i32,
    pub week: u32,
}

impl WeekAddress {
    pub fn new(year: i32, week: u32) -> Self {
        Self { year, week }
    }

    /// ISO week the date belongs to. Note that the year may differ from the calendar year of
    /// the date around new year.
    pub fn of(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    /// Monday of the week, or `None` if the week doesn't exist in the year.
    pub fn monday(&self) -> Option<NaiveDate> {
        NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon)
    }

    /// All seven days of the week, Monday first.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.monday()
            .into_iter()
            .flat_map(|monday| monday.iter_days().take(7))
    }

    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.year.to_string()).join(format!("{:02}", self.week))
    }
}

impl Display for WeekAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{:02}", self.year, self.week)
    }
}

/// Number of ISO weeks in the ISO week-numbering year, either 52 or 53.
pub fn iso_weeks_in_year(year: i32) -> u32 {
    if NaiveDate::from_isoywd_opt(year, 53, Weekday::Mon).is_some() {
        53
    } else {
        52
    }
}

/// A calendar day addressed inside of a week file. Displayed as `MMDD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn week(&self) -> WeekAddress {
        WeekAddress::of(self.0)
    }
}

impl From<NaiveDate> for DayKey {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl Display for DayKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%m%d"))
    }
}
