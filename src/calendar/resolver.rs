use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use tracing::{debug, instrument};

use crate::error::WorklogError;

use super::{
    address::{iso_weeks_in_year, DayKey, WeekAddress},
    period::Period,
    tree::CalendarTree,
    WeekConfig,
};

/// Result of resolving a period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodResolution {
    /// Week files touched by the period, ascending. Always equal to the weeks of `tree`.
    pub weeks: Vec<WeekAddress>,
    pub tree: CalendarTree,
    /// First day of the period. Its year has to be taken from the tree.
    pub first_day: DayKey,
    pub last_day: DayKey,
}

/// Resolves a period by name. Fails with [WorklogError::InvalidPeriod] before doing any work
/// if the name is unknown.
pub fn resolve_named(
    period: &str,
    now: DateTime<Utc>,
    config: &WeekConfig,
) -> Result<PeriodResolution, WorklogError> {
    Ok(resolve(period.parse()?, now, config))
}

/// Computes the weeks and days a period spans. `now` is evaluated in the configured timezone.
#[instrument(level = "debug", skip(config))]
pub fn resolve(period: Period, now: DateTime<Utc>, config: &WeekConfig) -> PeriodResolution {
    let end_date = now.with_timezone(&config.timezone).date_naive();
    let start_date = end_date
        .checked_sub_days(period.days_back())
        .unwrap_or(NaiveDate::MIN);

    let first_week = WeekAddress::of(start_date);
    let last_week = WeekAddress::of(end_date);
    debug!("Period spans {start_date} ({first_week}) to {end_date} ({last_week})");

    let fixed_span = fixed_span(period, end_date);

    let mut tree = CalendarTree::new();
    for address in weeks_between(first_week, last_week) {
        let mut week = tree.week_mut(address);
        let selected = address.days().filter(|day| match fixed_span {
            Some((from, to)) => from <= *day && *day <= to,
            None => config.is_workday(day.weekday()),
        });
        for day in selected {
            week.push(day.into());
        }
        debug!("Week {address} has {} selected days", week.len());
    }

    PeriodResolution {
        weeks: tree.addresses().collect(),
        tree,
        first_day: start_date.into(),
        last_day: end_date.into(),
    }
}

/// Days selected by periods that ignore the work week.
fn fixed_span(period: Period, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let days_ago = |days| today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
    match period {
        Period::Today => Some((today, today)),
        Period::Yesterday => Some((days_ago(1), days_ago(1))),
        Period::ThreeDay => Some((days_ago(2), today)),
        Period::Week | Period::CurrentWeek | Period::Month | Period::Quarter | Period::Year => {
            None
        }
    }
}

/// Every ISO week from `first` to `last`, both inclusive.
fn weeks_between(first: WeekAddress, last: WeekAddress) -> impl Iterator<Item = WeekAddress> {
    (first.year..=last.year).flat_map(move |year| {
        let from = if year == first.year { first.week } else { 1 };
        let to = if year == last.year {
            last.week
        } else {
            iso_weeks_in_year(year)
        };
        (from..=to).map(move |week| WeekAddress::new(year, week))
    })
}
