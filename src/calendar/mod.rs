//! Maps named periods onto week files and the days inside of them.
//!
//! Logs are stored in one file per ISO week (`<year>/<week>`), and every entry inside of a file
//! is keyed by its day (`MMDD`). [resolve] turns a [Period] into the ordered list of week files
//! it spans together with a [CalendarTree] of the days selected in each week.
//!  - `today`, `yesterday` and `3day` select exact calendar days.
//!  - Every other period selects the configured work week inside each ISO week it spans.

pub mod address;
pub mod period;
pub mod resolver;
pub mod tree;

use chrono::Weekday;
use chrono_tz::Tz;

pub use address::{DayKey, WeekAddress};
pub use period::Period;
pub use resolver::{resolve, resolve_named, PeriodResolution};
pub use tree::CalendarTree;

/// Work week and timezone used when resolving periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekConfig {
    pub week_start_day: Weekday,
    pub week_end_day: Weekday,
    pub timezone: Tz,
}

impl Default for WeekConfig {
    fn default() -> Self {
        Self {
            week_start_day: Weekday::Mon,
            week_end_day: Weekday::Fri,
            timezone: Tz::UTC,
        }
    }
}

impl WeekConfig {
    /// Amount of days in the work week. Ranges wrap around the end of the week, so friday to
    /// monday is 4 days.
    pub fn days_in_period(&self) -> u32 {
        (self.week_end_day.num_days_from_monday() + 7 - self.week_start_day.num_days_from_monday())
            % 7
            + 1
    }

    pub fn is_workday(&self, day: Weekday) -> bool {
        let offset = (day.num_days_from_monday() + 7 - self.week_start_day.num_days_from_monday()) % 7;
        offset < self.days_in_period()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::WeekConfig;

    fn config(start: Weekday, end: Weekday) -> WeekConfig {
        WeekConfig {
            week_start_day: start,
            week_end_day: end,
            ..Default::default()
        }
    }

    #[test]
    fn default_is_monday_to_friday() {
        let config = WeekConfig::default();
        assert_eq!(config.days_in_period(), 5);
        assert!(config.is_workday(Weekday::Mon));
        assert!(config.is_workday(Weekday::Fri));
        assert!(!config.is_workday(Weekday::Sat));
        assert!(!config.is_workday(Weekday::Sun));
    }

    #[test]
    fn wrapping_work_week() {
        let config = config(Weekday::Fri, Weekday::Mon);
        assert_eq!(config.days_in_period(), 4);
        assert!(config.is_workday(Weekday::Sun));
        assert!(config.is_workday(Weekday::Mon));
        assert!(!config.is_workday(Weekday::Tue));
        assert!(!config.is_workday(Weekday::Thu));
    }

    #[test]
    fn single_day_and_full_week() {
        assert_eq!(config(Weekday::Wed, Weekday::Wed).days_in_period(), 1);
        assert_eq!(config(Weekday::Sun, Weekday::Sat).days_in_period(), 7);
    }
}
