use std::{fmt::Display, str::FromStr};

use chrono::Days;

use crate::error::WorklogError;

/// Named time period that can be listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Today,
    Yesterday,
    ThreeDay,
    Week,
    CurrentWeek,
    Month,
    Quarter,
    Year,
}

impl Period {
    pub const ALL: [Period; 8] = [
        Period::Today,
        Period::Yesterday,
        Period::ThreeDay,
        Period::Week,
        Period::CurrentWeek,
        Period::Month,
        Period::Quarter,
        Period::Year,
    ];

    /// How many days before "now" the period starts.
    pub fn days_back(&self) -> Days {
        Days::new(match self {
            Period::Today | Period::CurrentWeek => 0,
            Period::Yesterday => 1,
            Period::ThreeDay => 2,
            Period::Week => 7,
            Period::Month => 30,
            Period::Quarter => 90,
            Period::Year => 365,
        })
    }

    /// Periods anchored to specific calendar days rather than to the configured work week.
    pub fn is_fixed_span(&self) -> bool {
        matches!(self, Period::Today | Period::Yesterday | Period::ThreeDay)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Yesterday => "yesterday",
            Period::ThreeDay => "3day",
            Period::Week => "week",
            Period::CurrentWeek => "cweek",
            Period::Month => "month",
            Period::Quarter => "quarter",
            Period::Year => "year",
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Period {
    type Err = WorklogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Period::ALL
            .into_iter()
            .find(|period| period.name() == lowered)
            .ok_or_else(|| WorklogError::InvalidPeriod(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Days;

    use super::Period;
    use crate::error::WorklogError;

    #[test]
    fn parses_every_name_back() {
        for period in Period::ALL {
            assert_eq!(period.name().parse::<Period>().unwrap(), period);
        }
    }

    #[test]
    fn parsing_ignores_case() {
        assert_eq!("CWeek".parse::<Period>().unwrap(), Period::CurrentWeek);
        assert_eq!("3DAY".parse::<Period>().unwrap(), Period::ThreeDay);
    }

    #[test]
    fn unknown_period_is_rejected() {
        let err = "fortnight".parse::<Period>().unwrap_err();
        assert!(matches!(err, WorklogError::InvalidPeriod(name) if name == "fortnight"));
    }

    #[test]
    fn offsets_match_period_lengths() {
        assert_eq!(Period::Today.days_back(), Days::new(0));
        assert_eq!(Period::CurrentWeek.days_back(), Days::new(0));
        assert_eq!(Period::ThreeDay.days_back(), Days::new(2));
        assert_eq!(Period::Year.days_back(), Days::new(365));
        assert!(Period::ThreeDay.is_fixed_span());
        assert!(!Period::CurrentWeek.is_fixed_span());
    }
}
