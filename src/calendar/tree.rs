use std::collections::BTreeMap;

use super::address::{DayKey, WeekAddress};

/// Year -> week -> day keys selected by a period. Years and weeks are ISO week-numbering
/// values, days are kept in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarTree {
    years: BTreeMap<i32, BTreeMap<u32, Vec<DayKey>>>,
}

impl CalendarTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusive handle to the day list of a week. The week is created empty if it wasn't
    /// present yet.
    pub fn week_mut(&mut self, address: WeekAddress) -> WeekDays<'_> {
        WeekDays {
            days: self
                .years
                .entry(address.year)
                .or_default()
                .entry(address.week)
                .or_default(),
        }
    }

    pub fn days(&self, address: WeekAddress) -> Option<&[DayKey]> {
        self.years
            .get(&address.year)
            .and_then(|weeks| weeks.get(&address.week))
            .map(Vec::as_slice)
    }

    /// Weeks in ascending (year, week) order together with their days.
    pub fn iter(&self) -> impl Iterator<Item = (WeekAddress, &[DayKey])> + '_ {
        self.years.iter().flat_map(|(year, weeks)| {
            weeks
                .iter()
                .map(move |(week, days)| (WeekAddress::new(*year, *week), days.as_slice()))
        })
    }

    pub fn addresses(&self) -> impl Iterator<Item = WeekAddress> + '_ {
        self.iter().map(|(address, _)| address)
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

/// Mutable view over the days of a single week.
pub struct WeekDays<'a> {
    days: &'a mut Vec<DayKey>,
}

impl WeekDays<'_> {
    /// Appends a day, keeping the list chronological and free of duplicates. Days that don't
    /// come after the last pushed day are ignored.
    pub fn push(&mut self, day: DayKey) -> bool {
        match self.days.last() {
            Some(last) if *last >= day => false,
            _ => {
                self.days.push(day);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::CalendarTree;
    use crate::calendar::address::{DayKey, WeekAddress};

    fn day(year: i32, month: u32, day: u32) -> DayKey {
        NaiveDate::from_ymd_opt(year, month, day).unwrap().into()
    }

    #[test]
    fn weeks_iterate_in_order() {
        let mut tree = CalendarTree::new();
        tree.week_mut(WeekAddress::new(2026, 2));
        tree.week_mut(WeekAddress::new(2025, 52));
        tree.week_mut(WeekAddress::new(2026, 1));

        let addresses = tree.addresses().collect::<Vec<_>>();
        assert_eq!(
            addresses,
            vec![
                WeekAddress::new(2025, 52),
                WeekAddress::new(2026, 1),
                WeekAddress::new(2026, 2)
            ]
        );
    }

    #[test]
    fn week_handle_keeps_days_chronological() {
        let mut tree = CalendarTree::new();
        let address = WeekAddress::new(2026, 1);
        {
            let mut week = tree.week_mut(address);
            assert!(week.push(day(2025, 12, 31)));
            assert!(week.push(day(2026, 1, 1)));
            assert!(!week.push(day(2026, 1, 1)));
            assert!(!week.push(day(2025, 12, 30)));
            assert_eq!(week.len(), 2);
        }

        let days = tree.days(address).unwrap();
        assert_eq!(
            days.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["1231", "0101"]
        );
    }

    #[test]
    fn missing_week_has_no_days() {
        let tree = CalendarTree::new();
        assert!(tree.is_empty());
        assert!(tree.days(WeekAddress::new(2026, 1)).is_none());
    }
}
