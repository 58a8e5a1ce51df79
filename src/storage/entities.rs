use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::WorklogError;

/// Content of a week file. Both maps are keyed by day (`MMDD`) and then by entry ordinal.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Default)]
pub struct WeekFile {
    #[serde(rename = "Log", default)]
    pub log: BTreeMap<String, BTreeMap<u32, String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub time: BTreeMap<String, BTreeMap<u32, TimeEntry>>,
}

impl WeekFile {
    /// Ordinal the next entry of the day should use. Fails once the highest ordinal of the day
    /// is `u32::MAX`.
    pub fn next_ordinal(&self, day_key: &str) -> Result<u32, WorklogError> {
        match self.log.get(day_key).and_then(|entries| entries.keys().max()) {
            None => Ok(1),
            Some(highest) => highest
                .checked_add(1)
                .ok_or_else(|| WorklogError::OrdinalOverflow(day_key.to_owned())),
        }
    }

    /// Stores a message with its timing and returns the assigned ordinal.
    pub fn append(
        &mut self,
        day_key: &str,
        message: String,
        time: TimeEntry,
    ) -> Result<u32, WorklogError> {
        let ordinal = self.next_ordinal(day_key)?;
        self.log
            .entry(day_key.to_owned())
            .or_default()
            .insert(ordinal, message);
        self.time
            .entry(day_key.to_owned())
            .or_default()
            .insert(ordinal, time);
        Ok(ordinal)
    }

    /// Entries of a day in ascending ordinal order. Entries without timing get an empty one.
    pub fn entries_for<'a>(
        &'a self,
        day_key: &'a str,
    ) -> impl Iterator<Item = (u32, &'a str, TimeEntry)> + 'a {
        self.log.get(day_key).into_iter().flat_map(move |entries| {
            entries.iter().map(move |(ordinal, message)| {
                let time = self
                    .time
                    .get(day_key)
                    .and_then(|times| times.get(ordinal))
                    .copied()
                    .unwrap_or_default();
                (*ordinal, message.as_str(), time)
            })
        })
    }
}

/// Timing of an entry in epoch seconds. Zero means the event didn't happen yet.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Copy, Default)]
pub struct TimeEntry {
    #[serde(rename = "s", default, skip_serializing_if = "is_zero")]
    pub start: i64,
    #[serde(rename = "p", default, skip_serializing_if = "is_zero")]
    pub pause: i64,
    #[serde(rename = "r", default, skip_serializing_if = "is_zero")]
    pub resume: i64,
    #[serde(rename = "e", default, skip_serializing_if = "is_zero")]
    pub end: i64,
    #[serde(rename = "t", default, skip_serializing_if = "is_zero")]
    pub total: i64,
}

impl TimeEntry {
    pub fn started_at(start: i64) -> Self {
        Self {
            start,
            ..Default::default()
        }
    }
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}
