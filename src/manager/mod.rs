//! Executes user actions against the week files. The manager resolves which weeks an action
//! touches through [crate::calendar], reads them through a [WeekStorage] and returns the
//! affected entries keyed by their id (`<MMDD>-<ordinal>`).

use std::{collections::HashMap, fmt::Display, str::FromStr};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    calendar::{resolve, resolve_named, Period, WeekConfig},
    error::WorklogError,
    storage::{
        entities::TimeEntry,
        week_storage::WeekStorage,
    },
    utils::clock::Clock,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Remove,
    List,
    Edit,
    Start,
    Pause,
    Resume,
    End,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::Add,
        Action::Remove,
        Action::List,
        Action::Edit,
        Action::Start,
        Action::Pause,
        Action::Resume,
        Action::End,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Remove => "remove",
            Action::List => "list",
            Action::Edit => "edit",
            Action::Start => "start",
            Action::Pause => "pause",
            Action::Resume => "resume",
            Action::End => "end",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Action {
    type Err = WorklogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or_else(|| WorklogError::InvalidAction(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Added,
    Started,
    Paused,
    Resumed,
    Completed,
}

impl EntryStatus {
    /// Derives the status of an entry from its timing together with the seconds that belong to
    /// that status.
    pub fn of(time: &TimeEntry) -> (Self, i64) {
        if time.end != 0 {
            (EntryStatus::Completed, time.total)
        } else if time.resume != 0 {
            (EntryStatus::Resumed, time.resume - time.start)
        } else if time.pause != 0 {
            (EntryStatus::Paused, time.pause)
        } else {
            (EntryStatus::Started, time.start)
        }
    }
}

impl Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryStatus::Added => write!(f, "added"),
            EntryStatus::Started => write!(f, "started"),
            EntryStatus::Paused => write!(f, "paused"),
            EntryStatus::Resumed => write!(f, "resumed"),
            EntryStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub status: EntryStatus,
    /// Seconds associated with the status, see [EntryStatus::of].
    pub time: i64,
    pub message: String,
}

/// Entries affected by an action. `ids` keeps the order entries were found in.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ActionResult {
    pub entries: HashMap<String, LogEntry>,
    pub ids: Vec<String>,
}

impl ActionResult {
    fn push(&mut self, id: String, entry: LogEntry) {
        self.ids.push(id.clone());
        self.entries.insert(id, entry);
    }

    /// Entries in the order they were found.
    pub fn ordered(&self) -> impl Iterator<Item = (&str, &LogEntry)> + '_ {
        self.ids
            .iter()
            .filter_map(|id| self.entries.get(id).map(|entry| (id.as_str(), entry)))
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

pub struct LogManager<S: WeekStorage, C: Clock> {
    storage: S,
    clock: C,
    config: WeekConfig,
}

impl<S: WeekStorage, C: Clock> LogManager<S, C> {
    pub fn new(storage: S, clock: C, config: WeekConfig) -> Self {
        Self {
            storage,
            clock,
            config,
        }
    }

    /// Runs an action. `message` is used by `add`, `period` by `list`. The remaining actions
    /// are accepted but don't do anything yet.
    pub async fn action(
        &self,
        action: Action,
        message: &str,
        entry_id: &str,
        period: &str,
    ) -> Result<ActionResult, WorklogError> {
        match action {
            Action::Add => self.add(message).await,
            Action::List => self.list(period).await,
            Action::Remove
            | Action::Edit
            | Action::Start
            | Action::Pause
            | Action::Resume
            | Action::End => {
                debug!("Action {action} for {entry_id:?} is not implemented yet");
                Ok(ActionResult::default())
            }
        }
    }

    /// Appends a message to today's entries.
    #[instrument(skip(self))]
    pub async fn add(&self, message: &str) -> Result<ActionResult, WorklogError> {
        let now = self.clock.time();
        let resolution = resolve(Period::Today, now, &self.config);
        let today = resolution.last_day;
        let address = today.week();
        debug_assert_eq!(resolution.weeks, vec![address]);

        self.storage.create_week_if_not_exist(address).await?;
        let mut week = self.storage.load(address).await?;

        let day_key = today.to_string();
        let time = TimeEntry::started_at(now.timestamp());
        let ordinal = week.append(&day_key, message.to_owned(), time)?;
        self.storage.save(address, &week).await?;

        let id = format!("{day_key}-{ordinal}");
        info!("Added entry {id} to week {address}");

        let mut result = ActionResult::default();
        result.push(
            id,
            LogEntry {
                status: EntryStatus::Added,
                time: time.total,
                message: message.to_owned(),
            },
        );
        Ok(result)
    }

    /// Collects every entry inside of the named period. Unknown names fail before any week is
    /// read. Weeks are read in ascending order and a corrupt week fails the whole listing.
    #[instrument(skip(self))]
    pub async fn list(&self, period: &str) -> Result<ActionResult, WorklogError> {
        let resolution = resolve_named(period, self.clock.time(), &self.config)?;
        debug!(
            "Listing {period} from {} to {}",
            resolution.first_day, resolution.last_day
        );

        let mut result = ActionResult::default();
        for (address, days) in resolution.tree.iter() {
            if days.is_empty() {
                continue;
            }
            let week = self.storage.load(address).await?;
            for day in days {
                let day_key = day.to_string();
                for (ordinal, message, time) in week.entries_for(&day_key) {
                    let (status, time) = EntryStatus::of(&time);
                    result.push(
                        format!("{day_key}-{ordinal}"),
                        LogEntry {
                            status,
                            time,
                            message: message.to_owned(),
                        },
                    );
                }
            }
        }

        debug!("Found {} entries", result.ids.len());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use anyhow::Result;
    use chrono::{DateTime, TimeZone, Utc};
    use tempfile::tempdir;

    use super::{Action, EntryStatus, LogManager};
    use crate::{
        calendar::{WeekAddress, WeekConfig},
        error::WorklogError,
        storage::{
            entities::{TimeEntry, WeekFile},
            week_storage::{WeekStorage, WeekStorageImpl},
        },
        utils::{clock::MockClock, logging::TEST_LOGGING},
    };

    fn friday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 10, 0, 0).unwrap()
    }

    fn clock_at(now: DateTime<Utc>) -> MockClock {
        let mut clock = MockClock::new();
        clock.expect_time().return_const(now);
        clock
    }

    #[tokio::test]
    async fn add_to_empty_week() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let storage = WeekStorageImpl::new(dir.path().to_owned());
        let manager = LogManager::new(&storage, clock_at(friday()), WeekConfig::default());

        let result = manager.add("Fixed login bug").await?;

        assert_eq!(result.ids, vec!["1016-1"]);
        let entry = &result.entries["1016-1"];
        assert_eq!(entry.status, EntryStatus::Added);
        assert_eq!(entry.message, "Fixed login bug");

        let week = storage.load(WeekAddress::new(2026, 42)).await?;
        assert_eq!(week.log["1016"][&1], "Fixed login bug");
        assert_eq!(week.time["1016"][&1], TimeEntry::started_at(friday().timestamp()));
        Ok(())
    }

    #[tokio::test]
    async fn add_continues_numbering() -> Result<()> {
        let dir = tempdir()?;
        let storage = WeekStorageImpl::new(dir.path().to_owned());
        let manager = LogManager::new(&storage, clock_at(friday()), WeekConfig::default());

        manager.add("first").await?;
        let result = manager.action(Action::Add, "second", "", "").await?;

        assert_eq!(result.ids, vec!["1016-2"]);
        Ok(())
    }

    #[tokio::test]
    async fn list_today_after_add() -> Result<()> {
        let dir = tempdir()?;
        let storage = WeekStorageImpl::new(dir.path().to_owned());
        let manager = LogManager::new(&storage, clock_at(friday()), WeekConfig::default());

        manager.add("first").await?;
        manager.add("second").await?;
        let result = manager.action(Action::List, "", "", "today").await?;

        assert_eq!(result.ids, vec!["1016-1", "1016-2"]);
        let ordered = result
            .ordered()
            .map(|(id, entry)| (id, entry.status, entry.message.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            ordered,
            vec![
                ("1016-1", EntryStatus::Started, "first"),
                ("1016-2", EntryStatus::Started, "second")
            ]
        );
        assert_eq!(result.entries["1016-1"].time, friday().timestamp());
        Ok(())
    }

    #[tokio::test]
    async fn list_derives_status_from_timing() -> Result<()> {
        let dir = tempdir()?;
        let storage = WeekStorageImpl::new(dir.path().to_owned());
        let mut week = WeekFile::default();
        let entries = [
            TimeEntry {
                start: 100,
                end: 400,
                total: 250,
                ..Default::default()
            },
            TimeEntry {
                start: 100,
                pause: 150,
                resume: 160,
                ..Default::default()
            },
            TimeEntry {
                start: 100,
                pause: 150,
                ..Default::default()
            },
            TimeEntry::started_at(100),
        ];
        for (index, time) in entries.into_iter().enumerate() {
            week.append("1016", format!("entry {index}"), time)?;
        }
        storage.save(WeekAddress::new(2026, 42), &week).await?;

        let manager = LogManager::new(&storage, clock_at(friday()), WeekConfig::default());
        let result = manager.list("today").await?;

        let statuses = result
            .ordered()
            .map(|(_, entry)| (entry.status, entry.time))
            .collect::<Vec<_>>();
        assert_eq!(
            statuses,
            vec![
                (EntryStatus::Completed, 250),
                (EntryStatus::Resumed, 60),
                (EntryStatus::Paused, 150),
                (EntryStatus::Started, 100)
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn list_orders_ordinals_numerically() -> Result<()> {
        let dir = tempdir()?;
        let storage = WeekStorageImpl::new(dir.path().to_owned());
        let path = storage.week_path(WeekAddress::new(2026, 42));
        fs::create_dir_all(path.parent().unwrap())?;
        fs::write(
            &path,
            r#"{"Log":{"1016":{"10":"ten","2":"two","1":"one"},"1015":{"1":"thursday"}}}"#,
        )?;

        let manager = LogManager::new(&storage, clock_at(friday()), WeekConfig::default());
        let result = manager.action(Action::List, "", "", "cweek").await?;

        assert_eq!(result.ids, vec!["1015-1", "1016-1", "1016-2", "1016-10"]);
        Ok(())
    }

    #[tokio::test]
    async fn list_skips_missing_week_files() -> Result<()> {
        let dir = tempdir()?;
        let storage = WeekStorageImpl::new(dir.path().to_owned());
        let mut previous = WeekFile::default();
        previous.append("1008", "thursday work".into(), TimeEntry::started_at(1))?;
        // Sunday is outside of the monday to friday work week.
        previous.append("1011", "sunday work".into(), TimeEntry::started_at(2))?;
        storage.save(WeekAddress::new(2026, 41), &previous).await?;

        let manager = LogManager::new(&storage, clock_at(friday()), WeekConfig::default());
        let result = manager.action(Action::List, "", "", "week").await?;

        assert_eq!(result.ids, vec!["1008-1"]);
        assert!(!storage.week_path(WeekAddress::new(2026, 42)).exists());
        Ok(())
    }

    #[tokio::test]
    async fn list_fails_on_corrupt_week() -> Result<()> {
        let dir = tempdir()?;
        let storage = WeekStorageImpl::new(dir.path().to_owned());
        let mut previous = WeekFile::default();
        previous.append("1008", "thursday work".into(), TimeEntry::started_at(1))?;
        storage.save(WeekAddress::new(2026, 41), &previous).await?;
        fs::create_dir_all(dir.path().join("2026"))?;
        fs::write(storage.week_path(WeekAddress::new(2026, 42)), "not json")?;

        let manager = LogManager::new(&storage, clock_at(friday()), WeekConfig::default());
        let err = manager.action(Action::List, "", "", "week").await.unwrap_err();

        assert!(matches!(err, WorklogError::StorageCorrupt { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_period_touches_nothing() -> Result<()> {
        let dir = tempdir()?;
        let logs_root = dir.path().join("logs");
        let storage = WeekStorageImpl::new(logs_root.clone());
        let manager = LogManager::new(&storage, clock_at(friday()), WeekConfig::default());

        let err = manager
            .action(Action::List, "", "", "fortnight")
            .await
            .unwrap_err();

        assert!(matches!(err, WorklogError::InvalidPeriod(name) if name == "fortnight"));
        assert!(!logs_root.exists());
        Ok(())
    }

    #[tokio::test]
    async fn reserved_actions_do_nothing() -> Result<()> {
        let dir = tempdir()?;
        let storage = WeekStorageImpl::new(dir.path().to_owned());
        let manager = LogManager::new(&storage, MockClock::new(), WeekConfig::default());

        for action in ["remove", "edit", "start", "pause", "resume", "end"] {
            let result = manager
                .action(action.parse()?, "", "1016-1", "today")
                .await?;
            assert!(result.is_empty());
        }
        assert_eq!(fs::read_dir(dir.path())?.count(), 0);
        Ok(())
    }

    #[test]
    fn unknown_action_is_rejected() {
        let err = "archive".parse::<Action>().unwrap_err();
        assert!(matches!(err, WorklogError::InvalidAction(name) if name == "archive"));
    }
}
