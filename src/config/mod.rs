//! Loading of the YAML configuration file. Values missing from the user's file are taken from
//! the configuration embedded into the binary.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::Weekday;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::{debug, info};

use crate::{calendar::WeekConfig, error::WorklogError};

pub const DEFAULT_CONFIGURATION: &str = include_str!("default.yaml");

pub const CONFIGURATION_FILE_NAME: &str = "config";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub settings: Settings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub schedule: Schedule,
    pub logs: Logs,
    pub git: Git,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schedule {
    pub days: Days,
    pub workday: Workday,
}

/// First and last day of the work week, e.g. `monday` and `friday`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Days {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Workday {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// IANA timezone name used to decide what "today" is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Logs {
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Git {
    pub sync: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Loads the configuration. Without an explicit path `<worklog_home>/config` is used and
/// created from the defaults if it doesn't exist yet. An explicit path has to exist.
pub fn load_configuration(explicit: Option<&Path>, worklog_home: &Path) -> Result<Configuration> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(WorklogError::ConfigurationMissing(format!(
                    "configuration file {path:?} doesn't exist"
                ))
                .into());
            }
            path.to_owned()
        }
        None => {
            let path = worklog_home.join(CONFIGURATION_FILE_NAME);
            if !path.exists() {
                fs::create_dir_all(worklog_home)
                    .with_context(|| format!("Couldn't create {worklog_home:?}"))?;
                fs::write(&path, DEFAULT_CONFIGURATION)
                    .with_context(|| format!("Couldn't create configuration file {path:?}"))?;
                info!("Configuration file created at {path:?}");
                info!("Make sure to customize this file to your needs");
            }
            path
        }
    };

    debug!("Loading configuration from {path:?}");
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("Couldn't read configuration file {path:?}"))?;
    parse_with_defaults(&raw).with_context(|| format!("Couldn't parse configuration file {path:?}"))
}

/// Parses user configuration and fills the gaps with [DEFAULT_CONFIGURATION].
pub fn parse_with_defaults(raw: &str) -> Result<Configuration> {
    let mut merged: Value = serde_yaml::from_str(DEFAULT_CONFIGURATION)?;
    if !raw.trim().is_empty() {
        let user: Value = serde_yaml::from_str(raw)?;
        merge_values(&mut merged, user);
    }
    Ok(serde_yaml::from_value(merged)?)
}

/// Recursively merges `overlay` into `base`. Mappings are merged key by key, everything else
/// is replaced. Null never replaces anything.
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

impl Configuration {
    pub fn week_config(&self) -> Result<WeekConfig, WorklogError> {
        let days = &self.settings.schedule.days;
        Ok(WeekConfig {
            week_start_day: parse_weekday(&days.start)?,
            week_end_day: parse_weekday(&days.end)?,
            timezone: parse_timezone(self.settings.schedule.workday.timezone.as_deref())?,
        })
    }

    /// Root directory of the week files with `~` and `$HOME` expanded.
    pub fn logs_path(&self, home: &Path) -> Result<PathBuf, WorklogError> {
        let path = self.settings.logs.path.trim();
        if path.is_empty() {
            return Err(WorklogError::ConfigurationMissing(
                "settings.logs.path is not set".into(),
            ));
        }
        Ok(expand_home(path, home))
    }
}

fn parse_weekday(name: &str) -> Result<Weekday, WorklogError> {
    name.trim()
        .parse::<Weekday>()
        .map_err(|_| WorklogError::InvalidConfiguration(format!("unknown weekday `{name}`")))
}

fn parse_timezone(name: Option<&str>) -> Result<Tz, WorklogError> {
    match name.map(str::trim) {
        None | Some("") => Ok(Tz::UTC),
        Some(name) => name
            .parse::<Tz>()
            .map_err(|_| WorklogError::InvalidConfiguration(format!("unknown timezone `{name}`"))),
    }
}

fn expand_home(path: &str, home: &Path) -> PathBuf {
    let home = home.to_string_lossy();
    let path = path.replace("$HOME", &home);
    match path.strip_prefix('~') {
        Some(rest) => PathBuf::from(format!("{home}{rest}")),
        None => PathBuf::from(path),
    }
}
