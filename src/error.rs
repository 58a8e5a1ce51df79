use std::path::PathBuf;

use thiserror::Error;

/// Failures of the calendar, storage and manager layers. Every variant is fatal to the
/// current invocation.
#[derive(Debug, Error)]
pub enum WorklogError {
    #[error("invalid period `{0}`, expected one of: today, yesterday, 3day, week, cweek, month, quarter, year")]
    InvalidPeriod(String),

    #[error("invalid action `{0}`")]
    InvalidAction(String),

    #[error("week file {path:?} is corrupt: {source}")]
    StorageCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("couldn't read week file {path:?}: {source}")]
    StorageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("day {0} has no entry numbers left")]
    OrdinalOverflow(String),

    #[error("couldn't encode week file {path:?}: {source}")]
    StorageEncode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("couldn't write week file {path:?}: {source}")]
    StorageWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
