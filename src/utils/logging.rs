use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::{format::FmtSpan, writer::MakeWriterExt};

pub const LOG_PREFIX: &str = "worklog";

/// Directory inside of the worklog home that keeps the rolling log files.
pub const TRACING_DIR: &str = "tracing";

/// Logs are always written into daily files under `application_data_path`. With `show_std` they
/// are mirrored to stderr so that command output on stdout stays parseable.
pub fn enable_logging(
    application_data_path: &Path,
    log_level: Option<LevelFilter>,
    show_std: bool,
) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(5)
        .filename_prefix(LOG_PREFIX)
        .build(application_data_path.join(TRACING_DIR))?;

    let stderr = std::io::stderr.with_filter(move |_| show_std);

    let level = log_level
        .map(|v| v.to_string())
        .unwrap_or_else(|| std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()));

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(format!(
            "{}={level}",
            env!("CARGO_PKG_NAME").replace("-", "_"),
        )))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(stderr.and(appender))
        .pretty()
        .init();
    Ok(())
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .init()
});
