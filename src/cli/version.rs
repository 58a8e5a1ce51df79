use std::fmt::Display;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde::Serialize;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum VersionFormat {
    Plain,
    Json,
    Yaml,
}

impl Display for VersionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionFormat::Plain => write!(f, "plain"),
            VersionFormat::Json => write!(f, "json"),
            VersionFormat::Yaml => write!(f, "yaml"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct VersionCommand {
    #[arg(short, long, default_value_t = VersionFormat::Plain, help = "The output format")]
    output: VersionFormat,
}

#[derive(Debug, Serialize)]
struct VersionInfo {
    semantic: &'static str,
    build: BuildInfo,
}

#[derive(Debug, Serialize)]
struct BuildInfo {
    commit: &'static str,
    date: &'static str,
}

impl VersionInfo {
    fn current() -> Self {
        Self {
            semantic: env!("CARGO_PKG_VERSION"),
            build: BuildInfo {
                commit: option_env!("WORKLOG_BUILD_COMMIT").unwrap_or("unknown"),
                date: option_env!("WORKLOG_BUILD_DATE").unwrap_or("unknown"),
            },
        }
    }
}

fn render_version(info: &VersionInfo, format: VersionFormat) -> Result<String> {
    Ok(match format {
        VersionFormat::Plain => format!(
            "Version: {}\nCommit: {}\nBuild Date: {}",
            info.semantic, info.build.commit, info.build.date
        ),
        VersionFormat::Json => serde_json::to_string(info)?,
        VersionFormat::Yaml => serde_yaml::to_string(info)?.trim_end().to_string(),
    })
}

/// Command to process `version` command.
pub fn process_version_command(VersionCommand { output }: VersionCommand) -> Result<()> {
    println!("{}", render_version(&VersionInfo::current(), output)?);
    Ok(())
}
