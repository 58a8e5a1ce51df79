use std::{env, path::PathBuf};

use anyhow::{Context, Result};

const WORKLOG_DIR: &str = ".worklog";

pub fn user_home_dir() -> Result<PathBuf> {
    let variable = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    env::var(variable)
        .map(PathBuf::from)
        .with_context(|| format!("Couldn't find the home directory, {variable} is not set"))
}

/// Directory holding the configuration and the application logs, `$HOME/.worklog`.
pub fn worklog_home_dir() -> Result<PathBuf> {
    let path = user_home_dir()?.join(WORKLOG_DIR);
    std::fs::create_dir_all(&path)
        .with_context(|| format!("Couldn't create worklog directory {path:?}"))?;
    Ok(path)
}
