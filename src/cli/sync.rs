use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::{
    io::{stdin, AsyncBufReadExt, BufReader},
    process::Command,
};
use tracing::{debug, info, instrument};

use crate::{
    error::WorklogError,
    utils::{
        clock::{Clock, DefaultClock},
        time::snapshot_timestamp,
    },
};

use super::Workspace;

#[derive(Debug, Parser)]
pub struct SyncCommand {
    #[arg(long, help = "Force push the local history to the remote branch")]
    force: bool,
}

/// Git repository living in the logs directory.
struct GitRepository {
    dir: PathBuf,
}

impl GitRepository {
    fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn is_initialized(&self) -> bool {
        self.dir.join(".git").exists()
    }

    /// Runs git inside the repository and returns its trimmed stdout.
    #[instrument(skip(self))]
    async fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.dir)
            .output()
            .await
            .with_context(|| format!("Couldn't run git {}", args.join(" ")))?;

        if !output.status.success() {
            bail!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!("git {} -> {stdout:?}", args.join(" "));
        Ok(stdout)
    }

    async fn has_changes(&self) -> Result<bool> {
        Ok(count_changes(&self.run(&["status", "--porcelain"]).await?) > 0)
    }

    /// Stages everything, commits it as a snapshot and pushes the branch.
    async fn snapshot(&self, branch: &str, timestamp: &str, force: bool) -> Result<String> {
        self.run(&["add", "."]).await?;
        if self.has_changes().await? {
            self.run(&["commit", "-m", &format!("SNAPSHOT: {timestamp}")])
                .await?;
        }
        let commit = self.run(&["rev-parse", "HEAD"]).await?;

        let mut push = vec!["push", "-u", "origin", branch];
        if force {
            push.push("--force");
        }
        self.run(&push).await?;
        Ok(commit)
    }
}

/// Number of changed paths in `git status --porcelain` output.
fn count_changes(porcelain: &str) -> usize {
    porcelain.lines().filter(|line| !line.trim().is_empty()).count()
}

/// Repository name the user has to create on the remote, e.g. `worklog` for
/// `git@github.com:user/worklog.git`.
fn remote_repository_name(uri: &str) -> &str {
    let uri = uri.trim().trim_end_matches('/');
    let name = uri.rsplit(['/', ':']).next().unwrap_or(uri);
    name.strip_suffix(".git").unwrap_or(name)
}

async fn read_line() -> Result<String> {
    let mut lines = BufReader::new(stdin()).lines();
    Ok(lines.next_line().await?.unwrap_or_default())
}

/// Command to process `sync` command. Snapshots the logs directory into git and pushes it.
pub async fn process_sync_command(
    SyncCommand { force }: SyncCommand,
    workspace: &Workspace,
) -> Result<()> {
    let git = &workspace.configuration.settings.git;
    if !git.sync {
        bail!("Git sync is disabled, set settings.git.sync to true to enable it");
    }
    let uri = required(git.uri.as_deref(), "settings.git.uri")?;
    let branch = required(git.branch.as_deref(), "settings.git.branch")?;

    tokio::fs::create_dir_all(&workspace.logs_root)
        .await
        .with_context(|| format!("Couldn't create {:?}", workspace.logs_root))?;
    let repository = GitRepository::new(&workspace.logs_root);
    let timestamp =
        snapshot_timestamp(&DefaultClock.time().with_timezone(&workspace.week_config.timezone));

    let commit = if repository.is_initialized() {
        match update(&repository, branch, &timestamp, force).await? {
            Some(commit) => commit,
            None => {
                println!("You're up to date!");
                return Ok(());
            }
        }
    } else {
        match initialize(&repository, &workspace.logs_root, uri, branch, &timestamp).await? {
            Some(commit) => commit,
            None => return Ok(()),
        }
    };

    info!("Synced {branch} at {commit}");
    println!("Worklog synced to Git (Commit: {commit})");
    Ok(())
}

fn required<'a>(value: Option<&'a str>, key: &str) -> Result<&'a str, WorklogError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| WorklogError::ConfigurationMissing(format!("{key} is not set")))
}

async fn initialize(
    repository: &GitRepository,
    logs_root: &Path,
    uri: &str,
    branch: &str,
    timestamp: &str,
) -> Result<Option<String>> {
    println!("No git repository found in {logs_root:?}. Initialize one? [y/N]");
    let answer = read_line().await?.trim().to_lowercase();
    if answer != "y" && answer != "yes" {
        println!("Sync cancelled");
        return Ok(None);
    }

    repository.run(&["init"]).await?;
    println!(
        "Create an empty repository named `{}` for {uri} and press Enter to continue",
        remote_repository_name(uri)
    );
    read_line().await?;

    repository.run(&["remote", "add", "origin", uri]).await?;
    repository.run(&["checkout", "-b", branch]).await?;
    // The first push needs a commit even for an empty logs directory.
    repository.run(&["add", "."]).await?;
    repository
        .run(&["commit", "--allow-empty", "-m", &format!("SNAPSHOT: {timestamp}")])
        .await?;
    repository.snapshot(branch, timestamp, false).await.map(Some)
}

/// Brings the local branch up to date with the remote one and pushes local changes. Remote
/// commits are always pulled first, `force` only affects the final push. Returns `None` when
/// there was nothing to do.
async fn update(
    repository: &GitRepository,
    branch: &str,
    timestamp: &str,
    force: bool,
) -> Result<Option<String>> {
    repository.run(&["fetch", "origin"]).await?;
    let remote_branch = format!("origin/{branch}");

    let local = repository.run(&["rev-parse", "HEAD"]).await?;
    let remote = repository.run(&["rev-parse", &remote_branch]).await?;
    let dirty = repository.has_changes().await?;

    if local == remote && !dirty {
        return Ok(None);
    }

    if local != remote {
        let behind = repository
            .run(&["rev-list", "--count", &format!("HEAD..{remote_branch}")])
            .await?;
        if behind != "0" {
            info!("Local branch is {behind} commit(s) behind {remote_branch}");
            // New week files are untracked, so they have to be stashed as well.
            if dirty {
                repository.run(&["stash", "push", "--include-untracked"]).await?;
            }
            repository.run(&["pull", "--rebase", "origin", branch]).await?;
            if dirty {
                repository.run(&["stash", "pop"]).await?;
            }
        }
    }

    repository.snapshot(branch, timestamp, force).await.map(Some)
}
