pub mod add;
pub mod list;
pub mod sync;
pub mod version;

use std::path::PathBuf;

use add::{process_add_command, AddCommand};
use anyhow::Result;
use clap::{Parser, Subcommand};
use list::{process_list_command, ListCommand};
use sync::{process_sync_command, SyncCommand};
use tracing::{debug, level_filters::LevelFilter};
use version::{process_version_command, VersionCommand};

use crate::{
    calendar::WeekConfig,
    config::{load_configuration, Configuration},
    manager::LogManager,
    storage::week_storage::WeekStorageImpl,
    utils::{
        clock::DefaultClock,
        dir::{user_home_dir, worklog_home_dir},
        logging::enable_logging,
    },
};

#[derive(Parser, Debug)]
#[command(name = "worklog", version, long_about = None)]
#[command(about = "Worklog is a CLI tool to help you track your work", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Enable debug mode")]
    debug: bool,
    #[arg(
        long,
        short,
        global = true,
        help = "Path to the configuration file. By default $HOME/.worklog/config is used"
    )]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        visible_alias = "a",
        about = "Add a new entry to your worklog",
        long_about = "Add a new entry to your worklog and then display the ID associated with the entry."
    )]
    Add {
        #[command(flatten)]
        command: AddCommand,
    },
    #[command(visible_alias = "ls", about = "List entries in your worklog")]
    List {
        #[command(flatten)]
        command: ListCommand,
    },
    #[command(visible_alias = "sy", about = "Sync your worklog to Git")]
    Sync {
        #[command(flatten)]
        command: SyncCommand,
    },
    #[command(about = "Print the version number of Worklog")]
    Version {
        #[command(flatten)]
        command: VersionCommand,
    },
}

/// Everything a command needs that comes from the configuration.
pub struct Workspace {
    pub configuration: Configuration,
    pub week_config: WeekConfig,
    pub logs_root: PathBuf,
}

impl Workspace {
    pub fn load(explicit_config: Option<PathBuf>) -> Result<Self> {
        let configuration = load_configuration(explicit_config.as_deref(), &worklog_home_dir()?)?;
        let week_config = configuration.week_config()?;
        let logs_root = configuration.logs_path(&user_home_dir()?)?;
        debug!("Logs path: {logs_root:?}");

        Ok(Self {
            configuration,
            week_config,
            logs_root,
        })
    }

    /// Week directories are created on the first write, so building a manager touches nothing.
    pub fn log_manager(&self) -> LogManager<WeekStorageImpl, DefaultClock> {
        let storage = WeekStorageImpl::new(self.logs_root.clone());
        LogManager::new(storage, DefaultClock, self.week_config)
    }
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.debug {
        Some(LevelFilter::DEBUG)
    } else {
        None
    };
    enable_logging(&worklog_home_dir()?, logging_level, args.debug)?;

    match args.commands {
        Commands::Version { command } => process_version_command(command),
        Commands::Add { command } => {
            let workspace = Workspace::load(args.config)?;
            process_add_command(command, &workspace.log_manager()).await
        }
        Commands::List { command } => {
            let workspace = Workspace::load(args.config)?;
            process_list_command(command, &workspace.log_manager()).await
        }
        Commands::Sync { command } => {
            process_sync_command(command, &Workspace::load(args.config)?).await
        }
    }
}
