use anyhow::{bail, Result};
use clap::Parser;
use tracing::debug;

use crate::{
    manager::{Action, EntryStatus, LogManager},
    storage::week_storage::WeekStorage,
    utils::clock::Clock,
};

#[derive(Debug, Parser)]
pub struct AddCommand {
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        help = "Words of the entry, joined with spaces"
    )]
    words: Vec<String>,
}

/// Command to process `add` command. Stores the entry for today and prints its id.
pub async fn process_add_command(
    AddCommand { words }: AddCommand,
    manager: &LogManager<impl WeekStorage, impl Clock>,
) -> Result<()> {
    let message = words.join(" ");
    debug!("Adding entry {message:?}");

    let added = manager.action(Action::Add, &message, "", "").await?;

    let mut entries = added.ordered();
    match (entries.next(), entries.next()) {
        (Some((id, entry)), None) if entry.status == EntryStatus::Added => {
            println!("Entry ID: {id}");
            Ok(())
        }
        (Some((_, entry)), None) => bail!("Unexpected status: {}", entry.status),
        _ => bail!("Failed to add entry"),
    }
}
