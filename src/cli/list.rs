use std::fmt::Display;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::info;

use crate::{
    manager::{Action, ActionResult, EntryStatus, LogManager},
    storage::week_storage::WeekStorage,
    utils::clock::Clock,
};

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

const PERIOD_HELP: &str = "The period to list entries for.
Single day: today (default), yesterday.
Multi day: 3day (last 3 days including today), week (last 7 days), cweek (current work week).
Extended: month (last 30 days), quarter (last 90 days), year (last 365 days)";

#[derive(Debug, Parser)]
pub struct ListCommand {
    #[arg(short, long, default_value = "today", help = PERIOD_HELP)]
    period: String,
    #[arg(short, long, default_value_t = OutputFormat::Text, help = "The output format")]
    output: OutputFormat,
}

/// Command to process `list` command. Prints every entry of the period in the requested format.
pub async fn process_list_command(
    ListCommand { period, output }: ListCommand,
    manager: &LogManager<impl WeekStorage, impl Clock>,
) -> Result<()> {
    let entries = manager.action(Action::List, "", "", &period).await?;

    if entries.is_empty() {
        info!("No entries found for {period}");
        println!("No entries found");
        return Ok(());
    }

    println!("{}", render_entries(&period, &entries, output)?);
    Ok(())
}

#[derive(Serialize)]
struct JsonListing<'a> {
    period: &'a str,
    worklog: Vec<JsonEntry<'a>>,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    id: &'a str,
    status: EntryStatus,
    message: &'a str,
}

fn render_entries(period: &str, entries: &ActionResult, output: OutputFormat) -> Result<String> {
    if output == OutputFormat::Json {
        let listing = JsonListing {
            period,
            worklog: entries
                .ordered()
                .map(|(id, entry)| JsonEntry {
                    id,
                    status: entry.status,
                    message: &entry.message,
                })
                .collect(),
        };
        return Ok(serde_json::to_string(&listing)?);
    }

    let mut lines = vec![format!("Period: {period}"), "Worklog:".to_string()];
    for (id, entry) in entries.ordered() {
        let item = format!("[{id}] {}", entry.message);
        lines.push(match output {
            // A JSON string is also a valid double quoted YAML scalar.
            OutputFormat::Yaml => format!("- {}", serde_json::to_string(&item)?),
            OutputFormat::Text | OutputFormat::Json => format!("- {item}"),
        });
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::{render_entries, OutputFormat};
    use crate::manager::{ActionResult, EntryStatus, LogEntry};

    fn entries() -> ActionResult {
        let mut result = ActionResult::default();
        for (id, status, message) in [
            ("1015-1", EntryStatus::Completed, "Reviewed pull requests"),
            ("1016-1", EntryStatus::Started, "Fixed \"login\" bug"),
        ] {
            result.ids.push(id.to_string());
            result.entries.insert(
                id.to_string(),
                LogEntry {
                    status,
                    time: 0,
                    message: message.to_string(),
                },
            );
        }
        result
    }

    #[test]
    fn text_output() -> Result<()> {
        assert_eq!(
            render_entries("week", &entries(), OutputFormat::Text)?,
            "Period: week\nWorklog:\n- [1015-1] Reviewed pull requests\n- [1016-1] Fixed \"login\" bug"
        );
        Ok(())
    }

    #[test]
    fn yaml_output_quotes_items() -> Result<()> {
        let rendered = render_entries("week", &entries(), OutputFormat::Yaml)?;
        assert_eq!(
            rendered,
            "Period: week\nWorklog:\n- \"[1015-1] Reviewed pull requests\"\n- \"[1016-1] Fixed \\\"login\\\" bug\""
        );

        let items: Vec<String> = serde_yaml::from_str(rendered.split_once("Worklog:\n").unwrap().1)?;
        assert_eq!(items[1], "[1016-1] Fixed \"login\" bug");
        Ok(())
    }

    #[test]
    fn json_output() -> Result<()> {
        let rendered = render_entries("week", &entries(), OutputFormat::Json)?;
        assert_eq!(
            rendered,
            r#"{"period":"week","worklog":[{"id":"1015-1","status":"completed","message":"Reviewed pull requests"},{"id":"1016-1","status":"started","message":"Fixed \"login\" bug"}]}"#
        );
        Ok(())
    }
}
