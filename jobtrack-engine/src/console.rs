//! Interactive console commands
//!
//! Each input line becomes one value update for the session. Filter
//! commands build a complete new [`FilterState`] from the current one, so
//! the session never sees a partially edited query.

use jobtrack_common::{Error, Result};

use crate::filter::{CategoryChoice, FilterState};
use crate::session::ViewCommand;
use crate::sort::SortOrder;

/// Help text printed by the `help` command
pub const HELP: &str = "\
Commands:
  <Enter> | more          show more results
  search [TEXT]           global search (empty clears)
  job [TEXT]              job number search (empty clears)
  series H|J|...|ALL      job series prefix
  category KEY=VALUE      exact field match (VALUE ALL clears)
  contains KEY=TEXT       field substring match (empty TEXT clears)
  scope primary|linked    fields covered by global search
  u46 all|with|without    U46 code presence
  image all|with|without  image presence
  sort asc|desc           delivery date direction
  clear                   reset every filter
  help                    this text
  quit                    exit";

/// One parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    View(ViewCommand),
    Help,
    Quit,
}

fn split_key_value(input: &str) -> Result<(String, &str)> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| Error::InvalidInput(format!("Expected KEY=VALUE, got '{}'", input)))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(Error::InvalidInput("Field key must not be empty".to_string()));
    }
    Ok((key.to_string(), value.trim()))
}

/// Parse `KEY=VALUE` into a category filter entry
pub fn parse_category(input: &str) -> Result<(String, CategoryChoice)> {
    let (key, value) = split_key_value(input)?;
    Ok((key, value.parse()?))
}

/// Parse `KEY=TEXT` into a per-field substring search
pub fn parse_field_search(input: &str) -> Result<(String, String)> {
    let (key, text) = split_key_value(input)?;
    Ok((key, text.to_string()))
}

/// Parse one console line against the current filter state
pub fn parse_line(line: &str, current: &FilterState) -> Result<ConsoleCommand> {
    let line = line.trim();
    let (verb, argument) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let replace = |filter: FilterState| -> Result<ConsoleCommand> {
        Ok(ConsoleCommand::View(ViewCommand::ReplaceFilter(filter)))
    };

    match verb.to_ascii_lowercase().as_str() {
        "" | "more" | "m" => Ok(ConsoleCommand::View(ViewCommand::Grow)),
        "help" | "?" => Ok(ConsoleCommand::Help),
        "quit" | "exit" | "q" => Ok(ConsoleCommand::Quit),
        "clear" => replace(FilterState::default()),
        "search" => replace(FilterState {
            search: argument.to_string(),
            ..current.clone()
        }),
        "job" => replace(FilterState {
            job_search: argument.to_string(),
            ..current.clone()
        }),
        "series" => replace(FilterState {
            series: argument.parse()?,
            ..current.clone()
        }),
        "category" => {
            let (key, choice) = parse_category(argument)?;
            replace(current.clone().with_category(key, choice))
        }
        "contains" => {
            let (key, text) = parse_field_search(argument)?;
            replace(current.clone().with_field_search(key, text))
        }
        "scope" => replace(FilterState {
            search_scope: argument.parse()?,
            ..current.clone()
        }),
        "u46" => replace(FilterState {
            u46: argument.parse()?,
            ..current.clone()
        }),
        "image" => replace(FilterState {
            image: argument.parse()?,
            ..current.clone()
        }),
        "sort" => Ok(ConsoleCommand::View(ViewCommand::ReplaceSort(
            argument.parse::<SortOrder>()?,
        ))),
        other => Err(Error::InvalidInput(format!(
            "Unknown command '{}' (type help)",
            other
        ))),
    }
}
