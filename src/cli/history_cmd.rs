//! `fastcommit history [query]`: search the shell history.

use console::style;

use crate::cli::orchestration::RunContext;
use crate::error::Result;
use crate::history::{load_history, search, HistoryEntry};
use crate::ui::{Prompt, PromptOutcome, Prompter};

/// Entries offered to the interactive selector
const SELECTOR_LIMIT: usize = 1000;

pub fn format_entry(entry: &HistoryEntry) -> String {
    match entry.time_label() {
        Some(time) => format!("{}  {}", style(time).dim(), entry.command),
        None => entry.command.clone(),
    }
}

/// Print matches for `query`, or let the user pick one when interactive and
/// no query was given. Returns the picked command.
pub fn run_history<P>(
    ctx: &RunContext,
    query: Option<&str>,
    interactive: bool,
    prompter: &mut P,
) -> Result<Option<String>>
where
    P: Prompter + ?Sized,
{
    let path = ctx.config.history.resolved_path()?;
    let entries = load_history(&path)?;
    let query = query.map(str::trim).unwrap_or("");

    if !query.is_empty() || !interactive {
        for entry in search(&entries, query, ctx.config.history.limit) {
            println!("{}", format_entry(entry));
        }
        return Ok(None);
    }

    let items: Vec<String> = entries
        .iter()
        .take(SELECTOR_LIMIT)
        .map(|entry| entry.command.clone())
        .collect();
    if items.is_empty() {
        return Ok(None);
    }

    match prompter.ask(&Prompt::fuzzy_select("Search history", items))? {
        PromptOutcome::Submitted(command) => {
            println!("{}", command);
            Ok(Some(command))
        }
        PromptOutcome::Cancelled => Ok(None),
    }
}
