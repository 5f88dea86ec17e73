//! Shell history reading and fuzzy search.

use crate::error::Result;
use chrono::{Local, TimeZone};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// One command from the history file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub command: String,
    /// Seconds since the epoch, present in zsh extended history
    pub timestamp: Option<i64>,
}

impl HistoryEntry {
    /// Local time of the entry, `YYYY-MM-DD HH:MM`
    pub fn time_label(&self) -> Option<String> {
        let ts = self.timestamp?;
        Local
            .timestamp_opt(ts, 0)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
    }
}

/// Parse history text, oldest entry first.
///
/// Understands plain files (one command per line) and zsh extended history
/// (`: <start>:<duration>;<command>`), including commands continued over
/// several lines with a trailing backslash.
pub fn parse_history(text: &str) -> Vec<HistoryEntry> {
    let mut entries: Vec<HistoryEntry> = Vec::new();
    let mut pending: Option<HistoryEntry> = None;

    for line in text.lines() {
        if let Some(entry) = pending.as_mut() {
            entry.command.push('\n');
            entry.command.push_str(line);
            if !line.ends_with('\\') {
                entries.extend(pending.take());
            }
            continue;
        }

        let entry = parse_line(line);
        if entry.command.trim().is_empty() {
            continue;
        }

        if line.ends_with('\\') {
            pending = Some(entry);
        } else {
            entries.push(entry);
        }
    }

    entries.extend(pending);

    for entry in &mut entries {
        entry.command = entry.command.trim().to_string();
    }
    entries
}

fn parse_line(line: &str) -> HistoryEntry {
    if let Some(rest) = line.strip_prefix(": ") {
        if let Some((meta, command)) = rest.split_once(';') {
            let timestamp = meta
                .split(':')
                .next()
                .and_then(|start| start.trim().parse::<i64>().ok());
            if timestamp.is_some() {
                return HistoryEntry {
                    command: command.to_string(),
                    timestamp,
                };
            }
        }
    }

    HistoryEntry {
        command: line.to_string(),
        timestamp: None,
    }
}

/// Drop repeated commands, keeping the most recent occurrence.
///
/// Returns the entries newest first.
pub fn dedup_newest_first(entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for entry in entries.into_iter().rev() {
        if seen.insert(entry.command.clone()) {
            unique.push(entry);
        }
    }

    unique
}

/// Read a history file; invalid UTF-8 (zsh metafied bytes) is replaced.
pub fn load_history(path: &Path) -> Result<Vec<HistoryEntry>> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(dedup_newest_first(parse_history(&text)))
}

/// Case-insensitive subsequence match: every query character appears in
/// order in the candidate.
pub fn fuzzy_match(query: &str, candidate: &str) -> bool {
    let mut haystack = candidate.chars().flat_map(char::to_lowercase);

    query
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .all(|needle| haystack.any(|c| c == needle))
}

/// Newest `limit` entries matching `query` (all entries when it is empty).
pub fn search<'a>(entries: &'a [HistoryEntry], query: &str, limit: usize) -> Vec<&'a HistoryEntry> {
    entries
        .iter()
        .filter(|entry| query.trim().is_empty() || fuzzy_match(query, &entry.command))
        .take(limit)
        .collect()
}
