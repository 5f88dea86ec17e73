use regex::Regex;

/// Commit types accepted in a conventional header, with their meaning.
pub const COMMIT_TYPES: &[(&str, &str)] = &[
    ("docs", "Documentation only changes"),
    (
        "style",
        "Changes that do not affect the meaning of the code (white-space, formatting, missing semi-colons, etc)",
    ),
    (
        "refactor",
        "A code change that neither fixes a bug nor adds a feature",
    ),
    ("perf", "A code change that improves performance"),
    ("test", "Adding missing tests or correcting existing tests"),
    (
        "build",
        "Changes that affect the build system or external dependencies",
    ),
    ("ci", "Changes to our CI configuration files and scripts"),
    ("chore", "Other changes that don't modify src or test files"),
    ("revert", "Reverts a previous commit"),
    ("feat", "A new feature"),
    ("fix", "A bug fix"),
];

/// Header of a conventional commit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommit {
    pub r#type: String,
    pub scope: Option<String>,
    pub description: String,
    pub is_breaking_change: bool,
}

impl ParsedCommit {
    /// Parse the first line as `type(scope)!: description`.
    ///
    /// Returns `None` for messages that are not conventional, including
    /// unknown types.
    pub fn parse(message: &str) -> Option<Self> {
        let header = message.lines().next()?.trim();

        let captures = Regex::new(r"^([a-z]+)(?:\(([^)]+)\))?(!?):\s*(\S.*)$")
            .ok()?
            .captures(header)?;

        let r#type = captures.get(1)?.as_str().to_string();
        if !COMMIT_TYPES.iter().any(|(name, _)| *name == r#type) {
            return None;
        }

        let scope = captures.get(2).map(|m| m.as_str().to_string());
        let has_exclamation = captures.get(3).is_some_and(|m| m.as_str() == "!");
        let description = captures.get(4)?.as_str().trim().to_string();

        Some(ParsedCommit {
            r#type,
            scope,
            description,
            is_breaking_change: has_exclamation || message.contains("BREAKING CHANGE:"),
        })
    }
}

/// Prefix shared by every quick-update commit on `branch`
pub fn quick_update_prefix(branch: &str) -> String {
    format!("chore: quick update {}", branch)
}

/// Message for a quick update, stamped with a local time
pub fn quick_update_message(branch: &str, timestamp: &str) -> String {
    format!("{} at {}", quick_update_prefix(branch), timestamp)
}

/// Whether `previous` was itself a quick update of `branch` and may be amended
pub fn is_quick_update_of(previous: &str, branch: &str) -> bool {
    previous.contains(&quick_update_prefix(branch))
}
