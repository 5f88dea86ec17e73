//! Shared state and argument/result types for the subcommands
//!
//! Each workflow takes plain argument structs rather than clap types, so
//! it can be driven programmatically and from tests.

use std::path::PathBuf;

use crate::config::Config;

/// Everything resolved once at startup and handed to the commands.
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    /// Loaded configuration with environment overrides applied
    pub config: Config,

    /// File the configuration was loaded from
    pub config_path: PathBuf,

    /// Checked-out branch, when running inside a repository
    pub branch: Option<String>,

    /// Top-level working directory, when running inside a repository
    pub repo_root: Option<PathBuf>,
}

impl RunContext {
    pub fn new(config: Config, config_path: PathBuf) -> Self {
        RunContext {
            config,
            config_path,
            branch: None,
            repo_root: None,
        }
    }

    pub fn with_repo(mut self, root: PathBuf, branch: String) -> Self {
        self.repo_root = Some(root);
        self.branch = Some(branch);
        self
    }
}

/// Arguments for the commit workflow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitArgs {
    /// Skip the model and commit a timestamped quick update
    pub fast: bool,

    /// Print the system prompt sent to the model
    pub show_prompt: bool,

    /// Commit without pushing
    pub no_push: bool,

    /// Stage untracked files too
    pub all: bool,
}

/// What happened to the branch push after committing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushStatus {
    Skipped,
    Pushed,
    /// Rejected by the remote; remote changes were pulled
    Rejected { conflicts: Vec<String> },
}

/// Result of the commit workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Clean tree whose pending commits were pushed
    PushedPending(PushStatus),

    /// Clean tree, nothing pending
    NothingToCommit,

    /// The user cleared the message
    Aborted,

    /// The model produced no message
    NoMessage,

    Committed {
        message: String,
        amended: bool,
        push: PushStatus,
    },
}

/// Arguments for the tag workflow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagArgs {
    /// Channel to tag on; asked interactively when absent
    pub channel: Option<String>,

    /// Accept the proposed tag without editing
    pub yes: bool,

    /// Print the tag without creating it
    pub dry_run: bool,
}

/// Result of the tag workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutcome {
    /// The user backed out of a prompt
    Cancelled,

    /// `--dry-run`: the tag that would be created
    Proposed { tag: String },

    Created {
        tag: String,
        pushed: bool,
    },
}
