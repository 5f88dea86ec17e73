//! Git operations abstraction layer
//!
//! The [Repository] trait covers everything the commands need from git.
//! Implementations:
//!
//! - [repository::Git2Repository]: local reads through `git2`, network and
//!   commit operations through the `git` binary ([command::GitCli])
//! - [mock::MockRepository]: in-memory implementation for tests
//!
//! The free functions at the bottom interpret git's textual output.

pub mod command;
pub mod mock;
pub mod repository;

pub use command::{CommandOutput, GitCli};
pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use std::path::PathBuf;

/// Staged changes as handed to the commit message generator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedDiff {
    /// Paths of the staged files, excluded paths removed
    pub files: Vec<String>,
    /// Unified diff of those files
    pub diff: String,
}

impl StagedDiff {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// "detected 3 staged files"
    pub fn detected_message(&self) -> String {
        let count = self.files.len();
        let suffix = if count == 1 { "" } else { "s" };
        format!("detected {} staged file{}", count, suffix)
    }
}

/// Outcome of a push; git reports rejections in its output, so the text is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushOutcome {
    pub success: bool,
    pub output: String,
}

impl From<CommandOutput> for PushOutcome {
    fn from(output: CommandOutput) -> Self {
        PushOutcome {
            success: output.success,
            output: output.combined(),
        }
    }
}

/// Git operations used by fastcommit
///
/// Methods that mutate the repository are expected to run through the
/// user's `git` so that hooks and credential helpers apply.
pub trait Repository: Send {
    /// Top-level working directory
    fn root(&self) -> Result<PathBuf>;

    /// Name of the checked-out branch
    fn current_branch(&self) -> Result<String>;

    /// All local tag names
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Tag names advertised by `remote` (`git ls-remote --tags`)
    fn list_remote_tags(&self, remote: &str) -> Result<Vec<String>>;

    /// `git fetch --prune --tags <remote>`
    fn fetch_tags(&self, remote: &str) -> Result<()>;

    /// Any tracked modification or untracked file
    fn is_dirty(&self) -> Result<bool>;

    /// `git add --update`
    fn stage_tracked(&self) -> Result<()>;

    /// `git add -A`
    fn stage_all(&self) -> Result<()>;

    /// Staged changes against HEAD, skipping paths matched by `excludes`
    fn staged_diff(&self, excludes: &[String]) -> Result<StagedDiff>;

    /// Message of the HEAD commit, `None` on an unborn branch
    fn last_commit_message(&self) -> Result<Option<String>>;

    /// Most recent HEAD reflog message, e.g. `commit (amend): ...`
    fn last_reflog_message(&self) -> Result<Option<String>>;

    /// Human-readable `git status`
    fn status(&self) -> Result<String>;

    fn commit(&self, message: &str, amend: bool) -> Result<()>;

    fn push_branch(&self, remote: &str, branch: &str, force_with_lease: bool)
        -> Result<PushOutcome>;

    /// Lightweight tag on HEAD
    fn create_tag(&self, name: &str) -> Result<()>;

    fn push_tag(&self, remote: &str, name: &str) -> Result<PushOutcome>;

    /// `git pull --no-rebase`; returns whether the merge went through
    fn pull_merge(&self) -> Result<bool>;

    /// Paths with unresolved merge conflicts
    fn conflicted_files(&self) -> Result<Vec<String>>;
}

/// Extract tag names from `git ls-remote --tags` output.
///
/// Peeled entries (`refs/tags/v1.0.0^{}`) are folded into their tag.
pub fn parse_remote_tags(output: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();

    for line in output.lines() {
        let Some(reference) = line.split_whitespace().nth(1) else {
            continue;
        };
        let Some(name) = reference.strip_prefix("refs/tags/") else {
            continue;
        };
        let name = name.trim_end_matches("^{}");

        if !tags.iter().any(|t| t == name) {
            tags.push(name.to_string());
        }
    }

    tags
}

/// The remote refused a tag because it already has one with that name.
pub fn is_remote_tag_exists(output: &str) -> bool {
    output.contains("[rejected]") && output.contains("tag already exists")
}

/// The remote moved on and a branch push was refused.
pub fn is_push_rejected(output: &str) -> bool {
    output.contains("stale info")
        || output.contains("rejected")
        || output.contains("failed to push")
}

/// Local commits are waiting to be published.
///
/// Either the branch is plainly ahead of its upstream, or it diverged
/// because the last local action amended an already pushed commit.
pub fn needs_push(status: &str, last_reflog: Option<&str>) -> bool {
    if status.contains("Your branch is ahead of")
        && status.contains("(use \"git push\" to publish your local commits)")
    {
        return true;
    }

    status.contains("Your branch and '")
        && status.contains("have diverged")
        && last_reflog.is_some_and(|entry| entry.contains("(amend)"))
}

/// A merge is waiting for its commit.
pub fn is_merge_in_progress(status: &str) -> bool {
    status.contains("(use \"git commit\" to conclude merge)") || status.contains("All conflicts fixed")
}

/// Whether `path` is covered by one of the exclusion patterns.
///
/// A pattern matches the full path, the file name, a directory prefix
/// (`vendor/`), or an extension glob (`*.lock`).
pub fn is_excluded(path: &str, patterns: &[String]) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or(path);

    patterns.iter().any(|pattern| {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return false;
        }

        if let Some(suffix) = pattern.strip_prefix('*') {
            return file_name.ends_with(suffix);
        }

        if pattern.ends_with('/') {
            return path.starts_with(pattern) || path.contains(&format!("/{}", pattern));
        }

        path == pattern || file_name == pattern
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote_tags() {
        let output = "\
a1b2c3\trefs/tags/v0.1.0
d4e5f6\trefs/tags/v0.1.0^{}
0a0b0c\trefs/tags/v0.2.0-alpha.1
ffffff\trefs/heads/main
";
        assert_eq!(parse_remote_tags(output), vec!["v0.1.0", "v0.2.0-alpha.1"]);
    }

    #[test]
    fn test_parse_remote_tags_empty() {
        assert!(parse_remote_tags("").is_empty());
    }

    #[test]
    fn test_remote_tag_exists() {
        let stderr = "To github.com:pubgo/fastcommit.git\n ! [rejected]        v0.1.0 -> v0.1.0 (already exists)\nerror: failed to push some refs\nhint: Updates were rejected because the tag already exists in the remote.";
        assert!(is_remote_tag_exists(stderr));
        assert!(!is_remote_tag_exists("Everything up-to-date"));
    }

    #[test]
    fn test_push_rejected() {
        assert!(is_push_rejected(" ! [rejected]        main -> main (stale info)"));
        assert!(is_push_rejected("error: failed to push some refs to 'origin'"));
        assert!(!is_push_rejected("Everything up-to-date"));
    }

    #[test]
    fn test_needs_push_when_ahead() {
        let status = "On branch main\nYour branch is ahead of 'origin/main' by 2 commits.\n  (use \"git push\" to publish your local commits)\n\nnothing to commit, working tree clean";
        assert!(needs_push(status, None));
    }

    #[test]
    fn test_needs_push_after_amend_divergence() {
        let status = "On branch fix/version\nYour branch and 'origin/fix/version' have diverged,\nand have 1 and 1 different commits each, respectively.";
        assert!(needs_push(status, Some("commit (amend): chore: quick update")));
        assert!(!needs_push(status, Some("commit: feat: add x")));
        assert!(!needs_push(status, None));
    }

    #[test]
    fn test_needs_push_up_to_date() {
        let status = "On branch main\nYour branch is up to date with 'origin/main'.";
        assert!(!needs_push(status, None));
    }

    #[test]
    fn test_merge_in_progress() {
        assert!(is_merge_in_progress(
            "All conflicts fixed but you are still merging.\n  (use \"git commit\" to conclude merge)"
        ));
        assert!(!is_merge_in_progress("nothing to commit"));
    }

    #[test]
    fn test_is_excluded() {
        let patterns = vec![
            "Cargo.lock".to_string(),
            "*.sum".to_string(),
            "vendor/".to_string(),
        ];
        assert!(is_excluded("Cargo.lock", &patterns));
        assert!(is_excluded("crates/a/Cargo.lock", &patterns));
        assert!(is_excluded("go.sum", &patterns));
        assert!(is_excluded("vendor/x/y.go", &patterns));
        assert!(is_excluded("lib/vendor/z.rs", &patterns));
        assert!(!is_excluded("src/main.rs", &patterns));
    }

    #[test]
    fn test_detected_message() {
        let mut diff = StagedDiff::default();
        diff.files.push("a.rs".to_string());
        assert_eq!(diff.detected_message(), "detected 1 staged file");
        diff.files.push("b.rs".to_string());
        assert_eq!(diff.detected_message(), "detected 2 staged files");
    }
}
