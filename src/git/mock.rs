use crate::error::{FastcommitError, Result};
use crate::git::{is_excluded, PushOutcome, Repository, StagedDiff};
use std::path::PathBuf;
use std::sync::Mutex;

/// Mock repository for testing without actual git operations
///
/// Read results are configured up front; every mutating call is recorded
/// as a short command line (e.g. `commit --amend chore: x`).
pub struct MockRepository {
    root: PathBuf,
    branch: String,
    tags: Mutex<Vec<String>>,
    remote_tags: Vec<String>,
    fetch_error: Option<String>,
    dirty: bool,
    status: String,
    reflog: Option<String>,
    staged_files: Vec<String>,
    diff: String,
    last_message: Option<String>,
    push_outcomes: Mutex<Vec<PushOutcome>>,
    tag_push_outcome: PushOutcome,
    pull_succeeds: bool,
    conflicts: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl MockRepository {
    /// Create a new clean mock repository on `main`
    pub fn new() -> Self {
        MockRepository {
            root: PathBuf::from("."),
            branch: "main".to_string(),
            tags: Mutex::new(Vec::new()),
            remote_tags: Vec::new(),
            fetch_error: None,
            dirty: false,
            status: "On branch main\nnothing to commit, working tree clean".to_string(),
            reflog: None,
            staged_files: Vec::new(),
            diff: String::new(),
            last_message: None,
            push_outcomes: Mutex::new(Vec::new()),
            tag_push_outcome: PushOutcome {
                success: true,
                output: String::new(),
            },
            pull_succeeds: true,
            conflicts: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_tags(self, tags: &[&str]) -> Self {
        *lock(&self.tags) = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_remote_tags(mut self, tags: &[&str]) -> Self {
        self.remote_tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_fetch_error(mut self, reason: impl Into<String>) -> Self {
        self.fetch_error = Some(reason.into());
        self
    }

    pub fn with_dirty(mut self, dirty: bool) -> Self {
        self.dirty = dirty;
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_reflog(mut self, entry: impl Into<String>) -> Self {
        self.reflog = Some(entry.into());
        self
    }

    /// Staged files with a synthetic diff (one `+<path>` line per file)
    pub fn with_staged(mut self, files: &[&str]) -> Self {
        self.staged_files = files.iter().map(|f| f.to_string()).collect();
        self.diff = files
            .iter()
            .map(|f| format!("+{}", f))
            .collect::<Vec<_>>()
            .join("\n");
        self.dirty = self.dirty || !files.is_empty();
        self
    }

    pub fn with_last_message(mut self, message: impl Into<String>) -> Self {
        self.last_message = Some(message.into());
        self
    }

    /// Queue outcomes for successive branch pushes; successful by default
    pub fn with_push_outcome(self, success: bool, output: impl Into<String>) -> Self {
        lock(&self.push_outcomes).push(PushOutcome {
            success,
            output: output.into(),
        });
        self
    }

    pub fn with_tag_push_outcome(mut self, success: bool, output: impl Into<String>) -> Self {
        self.tag_push_outcome = PushOutcome {
            success,
            output: output.into(),
        };
        self
    }

    pub fn with_pull_result(mut self, succeeds: bool, conflicts: &[&str]) -> Self {
        self.pull_succeeds = succeeds;
        self.conflicts = conflicts.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Recorded mutating calls, in order
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: String) {
        lock(&self.calls).push(call);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn root(&self) -> Result<PathBuf> {
        Ok(self.root.clone())
    }

    fn current_branch(&self) -> Result<String> {
        Ok(self.branch.clone())
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        Ok(lock(&self.tags).clone())
    }

    fn list_remote_tags(&self, _remote: &str) -> Result<Vec<String>> {
        Ok(self.remote_tags.clone())
    }

    fn fetch_tags(&self, remote: &str) -> Result<()> {
        self.record(format!("fetch --prune --tags {}", remote));
        match &self.fetch_error {
            Some(reason) => Err(FastcommitError::command(
                format!("git fetch --prune --tags {}", remote),
                reason.clone(),
            )),
            None => {
                let mut tags = lock(&self.tags);
                for tag in &self.remote_tags {
                    if !tags.contains(tag) {
                        tags.push(tag.clone());
                    }
                }
                Ok(())
            }
        }
    }

    fn is_dirty(&self) -> Result<bool> {
        Ok(self.dirty)
    }

    fn stage_tracked(&self) -> Result<()> {
        self.record("add --update".to_string());
        Ok(())
    }

    fn stage_all(&self) -> Result<()> {
        self.record("add -A".to_string());
        Ok(())
    }

    fn staged_diff(&self, excludes: &[String]) -> Result<StagedDiff> {
        let files: Vec<String> = self
            .staged_files
            .iter()
            .filter(|f| !is_excluded(f, excludes))
            .cloned()
            .collect();

        if files.is_empty() {
            return Ok(StagedDiff::default());
        }

        let diff = self
            .diff
            .lines()
            .filter(|line| files.iter().any(|f| line.trim_start_matches('+') == f))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(StagedDiff { files, diff })
    }

    fn last_commit_message(&self) -> Result<Option<String>> {
        Ok(self.last_message.clone())
    }

    fn last_reflog_message(&self) -> Result<Option<String>> {
        Ok(self.reflog.clone())
    }

    fn status(&self) -> Result<String> {
        Ok(self.status.clone())
    }

    fn commit(&self, message: &str, amend: bool) -> Result<()> {
        if amend {
            self.record(format!("commit --amend {}", message));
        } else {
            self.record(format!("commit {}", message));
        }
        Ok(())
    }

    fn push_branch(
        &self,
        remote: &str,
        branch: &str,
        force_with_lease: bool,
    ) -> Result<PushOutcome> {
        let flag = if force_with_lease {
            " --force-with-lease"
        } else {
            ""
        };
        self.record(format!("push{} {} {}", flag, remote, branch));

        let mut queued = lock(&self.push_outcomes);
        if queued.is_empty() {
            Ok(PushOutcome {
                success: true,
                output: String::new(),
            })
        } else {
            Ok(queued.remove(0))
        }
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        let mut tags = lock(&self.tags);
        if tags.iter().any(|t| t == name) {
            return Err(FastcommitError::command(
                format!("git tag {}", name),
                format!("fatal: tag '{}' already exists", name),
            ));
        }
        tags.push(name.to_string());
        drop(tags);

        self.record(format!("tag {}", name));
        Ok(())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<PushOutcome> {
        self.record(format!("push {} {}", remote, name));
        Ok(self.tag_push_outcome.clone())
    }

    fn pull_merge(&self) -> Result<bool> {
        self.record("pull --no-rebase".to_string());
        Ok(self.pull_succeeds)
    }

    fn conflicted_files(&self) -> Result<Vec<String>> {
        Ok(self.conflicts.clone())
    }
}
