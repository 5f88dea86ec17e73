use crate::error::{FastcommitError, Result};
use crate::git::{is_excluded, parse_remote_tags, GitCli, PushOutcome, StagedDiff};
use git2::{DiffFormat, DiffOptions, ErrorCode, Repository as Git2Repo, StatusOptions};
use std::path::{Path, PathBuf};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    cli: GitCli,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;
        Self::from_git2(repo)
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Result<Self> {
        let workdir = repo
            .workdir()
            .ok_or_else(|| FastcommitError::config("bare repositories are not supported"))?
            .to_path_buf();

        Ok(Git2Repository {
            repo,
            cli: GitCli::new(workdir),
        })
    }

    fn head_tree(&self) -> Result<Option<git2::Tree<'_>>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_tree()?)),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl super::Repository for Git2Repository {
    fn root(&self) -> Result<PathBuf> {
        Ok(self.cli.workdir().to_path_buf())
    }

    fn current_branch(&self) -> Result<String> {
        match self.repo.head() {
            Ok(head) => Ok(head.shorthand().unwrap_or("HEAD").to_string()),
            // a fresh repository has HEAD pointing at a branch with no commits
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                let head = self.repo.find_reference("HEAD")?;
                let target = head.symbolic_target().unwrap_or("HEAD");
                Ok(target.trim_start_matches("refs/heads/").to_string())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;

        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn list_remote_tags(&self, remote: &str) -> Result<Vec<String>> {
        let output = self.cli.output(&["ls-remote", "--tags", remote])?;
        Ok(parse_remote_tags(&output))
    }

    fn fetch_tags(&self, remote: &str) -> Result<()> {
        self.cli.output(&["fetch", "--prune", "--tags", remote])?;
        Ok(())
    }

    fn is_dirty(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(true).include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(!statuses.is_empty())
    }

    fn stage_tracked(&self) -> Result<()> {
        self.cli.output(&["add", "--update"])?;
        Ok(())
    }

    fn stage_all(&self) -> Result<()> {
        self.cli.output(&["add", "-A"])?;
        Ok(())
    }

    fn staged_diff(&self, excludes: &[String]) -> Result<StagedDiff> {
        let tree = self.head_tree()?;
        let mut index = self.repo.index()?;
        // staging ran through the git binary
        index.read(false)?;

        let mut options = DiffOptions::new();
        options.minimal(true);

        let diff = self
            .repo
            .diff_tree_to_index(tree.as_ref(), Some(&index), Some(&mut options))?;

        let delta_path = |delta: &git2::DiffDelta<'_>| {
            delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
        };

        let files: Vec<String> = diff
            .deltas()
            .filter_map(|delta| delta_path(&delta))
            .filter(|path| !is_excluded(path, excludes))
            .collect();

        if files.is_empty() {
            return Ok(StagedDiff::default());
        }

        let mut text = String::new();
        diff.print(DiffFormat::Patch, |delta, _hunk, line| {
            let keep = delta_path(&delta).is_some_and(|path| !is_excluded(&path, excludes));
            if keep {
                if let '+' | '-' | ' ' = line.origin() {
                    text.push(line.origin());
                }
                text.push_str(&String::from_utf8_lossy(line.content()));
            }
            true
        })?;

        Ok(StagedDiff {
            files,
            diff: text.trim().to_string(),
        })
    }

    fn last_commit_message(&self) -> Result<Option<String>> {
        match self.repo.head() {
            Ok(head) => {
                let commit = head.peel_to_commit()?;
                Ok(commit.message().map(|m| m.trim().to_string()))
            }
            Err(e) if e.code() == ErrorCode::UnbornBranch => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn last_reflog_message(&self) -> Result<Option<String>> {
        let reflog = self.repo.reflog("HEAD")?;
        Ok(reflog
            .get(0)
            .and_then(|entry| entry.message().map(|m| m.to_string())))
    }

    fn status(&self) -> Result<String> {
        self.cli.output(&["status"])
    }

    fn commit(&self, message: &str, amend: bool) -> Result<()> {
        let mut args = vec!["commit"];
        if amend {
            args.push("--amend");
        }
        args.extend(["-m", message]);

        self.cli.output(&args)?;
        Ok(())
    }

    fn push_branch(
        &self,
        remote: &str,
        branch: &str,
        force_with_lease: bool,
    ) -> Result<PushOutcome> {
        let mut args = vec!["push"];
        if force_with_lease {
            args.push("--force-with-lease");
        }
        args.extend([remote, branch]);

        Ok(self.cli.run(&args)?.into())
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        self.repo.tag_lightweight(name, head.as_object(), false)?;
        Ok(())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<PushOutcome> {
        Ok(self.cli.run(&["push", remote, name])?.into())
    }

    fn pull_merge(&self) -> Result<bool> {
        self.cli.interactive(&["pull", "--no-rebase"])
    }

    fn conflicted_files(&self) -> Result<Vec<String>> {
        let mut index = self.repo.index()?;
        index.read(false)?;
        if !index.has_conflicts() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for conflict in index.conflicts()? {
            let conflict = conflict?;
            let entry = conflict.our.or(conflict.their).or(conflict.ancestor);
            if let Some(entry) = entry {
                let path = String::from_utf8_lossy(&entry.path).into_owned();
                if !files.contains(&path) {
                    files.push(path);
                }
            }
        }

        Ok(files)
    }
}
