//! The default command: draft a message, commit and push.

use chrono::Local;
use log::info;

use crate::boundary::BoundaryWarning;
use crate::cli::orchestration::{CommitArgs, CommitOutcome, PushStatus, RunContext};
use crate::cli::version_cmd::write_release_version;
use crate::domain::commit::{is_quick_update_of, quick_update_message, ParsedCommit};
use crate::domain::parse_tags;
use crate::error::{FastcommitError, Result};
use crate::git::{is_merge_in_progress, is_push_rejected, needs_push, Repository};
use crate::llm::ChatCompletion;
use crate::prompt::{generate_prompt, CommitType};
use crate::ui::{self, Prompt, PromptOutcome, Prompter};

const MESSAGE_PROMPT: &str = "git message (edit or enter)";

/// Run the commit workflow.
///
/// The chat client is only built when a message has to be generated, so
/// fast commits and pending pushes work without an API key.
pub fn run_commit<R, L, F, P>(
    ctx: &RunContext,
    args: &CommitArgs,
    repo: &R,
    llm: F,
    prompter: &mut P,
) -> Result<CommitOutcome>
where
    R: Repository + ?Sized,
    L: ChatCompletion,
    F: FnOnce() -> Result<L>,
    P: Prompter + ?Sized,
{
    let branch = match &ctx.branch {
        Some(branch) => branch.clone(),
        None => repo.current_branch()?,
    };
    let remote = ctx.config.commit.remote.as_str();

    if !repo.is_dirty()? {
        let status = repo.status()?;
        let reflog = repo.last_reflog_message()?;
        if !args.no_push && needs_push(&status, reflog.as_deref()) {
            ui::display_status(&format!("Pushing pending commits on '{}'", branch));
            let push = push_branch(repo, remote, &branch, true)?;
            return Ok(CommitOutcome::PushedPending(push));
        }

        ui::display_status("Nothing to commit, working tree clean");
        return Ok(CommitOutcome::NothingToCommit);
    }

    if ctx.config.commit.gen_version {
        let root = repo.root()?;
        let tags = parse_tags(repo.list_tags()?)?;
        let tag = write_release_version(&root, &tags)?;
        info!("release version: {}", tag);
    }

    if args.fast {
        return fast_commit(args, repo, prompter, remote, &branch);
    }

    if args.all {
        repo.stage_all()?;
    } else {
        repo.stage_tracked()?;
    }

    let diff = repo.staged_diff(&ctx.config.commit.exclude)?;
    if diff.is_empty() {
        ui::display_status("No staged changes to describe");
        return Ok(CommitOutcome::NothingToCommit);
    }

    info!("{}", diff.detected_message());
    for file in &diff.files {
        info!("file: {}", file);
    }

    let commit_config = &ctx.config.commit;
    let system = generate_prompt(
        &commit_config.locale,
        commit_config.max_length,
        commit_config.commit_type,
    );
    if args.show_prompt {
        println!("\n{}\n", system);
    }

    let client = llm()?;
    let completion = ui::spin("generate git message", || client.complete(&system, &diff.diff))?;
    let Some(completion) = completion.filter(|c| !c.content.trim().is_empty()) else {
        ui::display_boundary_warning(&BoundaryWarning::EmptyCompletion);
        return Ok(CommitOutcome::NoMessage);
    };

    let message = match prompter.ask(&Prompt::text(MESSAGE_PROMPT, completion.content.trim()))? {
        PromptOutcome::Submitted(message) => message,
        PromptOutcome::Cancelled => return Ok(CommitOutcome::Aborted),
    };

    if commit_config.commit_type == CommitType::Conventional
        && ParsedCommit::parse(&message).is_none()
    {
        ui::display_boundary_warning(&BoundaryWarning::NonConventionalMessage {
            message: message.clone(),
        });
    }

    repo.commit(&message, false)?;
    ui::display_success(&format!("Committed: {}", message));

    let push = if args.no_push {
        PushStatus::Skipped
    } else {
        push_branch(repo, remote, &branch, false)?
    };

    if let Some(usage) = completion.usage {
        info!(
            "usage: prompt_tokens={} completion_tokens={} total_tokens={}",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }

    Ok(CommitOutcome::Committed {
        message,
        amended: false,
        push,
    })
}

/// Timestamped commit without the model; repeated quick updates of the same
/// branch are folded into one commit.
fn fast_commit<R, P>(
    args: &CommitArgs,
    repo: &R,
    prompter: &mut P,
    remote: &str,
    branch: &str,
) -> Result<CommitOutcome>
where
    R: Repository + ?Sized,
    P: Prompter + ?Sized,
{
    let previous = repo.last_commit_message()?;
    let stamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let proposed = quick_update_message(branch, &stamp);

    let message = match prompter.ask(&Prompt::text(MESSAGE_PROMPT, proposed))? {
        PromptOutcome::Submitted(message) => message,
        PromptOutcome::Cancelled => return Ok(CommitOutcome::Aborted),
    };

    repo.stage_all()?;
    let status = repo.status()?;
    let amend = previous
        .as_deref()
        .is_some_and(|previous| is_quick_update_of(previous, branch))
        && !is_merge_in_progress(&status);

    repo.commit(&message, amend)?;
    ui::display_success(&format!(
        "{}: {}",
        if amend { "Amended" } else { "Committed" },
        message
    ));

    let push = if args.no_push {
        PushStatus::Skipped
    } else {
        push_branch(repo, remote, branch, true)?
    };

    Ok(CommitOutcome::Committed {
        message,
        amended: amend,
        push,
    })
}

/// Push `branch`, pulling remote changes when the push is rejected.
pub fn push_branch<R>(
    repo: &R,
    remote: &str,
    branch: &str,
    force_with_lease: bool,
) -> Result<PushStatus>
where
    R: Repository + ?Sized,
{
    let outcome = ui::spin("push git message", || {
        repo.push_branch(remote, branch, force_with_lease)
    })?;

    if outcome.success {
        ui::display_success(&format!("Pushed '{}' to '{}'", branch, remote));
        return Ok(PushStatus::Pushed);
    }

    if !is_push_rejected(&outcome.output) {
        return Err(FastcommitError::command(
            format!("git push {} {}", remote, branch),
            outcome.output,
        ));
    }

    ui::display_boundary_warning(&BoundaryWarning::PushRejected {
        remote: remote.to_string(),
        branch: branch.to_string(),
    });

    let merged = repo.pull_merge()?;
    let conflicts = repo.conflicted_files()?;
    if !merged && conflicts.is_empty() {
        return Err(FastcommitError::command(
            "git pull --no-rebase",
            "pull failed without merge conflicts",
        ));
    }

    if !conflicts.is_empty() {
        ui::display_boundary_warning(&BoundaryWarning::MergeConflicts {
            files: conflicts.clone(),
        });
    }
    ui::display_pull_followup(&conflicts);

    Ok(PushStatus::Rejected { conflicts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::git::MockRepository;
    use crate::llm::StaticCompletion;
    use crate::ui::ScriptedPrompter;
    use std::path::PathBuf;

    fn context() -> RunContext {
        RunContext::new(Config::default(), PathBuf::from("config.toml"))
            .with_repo(PathBuf::from("."), "main".to_string())
    }

    fn no_llm() -> Result<StaticCompletion> {
        Err(FastcommitError::config("model must not be called"))
    }

    #[test]
    fn test_clean_tree_is_a_no_op() {
        let repo = MockRepository::new();
        let mut prompter = ScriptedPrompter::default();

        let outcome =
            run_commit(&context(), &CommitArgs::default(), &repo, no_llm, &mut prompter).unwrap();

        assert_eq!(outcome, CommitOutcome::NothingToCommit);
        assert!(repo.calls().is_empty());
    }

    #[test]
    fn test_rejected_push_pulls() {
        let repo = MockRepository::new()
            .with_push_outcome(false, " ! [rejected] main -> main (fetch first)")
            .with_pull_result(false, &["src/lib.rs"]);

        let status = push_branch(&repo, "origin", "main", false).unwrap();

        assert_eq!(
            status,
            PushStatus::Rejected {
                conflicts: vec!["src/lib.rs".to_string()]
            }
        );
        assert_eq!(repo.calls(), vec!["push origin main", "pull --no-rebase"]);
    }

    #[test]
    fn test_other_push_failure_is_an_error() {
        let repo =
            MockRepository::new().with_push_outcome(false, "fatal: could not read Username");

        let err = push_branch(&repo, "origin", "main", false).unwrap_err();
        assert!(matches!(err, FastcommitError::Command { .. }));
    }
}
