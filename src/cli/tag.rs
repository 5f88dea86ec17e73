//! `fastcommit tag`: resolve, edit, create and push the next version tag.

use log::{debug, info};

use crate::boundary::BoundaryWarning;
use crate::cli::orchestration::{RunContext, TagArgs, TagOutcome};
use crate::domain::{parse_tags, Channel, TagVersion, VersionResolver};
use crate::error::{FastcommitError, Result};
use crate::git::{is_remote_tag_exists, Repository};
use crate::ui::{self, Prompt, PromptOutcome, Prompter};

/// Run the tag workflow.
///
/// Remote tags are fetched first (behind a spinner); the resolver only
/// runs once the fetch has returned.
pub fn run_tag<R, P>(
    ctx: &RunContext,
    args: &TagArgs,
    repo: &R,
    prompter: &mut P,
) -> Result<TagOutcome>
where
    R: Repository + ?Sized,
    P: Prompter + ?Sized,
{
    let tag_config = &ctx.config.tag;
    let remote = tag_config.remote.as_str();

    // tags only visible through ls-remote when the fetch could not update refs
    let mut listed_remote = Vec::new();
    if tag_config.fetch_remote {
        if let Err(e) = ui::spin("fetch git tag", || repo.fetch_tags(remote)) {
            ui::display_boundary_warning(&BoundaryWarning::FetchFailed {
                remote: remote.to_string(),
                reason: e.to_string(),
            });
            match repo.list_remote_tags(remote) {
                Ok(names) => listed_remote = names,
                Err(e) => debug!("ls-remote {} failed: {}", remote, e),
            }
        }
    }

    let channel_name = match &args.channel {
        Some(channel) => channel.clone(),
        None => {
            if tag_config.channels.is_empty() {
                return Err(FastcommitError::config("tag.channels is empty"));
            }
            let prompt = Prompt::select("Select a channel", tag_config.channels.clone());
            match prompter.ask(&prompt)? {
                PromptOutcome::Submitted(channel) => channel,
                PromptOutcome::Cancelled => return Ok(TagOutcome::Cancelled),
            }
        }
    };
    let channel = Channel::parse(&channel_name)?;

    let mut tags = parse_tags(repo.list_tags()?)?;
    tags.extend(parse_tags(listed_remote)?);
    let resolver = VersionResolver::new(tag_config.channel_match);
    let proposed = resolver.resolve(&channel, &tags)?.to_string();

    let latest = tags.max().map(|tag| tag.to_string());
    ui::display_proposed_tag(latest.as_deref(), &proposed);

    let tag = if args.yes {
        proposed
    } else {
        match prompter.ask(&Prompt::text("tag name (edit or enter)", proposed))? {
            PromptOutcome::Submitted(tag) => tag.trim().to_string(),
            PromptOutcome::Cancelled => return Ok(TagOutcome::Cancelled),
        }
    };
    TagVersion::parse(&tag)?;

    if args.dry_run {
        ui::display_status(&format!("Dry run: would create and push '{}'", tag));
        return Ok(TagOutcome::Proposed { tag });
    }

    repo.create_tag(&tag)?;
    info!("selected tag: {}", tag);

    let outcome = ui::spin("push git tag", || repo.push_tag(remote, &tag))?;
    if outcome.success {
        ui::display_success(&format!("Pushed tag '{}' to '{}'", tag, remote));
        return Ok(TagOutcome::Created { tag, pushed: true });
    }

    if is_remote_tag_exists(&outcome.output) {
        ui::display_boundary_warning(&BoundaryWarning::RemoteTagExists {
            tag: tag.clone(),
            remote: remote.to_string(),
        });
        return Ok(TagOutcome::Created { tag, pushed: false });
    }

    ui::display_manual_push_instruction(&tag, remote);
    Err(FastcommitError::command(
        format!("git push {} {}", remote, tag),
        outcome.output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::git::MockRepository;
    use crate::ui::ScriptedPrompter;
    use std::path::PathBuf;

    fn context() -> RunContext {
        RunContext::new(Config::default(), PathBuf::from("config.toml"))
    }

    #[test]
    fn test_channel_flag_skips_selection() {
        let repo = MockRepository::new().with_tags(&["v0.1.0"]);
        let mut prompter = ScriptedPrompter::default();
        let args = TagArgs {
            channel: Some("beta".to_string()),
            yes: true,
            dry_run: true,
        };

        let outcome = run_tag(&context(), &args, &repo, &mut prompter).unwrap();

        assert_eq!(
            outcome,
            TagOutcome::Proposed {
                tag: "v0.1.1-beta.1".to_string()
            }
        );
        assert!(prompter.asked().is_empty());
    }

    #[test]
    fn test_fetch_failure_merges_listed_remote_tags() {
        let repo = MockRepository::new()
            .with_tags(&["v0.1.0"])
            .with_remote_tags(&["v0.1.0", "v0.2.0-beta.3"])
            .with_fetch_error("error: cannot lock ref");
        let mut prompter = ScriptedPrompter::default();
        let args = TagArgs {
            channel: Some("beta".to_string()),
            yes: true,
            dry_run: true,
        };

        let outcome = run_tag(&context(), &args, &repo, &mut prompter).unwrap();

        assert_eq!(
            outcome,
            TagOutcome::Proposed {
                tag: "v0.2.0-beta.4".to_string()
            }
        );
    }

    #[test]
    fn test_edited_tag_must_parse() {
        let repo = MockRepository::new();
        let mut prompter = ScriptedPrompter::answering(&["alpha", "not-a-tag"]);

        let err = run_tag(&context(), &TagArgs::default(), &repo, &mut prompter).unwrap_err();

        assert!(matches!(err, FastcommitError::MalformedTag { .. }));
        assert!(!repo.calls().iter().any(|call| call.starts_with("tag ")));
    }
}
