//! Subcommand workflows, one module per command.

pub mod commit;
pub mod config_cmd;
pub mod env_cmd;
pub mod history_cmd;
pub mod orchestration;
pub mod tag;
pub mod upgrade;
pub mod version_cmd;

pub use commit::run_commit;
pub use orchestration::{
    CommitArgs, CommitOutcome, PushStatus, RunContext, TagArgs, TagOutcome,
};
pub use tag::run_tag;
