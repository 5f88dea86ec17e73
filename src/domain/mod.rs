//! Domain logic - pure rules independent of git operations

pub mod channel;
pub mod commit;
pub mod resolver;
pub mod version;

pub use channel::{Channel, ChannelMatch, RELEASE_CHANNEL};
pub use commit::ParsedCommit;
pub use resolver::{
    next_channel_tag, next_git_max_core, next_release_tag, parse_tags, TagSet, VersionResolver,
};
pub use version::TagVersion;
