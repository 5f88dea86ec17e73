//! Release channels: the named pre-release tracks a tag can be cut on.

use crate::domain::TagVersion;
use crate::error::{FastcommitError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name that selects a release promotion instead of a pre-release track.
pub const RELEASE_CHANNEL: &str = "release";

/// A requested tagging channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    /// Promote the current line to a plain release
    Release,
    /// Pre-release track such as `alpha`, `beta` or `rc`
    PreRelease(String),
}

impl Channel {
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl FromStr for Channel {
    type Err = FastcommitError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        if name.is_empty() {
            return Err(FastcommitError::EmptyChannel);
        }

        if name.eq_ignore_ascii_case(RELEASE_CHANNEL) {
            return Ok(Channel::Release);
        }

        if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            Ok(Channel::PreRelease(name.to_string()))
        } else {
            Err(FastcommitError::InvalidChannel(name.to_string()))
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Release => write!(f, "{}", RELEASE_CHANNEL),
            Channel::PreRelease(name) => write!(f, "{}", name),
        }
    }
}

/// How a tag is attributed to a channel when looking for the channel's
/// latest counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelMatch {
    /// The full tag string contains the channel name anywhere.
    /// `a` therefore also matches `v1.0.0-beta.1`.
    #[default]
    Substring,
    /// The channel field of the pre-release label equals the channel name.
    Exact,
}

impl ChannelMatch {
    pub fn matches(&self, channel: &str, tag: &TagVersion) -> bool {
        match self {
            ChannelMatch::Substring => tag.to_string().contains(channel),
            ChannelMatch::Exact => tag.channel() == Some(channel),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release() {
        assert_eq!(Channel::parse("release").unwrap(), Channel::Release);
        assert_eq!(Channel::parse("Release").unwrap(), Channel::Release);
    }

    #[test]
    fn test_parse_prerelease() {
        assert_eq!(
            Channel::parse("alpha").unwrap(),
            Channel::PreRelease("alpha".to_string())
        );
        assert_eq!(
            Channel::parse(" rc ").unwrap(),
            Channel::PreRelease("rc".to_string())
        );
    }

    #[test]
    fn test_parse_empty_channel() {
        assert!(matches!(
            Channel::parse("   "),
            Err(FastcommitError::EmptyChannel)
        ));
    }

    #[test]
    fn test_parse_invalid_channel() {
        assert!(matches!(
            Channel::parse("alpha.1"),
            Err(FastcommitError::InvalidChannel(_))
        ));
        assert!(Channel::parse("bad!name").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Channel::Release.to_string(), "release");
        assert_eq!(Channel::PreRelease("beta".to_string()).to_string(), "beta");
    }

    #[test]
    fn test_substring_match_is_loose() {
        let tag = TagVersion::parse("v1.0.0-beta.1").unwrap();
        assert!(ChannelMatch::Substring.matches("beta", &tag));
        assert!(ChannelMatch::Substring.matches("a", &tag));
    }

    #[test]
    fn test_exact_match_compares_channel_field() {
        let tag = TagVersion::parse("v1.0.0-beta.1").unwrap();
        assert!(ChannelMatch::Exact.matches("beta", &tag));
        assert!(!ChannelMatch::Exact.matches("a", &tag));
        assert!(!ChannelMatch::Exact.matches("beta", &TagVersion::new(1, 0, 0)));
    }

    #[test]
    fn test_default_is_substring() {
        assert_eq!(ChannelMatch::default(), ChannelMatch::Substring);
    }
}
