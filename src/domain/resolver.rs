//! Next-tag resolution over the set of existing version tags.
//!
//! Everything here is pure: callers materialise the tag list first (local
//! `git tag`, optionally after a fetch) and hand it over as a [`TagSet`].

use crate::domain::{Channel, ChannelMatch, TagVersion};
use crate::error::{FastcommitError, Result};
use log::debug;

/// Floor used as the base core when no tags exist yet.
const INITIAL_CORE: (u64, u64, u64) = (0, 0, 1);

/// Snapshot of every known version tag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagSet {
    versions: Vec<TagVersion>,
}

impl TagSet {
    pub fn new() -> Self {
        TagSet::default()
    }

    pub fn insert(&mut self, version: TagVersion) {
        self.versions.push(version);
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagVersion> {
        self.versions.iter()
    }

    /// Greatest version by semver ordering
    pub fn max(&self) -> Option<&TagVersion> {
        self.versions.iter().max()
    }

    /// Merge another set in, e.g. remote tags on top of local ones
    pub fn extend(&mut self, other: TagSet) {
        for version in other.versions {
            if !self.versions.contains(&version) {
                self.versions.push(version);
            }
        }
    }
}

/// Parse raw tag names (one per line, as printed by `git tag`).
///
/// Names not starting with `v` are ignored. A `v`-prefixed name that is not a
/// valid version aborts the whole parse.
pub fn parse_tags<I, S>(lines: I) -> Result<TagSet>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags = TagSet::new();

    for line in lines {
        let line = line.as_ref().trim();
        if !line.starts_with('v') {
            continue;
        }

        tags.insert(TagVersion::parse(line)?);
    }

    Ok(tags)
}

/// Next plain release version.
///
/// A released maximum gets its patch bumped; a pre-release maximum is
/// released by dropping its label.
pub fn next_release_tag(tags: &TagSet) -> Result<TagVersion> {
    let cur_max = tags.max().ok_or(FastcommitError::EmptyTagSet)?;

    if cur_max.is_prerelease() {
        Ok(cur_max.core())
    } else {
        cur_max.bump_patch()
    }
}

/// Core every new pre-release must build on.
pub fn next_git_max_core(tags: &TagSet) -> Result<TagVersion> {
    let Some(max_ver) = tags.max() else {
        let (major, minor, patch) = INITIAL_CORE;
        return Ok(TagVersion::new(major, minor, patch));
    };

    if max_ver.is_prerelease() {
        Ok(max_ver.core())
    } else {
        max_ver.bump_patch()
    }
}

/// Next pre-release tag on `channel`.
pub fn next_channel_tag(
    channel: &str,
    tags: &TagSet,
    channel_match: ChannelMatch,
) -> Result<TagVersion> {
    if channel.trim().is_empty() {
        return Err(FastcommitError::EmptyChannel);
    }

    let base_core = next_git_max_core(tags)?;
    let cur_max_for_channel = tags
        .iter()
        .filter(|tag| channel_match.matches(channel, tag))
        .max();

    let next = match cur_max_for_channel {
        Some(cur) if cur.core() >= base_core => {
            let counter = cur
                .counter()?
                .checked_add(1)
                .ok_or_else(|| FastcommitError::VersionOverflow(cur.to_string()))?;
            debug!("channel {} continues from {}", channel, cur);
            TagVersion::prerelease_of(&cur.core(), channel, counter)?
        }
        _ => TagVersion::prerelease_of(&base_core, channel, 1)?,
    };

    // the rendered tag must itself parse
    TagVersion::parse(&next.to_string())
}

/// Resolves the next tag for a requested channel
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionResolver {
    channel_match: ChannelMatch,
}

impl VersionResolver {
    pub fn new(channel_match: ChannelMatch) -> Self {
        VersionResolver { channel_match }
    }

    pub fn resolve(&self, channel: &Channel, tags: &TagSet) -> Result<TagVersion> {
        match channel {
            Channel::Release => next_release_tag(tags),
            Channel::PreRelease(name) => next_channel_tag(name, tags, self.channel_match),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(names: &[&str]) -> TagSet {
        parse_tags(names).unwrap()
    }

    fn alpha(set: &TagSet) -> String {
        next_channel_tag("alpha", set, ChannelMatch::Substring)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_parse_tags_skips_non_version_names() {
        let set = tags(&["v1.0.0", "latest", "", "  release-2", "v1.1.0-alpha.1"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_parse_tags_malformed_is_fatal() {
        let err = parse_tags(["v1.2", "v1.2.3"]).unwrap_err();
        assert!(matches!(err, FastcommitError::MalformedTag { ref tag, .. } if tag == "v1.2"));
    }

    #[test]
    fn test_parse_tags_empty_input() {
        assert!(parse_tags(Vec::<String>::new()).unwrap().is_empty());
    }

    #[test]
    fn test_next_release_promotes_prerelease() {
        let set = tags(&["v1.2.2", "v1.2.3-alpha.4", "v1.2.3-alpha.5"]);
        assert_eq!(next_release_tag(&set).unwrap().to_string(), "v1.2.3");
    }

    #[test]
    fn test_next_release_bumps_patch_of_release() {
        let set = tags(&["v1.2.3", "v1.2.3-rc.1", "v1.0.0"]);
        assert_eq!(next_release_tag(&set).unwrap().to_string(), "v1.2.4");
    }

    #[test]
    fn test_next_release_empty_set() {
        assert!(matches!(
            next_release_tag(&TagSet::new()),
            Err(FastcommitError::EmptyTagSet)
        ));
    }

    #[test]
    fn test_git_max_core_floor() {
        assert_eq!(next_git_max_core(&TagSet::new()).unwrap().to_string(), "v0.0.1");
    }

    #[test]
    fn test_git_max_core_after_release() {
        assert_eq!(next_git_max_core(&tags(&["v2.3.4"])).unwrap().to_string(), "v2.3.5");
    }

    #[test]
    fn test_git_max_core_on_prerelease() {
        let set = tags(&["v2.3.4", "v2.3.5-beta.2"]);
        assert_eq!(next_git_max_core(&set).unwrap().to_string(), "v2.3.5");
    }

    #[test]
    fn test_channel_bootstrap_on_empty_repo() {
        assert_eq!(alpha(&TagSet::new()), "v0.0.1-alpha.1");
    }

    #[test]
    fn test_channel_continuation() {
        let set = tags(&["v1.0.0", "v1.1.0-alpha.1", "v1.1.0-alpha.2"]);
        assert_eq!(alpha(&set), "v1.1.0-alpha.3");
    }

    #[test]
    fn test_channel_after_release_bump() {
        assert_eq!(alpha(&tags(&["v1.0.0"])), "v1.0.1-alpha.1");
    }

    #[test]
    fn test_channel_on_older_core_restarts_counter() {
        let set = tags(&["v1.0.0-alpha.7", "v1.0.0"]);
        assert_eq!(alpha(&set), "v1.0.1-alpha.1");
    }

    #[test]
    fn test_new_channel_joins_current_prerelease_core() {
        let set = tags(&["v1.0.0", "v1.0.1-alpha.3"]);
        let beta = next_channel_tag("beta", &set, ChannelMatch::Exact).unwrap();
        assert_eq!(beta.to_string(), "v1.0.1-beta.1");
    }

    #[test]
    fn test_channel_counter_past_nine() {
        let set = tags(&["v0.5.69-alpha.9", "v0.5.69-alpha.10"]);
        assert_eq!(alpha(&set), "v0.5.69-alpha.11");
    }

    #[test]
    fn test_channel_monotonic_when_rerun() {
        let mut set = tags(&["v1.0.0", "v1.0.1-beta.4"]);
        let mut previous: Option<TagVersion> = None;

        for _ in 0..5 {
            let next = next_channel_tag("alpha", &set, ChannelMatch::Substring).unwrap();
            if let Some(prev) = &previous {
                assert!(next > *prev, "{} should be greater than {}", next, prev);
            }
            set.insert(next.clone());
            previous = Some(next);
        }

        assert_eq!(previous.unwrap().to_string(), "v1.0.1-alpha.5");
    }

    #[test]
    fn test_substring_match_picks_up_foreign_channel() {
        // "a" is contained in "beta", so the beta counter is continued
        let set = tags(&["v1.0.0", "v1.0.1-beta.2"]);
        let substring = next_channel_tag("a", &set, ChannelMatch::Substring).unwrap();
        let exact = next_channel_tag("a", &set, ChannelMatch::Exact).unwrap();
        assert_eq!(substring.to_string(), "v1.0.1-a.3");
        assert_eq!(exact.to_string(), "v1.0.1-a.1");
    }

    #[test]
    fn test_channel_non_numeric_counter_is_fatal() {
        let set = tags(&["v1.0.1-alpha.x"]);
        assert!(matches!(
            next_channel_tag("alpha", &set, ChannelMatch::Exact),
            Err(FastcommitError::NonNumericCounter { .. })
        ));
    }

    #[test]
    fn test_empty_channel_rejected() {
        assert!(matches!(
            next_channel_tag("", &tags(&["v1.0.0"]), ChannelMatch::Substring),
            Err(FastcommitError::EmptyChannel)
        ));
    }

    #[test]
    fn test_resolver_dispatches_on_channel() {
        let set = tags(&["v1.0.0", "v1.0.1-rc.1"]);
        let resolver = VersionResolver::new(ChannelMatch::Exact);

        let release = resolver.resolve(&Channel::Release, &set).unwrap();
        assert_eq!(release.to_string(), "v1.0.1");

        let rc = resolver
            .resolve(&Channel::PreRelease("rc".to_string()), &set)
            .unwrap();
        assert_eq!(rc.to_string(), "v1.0.1-rc.2");
    }

    #[test]
    fn test_counter_at_limit_is_an_error() {
        let tag = format!("v1.0.0-alpha.{}", u64::MAX);
        let set = tags(&[tag.as_str()]);
        assert!(matches!(
            next_channel_tag("alpha", &set, ChannelMatch::Exact),
            Err(FastcommitError::VersionOverflow(_))
        ));
    }

    #[test]
    fn test_patch_at_limit_is_an_error() {
        let tag = format!("v1.0.{}", u64::MAX);
        let set = tags(&[tag.as_str()]);
        assert!(matches!(
            next_release_tag(&set),
            Err(FastcommitError::VersionOverflow(_))
        ));
        assert!(matches!(
            next_channel_tag("beta", &set, ChannelMatch::Substring),
            Err(FastcommitError::VersionOverflow(_))
        ));
    }

    #[test]
    fn test_tag_set_extend_deduplicates() {
        let mut local = tags(&["v1.0.0"]);
        local.extend(tags(&["v1.0.0", "v1.0.1-alpha.1"]));
        assert_eq!(local.len(), 2);
    }
}
