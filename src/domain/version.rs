use crate::error::{FastcommitError, Result};
use semver::Version;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A version tag of the form `vMAJOR.MINOR.PATCH[-CHANNEL.N]`.
///
/// Wraps [`semver::Version`] for parsing and ordering: a release sorts above
/// every pre-release of the same core, and pre-release labels compare
/// identifier by identifier (numeric identifiers numerically).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagVersion {
    version: Version,
}

impl TagVersion {
    /// Create a release version (no pre-release label)
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        TagVersion {
            version: Version::new(major, minor, patch),
        }
    }

    /// Parse a tag string. The leading `v` is mandatory.
    pub fn parse(tag: &str) -> Result<Self> {
        let trimmed = tag.trim();
        let raw = trimmed
            .strip_prefix('v')
            .ok_or_else(|| FastcommitError::malformed_tag(trimmed, "missing 'v' prefix"))?;

        let version =
            Version::parse(raw).map_err(|e| FastcommitError::malformed_tag(trimmed, e))?;

        if !version.build.is_empty() {
            return Err(FastcommitError::malformed_tag(
                trimmed,
                "build metadata is not allowed in version tags",
            ));
        }

        Ok(TagVersion { version })
    }

    /// Assemble `v<core>-<channel>.<counter>` and parse it back.
    pub fn prerelease_of(core: &TagVersion, channel: &str, counter: u64) -> Result<Self> {
        let tag = format!("{}-{}.{}", core.core(), channel, counter);
        TagVersion::parse(&tag)
    }

    pub fn major(&self) -> u64 {
        self.version.major
    }

    pub fn minor(&self) -> u64 {
        self.version.minor
    }

    pub fn patch(&self) -> u64 {
        self.version.patch
    }

    pub fn is_prerelease(&self) -> bool {
        !self.version.pre.is_empty()
    }

    /// The raw pre-release label, e.g. `alpha.23`
    pub fn prerelease(&self) -> Option<&str> {
        if self.is_prerelease() {
            Some(self.version.pre.as_str())
        } else {
            None
        }
    }

    /// Channel name of the pre-release label: everything before the last `.`.
    pub fn channel(&self) -> Option<&str> {
        self.prerelease()
            .map(|label| label.rsplit_once('.').map_or(label, |(name, _)| name))
    }

    /// Trailing pre-release counter (the text after the last `.`).
    pub fn counter(&self) -> Result<u64> {
        let label = self.prerelease().unwrap_or("");
        let raw = label.rsplit_once('.').map_or("", |(_, counter)| counter);

        raw.parse::<u64>()
            .map_err(|_| FastcommitError::NonNumericCounter {
                tag: self.to_string(),
                counter: raw.to_string(),
            })
    }

    /// The `major.minor.patch` part with any label stripped
    pub fn core(&self) -> TagVersion {
        TagVersion::new(self.major(), self.minor(), self.patch())
    }

    /// Core with patch incremented by one
    pub fn bump_patch(&self) -> Result<TagVersion> {
        let patch = self
            .patch()
            .checked_add(1)
            .ok_or_else(|| FastcommitError::VersionOverflow(self.to_string()))?;

        Ok(TagVersion::new(self.major(), self.minor(), patch))
    }
}

impl Ord for TagVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version.cmp(&other.version)
    }
}

impl PartialOrd for TagVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TagVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.version)
    }
}

impl FromStr for TagVersion {
    type Err = FastcommitError;

    fn from_str(s: &str) -> Result<Self> {
        TagVersion::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(tag: &str) -> TagVersion {
        TagVersion::parse(tag).unwrap()
    }

    #[test]
    fn test_parse_release() {
        let version = v("v1.2.3");
        assert_eq!(version.major(), 1);
        assert_eq!(version.minor(), 2);
        assert_eq!(version.patch(), 3);
        assert!(!version.is_prerelease());
        assert_eq!(version.prerelease(), None);
    }

    #[test]
    fn test_parse_prerelease() {
        let version = v("v0.5.69-alpha.23");
        assert_eq!(version.prerelease(), Some("alpha.23"));
        assert_eq!(version.channel(), Some("alpha"));
        assert_eq!(version.counter().unwrap(), 23);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(v("  v1.0.0\n"), TagVersion::new(1, 0, 0));
    }

    #[test]
    fn test_parse_round_trip() {
        for tag in ["v0.0.1", "v1.2.3", "v10.20.30-rc.4", "v0.5.69-alpha.23"] {
            assert_eq!(v(tag).to_string(), tag);
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for tag in ["v1.2", "v1.2.3.4", "1.2.3", "vx.y.z", "v1.2.3+build.5", ""] {
            let err = TagVersion::parse(tag).unwrap_err();
            assert!(
                matches!(err, FastcommitError::MalformedTag { .. }),
                "{} should be malformed, got {:?}",
                tag,
                err
            );
        }
    }

    #[test]
    fn test_release_beats_prerelease_of_same_core() {
        assert!(v("v1.2.3") > v("v1.2.3-rc.9"));
        assert!(v("v1.2.3-alpha.1") > v("v1.2.2"));
    }

    #[test]
    fn test_counter_compares_numerically() {
        assert!(v("v1.0.0-alpha.10") > v("v1.0.0-alpha.9"));
    }

    #[test]
    fn test_distinct_channels_compare_lexicographically() {
        assert!(v("v1.0.0-beta.1") > v("v1.0.0-alpha.5"));
        assert!(v("v1.0.0-rc.1") > v("v1.0.0-beta.7"));
    }

    #[test]
    fn test_core_and_bump_patch() {
        let version = v("v1.2.3-alpha.5");
        assert_eq!(version.core(), TagVersion::new(1, 2, 3));
        assert_eq!(version.bump_patch().unwrap(), TagVersion::new(1, 2, 4));
    }

    #[test]
    fn test_counter_non_numeric() {
        let err = v("v1.0.0-alpha.x").counter().unwrap_err();
        assert!(matches!(
            err,
            FastcommitError::NonNumericCounter { ref counter, .. } if counter == "x"
        ));
    }

    #[test]
    fn test_counter_without_dot() {
        assert!(v("v1.0.0-alpha").counter().is_err());
        assert_eq!(v("v1.0.0-alpha").channel(), Some("alpha"));
    }

    #[test]
    fn test_prerelease_of() {
        let core = TagVersion::new(1, 1, 0);
        assert_eq!(
            TagVersion::prerelease_of(&core, "beta", 3).unwrap().to_string(),
            "v1.1.0-beta.3"
        );
    }

    #[test]
    fn test_prerelease_of_rejects_bad_channel() {
        let core = TagVersion::new(1, 0, 0);
        assert!(TagVersion::prerelease_of(&core, "bad channel", 1).is_err());
    }
}
