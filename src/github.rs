//! Public GitHub release listing for the upgrade command.

use crate::domain::TagVersion;
use crate::error::{FastcommitError, Result};
use log::debug;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;

const API_BASE: &str = "https://api.github.com";

/// Checksum files are small; anything bigger is a real artifact.
const CHECKSUM_MAX_SIZE: u64 = 64 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub created_at: String,
}

/// One downloadable file of one release
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    /// Tag of the release the file belongs to
    pub tag: String,
    pub file_name: String,
    pub os: String,
    pub arch: String,
    pub url: String,
    pub size: u64,
    pub created_at: String,
    pub checksum: bool,
}

impl Asset {
    pub fn key(&self) -> String {
        format!("{}/{}", self.os, self.arch)
    }

    /// Built for the platform this binary runs on
    pub fn matches_platform(&self, os: &str, arch: &str) -> bool {
        self.os == os && self.arch == arch
    }
}

/// Client for the releases of one public repository
pub struct ReleaseClient {
    owner: String,
    repo: String,
    client: reqwest::blocking::Client,
}

impl ReleaseClient {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("fastcommit/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(ReleaseClient {
            owner: owner.into(),
            repo: repo.into(),
            client,
        })
    }

    /// Most recent releases, newest first as GitHub returns them
    pub fn list(&self, per_page: usize) -> Result<Vec<Release>> {
        let url = format!(
            "{}/repos/{}/{}/releases?per_page={}",
            API_BASE, self.owner, self.repo, per_page
        );
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(FastcommitError::command(
                format!("GET {}", url),
                format!("{}: {}", status, body.trim()),
            ));
        }

        Ok(response.json()?)
    }
}

/// Flatten releases into their assets.
pub fn asset_list(releases: &[Release]) -> Vec<Asset> {
    releases
        .iter()
        .flat_map(|release| {
            release.assets.iter().map(move |asset| Asset {
                tag: release.tag_name.clone(),
                file_name: asset.name.clone(),
                os: detect_os(&asset.name).to_string(),
                arch: detect_arch(&asset.name).to_string(),
                url: asset.browser_download_url.clone(),
                size: asset.size,
                created_at: asset.created_at.clone(),
                checksum: is_checksum_file(&asset.name, asset.size),
            })
        })
        .collect()
}

/// Non-checksum assets ordered by release version, newest first.
///
/// Releases whose tag is not a version are skipped.
pub fn newest_assets(assets: &[Asset], limit: usize) -> Vec<Asset> {
    let mut versioned: Vec<(TagVersion, &Asset)> = assets
        .iter()
        .filter(|asset| !asset.checksum)
        .filter_map(|asset| match TagVersion::parse(&asset.tag) {
            Ok(version) => Some((version, asset)),
            Err(e) => {
                debug!("skipping asset {}: {}", asset.file_name, e);
                None
            }
        })
        .collect();

    versioned.sort_by(|(a, _), (b, _)| b.cmp(a));
    versioned
        .into_iter()
        .take(limit)
        .map(|(_, asset)| asset.clone())
        .collect()
}

pub fn is_checksum_file(name: &str, size: u64) -> bool {
    let name = name.to_lowercase();
    let pattern = Regex::new(r"(checksums?|sha256sums?|\.sha256|\.sha512|\.md5)(\.txt)?$");
    pattern.map(|re| re.is_match(&name)).unwrap_or(false) && size < CHECKSUM_MAX_SIZE
}

pub fn detect_os(name: &str) -> &'static str {
    let name = name.to_lowercase();
    if name.contains("darwin") || name.contains("macos") || name.contains("apple") {
        "darwin"
    } else if name.contains("windows") || name.contains("win64") || name.ends_with(".exe") {
        "windows"
    } else if name.contains("linux") {
        "linux"
    } else if name.contains("freebsd") {
        "freebsd"
    } else {
        ""
    }
}

pub fn detect_arch(name: &str) -> &'static str {
    let name = name.to_lowercase();
    if name.contains("arm64") || name.contains("aarch64") {
        "arm64"
    } else if name.contains("amd64") || name.contains("x86_64") || name.contains("x64") {
        "amd64"
    } else if name.contains("386") || name.contains("i686") || name.contains("x86") {
        "386"
    } else if name.contains("armv7") || name.contains("arm") {
        "arm"
    } else {
        ""
    }
}

/// OS and arch of the running binary, in release-asset naming
pub fn current_platform() -> (&'static str, &'static str) {
    let os = match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    };
    let arch = match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        other => other,
    };
    (os, arch)
}

/// Decimal human-readable size, e.g. `12.3MB`
pub fn format_size(size: u64) -> String {
    const UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];

    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{}{}", size, UNITS[0])
    } else {
        format!("{:.1}{}", value, UNITS[unit])
    }
}
