use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{next_release_tag, TagSet};
use crate::error::Result;

/// Tag written when the repository has no version tags yet
pub const INITIAL_RELEASE: &str = "v0.0.1";

/// `<root>/version/.version`
pub fn version_file(root: &Path) -> PathBuf {
    root.join("version").join(".version")
}

/// Record the next release tag in the version file and return it.
pub fn write_release_version(root: &Path, tags: &TagSet) -> Result<String> {
    let tag = if tags.is_empty() {
        INITIAL_RELEASE.to_string()
    } else {
        next_release_tag(tags)?.to_string()
    };

    let path = version_file(root);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, &tag)?;

    Ok(tag)
}

/// Contents of the version file, if the repository has one
pub fn read_release_version(root: &Path) -> Option<String> {
    fs::read_to_string(version_file(root))
        .ok()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

pub fn version_lines(repo_root: Option<&Path>) -> Vec<String> {
    let release = repo_root
        .and_then(read_release_version)
        .unwrap_or_else(|| "unknown".to_string());

    vec![
        format!("project: {}", env!("CARGO_PKG_NAME")),
        format!("version: {}", env!("CARGO_PKG_VERSION")),
        format!("release: {}", release),
    ]
}

pub fn run_version(repo_root: Option<&Path>) {
    for line in version_lines(repo_root) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse_tags;
    use tempfile::TempDir;

    #[test]
    fn test_write_initial_release() {
        let dir = TempDir::new().unwrap();

        let tag = write_release_version(dir.path(), &TagSet::new()).unwrap();

        assert_eq!(tag, "v0.0.1");
        assert_eq!(read_release_version(dir.path()).as_deref(), Some("v0.0.1"));
    }

    #[test]
    fn test_write_next_release() {
        let dir = TempDir::new().unwrap();
        let tags = parse_tags(["v0.1.0", "v0.2.0-rc.3"]).unwrap();

        let tag = write_release_version(dir.path(), &tags).unwrap();

        assert_eq!(tag, "v0.2.0");
    }

    #[test]
    fn test_version_lines_without_repo() {
        let lines = version_lines(None);
        assert_eq!(lines[0], "project: fastcommit");
        assert_eq!(lines[2], "release: unknown");
    }
}
