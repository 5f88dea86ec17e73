use crate::domain::ChannelMatch;
use crate::error::{FastcommitError, Result};
use crate::prompt::CommitType;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the repository-local env file, relative to the `.git` directory
pub const LOCAL_ENV_FILE: &str = "fastcommit.env";

/// Represents the complete configuration for fastcommit.
///
/// Every section is optional in the file; missing keys fall back to defaults.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub commit: CommitConfig,

    #[serde(default)]
    pub tag: TagConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub upgrade: UpgradeConfig,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

/// Connection settings for the chat-completion endpoint.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct OpenAiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        OpenAiConfig {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_max_length() -> usize {
    50
}

fn default_remote() -> String {
    "origin".to_string()
}

/// Lockfiles rarely say anything useful about a change
fn default_exclude() -> Vec<String> {
    vec![
        "Cargo.lock".to_string(),
        "go.sum".to_string(),
        "package-lock.json".to_string(),
        "pnpm-lock.yaml".to_string(),
        "yarn.lock".to_string(),
    ]
}

/// Settings for the commit workflow.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CommitConfig {
    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default = "default_max_length")]
    pub max_length: usize,

    #[serde(default)]
    pub commit_type: CommitType,

    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    #[serde(default = "default_remote")]
    pub remote: String,

    /// Write the next release version to `version/.version` before committing
    #[serde(default)]
    pub gen_version: bool,
}

impl Default for CommitConfig {
    fn default() -> Self {
        CommitConfig {
            locale: default_locale(),
            max_length: default_max_length(),
            commit_type: CommitType::default(),
            exclude: default_exclude(),
            remote: default_remote(),
            gen_version: false,
        }
    }
}

fn default_channels() -> Vec<String> {
    vec![
        "alpha".to_string(),
        "beta".to_string(),
        "rc".to_string(),
        "release".to_string(),
    ]
}

fn default_true() -> bool {
    true
}

/// Settings for the tag command.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TagConfig {
    #[serde(default = "default_channels")]
    pub channels: Vec<String>,

    #[serde(default)]
    pub channel_match: ChannelMatch,

    #[serde(default = "default_remote")]
    pub remote: String,

    /// Refresh tags from the remote before resolving
    #[serde(default = "default_true")]
    pub fetch_remote: bool,
}

impl Default for TagConfig {
    fn default() -> Self {
        TagConfig {
            channels: default_channels(),
            channel_match: ChannelMatch::default(),
            remote: default_remote(),
            fetch_remote: true,
        }
    }
}

fn default_history_limit() -> usize {
    20
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HistoryConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            path: None,
            limit: default_history_limit(),
        }
    }
}

impl HistoryConfig {
    /// Configured path, else `$HISTFILE`, else `~/.zsh_history`
    pub fn resolved_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }

        if let Some(histfile) = std::env::var_os("HISTFILE").filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(histfile));
        }

        dirs::home_dir()
            .map(|home| home.join(".zsh_history"))
            .ok_or_else(|| FastcommitError::config("cannot determine home directory"))
    }
}

fn default_owner() -> String {
    "pubgo".to_string()
}

fn default_repo() -> String {
    "fastcommit".to_string()
}

/// GitHub repository the upgrade command reads releases from.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct UpgradeConfig {
    #[serde(default = "default_owner")]
    pub owner: String,

    #[serde(default = "default_repo")]
    pub repo: String,
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        UpgradeConfig {
            owner: default_owner(),
            repo: default_repo(),
        }
    }
}

impl Config {
    /// Overlay environment variables on top of the file values.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Same as [`Config::apply_env`] with an injectable lookup.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = lookup(ENV_OPENAI_API_KEY) {
            self.openai.api_key = Some(key);
        }
        if let Some(url) = lookup(ENV_OPENAI_BASE_URL) {
            self.openai.base_url = url;
        }
        if let Some(model) = lookup(ENV_OPENAI_MODEL) {
            self.openai.model = model;
        }
    }

    /// Serialized form, as written on first run
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| FastcommitError::config(format!("cannot serialize config: {}", e)))
    }
}

/// `<config_dir>/fastcommit/config.toml`
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("fastcommit").join("config.toml"))
        .ok_or_else(|| FastcommitError::config("cannot determine the user config directory"))
}

/// Explicit path if given, the default location otherwise.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_path(),
    }
}

/// Loads configuration from a file.
///
/// # Returns
/// * `Ok(Config)` - Parsed configuration
/// * `Err` - If the file cannot be read or parsed
pub fn load_config(path: &Path) -> Result<Config> {
    let config_str = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}

/// Load the file, writing the default configuration first if it is missing.
pub fn load_or_init(path: &Path) -> Result<Config> {
    if path.exists() {
        debug!("config: {}", path.display());
        return load_config(path);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let config = Config::default();
    fs::write(path, config.to_toml()?)?;
    debug!("config: wrote defaults to {}", path.display());

    Ok(config)
}

/// Load `.git/fastcommit.env` into the process environment.
///
/// Variables already set win over the file. Returns the path when a file
/// was loaded.
pub fn load_local_env(repo_root: &Path) -> Result<Option<PathBuf>> {
    let path = repo_root.join(".git").join(LOCAL_ENV_FILE);
    if !path.is_file() {
        return Ok(None);
    }

    dotenvy::from_path(&path).map_err(|e| {
        FastcommitError::config(format!("cannot load {}: {}", path.display(), e))
    })?;
    debug!("env: loaded {}", path.display());

    Ok(Some(path))
}

pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const ENV_CONFIG: &str = "FASTCOMMIT_CONFIG";
pub const ENV_DEBUG: &str = "FASTCOMMIT_DEBUG";

/// A supported environment variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub default: &'static str,
    pub required: bool,
    pub secret: bool,
}

pub const ENV_SPECS: &[EnvSpec] = &[
    EnvSpec {
        name: ENV_OPENAI_API_KEY,
        description: "API key for the chat-completion endpoint",
        default: "",
        required: true,
        secret: true,
    },
    EnvSpec {
        name: ENV_OPENAI_BASE_URL,
        description: "Base URL of an OpenAI-compatible API",
        default: "https://api.openai.com/v1",
        required: false,
        secret: false,
    },
    EnvSpec {
        name: ENV_OPENAI_MODEL,
        description: "Model used to draft commit messages",
        default: "gpt-4o-mini",
        required: false,
        secret: false,
    },
    EnvSpec {
        name: ENV_CONFIG,
        description: "Path of the configuration file",
        default: "<config_dir>/fastcommit/config.toml",
        required: false,
        secret: false,
    },
    EnvSpec {
        name: ENV_DEBUG,
        description: "Enable debug logging",
        default: "false",
        required: false,
        secret: false,
    },
];

impl EnvSpec {
    /// Current value as it may be shown on screen
    pub fn display_value(&self, value: Option<&str>) -> Option<String> {
        let value = value.filter(|v| !v.is_empty())?;
        if self.secret {
            Some(mask_secret(value))
        } else {
            Some(value.to_string())
        }
    }
}

/// Keep the first and last four characters of long secrets
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 8), tail)
}
