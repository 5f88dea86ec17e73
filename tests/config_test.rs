// tests/config_test.rs
use fastcommit::config::{
    load_config, load_local_env, load_or_init, resolve_config_path, Config, LOCAL_ENV_FILE,
};
use fastcommit::domain::ChannelMatch;
use fastcommit::prompt::CommitType;
use serial_test::serial;
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_load_default_config() {
    let config = Config::default();
    assert_eq!(config.commit.locale, "en");
    assert_eq!(config.commit.max_length, 50);
    assert_eq!(config.commit.commit_type, CommitType::Conventional);
    assert_eq!(config.tag.channels, vec!["alpha", "beta", "rc", "release"]);
    assert_eq!(config.tag.channel_match, ChannelMatch::Substring);
    assert_eq!(config.upgrade.owner, "pubgo");
}

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
[openai]
model = "deepseek-chat"
base_url = "https://api.deepseek.com/v1"

[commit]
commit_type = "plain"
exclude = ["dist/"]
gen_version = true

[tag]
channels = ["dev", "release"]
remote = "upstream"
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(temp_file.path()).unwrap();
    assert_eq!(config.openai.model, "deepseek-chat");
    assert_eq!(config.commit.commit_type, CommitType::Plain);
    assert_eq!(config.commit.exclude, vec!["dist/"]);
    assert!(config.commit.gen_version);
    assert_eq!(config.tag.channels, vec!["dev", "release"]);
    assert_eq!(config.tag.remote, "upstream");
    assert!(config.tag.fetch_remote);
}

#[test]
fn test_invalid_file_is_an_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[commit\nlocale = ").unwrap();
    temp_file.flush().unwrap();

    assert!(load_config(temp_file.path()).is_err());
}

#[test]
fn test_load_or_init_writes_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = load_or_init(&path).unwrap();

    assert_eq!(config, Config::default());
    assert!(path.exists());
    assert_eq!(load_config(&path).unwrap(), Config::default());
}

#[test]
fn test_load_or_init_keeps_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[commit]\nlocale = \"zh\"\n").unwrap();

    let config = load_or_init(&path).unwrap();

    assert_eq!(config.commit.locale, "zh");
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "[commit]\nlocale = \"zh\"\n"
    );
}

#[test]
fn test_explicit_config_path() {
    let path = resolve_config_path(Some(std::path::Path::new("/tmp/custom.toml"))).unwrap();
    assert_eq!(path, std::path::PathBuf::from("/tmp/custom.toml"));
}

#[test]
#[serial]
fn test_local_env_file_feeds_overrides() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join(".git")).unwrap();
    fs::write(
        dir.path().join(".git").join(LOCAL_ENV_FILE),
        "OPENAI_MODEL=local-model\n",
    )
    .unwrap();
    std::env::remove_var("OPENAI_MODEL");

    let loaded = load_local_env(dir.path()).unwrap();
    let mut config = Config::default();
    config.apply_env();
    std::env::remove_var("OPENAI_MODEL");

    assert!(loaded.is_some());
    assert_eq!(config.openai.model, "local-model");
}

#[test]
#[serial]
fn test_process_env_wins_over_local_env_file() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join(".git")).unwrap();
    fs::write(
        dir.path().join(".git").join(LOCAL_ENV_FILE),
        "OPENAI_MODEL=local-model\n",
    )
    .unwrap();
    std::env::set_var("OPENAI_MODEL", "from-shell");

    load_local_env(dir.path()).unwrap();
    let mut config = Config::default();
    config.apply_env();
    std::env::remove_var("OPENAI_MODEL");

    assert_eq!(config.openai.model, "from-shell");
}

#[test]
fn test_missing_local_env_file() {
    let dir = TempDir::new().unwrap();
    assert_eq!(load_local_env(dir.path()).unwrap(), None);
}
