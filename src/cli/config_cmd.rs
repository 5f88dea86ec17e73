//! `fastcommit config` and `fastcommit config edit`.

use std::fs;
use std::path::Path;
use std::process::Command;

use log::{debug, info};

use crate::cli::orchestration::RunContext;
use crate::error::{FastcommitError, Result};

/// Editors tried in order when neither an argument nor `$EDITOR` names one
const FALLBACK_EDITORS: &[&str] = &["zed -w", "code -w", "vim", "nano"];

/// Last resort, present on every unix system
const LAST_RESORT_EDITOR: &str = "vi";

/// Path and contents of the configuration file
pub fn render_config(path: &Path) -> Result<String> {
    let contents = fs::read_to_string(path)?;
    Ok(format!("config path: {}\n\n{}", path.display(), contents.trim_end()))
}

pub fn run_show(ctx: &RunContext) -> Result<()> {
    println!("{}", render_config(&ctx.config_path)?);
    Ok(())
}

/// Pick the editor command line.
///
/// `available` reports whether a program is on `PATH`.
pub fn resolve_editor(
    explicit: Option<&str>,
    env_editor: Option<String>,
    available: impl Fn(&str) -> bool,
) -> String {
    if let Some(editor) = explicit.map(str::trim).filter(|e| !e.is_empty()) {
        return editor.to_string();
    }

    if let Some(editor) = env_editor.filter(|e| !e.trim().is_empty()) {
        return editor.trim().to_string();
    }

    FALLBACK_EDITORS
        .iter()
        .find(|candidate| {
            candidate
                .split_whitespace()
                .next()
                .is_some_and(|program| available(program))
        })
        .map(|editor| editor.to_string())
        .unwrap_or_else(|| LAST_RESORT_EDITOR.to_string())
}

/// Open the configuration file in an editor and wait for it to exit.
pub fn run_edit(ctx: &RunContext, editor: Option<&str>) -> Result<()> {
    let editor = resolve_editor(editor, std::env::var("EDITOR").ok(), |program| {
        which::which(program).is_ok()
    });

    let mut parts = editor.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| FastcommitError::config("editor command is empty"))?;

    info!("edit config: {} {}", editor, ctx.config_path.display());
    let status = Command::new(program)
        .args(parts)
        .arg(&ctx.config_path)
        .status()?;
    debug!("editor exited with {}", status);

    if !status.success() {
        return Err(FastcommitError::command(
            format!("{} {}", editor, ctx.config_path.display()),
            format!("editor exited with {}", status),
        ));
    }

    Ok(())
}
