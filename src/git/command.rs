use crate::error::{FastcommitError, Result};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

/// Captured result of a git invocation that is allowed to fail
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// stdout and stderr joined, trimmed. `git push` reports on stderr.
    pub fn combined(&self) -> String {
        let mut text = self.stdout.trim().to_string();
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(stderr);
        }
        text
    }
}

/// Runs the `git` binary inside a working directory.
///
/// Used for everything that must honour the user's git setup (hooks,
/// credential helpers, push configuration).
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    pub fn new<P: AsRef<Path>>(workdir: P) -> Self {
        GitCli {
            workdir: workdir.as_ref().to_path_buf(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Run and capture; a non-zero exit is reported in the output, not as an error.
    pub fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        let command_line = command_line(args);
        let started = Instant::now();

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .output()?;

        let result = CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(
            "shell: {} ({:?}, success={})",
            command_line,
            started.elapsed(),
            result.success
        );

        Ok(result)
    }

    /// Run and return trimmed stdout, failing on a non-zero exit.
    pub fn output(&self, args: &[&str]) -> Result<String> {
        let result = self.run(args)?;
        if !result.success {
            return Err(FastcommitError::command(
                command_line(args),
                result.stderr.trim(),
            ));
        }

        Ok(result.stdout.trim().to_string())
    }

    /// Run attached to the terminal so the user sees git's own progress and
    /// can answer prompts. Returns whether git exited successfully.
    pub fn interactive(&self, args: &[&str]) -> Result<bool> {
        let command_line = command_line(args);
        let started = Instant::now();

        let status = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .status()?;

        debug!(
            "shell: {} ({:?}, success={})",
            command_line,
            started.elapsed(),
            status.success()
        );

        Ok(status.success())
    }
}

fn command_line(args: &[&str]) -> String {
    let mut line = String::from("git");
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_output_joins_streams() {
        let output = CommandOutput {
            success: false,
            stdout: "Everything up-to-date\n".to_string(),
            stderr: " ! [rejected] main -> main (fetch first)\n".to_string(),
        };
        assert_eq!(
            output.combined(),
            "Everything up-to-date\n! [rejected] main -> main (fetch first)"
        );
    }

    #[test]
    fn test_combined_output_stderr_only() {
        let output = CommandOutput {
            success: true,
            stdout: String::new(),
            stderr: "To github.com:x/y.git\n".to_string(),
        };
        assert_eq!(output.combined(), "To github.com:x/y.git");
    }

    #[test]
    fn test_command_line() {
        assert_eq!(command_line(&["push", "origin", "v1.0.0"]), "git push origin v1.0.0");
    }

    #[test]
    fn test_output_outside_repository_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let cli = GitCli::new(dir.path());
        // `git rev-parse` exits non-zero outside a repository
        if let Ok(result) = cli.run(&["rev-parse", "--git-dir"]) {
            assert!(!result.success);
            assert!(cli.output(&["rev-parse", "--git-dir"]).is_err());
        }
    }
}
