use thiserror::Error;

/// Unified error type for fastcommit operations
#[derive(Error, Debug)]
pub enum FastcommitError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed version tag '{tag}': {reason}")]
    MalformedTag { tag: String, reason: String },

    #[error("No version tags exist yet; cut a pre-release before releasing")]
    EmptyTagSet,

    #[error("Pre-release counter of '{tag}' is not numeric: '{counter}'")]
    NonNumericCounter { tag: String, counter: String },

    #[error("Cannot increment '{0}' past the largest supported number")]
    VersionOverflow(String),

    #[error("Channel name must not be empty")]
    EmptyChannel,

    #[error("Invalid channel name '{0}': use letters, digits and '-'")]
    InvalidChannel(String),

    #[error("Command `{command}` failed: {stderr}")]
    Command { command: String, stderr: String },

    #[error("LLM request failed: {0}")]
    Llm(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in fastcommit
pub type Result<T> = std::result::Result<T, FastcommitError>;

impl FastcommitError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        FastcommitError::Config(msg.into())
    }

    /// Create a malformed tag error
    pub fn malformed_tag(tag: impl Into<String>, reason: impl ToString) -> Self {
        FastcommitError::MalformedTag {
            tag: tag.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a failed command error from the command line and its stderr
    pub fn command(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        FastcommitError::Command {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    pub fn llm(msg: impl Into<String>) -> Self {
        FastcommitError::Llm(msg.into())
    }

    pub fn prompt(msg: impl Into<String>) -> Self {
        FastcommitError::Prompt(msg.into())
    }
}

impl From<dialoguer::Error> for FastcommitError {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(io) => FastcommitError::Io(io),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FastcommitError::config("missing api key");
        assert_eq!(err.to_string(), "Configuration error: missing api key");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FastcommitError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_malformed_tag_names_the_tag() {
        let err = FastcommitError::malformed_tag("v1.2", "unexpected end of input");
        let msg = err.to_string();
        assert!(msg.contains("'v1.2'"));
        assert!(msg.contains("unexpected end of input"));
    }

    #[test]
    fn test_non_numeric_counter_display() {
        let err = FastcommitError::NonNumericCounter {
            tag: "v1.0.0-alpha.x".to_string(),
            counter: "x".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Pre-release counter of 'v1.0.0-alpha.x' is not numeric: 'x'"
        );
    }

    #[test]
    fn test_command_error_keeps_stderr() {
        let err = FastcommitError::command("git push origin v1.0.0", "! [rejected]");
        let msg = err.to_string();
        assert!(msg.starts_with("Command `git push origin v1.0.0` failed"));
        assert!(msg.contains("! [rejected]"));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (FastcommitError::config("x"), "Configuration error"),
            (FastcommitError::llm("x"), "LLM request failed"),
            (FastcommitError::prompt("x"), "Prompt error"),
            (FastcommitError::EmptyTagSet, "No version tags"),
            (FastcommitError::EmptyChannel, "Channel name"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_errors = vec![
            std::io::Error::new(std::io::ErrorKind::NotFound, "Not found"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied"),
        ];

        for io_err in io_errors {
            let err: FastcommitError = io_err.into();
            assert!(err.to_string().contains("I/O error"));
        }
    }
}
