use std::fmt;

/// Non-fatal conditions met while committing, pushing or tagging.
/// These are reported to the user and the workflow carries on.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// Remote tags could not be fetched; local tags are used instead
    FetchFailed { remote: String, reason: String },
    /// The edited commit message does not follow the conventional format
    NonConventionalMessage { message: String },
    /// The remote already has a tag with this name
    RemoteTagExists { tag: String, remote: String },
    /// The remote refused the branch push
    PushRejected { remote: String, branch: String },
    /// `git pull` left files with conflict markers
    MergeConflicts { files: Vec<String> },
    /// The model answered without any message
    EmptyCompletion,
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::FetchFailed { remote, reason } => {
                write!(
                    f,
                    "Could not fetch tags from '{}': {}. Using local tags",
                    remote,
                    reason.lines().next().unwrap_or("").trim()
                )
            }
            BoundaryWarning::NonConventionalMessage { message } => {
                let header = message.lines().next().unwrap_or("");
                write!(
                    f,
                    "Commit message '{}' is not a conventional commit",
                    header
                )
            }
            BoundaryWarning::RemoteTagExists { tag, remote } => {
                write!(f, "Tag '{}' already exists on remote '{}'", tag, remote)
            }
            BoundaryWarning::PushRejected { remote, branch } => {
                write!(
                    f,
                    "Push of '{}' to '{}' was rejected; pulling remote changes",
                    branch, remote
                )
            }
            BoundaryWarning::MergeConflicts { files } => {
                write!(f, "Merge conflicts in {} file(s): {}", files.len(), files.join(", "))
            }
            BoundaryWarning::EmptyCompletion => {
                write!(f, "The model returned no commit message; nothing committed")
            }
        }
    }
}
