//! System prompt for commit message generation.

use crate::domain::commit::COMMIT_TYPES;
use serde::{Deserialize, Serialize};

/// Style of commit message the model is asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    #[default]
    Conventional,
    Plain,
}

impl CommitType {
    fn output_format(&self) -> &'static str {
        match self {
            CommitType::Conventional => "<type>(<optional scope>): <commit message>",
            CommitType::Plain => "<commit message>",
        }
    }

    fn type_table(&self) -> Option<String> {
        match self {
            CommitType::Plain => None,
            CommitType::Conventional => {
                let entries: Vec<String> = COMMIT_TYPES
                    .iter()
                    .map(|(name, description)| format!("  \"{}\": \"{}\"", name, description))
                    .collect();

                Some(format!(
                    "Choose a type from the type-to-description JSON below that best describes the git diff:\n{{\n{}\n}}",
                    entries.join(",\n")
                ))
            }
        }
    }
}

/// Build the system prompt sent ahead of the staged diff.
pub fn generate_prompt(locale: &str, max_length: usize, commit_type: CommitType) -> String {
    let parts = [
        Some("Generate a concise git commit message written in present tense for the following code diff with the given specifications below:".to_string()),
        Some(format!("Message language: {}", locale)),
        Some(format!(
            "Commit message must be a maximum of {} characters.",
            max_length
        )),
        Some("Exclude anything unnecessary such as translation. Your entire response will be passed directly into git commit.".to_string()),
        commit_type.type_table(),
        Some(format!(
            "The output response must be in format:\n{}",
            commit_type.output_format()
        )),
    ];

    parts
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
