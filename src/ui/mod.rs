//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Interactive prompts, behind the [Prompter] trait, and
//!   the progress spinner

use std::collections::VecDeque;
use std::time::Duration;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{FuzzySelect, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{FastcommitError, Result};

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_boundary_warning, display_error, display_manual_push_instruction,
    display_proposed_tag, display_pull_followup, display_status, display_success,
};

/// Free-text input with an editable initial value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPrompt {
    pub message: String,
    pub initial: String,
}

/// Pick one of `items`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectPrompt {
    pub message: String,
    pub items: Vec<String>,
    pub default: usize,
    /// Type-to-filter selection
    pub fuzzy: bool,
}

/// Every kind of question the commands ask
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Text(TextPrompt),
    Select(SelectPrompt),
}

impl Prompt {
    pub fn text(message: impl Into<String>, initial: impl Into<String>) -> Self {
        Prompt::Text(TextPrompt {
            message: message.into(),
            initial: initial.into(),
        })
    }

    pub fn select(message: impl Into<String>, items: Vec<String>) -> Self {
        Prompt::Select(SelectPrompt {
            message: message.into(),
            items,
            default: 0,
            fuzzy: false,
        })
    }

    pub fn fuzzy_select(message: impl Into<String>, items: Vec<String>) -> Self {
        Prompt::Select(SelectPrompt {
            message: message.into(),
            items,
            default: 0,
            fuzzy: true,
        })
    }
}

/// Answer to a [Prompt]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Entered text, or the chosen item for a selection
    Submitted(String),
    /// Escape, or an empty text answer
    Cancelled,
}

/// Asks the user questions.
pub trait Prompter {
    fn ask(&mut self, prompt: &Prompt) -> Result<PromptOutcome>;
}

/// Interactive prompts on the terminal through dialoguer
#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, prompt: &Prompt) -> Result<PromptOutcome> {
        match prompt {
            Prompt::Text(text) => {
                let answer: String = Input::with_theme(&self.theme)
                    .with_prompt(&text.message)
                    .with_initial_text(&text.initial)
                    .allow_empty(true)
                    .interact_text()?;

                let answer = answer.trim();
                if answer.is_empty() {
                    Ok(PromptOutcome::Cancelled)
                } else {
                    Ok(PromptOutcome::Submitted(answer.to_string()))
                }
            }
            Prompt::Select(select) => {
                if select.items.is_empty() {
                    return Err(FastcommitError::prompt(format!(
                        "nothing to choose from for '{}'",
                        select.message
                    )));
                }

                let default = select.default.min(select.items.len() - 1);
                let chosen = if select.fuzzy {
                    FuzzySelect::with_theme(&self.theme)
                        .with_prompt(&select.message)
                        .items(&select.items[..])
                        .default(default)
                        .interact_opt()?
                } else {
                    Select::with_theme(&self.theme)
                        .with_prompt(&select.message)
                        .items(&select.items[..])
                        .default(default)
                        .interact_opt()?
                };

                Ok(chosen
                    .and_then(|index| select.items.get(index).cloned())
                    .map(PromptOutcome::Submitted)
                    .unwrap_or(PromptOutcome::Cancelled))
            }
        }
    }
}

/// Replays canned answers and records the questions asked
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<PromptOutcome>,
    asked: Vec<Prompt>,
}

impl ScriptedPrompter {
    pub fn new(answers: Vec<PromptOutcome>) -> Self {
        ScriptedPrompter {
            answers: answers.into(),
            asked: Vec::new(),
        }
    }

    /// Shorthand for a script made only of submitted answers
    pub fn answering(answers: &[&str]) -> Self {
        Self::new(
            answers
                .iter()
                .map(|a| PromptOutcome::Submitted(a.to_string()))
                .collect(),
        )
    }

    pub fn asked(&self) -> &[Prompt] {
        &self.asked
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: &Prompt) -> Result<PromptOutcome> {
        self.asked.push(prompt.clone());
        self.answers
            .pop_front()
            .ok_or_else(|| FastcommitError::prompt(format!("no scripted answer for {:?}", prompt)))
    }
}

/// Run `work` while a spinner animates on its own thread.
///
/// The spinner is cleared before the result is returned.
pub fn spin<T>(message: &str, work: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = work();

    spinner.finish_and_clear();
    result
}
