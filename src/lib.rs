pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod github;
pub mod history;
pub mod llm;
pub mod prompt;
pub mod ui;

pub use error::{FastcommitError, Result};
