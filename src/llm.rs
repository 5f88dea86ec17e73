//! Chat-completion client for OpenAI-compatible endpoints.

use crate::config::OpenAiConfig;
use crate::error::{FastcommitError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Token accounting reported by the endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// First choice of a chat completion
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    pub usage: Option<Usage>,
}

/// Something that turns a system prompt and a user message into text.
pub trait ChatCompletion {
    /// `Ok(None)` when the endpoint answered without any choice.
    fn complete(&self, system: &str, user: &str) -> Result<Option<Completion>>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

/// Blocking client for `POST {base_url}/chat/completions`
pub struct OpenAiClient {
    api_key: String,
    model: String,
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                FastcommitError::config(
                    "OpenAI API key is missing; set OPENAI_API_KEY or openai.api_key",
                )
            })?
            .to_string();

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("fastcommit/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(OpenAiClient {
            api_key,
            model: config.model.clone(),
            endpoint: chat_endpoint(&config.base_url),
            client,
        })
    }
}

impl ChatCompletion for OpenAiClient {
    fn complete(&self, system: &str, user: &str) -> Result<Option<Completion>> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        debug!("POST {} model={}", self.endpoint, self.model);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(FastcommitError::llm(format!("{}: {}", status, body.trim())));
        }

        let body: ChatResponse = response.json()?;
        Ok(first_completion(body))
    }
}

fn first_completion(body: ChatResponse) -> Option<Completion> {
    let usage = body.usage;
    body.choices.into_iter().next().map(|choice| Completion {
        content: choice.message.content.trim().to_string(),
        usage,
    })
}

fn chat_endpoint(base_url: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    if base.ends_with("/chat/completions") {
        base.to_string()
    } else {
        format!("{}/chat/completions", base)
    }
}

/// Fixed answer, for tests and dry runs
pub struct StaticCompletion {
    content: Option<String>,
}

impl StaticCompletion {
    pub fn new(content: impl Into<String>) -> Self {
        StaticCompletion {
            content: Some(content.into()),
        }
    }

    /// Behaves like an endpoint returning no choices
    pub fn empty() -> Self {
        StaticCompletion { content: None }
    }
}

impl ChatCompletion for StaticCompletion {
    fn complete(&self, _system: &str, _user: &str) -> Result<Option<Completion>> {
        Ok(self.content.as_ref().map(|content| Completion {
            content: content.clone(),
            usage: None,
        }))
    }
}
