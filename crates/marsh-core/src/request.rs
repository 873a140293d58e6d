//! Chat request bodies built from parsed documents.
//!
//! The body follows the Anthropic Messages API shape. Sending it is left to
//! the caller.

use anyhow::Result;
use marsh_types::{Message, MessageKind};
use serde::Serialize;

use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<ApiMessage>,
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatRequest {
    /// Builds a request from document turns and the config defaults.
    ///
    /// System turns are folded into the `system` field after the configured
    /// prompt. Blank user and assistant turns are dropped and trailing
    /// whitespace is trimmed from the rest.
    pub fn build(messages: &[Message], config: &Config) -> Result<Self> {
        let mut system: Vec<String> = config.effective_system_prompt()?.into_iter().collect();
        let mut turns = Vec::new();

        for message in messages {
            let content = message.content.trim_end();
            match message.kind {
                MessageKind::System => {
                    if !content.is_empty() {
                        system.push(content.to_string());
                    }
                }
                MessageKind::User | MessageKind::Assistant => {
                    if content.is_empty() {
                        tracing::debug!(kind = %message.kind, "skipping blank turn");
                        continue;
                    }
                    turns.push(ApiMessage {
                        role: message.kind.role(),
                        content: content.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            model: config.model.clone(),
            max_tokens: config.effective_max_tokens(),
            temperature: config.temperature,
            system: (!system.is_empty()).then(|| system.join("\n\n")),
            messages: turns,
            stream: true,
        })
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Whether the last turn is from the user, i.e. a reply is due.
    pub fn awaits_reply(&self) -> bool {
        self.messages.last().is_some_and(|m| m.role == "user")
    }
}
