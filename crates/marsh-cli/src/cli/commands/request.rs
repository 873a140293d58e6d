//! Request command handler.

use std::path::Path;

use anyhow::{Context, Result};
use marsh_core::config::Config;
use marsh_core::request::ChatRequest;

pub struct RequestOptions<'a> {
    pub input: &'a Path,
    pub model_override: Option<&'a str>,
    pub max_tokens_override: Option<u32>,
    pub cursor: Option<usize>,
    pub config: &'a Config,
}

pub fn run(opts: &RequestOptions<'_>) -> Result<()> {
    let text = super::read_input(opts.input)?;
    let messages = super::messages_at(&text, opts.cursor, opts.config.offset_encoding)?;

    let mut request = ChatRequest::build(&messages, opts.config).context("build chat request")?;
    if let Some(model) = opts.model_override {
        request = request.with_model(model);
    }
    if let Some(max_tokens) = opts.max_tokens_override {
        request = request.with_max_tokens(max_tokens);
    }

    if !request.awaits_reply() {
        tracing::warn!("last turn is not from the user");
    }

    let out = serde_json::to_string_pretty(&request).context("serialize chat request")?;
    println!("{out}");
    Ok(())
}
