//! Messages command handler.

use std::path::Path;

use anyhow::{Context, Result};
use marsh_core::config::Config;
use marsh_core::transcript;

pub fn run(input: &Path, json: bool, cursor: Option<usize>, config: &Config) -> Result<()> {
    let text = super::read_input(input)?;
    let messages = super::messages_at(&text, cursor, config.offset_encoding)?;

    for (kind, count) in transcript::kind_counts(&messages) {
        tracing::debug!(%kind, count, "parsed turns");
    }

    if json {
        let out = serde_json::to_string_pretty(&messages).context("serialize messages")?;
        println!("{out}");
    } else {
        print!("{}", transcript::render_readable(&messages));
    }
    Ok(())
}
