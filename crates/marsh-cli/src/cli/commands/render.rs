//! Render command handler.

use std::path::Path;

use anyhow::Result;
use marsh_core::parse_text;
use marsh_core::transcript::render_messages;

pub fn run(input: &Path) -> Result<()> {
    let text = super::read_input(input)?;
    print!("{}", render_messages(&parse_text(&text)));
    Ok(())
}
