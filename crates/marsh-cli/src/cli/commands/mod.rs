//! CLI command handlers.

pub mod config;
pub mod edit;
pub mod messages;
pub mod render;
pub mod request;

use std::io::Read;
use std::path::Path;
use std::{fs, io};

use anyhow::{Context, Result};
use marsh_core::Document;
use marsh_core::config::OffsetEncoding;
use marsh_core::units::{Encoding, Utf8, Utf16};
use marsh_types::Message;

/// Reads a document from `input`, or stdin when it is `-`.
fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("read document from stdin")?;
        return Ok(text);
    }

    fs::read_to_string(input).with_context(|| format!("read document {}", input.display()))
}

/// Parses `text`, optionally only up to `cursor` (in `encoding` units).
fn messages_at(
    text: &str,
    cursor: Option<usize>,
    encoding: OffsetEncoding,
) -> Result<Vec<Message>> {
    match encoding {
        OffsetEncoding::Utf16 => messages_in::<Utf16>(text, cursor),
        OffsetEncoding::Utf8 => messages_in::<Utf8>(text, cursor),
    }
}

fn messages_in<E: Encoding>(text: &str, cursor: Option<usize>) -> Result<Vec<Message>> {
    let document = Document::<E>::from_file_str(text);
    let Some(offset) = cursor else {
        return Ok(document.messages());
    };

    let prefix = document
        .prefix(offset)
        .with_context(|| format!("cut document at {} offset {offset}", E::NAME))?;
    Ok(prefix.messages())
}
