//! Edit command handler.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use marsh_core::Document;
use marsh_core::config::OffsetEncoding;
use marsh_core::units::{Encoding, Utf8, Utf16};
use marsh_types::{DerivedEdit, TextRange};

pub struct EditOptions<'a> {
    pub path: &'a Path,
    pub at: usize,
    pub delete: usize,
    pub insert: Option<&'a str>,
    pub dry_run: bool,
    pub encoding: OffsetEncoding,
}

pub fn run(opts: &EditOptions<'_>) -> Result<()> {
    let text = fs::read_to_string(opts.path)
        .with_context(|| format!("read document {}", opts.path.display()))?;

    let (derived, updated) = match opts.encoding {
        OffsetEncoding::Utf16 => apply::<Utf16>(&text, opts)?,
        OffsetEncoding::Utf8 => apply::<Utf8>(&text, opts)?,
    };

    if opts.dry_run {
        let out = serde_json::to_string_pretty(&derived).context("serialize derived edit")?;
        println!("{out}");
        return Ok(());
    }

    write_document(opts.path, &updated)?;
    match derived {
        Some(edit) => println!(
            "Updated {} ({} indentation change(s))",
            opts.path.display(),
            edit.indents.len()
        ),
        None => println!("Updated {}", opts.path.display()),
    }
    Ok(())
}

fn apply<E: Encoding>(
    text: &str,
    opts: &EditOptions<'_>,
) -> Result<(Option<DerivedEdit>, String)> {
    let mut document = Document::<E>::from_file_str(text);
    let range = TextRange::new(opts.at, opts.delete);
    let derived = document.apply_edit(range, opts.insert).with_context(|| {
        format!(
            "apply edit at {} offset {} (length {})",
            E::NAME,
            range.location,
            range.length
        )
    })?;
    Ok((derived, document.file_string()))
}

/// Replaces the document file via a temp file and rename.
fn write_document(path: &Path, content: &str) -> Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    fs::write(tmp_path, content)
        .with_context(|| format!("write document to {}", tmp_path.display()))?;
    fs::rename(tmp_path, path).with_context(|| {
        format!("rename {} to {}", tmp_path.display(), path.display())
    })?;
    Ok(())
}
