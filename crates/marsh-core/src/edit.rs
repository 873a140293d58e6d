//! Translation of raw text edits into indentation changes.
//!
//! The host text never holds tabs at the start of a line; those live in the
//! line's indentation instead. An edit can break that rule in a few ways:
//!
//! - a newline is inserted right before existing tabs
//! - a tab is inserted right after a newline (or at offset zero)
//! - the characters separating a newline from tabs are deleted
//! - a tab and a newline are inserted together, or pasted across many lines
//!
//! [`derive_edit`] detects these cases and rewrites the edit so that the
//! offending tabs are dropped from the text and reported as [`IndentOp`]s.
//! Tabs in the middle or at the end of a line are literal and left alone.

use marsh_types::{DerivedEdit, IndentOp, TextRange};

use crate::units::{CodeUnits, Encoding};

/// A piece of inserted text ending at (and including) a newline, or the
/// unterminated tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Fragment<'a> {
    pub text: &'a str,
    pub at_line_start: bool,
}

/// Splits `insertion` into newline-terminated fragments.
///
/// Only the first fragment can sit mid-line; every later one follows a
/// newline.
pub(crate) fn fragments(insertion: &str, starts_line: bool) -> Vec<Fragment<'_>> {
    insertion
        .split_inclusive('\n')
        .enumerate()
        .map(|(idx, text)| Fragment {
            text,
            at_line_start: idx > 0 || starts_line,
        })
        .collect()
}

fn leading_tabs(text: &str) -> usize {
    text.bytes().take_while(|&b| b == b'\t').count()
}

/// Rewrites an edit of `base` so that no line-leading tabs reach the text.
///
/// `base` is the text before the edit, `range` the replaced span and
/// `insertion` the replacement, all measured in `E` units. Returns `None` when
/// the edit can be applied verbatim.
pub fn derive_edit<E: Encoding>(
    base: &E::Units,
    range: TextRange,
    insertion: Option<&str>,
) -> Option<DerivedEdit> {
    let starts_line = base.is_line_start(range.location);
    let tabs_after = base.tabs_at(range.end());

    let Some(insertion) = insertion.filter(|s| !s.is_empty()) else {
        return derive_deletion(range, starts_line, tabs_after);
    };

    let mut content = String::with_capacity(insertion.len());
    let mut indents = Vec::new();
    let mut offset = range.location;

    for fragment in fragments(insertion, starts_line) {
        let tabs = if fragment.at_line_start {
            leading_tabs(fragment.text)
        } else {
            0
        };
        let rest = &fragment.text[tabs..];
        if tabs > 0 {
            indents.push(IndentOp::new(offset, tabs));
        }
        content.push_str(rest);
        offset += E::measure(rest);
    }

    // The text after the range lands at a line start when the insertion ends
    // with a newline, or when it was nothing but leading tabs.
    let mut range = range;
    let ends_at_line_start = content.ends_with('\n') || (content.is_empty() && starts_line);
    if ends_at_line_start && tabs_after > 0 {
        range = range.extended(tabs_after);
        match indents.last_mut() {
            Some(op) if op.location == offset => op.depth += tabs_after,
            _ => indents.push(IndentOp::new(offset, tabs_after)),
        }
    }

    if indents.is_empty() {
        return None;
    }

    tracing::debug!(
        location = range.location,
        length = range.length,
        indents = indents.len(),
        "insertion rewritten to indentation"
    );
    Some(DerivedEdit {
        range,
        content,
        indents,
    })
}

fn derive_deletion(range: TextRange, starts_line: bool, tabs_after: usize) -> Option<DerivedEdit> {
    if !starts_line || tabs_after == 0 {
        return None;
    }

    // The deletion exposes the tabs at the start of the line; fold them.
    tracing::debug!(
        location = range.location,
        tabs = tabs_after,
        "deletion exposes leading tabs"
    );
    Some(DerivedEdit {
        range: range.extended(tabs_after),
        content: String::new(),
        indents: vec![IndentOp::new(range.location, tabs_after)],
    })
}
