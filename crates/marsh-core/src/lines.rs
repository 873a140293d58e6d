//! Conversion between file text and indented lines.
//!
//! On disk a document is UTF-8 text where each indentation level is one
//! leading tab. In memory every line carries its depth separately.

use marsh_types::Line;

/// Splits file text into lines, lifting leading tabs into indentation.
///
/// Each line but the last keeps its trailing newline. Text that ends with a
/// newline yields a final empty line; empty text yields no lines at all.
pub fn split_lines(text: &str) -> Vec<Line> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut lines: Vec<Line> = text.split_inclusive('\n').map(Line::from_raw).collect();
    if text.ends_with('\n') {
        lines.push(Line::default());
    }
    lines
}

/// Renders lines back to file text. Exact inverse of [`split_lines`].
pub fn render_lines(lines: &[Line]) -> String {
    let capacity = lines
        .iter()
        .map(|line| line.indentation + line.content.len())
        .sum();
    lines.iter().fold(String::with_capacity(capacity), |mut out, line| {
        out.push_str(&line.to_raw());
        out
    })
}

/// Prefixes every line of `text` with `depth` tabs.
///
/// Empty text stays empty; a trailing newline does not start a new line.
pub(crate) fn indent_text(text: &str, depth: usize) -> String {
    if depth == 0 {
        return text.to_string();
    }

    let prefix = "\t".repeat(depth);
    let mut out = String::with_capacity(text.len() + prefix.len() * 4);
    for line in text.split_inclusive('\n') {
        out.push_str(&prefix);
        out.push_str(line);
    }
    out
}
