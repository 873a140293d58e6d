//! Code-unit addressing for host text buffers.
//!
//! Hosts measure offsets in their own units: UTF-16 code units for
//! platform text views, UTF-8 bytes for Rust strings. Edit translation only
//! ever compares a single unit against `\t` or `\n`. Both are ASCII, and no
//! UTF-16 surrogate or UTF-8 continuation byte can equal an ASCII value, so
//! the scan never lands inside a multi-unit character.

use std::borrow::Borrow;

pub(crate) const TAB: u32 = '\t' as u32;
pub(crate) const NEWLINE: u32 = '\n' as u32;

/// Read-only view of a text as a sequence of code units.
pub trait CodeUnits {
    /// Number of code units in the text.
    fn unit_count(&self) -> usize;

    /// The code unit at `offset`, or `None` past the end.
    fn unit_at(&self, offset: usize) -> Option<u32>;

    /// Whether `offset` starts a line: offset zero, or right after a newline.
    fn is_line_start(&self, offset: usize) -> bool {
        offset == 0 || self.unit_at(offset - 1) == Some(NEWLINE)
    }

    /// Counts consecutive tabs starting at `offset`, stopping at the first
    /// non-tab unit (a newline included) or the end of the text.
    fn tabs_at(&self, offset: usize) -> usize {
        (offset..self.unit_count())
            .take_while(|&idx| self.unit_at(idx) == Some(TAB))
            .count()
    }
}

impl CodeUnits for str {
    fn unit_count(&self) -> usize {
        self.len()
    }

    fn unit_at(&self, offset: usize) -> Option<u32> {
        self.as_bytes().get(offset).copied().map(u32::from)
    }
}

impl CodeUnits for [u16] {
    fn unit_count(&self) -> usize {
        self.len()
    }

    fn unit_at(&self, offset: usize) -> Option<u32> {
        self.get(offset).copied().map(u32::from)
    }
}

/// An offset unit used by a host buffer.
pub trait Encoding {
    /// Borrowed unit sequence (`str` or `[u16]`).
    type Units: CodeUnits + ?Sized;
    /// Owned unit buffer produced by [`Encoding::encode`].
    type Owned: Borrow<Self::Units>;

    /// Short name used in config and CLI output.
    const NAME: &'static str;

    fn encode(text: &str) -> Self::Owned;

    /// Length of `text` in this encoding's units.
    fn measure(text: &str) -> usize;

    /// Converts a unit offset within `text` to a byte index.
    ///
    /// Returns `None` when the offset is past the end or falls inside a
    /// multi-unit character.
    fn byte_index(text: &str, offset: usize) -> Option<usize>;
}

/// UTF-8 bytes; offsets are plain `str` byte indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Utf8;

impl Encoding for Utf8 {
    type Units = str;
    type Owned = String;

    const NAME: &'static str = "utf8";

    fn encode(text: &str) -> String {
        text.to_string()
    }

    fn measure(text: &str) -> usize {
        text.len()
    }

    fn byte_index(text: &str, offset: usize) -> Option<usize> {
        text.is_char_boundary(offset).then_some(offset)
    }
}

/// UTF-16 code units, as used by platform text views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Utf16;

impl Encoding for Utf16 {
    type Units = [u16];
    type Owned = Vec<u16>;

    const NAME: &'static str = "utf16";

    fn encode(text: &str) -> Vec<u16> {
        text.encode_utf16().collect()
    }

    fn measure(text: &str) -> usize {
        text.encode_utf16().count()
    }

    fn byte_index(text: &str, offset: usize) -> Option<usize> {
        let mut units = 0;
        for (byte_idx, ch) in text.char_indices() {
            if units == offset {
                return Some(byte_idx);
            }
            if units > offset {
                return None;
            }
            units += ch.len_utf16();
        }
        (units == offset).then_some(text.len())
    }
}
