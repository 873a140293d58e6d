//! In-memory line buffer that stores indentation out of band.
//!
//! The buffer exposes a *view text*: the concatenated line contents with no
//! leading tabs. All offsets are measured in the units of the buffer's
//! [`Encoding`]. The file form puts the tabs back, one per depth level.

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;

use marsh_types::{DerivedEdit, Line, Message, TextRange};

use crate::edit::derive_edit;
use crate::lines::{render_lines, split_lines};
use crate::parser::parse_lines;
use crate::units::{Encoding, Utf16};

/// Range-validity failures reported by a [`LineBuffer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Offset past the end of the view text.
    OutOfBounds { offset: usize, len: usize },
    /// Offset falls inside a multi-unit character.
    SplitsCharacter { offset: usize },
    /// The mutation would leave a line starting with a tab.
    LeadingTab { line: usize },
    /// An undo record refers to lines that no longer exist.
    StaleUndo { line: usize },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::OutOfBounds { offset, len } => {
                write!(f, "offset {offset} is out of bounds (length {len})")
            }
            BufferError::SplitsCharacter { offset } => {
                write!(f, "offset {offset} falls inside a character")
            }
            BufferError::LeadingTab { line } => {
                write!(f, "line {line} would start with a tab")
            }
            BufferError::StaleUndo { line } => {
                write!(f, "undo record refers to missing line {line}")
            }
        }
    }
}

impl std::error::Error for BufferError {}

/// Previous depths of the lines touched by an indent or outdent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentUndo {
    first_line: usize,
    depths: Vec<usize>,
}

/// Host text storage with per-line indentation.
pub trait LineBuffer {
    /// Length of the view text in code units.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Depth of the line containing `at`.
    fn indentation(&self, at: usize) -> Result<usize, BufferError>;

    /// Calls `visitor(content, line_range, indentation)` for every line that
    /// intersects `range`. An empty range visits the line holding its caret.
    fn enumerate_lines<F>(&self, range: TextRange, visitor: F) -> Result<(), BufferError>
    where
        F: FnMut(&str, TextRange, usize);

    /// Adds `delta` to the depth of every line intersecting `range`.
    fn indent(&mut self, range: TextRange, delta: usize) -> Result<IndentUndo, BufferError>;

    /// Subtracts `delta` from the depth of every line intersecting `range`,
    /// stopping at zero.
    fn outdent(&mut self, range: TextRange, delta: usize) -> Result<IndentUndo, BufferError>;

    /// Puts back the depths recorded by an earlier indent or outdent.
    fn restore(&mut self, undo: &IndentUndo) -> Result<(), BufferError>;

    fn insert(&mut self, content: &str, at: usize) -> Result<(), BufferError>;

    fn delete(&mut self, range: TextRange) -> Result<(), BufferError>;
}

/// A marsh document held as lines, addressed in `E` units.
#[derive(Debug, PartialEq, Eq)]
pub struct Document<E: Encoding = Utf16> {
    /// Never empty; every line but the last ends with `\n`.
    lines: Vec<Line>,
    encoding: PhantomData<E>,
}

impl<E: Encoding> Clone for Document<E> {
    fn clone(&self) -> Self {
        Self::from_lines(self.lines.clone())
    }
}

impl<E: Encoding> Default for Document<E> {
    fn default() -> Self {
        Self::from_lines(vec![Line::default()])
    }
}

impl<E: Encoding> Document<E> {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_lines(lines: Vec<Line>) -> Self {
        Self {
            lines,
            encoding: PhantomData,
        }
    }

    /// Loads a document from its file form (tabs as indentation).
    pub fn from_file_str(text: &str) -> Self {
        let lines = split_lines(text);
        if lines.is_empty() {
            return Self::default();
        }
        Self::from_lines(lines)
    }

    /// The file form: each line prefixed by one tab per depth level.
    pub fn file_string(&self) -> String {
        render_lines(&self.lines)
    }

    /// The view text, without indentation.
    pub fn text(&self) -> String {
        self.lines.iter().map(|line| line.content.as_str()).collect()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    fn is_blank(&self) -> bool {
        self.lines.len() == 1 && self.lines[0] == Line::default()
    }

    /// Parses the document into conversation turns.
    pub fn messages(&self) -> Vec<Message> {
        if self.is_blank() {
            return Vec::new();
        }
        parse_lines(&self.lines)
    }

    /// The document cut off at `offset`, e.g. a cursor position.
    pub fn prefix(&self, offset: usize) -> Result<Self, BufferError> {
        let len = self.len();
        if offset > len {
            return Err(BufferError::OutOfBounds { offset, len });
        }
        let mut prefix = self.clone();
        prefix.delete(TextRange::new(offset, len - offset))?;
        Ok(prefix)
    }

    /// Replaces `range` with `insertion` the way a host text view would,
    /// folding any line-leading tabs into indentation.
    ///
    /// The content change and all indentation changes land together or not
    /// at all. Returns the rewritten edit, or `None` when the edit went in
    /// verbatim.
    pub fn apply_edit(
        &mut self,
        range: TextRange,
        insertion: Option<&str>,
    ) -> Result<Option<DerivedEdit>, BufferError> {
        let len = self.len();
        if range.end() > len {
            return Err(BufferError::OutOfBounds {
                offset: range.end(),
                len,
            });
        }

        let units = E::encode(&self.text());
        let derived = derive_edit::<E>(Borrow::<E::Units>::borrow(&units), range, insertion);

        let checkpoint = self.lines.clone();
        let applied = match &derived {
            Some(edit) => self.apply_derived(edit),
            None => self.replace(range, insertion.unwrap_or_default()),
        };
        if let Err(err) = applied {
            tracing::debug!(%err, "edit rolled back");
            self.lines = checkpoint;
            return Err(err);
        }
        Ok(derived)
    }

    fn apply_derived(&mut self, edit: &DerivedEdit) -> Result<(), BufferError> {
        self.replace(edit.range, &edit.content)?;
        for op in &edit.indents {
            self.indent(TextRange::caret(op.location), op.depth)?;
        }
        Ok(())
    }

    /// Swaps `range` for `content` in a single splice. Only the resulting
    /// lines are checked for leading tabs.
    fn replace(&mut self, range: TextRange, content: &str) -> Result<(), BufferError> {
        let (first, start) = self.locate(range.location)?;
        let (last, end) = self.locate(range.end())?;
        if range.is_empty() && content.is_empty() {
            return Ok(());
        }

        let depth = self.lines[first].indentation;
        let was_terminated = self.lines[last].content.ends_with('\n');
        let mut merged = self.lines[first].content[..start].to_string();
        merged.push_str(content);
        merged.push_str(&self.lines[last].content[end..]);

        // The first piece keeps the line's depth; split-off lines start flat.
        let mut replacement: Vec<Line> = merged
            .split_inclusive('\n')
            .enumerate()
            .map(|(pos, piece)| Line::new(piece, if pos == 0 { depth } else { 0 }))
            .collect();
        if replacement.is_empty() {
            replacement.push(Line::new("", depth));
        } else if merged.ends_with('\n') && !was_terminated {
            replacement.push(Line::default());
        }

        let added = replacement.len();
        self.splice(first, last, replacement)?;
        tracing::trace!(
            location = range.location,
            length = range.length,
            removed = last - first + 1,
            added,
            "replaced"
        );
        Ok(())
    }

    /// Index of the line containing `offset`. The offset right after a
    /// newline belongs to the next line.
    fn line_index(&self, offset: usize) -> Result<usize, BufferError> {
        self.line_start(offset).map(|(idx, _)| idx)
    }

    /// Line index and the unit offset where that line starts.
    fn line_start(&self, offset: usize) -> Result<(usize, usize), BufferError> {
        let last = self.lines.len() - 1;
        let mut start = 0;
        for (idx, line) in self.lines.iter().enumerate() {
            let end = start + E::measure(&line.content);
            if offset < end || (idx == last && offset == end) {
                return Ok((idx, start));
            }
            start = end;
        }
        Err(BufferError::OutOfBounds { offset, len: start })
    }

    /// Line index and byte index within that line's content.
    fn locate(&self, offset: usize) -> Result<(usize, usize), BufferError> {
        let (idx, start) = self.line_start(offset)?;
        let byte = E::byte_index(&self.lines[idx].content, offset - start)
            .ok_or(BufferError::SplitsCharacter { offset })?;
        Ok((idx, byte))
    }

    fn touched_lines(&self, range: TextRange) -> Result<(usize, usize), BufferError> {
        self.line_index(range.end())?;
        let first = self.line_index(range.location)?;
        let last = if range.is_empty() {
            first
        } else {
            self.line_index(range.end() - 1)?
        };
        Ok((first, last))
    }

    fn shift(
        &mut self,
        range: TextRange,
        apply: impl Fn(usize) -> usize,
    ) -> Result<IndentUndo, BufferError> {
        let (first, last) = self.touched_lines(range)?;
        let lines = &mut self.lines[first..=last];
        let depths = lines.iter().map(|line| line.indentation).collect();
        for line in lines {
            line.indentation = apply(line.indentation);
        }
        Ok(IndentUndo {
            first_line: first,
            depths,
        })
    }

    /// Swaps lines `first..=last` for `replacement` after checking that no
    /// new line starts with a tab.
    fn splice(
        &mut self,
        first: usize,
        last: usize,
        replacement: Vec<Line>,
    ) -> Result<(), BufferError> {
        if let Some(pos) = replacement
            .iter()
            .position(|line| line.content.starts_with('\t'))
        {
            return Err(BufferError::LeadingTab { line: first + pos });
        }
        self.lines.splice(first..=last, replacement);
        Ok(())
    }
}

impl<E: Encoding> LineBuffer for Document<E> {
    fn len(&self) -> usize {
        self.lines
            .iter()
            .map(|line| E::measure(&line.content))
            .sum()
    }

    fn indentation(&self, at: usize) -> Result<usize, BufferError> {
        let idx = self.line_index(at)?;
        Ok(self.lines[idx].indentation)
    }

    fn enumerate_lines<F>(&self, range: TextRange, mut visitor: F) -> Result<(), BufferError>
    where
        F: FnMut(&str, TextRange, usize),
    {
        let (first, last) = self.touched_lines(range)?;
        let (_, mut start) = self.line_start(range.location)?;
        for line in &self.lines[first..=last] {
            let length = E::measure(&line.content);
            visitor(&line.content, TextRange::new(start, length), line.indentation);
            start += length;
        }
        Ok(())
    }

    fn indent(&mut self, range: TextRange, delta: usize) -> Result<IndentUndo, BufferError> {
        self.shift(range, |depth| depth + delta)
    }

    fn outdent(&mut self, range: TextRange, delta: usize) -> Result<IndentUndo, BufferError> {
        self.shift(range, |depth| {
            if delta > depth {
                tracing::debug!(depth, delta, "outdent clamped at zero");
            }
            depth.saturating_sub(delta)
        })
    }

    fn restore(&mut self, undo: &IndentUndo) -> Result<(), BufferError> {
        let end = undo.first_line + undo.depths.len();
        let Some(lines) = self.lines.get_mut(undo.first_line..end) else {
            return Err(BufferError::StaleUndo { line: end - 1 });
        };
        for (line, &depth) in lines.iter_mut().zip(&undo.depths) {
            line.indentation = depth;
        }
        Ok(())
    }

    fn insert(&mut self, content: &str, at: usize) -> Result<(), BufferError> {
        self.replace(TextRange::caret(at), content)
    }

    fn delete(&mut self, range: TextRange) -> Result<(), BufferError> {
        self.replace(range, "")
    }
}
