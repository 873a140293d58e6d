use serde::{Deserialize, Serialize};

/// A half-open range of code units, `[location, location + length)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextRange {
    pub location: usize,
    pub length: usize,
}

impl TextRange {
    pub fn new(location: usize, length: usize) -> Self {
        Self { location, length }
    }

    /// An empty range (caret position) at `location`.
    pub fn caret(location: usize) -> Self {
        Self::new(location, 0)
    }

    pub fn end(&self) -> usize {
        self.location + self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns this range grown at its end by `extra` units.
    #[must_use]
    pub fn extended(self, extra: usize) -> Self {
        Self::new(self.location, self.length + extra)
    }
}

/// Indentation change at a document offset.
///
/// `depth` is the number of levels to add to the line starting at
/// `location`. Lines created by an edit start at depth zero, so for them the
/// delta is also the final depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndentOp {
    pub location: usize,
    pub depth: usize,
}

impl IndentOp {
    pub fn new(location: usize, depth: usize) -> Self {
        Self { location, depth }
    }
}

/// A raw edit rewritten so that line-leading tabs become indentation.
///
/// Replace `range` with `content`, then apply every op in `indents`, in
/// order, as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedEdit {
    pub range: TextRange,
    pub content: String,
    pub indents: Vec<IndentOp>,
}
