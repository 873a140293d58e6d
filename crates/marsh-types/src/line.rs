use serde::{Deserialize, Serialize};

/// One line of an indented document.
///
/// `content` never starts with a tab: leading tabs are always lifted into
/// `indentation`. Every line except the last keeps its trailing `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Line {
    pub content: String,
    pub indentation: usize,
}

impl Line {
    pub fn new(content: impl Into<String>, indentation: usize) -> Self {
        Self {
            content: content.into(),
            indentation,
        }
    }

    /// Builds a line from raw file text, lifting its leading tabs.
    pub fn from_raw(raw: &str) -> Self {
        let content = raw.trim_start_matches('\t');
        Self {
            content: content.to_string(),
            indentation: raw.len() - content.len(),
        }
    }

    /// Returns the file form of this line: one tab per indentation level.
    pub fn to_raw(&self) -> String {
        let mut raw = String::with_capacity(self.indentation + self.content.len());
        raw.extend(std::iter::repeat_n('\t', self.indentation));
        raw.push_str(&self.content);
        raw
    }
}
