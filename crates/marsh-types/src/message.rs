use std::fmt;

use serde::{Deserialize, Serialize};

/// Who a conversation turn belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    System,
    User,
    /// Content outside any `<user>`/`<system>` block.
    #[default]
    Assistant,
}

impl MessageKind {
    /// Role name used by chat APIs.
    pub fn role(self) -> &'static str {
        match self {
            MessageKind::System => "system",
            MessageKind::User => "user",
            MessageKind::Assistant => "assistant",
        }
    }

    /// The line that opens a block of this kind, if it has one.
    pub fn opening_tag(self) -> Option<&'static str> {
        match self {
            MessageKind::System => Some("<system>"),
            MessageKind::User => Some("<user>"),
            MessageKind::Assistant => None,
        }
    }

    /// Header label for transcripts.
    pub fn label(self) -> &'static str {
        match self {
            MessageKind::System => "System",
            MessageKind::User => "User",
            MessageKind::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.role())
    }
}

/// One conversation turn produced by parsing a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub kind: MessageKind,
    pub content: String,
}

impl Message {
    pub fn new(kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageKind::User, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageKind::System, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Assistant, content)
    }
}
