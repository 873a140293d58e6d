//! Shared data model for marsh documents: lines, edits, and chat messages.

mod edit;
mod line;
mod message;

pub use edit::{DerivedEdit, IndentOp, TextRange};
pub use line::Line;
pub use message::{Message, MessageKind};
