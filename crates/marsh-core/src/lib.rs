//! Core marsh library (edit translation, document parsing, config).

pub mod config;
pub mod document;
pub mod edit;
pub mod lines;
pub mod parser;
pub mod request;
pub mod transcript;
pub mod units;

pub use document::{BufferError, Document, IndentUndo, LineBuffer};
pub use edit::derive_edit;
pub use parser::{IndentationParser, parse, parse_lines, parse_text};
