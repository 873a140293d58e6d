//! Rendering conversation turns back into document text.

use marsh_types::{Message, MessageKind};

use crate::lines::indent_text;

/// Renders messages as document text that parses back to the same turns.
///
/// User and system turns get their opening tag and one level of
/// indentation; assistant turns are written as-is. Pieces are separated by
/// a newline unless the previous one already ends with one.
///
/// Two inputs do not survive a reparse unchanged. A turn ending in a newline
/// leaves an empty last line at depth zero, which parses as one more empty
/// assistant turn. Assistant text is not indented, so a line in it that
/// reads `<user>` or `<system>` starts a new turn.
pub fn render_messages(messages: &[Message]) -> String {
    let mut out = String::new();
    for message in messages {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        match message.kind.opening_tag() {
            Some(tag) => {
                out.push_str(tag);
                out.push('\n');
                out.push_str(&indent_text(&message.content, 1));
            }
            None => out.push_str(&message.content),
        }
    }
    out
}

/// Renders messages for reading, with a `### Role` header above each turn.
pub fn render_readable(messages: &[Message]) -> String {
    let mut out = String::new();
    for (idx, message) in messages.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str("### ");
        out.push_str(message.kind.label());
        out.push('\n');
        out.push_str(&message.content);
        if !message.content.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// Counts turns per kind, in system/user/assistant order.
pub fn kind_counts(messages: &[Message]) -> [(MessageKind, usize); 3] {
    let count = |kind| messages.iter().filter(|m| m.kind == kind).count();
    [
        (MessageKind::System, count(MessageKind::System)),
        (MessageKind::User, count(MessageKind::User)),
        (MessageKind::Assistant, count(MessageKind::Assistant)),
    ]
}
