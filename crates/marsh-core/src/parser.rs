//! Parsing of indented documents into conversation turns.
//!
//! A document is a stream of `(content, indentation)` lines:
//!
//! - `<user>` or `<system>` alone on a line at indentation 0 opens a message
//!   of that kind. Its content is the following lines indented by at least
//!   one level, de-indented by one. The tag itself is dropped.
//! - Everything else at the top level belongs to an assistant message.
//! - Any other `<name>` alone on a line opens a tag block whose content is
//!   the following deeper-indented lines. The block renders as `<name>`, its
//!   de-indented content and a synthetic `</name>`. A tag with nothing deeper
//!   after it is just the literal `<name>` line.
//!
//! Blocks close when a line is indented less than their content, or, for
//! message blocks, when the next top-level `<user>`/`<system>` line arrives.
//! The closing line is then offered to the enclosing block. Nothing here can
//! fail: markup that does not fit the grammar stays literal text.

use marsh_types::{Line, Message, MessageKind};

use crate::lines::{indent_text, split_lines};

const USER_TAG_LINE: &str = "<user>\n";
const SYSTEM_TAG_LINE: &str = "<system>\n";

/// Message kind opened by `content` when it is a top-level structural line.
fn structural_kind(content: &str, indentation: usize) -> Option<MessageKind> {
    if indentation != 0 {
        return None;
    }
    match content {
        USER_TAG_LINE => Some(MessageKind::User),
        SYSTEM_TAG_LINE => Some(MessageKind::System),
        _ => None,
    }
}

/// Tag name when `content` is a newline-terminated `<name>` line.
fn tag_name(content: &str) -> Option<&str> {
    let name = content.strip_prefix('<')?.strip_suffix(">\n")?;
    let valid = !name.is_empty()
        && !name.starts_with('/')
        && !name.contains(|c: char| c == '<' || c == '>' || c.is_whitespace());
    valid.then_some(name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BlockKind {
    Message(MessageKind),
    Tag(String),
}

#[derive(Debug)]
struct Block {
    kind: BlockKind,
    opening_indentation: usize,
    content_indentation: usize,
    content: String,
    /// Whether any line (content or nested tag) was taken by this block.
    consumed: bool,
}

impl Block {
    fn message(kind: MessageKind) -> Self {
        let content_indentation = match kind {
            MessageKind::Assistant => 0,
            MessageKind::User | MessageKind::System => 1,
        };
        Self {
            kind: BlockKind::Message(kind),
            opening_indentation: 0,
            content_indentation,
            content: String::new(),
            consumed: false,
        }
    }

    fn tag(name: &str, indentation: usize) -> Self {
        Self {
            kind: BlockKind::Tag(name.to_string()),
            opening_indentation: indentation,
            content_indentation: indentation + 1,
            content: String::new(),
            consumed: false,
        }
    }

    fn accepts(&self, content: &str, indentation: usize) -> bool {
        if indentation < self.content_indentation {
            return false;
        }
        match self.kind {
            BlockKind::Message(_) => structural_kind(content, indentation).is_none(),
            BlockKind::Tag(_) => true,
        }
    }

    fn push_text(&mut self, content: &str, indentation: usize) {
        if content.is_empty() {
            return;
        }
        let depth = indentation - self.content_indentation;
        self.content.extend(std::iter::repeat_n('\t', depth));
        self.content.push_str(content);
    }

    /// Rendered form of a tag block, relative to its own opening indentation.
    fn render_tag(name: &str, content: &str, consumed: bool) -> String {
        let mut out = format!("<{name}>\n");
        out.push_str(content);
        if consumed {
            let terminated = out.ends_with('\n');
            if !terminated {
                out.push('\n');
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
            if terminated {
                out.push('\n');
            }
        }
        out
    }
}

/// Incremental parser state: a stack of open blocks.
///
/// The bottom of the stack is always a message block; every block above it
/// is a tag block nested in the one below. Feed lines in document order,
/// then call [`IndentationParser::finish`].
#[derive(Debug, Default)]
pub struct IndentationParser {
    stack: Vec<Block>,
    messages: Vec<Message>,
}

impl IndentationParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the next line. `content` keeps its trailing newline, if any,
    /// and has no leading tabs.
    pub fn feed(&mut self, content: &str, indentation: usize) {
        while let Some(top) = self.stack.last() {
            if top.accepts(content, indentation) {
                break;
            }
            self.close_top();
        }

        if self.stack.is_empty() {
            if let Some(kind) = structural_kind(content, indentation) {
                tracing::trace!(%kind, "message block opened");
                self.stack.push(Block::message(kind));
                return;
            }
            self.stack.push(Block::message(MessageKind::Assistant));
        }

        self.consume(content, indentation);
    }

    /// Closes every open block and returns the messages in document order.
    pub fn finish(mut self) -> Vec<Message> {
        while !self.stack.is_empty() {
            self.close_top();
        }
        self.messages
    }

    fn consume(&mut self, content: &str, indentation: usize) {
        let Some(top) = self.stack.last_mut() else {
            return;
        };
        top.consumed = true;

        match tag_name(content) {
            Some(name) => {
                tracing::trace!(name, indentation, "tag block opened");
                self.stack.push(Block::tag(name, indentation));
            }
            None => top.push_text(content, indentation),
        }
    }

    fn close_top(&mut self) {
        let Some(block) = self.stack.pop() else {
            return;
        };

        match block.kind {
            BlockKind::Message(kind) => {
                tracing::trace!(%kind, len = block.content.len(), "message block closed");
                self.messages.push(Message::new(kind, block.content));
            }
            BlockKind::Tag(name) => {
                let rendered = Block::render_tag(&name, &block.content, block.consumed);
                tracing::trace!(name = %name, consumed = block.consumed, "tag block closed");
                if let Some(parent) = self.stack.last_mut() {
                    let depth = block.opening_indentation - parent.content_indentation;
                    parent.content.push_str(&indent_text(&rendered, depth));
                }
            }
        }
    }
}

/// Parses `(content, indentation)` lines into conversation turns.
pub fn parse<I, S>(lines: I) -> Vec<Message>
where
    I: IntoIterator<Item = (S, usize)>,
    S: AsRef<str>,
{
    let mut parser = IndentationParser::new();
    for (content, indentation) in lines {
        parser.feed(content.as_ref(), indentation);
    }
    parser.finish()
}

/// Parses already split lines.
pub fn parse_lines(lines: &[Line]) -> Vec<Message> {
    parse(
        lines
            .iter()
            .map(|line| (line.content.as_str(), line.indentation)),
    )
}

/// Parses file text (tabs as indentation) into conversation turns.
pub fn parse_text(text: &str) -> Vec<Message> {
    parse_lines(&split_lines(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only(text: &str) -> Message {
        let messages = parse_text(text);
        assert_eq!(messages.len(), 1, "{messages:?}");
        messages.into_iter().next().unwrap()
    }

    fn assistant(text: &str) -> String {
        let message = only(text);
        assert_eq!(message.kind, MessageKind::Assistant);
        message.content
    }

    #[test]
    fn test_tag_name_detection() {
        assert_eq!(tag_name("<abcd>\n"), Some("abcd"));
        assert_eq!(tag_name("<abcd>"), None);
        assert_eq!(tag_name("abcd\n"), None);
        assert_eq!(tag_name("<>\n"), None);
        assert_eq!(tag_name("</b>\n"), None);
        assert_eq!(tag_name("<a b>\n"), None);
        assert_eq!(tag_name("Hello <br> world\n"), None);
    }

    #[test]
    fn test_structural_lines_need_top_level_and_newline() {
        assert_eq!(structural_kind("<user>\n", 0), Some(MessageKind::User));
        assert_eq!(structural_kind("<system>\n", 0), Some(MessageKind::System));
        assert_eq!(structural_kind("<user>\n", 1), None);
        assert_eq!(structural_kind("<user>", 0), None);
        assert_eq!(structural_kind("<User>\n", 0), None);
    }

    #[test]
    fn test_render_tag_close() {
        assert_eq!(Block::render_tag("abc", "", false), "<abc>\n");
        assert_eq!(Block::render_tag("abc", "def\n", true), "<abc>\ndef\n</abc>\n");
        assert_eq!(Block::render_tag("abc", "def", true), "<abc>\ndef\n</abc>");
        assert_eq!(Block::render_tag("abc", "", true), "<abc>\n</abc>\n");
    }

    // Plain content

    #[test]
    fn test_empty_input_has_no_messages() {
        assert!(parse_text("").is_empty());
        assert!(parse(Vec::<(&str, usize)>::new()).is_empty());
    }

    #[test]
    fn test_plain_text_is_assistant() {
        assert_eq!(assistant("abcd"), "abcd");
        assert_eq!(assistant("abcd\nefg"), "abcd\nefg");
    }

    #[test]
    fn test_top_level_indentation_is_kept() {
        assert_eq!(assistant("\tabcd"), "\tabcd");
        assert_eq!(assistant("\tabcd\nefg\n\thijk"), "\tabcd\nefg\n\thijk");
    }

    #[test]
    fn test_whitespace_only_document() {
        assert_eq!(assistant("\n\t \n"), "\n\t \n");
    }

    // Tags

    #[test]
    fn test_tag_without_deeper_content_is_literal() {
        assert_eq!(assistant("<b>\nbold"), "<b>\nbold");
        assert_eq!(assistant("abc\n<br>\ndef"), "abc\n<br>\ndef");
        assert_eq!(assistant("Hello <br> world"), "Hello <br> world");
    }

    #[test]
    fn test_tag_with_content_gets_closed() {
        assert_eq!(assistant("<b>\n\tbold"), "<b>\nbold\n</b>");
        assert_eq!(assistant("<b>\n\tbold\nplain"), "<b>\nbold\n</b>\nplain");
        assert_eq!(assistant("<a>\n\tcontent"), "<a>\ncontent\n</a>");
    }

    #[test]
    fn test_nested_tags() {
        assert_eq!(
            assistant("<b>\n\t<i>\n\t\tbolditalic\n\tbold\nplain"),
            "<b>\n<i>\nbolditalic\n</i>\nbold\n</b>\nplain"
        );
    }

    #[test]
    fn test_sibling_tags_at_same_level() {
        assert_eq!(
            assistant("<b>\n<i>\n\titalic\nplain"),
            "<b>\n<i>\nitalic\n</i>\nplain"
        );
        assert_eq!(
            assistant("<b>\n<i>\n\titalic text"),
            "<b>\n<i>\nitalic text\n</i>"
        );
    }

    #[test]
    fn test_deeper_lines_keep_relative_indentation() {
        assert_eq!(
            assistant("<b>\n\tabc\n\t<i>\n\t\tdefg\n\t\t\thijk"),
            "<b>\nabc\n<i>\ndefg\n\thijk\n</i>\n</b>"
        );
    }

    #[test]
    fn test_dedent_closes_several_tags() {
        assert_eq!(
            assistant("<b>\n\t<i>\n\t\t<abc>\n\t\t\tcontent\ncontent"),
            "<b>\n<i>\n<abc>\ncontent\n</abc>\n</i>\n</b>\ncontent"
        );
    }

    #[test]
    fn test_tag_followed_by_shallower_line_is_literal() {
        assert_eq!(
            assistant("<zero>\n\t\t<two>\n\tone"),
            "<zero>\n\t<two>\none\n</zero>"
        );
    }

    #[test]
    fn test_tag_with_only_empty_trailing_line_still_closes() {
        assert_eq!(assistant("<b>\n\t"), "<b>\n</b>\n");
    }

    // Messages

    #[test]
    fn test_user_message() {
        let message = only("<user>\n\tabc\n\tdefg");
        assert_eq!(message, Message::user("abc\ndefg"));
    }

    #[test]
    fn test_system_message() {
        let message = only("<system>\n\tSystem instructions.");
        assert_eq!(message, Message::system("System instructions."));
    }

    #[test]
    fn test_two_user_messages() {
        assert_eq!(
            parse_text("<user>\n\tabc\n<user>\n\tdefg"),
            vec![Message::user("abc\n"), Message::user("defg")]
        );
    }

    #[test]
    fn test_conversation_turns() {
        assert_eq!(
            parse_text("<user>\n\tabc\ndef\n<user>\n\tghi"),
            vec![
                Message::user("abc\n"),
                Message::assistant("def\n"),
                Message::user("ghi"),
            ]
        );
    }

    #[test]
    fn test_full_conversation_flow() {
        let text = "<user>\n\tFirst user message.\nAssistant response.\n<system>\n\tSystem instructions.\n<user>\n\tSecond user message.";
        assert_eq!(
            parse_text(text),
            vec![
                Message::user("First user message.\n"),
                Message::assistant("Assistant response.\n"),
                Message::system("System instructions.\n"),
                Message::user("Second user message."),
            ]
        );
    }

    #[test]
    fn test_starts_with_assistant_content() {
        assert_eq!(
            parse_text("This is an assistant message.\n<user>\n\tThis is a user message."),
            vec![
                Message::assistant("This is an assistant message.\n"),
                Message::user("This is a user message."),
            ]
        );
    }

    #[test]
    fn test_nested_indentation_in_user_message() {
        assert_eq!(
            parse_text("<user>\n\tabc\n\t\tdefg\n\thijk\nlmn"),
            vec![
                Message::user("abc\n\tdefg\nhijk\n"),
                Message::assistant("lmn"),
            ]
        );
    }

    #[test]
    fn test_extra_indentation_in_user_message() {
        assert_eq!(
            parse_text("<user>\n\t\t\tabcd\n\tefg\nhijk"),
            vec![
                Message::user("\t\tabcd\nefg\n"),
                Message::assistant("hijk"),
            ]
        );
    }

    #[test]
    fn test_indented_user_tag_is_an_ordinary_tag() {
        assert_eq!(
            only("<user>\n\t<user>\n\t\tindented"),
            Message::user("<user>\nindented\n</user>")
        );
        assert_eq!(only("<user>\n\t<user>"), Message::user("<user>"));
        assert_eq!(assistant("\t<user>"), "\t<user>");
    }

    #[test]
    fn test_system_tag_inside_tag_is_literal() {
        assert_eq!(
            assistant("<note>\n\t<system>\n\tkeep\nafter"),
            "<note>\n<system>\nkeep\n</note>\nafter"
        );
    }

    #[test]
    fn test_empty_user_message() {
        assert_eq!(
            parse_text("<user>\n<user>\n\tfinal message"),
            vec![Message::user(""), Message::user("final message")]
        );
    }

    #[test]
    fn test_ends_with_empty_message_block() {
        assert_eq!(
            parse_text("<user>\n\thello\n<system>\n"),
            vec![
                Message::user("hello\n"),
                Message::system(""),
                Message::assistant(""),
            ]
        );
    }

    #[test]
    fn test_unterminated_structural_line_is_literal() {
        assert_eq!(
            parse_text("<user>\n\thello\n<user>"),
            vec![Message::user("hello\n"), Message::assistant("<user>")]
        );
    }

    #[test]
    fn test_parse_accepts_owned_lines() {
        let lines = vec![
            ("<user>\n".to_string(), 0),
            ("hi".to_string(), 1),
        ];
        assert_eq!(parse(lines), vec![Message::user("hi")]);
    }
}
