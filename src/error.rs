use std::collections::BTreeSet;
use crate::pos::SourcePos;

/// Message kinds, in display order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageKind {
    /// Raised by primitives when the raw input does not match.
    SysUnexpected,
    /// Raised by negative assertions such as `not_followed_by`.
    Unexpected,
    /// Raised by `label` to name what was expected.
    Expect,
    /// Raised by `fail` and by internal guards.
    Generic,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Message {
    kind: MessageKind,
    text: String,
}

impl Message {
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn sys_unexpected(text: impl Into<String>) -> Self {
        Self::new(MessageKind::SysUnexpected, text)
    }

    pub fn unexpected(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Unexpected, text)
    }

    pub fn expect(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Expect, text)
    }

    pub fn generic(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Generic, text)
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A parse failure: where it happened and everything known about why.
///
/// An error without messages is "unknown". Unknown errors are placeholders that ride along
/// with successful replies and vanish as soon as they are merged with anything informative.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{pos}: {}", render_messages(.messages))]
pub struct ParseError {
    pos: SourcePos,
    messages: BTreeSet<Message>,
}

impl ParseError {
    pub fn unknown(pos: SourcePos) -> Self {
        Self {
            pos,
            messages: BTreeSet::new(),
        }
    }

    pub fn new(pos: SourcePos, msg: Message) -> Self {
        Self::unknown(pos).with_message(msg)
    }

    pub fn pos(&self) -> &SourcePos {
        &self.pos
    }

    pub fn messages(&self) -> impl Iterator<Item=&Message> + '_ {
        self.messages.iter()
    }

    pub fn is_unknown(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn with_message(mut self, msg: Message) -> Self {
        self.messages.insert(msg);
        self
    }

    /// Replace every `Expect` message with a single `Expect(text)`.
    pub fn set_expect(mut self, text: impl Into<String>) -> Self {
        self.messages.retain(|msg| msg.kind != MessageKind::Expect);
        self.with_message(Message::expect(text))
    }

    /// Combine the errors of two alternatives. An unknown error yields to a known one, the
    /// later position wins outright, and errors at the same position pool their messages.
    pub fn merge(self, other: Self) -> Self {
        if other.is_unknown() && !self.is_unknown() {
            return self;
        }
        if self.is_unknown() && !other.is_unknown() {
            return other;
        }
        if self.pos > other.pos {
            self
        } else if self.pos < other.pos {
            other
        } else {
            let mut merged = self;
            merged.messages.extend(other.messages);
            merged
        }
    }
}

fn texts(messages: &BTreeSet<Message>, kind: MessageKind) -> Vec<&str> {
    let mut texts = Vec::new();
    for msg in messages.iter().filter(|msg| msg.kind == kind) {
        if !msg.text.is_empty() && !texts.contains(&msg.text.as_str()) {
            texts.push(msg.text.as_str());
        }
    }
    texts
}

fn commas_or(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [item] => item.to_string(),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    }
}

fn render_messages(messages: &BTreeSet<Message>) -> String {
    if messages.is_empty() {
        return "unknown parse error".to_string();
    }

    let mut clauses = Vec::new();

    let unexpected = texts(messages, MessageKind::Unexpected);
    if !unexpected.is_empty() {
        clauses.push(format!("unexpected {}", commas_or(&unexpected)));
    } else if let Some(sys) = messages.iter().find(|msg| msg.kind == MessageKind::SysUnexpected) {
        if sys.text.is_empty() {
            clauses.push("unexpected end of input".to_string());
        } else {
            clauses.push(format!("unexpected {}", sys.text));
        }
    }

    let expect = texts(messages, MessageKind::Expect);
    if !expect.is_empty() {
        clauses.push(format!("expecting {}", commas_or(&expect)));
    }

    let generic = texts(messages, MessageKind::Generic);
    if !generic.is_empty() {
        clauses.push(commas_or(&generic));
    }

    if clauses.is_empty() {
        "unknown parse error".to_string()
    } else {
        clauses.join("; ")
    }
}
