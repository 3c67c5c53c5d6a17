use std::fmt;
use crate::pos::SourcePos;

/// A single element of the input stream.
///
/// Items decide how they move the source position and how they are shown in error messages.
/// The defaults advance one column per item and show the item's `Debug` form, which suits
/// token streams produced by an earlier lexer.
pub trait Item: Clone + fmt::Debug {
    fn next_pos(&self, pos: &SourcePos) -> SourcePos {
        pos.next_column()
    }

    fn next_pos_many(items: &[Self], pos: &SourcePos) -> SourcePos {
        items.iter().fold(pos.clone(), |pos, item| item.next_pos(&pos))
    }

    fn show(&self) -> String {
        format!("{:?}", self)
    }

    fn show_many(items: &[Self]) -> String {
        format!("{:?}", items)
    }
}

impl Item for char {
    fn next_pos(&self, pos: &SourcePos) -> SourcePos {
        pos.advance(*self)
    }

    fn next_pos_many(items: &[Self], pos: &SourcePos) -> SourcePos {
        pos.advance_chars(items)
    }

    fn show_many(items: &[Self]) -> String {
        format!("{:?}", items.iter().collect::<String>())
    }
}

impl Item for u8 {
    fn next_pos(&self, pos: &SourcePos) -> SourcePos {
        pos.advance(*self as char)
    }

    fn show(&self) -> String {
        format!("{:?}", *self as char)
    }

    fn show_many(items: &[Self]) -> String {
        format!("{:?}", String::from_utf8_lossy(items))
    }
}

/// A snapshot of the parse: the remaining input, the current position and the user state.
///
/// Parsers only ever read a `State`; moving forward builds a new one. Backtracking is
/// therefore nothing more than resuming from an older snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct State<'a, I, U> {
    input: &'a [I],
    pos: SourcePos,
    user: U,
}

impl<'a, I, U> State<'a, I, U> {
    pub fn new(input: &'a [I], pos: SourcePos, user: U) -> Self {
        Self { input, pos, user }
    }

    pub fn input(&self) -> &'a [I] {
        self.input
    }

    pub fn pos(&self) -> &SourcePos {
        &self.pos
    }

    pub fn user(&self) -> &U {
        &self.user
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    pub fn peek(&self) -> Option<&'a I> {
        self.input.first()
    }

    /// Drop `n` items from the front, landing at `pos`.
    pub fn advance(&self, n: usize, pos: SourcePos) -> Self
        where U: Clone
    {
        Self {
            input: &self.input[n.min(self.input.len())..],
            pos,
            user: self.user.clone(),
        }
    }

    pub fn with_user(&self, user: U) -> Self {
        Self {
            input: self.input,
            pos: self.pos.clone(),
            user,
        }
    }
}
