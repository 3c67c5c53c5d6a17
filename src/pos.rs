use std::{
    cmp::Ordering,
    fmt,
    sync::Arc,
};

/// Columns advanced by a tab are rounded up to the next multiple of this width.
pub const TAB_WIDTH: u32 = 8;

/// A line/column position inside a named source.
///
/// Lines and columns both start at 1. Positions are immutable: every update returns a new
/// value, so a `SourcePos` held by an earlier `State` is never disturbed by later parsing.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourcePos {
    name: Arc<str>,
    line: u32,
    column: u32,
}

impl SourcePos {
    pub fn new(name: &str) -> Self {
        Self::at(name, 1, 1)
    }

    pub fn at(name: &str, line: u32, column: u32) -> Self {
        Self {
            name: Arc::from(name),
            line,
            column,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn with_line(&self, line: u32) -> Self {
        Self { line, ..self.clone() }
    }

    pub fn with_column(&self, column: u32) -> Self {
        Self { column, ..self.clone() }
    }

    /// Move one column to the right, whatever the item was.
    pub fn next_column(&self) -> Self {
        self.with_column(self.column + 1)
    }

    pub fn advance(&self, c: char) -> Self {
        match c {
            '\n' => Self {
                name: self.name.clone(),
                line: self.line + 1,
                column: 1,
            },
            '\t' => self.with_column(self.column + TAB_WIDTH - ((self.column - 1) % TAB_WIDTH)),
            _ => self.next_column(),
        }
    }

    /// Equivalent to folding [`SourcePos::advance`] over `text`.
    ///
    /// Only the segment after the last newline needs to be walked, and only when it holds a tab.
    pub fn advance_str(&self, text: &str) -> Self {
        match text.rfind('\n') {
            Some(idx) => {
                let newlines = text.bytes().filter(|b| *b == b'\n').count() as u32;
                let tail = &text[idx + 1..];
                Self {
                    name: self.name.clone(),
                    line: self.line + newlines,
                    column: 1,
                }
                .advance_segment(tail.chars(), !tail.contains('\t'))
            },
            None => self.clone().advance_segment(text.chars(), !text.contains('\t')),
        }
    }

    /// Slice counterpart of [`SourcePos::advance_str`].
    pub fn advance_chars(&self, chars: &[char]) -> Self {
        match chars.iter().rposition(|c| *c == '\n') {
            Some(idx) => {
                let newlines = chars.iter().filter(|c| **c == '\n').count() as u32;
                let tail = &chars[idx + 1..];
                Self {
                    name: self.name.clone(),
                    line: self.line + newlines,
                    column: 1,
                }
                .advance_segment(tail.iter().copied(), !tail.contains(&'\t'))
            },
            None => self.clone().advance_segment(chars.iter().copied(), !chars.contains(&'\t')),
        }
    }

    // `segment` never contains a newline
    fn advance_segment(self, segment: impl Iterator<Item = char>, tab_free: bool) -> Self {
        if tab_free {
            let width = segment.count() as u32;
            Self {
                column: self.column + width,
                ..self
            }
        } else {
            segment.fold(self, |pos, c| pos.advance(c))
        }
    }
}

impl Default for SourcePos {
    fn default() -> Self {
        Self::new("")
    }
}

impl PartialOrd for SourcePos {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SourcePos {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then(self.column.cmp(&other.column))
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.name.is_empty() {
            write!(f, "{:?} ", &*self.name)?;
        }
        write!(f, "(line {}, column {})", self.line, self.column)
    }
}
