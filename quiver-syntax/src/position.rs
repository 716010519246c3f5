use std::fmt;

/// A location in GraphQL source text.
///
/// `line` and `column` are 1-based and count characters; `offset` is the
/// byte offset, used for diagnostic spans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A value tagged with where it starts and how many bytes it spans.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub item: T,
    pub pos: Position,
    pub len: usize,
}

impl<T> Spanned<T> {
    pub fn new(item: T, pos: Position, len: usize) -> Self {
        Self { item, pos, len }
    }
}
