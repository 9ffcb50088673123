//! Source positions attached to tokens, AST nodes and errors.

use std::fmt;

/// A 1-based line/column location in the source text.
///
/// Columns count characters, not bytes, so that a caret rendered under
/// the source line lines up for non-ASCII input too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }

    /// Position of the first character of a file.
    pub const fn start() -> Self {
        Position { line: 1, column: 1 }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
