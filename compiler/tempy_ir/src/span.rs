//! Source location spans.
//!
//! Spans are line/column ranges rather than byte offsets: the parser that
//! produces syntax nodes lives outside this workspace and reports positions
//! the way diagnostics display them.

use std::fmt;

/// Source location span.
///
/// Layout: 16 bytes total, four `u32` fields. Lines and columns are taken
/// verbatim from the parser; `end_col` is exclusive.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Span {
    /// Dummy span for generated code.
    pub const DUMMY: Span = Span {
        start_line: 0,
        start_col: 0,
        end_line: 0,
        end_col: 0,
    };

    /// Create a new span.
    #[inline]
    pub const fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Span {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Create a span covering a single line.
    #[inline]
    pub const fn line(line: u32, start_col: u32, end_col: u32) -> Self {
        Span::new(line, start_col, line, end_col)
    }

    #[inline]
    pub const fn is_dummy(&self) -> bool {
        self.start_line == 0 && self.start_col == 0 && self.end_line == 0 && self.end_col == 0
    }

    #[inline]
    pub const fn is_multiline(&self) -> bool {
        self.start_line != self.end_line
    }

    #[inline]
    fn start(self) -> (u32, u32) {
        (self.start_line, self.start_col)
    }

    #[inline]
    fn end(self) -> (u32, u32) {
        (self.end_line, self.end_col)
    }

    /// Check if a line/column position falls inside this span.
    #[inline]
    pub fn contains(&self, line: u32, col: u32) -> bool {
        self.start() <= (line, col) && (line, col) < self.end()
    }

    /// Merge two spans to create one covering both.
    ///
    /// A dummy span is absorbed rather than stretching the result to line 0.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        if self.is_dummy() {
            return other;
        }
        if other.is_dummy() {
            return self;
        }
        let (start_line, start_col) = self.start().min(other.start());
        let (end_line, end_col) = self.end().max(other.end());
        Span::new(start_line, start_col, end_line, end_col)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line, self.start_col, self.end_line, self.end_col
        )
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}-{}, col {}-{}",
            self.start_line, self.end_line, self.start_col, self.end_col
        )
    }
}

mod size_asserts {
    use super::Span;
    crate::static_assert_size!(Span, 16);
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
