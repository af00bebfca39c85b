//! Immutable line cursor threaded through the block detectors.
//!
//! A `Cursor` is a `Copy` value: advancing returns a new cursor and never
//! mutates the one a detector was handed.

use crate::lexer::Line;
use crate::span::{LineRange, Span};

/// Position within a message's line table.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'l, 'a> {
    input: &'a str,
    lines: &'l [Line<'a>],
    pos: usize,
}

impl<'l, 'a> Cursor<'l, 'a> {
    /// Create a cursor at the first line.
    #[inline]
    pub fn new(input: &'a str, lines: &'l [Line<'a>]) -> Self {
        Self {
            input,
            lines,
            pos: 0,
        }
    }

    /// The complete input text.
    #[inline(always)]
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Zero-based index of the current line.
    #[inline(always)]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The line under the cursor.
    #[inline(always)]
    pub fn current(&self) -> Option<&'l Line<'a>> {
        self.lines.get(self.pos)
    }

    /// Lines from the cursor to the end of input.
    #[inline(always)]
    pub fn rest(&self) -> &'l [Line<'a>] {
        self.lines.get(self.pos..).unwrap_or_default()
    }

    /// A cursor `n` lines further on, clamped to end of input.
    #[inline]
    #[must_use]
    pub fn advance(self, n: usize) -> Self {
        Self {
            pos: (self.pos + n).min(self.lines.len()),
            ..self
        }
    }

    /// Line indices covered by the next `n` lines.
    #[inline]
    pub fn line_range(&self, n: usize) -> LineRange {
        LineRange::new(self.pos, (self.pos + n).min(self.lines.len()))
    }

    /// Byte span covered by the next `n` lines (at least the current line).
    pub fn span(&self, n: usize) -> Span {
        let rest = self.rest();
        match (rest.first(), rest.get(n.max(1) - 1).or(rest.last())) {
            (Some(first), Some(last)) => first.span.merge(last.span),
            _ => Span::from_offsets(self.input.len(), self.input.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    #[test]
    fn advance_is_clamped_and_leaves_original_untouched() {
        let input = "a\nb\nc";
        let lines = Lexer::lines(input);
        let start = Cursor::new(input, &lines);
        let moved = start.advance(10);
        assert_eq!(start.pos(), 0);
        assert_eq!(moved.pos(), 3);
        assert!(moved.current().is_none());
        assert!(moved.rest().is_empty());
    }

    #[test]
    fn span_covers_consumed_lines() {
        let input = "ab\ncd\nef";
        let lines = Lexer::lines(input);
        let cursor = Cursor::new(input, &lines).advance(1);
        assert_eq!(cursor.span(2), Span::new(3, 8));
        assert_eq!(cursor.span(2).slice(input), "cd\nef");
        assert_eq!(cursor.line_range(2), LineRange::new(1, 3));
    }

    #[test]
    fn past_end_has_no_current_line() {
        let input = "only";
        let lines = Lexer::lines(input);
        let cursor = Cursor::new(input, &lines);
        assert_eq!(cursor.current().map(|l| l.text), Some("only"));
        assert!(cursor.advance(1).current().is_none());
        assert_eq!(cursor.advance(1).span(1), Span::new(4, 4));
    }
}
