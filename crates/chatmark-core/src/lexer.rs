//! Line-based lexer with SIMD-accelerated scanning.
//!
//! The lexer splits a message into lines for the block segmenter.
//! It uses `memchr` for fast newline detection (SIMD on supported platforms).
//!
//! - Zero-copy: lines borrow directly from input
//! - CRLF endings are normalized by dropping the `\r`
//! - Each line carries its zero-based index and byte span

use crate::span::Span;
use memchr::memchr;

/// A single line from the input with its source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// The line text (without trailing newline).
    pub text: &'a str,
    /// Byte span in the input.
    pub span: Span,
    /// Zero-based line index.
    pub number: usize,
}

impl<'a> Line<'a> {
    /// Check if this line contains only whitespace.
    #[inline(always)]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Get the line text with leading/trailing whitespace removed.
    #[inline(always)]
    pub fn trimmed(&self) -> &'a str {
        self.text.trim()
    }

    /// Check if the line contains the given byte anywhere.
    #[inline(always)]
    pub fn contains_byte(&self, byte: u8) -> bool {
        memchr(byte, self.text.as_bytes()).is_some()
    }
}

/// Line lexer over a message body.
///
/// Yields lines in order; an empty input yields no lines and a trailing
/// newline does not produce a final empty line.
pub struct Lexer<'a> {
    /// The complete input text.
    input: &'a str,
    /// Input as bytes for efficient scanning.
    bytes: &'a [u8],
    /// Current byte offset.
    offset: usize,
    /// Index of the next line.
    number: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            offset: 0,
            number: 0,
        }
    }

    /// Lex the whole input into a line table.
    pub fn lines(input: &'a str) -> Vec<Line<'a>> {
        let mut lines = Vec::with_capacity(memchr::memchr_iter(b'\n', input.as_bytes()).count() + 1);
        lines.extend(Lexer::new(input));
        lines
    }

    /// Read the next line from input.
    #[inline(always)]
    fn read_line(&mut self) -> Option<Line<'a>> {
        if self.offset >= self.bytes.len() {
            return None;
        }

        let start = self.offset;

        let end = match memchr(b'\n', &self.bytes[start..]) {
            Some(pos) => start + pos,
            None => self.bytes.len(),
        };

        let text_end = if end > start && self.bytes[end - 1] == b'\r' {
            end - 1
        } else {
            end
        };

        self.offset = if end < self.bytes.len() { end + 1 } else { end };

        let number = self.number;
        self.number += 1;

        // `start` and `text_end` sit next to ASCII `\n`/`\r` or at the input
        // bounds, so both are char boundaries.
        Some(Line {
            text: &self.input[start..text_end],
            span: Span::from_offsets(start, text_end),
            number,
        })
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Line<'a>;

    #[inline]
    fn next(&mut self) -> Option<Line<'a>> {
        self.read_line()
    }
}
