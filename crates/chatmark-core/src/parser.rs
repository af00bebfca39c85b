//! Block segmenter for chat messages.
//!
//! Splits a message into lines, then walks them with an immutable
//! [`Cursor`]: blank lines are skipped as separators, detectors are tried
//! in priority order, and anything no detector claims becomes a paragraph.
//! Parsing never fails.

use crate::ast::{Block, BlockId, Document};
use crate::cursor::Cursor;
use crate::detect::{self, Detection, DETECTORS};
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::lexer::{Lexer, Line};
use crate::span::Span;

/// Parse a message into blocks.
///
/// ```rust
/// use chatmark_core::{parse, BlockKind};
///
/// let blocks = parse("# Title\n\nSome *text*.");
/// assert_eq!(blocks.len(), 2);
/// assert!(matches!(blocks[0].kind, BlockKind::Header { level: 1, .. }));
/// ```
#[inline]
pub fn parse(text: &str) -> Vec<Block<'_>> {
    Parser::new().parse(text).blocks
}

/// Parsed document together with the diagnostics recorded on the way.
#[derive(Debug, Clone)]
pub struct ParseResult<'a> {
    pub document: Document<'a>,
    /// Degradations, in source order. Empty when collection is disabled.
    pub diagnostics: Diagnostics,
}

impl<'a> ParseResult<'a> {
    /// True if no markup had to be degraded.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Message parser.
///
/// Parse rules are fixed; the only option is whether degradations are
/// recorded as diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct Parser {
    collect_diagnostics: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    #[inline]
    pub fn new() -> Self {
        Self {
            collect_diagnostics: true,
        }
    }

    /// Enable or disable diagnostic collection (enabled by default).
    pub fn with_diagnostics(mut self, collect: bool) -> Self {
        self.collect_diagnostics = collect;
        self
    }

    /// Parse a message into a document.
    #[inline]
    pub fn parse<'a>(&self, input: &'a str) -> Document<'a> {
        Segmenter::new(input, None).run()
    }

    /// Parse a message, returning the document and any diagnostics.
    pub fn parse_with_diagnostics<'a>(&self, input: &'a str) -> ParseResult<'a> {
        let mut diagnostics = Diagnostics::new();
        let sink = self.collect_diagnostics.then_some(&mut diagnostics);
        let document = Segmenter::new(input, sink).run();
        ParseResult {
            document,
            diagnostics,
        }
    }
}

struct Segmenter<'a, 'd> {
    input: &'a str,
    lines: Vec<Line<'a>>,
    diagnostics: Option<&'d mut Diagnostics>,
}

impl<'a, 'd> Segmenter<'a, 'd> {
    fn new(input: &'a str, diagnostics: Option<&'d mut Diagnostics>) -> Self {
        Self {
            input,
            lines: Lexer::lines(input),
            diagnostics,
        }
    }

    fn run(mut self) -> Document<'a> {
        let lines = std::mem::take(&mut self.lines);
        let mut cursor = Cursor::new(self.input, &lines);
        let mut blocks = Vec::new();

        while let Some(line) = cursor.current() {
            if line.is_blank() {
                cursor = cursor.advance(1);
                continue;
            }

            let detection = match DETECTORS.iter().find_map(|detector| detector(cursor)) {
                Some(found) => found,
                None => {
                    self.record_fallback(cursor);
                    match detect::paragraph(cursor) {
                        Some(found) => found,
                        None => break,
                    }
                }
            };

            let consumed = detection.consumed;
            if let Some(kind) = detection.degraded {
                let diagnostic = Diagnostic::of_kind(kind, cursor.span(consumed), cursor.pos());
                self.push(diagnostic);
            }

            blocks.push(self.block(cursor, detection));
            cursor = cursor.advance(consumed);
        }

        Document {
            blocks,
            span: Span::from_offsets(0, self.input.len()),
            line_count: lines.len(),
        }
    }

    fn block(&self, cursor: Cursor<'_, 'a>, detection: Detection<'a>) -> Block<'a> {
        let span = cursor.span(detection.consumed);
        let lines = cursor.line_range(detection.consumed);
        let name = detection.kind.name();

        log::trace!(
            "{name} at lines {}..{} ({} bytes)",
            lines.start,
            lines.end,
            span.len()
        );

        Block {
            id: BlockId::derive(name, span, span.slice(self.input)),
            kind: detection.kind,
            span,
            lines,
        }
    }

    /// Note why the line under `cursor` fell through to a paragraph.
    fn record_fallback(&mut self, cursor: Cursor<'_, 'a>) {
        let Some(line) = cursor.current() else {
            return;
        };
        let trimmed = line.trimmed();

        if detect::starts_table(trimmed) {
            self.push(Diagnostic::table_too_short(line.span, line.number));
        } else if let Err(reject) = detect::header_parts(trimmed) {
            if let Some(reason) = reject.reason() {
                self.push(Diagnostic::malformed_header(
                    reason,
                    line.span,
                    line.number,
                ));
            }
        }
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        log::debug!("{diagnostic}");
        if let Some(diagnostics) = self.diagnostics.as_deref_mut() {
            diagnostics.push(diagnostic);
        }
    }
}
