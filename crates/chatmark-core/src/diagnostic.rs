//! Parser diagnostics.
//!
//! Parsing is total and never fails. When a detector has to degrade
//! malformed markup (an unterminated fence, a one-line table, a header
//! without its space), the parser can record a [`Diagnostic`] next to the
//! document. Diagnostics never change the block output.

use std::fmt;

use crate::span::Span;

/// What kind of degradation happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DiagnosticKind {
    /// A code fence ran to end of input without a closing fence.
    UnclosedCodeFence,
    /// A table-looking line had no second row and became a paragraph.
    TableTooShort,
    /// A `#` line failed the header rules and became a paragraph.
    MalformedHeader,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::UnclosedCodeFence => "unclosed_code_fence",
            DiagnosticKind::TableTooShort => "table_too_short",
            DiagnosticKind::MalformedHeader => "malformed_header",
        }
    }
}

/// A recorded degradation with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Diagnostic {
    /// Human-readable message.
    pub message: String,
    /// Source bytes of the offending line(s).
    pub span: Span,
    /// Zero-based line where the construct starts.
    pub line: usize,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, span: Span, line: usize) -> Self {
        Self {
            message: message.into(),
            span,
            line,
            kind,
        }
    }

    /// Diagnostic with the stock message for `kind`.
    pub fn of_kind(kind: DiagnosticKind, span: Span, line: usize) -> Self {
        match kind {
            DiagnosticKind::UnclosedCodeFence => Self::unclosed_code_fence(span, line),
            DiagnosticKind::TableTooShort => Self::table_too_short(span, line),
            DiagnosticKind::MalformedHeader => Self::malformed_header("invalid `#` prefix", span, line),
        }
    }

    pub fn unclosed_code_fence(span: Span, line: usize) -> Self {
        Self::new(
            DiagnosticKind::UnclosedCodeFence,
            "code fence is never closed; remaining lines taken as code",
            span,
            line,
        )
    }

    pub fn table_too_short(span: Span, line: usize) -> Self {
        Self::new(
            DiagnosticKind::TableTooShort,
            "table needs at least two rows; line kept as paragraph",
            span,
            line,
        )
    }

    pub fn malformed_header(reason: &str, span: Span, line: usize) -> Self {
        Self::new(
            DiagnosticKind::MalformedHeader,
            format!("not a header ({reason}); line kept as paragraph"),
            span,
            line,
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line + 1, self.message)
    }
}

/// Diagnostics collected during one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Count of diagnostics of one kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'d> IntoIterator for &'d Diagnostics {
    type Item = &'d Diagnostic;
    type IntoIter = std::slice::Iter<'d, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_one_based_lines() {
        let d = Diagnostic::table_too_short(Span::new(0, 9), 0);
        assert_eq!(
            d.to_string(),
            "line 1: table needs at least two rows; line kept as paragraph"
        );
    }

    #[test]
    fn count_by_kind() {
        let mut all = Diagnostics::new();
        all.push(Diagnostic::malformed_header("no space after `#`", Span::new(0, 4), 0));
        all.push(Diagnostic::unclosed_code_fence(Span::new(5, 9), 1));
        all.push(Diagnostic::malformed_header("more than six `#`", Span::new(10, 20), 3));
        assert_eq!(all.len(), 3);
        assert_eq!(all.count(DiagnosticKind::MalformedHeader), 2);
        assert_eq!(all.count(DiagnosticKind::TableTooShort), 0);
    }
}
