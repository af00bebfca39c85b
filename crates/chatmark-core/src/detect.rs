//! Block detectors.
//!
//! Each detector looks at the line under a [`Cursor`] and either declines
//! or returns a [`Detection`]: the block it recognized and how many lines
//! it consumed. Detectors are pure; the segmenter loop in
//! [`crate::parser`] tries them in priority order.
//!
//! Start predicates (`starts_*`, `*_item`, `header_parts`) are shared with
//! the paragraph fallback so a paragraph always stops where another block
//! would begin.

use std::borrow::Cow;

use crate::ast::{BlockKind, CowStr, StyledText};
use crate::cursor::Cursor;
use crate::diagnostic::DiagnosticKind;
use crate::inline::format_inline;
use crate::lexer::Line;
use crate::table::{is_separator_row, split_row};

/// A recognized block and the number of lines it consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection<'a> {
    pub kind: BlockKind<'a>,
    /// Lines consumed, always at least one.
    pub consumed: usize,
    /// Set when malformed markup was accepted in degraded form.
    pub degraded: Option<DiagnosticKind>,
}

impl<'a> Detection<'a> {
    #[inline]
    fn new(kind: BlockKind<'a>, consumed: usize) -> Self {
        Self {
            kind,
            consumed,
            degraded: None,
        }
    }
}

/// Signature shared by every detector.
pub type Detector = for<'l, 'a> fn(Cursor<'l, 'a>) -> Option<Detection<'a>>;

/// Detectors in priority order. The paragraph fallback is not listed.
pub const DETECTORS: [Detector; 7] = [
    code_fence,
    table,
    horizontal_rule,
    header,
    blockquote,
    bullet_list,
    numbered_list,
];

const FENCE: &str = "```";
const BULLET_PREFIXES: [&str; 3] = ["- ", "* ", "• "];

// Start predicates. All take the trimmed line.

#[inline]
pub fn starts_code_fence(trimmed: &str) -> bool {
    trimmed.starts_with(FENCE)
}

/// `|` first, and at least one more `|` after it.
#[inline]
pub fn starts_table(trimmed: &str) -> bool {
    trimmed
        .strip_prefix('|')
        .is_some_and(|rest| rest.contains('|'))
}

/// Three or more of one of `-`, `*`, `_`, ignoring interior whitespace.
pub fn is_horizontal_rule(trimmed: &str) -> bool {
    let mut marks = trimmed.chars().filter(|c| !c.is_whitespace());
    let first = match marks.next() {
        Some(c @ ('-' | '*' | '_')) => c,
        _ => return false,
    };

    let mut count = 1;
    for c in marks {
        if c != first {
            return false;
        }
        count += 1;
    }
    count >= 3
}

/// Why a `#` line is not a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderReject {
    NotHeader,
    TooManyHashes,
    MissingSpace,
    Empty,
}

impl HeaderReject {
    pub fn reason(self) -> Option<&'static str> {
        match self {
            HeaderReject::NotHeader => None,
            HeaderReject::TooManyHashes => Some("more than six `#`"),
            HeaderReject::MissingSpace => Some("no space after `#`"),
            HeaderReject::Empty => Some("no text after `#`"),
        }
    }
}

/// Level and raw text of a header line.
///
/// The `#` run must be 1-6 long and followed by whitespace; exactly one
/// separating whitespace character is stripped. `##NoSpace` and `#######`
/// are not headers.
pub fn header_parts(trimmed: &str) -> Result<(u8, &str), HeaderReject> {
    let level = trimmed.bytes().take_while(|&b| b == b'#').count();
    if level == 0 {
        return Err(HeaderReject::NotHeader);
    }
    if level > 6 {
        return Err(HeaderReject::TooManyHashes);
    }

    let rest = &trimmed[level..];
    let mut chars = rest.chars();
    let text = match chars.next() {
        Some(c) if c.is_whitespace() => chars.as_str(),
        Some(_) => return Err(HeaderReject::MissingSpace),
        None => "",
    };

    if text.trim().is_empty() {
        return Err(HeaderReject::Empty);
    }
    Ok((level as u8, text))
}

/// Quoted text of a blockquote line: `>` alone, or `> ` plus text.
#[inline]
pub fn quote_line(trimmed: &str) -> Option<&str> {
    if trimmed == ">" {
        Some("")
    } else {
        trimmed.strip_prefix("> ")
    }
}

/// Item text of a bullet line (`- `, `* ` or `• `), trimmed.
#[inline]
pub fn bullet_item(trimmed: &str) -> Option<&str> {
    BULLET_PREFIXES
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .map(str::trim)
}

/// Item text of a numbered line (`12. text`), trimmed.
pub fn numbered_item(trimmed: &str) -> Option<&str> {
    let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }

    let rest = trimmed[digits..].strip_prefix('.')?;
    match rest.chars().next() {
        Some(c) if c.is_whitespace() => Some(rest.trim()),
        _ => None,
    }
}

/// True if a non-blank line would start any non-paragraph block.
pub fn starts_block(trimmed: &str) -> bool {
    starts_code_fence(trimmed)
        || starts_table(trimmed)
        || is_horizontal_rule(trimmed)
        || header_parts(trimmed).is_ok()
        || quote_line(trimmed).is_some()
        || bullet_item(trimmed).is_some()
        || numbered_item(trimmed).is_some()
}

// Detectors.

/// Fenced code block. Runs to end of input when the fence is never closed.
pub fn code_fence<'a>(cursor: Cursor<'_, 'a>) -> Option<Detection<'a>> {
    let opening = cursor.current()?.trimmed();
    if !starts_code_fence(opening) {
        return None;
    }

    let language = opening.trim_start_matches('`').trim();
    let language = (!language.is_empty()).then_some(Cow::Borrowed(language));

    let body = cursor.rest().get(1..).unwrap_or_default();
    let close = body
        .iter()
        .position(|line| starts_code_fence(line.trimmed()));
    let content = &body[..close.unwrap_or(body.len())];
    let code = joined_source(cursor.input(), content);

    let kind = BlockKind::CodeBlock { language, code };
    match close {
        Some(at) => Some(Detection::new(kind, at + 2)),
        None => Some(Detection {
            degraded: Some(DiagnosticKind::UnclosedCodeFence),
            ..Detection::new(kind, body.len() + 1)
        }),
    }
}

/// Pipe table with at least two rows. A second row of alignment markers
/// is skipped.
pub fn table<'a>(cursor: Cursor<'_, 'a>) -> Option<Detection<'a>> {
    if !starts_table(cursor.current()?.trimmed()) {
        return None;
    }

    let rows = table_run(cursor.rest());
    if rows.len() < 2 {
        return None;
    }

    let headers = cells(rows[0].text);
    let body = if is_separator_row(rows[1].text) {
        &rows[2..]
    } else {
        &rows[1..]
    };
    let rows_out = body.iter().map(|line| cells(line.text)).collect();

    Some(Detection::new(
        BlockKind::Table {
            headers,
            rows: rows_out,
        },
        rows.len(),
    ))
}

pub fn horizontal_rule<'a>(cursor: Cursor<'_, 'a>) -> Option<Detection<'a>> {
    is_horizontal_rule(cursor.current()?.trimmed())
        .then(|| Detection::new(BlockKind::HorizontalRule, 1))
}

pub fn header<'a>(cursor: Cursor<'_, 'a>) -> Option<Detection<'a>> {
    let (level, text) = header_parts(cursor.current()?.trimmed()).ok()?;
    Some(Detection::new(
        BlockKind::Header {
            level,
            text: format_inline(text),
        },
        1,
    ))
}

/// Consecutive quote lines, joined with `\n` and formatted as one unit.
pub fn blockquote<'a>(cursor: Cursor<'_, 'a>) -> Option<Detection<'a>> {
    let quoted: Vec<&'a str> = cursor
        .rest()
        .iter()
        .map_while(|line| quote_line(line.trimmed()))
        .collect();

    let text = match quoted.as_slice() {
        [] => return None,
        [single] => format_inline(*single),
        many => format_inline(&many.join("\n")).into_owned(),
    };
    Some(Detection::new(BlockKind::Blockquote { text }, quoted.len()))
}

pub fn bullet_list<'a>(cursor: Cursor<'_, 'a>) -> Option<Detection<'a>> {
    list(cursor, bullet_item).map(|(items, consumed)| {
        Detection::new(BlockKind::BulletList { items }, consumed)
    })
}

/// Numbered list. Source digits are dropped; see [`crate::numbered_marker`].
pub fn numbered_list<'a>(cursor: Cursor<'_, 'a>) -> Option<Detection<'a>> {
    list(cursor, numbered_item).map(|(items, consumed)| {
        Detection::new(BlockKind::NumberedList { items }, consumed)
    })
}

/// Paragraph fallback. Always consumes the current line, then continues
/// until a blank line or a line that starts another block.
///
/// A line that opened a table the table detector declined stays a
/// paragraph on its own.
pub fn paragraph<'a>(cursor: Cursor<'_, 'a>) -> Option<Detection<'a>> {
    let (first, rest) = cursor.rest().split_first()?;
    let more = if starts_table(first.trimmed()) {
        0
    } else {
        rest.iter()
            .take_while(|line| !line.is_blank() && !starts_block(line.trimmed()))
            .count()
    };

    let text = if more == 0 {
        format_inline(first.trimmed())
    } else {
        let joined = cursor.rest()[..=more]
            .iter()
            .map(Line::trimmed)
            .collect::<Vec<_>>()
            .join(" ");
        format_inline(&joined).into_owned()
    };

    Some(Detection::new(BlockKind::Paragraph { text }, more + 1))
}

// Helpers.

fn list<'a>(
    cursor: Cursor<'_, 'a>,
    item: fn(&'a str) -> Option<&'a str>,
) -> Option<(Vec<StyledText<'a>>, usize)> {
    let items: Vec<StyledText<'a>> = cursor
        .rest()
        .iter()
        .map_while(|line| item(line.trimmed()))
        .map(format_inline)
        .collect();

    let consumed = items.len();
    (!items.is_empty()).then_some((items, consumed))
}

/// Consecutive non-blank lines containing `|`.
fn table_run<'l, 'a>(lines: &'l [Line<'a>]) -> &'l [Line<'a>] {
    let len = lines
        .iter()
        .take_while(|line| !line.is_blank() && line.contains_byte(b'|'))
        .count();
    &lines[..len]
}

#[inline]
fn cells(row: &str) -> Vec<CowStr<'_>> {
    split_row(row).into_iter().map(Cow::Borrowed).collect()
}

/// Source text of `lines` joined with `\n`, borrowed when the input has
/// plain `\n` endings.
fn joined_source<'a>(input: &'a str, lines: &[Line<'a>]) -> CowStr<'a> {
    let (first, last) = match (lines.first(), lines.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Cow::Borrowed(""),
    };

    let source = first.span.merge(last.span).slice(input);
    if source.contains('\r') {
        Cow::Owned(source.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(source)
    }
}
