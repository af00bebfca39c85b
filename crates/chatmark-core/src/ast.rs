//! Block model produced by the parser.
//!
//! A parsed message is a flat, ordered list of [`Block`]s. Each block pairs
//! a closed [`BlockKind`] with source tracking and an opaque [`BlockId`].
//! Text payloads are [`StyledText`]: ordered runs of text with a style set.
//!
//! - **Zero-copy where possible**: payloads that are a contiguous slice of
//!   the source borrow it through `Cow<'a, str>`
//! - **Immutable**: blocks are plain values, built once per parse

use std::borrow::Cow;
use std::fmt;

use uuid::Uuid;

use crate::span::{LineRange, Span};

/// Borrowed or owned string type for zero-copy parsing.
pub type CowStr<'a> = Cow<'a, str>;

/// Namespace for block identities.
const BLOCK_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a9e_54b3_4d7c_9a0e_3b8f_c1d2_e4a7);

/// Opaque block identity for UI diffing.
///
/// Ids are derived from the block kind, its byte position, and its source
/// text, so the same message always yields the same ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BlockId(Uuid);

impl BlockId {
    pub(crate) fn derive(kind: &str, span: Span, source: &str) -> Self {
        let mut name = Vec::with_capacity(kind.len() + 8 + source.len());
        name.extend_from_slice(kind.as_bytes());
        name.extend_from_slice(&span.start.to_le_bytes());
        name.extend_from_slice(&span.end.to_le_bytes());
        name.extend_from_slice(source.as_bytes());
        BlockId(Uuid::new_v5(&BLOCK_NAMESPACE, &name))
    }

    /// The underlying UUID.
    #[inline]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// A parsed message.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Document<'a> {
    /// Blocks in source order.
    pub blocks: Vec<Block<'a>>,
    /// Source span covering the entire message.
    pub span: Span,
    /// Number of lines the lexer produced.
    pub line_count: usize,
}

impl<'a> Document<'a> {
    /// Compare two documents block by block, ignoring ids and positions.
    pub fn same_content(&self, other: &Document<'_>) -> bool {
        self.blocks.len() == other.blocks.len()
            && self
                .blocks
                .iter()
                .zip(&other.blocks)
                .all(|(a, b)| a.same_content(b))
    }
}

/// One top-level structural unit of a message.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Block<'a> {
    /// Opaque identity.
    pub id: BlockId,
    /// What the block is, with its payload.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: BlockKind<'a>,
    /// Bytes consumed, from the first line start to the last line end.
    pub span: Span,
    /// Lines consumed.
    pub lines: LineRange,
}

impl<'a> Block<'a> {
    /// Short, stable name of the block kind.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Compare payloads only.
    #[inline]
    pub fn same_content(&self, other: &Block<'_>) -> bool {
        self.kind == other.kind
    }
}

/// Block kinds.
///
/// The set is closed: consumers match exhaustively so a new kind is a
/// compile error at every render boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum BlockKind<'a> {
    /// Text paragraph; source lines joined with single spaces.
    Paragraph { text: StyledText<'a> },
    /// Header with level 1-6.
    Header { level: u8, text: StyledText<'a> },
    /// Fenced code block. The code is never inline-formatted.
    CodeBlock {
        language: Option<CowStr<'a>>,
        code: CowStr<'a>,
    },
    /// Pipe table. Rows are not padded or truncated to the header width.
    Table {
        headers: Vec<CowStr<'a>>,
        rows: Vec<Vec<CowStr<'a>>>,
    },
    /// Bulleted list; always at least one item.
    BulletList { items: Vec<StyledText<'a>> },
    /// Numbered list; always at least one item, rendered as `1.`, `2.`, ...
    NumberedList { items: Vec<StyledText<'a>> },
    /// Block quotation; quoted lines joined with `\n`.
    Blockquote { text: StyledText<'a> },
    /// Horizontal rule.
    HorizontalRule,
}

impl<'a> BlockKind<'a> {
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Paragraph { .. } => "paragraph",
            BlockKind::Header { .. } => "header",
            BlockKind::CodeBlock { .. } => "code_block",
            BlockKind::Table { .. } => "table",
            BlockKind::BulletList { .. } => "bullet_list",
            BlockKind::NumberedList { .. } => "numbered_list",
            BlockKind::Blockquote { .. } => "blockquote",
            BlockKind::HorizontalRule => "horizontal_rule",
        }
    }
}

/// Display marker for the item at `index` of a numbered list.
///
/// Numbering is positional; the digits written in the source are dropped.
#[inline]
pub fn numbered_marker(index: usize) -> String {
    format!("{}.", index + 1)
}

/// Inline style set of a run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Style<'a> {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "std::ops::Not::not"))]
    pub bold: bool,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "std::ops::Not::not"))]
    pub italic: bool,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "std::ops::Not::not"))]
    pub strikethrough: bool,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "std::ops::Not::not"))]
    pub code: bool,
    /// Link destination, if the run is a link label.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub link: Option<CowStr<'a>>,
}

impl<'a> Style<'a> {
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Self::default()
        }
    }

    pub fn strikethrough() -> Self {
        Self {
            strikethrough: true,
            ..Self::default()
        }
    }

    pub fn code() -> Self {
        Self {
            code: true,
            ..Self::default()
        }
    }

    pub fn link(url: impl Into<CowStr<'a>>) -> Self {
        Self {
            link: Some(url.into()),
            ..Self::default()
        }
    }

    /// True when no style is applied.
    #[inline]
    pub fn is_plain(&self) -> bool {
        !self.bold && !self.italic && !self.strikethrough && !self.code && self.link.is_none()
    }

    pub fn into_owned(self) -> Style<'static> {
        Style {
            bold: self.bold,
            italic: self.italic,
            strikethrough: self.strikethrough,
            code: self.code,
            link: self.link.map(|url| Cow::Owned(url.into_owned())),
        }
    }
}

/// A run of text sharing one style set.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Run<'a> {
    pub text: CowStr<'a>,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub style: Style<'a>,
}

impl<'a> Run<'a> {
    #[inline]
    pub fn new(text: impl Into<CowStr<'a>>, style: Style<'a>) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    #[inline]
    pub fn plain(text: impl Into<CowStr<'a>>) -> Self {
        Self::new(text, Style::default())
    }

    pub fn into_owned(self) -> Run<'static> {
        Run {
            text: Cow::Owned(self.text.into_owned()),
            style: self.style.into_owned(),
        }
    }
}

/// Inline-formatted text: an ordered sequence of runs.
///
/// Produced only by the inline formatter; never contains block markers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StyledText<'a> {
    runs: Vec<Run<'a>>,
}

impl<'a> StyledText<'a> {
    #[inline]
    pub fn from_runs(runs: Vec<Run<'a>>) -> Self {
        Self { runs }
    }

    /// A single unstyled run. Empty text yields no runs.
    pub fn plain(text: impl Into<CowStr<'a>>) -> Self {
        let text = text.into();
        if text.is_empty() {
            Self::default()
        } else {
            Self {
                runs: vec![Run::plain(text)],
            }
        }
    }

    #[inline]
    pub fn runs(&self) -> &[Run<'a>] {
        &self.runs
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Text of all runs concatenated, without markup.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_ref()).collect()
    }

    /// `(label, url)` of every link run.
    pub fn links(&self) -> impl Iterator<Item = (&str, &str)> {
        self.runs
            .iter()
            .filter_map(|run| run.style.link.as_deref().map(|url| (run.text.as_ref(), url)))
    }

    /// Url of the link run covering the character at `char_offset`.
    pub fn link_at(&self, char_offset: usize) -> Option<&str> {
        let mut start = 0;
        for run in &self.runs {
            let len = run.text.chars().count();
            if char_offset < start + len {
                return run.style.link.as_deref();
            }
            start += len;
        }
        None
    }

    /// Resolve a tap at `char_offset` and hand the url to `handler`.
    ///
    /// Returns `false` when no link covers the offset or the handler
    /// declined it.
    pub fn activate_link<H: LinkHandler + ?Sized>(&self, char_offset: usize, handler: &H) -> bool {
        match self.link_at(char_offset) {
            Some(url) => handler.open_link(url),
            None => false,
        }
    }

    pub fn into_owned(self) -> StyledText<'static> {
        StyledText {
            runs: self.runs.into_iter().map(Run::into_owned).collect(),
        }
    }
}

/// Caller-supplied link resolution: `(url) -> handled`.
///
/// The parser never navigates; it only surfaces link runs.
pub trait LinkHandler {
    fn open_link(&self, url: &str) -> bool;
}

impl<F> LinkHandler for F
where
    F: Fn(&str) -> bool,
{
    #[inline]
    fn open_link(&self, url: &str) -> bool {
        self(url)
    }
}
