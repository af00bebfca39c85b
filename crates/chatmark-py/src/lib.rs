//! Python bindings for the chatmark message parser.

use std::cell::RefCell;

use chatmark_core::{
    ast::{Block, BlockKind, StyledText},
    citation::{Citation as CoreCitation, CitationFooter as CoreFooter, FooterEntry},
    diagnostic::Diagnostic as CoreDiagnostic,
    numbered_marker,
    span::{LineRange as CoreLineRange, Span as CoreSpan},
    ParseResult as CoreParseResult, Parser as CoreParser,
};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

// ============================================================================
// Source tracking
// ============================================================================

/// Source location in the input text (byte offsets).
#[pyclass(frozen, get_all, name = "Span")]
#[derive(Clone)]
pub struct PySpan {
    pub start: u32,
    pub end: u32,
}

#[pymethods]
impl PySpan {
    fn __repr__(&self) -> String {
        format!("Span({}, {})", self.start, self.end)
    }

    #[getter]
    fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }
}

impl From<CoreSpan> for PySpan {
    fn from(s: CoreSpan) -> Self {
        PySpan {
            start: s.start,
            end: s.end,
        }
    }
}

/// Zero-based, half-open range of source lines.
#[pyclass(frozen, get_all, name = "LineRange")]
#[derive(Clone)]
pub struct PyLineRange {
    pub start: usize,
    pub end: usize,
}

#[pymethods]
impl PyLineRange {
    fn __repr__(&self) -> String {
        format!("LineRange({}, {})", self.start, self.end)
    }

    fn __len__(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

impl From<CoreLineRange> for PyLineRange {
    fn from(r: CoreLineRange) -> Self {
        PyLineRange {
            start: r.start,
            end: r.end,
        }
    }
}

// ============================================================================
// Styled text
// ============================================================================

/// A run of text sharing one style set.
#[pyclass(frozen, get_all, name = "Run")]
#[derive(Clone)]
pub struct PyRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub code: bool,
    pub link: Option<String>,
}

#[pymethods]
impl PyRun {
    fn __repr__(&self) -> String {
        let mut styles = Vec::new();
        if self.bold {
            styles.push("bold");
        }
        if self.italic {
            styles.push("italic");
        }
        if self.strikethrough {
            styles.push("strikethrough");
        }
        if self.code {
            styles.push("code");
        }
        match &self.link {
            Some(url) => format!("Run({:?}, {:?}, link={:?})", self.text, styles, url),
            None => format!("Run({:?}, {:?})", self.text, styles),
        }
    }
}

/// Inline-formatted text: an ordered list of runs.
#[pyclass(frozen, name = "StyledText")]
#[derive(Clone)]
pub struct PyStyledText {
    inner: StyledText<'static>,
}

#[pymethods]
impl PyStyledText {
    #[getter]
    fn runs(&self) -> Vec<PyRun> {
        self.inner
            .runs()
            .iter()
            .map(|run| PyRun {
                text: run.text.to_string(),
                bold: run.style.bold,
                italic: run.style.italic,
                strikethrough: run.style.strikethrough,
                code: run.style.code,
                link: run.style.link.as_ref().map(|url| url.to_string()),
            })
            .collect()
    }

    /// Text of all runs, without markup.
    #[getter]
    fn plain_text(&self) -> String {
        self.inner.plain_text()
    }

    /// `(label, url)` for every link run.
    fn links(&self) -> Vec<(String, String)> {
        self.inner
            .links()
            .map(|(label, url)| (label.to_string(), url.to_string()))
            .collect()
    }

    /// Url of the link covering the character at `offset`, if any.
    #[pyo3(text_signature = "(self, offset)")]
    fn link_at(&self, offset: usize) -> Option<String> {
        self.inner.link_at(offset).map(str::to_string)
    }

    /// Resolve a tap at `offset` and pass the url to `handler(url) -> bool`.
    ///
    /// Returns False when no link is under the offset. Exceptions raised
    /// by the handler propagate.
    #[pyo3(text_signature = "(self, offset, handler)")]
    fn activate_link(&self, offset: usize, handler: Bound<'_, PyAny>) -> PyResult<bool> {
        let failure = RefCell::new(None);
        let handled = self.inner.activate_link(offset, &|url: &str| {
            match handler.call1((url,)).and_then(|ret| ret.is_truthy()) {
                Ok(handled) => handled,
                Err(e) => {
                    *failure.borrow_mut() = Some(e);
                    false
                }
            }
        });

        match failure.into_inner() {
            Some(e) => Err(e),
            None => Ok(handled),
        }
    }

    fn __str__(&self) -> String {
        self.inner.plain_text()
    }

    fn __repr__(&self) -> String {
        format!("StyledText({:?})", self.inner.plain_text())
    }

    fn __len__(&self) -> usize {
        self.inner.runs().len()
    }
}

impl From<StyledText<'_>> for PyStyledText {
    fn from(text: StyledText<'_>) -> Self {
        PyStyledText {
            inner: text.into_owned(),
        }
    }
}

// ============================================================================
// Block types
// ============================================================================

/// Text paragraph.
#[pyclass(frozen, get_all, name = "Paragraph")]
pub struct PyParagraph {
    pub text: PyStyledText,
    pub id: String,
    pub span: PySpan,
    pub lines: PyLineRange,
}

/// Header, level 1-6.
#[pyclass(frozen, get_all, name = "Header")]
pub struct PyHeader {
    pub level: u8,
    pub text: PyStyledText,
    pub id: String,
    pub span: PySpan,
    pub lines: PyLineRange,
}

/// Fenced code block. The code is never formatted.
#[pyclass(frozen, get_all, name = "CodeBlock")]
pub struct PyCodeBlock {
    pub language: Option<String>,
    pub code: String,
    pub id: String,
    pub span: PySpan,
    pub lines: PyLineRange,
}

/// Pipe table. Rows are not padded to the header width.
#[pyclass(frozen, get_all, name = "Table")]
pub struct PyTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub id: String,
    pub span: PySpan,
    pub lines: PyLineRange,
}

/// Bulleted list.
#[pyclass(frozen, get_all, name = "BulletList")]
pub struct PyBulletList {
    pub items: Vec<PyStyledText>,
    pub id: String,
    pub span: PySpan,
    pub lines: PyLineRange,
}

/// Numbered list. Use `markers` for display numbering.
#[pyclass(frozen, get_all, name = "NumberedList")]
pub struct PyNumberedList {
    pub items: Vec<PyStyledText>,
    pub id: String,
    pub span: PySpan,
    pub lines: PyLineRange,
}

#[pymethods]
impl PyNumberedList {
    /// `["1.", "2.", ...]`, one per item.
    #[getter]
    fn markers(&self) -> Vec<String> {
        (0..self.items.len()).map(numbered_marker).collect()
    }
}

/// Block quotation.
#[pyclass(frozen, get_all, name = "Blockquote")]
pub struct PyBlockquote {
    pub text: PyStyledText,
    pub id: String,
    pub span: PySpan,
    pub lines: PyLineRange,
}

/// Horizontal rule.
#[pyclass(frozen, get_all, name = "HorizontalRule")]
pub struct PyHorizontalRule {
    pub id: String,
    pub span: PySpan,
    pub lines: PyLineRange,
}

// ============================================================================
// Conversion
// ============================================================================

fn convert_blocks(py: Python<'_>, blocks: Vec<Block<'_>>) -> PyResult<PyObject> {
    let list = PyList::empty(py);
    for block in blocks {
        list.append(convert_block(py, block)?)?;
    }
    Ok(list.into_any().unbind())
}

fn convert_block(py: Python<'_>, block: Block<'_>) -> PyResult<PyObject> {
    let id = block.id.to_string();
    let span = PySpan::from(block.span);
    let lines = PyLineRange::from(block.lines);

    let object = match block.kind {
        BlockKind::Paragraph { text } => Py::new(
            py,
            PyParagraph {
                text: text.into(),
                id,
                span,
                lines,
            },
        )?
        .into_any(),
        BlockKind::Header { level, text } => Py::new(
            py,
            PyHeader {
                level,
                text: text.into(),
                id,
                span,
                lines,
            },
        )?
        .into_any(),
        BlockKind::CodeBlock { language, code } => Py::new(
            py,
            PyCodeBlock {
                language: language.map(|l| l.into_owned()),
                code: code.into_owned(),
                id,
                span,
                lines,
            },
        )?
        .into_any(),
        BlockKind::Table { headers, rows } => Py::new(
            py,
            PyTable {
                headers: headers.into_iter().map(|h| h.into_owned()).collect(),
                rows: rows
                    .into_iter()
                    .map(|row| row.into_iter().map(|cell| cell.into_owned()).collect())
                    .collect(),
                id,
                span,
                lines,
            },
        )?
        .into_any(),
        BlockKind::BulletList { items } => Py::new(
            py,
            PyBulletList {
                items: items.into_iter().map(PyStyledText::from).collect(),
                id,
                span,
                lines,
            },
        )?
        .into_any(),
        BlockKind::NumberedList { items } => Py::new(
            py,
            PyNumberedList {
                items: items.into_iter().map(PyStyledText::from).collect(),
                id,
                span,
                lines,
            },
        )?
        .into_any(),
        BlockKind::Blockquote { text } => Py::new(
            py,
            PyBlockquote {
                text: text.into(),
                id,
                span,
                lines,
            },
        )?
        .into_any(),
        BlockKind::HorizontalRule => {
            Py::new(py, PyHorizontalRule { id, span, lines })?.into_any()
        }
    };

    Ok(object)
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Markup the parser had to degrade.
#[pyclass(frozen, get_all, name = "Diagnostic")]
#[derive(Clone)]
pub struct PyDiagnostic {
    pub message: String,
    /// One of `unclosed_code_fence`, `table_too_short`, `malformed_header`.
    pub kind: String,
    pub line: usize,
    pub span: PySpan,
}

#[pymethods]
impl PyDiagnostic {
    fn __repr__(&self) -> String {
        format!("Diagnostic({:?}, line={})", self.kind, self.line)
    }

    fn __str__(&self) -> String {
        format!("line {}: {}", self.line + 1, self.message)
    }
}

impl From<CoreDiagnostic> for PyDiagnostic {
    fn from(d: CoreDiagnostic) -> Self {
        PyDiagnostic {
            kind: d.kind.as_str().to_string(),
            message: d.message,
            line: d.line,
            span: d.span.into(),
        }
    }
}

/// Blocks of a message together with its diagnostics.
#[pyclass(frozen, name = "ParseResult")]
pub struct PyParseResult {
    #[pyo3(get)]
    pub blocks: PyObject,
    #[pyo3(get)]
    pub diagnostics: Vec<PyDiagnostic>,
    #[pyo3(get)]
    pub line_count: usize,
}

#[pymethods]
impl PyParseResult {
    /// True if no markup was degraded.
    #[getter]
    fn clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    fn __repr__(&self, py: Python<'_>) -> PyResult<String> {
        let blocks = self.blocks.downcast_bound::<PyList>(py)?;
        Ok(format!(
            "ParseResult(blocks={}, diagnostics={})",
            blocks.len(),
            self.diagnostics.len()
        ))
    }
}

// ============================================================================
// Citations
// ============================================================================

/// An externally supplied source reference.
#[pyclass(frozen, get_all, name = "Citation")]
#[derive(Clone)]
pub struct PyCitation {
    pub id: String,
    pub title: String,
    pub url: Option<String>,
    pub domain: Option<String>,
    pub snippet: Option<String>,
}

#[pymethods]
impl PyCitation {
    #[new]
    #[pyo3(
        signature = (id, title, url=None, domain=None, snippet=None),
        text_signature = "(id, title, url=None, domain=None, snippet=None)"
    )]
    fn new(
        id: String,
        title: String,
        url: Option<String>,
        domain: Option<String>,
        snippet: Option<String>,
    ) -> Self {
        PyCitation {
            id,
            title,
            url,
            domain,
            snippet,
        }
    }

    /// Build from a dict with `id` and `title` and optional `url`,
    /// `domain`, `snippet`. Raises ValueError when required keys are
    /// missing or values are not strings.
    #[staticmethod]
    fn from_dict(data: &Bound<'_, PyDict>) -> PyResult<Self> {
        let required = |key: &str| -> PyResult<String> {
            match data.get_item(key)? {
                Some(value) => value
                    .extract::<String>()
                    .map_err(|_| PyValueError::new_err(format!("citation `{key}` must be a string"))),
                None => Err(PyValueError::new_err(format!("citation is missing `{key}`"))),
            }
        };
        let optional = |key: &str| -> PyResult<Option<String>> {
            match data.get_item(key)? {
                Some(value) if !value.is_none() => value
                    .extract::<String>()
                    .map(Some)
                    .map_err(|_| PyValueError::new_err(format!("citation `{key}` must be a string"))),
                _ => Ok(None),
            }
        };

        Ok(PyCitation {
            id: required("id")?,
            title: required("title")?,
            url: optional("url")?,
            domain: optional("domain")?,
            snippet: optional("snippet")?,
        })
    }

    /// Domain label: explicit domain, else the url host, else "Source".
    #[getter]
    fn display_domain(&self) -> String {
        CoreCitation::from(self.clone()).display_domain().into_owned()
    }

    fn __repr__(&self) -> String {
        format!("Citation({:?}, {:?})", self.id, self.title)
    }
}

impl From<PyCitation> for CoreCitation {
    fn from(c: PyCitation) -> Self {
        CoreCitation {
            id: c.id,
            title: c.title,
            url: c.url,
            domain: c.domain,
            snippet: c.snippet,
        }
    }
}

/// One row of the citation footer.
#[pyclass(frozen, get_all, name = "FooterEntry")]
#[derive(Clone)]
pub struct PyFooterEntry {
    pub badge: String,
    pub title: String,
    pub domain: String,
    pub url: Option<String>,
}

impl From<FooterEntry<'_>> for PyFooterEntry {
    fn from(e: FooterEntry<'_>) -> Self {
        PyFooterEntry {
            badge: e.badge.to_string(),
            title: e.title.to_string(),
            domain: e.domain.into_owned(),
            url: e.url.map(str::to_string),
        }
    }
}

/// Collapsible citation list, collapsed by default.
#[pyclass(name = "CitationFooter")]
pub struct PyCitationFooter {
    inner: CoreFooter,
}

#[pymethods]
impl PyCitationFooter {
    #[new]
    #[pyo3(signature = (citations, expanded=false), text_signature = "(citations, expanded=False)")]
    fn new(citations: Vec<PyCitation>, expanded: bool) -> Self {
        let citations = citations.into_iter().map(CoreCitation::from).collect();
        PyCitationFooter {
            inner: CoreFooter::new(citations).with_expanded(expanded),
        }
    }

    #[getter]
    fn expanded(&self) -> bool {
        self.inner.is_expanded()
    }

    /// Flip the footer state; returns True when now expanded.
    fn toggle(&mut self) -> bool {
        self.inner.toggle()
    }

    #[getter]
    fn summary(&self) -> String {
        self.inner.summary()
    }

    /// All entries, regardless of state.
    fn entries(&self) -> Vec<PyFooterEntry> {
        self.inner.entries().map(PyFooterEntry::from).collect()
    }

    /// Entries to draw in the current state.
    fn visible_entries(&self) -> Vec<PyFooterEntry> {
        self.inner.visible_entries().map(PyFooterEntry::from).collect()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "CitationFooter({}, expanded={})",
            self.inner.summary(),
            self.inner.is_expanded()
        )
    }
}

// ============================================================================
// Module functions
// ============================================================================

/// Parse a message into a list of blocks.
///
/// Args:
///     text: Message body
///
/// Returns:
///     list: Paragraph, Header, CodeBlock, Table, BulletList,
///     NumberedList, Blockquote and HorizontalRule objects
#[pyfunction]
#[pyo3(text_signature = "(text)")]
fn parse(py: Python<'_>, text: &str) -> PyResult<PyObject> {
    let document = CoreParser::new().parse(text);
    convert_blocks(py, document.blocks)
}

/// Parse a message and report degraded markup.
///
/// Args:
///     text: Message body
///
/// Returns:
///     ParseResult: blocks, diagnostics and line count
#[pyfunction]
#[pyo3(text_signature = "(text)")]
fn parse_with_diagnostics(py: Python<'_>, text: &str) -> PyResult<PyParseResult> {
    let CoreParseResult {
        document,
        diagnostics,
    } = CoreParser::new().parse_with_diagnostics(text);

    Ok(PyParseResult {
        line_count: document.line_count,
        blocks: convert_blocks(py, document.blocks)?,
        diagnostics: diagnostics.into_iter().map(PyDiagnostic::from).collect(),
    })
}

/// Format one unit of text into styled runs.
#[pyfunction]
#[pyo3(text_signature = "(text)")]
fn format_inline(text: &str) -> PyStyledText {
    chatmark_core::format_inline(text).into()
}

/// Split a pipe-table row into trimmed cells.
#[pyfunction]
#[pyo3(text_signature = "(line)")]
fn split_row(line: &str) -> Vec<String> {
    chatmark_core::split_row(line)
        .into_iter()
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Module
// ============================================================================

/// pychatmark - Chat message markdown to typed blocks.
#[pymodule]
fn pychatmark(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySpan>()?;
    m.add_class::<PyLineRange>()?;
    m.add_class::<PyRun>()?;
    m.add_class::<PyStyledText>()?;
    m.add_class::<PyParagraph>()?;
    m.add_class::<PyHeader>()?;
    m.add_class::<PyCodeBlock>()?;
    m.add_class::<PyTable>()?;
    m.add_class::<PyBulletList>()?;
    m.add_class::<PyNumberedList>()?;
    m.add_class::<PyBlockquote>()?;
    m.add_class::<PyHorizontalRule>()?;
    m.add_class::<PyDiagnostic>()?;
    m.add_class::<PyParseResult>()?;
    m.add_class::<PyCitation>()?;
    m.add_class::<PyFooterEntry>()?;
    m.add_class::<PyCitationFooter>()?;
    m.add_function(wrap_pyfunction!(parse, m)?)?;
    m.add_function(wrap_pyfunction!(parse_with_diagnostics, m)?)?;
    m.add_function(wrap_pyfunction!(format_inline, m)?)?;
    m.add_function(wrap_pyfunction!(split_row, m)?)?;
    Ok(())
}
