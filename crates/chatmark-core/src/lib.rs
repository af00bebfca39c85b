//! # Chatmark Core
//!
//! Turns the markdown people and assistants write in chat messages into
//! a flat list of typed, renderable blocks.
//!
//! The parser is total: any UTF-8 string parses, and markup it cannot make
//! sense of degrades to a paragraph instead of failing. Parsing is a pure
//! function of the input, so it is safe to call from any thread.
//!
//! ## Quick Start
//!
//! ```rust
//! use chatmark_core::{parse, BlockKind};
//!
//! let input = "## Steps\n\n1. Install\n2. **Run**\n\n```sh\nchatmark parse -\n```";
//! let blocks = parse(input);
//!
//! assert_eq!(blocks.len(), 3);
//! assert!(matches!(blocks[2].kind, BlockKind::CodeBlock { .. }));
//! ```
//!
//! ## Diagnostics
//!
//! Degraded markup can be reported without changing the output:
//!
//! ```rust
//! use chatmark_core::Parser;
//!
//! let result = Parser::new().parse_with_diagnostics("```rust\nfn main() {}");
//!
//! // The fence is never closed, so the rest of the message is code.
//! assert_eq!(result.document.blocks.len(), 1);
//! assert_eq!(result.diagnostics.len(), 1);
//! ```
//!
//! ## Block kinds
//!
//! Detectors run in a fixed priority order: code fence, table, horizontal
//! rule, header, blockquote, bullet list, numbered list, and finally the
//! paragraph fallback.

pub mod ast;
pub mod citation;
pub mod cursor;
pub mod detect;
pub mod diagnostic;
pub mod inline;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod table;

pub use ast::{
    numbered_marker, Block, BlockId, BlockKind, Document, LinkHandler, Run, Style, StyledText,
};
pub use citation::{Citation, CitationFooter, FooterEntry};
pub use diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
pub use inline::format_inline;
pub use parser::{parse, ParseResult, Parser};
pub use span::{LineRange, Span};
pub use table::split_row;
