//! Integration tests for the chatmark parser

use chatmark_core::{
    numbered_marker, parse, BlockKind, Citation, CitationFooter, DiagnosticKind, Parser, Run,
    Style, StyledText,
};
use pretty_assertions::assert_eq;

fn plain(text: &str) -> StyledText<'_> {
    StyledText::plain(text)
}

// ============================================================================
// Headers
// ============================================================================

#[test]
fn test_parse_header_levels() {
    let blocks = parse("# One\n## Two\n###### Six");
    let levels: Vec<u8> = blocks
        .iter()
        .map(|b| match b.kind {
            BlockKind::Header { level, .. } => level,
            _ => 0,
        })
        .collect();
    assert_eq!(levels, [1, 2, 6]);
}

#[test]
fn test_parse_header_inline_formatting() {
    let blocks = parse("## Use `cargo` **now**");
    assert_eq!(
        blocks[0].kind,
        BlockKind::Header {
            level: 2,
            text: StyledText::from_runs(vec![
                Run::plain("Use "),
                Run::new("cargo", Style::code()),
                Run::plain(" "),
                Run::new("now", Style::bold()),
            ]),
        }
    );
}

#[test]
fn test_parse_header_without_space_is_paragraph() {
    let blocks = parse("##NoSpace");
    assert_eq!(
        blocks[0].kind,
        BlockKind::Paragraph {
            text: plain("##NoSpace"),
        }
    );
}

#[test]
fn test_parse_seven_hashes_is_paragraph() {
    let blocks = parse("####### Too deep");
    assert_eq!(blocks[0].name(), "paragraph");
}

#[test]
fn test_parse_bare_hash_is_paragraph() {
    let blocks = parse("#");
    assert_eq!(
        blocks[0].kind,
        BlockKind::Paragraph { text: plain("#") }
    );
}

// ============================================================================
// Code blocks
// ============================================================================

#[test]
fn test_parse_code_block_with_language() {
    let blocks = parse("```python\nprint('**hi**')\n```");
    assert_eq!(
        blocks[0].kind,
        BlockKind::CodeBlock {
            language: Some("python".into()),
            code: "print('**hi**')".into(),
        }
    );
}

#[test]
fn test_parse_code_block_preserves_indentation_and_blank_lines() {
    let blocks = parse("```\n  indented\n\n\tTab\n```");
    assert_eq!(
        blocks[0].kind,
        BlockKind::CodeBlock {
            language: None,
            code: "  indented\n\n\tTab".into(),
        }
    );
}

#[test]
fn test_parse_indented_fence() {
    let blocks = parse("  ```js\n  let x;\n  ```\nafter");
    assert_eq!(blocks.len(), 2);
    assert_eq!(
        blocks[0].kind,
        BlockKind::CodeBlock {
            language: Some("js".into()),
            code: "  let x;".into(),
        }
    );
}

#[test]
fn test_parse_unclosed_code_block() {
    let result = Parser::new().parse_with_diagnostics("text\n\n```\na\n# b");
    let blocks = &result.document.blocks;
    assert_eq!(blocks.len(), 2);
    assert_eq!(
        blocks[1].kind,
        BlockKind::CodeBlock {
            language: None,
            code: "a\n# b".into(),
        }
    );
    assert_eq!(
        result.diagnostics.count(DiagnosticKind::UnclosedCodeFence),
        1
    );
}

// ============================================================================
// Tables
// ============================================================================

#[test]
fn test_parse_table_with_separator() {
    let blocks = parse("| A | B |\n|---|---|\n| 1 | 2 |");
    assert_eq!(
        blocks[0].kind,
        BlockKind::Table {
            headers: vec!["A".into(), "B".into()],
            rows: vec![vec!["1".into(), "2".into()]],
        }
    );
}

#[test]
fn test_parse_table_rows_are_not_padded() {
    let blocks = parse("| A | B | C |\n|:-|:-:|-:|\n| 1 |\n| 1 | 2 | 3 | 4 |");
    match &blocks[0].kind {
        BlockKind::Table { headers, rows } => {
            assert_eq!(headers.len(), 3);
            assert_eq!(rows[0].len(), 1);
            assert_eq!(rows[1].len(), 4);
        }
        other => panic!("expected table, got {other:?}"),
    }
}

#[test]
fn test_parse_table_cells_keep_markup() {
    let blocks = parse("| **Name** | `id` |\n| x | y |");
    match &blocks[0].kind {
        BlockKind::Table { headers, .. } => assert_eq!(headers, &["**Name**", "`id`"]),
        other => panic!("expected table, got {other:?}"),
    }
}

#[test]
fn test_parse_single_table_line_is_paragraph() {
    let result = Parser::new().parse_with_diagnostics("| a | b |");
    assert_eq!(
        result.document.blocks[0].kind,
        BlockKind::Paragraph {
            text: plain("| a | b |"),
        }
    );
    assert_eq!(result.diagnostics.count(DiagnosticKind::TableTooShort), 1);
}

#[test]
fn test_parse_table_ends_at_blank_line() {
    let blocks = parse("| a |\n| b |\n\n| c |\n| d |");
    assert_eq!(blocks.len(), 2);
    assert!(blocks.iter().all(|b| b.name() == "table"));
}

// ============================================================================
// Lists, quotes, rules
// ============================================================================

#[test]
fn test_parse_bullet_list() {
    let blocks = parse("- one\n- *two*\n• three");
    assert_eq!(
        blocks[0].kind,
        BlockKind::BulletList {
            items: vec![
                plain("one"),
                StyledText::from_runs(vec![Run::new("two", Style::italic())]),
                plain("three"),
            ],
        }
    );
}

#[test]
fn test_parse_numbered_list_renumbers() {
    let blocks = parse("5. foo\n9. bar");
    match &blocks[0].kind {
        BlockKind::NumberedList { items } => {
            let rendered: Vec<String> = items
                .iter()
                .enumerate()
                .map(|(i, item)| format!("{} {}", numbered_marker(i), item.plain_text()))
                .collect();
            assert_eq!(rendered, ["1. foo", "2. bar"]);
        }
        other => panic!("expected numbered list, got {other:?}"),
    }
}

#[test]
fn test_parse_list_kinds_do_not_merge() {
    let blocks = parse("- a\n1. b\n- c");
    let names: Vec<_> = blocks.iter().map(|b| b.name()).collect();
    assert_eq!(names, ["bullet_list", "numbered_list", "bullet_list"]);
}

#[test]
fn test_parse_blockquote_multi_line() {
    let blocks = parse("> line one\n> line two");
    assert_eq!(blocks.len(), 1);
    assert_eq!(
        blocks[0].kind,
        BlockKind::Blockquote {
            text: plain("line one\nline two"),
        }
    );
}

#[test]
fn test_parse_blockquote_empty_line_inside() {
    let blocks = parse("> a\n>\n> b");
    match &blocks[0].kind {
        BlockKind::Blockquote { text } => assert_eq!(text.plain_text(), "a\n\nb"),
        other => panic!("expected blockquote, got {other:?}"),
    }
}

#[test]
fn test_parse_horizontal_rules() {
    let blocks = parse("---\n\n***\n\n_ _ _");
    assert!(blocks
        .iter()
        .all(|b| b.kind == BlockKind::HorizontalRule));
    assert_eq!(blocks.len(), 3);
}

// ============================================================================
// Paragraphs
// ============================================================================

#[test]
fn test_parse_paragraph_joins_lines() {
    let blocks = parse("first line\n  second line  \nthird");
    assert_eq!(
        blocks[0].kind,
        BlockKind::Paragraph {
            text: plain("first line second line third"),
        }
    );
}

#[test]
fn test_parse_paragraph_hard_stop() {
    let blocks = parse("plain text\n# Header");
    assert_eq!(blocks.len(), 2);
    assert_eq!(
        blocks[0].kind,
        BlockKind::Paragraph {
            text: plain("plain text"),
        }
    );
    assert_eq!(blocks[1].name(), "header");
}

#[test]
fn test_parse_paragraph_inline_across_lines() {
    let blocks = parse("a **bold\nstatement** here");
    match &blocks[0].kind {
        BlockKind::Paragraph { text } => {
            assert_eq!(text.plain_text(), "a bold statement here");
            assert!(text.runs()[1].style.bold);
        }
        other => panic!("expected paragraph, got {other:?}"),
    }
}

#[test]
fn test_parse_links_surface_urls() {
    let blocks = parse("See [the docs](https://docs.rs) and [crates](https://crates.io).");
    match &blocks[0].kind {
        BlockKind::Paragraph { text } => {
            let links: Vec<_> = text.links().collect();
            assert_eq!(
                links,
                [("the docs", "https://docs.rs"), ("crates", "https://crates.io")]
            );
            let opened = text.activate_link(5, &|url: &str| url.starts_with("https://"));
            assert!(opened);
        }
        other => panic!("expected paragraph, got {other:?}"),
    }
}

// ============================================================================
// Whole messages
// ============================================================================

#[test]
fn test_parse_assistant_reply() {
    let input = "\
## Summary

Here is what changed:

- Added **retry** logic
- Fixed `timeout` handling

| Step | Status |
|------|--------|
| build | ok |
| test | ok |

> Note: run it twice.

```bash
cargo test
```

---
1. Review
2. Merge";

    let blocks = parse(input);
    let names: Vec<_> = blocks.iter().map(|b| b.name()).collect();
    assert_eq!(
        names,
        [
            "header",
            "paragraph",
            "bullet_list",
            "table",
            "blockquote",
            "code_block",
            "horizontal_rule",
            "numbered_list",
        ]
    );
}

#[test]
fn test_parse_crlf_message() {
    let blocks = parse("# Title\r\n\r\n- a\r\n- b\r\n");
    assert_eq!(blocks.len(), 2);
    assert_eq!(
        blocks[1].kind,
        BlockKind::BulletList {
            items: vec![plain("a"), plain("b")],
        }
    );
}

#[test]
fn test_document_line_count_and_span() {
    let input = "a\n\nb\n";
    let doc = Parser::new().parse(input);
    assert_eq!(doc.line_count, 3);
    assert_eq!(doc.span.len() as usize, input.len());
}

// ============================================================================
// Citations
// ============================================================================

#[test]
fn test_citations_render_next_to_blocks() {
    let blocks = parse("Answer with a source.");
    let mut footer = CitationFooter::new(vec![
        Citation::new("1", "Rust Book").with_url("https://doc.rust-lang.org/book/"),
        Citation::new("2", "Blog").with_domain("blog.example"),
    ]);

    assert_eq!(blocks.len(), 1);
    assert_eq!(footer.summary(), "2 sources");
    footer.toggle();
    let domains: Vec<_> = footer.visible_entries().map(|e| e.domain).collect();
    assert_eq!(domains, ["doc.rust-lang.org", "blog.example"]);
}
