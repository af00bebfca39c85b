//! chatmark - Parse and check chat message markdown
//!
//! Usage:
//!   chatmark [OPTIONS] <COMMAND> [FILE]
//!
//! Commands:
//!   parse     Parse and display block structure
//!   stats     Show block statistics
//!   check     Report degraded markup

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use chatmark_core::{
    numbered_marker, Block, BlockKind, Citation, CitationFooter, Diagnostic, Document,
    FooterEntry, ParseResult, Parser as MessageParser, Run, StyledText,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;

#[derive(Parser)]
#[command(name = "chatmark", version)]
#[command(about = "Parse chat message markdown into typed blocks")]
struct Cli {
    /// Show detailed block structure and debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse and display block structure
    Parse {
        #[command(flatten)]
        input: InputArgs,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,

        /// JSON array of citations to show below the message
        #[arg(long, value_name = "FILE")]
        citations: Option<PathBuf>,

        /// Show the citation footer expanded
        #[arg(long, requires = "citations")]
        expand_citations: bool,
    },
    /// Show block statistics
    Stats {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Report degraded markup; exits non-zero if any is found
    Check {
        #[command(flatten)]
        input: InputArgs,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Message file, or `-` for stdin
    #[arg(default_value = "-")]
    file: String,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read '{path}': {source}")]
    ReadInput { path: String, source: io::Error },

    #[error("failed to read citations '{}': {source}", path.display())]
    ReadCitations { path: PathBuf, source: io::Error },

    #[error("malformed citations '{}': {source}", path.display())]
    ParseCitations {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} diagnostic(s) found")]
    Degraded(usize),
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let parser = MessageParser::new();

    match &cli.command {
        Command::Parse {
            input,
            json,
            citations,
            expand_citations,
        } => {
            let text = read_input(&input.file)?;
            let footer = match citations {
                Some(path) => {
                    Some(CitationFooter::new(read_citations(path)?).with_expanded(*expand_citations))
                }
                None => None,
            };
            cmd_parse(&parser, &text, footer.as_ref(), *json, cli.verbose)
        }
        Command::Stats { input } => {
            let text = read_input(&input.file)?;
            cmd_stats(&parser, &text);
            Ok(())
        }
        Command::Check { input, json } => {
            let text = read_input(&input.file)?;
            cmd_check(&parser, &text, *json)
        }
    }
}

fn read_input(path: &str) -> Result<String, CliError> {
    let result = if path == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map(|_| text)
    } else {
        fs::read_to_string(path)
    };

    result.map_err(|source| CliError::ReadInput {
        path: path.to_string(),
        source,
    })
}

fn read_citations(path: &Path) -> Result<Vec<Citation>, CliError> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::ReadCitations {
        path: path.to_path_buf(),
        source,
    })?;

    let citations: Vec<Citation> =
        serde_json::from_str(&raw).map_err(|source| CliError::ParseCitations {
            path: path.to_path_buf(),
            source,
        })?;
    log::debug!("loaded {} citation(s) from {}", citations.len(), path.display());
    Ok(citations)
}

// =============================================================================
// Parse Command
// =============================================================================

fn cmd_parse(
    parser: &MessageParser,
    input: &str,
    footer: Option<&CitationFooter>,
    json: bool,
    verbose: bool,
) -> Result<(), CliError> {
    let result = parser.parse_with_diagnostics(input);

    for diagnostic in result.diagnostics.iter() {
        eprintln!("warning: {diagnostic}");
    }

    if json {
        print_json(&result, footer)?;
    } else if verbose {
        print_document_verbose(&result.document);
        if let Some(footer) = footer {
            print_footer(footer);
        }
    } else {
        print_document_summary(&result.document);
        if let Some(footer) = footer {
            print_footer(footer);
        }
    }

    Ok(())
}

// =============================================================================
// Check Command
// =============================================================================

fn cmd_check(parser: &MessageParser, input: &str, json: bool) -> Result<(), CliError> {
    let result = parser.parse_with_diagnostics(input);
    let diagnostics = result.diagnostics.as_slice();

    if json {
        let report = JsonCheck {
            clean: diagnostics.is_empty(),
            diagnostics,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if diagnostics.is_empty() {
        println!("Clean: no degraded markup");
    } else {
        println!("Degraded: {} diagnostic(s)", diagnostics.len());
        for diagnostic in diagnostics {
            println!("  - [{}] {}", diagnostic.kind.as_str(), diagnostic);
        }
    }

    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(CliError::Degraded(diagnostics.len()))
    }
}

// =============================================================================
// Stats Command
// =============================================================================

fn cmd_stats(parser: &MessageParser, input: &str) {
    let result = parser.parse_with_diagnostics(input);
    let stats = MessageStats::from_document(&result.document, input);

    println!("Message Statistics");
    println!("------------------");
    println!("Blocks:");
    println!("  Total:            {}", stats.total_blocks);
    println!("  Headers:          {}", stats.headers);
    println!("  Paragraphs:       {}", stats.paragraphs);
    println!("  Code blocks:      {}", stats.code_blocks);
    println!("  Tables:           {}", stats.tables);
    println!("  Bullet lists:     {}", stats.bullet_lists);
    println!("  Numbered lists:   {}", stats.numbered_lists);
    println!("  Blockquotes:      {}", stats.blockquotes);
    println!("  Rules:            {}", stats.rules);
    println!();
    println!("Inline:");
    println!("  List items:       {}", stats.list_items);
    println!("  Links:            {}", stats.links);
    println!();
    println!("Size:");
    println!("  Bytes:            {}", stats.bytes);
    println!("  Words (est.):     {}", stats.words);
    println!("  Lines:            {}", result.document.line_count);
    println!();
    println!("Diagnostics:      {}", result.diagnostics.len());
}

#[derive(Default)]
struct MessageStats {
    total_blocks: usize,
    headers: usize,
    paragraphs: usize,
    code_blocks: usize,
    tables: usize,
    bullet_lists: usize,
    numbered_lists: usize,
    blockquotes: usize,
    rules: usize,
    list_items: usize,
    links: usize,
    bytes: usize,
    words: usize,
}

impl MessageStats {
    fn from_document(doc: &Document, input: &str) -> Self {
        let mut stats = Self {
            bytes: input.len(),
            words: input.split_whitespace().count(),
            ..Self::default()
        };

        for block in &doc.blocks {
            stats.count_block(block);
        }
        stats
    }

    fn count_block(&mut self, block: &Block) {
        self.total_blocks += 1;
        match &block.kind {
            BlockKind::Paragraph { text } => {
                self.paragraphs += 1;
                self.links += text.links().count();
            }
            BlockKind::Header { text, .. } => {
                self.headers += 1;
                self.links += text.links().count();
            }
            BlockKind::CodeBlock { .. } => self.code_blocks += 1,
            BlockKind::Table { .. } => self.tables += 1,
            BlockKind::BulletList { items } => {
                self.bullet_lists += 1;
                self.count_items(items);
            }
            BlockKind::NumberedList { items } => {
                self.numbered_lists += 1;
                self.count_items(items);
            }
            BlockKind::Blockquote { text } => {
                self.blockquotes += 1;
                self.links += text.links().count();
            }
            BlockKind::HorizontalRule => self.rules += 1,
        }
    }

    fn count_items(&mut self, items: &[StyledText]) {
        self.list_items += items.len();
        self.links += items.iter().map(|item| item.links().count()).sum::<usize>();
    }
}

// =============================================================================
// JSON Output
// =============================================================================

#[derive(Serialize)]
struct JsonMessage<'a> {
    line_count: usize,
    blocks: &'a [Block<'a>],
    #[serde(skip_serializing_if = "<[Diagnostic]>::is_empty")]
    diagnostics: &'a [Diagnostic],
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<JsonFooter<'a>>,
}

#[derive(Serialize)]
struct JsonFooter<'a> {
    summary: String,
    expanded: bool,
    entries: Vec<FooterEntry<'a>>,
    citations: &'a [Citation],
}

#[derive(Serialize)]
struct JsonCheck<'a> {
    clean: bool,
    diagnostics: &'a [Diagnostic],
}

fn print_json(result: &ParseResult, footer: Option<&CitationFooter>) -> Result<(), CliError> {
    let message = JsonMessage {
        line_count: result.document.line_count,
        blocks: &result.document.blocks,
        diagnostics: result.diagnostics.as_slice(),
        footer: footer.map(|footer| JsonFooter {
            summary: footer.summary(),
            expanded: footer.is_expanded(),
            entries: footer.entries().collect(),
            citations: footer.citations(),
        }),
    };
    println!("{}", serde_json::to_string_pretty(&message)?);
    Ok(())
}

// =============================================================================
// Text Output
// =============================================================================

fn print_document_summary(doc: &Document) {
    println!("Blocks: {}", doc.blocks.len());
    for (i, block) in doc.blocks.iter().enumerate() {
        println!("  [{}] {}", i + 1, describe_block(block));
    }
}

fn print_document_verbose(doc: &Document) {
    println!("=== Message Blocks ===");
    println!();
    println!("Lines: {}", doc.line_count);
    println!("Span: {}..{}", doc.span.start, doc.span.end);

    for (i, block) in doc.blocks.iter().enumerate() {
        println!();
        println!("[{}] {}", i + 1, describe_block(block));
        println!(
            "  Id: {}  Lines: {}..{}  Span: {}..{}",
            block.id, block.lines.start, block.lines.end, block.span.start, block.span.end
        );
        print_block_verbose(block);
    }
}

fn describe_block(block: &Block) -> String {
    match &block.kind {
        BlockKind::Paragraph { .. } => "Paragraph".to_string(),
        BlockKind::Header { level, .. } => format!("Header (level {level})"),
        BlockKind::CodeBlock { language, .. } => match language {
            Some(lang) => format!("CodeBlock (lang: {lang})"),
            None => "CodeBlock".to_string(),
        },
        BlockKind::Table { headers, rows } => {
            format!("Table ({} columns, {} rows)", headers.len(), rows.len())
        }
        BlockKind::BulletList { items } => format!("BulletList ({} items)", items.len()),
        BlockKind::NumberedList { items } => format!("NumberedList ({} items)", items.len()),
        BlockKind::Blockquote { .. } => "Blockquote".to_string(),
        BlockKind::HorizontalRule => "HorizontalRule".to_string(),
    }
}

fn print_block_verbose(block: &Block) {
    let prefix = "  ";

    match &block.kind {
        BlockKind::Paragraph { text } | BlockKind::Header { text, .. } => {
            println!("{prefix}Content: {}", format_runs(text.runs()));
        }
        BlockKind::Blockquote { text } => {
            println!(
                "{prefix}Content: {}",
                format_runs(text.runs()).replace('\n', "\\n")
            );
        }
        BlockKind::CodeBlock { code, .. } => {
            let preview: String = code.chars().take(60).collect();
            let ellipsis = if code.chars().count() > 60 { "..." } else { "" };
            println!(
                "{prefix}Content: {}{ellipsis}",
                preview.replace('\n', "\\n")
            );
        }
        BlockKind::Table { headers, rows } => {
            println!("{prefix}Header: {}", headers.join(" | "));
            for (i, row) in rows.iter().enumerate() {
                println!("{prefix}Row {}: {}", i + 1, row.join(" | "));
            }
        }
        BlockKind::BulletList { items } => {
            for item in items {
                println!("{prefix}- {}", format_runs(item.runs()));
            }
        }
        BlockKind::NumberedList { items } => {
            for (i, item) in items.iter().enumerate() {
                println!("{prefix}{} {}", numbered_marker(i), format_runs(item.runs()));
            }
        }
        BlockKind::HorizontalRule => {}
    }
}

/// Render runs back to markup so styles are visible in plain text.
fn format_runs(runs: &[Run]) -> String {
    let mut result = String::new();
    for run in runs {
        let style = &run.style;
        let mut text = run.text.to_string();

        if style.code {
            text = format!("`{text}`");
        }
        if style.strikethrough {
            text = format!("~~{text}~~");
        }
        if style.italic {
            text = format!("*{text}*");
        }
        if style.bold {
            text = format!("**{text}**");
        }
        if let Some(url) = &style.link {
            text = format!("[{text}]({url})");
        }
        result.push_str(&text);
    }
    result
}

fn print_footer(footer: &CitationFooter) {
    if footer.is_empty() {
        return;
    }

    println!();
    let marker = if footer.is_expanded() { "v" } else { ">" };
    println!("{marker} {}", footer.summary());
    for entry in footer.visible_entries() {
        match entry.url {
            Some(url) => println!("  [{}] {} ({}) <{url}>", entry.badge, entry.title, entry.domain),
            None => println!("  [{}] {} ({})", entry.badge, entry.title, entry.domain),
        }
    }
}
