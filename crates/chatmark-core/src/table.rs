//! Pipe-table row splitting.

/// Split a pipe-delimited row into trimmed cells.
///
/// Pieces that are empty (edge pipes) or pure alignment markers (`---`,
/// `:--:`) are dropped. Cell counts are not normalized across rows.
///
/// ```rust
/// use chatmark_core::table::split_row;
///
/// assert_eq!(split_row("| a | b |"), ["a", "b"]);
/// assert_eq!(split_row("|:--|--:|"), Vec::<&str>::new());
/// ```
pub fn split_row(line: &str) -> Vec<&str> {
    line.split('|')
        .map(str::trim)
        .filter(|piece| !piece.is_empty() && !is_alignment_marker(piece))
        .collect()
}

/// True if a row is a header separator like `|---|:--:|`.
///
/// Every non-empty piece must be an alignment marker, and there must be
/// at least one.
pub fn is_separator_row(line: &str) -> bool {
    let mut pieces = line
        .split('|')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .peekable();
    pieces.peek().is_some() && pieces.all(is_alignment_marker)
}

#[inline]
fn is_alignment_marker(piece: &str) -> bool {
    piece.bytes().all(|b| b == b'-' || b == b':')
}
