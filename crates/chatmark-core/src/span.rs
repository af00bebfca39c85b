//! Source location tracking for blocks and diagnostics.
//!
//! Every block records both a byte `Span` and the `LineRange` of lines it
//! consumed, so consumers can map blocks back to the message source.

/// A byte range in the source text.
///
/// Spans use byte offsets (not character offsets) for efficiency.
/// Both `start` and `end` are inclusive-exclusive: `[start, end)`.
///
/// Offsets are `u32`, so inputs are addressable up to 4 GiB. Offsets past
/// that are clamped to `u32::MAX` by [`Span::from_offsets`].
///
/// # Example
///
/// ```rust
/// use chatmark_core::span::Span;
///
/// let span = Span::new(0, 10);
/// assert_eq!(span.len(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Span {
    /// Starting byte offset (inclusive).
    pub start: u32,
    /// Ending byte offset (exclusive).
    pub end: u32,
}

impl Span {
    /// Create a new span from byte offsets.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Create a span from `usize` byte offsets, clamping each to `u32::MAX`.
    #[inline]
    pub fn from_offsets(start: usize, end: usize) -> Self {
        let clamp = |offset: usize| u32::try_from(offset).unwrap_or(u32::MAX);
        Self::new(clamp(start), clamp(end))
    }

    /// Get the length of this span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Check if this span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check if this span contains a byte offset.
    #[inline]
    pub const fn contains(&self, offset: u32) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Merge two spans into one covering both.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Slice the source text covered by this span.
    #[inline]
    pub fn slice(self, input: &str) -> &str {
        input
            .get(self.start as usize..self.end as usize)
            .unwrap_or_default()
    }
}

/// A half-open range of zero-based line indices: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LineRange {
    /// First line consumed (inclusive).
    pub start: usize,
    /// One past the last line consumed.
    pub end: usize,
}

impl LineRange {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of lines in the range.
    #[inline]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    #[inline]
    pub const fn contains(&self, line: usize) -> bool {
        line >= self.start && line < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_merge_covers_both() {
        let merged = Span::new(4, 8).merge(Span::new(1, 5));
        assert_eq!(merged, Span::new(1, 8));
    }

    #[test]
    fn span_from_offsets_clamps_past_u32() {
        assert_eq!(Span::from_offsets(3, 8), Span::new(3, 8));

        assert_eq!(Span::from_offsets(5, usize::MAX), Span::new(5, u32::MAX));
    }

    #[test]
    fn span_slice_out_of_bounds_is_empty() {
        assert_eq!(Span::new(2, 40).slice("short"), "");
        assert_eq!(Span::new(0, 5).slice("short"), "short");
    }

    #[test]
    fn line_range_contains() {
        let range = LineRange::new(2, 4);
        assert_eq!(range.len(), 2);
        assert!(range.contains(3));
        assert!(!range.contains(4));
    }
}
