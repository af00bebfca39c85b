//! Inline formatter: raw text to [`StyledText`].
//!
//! Single pass, left to right, no nesting. Delimiter scanning is
//! SIMD-accelerated through `memchr`, and every run borrows from the input.
//! Unmatched markup stays in the text literally.
//!
//! Closer searches are memoized per delimiter, so a line full of unmatched
//! openers is still formatted in linear time.
//!
//! Recognized: `**bold**`, `*italic*`, `_italic_`, `***bold italic***`,
//! `~~strikethrough~~`, `` `code` `` (any backtick run length) and
//! `[label](url)`.

use memchr::{memchr, memchr2, memchr3};

use crate::ast::{Run, Style, StyledText};

/// Format one logical unit of text.
///
/// Never fails: text with no recognized markup comes back as a single
/// unstyled run, and empty text as no runs. Whitespace is preserved.
///
/// ```rust
/// use chatmark_core::format_inline;
///
/// let text = format_inline("a **b** c");
/// assert_eq!(text.runs().len(), 3);
/// assert!(text.runs()[1].style.bold);
/// ```
#[inline]
pub fn format_inline(text: &str) -> StyledText<'_> {
    if text.is_empty() {
        return StyledText::default();
    }

    InlineFormatter::new(text).format()
}

/// Closing delimiters with a memoized search.
#[derive(Debug, Clone, Copy)]
enum Closer {
    BoldItalic,
    Bold,
    Strike,
    Star,
    Underscore,
    Paren,
}

const CLOSER_KINDS: usize = 6;

/// Result of the last closer search for one delimiter.
///
/// Which positions qualify as closers does not depend on the opener, so
/// the first closer at or after `from` is also the first one at or after
/// any later position up to `found`.
#[derive(Debug, Clone, Copy)]
struct ScanMemo {
    from: usize,
    found: Option<usize>,
}

impl ScanMemo {
    #[inline]
    fn lookup(self, from: usize) -> Option<Option<usize>> {
        let covers = self.from <= from && self.found.map_or(true, |at| at >= from);
        covers.then_some(self.found)
    }
}

struct InlineFormatter<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    /// Start of the pending unstyled text.
    text_start: usize,
    /// Next `*`, `` ` `` or `[` at or after `pos`, or the text length.
    next_common: usize,
    /// Next `_` or `~` at or after `pos`, or the text length.
    next_rare: usize,
    memo: [Option<ScanMemo>; CLOSER_KINDS],
    runs: Vec<Run<'a>>,
}

impl<'a> InlineFormatter<'a> {
    #[inline]
    fn new(text: &'a str) -> Self {
        let bytes = text.as_bytes();
        Self {
            text,
            bytes,
            pos: 0,
            text_start: 0,
            next_common: memchr3(b'*', b'`', b'[', bytes).unwrap_or(bytes.len()),
            next_rare: memchr2(b'_', b'~', bytes).unwrap_or(bytes.len()),
            memo: [None; CLOSER_KINDS],
            runs: Vec::with_capacity(4),
        }
    }

    fn format(mut self) -> StyledText<'a> {
        while self.pos < self.bytes.len() {
            let next_special = self.find_next_special();
            if next_special >= self.bytes.len() {
                break;
            }

            self.pos = next_special;
            let matched = match self.bytes[self.pos] {
                b'`' => self.try_code_span(),
                b'*' => self.try_asterisk(),
                b'_' => self.try_underscore(),
                b'~' => self.try_strikethrough(),
                b'[' => self.try_link(),
                _ => false,
            };

            if !matched {
                self.pos += 1;
            }
        }

        if self.text_start < self.bytes.len() {
            self.runs.push(Run::plain(&self.text[self.text_start..]));
        }

        StyledText::from_runs(self.runs)
    }

    /// Cached positions are only rescanned once `pos` has passed them.
    #[inline(always)]
    fn find_next_special(&mut self) -> usize {
        let len = self.bytes.len();
        if self.next_common < self.pos {
            self.next_common = memchr3(b'*', b'`', b'[', &self.bytes[self.pos..])
                .map_or(len, |offset| self.pos + offset);
        }
        if self.next_rare < self.pos {
            self.next_rare = memchr2(b'_', b'~', &self.bytes[self.pos..])
                .map_or(len, |offset| self.pos + offset);
        }

        self.next_common.min(self.next_rare)
    }

    /// Flush pending text, push a styled run, and continue after `end`.
    #[inline]
    fn emit(&mut self, start: usize, end: usize, content: &'a str, style: Style<'a>) {
        if self.text_start < start {
            self.runs
                .push(Run::plain(&self.text[self.text_start..start]));
        }
        self.runs.push(Run::new(content, style));
        self.pos = end;
        self.text_start = end;
    }

    /// Code span closed by a backtick run of the same length as the opener.
    fn try_code_span(&mut self) -> bool {
        let start = self.pos;
        if start > 0 && self.bytes[start - 1] == b'`' {
            return false;
        }

        let ticks = self.run_length(start, b'`');
        let content_start = start + ticks;

        let mut search = content_start;
        while let Some(offset) = memchr(b'`', &self.bytes[search..]) {
            let at = search + offset;
            let run = self.run_length(at, b'`');
            if run == ticks {
                let content = trim_code_padding(&self.text[content_start..at]);
                self.emit(start, at + run, content, Style::code());
                return true;
            }
            search = at + run;
        }

        false
    }

    fn try_asterisk(&mut self) -> bool {
        let start = self.pos;
        let run = self.run_length(start, b'*');

        if run >= 3 {
            let style = Style {
                bold: true,
                italic: true,
                ..Style::default()
            };
            if self.try_delimited(start, Closer::BoldItalic, 3, style) {
                return true;
            }
        }
        if run >= 2 && self.try_delimited(start, Closer::Bold, 2, Style::bold()) {
            return true;
        }
        run == 1 && self.try_single(start)
    }

    fn try_strikethrough(&mut self) -> bool {
        let start = self.pos;
        self.bytes[start..].starts_with(b"~~")
            && self.try_delimited(start, Closer::Strike, 2, Style::strikethrough())
    }

    /// `_italic_`, only at word boundaries so `snake_case` stays literal.
    fn try_underscore(&mut self) -> bool {
        let start = self.pos;
        let preceded_by_word = self.text[..start]
            .chars()
            .next_back()
            .is_some_and(char::is_alphanumeric);
        if preceded_by_word {
            return false;
        }

        let content_start = start + 1;
        if !self.opens_content(content_start, b'_') {
            return false;
        }

        match self.closer_from(Closer::Underscore, content_start) {
            Some(at) => {
                let content = &self.text[content_start..at];
                self.emit(start, at + 1, content, Style::italic());
                true
            }
            None => false,
        }
    }

    fn try_link(&mut self) -> bool {
        let start = self.pos;
        let label_start = start + 1;

        let close_bracket = match memchr2(b']', b'[', &self.bytes[label_start..]) {
            Some(offset) if self.bytes[label_start + offset] == b']' => label_start + offset,
            _ => return false,
        };
        if self.bytes.get(close_bracket + 1) != Some(&b'(') {
            return false;
        }

        let url_start = close_bracket + 2;
        let Some(close_paren) = self.closer_from(Closer::Paren, url_start) else {
            return false;
        };

        let label = &self.text[label_start..close_bracket];
        let url = self.text[url_start..close_paren].trim();
        if label.trim().is_empty() || url.is_empty() || url.contains(char::is_whitespace) {
            return false;
        }

        self.emit(start, close_paren + 1, label, Style::link(url));
        true
    }

    /// Paired delimiter like `**` or `~~` starting at `start`.
    fn try_delimited(
        &mut self,
        start: usize,
        closer: Closer,
        width: usize,
        style: Style<'a>,
    ) -> bool {
        let content_start = start + width;
        if !self.opens_content(content_start, self.bytes[start]) {
            return false;
        }

        match self.closer_from(closer, content_start) {
            Some(close) => {
                let content = &self.text[content_start..close];
                self.emit(start, close + width, content, style);
                true
            }
            None => false,
        }
    }

    /// Single `*` whose closer is not part of a `**` pair.
    fn try_single(&mut self, start: usize) -> bool {
        let content_start = start + 1;
        if !self.opens_content(content_start, b'*') {
            return false;
        }

        match self.closer_from(Closer::Star, content_start) {
            Some(at) => {
                let content = &self.text[content_start..at];
                self.emit(start, at + 1, content, Style::italic());
                true
            }
            None => false,
        }
    }

    /// First closer at or after `from`, reusing the previous search for
    /// the same delimiter when it still applies.
    ///
    /// Callers check `opens_content` first, so no closer can sit at `from`
    /// itself except for `)`.
    fn closer_from(&mut self, closer: Closer, from: usize) -> Option<usize> {
        let slot = closer as usize;
        if let Some(found) = self.memo[slot].and_then(|memo| memo.lookup(from)) {
            return found;
        }

        let found = match closer {
            Closer::BoldItalic => self.scan_pair(from, b"***"),
            Closer::Bold => self.scan_pair(from, b"**"),
            Closer::Strike => self.scan_pair(from, b"~~"),
            Closer::Star => self.scan_star(from),
            Closer::Underscore => self.scan_underscore(from),
            Closer::Paren => memchr(b')', &self.bytes[from..]).map(|offset| from + offset),
        };
        self.memo[slot] = Some(ScanMemo { from, found });
        found
    }

    /// `delim` not preceded by whitespace.
    fn scan_pair(&self, from: usize, delim: &[u8]) -> Option<usize> {
        let mut search = from;
        while let Some(offset) = memchr(delim[0], &self.bytes[search..]) {
            let at = search + offset;
            if self.bytes[at..].starts_with(delim) && !self.bytes[at - 1].is_ascii_whitespace() {
                return Some(at);
            }
            search = at + 1;
        }

        None
    }

    /// Lone `*` not preceded by whitespace; `**` pairs are stepped over.
    fn scan_star(&self, from: usize) -> Option<usize> {
        let mut search = from;
        while let Some(offset) = memchr(b'*', &self.bytes[search..]) {
            let at = search + offset;

            if self.bytes.get(at + 1) == Some(&b'*') {
                search = at + 2;
                continue;
            }

            if !self.bytes[at - 1].is_ascii_whitespace() {
                return Some(at);
            }
            search = at + 1;
        }

        None
    }

    /// `_` not followed by a word character and not preceded by whitespace.
    fn scan_underscore(&self, from: usize) -> Option<usize> {
        let mut search = from;
        while let Some(offset) = memchr(b'_', &self.bytes[search..]) {
            let at = search + offset;
            let followed_by_word = self.text[at + 1..]
                .chars()
                .next()
                .is_some_and(char::is_alphanumeric);
            if !followed_by_word && !self.bytes[at - 1].is_ascii_whitespace() {
                return Some(at);
            }
            search = at + 1;
        }

        None
    }

    #[inline]
    fn run_length(&self, start: usize, byte: u8) -> usize {
        self.bytes[start..].iter().take_while(|&&b| b == byte).count()
    }

    #[inline(always)]
    fn opens_content(&self, content_start: usize, delim: u8) -> bool {
        match self.bytes.get(content_start) {
            Some(&b) => !b.is_ascii_whitespace() && b != delim,
            None => false,
        }
    }
}

/// One leading and one trailing space are dropped from code span content
/// when both are present and the content is not all spaces.
fn trim_code_padding(content: &str) -> &str {
    let bytes = content.as_bytes();
    let padded = bytes.len() >= 2
        && bytes[0] == b' '
        && bytes[bytes.len() - 1] == b' '
        && bytes.iter().any(|&b| b != b' ');
    if padded {
        &content[1..content.len() - 1]
    } else {
        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn runs(text: &str) -> Vec<Run<'_>> {
        format_inline(text).runs().to_vec()
    }

    #[test]
    fn plain_text_is_one_run() {
        assert_eq!(runs("just words"), vec![Run::plain("just words")]);
    }

    #[test]
    fn empty_text_has_no_runs() {
        assert!(format_inline("").is_empty());
    }

    #[test]
    fn bold_italic_code_strike_link() {
        assert_eq!(
            runs("**b** *i* `c` ~~s~~ [l](https://x.io)"),
            vec![
                Run::new("b", Style::bold()),
                Run::plain(" "),
                Run::new("i", Style::italic()),
                Run::plain(" "),
                Run::new("c", Style::code()),
                Run::plain(" "),
                Run::new("s", Style::strikethrough()),
                Run::plain(" "),
                Run::new("l", Style::link("https://x.io")),
            ]
        );
    }

    #[test]
    fn triple_asterisk_is_bold_and_italic() {
        let text = format_inline("***both***");
        let style = &text.runs()[0].style;
        assert!(style.bold && style.italic);
        assert_eq!(text.plain_text(), "both");
    }

    #[test]
    fn underscore_italic_respects_word_boundaries() {
        assert_eq!(runs("snake_case_name"), vec![Run::plain("snake_case_name")]);
        assert_eq!(
            runs("an _emphasized_ word"),
            vec![
                Run::plain("an "),
                Run::new("emphasized", Style::italic()),
                Run::plain(" word"),
            ]
        );
        assert_eq!(runs("_my_var_"), vec![Run::new("my_var", Style::italic())]);
    }

    #[test]
    fn unbalanced_markup_stays_literal() {
        assert_eq!(runs("**not closed"), vec![Run::plain("**not closed")]);
        assert_eq!(runs("2 * 3 * 4"), vec![Run::plain("2 * 3 * 4")]);
        assert_eq!(runs("a ~ b ~~"), vec![Run::plain("a ~ b ~~")]);
        assert_eq!(runs("[label](no close"), vec![Run::plain("[label](no close")]);
    }

    #[test]
    fn code_span_is_not_formatted_inside() {
        assert_eq!(
            runs("`**raw**`"),
            vec![Run::new("**raw**", Style::code())]
        );
    }

    #[test]
    fn spans_do_not_nest() {
        assert_eq!(
            runs("**a *b* c**"),
            vec![Run::new("a *b* c", Style::bold())]
        );
    }

    #[test]
    fn italic_skips_doubled_asterisks() {
        assert_eq!(
            runs("*a **b** c*"),
            vec![Run::new("a **b** c", Style::italic())]
        );
    }

    #[test]
    fn whitespace_is_preserved() {
        assert_eq!(
            runs("a    **b**   c"),
            vec![
                Run::plain("a    "),
                Run::new("b", Style::bold()),
                Run::plain("   c"),
            ]
        );
    }

    #[test]
    fn link_label_is_literal_and_url_trimmed() {
        assert_eq!(
            runs("[**x**]( https://a.b/c )"),
            vec![Run::new("**x**", Style::link("https://a.b/c"))]
        );
    }

    #[test]
    fn nested_bracket_picks_inner_link() {
        assert_eq!(
            runs("[a [b](c)"),
            vec![Run::plain("[a "), Run::new("b", Style::link("c"))]
        );
    }

    #[test]
    fn multibyte_text_around_markup() {
        assert_eq!(
            runs("héllo **wörld** ✓"),
            vec![
                Run::plain("héllo "),
                Run::new("wörld", Style::bold()),
                Run::plain(" ✓"),
            ]
        );
    }

    #[test]
    fn newlines_inside_quote_text_are_kept() {
        assert_eq!(format_inline("one\ntwo").plain_text(), "one\ntwo");
    }

    #[test]
    fn code_span_closes_on_matching_backtick_run() {
        assert_eq!(runs("``code``"), vec![Run::new("code", Style::code())]);
        assert_eq!(
            runs("`` a `b` c ``"),
            vec![Run::new("a `b` c", Style::code())]
        );
        assert_eq!(
            runs("x ``y` z"),
            vec![Run::plain("x ``y` z")]
        );
        assert_eq!(runs("` `"), vec![Run::new(" ", Style::code())]);
    }

    #[test]
    fn rejected_link_does_not_hide_a_later_one() {
        assert_eq!(
            runs("[a](x [b](y)"),
            vec![Run::plain("[a](x "), Run::new("b", Style::link("y"))]
        );
        assert_eq!(
            runs("[a](x y) [b](z)"),
            vec![Run::plain("[a](x y) "), Run::new("b", Style::link("z"))]
        );
    }

    #[test]
    fn unmatched_openers_before_a_real_span() {
        assert_eq!(
            runs("*a *b *c **d**"),
            vec![Run::plain("*a *b *c "), Run::new("d", Style::bold())]
        );
        assert_eq!(
            runs("a_ b_ _c_"),
            vec![Run::plain("a_ b_ "), Run::new("c", Style::italic())]
        );
    }

    #[test]
    fn long_unmatched_markup_formats_quickly() {
        let inputs = [
            "*a ".repeat(70_000),
            "[a](".repeat(50_000),
            "a_ ".repeat(70_000),
            "~~a ".repeat(50_000),
            "**a ".repeat(50_000),
        ];

        for input in &inputs {
            let started = std::time::Instant::now();
            let text = format_inline(input);
            let elapsed = started.elapsed();

            assert_eq!(text.plain_text(), input.as_str());
            assert!(
                elapsed.as_secs() < 2,
                "formatting {} bytes took {elapsed:?}",
                input.len()
            );
        }
    }
}
