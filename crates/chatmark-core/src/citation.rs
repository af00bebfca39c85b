//! Citations and the collapsible footer that lists them.
//!
//! Citations travel next to the block list, never inside it. The parser
//! does not read or modify them; this module only derives what a footer
//! shows for each one.

use std::borrow::Cow;

/// Label used when neither a domain nor a parsable url is available.
pub const FALLBACK_DOMAIN: &str = "Source";

/// An externally supplied source reference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Citation {
    pub id: String,
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub url: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub domain: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub snippet: Option<String>,
}

impl Citation {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    /// Domain label: the explicit domain, else the host of the url, else
    /// `"Source"`.
    ///
    /// ```rust
    /// use chatmark_core::Citation;
    ///
    /// let cite = Citation::new("1", "Docs").with_url("https://www.rust-lang.org/learn");
    /// assert_eq!(cite.display_domain(), "rust-lang.org");
    /// assert_eq!(Citation::new("2", "Note").display_domain(), "Source");
    /// ```
    pub fn display_domain(&self) -> Cow<'_, str> {
        let explicit = self
            .domain
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        match explicit.or_else(|| self.url.as_deref().and_then(host_of)) {
            Some(domain) => Cow::Borrowed(domain),
            None => Cow::Borrowed(FALLBACK_DOMAIN),
        }
    }
}

/// Host part of an absolute url, without userinfo, port, or leading `www.`.
///
/// Returns `None` for relative urls and urls with an empty host.
pub fn host_of(url: &str) -> Option<&str> {
    let (_, rest) = url.trim().split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let authority = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);

    let host = match authority.strip_prefix('[') {
        Some(bracketed) => bracketed.split(']').next().unwrap_or_default(),
        None => authority.split(':').next().unwrap_or_default(),
    };
    let host = host.strip_prefix("www.").unwrap_or(host);

    (!host.is_empty()).then_some(host)
}

/// One footer row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FooterEntry<'c> {
    /// Citation id, shown as a badge.
    pub badge: &'c str,
    pub title: &'c str,
    pub domain: Cow<'c, str>,
    pub url: Option<&'c str>,
}

/// Citation list rendered below a message, collapsed by default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitationFooter {
    citations: Vec<Citation>,
    expanded: bool,
}

impl CitationFooter {
    pub fn new(citations: Vec<Citation>) -> Self {
        Self {
            citations,
            expanded: false,
        }
    }

    /// Start expanded or collapsed.
    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    #[inline]
    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    #[inline]
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Flip between collapsed and expanded; returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.expanded = !self.expanded;
        self.expanded
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.citations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
    }

    /// One entry per citation, in order, regardless of state.
    pub fn entries(&self) -> impl Iterator<Item = FooterEntry<'_>> {
        self.citations.iter().map(|cite| FooterEntry {
            badge: &cite.id,
            title: &cite.title,
            domain: cite.display_domain(),
            url: cite.url.as_deref(),
        })
    }

    /// Entries to draw: all of them when expanded, none when collapsed.
    pub fn visible_entries(&self) -> impl Iterator<Item = FooterEntry<'_>> {
        let take = if self.expanded { self.citations.len() } else { 0 };
        self.entries().take(take)
    }

    /// Collapsed header label, e.g. `"3 sources"`.
    pub fn summary(&self) -> String {
        match self.citations.len() {
            1 => "1 source".to_string(),
            n => format!("{n} sources"),
        }
    }
}
