//! SegmentProtector - splits a document into protected and scannable spans
//!
//! Protected spans are copied through untouched:
//! - Fenced code blocks (``` or ~~~)
//! - Inline code: `code`
//! - Existing references: [[Target]] / ![[Embed]]
//! - Markdown links: [text](url)
//! - Bare URLs: http(s)://...
//! - Callouts: > [!type] title, plus following `>` lines
//! - Headings (# .. ######), only when heading protection is enabled
//!
//! Matchers form an ordered list. From the cursor, the earliest match wins;
//! on equal start the matcher listed first wins. One pass per document.

use regex::{Match, Regex};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

// ==================== TYPE DEFINITIONS ====================

/// Kind of protected span
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpanKind {
    FencedCode,
    InlineCode,
    WikiLink,
    MarkdownLink,
    Url,
    Callout,
    Heading,
}

/// A contiguous slice of the input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment<'a> {
    pub protected: bool,
    /// Which matcher produced a protected segment
    pub kind: Option<SpanKind>,
    /// Byte offset of `content` in the input
    pub start: usize,
    pub content: &'a str,
}

impl<'a> Segment<'a> {
    fn text(start: usize, content: &'a str) -> Self {
        Self {
            protected: false,
            kind: None,
            start,
            content,
        }
    }

    fn protected(kind: SpanKind, start: usize, content: &'a str) -> Self {
        Self {
            protected: true,
            kind: Some(kind),
            start,
            content,
        }
    }
}

// ==================== MAIN IMPLEMENTATION ====================

/// Ordered span matchers, compiled once
pub struct SegmentProtector {
    matchers: Vec<(SpanKind, Regex)>,
    single_wikilink_re: Regex,
    single_markdown_link_re: Regex,
}

impl Default for SegmentProtector {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentProtector {
    pub fn new() -> Self {
        let matchers = vec![
            // ```lang ... ``` and ~~~ ... ~~~ (lazy, may span lines)
            (SpanKind::FencedCode, Regex::new(r"(?s)```.*?```|~~~.*?~~~").unwrap()),
            // `code`, which may wrap lines but never crosses a blank line
            (SpanKind::InlineCode, Regex::new(r"`[^`\n]*(?:\n[^`\n]+)*\n?`").unwrap()),
            // [[Target]] or [[Target|Label]], with optional embed bang
            (SpanKind::WikiLink, Regex::new(r"!?\[\[[^\]]+\]\]").unwrap()),
            // [text](url) and ![alt](src)
            (SpanKind::MarkdownLink, Regex::new(r"!?\[[^\]]*\]\([^)]*\)").unwrap()),
            (SpanKind::Url, Regex::new(r"https?://[^\s]+").unwrap()),
            // > [!note]- Title, continuing over `>` lines
            (
                SpanKind::Callout,
                Regex::new(r"(?m)^>[ \t]*\[![^\]\n]+\][-+]?[^\n]*(?:\n>[^\n]*)*").unwrap(),
            ),
            (SpanKind::Heading, Regex::new(r"(?m)^#{1,6}(?:[ \t][^\n]*)?$").unwrap()),
        ];

        Self {
            matchers,
            single_wikilink_re: Regex::new(r"^!?\[\[[^\]]+\]\]$").unwrap(),
            single_markdown_link_re: Regex::new(r"^!?\[[^\]]+\]\([^)]+\)$").unwrap(),
        }
    }

    /// Process-wide instance; the matchers are immutable.
    pub fn shared() -> &'static SegmentProtector {
        static SHARED: OnceLock<SegmentProtector> = OnceLock::new();
        SHARED.get_or_init(SegmentProtector::new)
    }

    /// True when the trimmed body is exactly one reference or Markdown link.
    pub fn is_single_reference(&self, body: &str) -> bool {
        let trimmed = body.trim();
        self.single_wikilink_re.is_match(trimmed) || self.single_markdown_link_re.is_match(trimmed)
    }

    /// Partition `text` into alternating scannable and protected segments.
    ///
    /// Concatenating every segment's content in order reproduces `text`.
    pub fn protect<'a>(&self, text: &'a str, protect_headings: bool) -> Vec<Segment<'a>> {
        let active: Vec<&(SpanKind, Regex)> = self
            .matchers
            .iter()
            .filter(|(kind, _)| protect_headings || *kind != SpanKind::Heading)
            .collect();

        // Next match per matcher, refreshed only once the cursor passes it
        let mut upcoming: Vec<Option<Match<'a>>> = active.iter().map(|(_, re)| re.find(text)).collect();
        let mut segments = Vec::new();
        let mut cursor = 0;

        while cursor < text.len() {
            for (slot, (_, re)) in upcoming.iter_mut().zip(&active) {
                if matches!(slot, Some(m) if m.start() < cursor) {
                    *slot = re.find_at(text, cursor);
                }
            }

            let best = upcoming
                .iter()
                .enumerate()
                .filter_map(|(idx, m)| m.map(|m| (idx, m)))
                .filter(|(_, m)| !m.is_empty())
                .min_by_key(|(idx, m)| (m.start(), *idx));

            let Some((idx, m)) = best else {
                segments.push(Segment::text(cursor, &text[cursor..]));
                break;
            };

            if m.start() > cursor {
                segments.push(Segment::text(cursor, &text[cursor..m.start()]));
            }
            segments.push(Segment::protected(active[idx].0, m.start(), m.as_str()));
            cursor = m.end();
        }

        segments
    }
}

// ==================== TESTS ====================

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(segments: &[Segment<'_>]) -> Vec<Option<SpanKind>> {
        segments.iter().map(|s| s.kind).collect()
    }

    fn rebuild(segments: &[Segment<'_>]) -> String {
        segments.iter().map(|s| s.content).collect()
    }

    #[test]
    fn test_plain_text_is_one_segment() {
        let segments = SegmentProtector::new().protect("just words", false);
        assert_eq!(segments.len(), 1);
        assert!(!segments[0].protected);
    }

    #[test]
    fn test_empty_input_has_no_segments() {
        assert!(SegmentProtector::new().protect("", false).is_empty());
    }

    #[test]
    fn test_wikilink_and_url_protected() {
        let text = "see [[Target|Label]] and https://example.com/x?y=1 now";
        let segments = SegmentProtector::new().protect(text, false);
        assert_eq!(
            kinds(&segments),
            vec![None, Some(SpanKind::WikiLink), None, Some(SpanKind::Url), None]
        );
        assert_eq!(segments[1].content, "[[Target|Label]]");
        assert_eq!(segments[3].content, "https://example.com/x?y=1");
        assert_eq!(rebuild(&segments), text);
    }

    #[test]
    fn test_fenced_code_wins_over_inner_inline_code() {
        let text = "a\n```rust\nlet x = `y`;\n```\nb";
        let segments = SegmentProtector::new().protect(text, false);
        assert_eq!(kinds(&segments), vec![None, Some(SpanKind::FencedCode), None]);
        assert_eq!(rebuild(&segments), text);
    }

    #[test]
    fn test_inline_code_containing_reference() {
        let text = "`[[hello]]`";
        let segments = SegmentProtector::new().protect(text, false);
        assert_eq!(kinds(&segments), vec![Some(SpanKind::InlineCode)]);
    }

    #[test]
    fn test_unpaired_backtick_stops_at_blank_line() {
        let text = "it`s\n\nhello there\n\nand `x`";
        let segments = SegmentProtector::new().protect(text, false);
        assert_eq!(kinds(&segments), vec![None, Some(SpanKind::InlineCode)]);
        assert_eq!(segments[0].content, "it`s\n\nhello there\n\nand ");
        assert_eq!(segments[1].content, "`x`");
    }

    #[test]
    fn test_inline_code_may_wrap_one_line() {
        let text = "run `cargo\nbuild` now";
        let segments = SegmentProtector::new().protect(text, false);
        assert_eq!(kinds(&segments), vec![None, Some(SpanKind::InlineCode), None]);
        assert_eq!(segments[1].content, "`cargo\nbuild`");
    }

    #[test]
    fn test_markdown_link_protected() {
        let text = "read [the docs](https://docs.rs) first";
        let segments = SegmentProtector::new().protect(text, false);
        assert_eq!(segments[1].kind, Some(SpanKind::MarkdownLink));
        assert_eq!(segments[1].content, "[the docs](https://docs.rs)");
    }

    #[test]
    fn test_callout_block_protected() {
        let text = "intro\n> [!note]- Custom title\n> body line\n> more\nafter";
        let segments = SegmentProtector::new().protect(text, false);
        assert_eq!(kinds(&segments), vec![None, Some(SpanKind::Callout), None]);
        assert_eq!(segments[1].content, "> [!note]- Custom title\n> body line\n> more");
        assert_eq!(segments[2].content, "\nafter");
    }

    #[test]
    fn test_plain_blockquote_not_protected() {
        let segments = SegmentProtector::new().protect("> just a quote", false);
        assert_eq!(kinds(&segments), vec![None]);
    }

    #[test]
    fn test_headings_only_protected_when_enabled() {
        let text = "# Title\nbody";
        let protector = SegmentProtector::new();
        assert_eq!(kinds(&protector.protect(text, false)), vec![None]);

        let segments = protector.protect(text, true);
        assert_eq!(kinds(&segments), vec![Some(SpanKind::Heading), None]);
        assert_eq!(segments[0].content, "# Title");
    }

    #[test]
    fn test_hashtag_is_not_heading() {
        let segments = SegmentProtector::new().protect("#tag here", true);
        assert_eq!(kinds(&segments), vec![None]);
    }

    #[test]
    fn test_segment_offsets() {
        let text = "ab `c` d";
        let segments = SegmentProtector::new().protect(text, false);
        for segment in &segments {
            assert_eq!(&text[segment.start..segment.start + segment.content.len()], segment.content);
        }
    }

    #[test]
    fn test_single_reference_shortcut() {
        let protector = SegmentProtector::new();
        assert!(protector.is_single_reference("  [[hello]]\n"));
        assert!(protector.is_single_reference("[text](url)"));
        assert!(!protector.is_single_reference("[[a]] and [[b]] text"));
        assert!(!protector.is_single_reference("hello"));
    }
}
