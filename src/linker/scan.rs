//! TextScanner: longest-match, script-aware link insertion
//!
//! Walks each unprotected span character by character. At every position:
//! 1. URL literal  - copy `http(s)://...` through untouched
//! 2. Trie match   - longest accepted candidate key starting here
//! 3. Fallback     - namespace shorthand search (namespace resolution only)
//! 4. Literal char - emit one character and move on
//!
//! The registry and fallback index are only read; all scan state is the
//! cursor and the output buffer.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::linker::config::LinkerSettings;
use crate::linker::fallback::FallbackIndex;
use crate::linker::path::{effective_namespace, fold_case, normalize_path, strip_base_dir};
use crate::linker::protect::SegmentProtector;
use crate::linker::registry::{Candidate, CandidateRegistry};
use crate::linker::render::{render_link, same_text, RenderOptions, TableLines};
use crate::linker::resolve::resolve_namespace;
use crate::linker::script::{
    is_cjk_shaped_chars, is_date_like, is_month_number, is_word_boundary, japanese_particle,
    korean_suffix, KoreanSuffix, ScriptClass,
};

/// Upper bound on fallback shorthand extension, in chars
pub const MAX_FALLBACK_CHARS: usize = 64;

// =============================================================================
// Types
// =============================================================================

/// Counters collected during one scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStats {
    pub links_created: usize,
    pub protected_segments: usize,
    pub ambiguous_resolutions: usize,
    pub scoped_rejections: usize,
    pub self_links_skipped: usize,
    pub korean_suppressions: usize,
    /// Japanese particle directly after a CJK match (classified, not acted on)
    pub japanese_particle_follows: usize,
    /// Returned unchanged without scanning
    pub short_circuited: bool,
    pub elapsed_us: u64,
}

/// Transformed document plus scan statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkResult {
    pub text: String,
    pub stats: LinkStats,
}

// =============================================================================
// Entry point
// =============================================================================

/// Rewrite bare mentions of registry candidates in `body` into `[[...]]` links.
///
/// `file_path` is the slash-delimited path of the document being processed.
/// When `fallback` is `None` and namespace resolution is on, a fallback index
/// is built for this call only; pass a cached one to avoid that.
pub fn replace_links(
    body: &str,
    file_path: &str,
    registry: &CandidateRegistry,
    fallback: Option<&FallbackIndex>,
    settings: &LinkerSettings,
) -> LinkResult {
    let started = instant::Instant::now();
    let mut result = LinkResult::default();

    if body.chars().count() <= settings.min_char_count {
        result.text = body.to_string();
        result.stats.short_circuited = true;
        return result;
    }

    let protector = SegmentProtector::shared();
    let body: String = body.nfc().collect();
    if protector.is_single_reference(&body) {
        result.text = body;
        result.stats.short_circuited = true;
        return result;
    }

    #[cfg(target_arch = "wasm32")]
    {
        if settings.ignore_case != registry.ignore_case() {
            web_sys::console::warn_1(
                &"[linkcore] settings.ignore_case differs from the registry; matching follows the registry".into(),
            );
        }
    }

    let local_fallback;
    let fallback = match fallback {
        Some(index) => Some(index),
        None if settings.namespace_resolution => {
            local_fallback = FallbackIndex::build(registry, registry.ignore_case());
            Some(&local_fallback)
        }
        None => None,
    };

    let scanner = TextScanner::new(&body, file_path, registry, fallback, settings);
    let mut out = String::with_capacity(body.len() + body.len() / 8);

    for segment in protector.protect(&body, settings.ignore_headings) {
        if segment.protected {
            result.stats.protected_segments += 1;
            out.push_str(segment.content);
        } else {
            scanner.scan_span(segment.content, segment.start, &mut out, &mut result.stats);
        }
    }

    result.text = out;
    result.stats.elapsed_us = started.elapsed().as_micros() as u64;
    result
}

// =============================================================================
// TextScanner
// =============================================================================

/// Per-document scan context (immutable during the scan)
pub struct TextScanner<'a> {
    registry: &'a CandidateRegistry,
    fallback: Option<&'a FallbackIndex>,
    settings: &'a LinkerSettings,
    render: RenderOptions,
    tables: TableLines,
    /// Document path relative to base_dir
    document_target: String,
    document_namespace: String,
    fold: bool,
}

/// Outcome of trying to link at one position
enum Step {
    /// Chars consumed, output already written
    Advance(usize),
    /// Nothing applicable here
    Pass,
}

impl<'a> TextScanner<'a> {
    pub fn new(
        body: &str,
        file_path: &str,
        registry: &'a CandidateRegistry,
        fallback: Option<&'a FallbackIndex>,
        settings: &'a LinkerSettings,
    ) -> Self {
        let base_dir = registry.base_dir();
        let document_path = normalize_path(file_path);
        Self {
            registry,
            fallback,
            settings,
            render: settings.render_options(),
            tables: TableLines::detect(body),
            document_target: strip_base_dir(&document_path, base_dir).to_string(),
            document_namespace: effective_namespace(&document_path, base_dir),
            fold: registry.ignore_case(),
        }
    }

    /// Scan one unprotected span starting at byte `span_start` of the body.
    pub fn scan_span(&self, span: &str, span_start: usize, out: &mut String, stats: &mut LinkStats) {
        let chars: Vec<char> = span.chars().collect();
        let offsets: Vec<usize> = span.char_indices().map(|(idx, _)| span_start + idx).collect();

        let mut i = 0;
        while i < chars.len() {
            if let Some(len) = url_literal_len(&chars, i) {
                out.extend(&chars[i..i + len]);
                i += len;
                continue;
            }

            if let Step::Advance(len) = self.try_trie_match(&chars, &offsets, i, out, stats) {
                i += len;
                continue;
            }

            if let Step::Advance(len) = self.try_fallback_match(&chars, &offsets, i, out, stats) {
                i += len;
                continue;
            }

            out.push(chars[i]);
            i += 1;
        }
    }

    // -------------------------------------------------------------------------
    // Trie
    // -------------------------------------------------------------------------

    /// Longest accepted terminal from `i`: `(length in chars, map key)`.
    fn longest_trie_match(&self, chars: &[char], i: usize) -> Option<(usize, &'a str)> {
        let trie = self.registry.trie();
        let mut cursor = trie.root();
        let mut best = None;

        for j in i..chars.len() {
            let next = if self.fold {
                chars[j]
                    .to_lowercase()
                    .try_fold(cursor, |node, c| trie.step(node, c))
            } else {
                trie.step(cursor, chars[j])
            };
            let Some(next) = next else {
                break;
            };
            cursor = next;

            if let Some(key) = trie.terminal(cursor) {
                let accepted = is_cjk_shaped_chars(&chars[i..=j])
                    || is_word_boundary(chars.get(j + 1).copied());
                if accepted {
                    best = Some((j + 1 - i, key));
                }
            }
        }

        best
    }

    fn try_trie_match(
        &self,
        chars: &[char],
        offsets: &[usize],
        i: usize,
        out: &mut String,
        stats: &mut LinkStats,
    ) -> Step {
        let Some((len, key)) = self.longest_trie_match(chars, i) else {
            return Step::Pass;
        };
        let matched: String = chars[i..i + len].iter().collect();

        if self.settings.ignore_date_formats && is_date_like(&matched) {
            out.push_str(&matched);
            return Step::Advance(len);
        }
        if is_month_number(&matched) {
            out.push_str(&matched);
            return Step::Advance(len);
        }
        let Some(candidate) = self.registry.get(key) else {
            return Step::Pass;
        };

        let rest = &chars[i + len..];
        let class = ScriptClass::of(&matched);
        let mut suffix_len = 0;

        match class {
            ScriptClass::Korean => match korean_suffix(rest) {
                KoreanSuffix::TopicParticle => {
                    stats.korean_suppressions += 1;
                    out.push(chars[i]);
                    return Step::Advance(1);
                }
                KoreanSuffix::Copula(n) => suffix_len = n,
                KoreanSuffix::None => {}
            },
            ScriptClass::Cjk => {
                if japanese_particle(rest).is_some() {
                    stats.japanese_particle_follows += 1;
                }
            }
            ScriptClass::Latin => {
                let before = i.checked_sub(1).map(|idx| chars[idx]);
                if !is_word_boundary(before) || !is_word_boundary(rest.first().copied()) {
                    out.push(chars[i]);
                    return Step::Advance(1);
                }
            }
        }

        let Some(candidate) = self.disambiguate(key, candidate, stats) else {
            stats.scoped_rejections += 1;
            out.push_str(&matched);
            return Step::Advance(len);
        };

        if !self.emit_link(&candidate, &matched, offsets[i], out, stats) {
            return Step::Advance(len);
        }
        out.extend(&rest[..suffix_len]);
        Step::Advance(len + suffix_len)
    }

    /// A shorthand shared by several targets is re-resolved by namespace.
    fn disambiguate(&self, key: &str, candidate: &Candidate, stats: &mut LinkStats) -> Option<Candidate> {
        let (target, explicit_alias) = candidate.split_alias();
        let via_shorthand = explicit_alias.is_none() && fold_case(target, self.fold) != key;
        if !self.settings.namespace_resolution || !via_shorthand {
            return Some(candidate.clone());
        }
        let shared = self
            .fallback
            .and_then(|index| index.get(&fold_case(key, index.ignore_case())));
        match shared {
            Some(entries) if entries.len() > 1 => self.choose(entries, stats),
            _ => Some(candidate.clone()),
        }
    }

    /// Filter out foreign scoped targets, then resolve what is left.
    fn choose(&self, entries: &[(String, Candidate)], stats: &mut LinkStats) -> Option<Candidate> {
        let survivors: Vec<(String, Candidate)> = entries
            .iter()
            .filter(|(_, candidate)| self.namespace_allows(candidate))
            .cloned()
            .collect();

        match survivors.len() {
            0 => None,
            1 => survivors.into_iter().next().map(|(_, candidate)| candidate),
            _ => {
                stats.ambiguous_resolutions += 1;
                resolve_namespace(&self.document_target, &survivors, self.registry.base_dir())
                    .map(|(_, candidate)| candidate.clone())
            }
        }
    }

    // -------------------------------------------------------------------------
    // Fallback
    // -------------------------------------------------------------------------

    fn try_fallback_match(
        &self,
        chars: &[char],
        offsets: &[usize],
        i: usize,
        out: &mut String,
        stats: &mut LinkStats,
    ) -> Step {
        let Some(index) = self.fallback else {
            return Step::Pass;
        };
        if !self.settings.namespace_resolution || index.is_empty() {
            return Step::Pass;
        }
        if !is_word_boundary(i.checked_sub(1).map(|idx| chars[idx])) {
            return Step::Pass;
        }

        let limit = index
            .max_key_chars()
            .min(MAX_FALLBACK_CHARS)
            .min(chars.len() - i);
        let mut word = String::new();
        let mut best: Option<(usize, String)> = None;

        for len in 1..=limit {
            let c = chars[i + len - 1];
            if c == '\n' {
                break;
            }
            word.push(c);
            let key = fold_case(&word, index.ignore_case());
            if !index.contains(&key) {
                continue;
            }
            let bounded = is_cjk_shaped_chars(&chars[i..i + len])
                || is_word_boundary(chars.get(i + len).copied());
            if !bounded {
                continue;
            }
            if (self.settings.ignore_date_formats && is_date_like(&word)) || is_month_number(&word) {
                continue;
            }
            best = Some((len, key));
        }

        let Some((len, key)) = best else {
            return Step::Pass;
        };
        let Some(entries) = index.get(&key) else {
            return Step::Pass;
        };
        let matched: String = chars[i..i + len].iter().collect();

        match self.choose(entries, stats) {
            Some(candidate) => {
                self.emit_link(&candidate, &matched, offsets[i], out, stats);
            }
            None => {
                stats.scoped_rejections += 1;
                out.push_str(&matched);
            }
        }
        Step::Advance(len)
    }

    // -------------------------------------------------------------------------
    // Emission
    // -------------------------------------------------------------------------

    fn namespace_allows(&self, candidate: &Candidate) -> bool {
        !candidate.scoped || candidate.namespace == self.document_namespace
    }

    fn is_self_link(&self, candidate: &Candidate) -> bool {
        self.settings.prevent_self_linking
            && same_text(candidate.target(), &self.document_target, self.fold || self.settings.ignore_case)
    }

    /// Write the link, or the matched text when the candidate is not linkable
    /// from this document. Returns whether a link was written.
    fn emit_link(
        &self,
        candidate: &Candidate,
        matched: &str,
        offset: usize,
        out: &mut String,
        stats: &mut LinkStats,
    ) -> bool {
        if !self.namespace_allows(candidate) {
            stats.scoped_rejections += 1;
            out.push_str(matched);
            return false;
        }
        if self.is_self_link(candidate) {
            stats.self_links_skipped += 1;
            out.push_str(matched);
            return false;
        }

        let in_table = self.tables.contains(offset);
        out.push_str(&render_link(candidate, matched, in_table, &self.render));
        stats.links_created += 1;
        true
    }
}

/// Length of a raw `http(s)://` URL starting at `i`, up to whitespace.
fn url_literal_len(chars: &[char], i: usize) -> Option<usize> {
    const SCHEMES: [&str; 2] = ["https://", "http://"];
    let starts_url = SCHEMES.iter().any(|scheme| {
        scheme.chars().count() <= chars.len() - i
            && scheme.chars().zip(&chars[i..]).all(|(s, c)| s == *c)
    });
    if !starts_url {
        return None;
    }
    let len = chars[i..]
        .iter()
        .position(|c| c.is_whitespace())
        .unwrap_or(chars.len() - i);
    Some(len)
}

// =============================================================================
// Tests
// =============================================================================
