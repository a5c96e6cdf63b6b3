//! Link rendering and table awareness
//!
//! Turns a resolved candidate plus the text it matched into `[[path]]` or
//! `[[path|display]]`, escaping the pipe when the link lands in a table row.

use std::sync::OnceLock;

use regex::Regex;

use crate::linker::path::{fold_case, last_segment, strip_base_dir};
use crate::linker::registry::Candidate;

// =============================================================================
// Render options
// =============================================================================

/// The subset of linker settings the renderer needs
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub ignore_case: bool,
    pub base_dir: Option<String>,
    /// Targets under these directories are rendered without an alias
    pub remove_alias_in_dirs: Vec<String>,
    /// Namespaced targets matched by shorthand get `|shorthand`
    pub shorthand_alias: bool,
}

impl RenderOptions {
    fn strips_alias(&self, path: &str) -> bool {
        let base_dir = self.base_dir.as_deref();
        let path = strip_base_dir(path, base_dir);
        self.remove_alias_in_dirs.iter().any(|dir| {
            let dir = strip_base_dir(dir.trim().trim_matches('/'), base_dir);
            !dir.is_empty()
                && path
                    .strip_prefix(dir)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Compose the reference markup for `candidate` matched as `matched`.
pub fn render_link(
    candidate: &Candidate,
    matched: &str,
    in_table: bool,
    options: &RenderOptions,
) -> String {
    let (path, explicit_alias) = candidate.split_alias();
    let strip = options.strips_alias(path);

    let content = if strip {
        path.to_string()
    } else if let Some(alias) = explicit_alias {
        let display = if options.ignore_case { matched } else { alias };
        format!("{}|{}", path, display)
    } else if path.contains('/') {
        if same_text(matched, path, options.ignore_case) || !options.shorthand_alias {
            path.to_string()
        } else {
            let display = if options.ignore_case {
                last_segment(matched)
            } else {
                last_segment(path)
            };
            format!("{}|{}", path, display)
        }
    } else if !same_text(matched, path, options.ignore_case) {
        format!("{}|{}", path, matched)
    } else {
        path.to_string()
    };

    if in_table {
        format!("[[{}]]", content.replace('|', "\\|"))
    } else {
        format!("[[{}]]", content)
    }
}

/// Compare two strings under the configured case mode.
pub fn same_text(a: &str, b: &str, ignore_case: bool) -> bool {
    if ignore_case {
        fold_case(a, true) == fold_case(b, true)
    } else {
        a == b
    }
}

// =============================================================================
// Table detection
// =============================================================================

fn separator_re() -> &'static Regex {
    static SEPARATOR_RE: OnceLock<Regex> = OnceLock::new();
    SEPARATOR_RE.get_or_init(|| {
        Regex::new(r"^\s*\|?\s*:?-+:?\s*(?:\|\s*:?-+:?\s*)+\|?\s*$").expect("separator pattern compiles")
    })
}

/// Byte ranges of lines that belong to a Markdown table
#[derive(Debug, Clone, Default)]
pub struct TableLines {
    ranges: Vec<(usize, usize)>,
}

impl TableLines {
    pub fn detect(text: &str) -> Self {
        let mut lines: Vec<(usize, &str)> = Vec::new();
        let mut offset = 0;
        for line in text.split('\n') {
            lines.push((offset, line));
            offset += line.len() + 1;
        }

        let mut in_table = vec![false; lines.len()];
        for (idx, (_, line)) in lines.iter().enumerate() {
            let trimmed = line.trim();
            if trimmed.starts_with('|') {
                in_table[idx] = true;
            }
            if !separator_re().is_match(line) {
                continue;
            }
            in_table[idx] = true;
            // Header above and rows below, up to the next blank or pipe-less line
            let mut up = idx;
            while up > 0 && lines[up - 1].1.contains('|') && !lines[up - 1].1.trim().is_empty() {
                up -= 1;
                in_table[up] = true;
            }
            let mut down = idx + 1;
            while down < lines.len() && lines[down].1.contains('|') {
                in_table[down] = true;
                down += 1;
            }
        }

        let ranges = lines
            .iter()
            .zip(&in_table)
            .filter(|(_, flagged)| **flagged)
            .map(|((start, line), _)| (*start, start + line.len()))
            .collect();

        Self { ranges }
    }

    /// Whether byte `offset` falls on a table line.
    pub fn contains(&self, offset: usize) -> bool {
        let idx = self.ranges.partition_point(|(start, _)| *start <= offset);
        idx > 0 && offset <= self.ranges[idx - 1].1
    }
}
