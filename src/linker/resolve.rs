//! Namespace proximity resolver
//!
//! Picks one target among several sharing a shorthand: the one whose
//! directory shares the longest leading run of segments with the current
//! document's directory. Prefers siblings, then the nearest ancestor or
//! descendant namespace.

use crate::linker::path::{directory_segments, strip_base_dir};
use crate::linker::registry::Candidate;

/// Common leading directory segments (segment-wise, not char-wise).
fn common_prefix_len(a: &[&str], b: &[&str]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Resolve an ambiguous shorthand for the document at `document_path`.
///
/// `candidates` are `(full_key, Candidate)` pairs; returns `None` only when empty.
pub fn resolve_namespace<'a>(
    document_path: &str,
    candidates: &'a [(String, Candidate)],
    base_dir: Option<&str>,
) -> Option<&'a (String, Candidate)> {
    let document_dir = directory_segments(document_path);
    let at_root = document_dir.is_empty();

    let scored = candidates.iter().map(|entry| {
        let dir = directory_segments(&entry.0);
        let score = common_prefix_len(&dir, &document_dir);
        let depth = if at_root && base_dir.is_some() {
            directory_segments(strip_base_dir(&entry.0, base_dir)).len()
        } else {
            dir.len()
        };
        (entry, score, depth)
    });

    scored
        .min_by(|(a, a_score, a_depth), (b, b_score, b_depth)| {
            b_score
                .cmp(a_score)
                .then_with(|| a_depth.cmp(b_depth))
                .then_with(|| a.0.chars().count().cmp(&b.0.chars().count()))
                .then_with(|| a.0.cmp(&b.0))
        })
        .map(|(entry, _, _)| entry)
}
