//! Slash-delimited virtual path helpers shared by the registry, the
//! resolver and the scanner.

use unicode_normalization::UnicodeNormalization;

/// NFC-normalize, trim, drop surrounding slashes and a trailing `.md`.
pub fn normalize_path(path: &str) -> String {
    let nfc: String = path.trim().nfc().collect();
    let trimmed = nfc.trim_matches('/');
    trimmed.strip_suffix(".md").unwrap_or(trimmed).to_string()
}

/// Normalize a configured base directory; empty means "not set".
pub fn normalize_base_dir(base_dir: Option<&str>) -> Option<String> {
    base_dir
        .map(|dir| dir.trim().nfc().collect::<String>())
        .map(|dir| dir.trim_matches('/').to_string())
        .filter(|dir| !dir.is_empty())
}

/// Strip `base_dir + "/"` from the front of `path` when present.
pub fn strip_base_dir<'a>(path: &'a str, base_dir: Option<&str>) -> &'a str {
    match base_dir {
        Some(dir) => path
            .strip_prefix(dir)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(path),
        None => path,
    }
}

/// Effective namespace: first segment of the base-dir-relative path.
pub fn effective_namespace(path: &str, base_dir: Option<&str>) -> String {
    let relative = strip_base_dir(path, base_dir);
    relative.split('/').next().unwrap_or_default().to_string()
}

/// Last path segment (the shorthand).
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Everything before the last segment, or `""` at the root.
pub fn directory_of(path: &str) -> &str {
    path.rfind('/').map(|idx| &path[..idx]).unwrap_or("")
}

/// Directory segments, with an empty directory yielding none.
pub fn directory_segments(path: &str) -> Vec<&str> {
    let dir = directory_of(path);
    if dir.is_empty() {
        Vec::new()
    } else {
        dir.split('/').collect()
    }
}

/// Per-character case folding used for trie keys and map keys.
pub fn fold_case(text: &str, ignore_case: bool) -> String {
    if ignore_case {
        text.chars().flat_map(char::to_lowercase).collect()
    } else {
        text.to_string()
    }
}
