//! CandidateRegistry: Trie + Candidate Map over Linkable Page Identifiers
//!
//! Turns the vault's file descriptors into an immutable index:
//! - `candidate_map`: every matchable key (full path, base-dir-relative path,
//!   alias, namespace shorthand) → exactly one `Candidate`
//! - `trie`: prefix tree over the same keys, used for longest-match descent
//!
//! Trie terminals only hold the map key, so candidate data has a single owner.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use unicode_normalization::UnicodeNormalization;

use crate::linker::path::{
    effective_namespace, fold_case, last_segment, normalize_base_dir, normalize_path,
    strip_base_dir,
};

// =============================================================================
// Types
// =============================================================================

/// One page as enumerated by the host (vault lister + frontmatter reader)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub path: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Only linkable from documents in the same namespace
    #[serde(default)]
    pub scoped: bool,
    /// Opted out of linking entirely
    #[serde(default)]
    pub excluded: bool,
}

impl FileDescriptor {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            aliases: Vec::new(),
            scoped: false,
            excluded: false,
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn scoped(mut self) -> Self {
        self.scoped = true;
        self
    }

    pub fn excluded(mut self) -> Self {
        self.excluded = true;
        self
    }
}

/// The unit of linkable identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Link target, optionally `path|alias` for explicit aliases
    pub canonical: String,
    /// Effective top-level segment of the target
    pub namespace: String,
    pub scoped: bool,
}

impl Candidate {
    /// Target path without any explicit alias.
    pub fn target(&self) -> &str {
        self.split_alias().0
    }

    pub fn split_alias(&self) -> (&str, Option<&str>) {
        match self.canonical.split_once('|') {
            Some((path, alias)) => (path, Some(alias)),
            None => (&self.canonical, None),
        }
    }
}

/// Registry build options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryOptions {
    pub base_dir: Option<String>,
    pub ignore_case: bool,
}

/// Descriptor rejected at build time (non-fatal for the batch)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryError {
    /// Path was empty after normalization
    EmptyPath { index: usize },
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::EmptyPath { index } => {
                write!(f, "descriptor #{} has an empty path", index)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Process-unique identity of a built registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegistryId(pub u64);

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

impl RegistryId {
    fn next() -> Self {
        RegistryId(NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Statistics about a built registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub descriptor_count: usize,
    pub excluded_count: usize,
    pub rejected_count: usize,
    pub key_count: usize,
    pub trie_nodes: usize,
}

// =============================================================================
// Trie
// =============================================================================

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: HashMap<char, usize>,
    /// Candidate-map key terminating here
    terminal: Option<String>,
}

/// Arena-backed prefix tree over (folded) candidate keys
#[derive(Debug, Clone)]
pub struct CandidateTrie {
    nodes: Vec<TrieNode>,
}

/// Cursor into the trie during descent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrieCursor(usize);

impl Default for CandidateTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateTrie {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
        }
    }

    pub fn root(&self) -> TrieCursor {
        TrieCursor(0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Insert `key`, storing it as the terminal at its final node.
    pub fn insert(&mut self, key: &str) {
        let mut current = 0;
        for c in key.chars() {
            current = match self.nodes[current].children.get(&c) {
                Some(&next) => next,
                None => {
                    self.nodes.push(TrieNode::default());
                    let next = self.nodes.len() - 1;
                    self.nodes[current].children.insert(c, next);
                    next
                }
            };
        }
        self.nodes[current].terminal = Some(key.to_string());
    }

    /// Follow one character. Case-insensitive callers step once per folded char.
    pub fn step(&self, cursor: TrieCursor, c: char) -> Option<TrieCursor> {
        self.nodes[cursor.0].children.get(&c).copied().map(TrieCursor)
    }

    pub fn terminal(&self, cursor: TrieCursor) -> Option<&str> {
        self.nodes[cursor.0].terminal.as_deref()
    }
}

// =============================================================================
// CandidateRegistry
// =============================================================================

/// Immutable index of linkable candidates. Share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct CandidateRegistry {
    id: RegistryId,
    candidate_map: HashMap<String, Candidate>,
    trie: CandidateTrie,
    base_dir: Option<String>,
    ignore_case: bool,
    stats: RegistryStats,
}

/// Result of a registry build: the registry plus any rejected descriptors
#[derive(Debug, Clone)]
pub struct RegistryBuild {
    pub registry: CandidateRegistry,
    pub rejected: Vec<RegistryError>,
}

/// Validated descriptor, ready for insertion
struct Prepared {
    path: String,
    target: String,
    namespace: String,
    aliases: Vec<String>,
    scoped: bool,
}

impl CandidateRegistry {
    /// Build a registry from descriptors. Empty paths are rejected and reported.
    pub fn build(descriptors: &[FileDescriptor], options: &RegistryOptions) -> RegistryBuild {
        let base_dir = normalize_base_dir(options.base_dir.as_deref());
        let mut rejected = Vec::new();
        let mut stats = RegistryStats {
            descriptor_count: descriptors.len(),
            ..RegistryStats::default()
        };

        let mut prepared: Vec<Prepared> = Vec::with_capacity(descriptors.len());
        for (index, descriptor) in descriptors.iter().enumerate() {
            if descriptor.excluded {
                stats.excluded_count += 1;
                continue;
            }
            let path = normalize_path(&descriptor.path);
            if path.is_empty() {
                rejected.push(RegistryError::EmptyPath { index });
                continue;
            }
            let target = strip_base_dir(&path, base_dir.as_deref()).to_string();
            let namespace = effective_namespace(&path, base_dir.as_deref());
            let aliases = descriptor
                .aliases
                .iter()
                .map(|alias| alias.trim().nfc().collect::<String>())
                .filter(|alias| !alias.is_empty())
                .collect();
            prepared.push(Prepared {
                path,
                target,
                namespace,
                aliases,
                scoped: descriptor.scoped,
            });
        }
        stats.rejected_count = rejected.len();

        // Longest paths first so the most specific owner claims shared keys
        prepared.sort_by(|a, b| {
            b.path
                .chars()
                .count()
                .cmp(&a.path.chars().count())
                .then_with(|| a.path.cmp(&b.path))
        });

        let mut registry = CandidateRegistry {
            id: RegistryId::next(),
            candidate_map: HashMap::new(),
            trie: CandidateTrie::new(),
            base_dir,
            ignore_case: options.ignore_case,
            stats: RegistryStats::default(),
        };

        // Phase 1: exact paths own their keys
        for p in &prepared {
            let candidate = Candidate {
                canonical: p.target.clone(),
                namespace: p.namespace.clone(),
                scoped: p.scoped,
            };
            registry.insert_key(&p.path, &candidate);
            registry.insert_key(&p.target, &candidate);
        }

        // Phase 2: aliases and namespace shorthands
        for p in &prepared {
            for alias in &p.aliases {
                let candidate = Candidate {
                    canonical: format!("{}|{}", p.target, alias),
                    namespace: p.namespace.clone(),
                    scoped: p.scoped,
                };
                registry.insert_key(alias, &candidate);
            }
            if p.target.contains('/') {
                let shorthand = last_segment(&p.target);
                if !p.aliases.iter().any(|alias| alias == shorthand) {
                    let candidate = Candidate {
                        canonical: p.target.clone(),
                        namespace: p.namespace.clone(),
                        scoped: p.scoped,
                    };
                    registry.insert_key(shorthand, &candidate);
                }
            }
        }

        stats.key_count = registry.candidate_map.len();
        stats.trie_nodes = registry.trie.node_count();
        registry.stats = stats;

        RegistryBuild { registry, rejected }
    }

    /// First insertion wins.
    fn insert_key(&mut self, key: &str, candidate: &Candidate) {
        let key = fold_case(key, self.ignore_case);
        if key.is_empty() || self.candidate_map.contains_key(&key) {
            return;
        }
        self.trie.insert(&key);
        self.candidate_map.insert(key, candidate.clone());
    }

    pub fn id(&self) -> RegistryId {
        self.id
    }

    pub fn trie(&self) -> &CandidateTrie {
        &self.trie
    }

    pub fn candidate_map(&self) -> &HashMap<String, Candidate> {
        &self.candidate_map
    }

    /// Look up a (folded) key.
    pub fn get(&self, key: &str) -> Option<&Candidate> {
        self.candidate_map.get(key)
    }

    pub fn base_dir(&self) -> Option<&str> {
        self.base_dir.as_deref()
    }

    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    pub fn len(&self) -> usize {
        self.candidate_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidate_map.is_empty()
    }

    pub fn stats(&self) -> &RegistryStats {
        &self.stats
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn build(descriptors: Vec<FileDescriptor>) -> CandidateRegistry {
        CandidateRegistry::build(&descriptors, &RegistryOptions::default()).registry
    }

    #[test]
    fn test_full_path_and_shorthand_keys() {
        let registry = build(vec![FileDescriptor::new("set/a/link")]);

        let full = registry.get("set/a/link").unwrap();
        assert_eq!(full.canonical, "set/a/link");
        assert_eq!(full.namespace, "set");

        let shorthand = registry.get("link").unwrap();
        assert_eq!(shorthand.canonical, "set/a/link");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_alias_keys_carry_explicit_alias() {
        let registry = build(vec![FileDescriptor::new("HelloWorld").with_aliases(["HW"])]);

        let alias = registry.get("HW").unwrap();
        assert_eq!(alias.canonical, "HelloWorld|HW");
        assert_eq!(alias.split_alias(), ("HelloWorld", Some("HW")));
        assert_eq!(alias.target(), "HelloWorld");
    }

    #[test]
    fn test_alias_equal_to_shorthand_replaces_implicit_shorthand() {
        let registry = build(vec![FileDescriptor::new("ns/page").with_aliases(["page"])]);
        assert_eq!(registry.get("page").unwrap().canonical, "ns/page|page");
    }

    #[test]
    fn test_longer_path_claims_shared_shorthand() {
        let registry = build(vec![
            FileDescriptor::new("a/link"),
            FileDescriptor::new("a/b/c/link"),
        ]);
        assert_eq!(registry.get("link").unwrap().canonical, "a/b/c/link");
    }

    #[test]
    fn test_exact_path_beats_foreign_shorthand() {
        let registry = build(vec![
            FileDescriptor::new("link"),
            FileDescriptor::new("ns/link"),
        ]);
        assert_eq!(registry.get("link").unwrap().canonical, "link");
    }

    #[test]
    fn test_excluded_descriptors_are_not_matchable() {
        let registry = build(vec![
            FileDescriptor::new("secret").excluded(),
            FileDescriptor::new("public"),
        ]);
        assert!(registry.get("secret").is_none());
        assert!(registry.get("public").is_some());
        assert_eq!(registry.stats().excluded_count, 1);
    }

    #[test]
    fn test_empty_path_rejected_without_failing_batch() {
        let result = CandidateRegistry::build(
            &[FileDescriptor::new("  "), FileDescriptor::new("ok")],
            &RegistryOptions::default(),
        );
        assert_eq!(result.rejected, vec![RegistryError::EmptyPath { index: 0 }]);
        assert!(result.registry.get("ok").is_some());
        assert_eq!(result.registry.stats().rejected_count, 1);
    }

    #[test]
    fn test_base_dir_relative_target() {
        let options = RegistryOptions {
            base_dir: Some("pages".to_string()),
            ignore_case: false,
        };
        let registry =
            CandidateRegistry::build(&[FileDescriptor::new("pages/set/tool")], &options).registry;

        let full = registry.get("pages/set/tool").unwrap();
        assert_eq!(full.canonical, "set/tool");
        assert_eq!(full.namespace, "set");
        assert_eq!(registry.get("set/tool").unwrap().canonical, "set/tool");
        assert_eq!(registry.get("tool").unwrap().canonical, "set/tool");
    }

    #[test]
    fn test_case_insensitive_keys_are_folded() {
        let options = RegistryOptions {
            base_dir: None,
            ignore_case: true,
        };
        let registry = CandidateRegistry::build(&[FileDescriptor::new("HelloWorld")], &options)
            .registry;
        assert!(registry.get("helloworld").is_some());
        assert!(registry.get("HelloWorld").is_none());
        assert_eq!(registry.get("helloworld").unwrap().canonical, "HelloWorld");
    }

    #[test]
    fn test_trie_terminals_point_into_map() {
        let registry = build(vec![FileDescriptor::new("abc"), FileDescriptor::new("ab")]);
        let trie = registry.trie();

        let mut cursor = trie.root();
        let mut terminals = Vec::new();
        for c in "abc".chars() {
            cursor = trie.step(cursor, c).unwrap();
            if let Some(key) = trie.terminal(cursor) {
                terminals.push(key.to_string());
            }
        }
        assert_eq!(terminals, vec!["ab", "abc"]);
        assert!(terminals.iter().all(|key| registry.get(key).is_some()));
    }

    #[test]
    fn test_registry_ids_are_unique() {
        let a = build(vec![FileDescriptor::new("x")]);
        let b = build(vec![FileDescriptor::new("x")]);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_descriptor_deserializes_with_defaults() {
        let descriptor: FileDescriptor = serde_json::from_str(r#"{"path":"a/b"}"#).unwrap();
        assert_eq!(descriptor.path, "a/b");
        assert!(descriptor.aliases.is_empty());
        assert!(!descriptor.scoped);
        assert!(!descriptor.excluded);
    }
}
