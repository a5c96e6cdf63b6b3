//! Fallback shorthand index
//!
//! Maps a namespace shorthand (last path segment) to every full target that
//! shares it, so an ambiguous shorthand can be resolved by namespace
//! proximity instead of by whichever file happened to claim the map key.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use crate::linker::path::{fold_case, last_segment};
use crate::linker::registry::{Candidate, CandidateRegistry, RegistryId};

/// `shorthand → [(full_key, Candidate)]`, ordered by full key
#[derive(Debug, Clone, Default)]
pub struct FallbackIndex {
    entries: HashMap<String, Vec<(String, Candidate)>>,
    max_key_chars: usize,
    ignore_case: bool,
}

impl FallbackIndex {
    /// Build from a registry's candidate map.
    pub fn build(registry: &CandidateRegistry, ignore_case: bool) -> Self {
        // One entry per distinct target; prefer the candidate without an explicit alias
        let mut targets: BTreeMap<String, Candidate> = BTreeMap::new();
        for candidate in registry.candidate_map().values() {
            let target = candidate.target();
            if !target.contains('/') {
                continue;
            }
            let plain = Candidate {
                canonical: target.to_string(),
                namespace: candidate.namespace.clone(),
                scoped: candidate.scoped,
            };
            targets.entry(target.to_string()).or_insert(plain);
        }

        let mut entries: HashMap<String, Vec<(String, Candidate)>> = HashMap::new();
        let mut max_key_chars = 0;
        for (target, candidate) in targets {
            let shorthand = fold_case(last_segment(&target), ignore_case);
            if shorthand.is_empty() {
                continue;
            }
            max_key_chars = max_key_chars.max(shorthand.chars().count());
            entries.entry(shorthand).or_default().push((target, candidate));
        }

        Self {
            entries,
            max_key_chars,
            ignore_case,
        }
    }

    pub fn get(&self, shorthand: &str) -> Option<&[(String, Candidate)]> {
        self.entries.get(shorthand).map(Vec::as_slice)
    }

    pub fn contains(&self, shorthand: &str) -> bool {
        self.entries.contains_key(shorthand)
    }

    /// Longest shorthand in chars; bounds fallback extension.
    pub fn max_key_chars(&self) -> usize {
        self.max_key_chars
    }

    /// Case mode the shorthands were folded with.
    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Caller-owned memo of fallback indexes keyed by registry identity and case mode.
///
/// Each entry is written once per registry version; readers share it by `Arc`.
#[derive(Debug, Default)]
pub struct FallbackCache {
    indexes: RwLock<HashMap<(RegistryId, bool), Arc<FallbackIndex>>>,
}

impl FallbackCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(&self, registry: &CandidateRegistry, ignore_case: bool) -> Arc<FallbackIndex> {
        let key = (registry.id(), ignore_case);
        if let Ok(indexes) = self.indexes.read() {
            if let Some(index) = indexes.get(&key) {
                return Arc::clone(index);
            }
        }

        let built = Arc::new(FallbackIndex::build(registry, ignore_case));
        match self.indexes.write() {
            Ok(mut indexes) => Arc::clone(indexes.entry(key).or_insert(built)),
            Err(_) => built,
        }
    }

    /// Drop indexes built for registries other than `keep`.
    pub fn retain_registry(&self, keep: RegistryId) {
        if let Ok(mut indexes) = self.indexes.write() {
            indexes.retain(|(id, _), _| *id == keep);
        }
    }

    pub fn len(&self) -> usize {
        self.indexes.read().map(|indexes| indexes.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
