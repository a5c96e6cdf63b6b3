//! AutoLinker: stateful facade over registry, fallback cache and scanner
//!
//! Holds the current registry behind an `Arc`. `set_files` builds a fresh
//! registry and swaps it in; callers already holding the previous one keep
//! scanning against it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::linker::config::LinkerSettings;
use crate::linker::error::LinkerError;
use crate::linker::fallback::FallbackCache;
use crate::linker::registry::{CandidateRegistry, FileDescriptor, RegistryError, RegistryStats};
use crate::linker::scan::{replace_links, LinkResult};

/// Outcome of hydrating the linker with a descriptor list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryReport {
    pub candidate_count: usize,
    pub stats: RegistryStats,
    /// Descriptors left out of the registry
    pub rejected: Vec<RegistryError>,
}

/// Auto-linker with a swappable candidate registry
#[wasm_bindgen]
pub struct AutoLinker {
    settings: LinkerSettings,
    registry: Arc<CandidateRegistry>,
    fallback_cache: FallbackCache,
}

impl Default for AutoLinker {
    fn default() -> Self {
        Self::new(LinkerSettings::default())
    }
}

impl AutoLinker {
    pub fn new(settings: LinkerSettings) -> Self {
        let registry = CandidateRegistry::build(&[], &settings.registry_options()).registry;
        Self {
            settings,
            registry: Arc::new(registry),
            fallback_cache: FallbackCache::new(),
        }
    }

    pub fn settings(&self) -> &LinkerSettings {
        &self.settings
    }

    /// Current registry. Cloning the `Arc` pins this version across later swaps.
    pub fn registry(&self) -> Arc<CandidateRegistry> {
        Arc::clone(&self.registry)
    }

    /// Replace the candidate registry with one built from `descriptors`.
    pub fn set_files(&mut self, descriptors: Vec<FileDescriptor>) -> RegistryReport {
        let build = CandidateRegistry::build(&descriptors, &self.settings.registry_options());
        let registry = Arc::new(build.registry);

        self.fallback_cache.retain_registry(registry.id());
        self.registry = registry;

        let report = RegistryReport {
            candidate_count: self.registry.len(),
            stats: self.registry.stats().clone(),
            rejected: build.rejected,
        };

        #[cfg(target_arch = "wasm32")]
        {
            web_sys::console::log_1(
                &format!(
                    "[AutoLinker] Hydrated {} candidates from {} files ({} excluded)",
                    report.candidate_count, report.stats.descriptor_count, report.stats.excluded_count
                )
                .into(),
            );
            for rejected in &report.rejected {
                web_sys::console::warn_1(&format!("[AutoLinker] Skipped {}", rejected).into());
            }
        }

        report
    }

    /// Link one document against the current registry.
    pub fn link(&self, body: &str, file_path: &str) -> LinkResult {
        if !self.settings.namespace_resolution {
            return replace_links(body, file_path, &self.registry, None, &self.settings);
        }
        let fallback = self
            .fallback_cache
            .get_or_build(&self.registry, self.registry.ignore_case());
        replace_links(body, file_path, &self.registry, Some(fallback.as_ref()), &self.settings)
    }

    pub fn candidate_count(&self) -> usize {
        self.registry.len()
    }
}

#[wasm_bindgen]
impl AutoLinker {
    /// Create a linker from a settings object; `undefined` means defaults.
    #[wasm_bindgen(constructor)]
    pub fn js_new(settings: JsValue) -> Result<AutoLinker, JsValue> {
        let settings = if settings.is_undefined() || settings.is_null() {
            LinkerSettings::default()
        } else {
            serde_wasm_bindgen::from_value(settings)
                .map_err(|e| LinkerError::InvalidSettings(e.to_string()))
                .map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        Ok(Self::new(settings))
    }

    /// Hydrate from `[{ path, aliases?, scoped?, excluded? }]`; returns the report.
    #[wasm_bindgen(js_name = hydrateFiles)]
    pub fn js_hydrate_files(&mut self, files: JsValue) -> Result<JsValue, JsValue> {
        let descriptors: Vec<FileDescriptor> = serde_wasm_bindgen::from_value(files)
            .map_err(|e| LinkerError::InvalidDescriptors(e.to_string()))
            .map_err(|e| {
                #[cfg(target_arch = "wasm32")]
                web_sys::console::error_1(&format!("[AutoLinker] {}", e).into());
                JsValue::from_str(&e.to_string())
            })?;
        let report = self.set_files(descriptors);
        serde_wasm_bindgen::to_value(&report).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Linked text only
    #[wasm_bindgen(js_name = link)]
    pub fn js_link(&self, body: &str, file_path: &str) -> String {
        self.link(body, file_path).text
    }

    /// `{ text, stats }`
    #[wasm_bindgen(js_name = linkWithStats)]
    pub fn js_link_with_stats(&self, body: &str, file_path: &str) -> JsValue {
        let result = self.link(body, file_path);
        match serde_wasm_bindgen::to_value(&result) {
            Ok(value) => value,
            Err(_e) => {
                #[cfg(target_arch = "wasm32")]
                web_sys::console::error_1(&format!("[AutoLinker] Serialization failed: {:?}", _e).into());
                JsValue::NULL
            }
        }
    }

    #[wasm_bindgen(js_name = candidateCount)]
    pub fn js_candidate_count(&self) -> usize {
        self.candidate_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_linker_is_passthrough() {
        let linker = AutoLinker::default();
        assert_eq!(linker.candidate_count(), 0);
        assert_eq!(linker.link("nothing to link", "note").text, "nothing to link");
    }

    #[test]
    fn test_set_files_reports_rejections() {
        let mut linker = AutoLinker::default();
        let report = linker.set_files(vec![
            FileDescriptor::new("alpha"),
            FileDescriptor::new("  "),
            FileDescriptor::new("beta").excluded(),
        ]);
        assert_eq!(report.candidate_count, 1);
        assert_eq!(report.stats.excluded_count, 1);
        assert_eq!(report.rejected, vec![RegistryError::EmptyPath { index: 1 }]);
        assert_eq!(linker.link("alpha beta", "note").text, "[[alpha]] beta");
    }

    #[test]
    fn test_swap_keeps_old_registry_alive() {
        let mut linker = AutoLinker::default();
        linker.set_files(vec![FileDescriptor::new("old")]);
        let pinned = linker.registry();

        linker.set_files(vec![FileDescriptor::new("new")]);
        assert!(pinned.get("old").is_some());
        assert_ne!(pinned.id(), linker.registry().id());

        let result = replace_links("old new", "note", &pinned, None, linker.settings());
        assert_eq!(result.text, "[[old]] new");
        assert_eq!(linker.link("old new", "note").text, "old [[new]]");
    }

    #[test]
    fn test_fallback_cache_tracks_current_registry() {
        let mut linker = AutoLinker::default();
        linker.set_files(vec![FileDescriptor::new("ns/a/link")]);
        linker.link("link", "ns/a/b");
        assert_eq!(linker.fallback_cache.len(), 1);

        linker.set_files(vec![FileDescriptor::new("ns/b/link")]);
        assert_eq!(linker.fallback_cache.len(), 0);
    }
}
