//! Configuration types and defaults for the linker

use serde::{Deserialize, Serialize};

use crate::linker::error::LinkerError;
use crate::linker::registry::RegistryOptions;
use crate::linker::render::RenderOptions;

/// Linker settings, as persisted by the host plugin
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LinkerSettings {
    /// Root folder whose prefix is dropped from link targets and namespaces
    #[serde(default)]
    pub base_dir: Option<String>,
    /// Resolve shared shorthands by namespace proximity
    #[serde(default = "default_true")]
    pub namespace_resolution: bool,
    /// Never link `YYYY-MM-DD` matches
    #[serde(default = "default_true")]
    pub ignore_date_formats: bool,
    #[serde(default)]
    pub ignore_case: bool,
    #[serde(default = "default_true")]
    pub prevent_self_linking: bool,
    /// Targets under these directories are linked without a display alias
    #[serde(default)]
    pub remove_alias_in_dirs: Vec<String>,
    /// Bodies with this many chars or fewer are returned unchanged
    #[serde(default)]
    pub min_char_count: usize,
    /// Protect `#` heading lines from linking
    #[serde(default)]
    pub ignore_headings: bool,
    /// Render namespaced shorthand matches as `[[path|shorthand]]`
    #[serde(default = "default_true")]
    pub shorthand_alias: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LinkerSettings {
    fn default() -> Self {
        Self {
            base_dir: None,
            namespace_resolution: true,
            ignore_date_formats: true,
            ignore_case: false,
            prevent_self_linking: true,
            remove_alias_in_dirs: Vec::new(),
            min_char_count: 0,
            ignore_headings: false,
            shorthand_alias: true,
        }
    }
}

impl LinkerSettings {
    pub fn from_json(json: &str) -> Result<Self, LinkerError> {
        serde_json::from_str(json).map_err(|e| LinkerError::InvalidSettings(e.to_string()))
    }

    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            base_dir: self.base_dir.clone(),
            ignore_case: self.ignore_case,
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            ignore_case: self.ignore_case,
            base_dir: crate::linker::path::normalize_base_dir(self.base_dir.as_deref()),
            remove_alias_in_dirs: self.remove_alias_in_dirs.clone(),
            shorthand_alias: self.shorthand_alias,
        }
    }
}
