//! LinkCore: automatic wiki-link insertion for Markdown notes
//!
//! A Rust/WASM engine that rewrites bare mentions of known notes into
//! `[[target]]` / `[[target|display]]` references.
//!
//! # Architecture
//!
//! ## Linker Components
//! - `registry.rs` - CandidateRegistry: trie + candidate map built once per file list
//! - `fallback.rs` - FallbackIndex/FallbackCache: shorthand → targets, memoized per registry
//! - `protect.rs` - SegmentProtector: code, links, URLs, callouts, headings left untouched
//! - `script.rs` - Script classes, word boundaries, Korean/Japanese particle rules
//! - `resolve.rs` - Namespace proximity resolver for shared shorthands
//! - `render.rs` - Link markup and table-aware pipe escaping
//! - `scan.rs` - TextScanner: longest-match scan, `replace_links` entry point
//! - `engine.rs` - AutoLinker: stateful facade with a swappable registry
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { AutoLinker } from 'linkcore';
//!
//! await init();
//!
//! const linker = new AutoLinker({ namespace_resolution: true, ignore_case: false });
//!
//! linker.hydrateFiles([
//!   { path: 'garden/rose.md' },
//!   { path: 'HelloWorld.md', aliases: ['HW'] },
//!   { path: 'private/plan.md', scoped: true },
//! ]);
//!
//! linker.link('The rose says HW', 'journal/today.md');
//! // => 'The [[garden/rose|rose]] says [[HelloWorld|HW]]'
//!
//! const { text, stats } = linker.linkWithStats(body, path);
//! console.log(stats.links_created, stats.elapsed_us);
//! ```

pub mod linker;

pub use linker::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("linkcore v{}", env!("CARGO_PKG_VERSION"))
}
