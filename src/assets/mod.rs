//! Stylesheet sources beyond the caller's URL list.
//!
//! # Data Flow
//! ```text
//! Build-time (extracted.rs):
//!     build step writes asset ids + content hashes
//!     → BuildAssets::urls() → appended to the configured stylesheet list
//!
//! Deploy-time (manifest.rs):
//!     manifest URL → HTTP GET → JSON["main.css"]
//!     → prefixed with the manifest's origin → one more stylesheet per phase
//! ```
//!
//! # Design Decisions
//! - Missing build data is a configuration error, not a silent no-op
//! - Manifest failures propagate out of the phase that needed the URL

pub mod extracted;
pub mod manifest;

pub use extracted::{BuildAssets, CssAsset};
pub use manifest::{ManifestClient, ManifestError, MANIFEST_CSS_KEY};
