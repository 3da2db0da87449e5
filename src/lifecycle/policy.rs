//! Per-URL unmount policy resolution.

use crate::config::StylesheetSpec;

/// A stylesheet URL with its effective unmount policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStylesheet {
    pub url: String,
    pub should_unmount: bool,
}

impl ResolvedStylesheet {
    /// A bare URL adopts `default_should_unmount`; a URL with a policy keeps
    /// its own override when it has one.
    pub fn resolve(spec: &StylesheetSpec, default_should_unmount: bool) -> Self {
        Self {
            url: spec.href().to_string(),
            should_unmount: spec.should_unmount().unwrap_or(default_should_unmount),
        }
    }
}

/// Resolve every spec in order, dropping entries with an empty URL.
pub fn resolve_all(
    specs: &[StylesheetSpec],
    default_should_unmount: bool,
) -> Vec<ResolvedStylesheet> {
    specs
        .iter()
        .filter(|spec| !spec.href().is_empty())
        .map(|spec| ResolvedStylesheet::resolve(spec, default_should_unmount))
        .collect()
}
