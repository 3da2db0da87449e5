//! `<link>` elements and their load signalling.
//!
//! # Responsibilities
//! - Represent a single `<link>` element with its attributes
//! - Carry the element's load state (pending, loaded, failed)
//! - Let whoever owns the resource fetch dispatch `load`/`error` signals
//!
//! # Design Decisions
//! - Elements are shared handles; identity is pointer identity, not attribute equality
//! - Load state lives in a `watch` channel so late subscribers still see the outcome

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;

/// Relation type for stylesheet links.
pub const REL_STYLESHEET: &str = "stylesheet";
/// Relation type for preload hints.
pub const REL_PRELOAD: &str = "preload";
/// Resource type of a stylesheet preload hint.
pub const AS_STYLE: &str = "style";

/// Load state of a link element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No load or error signal received yet.
    Pending,
    /// The resource loaded.
    Loaded,
    /// The resource failed to load.
    Failed,
}

/// Signals a link element can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    Load,
    Error,
}

struct LinkInner {
    attributes: RwLock<BTreeMap<String, String>>,
    state: watch::Sender<LoadState>,
}

/// A handle to a `<link>` element.
///
/// Cloning the handle does not clone the element.
#[derive(Clone)]
pub struct LinkElement {
    inner: Arc<LinkInner>,
}

impl LinkElement {
    /// Create a link with the given relation and href.
    pub fn new(rel: &str, href: &str) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert("rel".to_string(), rel.to_string());
        attributes.insert("href".to_string(), href.to_string());
        let (state, _) = watch::channel(LoadState::Pending);

        Self {
            inner: Arc::new(LinkInner {
                attributes: RwLock::new(attributes),
                state,
            }),
        }
    }

    /// `<link rel="stylesheet" href=...>`
    pub fn stylesheet(href: &str) -> Self {
        Self::new(REL_STYLESHEET, href)
    }

    /// `<link rel="preload" as="style" href=...>`
    pub fn style_preload(href: &str) -> Self {
        let link = Self::new(REL_PRELOAD, href);
        link.set_attribute("as", AS_STYLE);
        link
    }

    pub fn rel(&self) -> String {
        self.attribute("rel").unwrap_or_default()
    }

    pub fn href(&self) -> String {
        self.attribute("href").unwrap_or_default()
    }

    /// Read an attribute.
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.inner
            .attributes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Set (or overwrite) an attribute.
    pub fn set_attribute(&self, name: &str, value: &str) {
        self.inner
            .attributes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), value.to_string());
    }

    /// Current load state.
    pub fn load_state(&self) -> LoadState {
        *self.inner.state.borrow()
    }

    /// Deliver a `load` or `error` signal to the element.
    pub fn dispatch(&self, event: LinkEvent) {
        let state = match event {
            LinkEvent::Load => LoadState::Loaded,
            LinkEvent::Error => LoadState::Failed,
        };
        self.inner.state.send_replace(state);
    }

    /// Wait until the element has received a load or error signal.
    pub async fn settled(&self) -> LoadState {
        let mut rx = self.inner.state.subscribe();
        let settled = match rx.wait_for(|state| *state != LoadState::Pending).await {
            Ok(state) => *state,
            // The sender lives inside `self`, so it cannot be dropped while we wait.
            Err(_) => self.load_state(),
        };
        settled
    }

    /// True if both handles point at the same element.
    pub fn ptr_eq(&self, other: &LinkElement) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Serialize the element as an HTML tag.
    pub fn to_html(&self) -> String {
        let attributes = self
            .inner
            .attributes
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut html = String::from("<link");
        // rel and href first, the rest in name order.
        for key in ["rel", "href"] {
            if let Some(value) = attributes.get(key) {
                html.push_str(&format!(" {}=\"{}\"", key, value));
            }
        }
        for (key, value) in attributes.iter() {
            if key != "rel" && key != "href" {
                html.push_str(&format!(" {}=\"{}\"", key, value));
            }
        }
        html.push('>');
        html
    }
}

impl PartialEq for LinkElement {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for LinkElement {}

impl fmt::Debug for LinkElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkElement")
            .field("rel", &self.rel())
            .field("href", &self.href())
            .field("state", &self.load_state())
            .finish()
    }
}

/// Attribute selector for `<link>` elements.
///
/// Matches on `rel`, `href` and, when set, `as`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkQuery {
    pub rel: String,
    pub resource_type: Option<String>,
    pub href: String,
}

impl LinkQuery {
    /// `link[rel="stylesheet"][href=...]`
    pub fn stylesheet(href: &str) -> Self {
        Self {
            rel: REL_STYLESHEET.to_string(),
            resource_type: None,
            href: href.to_string(),
        }
    }

    /// `link[rel="preload"][as="style"][href=...]`
    pub fn style_preload(href: &str) -> Self {
        Self {
            rel: REL_PRELOAD.to_string(),
            resource_type: Some(AS_STYLE.to_string()),
            href: href.to_string(),
        }
    }

    pub fn matches(&self, link: &LinkElement) -> bool {
        if link.attribute("rel").as_deref() != Some(self.rel.as_str()) {
            return false;
        }
        if link.attribute("href").as_deref() != Some(self.href.as_str()) {
            return false;
        }
        match &self.resource_type {
            Some(resource_type) => link.attribute("as").as_deref() == Some(resource_type.as_str()),
            None => true,
        }
    }
}
