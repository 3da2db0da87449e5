//! The document the stylesheet links live in.

use std::sync::{Arc, Mutex, PoisonError};

use crate::dom::element::{LinkElement, LinkQuery, REL_STYLESHEET};

/// Primitive document operations the lifecycle controller relies on.
pub trait Document: Send + Sync {
    /// First link in the head matching the query, in document order.
    fn query_link(&self, query: &LinkQuery) -> Option<LinkElement>;

    /// Append a link to the end of the head.
    fn append_to_head(&self, link: LinkElement);

    /// Detach a link from the head.
    ///
    /// Returns false if the link was not attached.
    fn remove_link(&self, link: &LinkElement) -> bool;
}

/// Starts fetching the resource of a newly attached stylesheet link.
///
/// Implementations signal completion through [`LinkElement::dispatch`].
pub trait ResourceLoader: Send + Sync {
    fn load(&self, link: &LinkElement);
}

/// In-memory document head.
#[derive(Default)]
pub struct HeadDocument {
    links: Mutex<Vec<LinkElement>>,
    loader: Option<Arc<dyn ResourceLoader>>,
}

impl HeadDocument {
    /// Create an empty head. Nothing loads by itself; signals must be dispatched by hand.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty head that hands every appended stylesheet to `loader`.
    pub fn with_loader(loader: Arc<dyn ResourceLoader>) -> Self {
        Self {
            links: Mutex::new(Vec::new()),
            loader: Some(loader),
        }
    }

    /// All links matching the query, in document order.
    pub fn query_all(&self, query: &LinkQuery) -> Vec<LinkElement> {
        self.lock()
            .iter()
            .filter(|link| query.matches(link))
            .cloned()
            .collect()
    }

    /// True if this exact element is attached.
    pub fn contains(&self, link: &LinkElement) -> bool {
        self.lock().iter().any(|l| l.ptr_eq(link))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove every link.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Render the head as HTML, one element per line.
    pub fn render_head(&self) -> String {
        let links = self.lock();
        let mut html = String::from("<head>\n");
        for link in links.iter() {
            html.push_str("  ");
            html.push_str(&link.to_html());
            html.push('\n');
        }
        html.push_str("</head>");
        html
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LinkElement>> {
        self.links.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Document for HeadDocument {
    fn query_link(&self, query: &LinkQuery) -> Option<LinkElement> {
        self.lock().iter().find(|link| query.matches(link)).cloned()
    }

    fn append_to_head(&self, link: LinkElement) {
        let is_stylesheet = link.rel() == REL_STYLESHEET;
        self.lock().push(link.clone());

        // The lock is released before the loader runs; loaders may dispatch synchronously.
        if is_stylesheet {
            if let Some(loader) = &self.loader {
                loader.load(&link);
            }
        }
    }

    fn remove_link(&self, link: &LinkElement) -> bool {
        let mut links = self.lock();
        match links.iter().position(|l| l.ptr_eq(link)) {
            Some(index) => {
                links.remove(index);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for HeadDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadDocument")
            .field("links", &self.len())
            .field("has_loader", &self.loader.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::element::{LinkEvent, LoadState};

    struct LoadImmediately;

    impl ResourceLoader for LoadImmediately {
        fn load(&self, link: &LinkElement) {
            link.dispatch(LinkEvent::Load);
        }
    }

    #[test]
    fn test_query_returns_first_match() {
        let doc = HeadDocument::new();
        let first = LinkElement::stylesheet("/a.css");
        let second = LinkElement::stylesheet("/a.css");
        doc.append_to_head(first.clone());
        doc.append_to_head(second);

        let found = doc.query_link(&LinkQuery::stylesheet("/a.css")).unwrap();
        assert_eq!(found, first);
        assert_eq!(doc.query_all(&LinkQuery::stylesheet("/a.css")).len(), 2);
    }

    #[test]
    fn test_remove_detached_link() {
        let doc = HeadDocument::new();
        let link = LinkElement::stylesheet("/a.css");
        doc.append_to_head(link.clone());

        assert!(doc.remove_link(&link));
        assert!(!doc.remove_link(&link));
        assert!(doc.is_empty());
    }

    #[test]
    fn test_loader_only_sees_stylesheets() {
        let doc = HeadDocument::with_loader(Arc::new(LoadImmediately));
        let sheet = LinkElement::stylesheet("/a.css");
        let preload = LinkElement::style_preload("/a.css");
        doc.append_to_head(sheet.clone());
        doc.append_to_head(preload.clone());

        assert_eq!(sheet.load_state(), LoadState::Loaded);
        assert_eq!(preload.load_state(), LoadState::Pending);
    }

    #[test]
    fn test_render_head() {
        let doc = HeadDocument::new();
        doc.append_to_head(LinkElement::style_preload("/a.css"));
        assert_eq!(
            doc.render_head(),
            "<head>\n  <link rel=\"preload\" href=\"/a.css\" as=\"style\">\n</head>"
        );
    }
}
