//! Controller-owned link bookkeeping.
//!
//! # Responsibilities
//! - `MountedLinkRegistry`: which element currently represents each URL
//! - `PendingUnmountQueue`: elements this controller created and may remove
//! - `InFlightMounts`: mounts still inserting a stylesheet after an await
//!
//! # Design Decisions
//! - Elements discovered in the document are registered but never queued
//! - The queue is drained by swapping in an empty one; whoever swaps first owns the removals

use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use tokio::sync::watch;

use crate::dom::LinkElement;

/// URL → live element map.
#[derive(Debug, Default)]
pub struct MountedLinkRegistry {
    links: DashMap<String, LinkElement>,
}

impl MountedLinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `link` under `url`, replacing any previous entry.
    pub fn register(&self, url: &str, link: LinkElement) {
        self.links.insert(url.to_string(), link);
    }

    pub fn deregister(&self, url: &str) -> Option<LinkElement> {
        self.links.remove(url).map(|(_, link)| link)
    }

    pub fn get(&self, url: &str) -> Option<LinkElement> {
        self.links.get(url).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Registered URLs, sorted.
    pub fn urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.links.iter().map(|entry| entry.key().clone()).collect();
        urls.sort();
        urls
    }
}

/// An element eligible for removal on unmount.
#[derive(Debug, Clone)]
pub struct PendingUnmount {
    pub link: LinkElement,
    pub url: String,
}

/// Ordered queue of elements to remove on the next unmount.
#[derive(Debug, Default)]
pub struct PendingUnmountQueue {
    entries: Mutex<Vec<PendingUnmount>>,
}

impl PendingUnmountQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, link: LinkElement, url: &str) {
        self.lock().push(PendingUnmount {
            link,
            url: url.to_string(),
        });
    }

    /// Take every queued entry, leaving the queue empty.
    pub fn take(&self) -> Vec<PendingUnmount> {
        mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PendingUnmount>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Counts mounts that may still queue an element for removal.
///
/// Unmount takes the pending queue only once this count is zero.
#[derive(Debug)]
pub struct InFlightMounts {
    count: Arc<watch::Sender<usize>>,
}

impl Default for InFlightMounts {
    fn default() -> Self {
        let (count, _) = watch::channel(0);
        Self {
            count: Arc::new(count),
        }
    }
}

impl InFlightMounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a mount as in flight until the returned guard drops.
    pub fn begin(&self) -> InFlightGuard {
        self.count.send_modify(|count| *count += 1);
        InFlightGuard {
            count: self.count.clone(),
        }
    }

    pub fn count(&self) -> usize {
        *self.count.borrow()
    }

    /// Wait until no mount is in flight.
    pub async fn idle(&self) {
        let mut rx = self.count.subscribe();
        let _ = rx.wait_for(|count| *count == 0).await;
    }
}

/// Held by a mount while it may still insert and queue elements.
#[derive(Debug)]
pub struct InFlightGuard {
    count: Arc<watch::Sender<usize>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.count.send_modify(|count| *count = count.saturating_sub(1));
    }
}
