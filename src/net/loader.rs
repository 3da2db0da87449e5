//! HTTP stylesheet loader.
//!
//! Plays the browser's part for a headless document: when a stylesheet link
//! is attached, fetch its href and deliver `load` or `error` to the element.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, TryCurrentError};
use url::Url;

use crate::dom::{LinkElement, LinkEvent, ResourceLoader};

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("stylesheet loader must be created inside a Tokio runtime: {0}")]
    NoRuntime(#[from] TryCurrentError),
}

/// Fetches stylesheet hrefs over HTTP and signals the outcome on the element.
#[derive(Debug, Clone)]
pub struct HttpStylesheetLoader {
    rt: Handle,
    client: Client,
    base_url: Url,
}

impl HttpStylesheetLoader {
    /// Create a loader resolving relative hrefs against `base_url`.
    ///
    /// Must be called from within a Tokio runtime; fetches are spawned on it.
    pub fn new(base_url: Url, request_timeout: Duration) -> Result<Self, LoaderError> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: Url) -> Result<Self, LoaderError> {
        Ok(Self {
            rt: Handle::try_current()?,
            client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn fetch(client: Client, url: Url) -> LinkEvent {
        let response = match client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Stylesheet request failed");
                return LinkEvent::Error;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                url = %url,
                status = %status,
                "Stylesheet request returned non-success status"
            );
            return LinkEvent::Error;
        }

        match response.bytes().await {
            Ok(body) => {
                tracing::debug!(url = %url, bytes = body.len(), "Stylesheet fetched");
                LinkEvent::Load
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Stylesheet body could not be read");
                LinkEvent::Error
            }
        }
    }
}

impl ResourceLoader for HttpStylesheetLoader {
    fn load(&self, link: &LinkElement) {
        let href = link.href();
        let url = match self.base_url.join(&href) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(href = %href, error = %e, "Cannot resolve stylesheet href");
                link.dispatch(LinkEvent::Error);
                return;
            }
        };

        let client = self.client.clone();
        let link = link.clone();
        self.rt.spawn(async move {
            let event = Self::fetch(client, url).await;
            link.dispatch(event);
        });
    }
}
