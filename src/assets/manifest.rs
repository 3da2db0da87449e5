//! Manifest-derived stylesheet URL.
//!
//! A deployment may publish a JSON manifest mapping logical asset names to
//! their build-versioned paths. The stylesheet named `"main.css"` in that
//! manifest is managed alongside the configured URLs.

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::observability::metrics;

/// Manifest key naming the stylesheet.
pub const MANIFEST_CSS_KEY: &str = "main.css";

/// Errors fetching or reading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Transport failure or undecodable body.
    #[error("failed to fetch manifest: {0}")]
    Request(#[from] reqwest::Error),

    #[error("manifest {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("manifest {url} has no string entry for '{key}'")]
    MissingEntry { url: String, key: String },
}

/// Fetches a manifest and derives the stylesheet URL from it.
#[derive(Debug, Clone)]
pub struct ManifestClient {
    client: Client,
    url: Url,
}

impl ManifestClient {
    pub fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch the manifest and return the absolute stylesheet URL it names.
    ///
    /// Every call fetches; nothing is cached between lifecycle phases.
    pub async fn stylesheet_url(&self) -> Result<String, ManifestError> {
        let result = self.fetch_entry().await;
        metrics::record_manifest_fetch(result.is_ok());

        match &result {
            Ok(url) => tracing::debug!(
                manifest = %self.url,
                stylesheet = %url,
                "Resolved manifest stylesheet"
            ),
            Err(e) => tracing::warn!(manifest = %self.url, error = %e, "Manifest lookup failed"),
        }
        result
    }

    async fn fetch_entry(&self) -> Result<String, ManifestError> {
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ManifestError::Status {
                url: self.url.to_string(),
                status: status.as_u16(),
            });
        }

        let manifest: Value = response.json().await?;
        let entry = manifest
            .get(MANIFEST_CSS_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| ManifestError::MissingEntry {
                url: self.url.to_string(),
                key: MANIFEST_CSS_KEY.to_string(),
            })?;

        Ok(prefix_origin(&self.url, entry))
    }
}

/// Prefix `path` with the origin of `manifest_url`.
pub fn prefix_origin(manifest_url: &Url, path: &str) -> String {
    let origin = manifest_url.origin().ascii_serialization();
    if path.starts_with('/') {
        format!("{}{}", origin, path)
    } else {
        format!("{}/{}", origin, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_origin() {
        let manifest =
            Url::parse("https://cdn.example.com:8443/apps/navbar/manifest.json").unwrap();
        assert_eq!(
            prefix_origin(&manifest, "/apps/navbar/main.12ab.css"),
            "https://cdn.example.com:8443/apps/navbar/main.12ab.css"
        );
        assert_eq!(
            prefix_origin(&manifest, "main.12ab.css"),
            "https://cdn.example.com:8443/main.12ab.css"
        );
    }

    #[test]
    fn test_default_port_is_dropped() {
        let manifest = Url::parse("https://cdn.example.com:443/manifest.json").unwrap();
        assert_eq!(prefix_origin(&manifest, "/main.css"), "https://cdn.example.com/main.css");
    }
}
