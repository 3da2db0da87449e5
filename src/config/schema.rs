//! Configuration schema definitions.
//!
//! `CssOptions` is what an application hands to the lifecycle controller.
//! `HostConfig` is the file the `css-lifecycles` binary reads; it embeds a
//! `CssOptions` table alongside host-only settings.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assets::BuildAssets;
use crate::dom::LinkElement;

/// Default time to wait for a stylesheet's load signal.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// One stylesheet to manage.
///
/// Either a bare URL or a URL with its own unmount policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StylesheetSpec {
    Url(String),
    WithPolicy {
        href: String,
        /// Overrides the controller-wide policy when present.
        #[serde(
            rename = "shouldUnmount",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        should_unmount: Option<bool>,
    },
}

impl StylesheetSpec {
    pub fn href(&self) -> &str {
        match self {
            StylesheetSpec::Url(url) => url,
            StylesheetSpec::WithPolicy { href, .. } => href,
        }
    }

    /// The per-URL unmount override, if any.
    pub fn should_unmount(&self) -> Option<bool> {
        match self {
            StylesheetSpec::Url(_) => None,
            StylesheetSpec::WithPolicy { should_unmount, .. } => *should_unmount,
        }
    }
}

impl From<&str> for StylesheetSpec {
    fn from(url: &str) -> Self {
        StylesheetSpec::Url(url.to_string())
    }
}

impl From<String> for StylesheetSpec {
    fn from(url: String) -> Self {
        StylesheetSpec::Url(url)
    }
}

/// Builds the `<link>` element inserted for a stylesheet URL.
///
/// The default builds `<link rel="stylesheet" href=url>`. A custom factory can
/// add attributes such as `integrity` or `crossorigin`.
#[derive(Clone)]
pub struct LinkFactory(Arc<dyn Fn(&str) -> LinkElement + Send + Sync>);

impl LinkFactory {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&str) -> LinkElement + Send + Sync + 'static,
    {
        Self(Arc::new(factory))
    }

    pub fn create(&self, url: &str) -> LinkElement {
        (self.0)(url)
    }
}

impl Default for LinkFactory {
    fn default() -> Self {
        Self::new(LinkElement::stylesheet)
    }
}

impl fmt::Debug for LinkFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LinkFactory(..)")
    }
}

/// Caller-supplied options for a lifecycle controller.
///
/// Field names follow the camelCase keys applications already use.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CssOptions {
    /// Stylesheets to manage, in order.
    pub css_urls: Vec<StylesheetSpec>,

    /// Milliseconds to wait for each stylesheet's load signal during mount.
    pub timeout: u64,

    /// Unmount policy for stylesheets that do not carry their own.
    pub should_unmount: bool,

    /// Append the build-extracted CSS assets to `css_urls`.
    pub use_extracted_assets: bool,

    /// JSON manifest naming an additional stylesheet under `"main.css"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_url: Option<String>,

    #[serde(skip)]
    pub link_factory: LinkFactory,
}

impl Default for CssOptions {
    fn default() -> Self {
        Self {
            css_urls: Vec::new(),
            timeout: DEFAULT_TIMEOUT_MS,
            should_unmount: true,
            use_extracted_assets: false,
            manifest_url: None,
            link_factory: LinkFactory::default(),
        }
    }
}

impl CssOptions {
    /// Options managing the given URLs with every other field defaulted.
    pub fn with_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StylesheetSpec>,
    {
        Self {
            css_urls: urls.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Root configuration for the `css-lifecycles` host binary.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HostConfig {
    /// The application being orchestrated.
    pub app: AppConfig,

    /// Stylesheet options for the application.
    pub css: CssOptions,

    /// Build-extracted CSS assets, required when `css.useExtractedAssets` is set.
    pub build_assets: Option<BuildAssets>,

    /// HTTP stylesheet loader settings.
    pub loader: LoaderConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Application identity passed to the lifecycle hooks.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application name, used in diagnostics.
    pub name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "app".to_string(),
        }
    }
}

/// Stylesheet loader configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Base URL relative stylesheet hrefs are resolved against.
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = CssOptions::default();
        assert!(opts.css_urls.is_empty());
        assert_eq!(opts.timeout, 5000);
        assert!(opts.should_unmount);
        assert!(!opts.use_extracted_assets);
        assert!(opts.manifest_url.is_none());
    }

    #[test]
    fn test_stylesheet_spec_shapes() {
        let specs: Vec<StylesheetSpec> = serde_json::from_str(
            r#"["/1.css", {"href": "/2.css", "shouldUnmount": false}, {"href": "/3.css"}]"#,
        )
        .unwrap();

        assert_eq!(specs[0], StylesheetSpec::Url("/1.css".into()));
        assert_eq!(specs[1].href(), "/2.css");
        assert_eq!(specs[1].should_unmount(), Some(false));
        assert_eq!(specs[2].href(), "/3.css");
        assert_eq!(specs[2].should_unmount(), None);
    }

    #[test]
    fn test_custom_link_factory() {
        let factory = LinkFactory::new(|url| {
            let link = LinkElement::stylesheet(url);
            link.set_attribute("crossorigin", "anonymous");
            link
        });
        let link = factory.create("/a.css");
        assert_eq!(link.href(), "/a.css");
        assert_eq!(link.attribute("crossorigin").as_deref(), Some("anonymous"));
    }

    #[test]
    fn test_host_config_from_toml() {
        let config: HostConfig = toml::from_str(
            r#"
            [app]
            name = "navbar"

            [css]
            cssUrls = [
                "https://cdn.example.com/navbar.css",
                { href = "/shared.css", shouldUnmount = false },
            ]
            timeout = 2500
            "#,
        )
        .unwrap();

        assert_eq!(config.app.name, "navbar");
        assert_eq!(config.css.css_urls.len(), 2);
        assert_eq!(config.css.timeout, 2500);
        assert!(config.css.should_unmount);
        assert!(config.build_assets.is_none());
        assert_eq!(config.observability.log_level, "info");
    }
}
