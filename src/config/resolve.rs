//! Effective configuration resolution.
//!
//! Overlays caller options on the defaults and, when requested, appends the
//! build-extracted CSS assets to the stylesheet list.

use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::assets::BuildAssets;
use crate::config::loader::ConfigError;
use crate::config::schema::{CssOptions, LinkFactory, StylesheetSpec};
use crate::config::validation::{parse_options, validate_options};

/// Fully resolved controller configuration.
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    /// Caller stylesheets followed by extracted assets, in order.
    pub css_urls: Vec<StylesheetSpec>,
    pub timeout_ms: u64,
    pub default_should_unmount: bool,
    pub manifest_url: Option<Url>,
    pub link_factory: LinkFactory,
}

impl EffectiveConfig {
    /// Resolve typed options.
    pub fn resolve(
        options: CssOptions,
        build_assets: Option<&BuildAssets>,
    ) -> Result<Self, ConfigError> {
        validate_options(&options)?;

        let mut css_urls = options.css_urls;
        if options.use_extracted_assets {
            let assets = build_assets.ok_or(ConfigError::MissingBuildIntegration)?;
            css_urls.extend(assets.urls().into_iter().map(StylesheetSpec::Url));
        }

        let manifest_url = match options.manifest_url {
            Some(raw) => Some(Url::parse(&raw).map_err(|e| {
                ConfigError::InvalidConfiguration(format!(
                    "manifestUrl '{}' is not a valid URL: {}",
                    raw, e
                ))
            })?),
            None => None,
        };

        Ok(Self {
            css_urls,
            timeout_ms: options.timeout,
            default_should_unmount: options.should_unmount,
            manifest_url,
            link_factory: options.link_factory,
        })
    }

    /// Resolve options given as a dynamically-typed value.
    pub fn from_value(
        raw: Option<&Value>,
        build_assets: Option<&BuildAssets>,
    ) -> Result<Self, ConfigError> {
        let options = parse_options(raw)?;
        Self::resolve(options, build_assets)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
