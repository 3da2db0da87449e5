//! Build-extracted CSS assets.
//!
//! The build step that extracts CSS from bundled modules records, for each
//! extracted asset, its identifier and content hash, plus the filename
//! template and public path used for output. At runtime those values turn
//! into stylesheet URLs.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// One extracted CSS asset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CssAsset {
    /// Chunk identifier.
    pub id: String,
    /// Content hash of the extracted CSS.
    #[serde(default)]
    pub content_hash: String,
}

/// Asset data exposed by the build.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildAssets {
    /// Public base path the assets are served from, e.g. `/static/`.
    #[serde(default)]
    pub public_path: String,

    /// Output filename template; `[id]`, `[name]` and `[contenthash]` are substituted.
    #[serde(default = "default_filename_template")]
    pub filename_template: String,

    /// Extracted assets, in emission order.
    #[serde(default)]
    pub css_assets: Vec<CssAsset>,
}

fn default_filename_template() -> String {
    "[name].css".to_string()
}

impl BuildAssets {
    /// Load asset data from the JSON file written by the build.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let assets = serde_json::from_str(&content)?;
        Ok(assets)
    }

    /// Output filename of an asset.
    pub fn file_name(&self, asset: &CssAsset) -> String {
        self.filename_template
            .replace("[id]", &asset.id)
            .replace("[name]", &asset.id)
            .replace("[contenthash]", &asset.content_hash)
    }

    /// Stylesheet URL of every asset, in order.
    pub fn urls(&self) -> Vec<String> {
        self.css_assets
            .iter()
            .map(|asset| format!("{}{}", self.public_path, self.file_name(asset)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_template() {
        let assets = BuildAssets {
            public_path: "https://cdn.example.com/navbar/".to_string(),
            filename_template: "css/[id].[contenthash].css".to_string(),
            css_assets: vec![
                CssAsset { id: "main".into(), content_hash: "a1b2".into() },
                CssAsset { id: "42".into(), content_hash: "c3d4".into() },
            ],
        };

        assert_eq!(
            assets.urls(),
            vec![
                "https://cdn.example.com/navbar/css/main.a1b2.css",
                "https://cdn.example.com/navbar/css/42.c3d4.css",
            ]
        );
    }

    #[test]
    fn test_defaults_from_json() {
        let assets: BuildAssets =
            serde_json::from_str(r#"{"css_assets": [{"id": "main"}]}"#).unwrap();
        assert_eq!(assets.filename_template, "[name].css");
        assert_eq!(assets.urls(), vec!["main.css"]);
    }

    #[test]
    fn test_load_from_file() {
        let file_name = format!("css-lifecycles-assets-{}.json", std::process::id());
        let path = std::env::temp_dir().join(file_name);
        fs::write(
            &path,
            r#"{
                "public_path": "/",
                "filename_template": "[name].[contenthash].css",
                "css_assets": [{"id": "app", "content_hash": "ff00"}]
            }"#,
        )
        .unwrap();

        let assets = BuildAssets::load(&path).unwrap();
        assert_eq!(assets.urls(), vec!["/app.ff00.css"]);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let file_name = format!("css-lifecycles-bad-assets-{}.json", std::process::id());
        let path = std::env::temp_dir().join(file_name);
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(BuildAssets::load(&path), Err(ConfigError::Json(_))));
        let _ = fs::remove_file(path);
    }
}
