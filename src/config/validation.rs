//! Configuration validation.
//!
//! # Responsibilities
//! - Reject options that are absent, `null` or not an object
//! - Reject a `cssUrls` that is not an array
//! - Reject a per-URL `shouldUnmount` that is present but not a boolean
//! - Reject a non-empty `cssUrls` whose every URL is empty
//! - Reject a manifest URL that is not absolute
//!
//! # Design Decisions
//! - Shape checks run on the raw JSON value before serde sees it, so callers get
//!   the same error for `null` as for a missing value
//! - A list mixing empty and non-empty URLs passes; only the all-empty list fails

use serde_json::Value;
use url::Url;

use crate::config::loader::ConfigError;
use crate::config::schema::CssOptions;

/// Parse and validate options from a dynamically-typed value.
pub fn parse_options(raw: Option<&Value>) -> Result<CssOptions, ConfigError> {
    let object = match raw {
        Some(Value::Object(object)) => object,
        _ => {
            return Err(ConfigError::InvalidConfiguration(
                "opts must be an object".to_string(),
            ))
        }
    };

    if let Some(css_urls) = object.get("cssUrls") {
        let entries = css_urls.as_array().ok_or_else(|| {
            ConfigError::InvalidConfiguration("cssUrls must be an array".to_string())
        })?;
        for entry in entries {
            // `null` would otherwise deserialize as "no override".
            if let Some(should_unmount) = entry.get("shouldUnmount") {
                if !should_unmount.is_boolean() {
                    return Err(ConfigError::InvalidConfiguration(format!(
                        "shouldUnmount must be a boolean, got {}",
                        should_unmount
                    )));
                }
            }
        }
    }

    let options: CssOptions = serde_json::from_value(Value::Object(object.clone()))
        .map_err(|e| ConfigError::InvalidConfiguration(e.to_string()))?;

    validate_options(&options)?;
    Ok(options)
}

/// Semantic checks on already-typed options.
pub fn validate_options(options: &CssOptions) -> Result<(), ConfigError> {
    let all_empty = options.css_urls.iter().all(|spec| spec.href().is_empty());
    if !options.css_urls.is_empty() && all_empty {
        return Err(ConfigError::InvalidConfiguration(
            "cssUrls must contain at least one non-empty URL".to_string(),
        ));
    }

    if let Some(manifest_url) = &options.manifest_url {
        Url::parse(manifest_url).map_err(|e| {
            ConfigError::InvalidConfiguration(format!(
                "manifestUrl '{}' is not a valid URL: {}",
                manifest_url, e
            ))
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn is_invalid(result: Result<CssOptions, ConfigError>) -> bool {
        matches!(result, Err(ConfigError::InvalidConfiguration(_)))
    }

    #[test]
    fn test_rejects_non_objects() {
        assert!(is_invalid(parse_options(None)));
        assert!(is_invalid(parse_options(Some(&Value::Null))));
        assert!(is_invalid(parse_options(Some(&json!("asdfsdf")))));
        assert!(is_invalid(parse_options(Some(&json!(42)))));
        assert!(is_invalid(parse_options(Some(&json!(["/main.css"])))));
    }

    #[test]
    fn test_rejects_non_array_css_urls() {
        assert!(is_invalid(parse_options(Some(&json!({ "cssUrls": "/main.css" })))));
        assert!(is_invalid(parse_options(Some(&json!({ "cssUrls": { "href": "/main.css" } })))));
    }

    #[test]
    fn test_empty_url_boundary() {
        assert!(is_invalid(parse_options(Some(&json!({ "cssUrls": [""] })))));
        assert!(is_invalid(parse_options(Some(&json!({ "cssUrls": ["", { "href": "" }] })))));

        let mixed = parse_options(Some(&json!({ "cssUrls": ["", "/main.css"] }))).unwrap();
        assert_eq!(mixed.css_urls.len(), 2);

        let empty = parse_options(Some(&json!({ "cssUrls": [] }))).unwrap();
        assert!(empty.css_urls.is_empty());
    }

    #[test]
    fn test_overlays_defaults() {
        let raw = json!({ "cssUrls": ["/a.css"], "shouldUnmount": false });
        let opts = parse_options(Some(&raw)).unwrap();
        assert!(!opts.should_unmount);
        assert_eq!(opts.timeout, 5000);

        let opts = parse_options(Some(&json!({}))).unwrap();
        assert!(opts.css_urls.is_empty());
        assert!(opts.should_unmount);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(is_invalid(parse_options(Some(&json!({ "timeout": -1 })))));
        assert!(is_invalid(parse_options(Some(&json!({ "manifestUrl": "not a url" })))));
    }

    #[test]
    fn test_rejects_non_boolean_url_policy() {
        let null_policy = json!({ "cssUrls": [{ "href": "/a.css", "shouldUnmount": null }] });
        assert!(is_invalid(parse_options(Some(&null_policy))));

        let string_policy = json!({ "cssUrls": [{ "href": "/a.css", "shouldUnmount": "no" }] });
        assert!(is_invalid(parse_options(Some(&string_policy))));

        let absent = json!({ "cssUrls": [{ "href": "/a.css" }, "/b.css"] });
        assert_eq!(parse_options(Some(&absent)).unwrap().css_urls.len(), 2);
    }
}
