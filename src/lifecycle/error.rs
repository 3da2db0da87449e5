//! Lifecycle error definitions.

use thiserror::Error;

use crate::assets::ManifestError;

/// Errors surfaced through the lifecycle futures.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// No load or error signal arrived before the deadline.
    #[error(
        "css-lifecycles: While mounting '{app}', loading CSS from URL {url} \
         timed out after {timeout_ms}ms"
    )]
    LoadTimeout { app: String, url: String, timeout_ms: u64 },

    /// The stylesheet reported a load error.
    #[error("css-lifecycles: While mounting '{app}', loading CSS from URL {url} failed.")]
    LoadFailure { app: String, url: String },

    /// The manifest-derived stylesheet URL could not be resolved.
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

impl LifecycleError {
    /// URL of the stylesheet that failed, if the error concerns one.
    pub fn url(&self) -> Option<&str> {
        match self {
            LifecycleError::LoadTimeout { url, .. } | LifecycleError::LoadFailure { url, .. } => {
                Some(url)
            }
            LifecycleError::Manifest(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_app_and_url() {
        let timeout = LifecycleError::LoadTimeout {
            app: "navbar".into(),
            url: "https://example.com/main.css".into(),
            timeout_ms: 5000,
        };
        assert_eq!(
            timeout.to_string(),
            "css-lifecycles: While mounting 'navbar', loading CSS from URL \
             https://example.com/main.css timed out after 5000ms"
        );

        let failure = LifecycleError::LoadFailure {
            app: "navbar".into(),
            url: "https://example.com/main.css".into(),
        };
        assert!(failure
            .to_string()
            .contains("loading CSS from URL https://example.com/main.css failed"));
        assert_eq!(failure.url(), Some("https://example.com/main.css"));
    }
}
