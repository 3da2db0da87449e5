//! The lifecycle controller.
//!
//! `bootstrap`, `mount` and `unmount` do their document work synchronously
//! when called and return a future for the part that has to wait. A host can
//! therefore rely on the following as soon as a hook returns, before awaiting:
//! - after `bootstrap`: preload hints for the configured URLs are in the head
//! - after `mount`: stylesheet links for the configured URLs are in the head
//! - after `unmount`: the pending-removal queue has been taken, so a second
//!   overlapping `unmount` removes nothing
//!
//! The manifest stylesheet is the exception: its URL is only known once the
//! manifest is fetched. While a mount is still fetching it, `unmount` waits
//! for that mount to insert and queue the element before taking the queue.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::{join_all, try_join_all};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::time::{sleep_until, Duration, Instant};

use crate::assets::{BuildAssets, ManifestClient};
use crate::config::{ConfigError, CssOptions, EffectiveConfig};
use crate::dom::{Document, LinkElement, LinkQuery, LoadState};
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::policy::{resolve_all, ResolvedStylesheet};
use crate::lifecycle::registry::{
    InFlightGuard, InFlightMounts, MountedLinkRegistry, PendingUnmount, PendingUnmountQueue,
};
use crate::observability::metrics::{self, LoadOutcome};

/// Properties the host passes to every lifecycle hook.
///
/// Only `name` is read, for diagnostics.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppProps {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppProps {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: Map::new(),
        }
    }
}

/// Builder for [`CssLifecycles`].
pub struct CssLifecyclesBuilder {
    document: Arc<dyn Document>,
    build_assets: Option<BuildAssets>,
    http_client: Option<Client>,
}

impl CssLifecyclesBuilder {
    /// Asset data from the build, required when extracted assets are enabled.
    pub fn build_assets(mut self, assets: BuildAssets) -> Self {
        self.build_assets = Some(assets);
        self
    }

    /// HTTP client used for manifest lookups.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn build(self, options: CssOptions) -> Result<CssLifecycles, ConfigError> {
        let config = EffectiveConfig::resolve(options, self.build_assets.as_ref())?;
        Ok(self.finish(config))
    }

    /// Build from options given as a dynamically-typed value.
    pub fn build_from_value(self, raw: Option<&Value>) -> Result<CssLifecycles, ConfigError> {
        let config = EffectiveConfig::from_value(raw, self.build_assets.as_ref())?;
        Ok(self.finish(config))
    }

    fn finish(self, config: EffectiveConfig) -> CssLifecycles {
        let stylesheets = resolve_all(&config.css_urls, config.default_should_unmount);
        let manifest = config.manifest_url.clone().map(|url| {
            let client = self.http_client.unwrap_or_default();
            ManifestClient::new(client, url)
        });

        tracing::debug!(
            stylesheets = stylesheets.len(),
            timeout_ms = config.timeout_ms,
            should_unmount = config.default_should_unmount,
            manifest = config.manifest_url.is_some(),
            "CSS lifecycles configured"
        );

        CssLifecycles {
            config,
            stylesheets,
            document: self.document,
            manifest,
            mounted: MountedLinkRegistry::new(),
            pending_unmount: PendingUnmountQueue::new(),
            manifest_mounts: InFlightMounts::new(),
        }
    }
}

/// Outcome of inserting (or finding) one stylesheet during mount.
enum PendingLoad {
    /// A matching stylesheet was already in the document.
    Satisfied,
    /// A new element was inserted and must signal before `deadline`.
    Waiting {
        link: LinkElement,
        url: String,
        inserted_at: Instant,
        deadline: Instant,
    },
}

impl PendingLoad {
    /// Wait for the element's signal. A deadline that has passed wins over a
    /// signal observed at the same time.
    async fn wait(self, app: &str, timeout_ms: u64) -> Result<(), LifecycleError> {
        let (link, url, inserted_at, deadline) = match self {
            PendingLoad::Satisfied => return Ok(()),
            PendingLoad::Waiting {
                link,
                url,
                inserted_at,
                deadline,
            } => (link, url, inserted_at, deadline),
        };

        let outcome = if Instant::now() >= deadline {
            None
        } else {
            tokio::select! {
                biased;
                _ = sleep_until(deadline) => None,
                state = link.settled() => Some(state),
            }
        };

        match outcome {
            Some(LoadState::Loaded) => {
                metrics::record_link_load(LoadOutcome::Loaded, Some(inserted_at.elapsed()));
                tracing::debug!(app = %app, url = %url, "Stylesheet loaded");
                Ok(())
            }
            Some(LoadState::Failed) | Some(LoadState::Pending) => {
                metrics::record_link_load(LoadOutcome::Failed, None);
                tracing::warn!(app = %app, url = %url, "Stylesheet failed to load");
                Err(LifecycleError::LoadFailure {
                    app: app.to_string(),
                    url,
                })
            }
            None => {
                metrics::record_link_load(LoadOutcome::Timeout, None);
                tracing::warn!(app = %app, url = %url, timeout_ms, "Stylesheet load timed out");
                Err(LifecycleError::LoadTimeout {
                    app: app.to_string(),
                    url,
                    timeout_ms,
                })
            }
        }
    }
}

/// Stylesheet lifecycle hooks for one application.
pub struct CssLifecycles {
    config: EffectiveConfig,
    stylesheets: Vec<ResolvedStylesheet>,
    document: Arc<dyn Document>,
    manifest: Option<ManifestClient>,
    mounted: MountedLinkRegistry,
    pending_unmount: PendingUnmountQueue,
    manifest_mounts: InFlightMounts,
}

impl CssLifecycles {
    pub fn builder(document: Arc<dyn Document>) -> CssLifecyclesBuilder {
        CssLifecyclesBuilder {
            document,
            build_assets: None,
            http_client: None,
        }
    }

    /// Controller with no build assets and the default HTTP client.
    pub fn new(document: Arc<dyn Document>, options: CssOptions) -> Result<Self, ConfigError> {
        Self::builder(document).build(options)
    }

    pub fn config(&self) -> &EffectiveConfig {
        &self.config
    }

    /// Configured stylesheets with their resolved unmount policy.
    pub fn stylesheets(&self) -> &[ResolvedStylesheet] {
        &self.stylesheets
    }

    /// Element currently registered for `url`.
    pub fn mounted_link(&self, url: &str) -> Option<LinkElement> {
        self.mounted.get(url)
    }

    pub fn mounted_urls(&self) -> Vec<String> {
        self.mounted.urls()
    }

    /// Number of elements the next `unmount` would remove.
    pub fn pending_unmount_count(&self) -> usize {
        self.pending_unmount.len()
    }

    /// Insert a preload hint for every stylesheet not already hinted.
    ///
    /// Never waits for the preloads themselves. Fails only if a manifest is
    /// configured and its stylesheet URL cannot be resolved.
    pub fn bootstrap(
        &self,
        props: &AppProps,
    ) -> impl Future<Output = Result<(), LifecycleError>> + '_ {
        for stylesheet in &self.stylesheets {
            self.ensure_preload(&stylesheet.url);
        }
        self.finish_bootstrap(props.name.clone())
    }

    /// Insert every stylesheet not already in the document and wait for them to load.
    ///
    /// Resolves once every stylesheet has loaded; fails with the first
    /// `LoadFailure` or `LoadTimeout`. Elements already inserted stay in place
    /// on failure.
    pub fn mount(
        &self,
        props: &AppProps,
    ) -> impl Future<Output = Result<(), LifecycleError>> + '_ {
        let pending: Vec<PendingLoad> = self
            .stylesheets
            .iter()
            .map(|stylesheet| self.mount_stylesheet(stylesheet))
            .collect();
        let manifest_mount = self.manifest.as_ref().map(|_| self.manifest_mounts.begin());
        self.finish_mount(props.name.clone(), pending, manifest_mount)
    }

    /// Remove the stylesheets this controller inserted and is allowed to remove.
    ///
    /// Never fails. Elements that were already detached are skipped.
    pub fn unmount(&self, props: &AppProps) -> impl Future<Output = ()> + '_ {
        let drained = if self.manifest_mounts.count() == 0 {
            Some(self.pending_unmount.take())
        } else {
            None
        };
        self.finish_unmount(props.name.clone(), drained)
    }

    fn ensure_preload(&self, url: &str) {
        if self.document.query_link(&LinkQuery::style_preload(url)).is_some() {
            tracing::trace!(url = %url, "Preload hint already present");
            return;
        }
        self.document.append_to_head(LinkElement::style_preload(url));
        metrics::record_preload_inserted();
        tracing::debug!(url = %url, "Inserted preload hint");
    }

    async fn finish_bootstrap(&self, app: String) -> Result<(), LifecycleError> {
        if let Some(manifest) = &self.manifest {
            let url = manifest.stylesheet_url().await?;
            self.ensure_preload(&url);
        }
        tracing::debug!(app = %app, "Bootstrap complete");
        Ok(())
    }

    fn mount_stylesheet(&self, stylesheet: &ResolvedStylesheet) -> PendingLoad {
        let url = &stylesheet.url;

        if let Some(existing) = self.document.query_link(&LinkQuery::stylesheet(url)) {
            self.mounted.register(url, existing);
            metrics::record_link_load(LoadOutcome::Existing, None);
            tracing::debug!(url = %url, "Stylesheet already in document");
            return PendingLoad::Satisfied;
        }

        let inserted_at = Instant::now();
        let deadline = inserted_at + Duration::from_millis(self.config.timeout_ms);

        let link = self.config.link_factory.create(url);
        self.mounted.register(url, link.clone());
        self.document.append_to_head(link.clone());

        if stylesheet.should_unmount {
            self.pending_unmount.push(link.clone(), url);
        }
        tracing::debug!(
            url = %url,
            should_unmount = stylesheet.should_unmount,
            "Inserted stylesheet"
        );

        PendingLoad::Waiting {
            link,
            url: url.clone(),
            inserted_at,
            deadline,
        }
    }

    async fn finish_mount(
        &self,
        app: String,
        mut pending: Vec<PendingLoad>,
        manifest_mount: Option<InFlightGuard>,
    ) -> Result<(), LifecycleError> {
        if let Some(manifest) = &self.manifest {
            let url = manifest.stylesheet_url().await?;
            let stylesheet = ResolvedStylesheet {
                url,
                should_unmount: self.config.default_should_unmount,
            };
            pending.push(self.mount_stylesheet(&stylesheet));
        }
        // Everything this mount inserts is queued; a waiting unmount may proceed.
        drop(manifest_mount);

        let timeout_ms = self.config.timeout_ms;
        try_join_all(pending.into_iter().map(|load| load.wait(&app, timeout_ms))).await?;

        tracing::info!(app = %app, mounted = self.mounted.len(), "Stylesheets mounted");
        Ok(())
    }

    async fn finish_unmount(&self, app: String, drained: Option<Vec<PendingUnmount>>) {
        let drained = match drained {
            Some(drained) => drained,
            None => {
                tracing::debug!(app = %app, "Waiting for manifest stylesheet before unmount");
                self.manifest_mounts.idle().await;
                self.pending_unmount.take()
            }
        };

        if drained.is_empty() {
            tracing::debug!(app = %app, "Nothing to unmount");
            return;
        }

        let removals = drained.into_iter().map(|entry| async move {
            self.mounted.deregister(&entry.url);
            let removed = self.document.remove_link(&entry.link);
            if !removed {
                tracing::debug!(url = %entry.url, "Stylesheet already detached");
            }
            removed
        });
        let removed = join_all(removals)
            .await
            .into_iter()
            .filter(|removed| *removed)
            .count();

        metrics::record_links_unmounted(removed);
        tracing::info!(app = %app, removed, "Stylesheets unmounted");
    }
}

impl std::fmt::Debug for CssLifecycles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CssLifecycles")
            .field("stylesheets", &self.stylesheets)
            .field("timeout_ms", &self.config.timeout_ms)
            .field("manifest", &self.manifest.as_ref().map(|m| m.url().as_str()))
            .field("mounted", &self.mounted.len())
            .field("pending_unmount", &self.pending_unmount.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{HeadDocument, LinkEvent};

    fn setup(options: CssOptions) -> (Arc<HeadDocument>, CssLifecycles) {
        let doc = Arc::new(HeadDocument::new());
        let lifecycles = CssLifecycles::new(doc.clone(), options).unwrap();
        (doc, lifecycles)
    }

    #[tokio::test]
    async fn test_mount_registers_and_queues() {
        let (doc, lifecycles) = setup(CssOptions::with_urls(["/a.css"]));
        let props = AppProps::new("test");

        let mount = lifecycles.mount(&props);
        let link = lifecycles.mounted_link("/a.css").unwrap();
        assert!(doc.contains(&link));
        assert_eq!(lifecycles.pending_unmount_count(), 1);

        link.dispatch(LinkEvent::Load);
        mount.await.unwrap();

        lifecycles.unmount(&props).await;
        assert!(lifecycles.mounted_link("/a.css").is_none());
        assert_eq!(lifecycles.pending_unmount_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_url_is_inserted_once() {
        let (doc, lifecycles) = setup(CssOptions::with_urls(["/a.css", "/a.css"]));
        let props = AppProps::new("test");

        let mount = lifecycles.mount(&props);
        assert_eq!(doc.query_all(&LinkQuery::stylesheet("/a.css")).len(), 1);
        assert_eq!(lifecycles.pending_unmount_count(), 1);

        lifecycles.mounted_link("/a.css").unwrap().dispatch(LinkEvent::Load);
        mount.await.unwrap();
    }

    #[tokio::test]
    async fn test_custom_link_factory_is_used() {
        let options = CssOptions {
            link_factory: crate::config::LinkFactory::new(|url| {
                let link = LinkElement::stylesheet(url);
                link.set_attribute("integrity", "sha384-abc");
                link
            }),
            ..CssOptions::with_urls(["/a.css"])
        };
        let (_doc, lifecycles) = setup(options);
        let props = AppProps::new("test");

        let mount = lifecycles.mount(&props);
        let link = lifecycles.mounted_link("/a.css").unwrap();
        assert_eq!(link.attribute("integrity").as_deref(), Some("sha384-abc"));

        link.dispatch(LinkEvent::Load);
        mount.await.unwrap();
    }

    struct LoadImmediately;

    impl crate::dom::ResourceLoader for LoadImmediately {
        fn load(&self, link: &LinkElement) {
            link.dispatch(LinkEvent::Load);
        }
    }

    #[tokio::test]
    async fn test_zero_timeout_wins_over_synchronous_load() {
        let doc = Arc::new(HeadDocument::with_loader(Arc::new(LoadImmediately)));
        let options = CssOptions {
            timeout: 0,
            ..CssOptions::with_urls(["/a.css"])
        };
        let lifecycles = CssLifecycles::new(doc.clone(), options).unwrap();

        let err = lifecycles.mount(&AppProps::new("test")).await.unwrap_err();
        assert!(matches!(err, LifecycleError::LoadTimeout { timeout_ms: 0, .. }));
        assert!(doc.query_link(&LinkQuery::stylesheet("/a.css")).is_some());
    }

    #[tokio::test]
    async fn test_load_after_deadline_is_a_timeout() {
        let options = CssOptions {
            timeout: 20,
            ..CssOptions::with_urls(["/a.css"])
        };
        let (_doc, lifecycles) = setup(options);

        let mount = lifecycles.mount(&AppProps::new("test"));
        tokio::time::sleep(Duration::from_millis(80)).await;
        lifecycles.mounted_link("/a.css").unwrap().dispatch(LinkEvent::Load);

        let err = mount.await.unwrap_err();
        assert!(matches!(err, LifecycleError::LoadTimeout { timeout_ms: 20, .. }));
    }

    #[test]
    fn test_props_keep_extra_fields() {
        let props: AppProps =
            serde_json::from_str(r#"{"name": "navbar", "mountParcel": null}"#).unwrap();
        assert_eq!(props.name, "navbar");
        assert!(props.extra.contains_key("mountParcel"));
    }
}
