//! Metrics collection and exposition.
//!
//! # Metrics
//! - `css_link_loads_total` (counter): per-URL mount outcomes by `outcome`
//!   (`loaded`, `existing`, `failed`, `timeout`)
//! - `css_link_load_duration_seconds` (histogram): time from insertion to load signal
//! - `css_preloads_inserted_total` (counter): preload hints added during bootstrap
//! - `css_links_unmounted_total` (counter): elements removed during unmount
//! - `css_manifest_fetches_total` (counter): manifest lookups by `outcome`
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Outcome of a single stylesheet during mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Existing,
    Failed,
    Timeout,
}

impl LoadOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadOutcome::Loaded => "loaded",
            LoadOutcome::Existing => "existing",
            LoadOutcome::Failed => "failed",
            LoadOutcome::Timeout => "timeout",
        }
    }
}

/// Install the Prometheus exporter with an HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_link_load(outcome: LoadOutcome, elapsed: Option<Duration>) {
    metrics::counter!("css_link_loads_total", "outcome" => outcome.as_str()).increment(1);
    if let Some(elapsed) = elapsed {
        metrics::histogram!("css_link_load_duration_seconds").record(elapsed.as_secs_f64());
    }
}

pub fn record_preload_inserted() {
    metrics::counter!("css_preloads_inserted_total").increment(1);
}

pub fn record_links_unmounted(count: usize) {
    metrics::counter!("css_links_unmounted_total").increment(count as u64);
}

pub fn record_manifest_fetch(success: bool) {
    let outcome = if success { "success" } else { "error" };
    metrics::counter!("css_manifest_fetches_total", "outcome" => outcome).increment(1);
}
