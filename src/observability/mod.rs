//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! lifecycle, assets, net produce:
//!     → tracing events (structured fields: app, url, outcome)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers (binary only):
//!     → logging.rs subscriber (stdout)
//!     → Prometheus endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - The library never installs global subscribers or recorders
//! - Log level configurable via config and environment

pub mod logging;
pub mod metrics;
