//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! caller options (CssOptions, or raw JSON value)
//!     → validation.rs (shape + semantic checks)
//!     → resolve.rs (overlay defaults, append extracted assets)
//!     → EffectiveConfig (immutable, owned by the lifecycle controller)
//!
//! css-lifecycles binary:
//!     host config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → HostConfig { app, css, build_assets, loader, observability }
//! ```
//!
//! # Design Decisions
//! - Configuration errors surface before any lifecycle hook exists
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod resolve;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use resolve::EffectiveConfig;
pub use schema::{CssOptions, HostConfig, LinkFactory, StylesheetSpec};
pub use schema::{AppConfig, LoaderConfig, ObservabilityConfig};
