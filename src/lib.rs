//! Stylesheet lifecycles for micro-frontend applications.
//!
//! A host orchestrator calls [`CssLifecycles::bootstrap`], [`CssLifecycles::mount`]
//! and [`CssLifecycles::unmount`] as an application moves through its life.
//! Stylesheets are preloaded during bootstrap, loaded before mount completes,
//! and removed on unmount unless their policy says otherwise.

pub mod assets;
pub mod config;
pub mod dom;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::{ConfigError, CssOptions, StylesheetSpec};
pub use dom::{Document, HeadDocument, LinkElement, LinkEvent};
pub use lifecycle::{AppProps, CssLifecycles, LifecycleError};
