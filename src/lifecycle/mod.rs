//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! bootstrap(props):
//!     resolved URLs (+ manifest URL) → preload hint unless one exists
//!
//! mount(props):
//!     resolved URLs (+ manifest URL)
//!     → existing stylesheet? register it, done
//!     → else create via link factory → insert → register
//!            → queue for unmount if policy says so
//!            → wait for load / error / deadline
//!     → join: all loaded, or first failure
//!
//! unmount(props):
//!     take pending queue (synchronously)
//!     → deregister URL → detach element if still attached
//! ```
//!
//! # Design Decisions
//! - One controller per application instance; registries live as long as it does
//! - Only elements this controller created are ever removed
//! - A failed mount is not rolled back; unmount governs cleanup
//! - No retries: a failed load is reported once

pub mod controller;
pub mod error;
pub mod policy;
pub mod registry;

pub use controller::{AppProps, CssLifecycles, CssLifecyclesBuilder};
pub use error::LifecycleError;
pub use policy::ResolvedStylesheet;
