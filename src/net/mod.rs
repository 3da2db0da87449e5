//! Network subsystem.
//!
//! # Data Flow
//! ```text
//! HeadDocument::append_to_head(<link rel="stylesheet">)
//!     → loader.rs (resolve href against base URL, spawn GET)
//!     → 2xx + body read → LinkEvent::Load
//!     → anything else    → LinkEvent::Error
//! ```
//!
//! # Design Decisions
//! - Fetches run on the runtime captured at construction, never block the caller
//! - Response bodies are read and discarded; nothing is parsed or cached
//! - One attempt per element; no retries

pub mod loader;

pub use loader::{HttpStylesheetLoader, LoaderError};
