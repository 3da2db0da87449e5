//! Document subsystem.
//!
//! # Data Flow
//! ```text
//! lifecycle controller
//!     → document.rs (query / append / remove <link> in the head)
//!     → ResourceLoader (fetch the stylesheet, e.g. net::HttpStylesheetLoader)
//!     → element.rs (load/error signal on the LinkElement)
//!     → lifecycle controller wakes up
//! ```
//!
//! # Design Decisions
//! - The document is a collaborator behind a trait; the controller never owns it
//! - Element creation and removal are primitives, nothing more
//! - Load signalling is decoupled from fetching so tests can dispatch by hand

pub mod document;
pub mod element;

pub use document::{Document, HeadDocument, ResourceLoader};
pub use element::{LinkElement, LinkEvent, LinkQuery, LoadState};
