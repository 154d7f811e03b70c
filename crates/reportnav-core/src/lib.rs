//! reportnav-core library.
//!
//! Keeps a test report's view state in the location fragment and turns it
//! into a single parameter snapshot that views subscribe to, reveal
//! anchors from, and build links against.
//!
//! # Conventions
//!
//! - **Errors**: `NavError` for the host boundary, `anyhow::Result` for config loading.
//! - **Logging**: Use `tracing` macros (`debug!`, `trace!`, `warn!`).

pub mod anchor;
pub mod config;
pub mod error;
pub mod filter;
pub mod host;
pub mod link;
pub mod model;
pub mod params;
pub mod store;

pub use anchor::{AnchorSpec, AnchorState, AnchorTracker, is_anchored};
pub use error::{ErrorCode, NavError};
pub use filter::{ClickTarget, Modifiers, NavigationTarget, toggle_token};
pub use host::{HistoryPort, MemoryHistory};
pub use link::{TestResultLink, test_result_link, trace_viewer_link};
pub use params::{FragmentParams, parse, serialize};
pub use store::{NavigationStore, Subscription, WeakNavigationStore};
