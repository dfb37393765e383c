//! fragment-nav - Manifest-driven navigation interception for single-page sites
//!
//! Loads a route manifest once, intercepts in-app link clicks and history
//! transitions, and swaps the content region in place instead of doing a
//! full page reload. Whenever interception cannot safely proceed, the
//! browser's native navigation takes over.
//!
//! ## Architecture
//!
//! - [`manifest`]: the immutable route manifest store
//! - [`intercept`]: click classification and the delegated click listener
//! - [`fetch`]: content retrieval with last-intent-wins cancellation
//! - [`swap`]: content-region swap, document title, and scroll handling
//! - [`history`]: browser-history reconciliation (push, replace, popstate)
//! - [`navigator`]: the navigation state machine tying the pipeline together
//! - [`launch`]: bootstrap (manifest load, boundary wiring, listeners)
//!
//! The decision core is target-independent: it runs against the injected
//! [`fetch::ContentSource`], [`swap::HostPage`], and
//! [`history::HistoryBackend`] boundaries and is unit-tested natively. The
//! browser implementations of those boundaries compile only for the
//! browser wasm target (`wasm32-unknown-unknown`).
//!
//! ## Example
//!
//! ```ignore
//! use fragment_nav::{LaunchOptions, launch};
//!
//! wasm_bindgen_futures::spawn_local(async {
//!     let _ = launch(
//!         LaunchOptions::new()
//!             .manifest_url("/contents.json")
//!             .content_selector("main"),
//!     )
//!     .await;
//! });
//! ```

pub mod error;
pub mod fetch;
pub mod history;
pub mod intercept;
pub mod launch;
pub mod logging;
pub mod manifest;
pub mod navigator;
pub mod swap;

pub use error::{FetchError, LaunchError, ManifestError};
pub use fetch::{CancelToken, ContentFetcher, ContentResult, ContentSource, InFlightRequest};
pub use history::{HistoryBackend, HistoryEntry};
pub use intercept::{AnchorTarget, ClickDescriptor, NavigationIntent, NavigationOrigin, classify};
pub use launch::LaunchOptions;
pub use manifest::{ManifestStore, RouteEntry};
pub use navigator::{NavPhase, Navigator};
pub use swap::{HostPage, ScrollPosition};

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub use fetch::HttpContentSource;
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub use history::{BrowserHistory, attach_popstate_listener};
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub use intercept::{attach_click_interceptor, describe_click};
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub use launch::{BrowserNavigator, launch};
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub use swap::BrowserPage;
