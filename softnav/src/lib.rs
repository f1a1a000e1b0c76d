//! # Softnav
//!
//! Client-side soft navigation: same-origin link clicks are intercepted, the
//! target page is fetched in the background, and only its content container
//! (or body) and title are swapped into the live document, with history kept
//! in sync.
//!
//! - **Single active navigation**: a newer navigation cancels the older one's
//!   request and result
//! - **Prefetching**: hover (debounced) and viewport-entry prefetch into a
//!   deduplicating page cache
//! - **Lifecycle events**: `navigate-before` (cancelable) through
//!   `navigate-complete`
//! - **Progress bar**: a thin top-of-viewport indicator
//!
//! The browser is reached only through small host traits ([`dom::Document`],
//! [`dom::History`], [`dom::Location`], [`triggers::EventRoot`],
//! [`triggers::ViewportObserver`], [`progress::ProgressSurface`]) and the
//! network through [`fetch::Fetcher`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use softnav::prelude::*;
//!
//! let host = BrowserHost::new(browser, root).with_surface(surface);
//! let navigator = SoftNavigator::init_http(NavigatorConfig::default(), host)?;
//!
//! let outcome = navigator.navigate("/about").await;
//! assert!(outcome.is_success());
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, missing_docs, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod config;
pub mod dom;
pub mod errors;
pub mod events;
pub mod fetch;
pub mod links;
pub mod navigation;
pub mod navigator;
pub mod observability;
pub mod prefetch;
pub mod progress;
pub mod testing;
pub mod triggers;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::{FetchConfig, NavigatorConfig};
    pub use crate::dom::{Document, DocumentSnapshot, History, Location, SwapTarget};
    pub use crate::errors::{ConfigError, NavigationError};
    pub use crate::events::{
        CollectingEventSink, EventBus, EventSink, LoggingEventSink, NavigationEvent,
        NavigationEventKind, NoOpEventSink,
    };
    pub use crate::fetch::{FetchResult, Fetcher};
    #[cfg(feature = "http")]
    pub use crate::fetch::HttpFetcher;
    pub use crate::links::{LinkAttributes, LinkClassifier, LinkElement};
    pub use crate::navigation::{
        NavigateOptions, NavigationController, NavigationOutcome, NavigationRequest,
    };
    pub use crate::navigator::{BrowserHost, SoftNavigator};
    pub use crate::observability::init_tracing;
    pub use crate::prefetch::PrefetchCache;
    pub use crate::progress::{ProgressBar, ProgressIndicator, ProgressSurface};
    pub use crate::triggers::{
        ClickDisposition, ClickEvent, EventRoot, TriggerBinder, TriggerListener,
        ViewportObserver,
    };
}
