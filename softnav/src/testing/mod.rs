//! Testing utilities for soft navigation.
//!
//! This module provides:
//! - In-memory document, history and location
//! - A scriptable fetcher and recording host doubles
//! - Event assertions and a wired-up harness

mod assertions;
mod browser;
mod fixtures;
mod mocks;

pub use assertions::{
    assert_complete_per_start, assert_event_sequence, assert_failed_with, assert_prefetched,
    assert_succeeded,
};
pub use browser::MemoryBrowser;
pub use fixtures::{bare_page_html, marked_link, page_html, url, TestHarness, TEST_ORIGIN};
pub use mocks::{
    element_ids, MemoryEventRoot, MockFetcher, RecordingSurface, RecordingViewport, SurfaceOp,
};
