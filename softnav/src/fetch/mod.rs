//! Network access for navigations and prefetches.
//!
//! This module provides:
//! - The [`Fetcher`] seam and its [`FetchResult`]
//! - [`fetch_html`], which applies the soft-navigation headers and the
//!   success-status rule shared by navigations and prefetches
//! - A `reqwest`-backed [`HttpFetcher`] (feature `http`)

#[cfg(feature = "http")]
mod http;
mod protocols;

#[cfg(feature = "http")]
pub use http::HttpFetcher;
pub use protocols::{fetch_html, FetchResult, Fetcher};
