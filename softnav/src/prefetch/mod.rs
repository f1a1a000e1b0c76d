//! Speculative page cache warmed by hover and viewport signals.

mod cache;

pub use cache::{PrefetchCache, SharedFetch};
