//! Per-navigation phase timings.

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Timings of one navigation, in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationTiming {
    /// Target URL.
    pub url: String,
    /// Time until the HTML was available.
    pub fetch_ms: Option<f64>,
    /// Time spent parsing and applying.
    pub apply_ms: Option<f64>,
    /// Wall time from start to settlement.
    pub total_ms: f64,
    /// Whether the HTML came from the prefetch cache.
    pub prefetched: bool,
}

impl NavigationTiming {
    /// Emits the timing at debug level.
    pub fn log(&self) {
        debug!(
            url = %self.url,
            fetch_ms = ?self.fetch_ms,
            apply_ms = ?self.apply_ms,
            prefetched = self.prefetched,
            "Navigation took {:.2}ms", self.total_ms
        );
    }
}

/// Records phase boundaries of a navigation.
#[derive(Debug)]
pub struct NavigationTimer {
    start: Instant,
    fetched: Option<Instant>,
    applied: Option<Instant>,
    url: String,
    prefetched: bool,
}

impl NavigationTimer {
    /// Starts timing a navigation.
    #[must_use]
    pub fn start(url: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            fetched: None,
            applied: None,
            url: url.into(),
            prefetched: false,
        }
    }

    /// Marks the HTML as available.
    pub fn mark_fetched(&mut self, prefetched: bool) {
        self.fetched = Some(Instant::now());
        self.prefetched = prefetched;
    }

    /// Marks the document as updated.
    pub fn mark_applied(&mut self) {
        self.applied = Some(Instant::now());
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Finishes timing.
    #[must_use]
    pub fn finish(self) -> NavigationTiming {
        let ms = |from: Instant, to: Instant| to.duration_since(from).as_secs_f64() * 1000.0;
        NavigationTiming {
            fetch_ms: self.fetched.map(|fetched| ms(self.start, fetched)),
            apply_ms: match (self.fetched, self.applied) {
                (Some(fetched), Some(applied)) => Some(ms(fetched, applied)),
                _ => None,
            },
            total_ms: self.elapsed_ms(),
            url: self.url,
            prefetched: self.prefetched,
        }
    }
}
