//! URL-keyed store of prefetched HTML with in-flight deduplication.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::FetchConfig;
use crate::errors::NavigationError;
use crate::fetch::{fetch_html, Fetcher};

/// An in-flight fetch that several waiters can join.
pub type SharedFetch = Shared<BoxFuture<'static, Result<Arc<str>, NavigationError>>>;

/// Entry in the prefetch cache.
enum PrefetchEntry {
    Ready(Arc<str>),
    Pending(SharedFetch),
}

/// Store of prefetched pages.
///
/// Keys are canonical URLs. Entries are never evicted; the cache lives as
/// long as the page does.
pub struct PrefetchCache {
    fetcher: Arc<dyn Fetcher>,
    config: FetchConfig,
    entries: DashMap<String, PrefetchEntry>,
    issued: AtomicUsize,
}

impl PrefetchCache {
    /// Creates an empty cache that fetches through `fetcher`.
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>, config: FetchConfig) -> Self {
        Self {
            fetcher,
            config,
            entries: DashMap::new(),
            issued: AtomicUsize::new(0),
        }
    }

    /// Whether an entry exists, complete or pending.
    #[must_use]
    pub fn has(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    /// Whether a completed entry exists.
    #[must_use]
    pub fn is_ready(&self, url: &str) -> bool {
        self.get(url).is_some()
    }

    /// Returns the prefetched HTML, if the fetch has completed.
    #[must_use]
    pub fn get(&self, url: &str) -> Option<Arc<str>> {
        self.entries.get(url).and_then(|entry| match entry.value() {
            PrefetchEntry::Ready(html) => Some(Arc::clone(html)),
            PrefetchEntry::Pending(_) => None,
        })
    }

    /// Returns a handle to an in-flight prefetch so a navigation can join it.
    #[must_use]
    pub fn pending(&self, url: &str) -> Option<SharedFetch> {
        self.entries.get(url).and_then(|entry| match entry.value() {
            PrefetchEntry::Pending(fetch) => Some(fetch.clone()),
            PrefetchEntry::Ready(_) => None,
        })
    }

    /// Stores HTML for a URL.
    pub fn record(&self, url: impl Into<String>, html: impl Into<Arc<str>>) {
        self.entries
            .insert(url.into(), PrefetchEntry::Ready(html.into()));
    }

    /// Starts a background fetch for `url` unless an entry already exists.
    ///
    /// Returns whether a request was issued. Failures are discarded so a
    /// later navigation falls back to a normal fetch.
    pub fn prefetch(self: &Arc<Self>, url: &str) -> bool {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(url, "Prefetch requested outside a runtime; skipping");
            return false;
        };

        let fetch = match self.entries.entry(url.to_string()) {
            Entry::Occupied(_) => return false,
            Entry::Vacant(vacant) => {
                let fetch = self.start_fetch(url);
                vacant.insert(PrefetchEntry::Pending(fetch.clone()));
                fetch
            }
        };
        self.issued.fetch_add(1, Ordering::SeqCst);
        debug!(url, "Prefetch issued");

        let cache = Arc::clone(self);
        let key = url.to_string();
        runtime.spawn(async move {
            match fetch.await {
                Ok(html) => cache.complete(&key, html),
                Err(e) => {
                    debug!(url = %key, error = %e, "Prefetch failed; discarding");
                    cache.discard(&key);
                }
            }
        });
        true
    }

    /// Number of prefetch requests issued so far.
    #[must_use]
    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }

    /// Number of entries, complete or pending.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    fn start_fetch(&self, url: &str) -> SharedFetch {
        let fetcher = Arc::clone(&self.fetcher);
        let config = self.config.clone();
        let url = url.to_string();
        async move {
            fetch_html(fetcher.as_ref(), &url, &config)
                .await
                .map(Arc::<str>::from)
        }
        .boxed()
        .shared()
    }

    fn complete(&self, url: &str, html: Arc<str>) {
        if let Some(mut entry) = self.entries.get_mut(url) {
            if matches!(entry.value(), PrefetchEntry::Pending(_)) {
                *entry.value_mut() = PrefetchEntry::Ready(html);
            }
        }
    }

    fn discard(&self, url: &str) {
        self.entries
            .remove_if(url, |_, entry| matches!(entry, PrefetchEntry::Pending(_)));
    }
}

impl std::fmt::Debug for PrefetchCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefetchCache")
            .field("entries", &self.len())
            .field("issued", &self.issued())
            .finish()
    }
}
