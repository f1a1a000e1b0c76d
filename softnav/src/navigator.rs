//! One-call setup of soft navigation for a page.

use std::sync::Arc;
use tracing::info;
use url::Url;

use crate::config::NavigatorConfig;
use crate::dom::{Document, History, Location};
use crate::errors::NavigationError;
use crate::events::{EventBus, EventSink, LoggingEventSink, SinkId};
use crate::fetch::Fetcher;
use crate::links::LinkClassifier;
use crate::navigation::{NavigateOptions, NavigationController, NavigationOutcome};
use crate::prefetch::PrefetchCache;
use crate::progress::{NoOpIndicator, ProgressBar, ProgressIndicator, ProgressSurface};
use crate::triggers::{EventRoot, TriggerBinder, ViewportObserver};

/// The host pieces a navigator binds to.
pub struct BrowserHost {
    /// The live document.
    pub document: Arc<dyn Document>,
    /// Session history.
    pub history: Arc<dyn History>,
    /// Full-load fallback.
    pub location: Arc<dyn Location>,
    /// Root for delegated listeners.
    pub root: Arc<dyn EventRoot>,
    /// Viewport observer; viewport prefetch is off without one.
    pub viewport: Option<Arc<dyn ViewportObserver>>,
    /// Drawing surface; the progress bar is off without one.
    pub surface: Option<Arc<dyn ProgressSurface>>,
}

impl BrowserHost {
    /// Uses one object for document, history and location.
    pub fn new<B>(browser: Arc<B>, root: Arc<dyn EventRoot>) -> Self
    where
        B: Document + History + Location + 'static,
    {
        Self {
            document: browser.clone(),
            history: browser.clone(),
            location: browser,
            root,
            viewport: None,
            surface: None,
        }
    }

    /// Adds a viewport observer.
    #[must_use]
    pub fn with_viewport(mut self, viewport: Arc<dyn ViewportObserver>) -> Self {
        self.viewport = Some(viewport);
        self
    }

    /// Adds a progress surface.
    #[must_use]
    pub fn with_surface(mut self, surface: Arc<dyn ProgressSurface>) -> Self {
        self.surface = Some(surface);
        self
    }
}

impl std::fmt::Debug for BrowserHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserHost")
            .field("url", &self.document.url())
            .field("viewport", &self.viewport.is_some())
            .field("surface", &self.surface.is_some())
            .finish()
    }
}

/// A page's soft navigation: controller, triggers and progress bar.
///
/// ```rust,ignore
/// let navigator = SoftNavigator::init_http(NavigatorConfig::default(), host)?;
/// navigator.events().on(NavigationEventKind::Success, |event| {
///     println!("now at {}", event.url);
/// });
/// ```
#[derive(Debug)]
pub struct SoftNavigator {
    controller: Arc<NavigationController>,
    binder: Arc<TriggerBinder>,
    progress: Option<ProgressBar>,
}

impl SoftNavigator {
    /// Validates `config`, wires everything together and binds the root.
    pub fn init(
        config: NavigatorConfig,
        host: BrowserHost,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, NavigationError> {
        config.validate()?;

        let document_url = host.document.url();
        let base = Url::parse(&document_url)
            .map_err(|e| NavigationError::InvalidUrl(format!("{document_url}: {e}")))?;
        let classifier = LinkClassifier::from_config(&base, &config);

        let progress = host
            .surface
            .filter(|_| config.navigation_progress_bar)
            .map(|surface| ProgressBar::from_config(surface, &config));
        let indicator: Arc<dyn ProgressIndicator> = match &progress {
            Some(bar) => Arc::new(bar.clone()),
            None => Arc::new(NoOpIndicator),
        };

        let events = Arc::new(EventBus::new());
        if config.enable_performance_logging {
            events.subscribe(Arc::new(LoggingEventSink::debug()));
        }
        let cache = Arc::new(PrefetchCache::new(Arc::clone(&fetcher), config.fetch.clone()));

        let container_id = config.container_id.clone();
        let controller = Arc::new(
            NavigationController::new(config, host.document, host.history, host.location, fetcher)
                .with_cache(cache)
                .with_events(events)
                .with_indicator(indicator),
        );

        let mut binder = TriggerBinder::new(Arc::clone(&controller), classifier);
        if let Some(viewport) = host.viewport {
            binder = binder.with_viewport(viewport);
        }
        let binder = Arc::new(binder);
        binder.bind(host.root.as_ref());

        info!(
            url = %document_url,
            container = %container_id,
            progress_bar = progress.is_some(),
            "Soft navigation initialized"
        );
        Ok(Self {
            controller,
            binder,
            progress,
        })
    }

    /// Like [`SoftNavigator::init`], fetching over HTTP with the configured
    /// client settings.
    #[cfg(feature = "http")]
    pub fn init_http(config: NavigatorConfig, host: BrowserHost) -> Result<Self, NavigationError> {
        let fetcher = crate::fetch::HttpFetcher::new(&config.fetch)?;
        Self::init(config, host, Arc::new(fetcher))
    }

    /// Navigates to `url`, pushing a history entry.
    pub async fn navigate(&self, url: &str) -> NavigationOutcome {
        self.controller.navigate(url, NavigateOptions::default()).await
    }

    /// Navigates to `url` with explicit options.
    pub async fn navigate_with(&self, url: &str, options: NavigateOptions) -> NavigationOutcome {
        self.controller.navigate(url, options).await
    }

    /// Prefetches `href` in the background.
    pub fn prefetch(&self, href: &str) -> bool {
        self.binder.prefetch(href)
    }

    /// Adds an event sink.
    pub fn subscribe(&self, sink: Arc<dyn EventSink>) -> SinkId {
        self.controller.events().subscribe(sink)
    }

    /// The navigation controller.
    #[must_use]
    pub fn controller(&self) -> &Arc<NavigationController> {
        &self.controller
    }

    /// The trigger binder.
    #[must_use]
    pub fn binder(&self) -> &Arc<TriggerBinder> {
        &self.binder
    }

    /// The event bus.
    #[must_use]
    pub fn events(&self) -> &Arc<EventBus> {
        self.controller.events()
    }

    /// The prefetch cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<PrefetchCache> {
        self.controller.cache()
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &NavigatorConfig {
        self.controller.config()
    }

    /// The progress bar, when enabled.
    #[must_use]
    pub fn progress(&self) -> Option<&ProgressBar> {
        self.progress.as_ref()
    }
}

impl Drop for SoftNavigator {
    fn drop(&mut self) {
        self.binder.unbind();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryBrowser, MemoryEventRoot, MockFetcher, RecordingSurface};

    fn host(browser: &Arc<MemoryBrowser>, root: &Arc<MemoryEventRoot>) -> BrowserHost {
        BrowserHost::new(browser.clone(), root.clone())
    }

    #[test]
    fn test_init_binds_root_once() {
        let browser = Arc::new(MemoryBrowser::with_container("https://example.com/", "Home", ""));
        let root = Arc::new(MemoryEventRoot::new());

        let navigator =
            SoftNavigator::init(NavigatorConfig::default(), host(&browser, &root), Arc::new(MockFetcher::new()))
                .unwrap();

        assert_eq!(root.listener_count(), 1);
        assert!(navigator.binder().is_bound());
        assert!(navigator.progress().is_none());
    }

    #[test]
    fn test_init_rejects_invalid_config() {
        let browser = Arc::new(MemoryBrowser::with_container("https://example.com/", "Home", ""));
        let root = Arc::new(MemoryEventRoot::new());
        let config = NavigatorConfig::default().with_container_id("");

        let err = SoftNavigator::init(config, host(&browser, &root), Arc::new(MockFetcher::new()))
            .unwrap_err();
        assert_eq!(err.kind(), "config");
        assert_eq!(root.listener_count(), 0);
    }

    #[test]
    fn test_init_rejects_unparseable_document_url() {
        let browser = Arc::new(MemoryBrowser::with_container("not a url", "Home", ""));
        let root = Arc::new(MemoryEventRoot::new());

        let err = SoftNavigator::init(
            NavigatorConfig::default(),
            host(&browser, &root),
            Arc::new(MockFetcher::new()),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "invalid_url");
    }

    #[test]
    fn test_progress_bar_follows_config() {
        let browser = Arc::new(MemoryBrowser::with_container("https://example.com/", "Home", ""));
        let root = Arc::new(MemoryEventRoot::new());
        let surface = Arc::new(RecordingSurface::new());

        let enabled = SoftNavigator::init(
            NavigatorConfig::default(),
            host(&browser, &root).with_surface(surface.clone()),
            Arc::new(MockFetcher::new()),
        )
        .unwrap();
        assert!(enabled.progress().is_some());

        let disabled = SoftNavigator::init(
            NavigatorConfig::default().with_progress_bar(false),
            host(&browser, &root).with_surface(surface),
            Arc::new(MockFetcher::new()),
        )
        .unwrap();
        assert!(disabled.progress().is_none());
    }
}
