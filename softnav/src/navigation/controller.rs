//! Owns the single current navigation.

use futures::FutureExt;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

use super::request::{NavigateOptions, NavigationOutcome, NavigationPhase, NavigationRequest};
use crate::cancellation::CancellationToken;
use crate::config::NavigatorConfig;
use crate::dom::{apply_snapshot, Document, DocumentSnapshot, History, Location, SwapTarget};
use crate::errors::NavigationError;
use crate::events::{EventBus, NavigationEvent, NavigationEventKind};
use crate::fetch::{fetch_html, Fetcher};
use crate::links::{absolute_url, canonical_url};
use crate::observability::NavigationTimer;
use crate::prefetch::PrefetchCache;
use crate::progress::{NoOpIndicator, ProgressIndicator};

/// The navigation currently allowed to touch the document.
struct ActiveNavigation {
    request: NavigationRequest,
    token: Arc<CancellationToken>,
    phase: NavigationPhase,
}

/// What a successful load-and-apply produced.
struct Applied {
    prefetched: bool,
    target: SwapTarget,
}

/// Navigation controller.
///
/// One instance per page. Starting a navigation cancels the previous one
/// before anything else happens, so at most one flow is ever in flight and
/// only that flow may write the document, title, or history.
pub struct NavigationController {
    config: Arc<NavigatorConfig>,
    fetcher: Arc<dyn Fetcher>,
    cache: Arc<PrefetchCache>,
    document: Arc<dyn Document>,
    history: Arc<dyn History>,
    location: Arc<dyn Location>,
    indicator: Arc<dyn ProgressIndicator>,
    events: Arc<EventBus>,
    active: Mutex<Option<ActiveNavigation>>,
}

impl NavigationController {
    /// Creates a controller with its own prefetch cache and event bus and no
    /// progress indicator.
    #[must_use]
    pub fn new(
        config: NavigatorConfig,
        document: Arc<dyn Document>,
        history: Arc<dyn History>,
        location: Arc<dyn Location>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        let cache = Arc::new(PrefetchCache::new(
            Arc::clone(&fetcher),
            config.fetch.clone(),
        ));
        Self {
            config: Arc::new(config),
            fetcher,
            cache,
            document,
            history,
            location,
            indicator: Arc::new(NoOpIndicator),
            events: Arc::new(EventBus::new()),
            active: Mutex::new(None),
        }
    }

    /// Uses a shared prefetch cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<PrefetchCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Uses a progress indicator.
    #[must_use]
    pub fn with_indicator(mut self, indicator: Arc<dyn ProgressIndicator>) -> Self {
        self.indicator = indicator;
        self
    }

    /// Uses a shared event bus.
    #[must_use]
    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = events;
        self
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// The prefetch cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<PrefetchCache> {
        &self.cache
    }

    /// The event bus signals are raised on.
    #[must_use]
    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// The live document.
    #[must_use]
    pub fn document(&self) -> &Arc<dyn Document> {
        &self.document
    }

    /// Resolves `href` against the current document URL, fragment kept.
    /// This is what history records. Unresolvable input is returned trimmed
    /// so the fetch step reports it.
    #[must_use]
    pub fn resolve(&self, href: &str) -> String {
        Url::parse(&self.document.url())
            .ok()
            .and_then(|base| absolute_url(&base, href).ok())
            .unwrap_or_else(|| href.trim().to_string())
    }

    /// Like [`Self::resolve`] but without the fragment: the prefetch cache
    /// and request key.
    #[must_use]
    pub fn cache_key(&self, href: &str) -> String {
        Url::parse(&self.document.url())
            .ok()
            .and_then(|base| canonical_url(&base, href).ok())
            .unwrap_or_else(|| href.trim().to_string())
    }

    /// The in-flight navigation and its phase, if any.
    #[must_use]
    pub fn current(&self) -> Option<(NavigationRequest, NavigationPhase)> {
        self.active
            .lock()
            .as_ref()
            .map(|active| (active.request.clone(), active.phase))
    }

    /// Whether the active navigation is currently fetching `url`, a
    /// fragment-free key as returned by [`Self::cache_key`].
    #[must_use]
    pub fn is_loading(&self, url: &str) -> bool {
        self.active.lock().as_ref().is_some_and(|active| {
            active.phase == NavigationPhase::Fetching && active.request.fetch_url() == url
        })
    }

    /// Cancels the in-flight navigation, which then settles as aborted.
    ///
    /// Returns whether there was one.
    pub fn cancel(&self, reason: &str) -> bool {
        let token = self
            .active
            .lock()
            .as_ref()
            .map(|active| Arc::clone(&active.token));
        match token {
            Some(token) => {
                token.cancel(reason);
                true
            }
            None => false,
        }
    }

    /// Navigates to `url`.
    pub async fn navigate(&self, url: &str, options: NavigateOptions) -> NavigationOutcome {
        let request = NavigationRequest::new(self.resolve(url), options);
        self.run(request).await
    }

    /// Runs one navigation to settlement.
    pub async fn run(&self, request: NavigationRequest) -> NavigationOutcome {
        debug!(url = %request.url(), request_id = %request.id(), "Navigation requested");

        let before = NavigationEvent::new(NavigationEventKind::Before, &request);
        if !self.events.dispatch(&before) {
            debug!(url = %request.url(), "Navigation vetoed by listener");
            return NavigationOutcome::Vetoed;
        }

        let token = self.begin(&request);
        self.emit(NavigationEvent::new(NavigationEventKind::Start, &request));
        self.indicator.show();

        let mut timer = NavigationTimer::start(request.url());
        let outcome = match self.load_and_apply(&request, &token, &mut timer).await {
            Ok(applied) => {
                self.emit(
                    NavigationEvent::new(NavigationEventKind::Success, &request)
                        .with_prefetched(applied.prefetched),
                );
                NavigationOutcome::Succeeded {
                    prefetched: applied.prefetched,
                    target: applied.target,
                }
            }
            Err(e) if e.is_aborted() || token.is_cancelled() => {
                info!(url = %request.url(), reason = %e, "Navigation superseded");
                NavigationOutcome::Aborted
            }
            Err(e) => {
                error!(url = %request.url(), error = %e, "Navigation error");
                self.emit(
                    NavigationEvent::new(NavigationEventKind::Error, &request)
                        .with_error(e.clone()),
                );
                self.location.assign(request.url());
                NavigationOutcome::Failed(e)
            }
        };

        self.settle(&token);
        self.indicator.hide();
        self.emit(NavigationEvent::new(NavigationEventKind::Complete, &request));

        if self.config.enable_performance_logging {
            timer.finish().log();
        }
        outcome
    }

    async fn load_and_apply(
        &self,
        request: &NavigationRequest,
        token: &Arc<CancellationToken>,
        timer: &mut NavigationTimer,
    ) -> Result<Applied, NavigationError> {
        self.set_phase(token, NavigationPhase::Fetching);
        let (html, prefetched) = self.load(request, token).await?;
        timer.mark_fetched(prefetched);

        self.ensure_current(token)?;
        self.set_phase(token, NavigationPhase::Applying);
        let target = self.apply(request, token, &html)?;
        timer.mark_applied();

        Ok(Applied { prefetched, target })
    }

    /// Gets the page HTML: from the cache, by joining an in-flight prefetch,
    /// or with a direct request. Returns whether prefetched content was used.
    async fn load(
        &self,
        request: &NavigationRequest,
        token: &CancellationToken,
    ) -> Result<(Arc<str>, bool), NavigationError> {
        let url = request.fetch_url();

        if let Some(html) = self.cache.get(url) {
            debug!(url, "Serving navigation from prefetch cache");
            return Ok((html, true));
        }

        if let Some(pending) = self.cache.pending(url) {
            debug!(url, "Joining in-flight prefetch");
            match Self::race(token, pending).await {
                Ok(html) => return Ok((html, true)),
                Err(e) if e.is_aborted() => return Err(e),
                // A failed prefetch must not fail the navigation.
                Err(e) => debug!(url, error = %e, "Joined prefetch failed; fetching directly"),
            }
        }

        Url::parse(url).map_err(|e| NavigationError::InvalidUrl(format!("{url}: {e}")))?;
        let fetch = fetch_html(self.fetcher.as_ref(), url, &self.config.fetch)
            .map(|result| result.map(Arc::<str>::from));
        let html = Self::race(token, fetch).await?;
        Ok((html, false))
    }

    /// Awaits `fetch` unless `token` is cancelled first. Losing the race
    /// drops the fetch future, which aborts the request.
    async fn race<F>(token: &CancellationToken, fetch: F) -> Result<Arc<str>, NavigationError>
    where
        F: Future<Output = Result<Arc<str>, NavigationError>>,
    {
        tokio::select! {
            biased;
            () = token.cancelled() => Err(Self::aborted(token)),
            result = fetch => result,
        }
    }

    fn apply(
        &self,
        request: &NavigationRequest,
        token: &Arc<CancellationToken>,
        html: &str,
    ) -> Result<SwapTarget, NavigationError> {
        let snapshot = Arc::new(DocumentSnapshot::parse(html, &self.config.container_id)?);
        self.emit(
            NavigationEvent::new(NavigationEventKind::BeforeDomUpdate, request)
                .with_snapshot(Arc::clone(&snapshot)),
        );
        self.ensure_current(token)?;

        let target = apply_snapshot(self.document.as_ref(), &snapshot)?;
        debug!(url = %request.url(), target = target.as_str(), "Document updated");
        self.emit(NavigationEvent::new(NavigationEventKind::AfterDomUpdate, request));

        self.document.scroll_to_top();
        if request.options().push_state {
            if let Err(e) = self.history.push_state(request.url()) {
                warn!(url = %request.url(), error = %e, "History update failed");
            }
        }
        Ok(target)
    }

    /// Installs a new token, cancelling the previous navigation's.
    fn begin(&self, request: &NavigationRequest) -> Arc<CancellationToken> {
        let token = CancellationToken::shared();
        let url = request.url().to_string();
        token.on_cancel(move |reason| debug!(url = %url, reason, "Navigation cancelled"));

        let previous = self.active.lock().replace(ActiveNavigation {
            request: request.clone(),
            token: Arc::clone(&token),
            phase: NavigationPhase::BeforeHook,
        });
        if let Some(previous) = previous {
            previous
                .token
                .cancel(format!("superseded by {}", request.url()));
        }
        token
    }

    fn settle(&self, token: &Arc<CancellationToken>) {
        let mut active = self.active.lock();
        if active
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(&current.token, token))
        {
            *active = None;
        }
    }

    fn set_phase(&self, token: &Arc<CancellationToken>, phase: NavigationPhase) {
        if let Some(active) = self.active.lock().as_mut() {
            if Arc::ptr_eq(&active.token, token) {
                active.phase = phase;
            }
        }
    }

    fn is_current(&self, token: &Arc<CancellationToken>) -> bool {
        !token.is_cancelled()
            && self
                .active
                .lock()
                .as_ref()
                .is_some_and(|active| Arc::ptr_eq(&active.token, token))
    }

    fn ensure_current(&self, token: &Arc<CancellationToken>) -> Result<(), NavigationError> {
        if self.is_current(token) {
            Ok(())
        } else {
            Err(Self::aborted(token))
        }
    }

    fn aborted(token: &CancellationToken) -> NavigationError {
        NavigationError::Aborted(token.reason().unwrap_or_else(|| "superseded".to_string()))
    }

    fn emit(&self, event: NavigationEvent) {
        self.events.dispatch(&event);
    }
}

impl std::fmt::Debug for NavigationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationController")
            .field("container_id", &self.config.container_id)
            .field("cache", &self.cache)
            .field("current", &self.current().map(|(r, p)| (r.url().to_string(), p)))
            .finish()
    }
}
