//! Turns user interaction into navigations and prefetches.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::hover::HoverDebouncer;
use super::listener::{ClickDisposition, ClickEvent, EventRoot, TriggerListener, ViewportObserver};
use crate::events::{NavigationEventKind, SinkId};
use crate::links::{ElementId, LinkClassifier, LinkElement};
use crate::navigation::{NavigateOptions, NavigationController, NavigationOutcome};

/// Binds clicks, hovers, viewport entries and history moves to the
/// navigation controller and prefetch cache.
pub struct TriggerBinder {
    controller: Arc<NavigationController>,
    classifier: LinkClassifier,
    viewport: Option<Arc<dyn ViewportObserver>>,
    hover: HoverDebouncer,
    /// Elements handed to the viewport observer, fired or not.
    observed: Mutex<HashSet<ElementId>>,
    dom_updates: Mutex<Option<SinkId>>,
    bound: AtomicBool,
    /// Set once the listener is on the root; rebinding does not attach again.
    attached: AtomicBool,
}

impl TriggerBinder {
    /// Creates an unbound binder.
    #[must_use]
    pub fn new(controller: Arc<NavigationController>, classifier: LinkClassifier) -> Self {
        Self {
            controller,
            classifier,
            viewport: None,
            hover: HoverDebouncer::new(),
            observed: Mutex::new(HashSet::new()),
            dom_updates: Mutex::new(None),
            bound: AtomicBool::new(false),
            attached: AtomicBool::new(false),
        }
    }

    /// Enables viewport prefetch through `observer`.
    #[must_use]
    pub fn with_viewport(mut self, observer: Arc<dyn ViewportObserver>) -> Self {
        self.viewport = Some(observer);
        self
    }

    /// Attaches to `root` and starts observing the current links.
    ///
    /// Idempotent: returns `false` if already bound. The delegated listener
    /// is attached at most once, so binding again after
    /// [`TriggerBinder::unbind`] reuses it.
    pub fn bind(self: &Arc<Self>, root: &dyn EventRoot) -> bool {
        if self.bound.swap(true, Ordering::SeqCst) {
            debug!("Trigger binder already bound");
            return false;
        }

        if !self.attached.swap(true, Ordering::SeqCst) {
            root.attach(Arc::clone(self) as Arc<dyn TriggerListener>);
        }

        // Weak so the bus does not keep the binder (and its controller) alive.
        let weak: Weak<Self> = Arc::downgrade(self);
        let id = self
            .controller
            .events()
            .on(NavigationEventKind::AfterDomUpdate, move |_| {
                if let Some(binder) = weak.upgrade() {
                    binder.observe_links();
                }
            });
        *self.dom_updates.lock() = Some(id);

        self.observe_links();
        debug!(
            hover = self.config_hover(),
            viewport = self.viewport_enabled(),
            "Trigger binder attached"
        );
        true
    }

    /// Whether [`TriggerBinder::bind`] has run.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.bound.load(Ordering::SeqCst)
    }

    /// Stops reacting to interaction and document updates, and cancels
    /// pending hover work. The listener stays on the root but ignores events
    /// until the binder is bound again.
    pub fn unbind(&self) {
        if let Some(id) = self.dom_updates.lock().take() {
            self.controller.events().unsubscribe(id);
        }
        self.hover.cancel();
        if let Some(viewport) = &self.viewport {
            for id in self.observed.lock().drain() {
                viewport.unobserve(id);
            }
        }
        self.bound.store(false, Ordering::SeqCst);
    }

    /// The classifier links are checked with.
    #[must_use]
    pub fn classifier(&self) -> &LinkClassifier {
        &self.classifier
    }

    /// Number of elements handed to the viewport observer and still rendered.
    #[must_use]
    pub fn observed_count(&self) -> usize {
        self.observed.lock().len()
    }

    /// Starts a prefetch for `href` unless the active navigation is already
    /// fetching it. Returns whether a request was issued.
    pub fn prefetch(&self, href: &str) -> bool {
        let url = self.controller.cache_key(href);
        prefetch_resolved(&self.controller, &url)
    }

    /// Registers every navigable link not yet seen with the viewport
    /// observer. Ids no longer rendered are forgotten.
    pub fn observe_links(&self) {
        let Some(viewport) = self.viewport.as_ref().filter(|_| self.viewport_enabled()) else {
            return;
        };

        let links = self.controller.document().links();
        let rendered: HashSet<ElementId> = links.iter().map(|link| link.id).collect();
        let margin = self.controller.config().prefetch_viewport_margin;

        let mut observed = self.observed.lock();
        observed.retain(|id| rendered.contains(id));
        let mut added = 0usize;
        for link in links {
            if self.classifier.classify(&link.attributes) && observed.insert(link.id) {
                viewport.observe(link.id, margin);
                added += 1;
            }
        }
        trace!(added, total = observed.len(), "Viewport observation updated");
    }

    fn config_hover(&self) -> bool {
        self.controller.config().enable_prefetch_on_hover
    }

    fn viewport_enabled(&self) -> bool {
        self.viewport.is_some() && self.controller.config().enable_prefetch_on_view
    }

    fn spawn_navigation(
        &self,
        href: &str,
        options: NavigateOptions,
    ) -> Option<JoinHandle<NavigationOutcome>> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(href, "Navigation trigger outside a runtime; leaving it to the browser");
            return None;
        };
        let controller = Arc::clone(&self.controller);
        let href = href.to_string();
        Some(runtime.spawn(async move { controller.navigate(&href, options).await }))
    }
}

fn prefetch_resolved(controller: &NavigationController, url: &str) -> bool {
    if controller.is_loading(url) {
        trace!(url, "Skipping prefetch; navigation already fetching");
        return false;
    }
    controller.cache().prefetch(url)
}

impl TriggerListener for TriggerBinder {
    fn on_click(&self, event: &ClickEvent) -> ClickDisposition {
        if !self.is_bound()
            || !event.is_plain()
            || !self.classifier.classify(&event.link.attributes)
        {
            return ClickDisposition::Default;
        }
        self.hover.cancel();
        match self.spawn_navigation(event.link.href(), NavigateOptions::default()) {
            Some(handle) => ClickDisposition::Intercepted(handle),
            None => ClickDisposition::Default,
        }
    }

    fn on_pointer_enter(&self, link: &LinkElement) {
        if !self.is_bound()
            || !self.config_hover()
            || !self.classifier.classify(&link.attributes)
        {
            return;
        }
        let url = self.controller.cache_key(link.href());
        if self.controller.cache().has(&url) {
            self.hover.cancel();
            return;
        }

        let controller = Arc::clone(&self.controller);
        let delay = controller.config().prefetch_delay();
        self.hover.schedule(link.id, delay, async move {
            prefetch_resolved(&controller, &url);
        });
    }

    fn on_pointer_leave(&self, _link: &LinkElement) {
        self.hover.cancel();
    }

    fn on_visible(&self, link: &LinkElement) {
        if let Some(viewport) = &self.viewport {
            viewport.unobserve(link.id);
        }
        if !self.is_bound()
            || !self.viewport_enabled()
            || !self.classifier.classify(&link.attributes)
        {
            return;
        }
        self.prefetch(link.href());
    }

    fn on_popstate(&self, url: &str) -> Option<JoinHandle<NavigationOutcome>> {
        if !self.is_bound() {
            return None;
        }
        debug!(url, "History traversal");
        self.spawn_navigation(url, NavigateOptions::replay())
    }
}

impl std::fmt::Debug for TriggerBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerBinder")
            .field("bound", &self.is_bound())
            .field("observed", &self.observed_count())
            .field("hover", &self.hover)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NavigatorConfig;
    use crate::dom::Document;
    use crate::links::LinkAttributes;
    use crate::testing::{page_html, MemoryBrowser, MemoryEventRoot, MockFetcher, RecordingViewport};
    use std::time::Duration;
    use url::Url;

    const HOME: &str = "https://example.com/";
    const DOCS: &str = "https://example.com/docs";

    struct Fixture {
        fetcher: Arc<MockFetcher>,
        browser: Arc<MemoryBrowser>,
        controller: Arc<NavigationController>,
        viewport: Arc<RecordingViewport>,
        root: Arc<MemoryEventRoot>,
        binder: Arc<TriggerBinder>,
    }

    fn fixture(config: NavigatorConfig, content: &str) -> Fixture {
        let fetcher = Arc::new(MockFetcher::new());
        let browser = Arc::new(MemoryBrowser::with_container(HOME, "Home", content));
        let classifier = LinkClassifier::from_config(&Url::parse(HOME).unwrap(), &config);
        let controller = Arc::new(NavigationController::new(
            config,
            browser.clone(),
            browser.clone(),
            browser.clone(),
            fetcher.clone(),
        ));
        let viewport = Arc::new(RecordingViewport::new());
        let root = Arc::new(MemoryEventRoot::new());
        let binder = Arc::new(
            TriggerBinder::new(controller.clone(), classifier).with_viewport(viewport.clone()),
        );
        binder.bind(root.as_ref());
        Fixture {
            fetcher,
            browser,
            controller,
            viewport,
            root,
            binder,
        }
    }

    fn marked(id: u64, href: &str) -> LinkElement {
        LinkElement::new(id, LinkAttributes::with_href(href).with_flag("wisp-navigate"))
    }

    #[test]
    fn test_bind_is_idempotent() {
        let f = fixture(NavigatorConfig::default(), "");
        assert!(f.binder.is_bound());
        assert!(!f.binder.bind(f.root.as_ref()));
        assert_eq!(f.root.listener_count(), 1);
        assert_eq!(f.controller.events().len(), 1);
    }

    #[tokio::test]
    async fn test_rebind_keeps_single_listener() {
        let f = fixture(NavigatorConfig::default(), "");
        f.fetcher.respond(DOCS, 200, page_html("Docs", ""));

        f.binder.unbind();
        assert!(!f.root.click(&ClickEvent::primary(marked(1, "/docs"))).prevents_default());

        assert!(f.binder.bind(f.root.as_ref()));
        assert_eq!(f.root.listener_count(), 1);
        assert_eq!(f.controller.events().len(), 1);

        let handle = f.root.click(&ClickEvent::primary(marked(1, "/docs"))).into_handle();
        assert!(handle.unwrap().await.unwrap().is_success());
        assert_eq!(f.fetcher.request_count(DOCS), 1);
    }

    #[test]
    fn test_observes_only_navigable_links() {
        let f = fixture(
            NavigatorConfig::default(),
            r#"<a href="/docs" wisp-navigate>Docs</a>
               <a href="/plain">Plain</a>
               <a href="https://other.example/" wisp-navigate>Elsewhere</a>"#,
        );
        assert_eq!(f.viewport.observed().len(), 1);
        assert_eq!(f.binder.observed_count(), 1);
        assert!(f.viewport.observed().iter().all(|(_, margin)| *margin == 200));
    }

    #[test]
    fn test_viewport_disabled_observes_nothing() {
        let f = fixture(
            NavigatorConfig::default().with_prefetch_on_view(false),
            r#"<a href="/docs" wisp-navigate>Docs</a>"#,
        );
        assert!(f.viewport.observed().is_empty());
    }

    #[tokio::test]
    async fn test_modified_click_is_left_alone() {
        let f = fixture(NavigatorConfig::default(), "");
        let event = ClickEvent::primary(marked(1, "/docs")).with_modifiers(
            crate::triggers::Modifiers {
                meta: true,
                ..Default::default()
            },
        );
        assert!(!f.root.click(&event).prevents_default());
        assert_eq!(f.fetcher.total_requests(), 0);
    }

    #[tokio::test]
    async fn test_unmarked_click_is_left_alone() {
        let f = fixture(NavigatorConfig::default(), "");
        let link = LinkElement::new(1, LinkAttributes::with_href("/docs"));
        assert!(!f.root.click(&ClickEvent::primary(link)).prevents_default());
    }

    #[tokio::test]
    async fn test_click_intercepts_and_navigates() {
        let f = fixture(NavigatorConfig::default(), "");
        f.fetcher.respond(DOCS, 200, page_html("Docs", "<p>docs</p>"));

        let disposition = f.root.click(&ClickEvent::primary(marked(1, "/docs")));
        assert!(disposition.prevents_default());
        let outcome = disposition.into_handle().unwrap().await.unwrap();

        assert!(outcome.is_success());
        assert_eq!(f.browser.title(), "Docs");
    }

    #[tokio::test]
    async fn test_hover_prefetches_after_delay() {
        let config = NavigatorConfig::default().with_prefetch_delay(Duration::from_millis(10));
        let f = fixture(config, "");
        f.fetcher.respond(DOCS, 200, page_html("Docs", ""));

        f.root.hover(&marked(1, "/docs"));
        assert_eq!(f.fetcher.total_requests(), 0);
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(f.fetcher.request_count(DOCS), 1);
        assert!(f.controller.cache().is_ready(DOCS));
    }

    #[tokio::test]
    async fn test_hover_leave_cancels_prefetch() {
        let config = NavigatorConfig::default().with_prefetch_delay(Duration::from_millis(30));
        let f = fixture(config, "");
        f.fetcher.respond(DOCS, 200, page_html("Docs", ""));

        let link = marked(1, "/docs");
        f.root.hover(&link);
        f.root.leave(&link);
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(f.fetcher.total_requests(), 0);
    }

    #[tokio::test]
    async fn test_hover_on_cached_link_cancels_pending_timer() {
        let config = NavigatorConfig::default().with_prefetch_delay(Duration::from_millis(20));
        let f = fixture(config, "");
        let first = "https://example.com/a";
        f.fetcher.respond(first, 200, page_html("A", ""));
        f.fetcher.respond(DOCS, 200, page_html("Docs", ""));
        assert!(f.binder.prefetch(DOCS));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(f.controller.cache().is_ready(DOCS));

        f.root.hover(&marked(1, "/a"));
        f.root.hover(&marked(2, "/docs"));
        tokio::time::sleep(Duration::from_millis(70)).await;

        assert_eq!(f.fetcher.request_count(first), 0);
        assert_eq!(f.fetcher.request_count(DOCS), 1);
    }

    #[tokio::test]
    async fn test_hover_disabled() {
        let config = NavigatorConfig::default()
            .with_prefetch_on_hover(false)
            .with_prefetch_delay(Duration::from_millis(5));
        let f = fixture(config, "");

        f.root.hover(&marked(1, "/docs"));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(f.fetcher.total_requests(), 0);
    }

    #[tokio::test]
    async fn test_visible_prefetches_once_and_unobserves() {
        let f = fixture(
            NavigatorConfig::default(),
            r#"<a href="/docs" wisp-navigate>Docs</a>"#,
        );
        f.fetcher.respond(DOCS, 200, page_html("Docs", ""));
        let link = f.browser.links().remove(0);

        f.root.visible(&link);
        f.root.visible(&link);
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(f.fetcher.request_count(DOCS), 1);
        assert!(f.viewport.unobserved().contains(&link.id));
        assert!(!f.viewport.is_observed(link.id));
    }

    #[tokio::test]
    async fn test_swapped_in_links_are_observed() {
        let f = fixture(NavigatorConfig::default(), "");
        f.fetcher.respond(
            DOCS,
            200,
            page_html("Docs", r#"<a href="/guide" wisp-navigate>Guide</a>"#),
        );
        assert!(f.viewport.observed().is_empty());

        f.controller.navigate("/docs", NavigateOptions::default()).await;

        let links = f.browser.links();
        assert_eq!(links.len(), 1);
        assert!(f.viewport.is_observed(links[0].id));
    }

    #[tokio::test]
    async fn test_popstate_replays_without_push() {
        let f = fixture(NavigatorConfig::default(), "");
        f.fetcher.respond(DOCS, 200, page_html("Docs", ""));

        let handle = f.root.popstate(DOCS).unwrap();
        assert!(handle.await.unwrap().is_success());
        assert!(f.browser.pushed().is_empty());
        assert_eq!(f.browser.title(), "Docs");
    }

    #[tokio::test]
    async fn test_unbind_releases_bus_subscription() {
        let f = fixture(
            NavigatorConfig::default(),
            r#"<a href="/docs" wisp-navigate>Docs</a>"#,
        );
        f.binder.unbind();
        assert!(!f.binder.is_bound());
        assert!(f.controller.events().is_empty());
        assert_eq!(f.binder.observed_count(), 0);
        assert!(f.root.popstate(DOCS).is_none());
    }
}
