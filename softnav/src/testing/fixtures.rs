//! Page fixtures and a wired-up navigator harness.

use std::sync::Arc;

use super::browser::MemoryBrowser;
use super::mocks::{MemoryEventRoot, MockFetcher, RecordingSurface, RecordingViewport};
use crate::config::NavigatorConfig;
use crate::events::CollectingEventSink;
use crate::links::{LinkAttributes, LinkElement};
use crate::navigator::{BrowserHost, SoftNavigator};

/// Origin every harness page lives on.
pub const TEST_ORIGIN: &str = "https://example.com";

/// A full page whose `#app` container holds `content`.
#[must_use]
pub fn page_html(title: &str, content: &str) -> String {
    format!(
        "<!doctype html><html><head><title>{title}</title></head>\
         <body><header>Site</header><main id=\"app\">{content}</main></body></html>"
    )
}

/// A full page without a container.
#[must_use]
pub fn bare_page_html(title: &str, body: &str) -> String {
    format!("<!doctype html><html><head><title>{title}</title></head><body>{body}</body></html>")
}

/// Absolute URL on [`TEST_ORIGIN`].
#[must_use]
pub fn url(path: &str) -> String {
    format!("{TEST_ORIGIN}{path}")
}

/// An opted-in anchor pointing at `href`.
#[must_use]
pub fn marked_link(id: u64, href: &str) -> LinkElement {
    LinkElement::new(id, LinkAttributes::with_href(href).with_flag("wisp-navigate"))
}

/// A navigator over in-memory doubles, with every event collected.
pub struct TestHarness {
    /// Scripted network.
    pub fetcher: Arc<MockFetcher>,
    /// The page.
    pub browser: Arc<MemoryBrowser>,
    /// Delegation root.
    pub root: Arc<MemoryEventRoot>,
    /// Viewport observer.
    pub viewport: Arc<RecordingViewport>,
    /// Progress bar surface.
    pub surface: Arc<RecordingSurface>,
    /// Every event raised.
    pub events: Arc<CollectingEventSink>,
    /// The navigator under test.
    pub navigator: SoftNavigator,
}

impl TestHarness {
    /// A harness on the home page with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(NavigatorConfig::default())
    }

    /// A harness on the home page.
    #[must_use]
    pub fn with_config(config: NavigatorConfig) -> Self {
        let browser = Arc::new(MemoryBrowser::with_container(
            &url("/"),
            "Home",
            r#"<h1>Home</h1><a href="/about" wisp-navigate>About</a>"#,
        ));
        Self::with_browser(config, browser)
    }

    /// A harness over an existing page.
    ///
    /// # Panics
    ///
    /// Panics if the navigator rejects `config`.
    #[must_use]
    pub fn with_browser(config: NavigatorConfig, browser: Arc<MemoryBrowser>) -> Self {
        let fetcher = Arc::new(MockFetcher::new());
        let root = Arc::new(MemoryEventRoot::new());
        let viewport = Arc::new(RecordingViewport::new());
        let surface = Arc::new(RecordingSurface::new());
        let events = Arc::new(CollectingEventSink::new());

        let host = BrowserHost::new(browser.clone(), root.clone())
            .with_viewport(viewport.clone())
            .with_surface(surface.clone());
        let navigator = match SoftNavigator::init(config, host, fetcher.clone()) {
            Ok(navigator) => navigator,
            Err(e) => panic!("harness navigator failed to initialize: {e}"),
        };
        navigator.subscribe(events.clone());

        Self {
            fetcher,
            browser,
            root,
            viewport,
            surface,
            events,
            navigator,
        }
    }

    /// Scripts a page with a container at `path`.
    pub fn page(&self, path: &str, title: &str, content: &str) {
        self.fetcher.respond(url(path), 200, page_html(title, content));
    }

    /// Scripts a slow page with a container at `path`.
    pub fn slow_page(&self, path: &str, title: &str, content: &str, delay: std::time::Duration) {
        self.fetcher
            .respond_after(url(path), 200, page_html(title, content), delay);
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TestHarness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestHarness")
            .field("navigator", &self.navigator)
            .field("events", &self.events.len())
            .finish()
    }
}
