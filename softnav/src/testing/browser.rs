//! An in-memory browsing context.

use parking_lot::Mutex;
use scraper::{Html, Selector};

use super::mocks::next_element_id;
use crate::dom::{Document, History, Location};
use crate::errors::NavigationError;
use crate::links::{LinkAttributes, LinkElement};

const DEFAULT_CONTAINER: &str = "app";

#[derive(Debug, Clone)]
enum Body {
    /// Site chrome around a container element.
    Framed { container: String },
    /// Arbitrary body markup with no container.
    Raw(String),
}

#[derive(Debug)]
struct BrowserState {
    container_id: String,
    title: String,
    body: Body,
    links: Vec<LinkElement>,
    entries: Vec<String>,
    index: usize,
    pushed: Vec<String>,
    assigned: Vec<String>,
    refuse_history: bool,
    scroll_y: u32,
    scroll_resets: usize,
    body_writes: usize,
    container_writes: usize,
}

impl BrowserState {
    fn body_html(&self) -> String {
        match &self.body {
            Body::Framed { container } => format!(
                "<header>Site</header><main id=\"{}\">{}</main><footer>Footer</footer>",
                self.container_id, container
            ),
            Body::Raw(html) => html.clone(),
        }
    }

    /// Re-extracts anchors with fresh ids, as a real DOM would after
    /// replacing markup.
    fn relink(&mut self) {
        let fragment = Html::parse_fragment(&self.body_html());
        self.links = match Selector::parse("a") {
            Ok(selector) => fragment
                .select(&selector)
                .map(|anchor| {
                    let attributes = anchor
                        .value()
                        .attrs()
                        .fold(LinkAttributes::new(), |attrs, (name, value)| {
                            attrs.with(name, value)
                        });
                    LinkElement::new(next_element_id(), attributes)
                })
                .collect(),
            Err(_) => Vec::new(),
        };
    }
}

/// Document, history and location over plain strings.
///
/// Anchors are re-parsed with new element ids whenever markup is written.
#[derive(Debug)]
pub struct MemoryBrowser {
    state: Mutex<BrowserState>,
}

impl MemoryBrowser {
    fn build(url: &str, title: &str, body: Body) -> Self {
        let mut state = BrowserState {
            container_id: DEFAULT_CONTAINER.to_string(),
            title: title.to_string(),
            body,
            links: Vec::new(),
            entries: vec![url.to_string()],
            index: 0,
            pushed: Vec::new(),
            assigned: Vec::new(),
            refuse_history: false,
            scroll_y: 0,
            scroll_resets: 0,
            body_writes: 0,
            container_writes: 0,
        };
        state.relink();
        Self {
            state: Mutex::new(state),
        }
    }

    /// A page whose `#app` container holds `container_html`.
    #[must_use]
    pub fn with_container(url: &str, title: &str, container_html: &str) -> Self {
        Self::build(
            url,
            title,
            Body::Framed {
                container: container_html.to_string(),
            },
        )
    }

    /// A page without a container.
    #[must_use]
    pub fn without_container(url: &str, title: &str, body_html: &str) -> Self {
        Self::build(url, title, Body::Raw(body_html.to_string()))
    }

    /// Inner HTML of the container, if the page has one.
    #[must_use]
    pub fn container_html(&self) -> Option<String> {
        match &self.state.lock().body {
            Body::Framed { container } => Some(container.clone()),
            Body::Raw(_) => None,
        }
    }

    /// Full body markup.
    #[must_use]
    pub fn body_html(&self) -> String {
        self.state.lock().body_html()
    }

    /// URLs pushed onto history, in order.
    #[must_use]
    pub fn pushed(&self) -> Vec<String> {
        self.state.lock().pushed.clone()
    }

    /// Full loads requested, in order.
    #[must_use]
    pub fn assigned(&self) -> Vec<String> {
        self.state.lock().assigned.clone()
    }

    /// Makes `push_state` fail, as a sandboxed frame might.
    pub fn refuse_history(&self, refuse: bool) {
        self.state.lock().refuse_history = refuse;
    }

    /// Steps back in history and returns the URL now current, which is what
    /// a popstate listener sees.
    pub fn go_back(&self) -> Option<String> {
        let mut state = self.state.lock();
        if state.index == 0 {
            return None;
        }
        state.index -= 1;
        Some(state.entries[state.index].clone())
    }

    /// Scrolls to a vertical offset.
    pub fn scroll_to(&self, y: u32) {
        self.state.lock().scroll_y = y;
    }

    /// Current vertical offset.
    #[must_use]
    pub fn scroll_position(&self) -> u32 {
        self.state.lock().scroll_y
    }

    /// Times the viewport was reset to the top.
    #[must_use]
    pub fn scroll_resets(&self) -> usize {
        self.state.lock().scroll_resets
    }

    /// Number of whole-body replacements.
    #[must_use]
    pub fn body_writes(&self) -> usize {
        self.state.lock().body_writes
    }

    /// Number of container replacements.
    #[must_use]
    pub fn container_writes(&self) -> usize {
        self.state.lock().container_writes
    }
}

impl Document for MemoryBrowser {
    fn url(&self) -> String {
        let state = self.state.lock();
        state.entries[state.index].clone()
    }

    fn has_element(&self, id: &str) -> bool {
        let state = self.state.lock();
        matches!(state.body, Body::Framed { .. }) && state.container_id == id
    }

    fn set_inner_html(&self, id: &str, html: &str) -> Result<(), NavigationError> {
        let mut state = self.state.lock();
        if state.container_id != id {
            return Err(NavigationError::Apply(format!("no element #{id}")));
        }
        match &mut state.body {
            Body::Framed { container } => *container = html.to_string(),
            Body::Raw(_) => return Err(NavigationError::Apply(format!("no element #{id}"))),
        }
        state.container_writes += 1;
        state.relink();
        Ok(())
    }

    fn set_body_html(&self, html: &str) -> Result<(), NavigationError> {
        let mut state = self.state.lock();
        state.body = Body::Raw(html.to_string());
        state.body_writes += 1;
        state.relink();
        Ok(())
    }

    fn title(&self) -> String {
        self.state.lock().title.clone()
    }

    fn set_title(&self, title: &str) {
        self.state.lock().title = title.to_string();
    }

    fn scroll_to_top(&self) {
        let mut state = self.state.lock();
        state.scroll_y = 0;
        state.scroll_resets += 1;
    }

    fn links(&self) -> Vec<LinkElement> {
        self.state.lock().links.clone()
    }
}

impl History for MemoryBrowser {
    fn push_state(&self, url: &str) -> Result<(), NavigationError> {
        let mut state = self.state.lock();
        if state.refuse_history {
            return Err(NavigationError::History(format!(
                "pushState refused for {url}"
            )));
        }
        let next = state.index + 1;
        state.entries.truncate(next);
        state.entries.push(url.to_string());
        state.index = next;
        state.pushed.push(url.to_string());
        Ok(())
    }
}

impl Location for MemoryBrowser {
    fn assign(&self, url: &str) {
        self.state.lock().assigned.push(url.to_string());
    }
}
