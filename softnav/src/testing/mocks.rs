//! Scriptable doubles for the network and host seams.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::errors::NavigationError;
use crate::fetch::{FetchResult, Fetcher};
use crate::links::{ElementId, LinkElement};
use crate::navigation::NavigationOutcome;
use crate::progress::{ProgressSurface, PROGRESS_BAR_ID};
use crate::triggers::{ClickDisposition, ClickEvent, EventRoot, TriggerListener, ViewportObserver};

#[derive(Debug, Clone)]
enum Reply {
    Page { status: u16, body: String },
    Failure(String),
}

#[derive(Debug, Clone)]
struct Route {
    reply: Reply,
    delay: Option<Duration>,
}

/// A fetcher answering from a per-URL script.
///
/// Unscripted URLs answer 404. Requests dropped before completing are
/// counted as aborted.
#[derive(Debug, Default)]
pub struct MockFetcher {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<(String, HashMap<String, String>)>>,
    completed: AtomicUsize,
    aborted: Arc<AtomicUsize>,
}

/// Counts a request as aborted unless it was disarmed on completion.
struct InFlight {
    aborted: Arc<AtomicUsize>,
    armed: bool,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.armed {
            self.aborted.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl MockFetcher {
    /// Creates a fetcher with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `url` immediately.
    pub fn respond(&self, url: impl Into<String>, status: u16, body: impl Into<String>) {
        self.route(url, Reply::Page { status, body: body.into() }, None);
    }

    /// Answers `url` after `delay`.
    pub fn respond_after(
        &self,
        url: impl Into<String>,
        status: u16,
        body: impl Into<String>,
        delay: Duration,
    ) {
        self.route(url, Reply::Page { status, body: body.into() }, Some(delay));
    }

    /// Fails `url` with a network error.
    pub fn fail(&self, url: impl Into<String>, message: impl Into<String>) {
        self.route(url, Reply::Failure(message.into()), None);
    }

    /// Fails `url` with a network error after `delay`.
    pub fn fail_after(&self, url: impl Into<String>, message: impl Into<String>, delay: Duration) {
        self.route(url, Reply::Failure(message.into()), Some(delay));
    }

    /// Requests made for `url`.
    #[must_use]
    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().iter().filter(|(u, _)| u == url).count()
    }

    /// Requests made for any URL.
    #[must_use]
    pub fn total_requests(&self) -> usize {
        self.requests.lock().len()
    }

    /// URLs requested, in order.
    #[must_use]
    pub fn requested_urls(&self) -> Vec<String> {
        self.requests.lock().iter().map(|(u, _)| u.clone()).collect()
    }

    /// Headers of the most recent request.
    #[must_use]
    pub fn last_headers(&self) -> Option<HashMap<String, String>> {
        self.requests.lock().last().map(|(_, h)| h.clone())
    }

    /// Requests that ran to completion.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Requests dropped before completing.
    #[must_use]
    pub fn aborted_count(&self) -> usize {
        self.aborted.load(Ordering::SeqCst)
    }

    fn route(&self, url: impl Into<String>, reply: Reply, delay: Option<Duration>) {
        self.routes.lock().insert(url.into(), Route { reply, delay });
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<FetchResult, NavigationError> {
        self.requests.lock().push((url.to_string(), headers.clone()));
        let route = self.routes.lock().get(url).cloned().unwrap_or(Route {
            reply: Reply::Page {
                status: 404,
                body: "not found".to_string(),
            },
            delay: None,
        });

        let mut guard = InFlight {
            aborted: Arc::clone(&self.aborted),
            armed: true,
        };
        if let Some(delay) = route.delay {
            tokio::time::sleep(delay).await;
        }
        guard.armed = false;
        self.completed.fetch_add(1, Ordering::SeqCst);

        match route.reply {
            Reply::Page { status, body } => Ok(FetchResult::new(url, status, body)),
            Reply::Failure(message) => Err(NavigationError::network(url, message)),
        }
    }
}

/// One call made on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    /// Bar injected with this CSS.
    Inject(String),
    /// Width set, in percent.
    Width(f32),
    /// Opacity set.
    Opacity(f32),
}

#[derive(Debug, Default)]
struct SurfaceState {
    present: bool,
    injected: usize,
    width: Option<f32>,
    opacity: Option<f32>,
    ops: Vec<SurfaceOp>,
}

/// A progress surface that records every call.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    state: Mutex<SurfaceState>,
}

impl RecordingSurface {
    /// Creates a surface without a bar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Times the bar was injected.
    #[must_use]
    pub fn injected_count(&self) -> usize {
        self.state.lock().injected
    }

    /// Last width set.
    #[must_use]
    pub fn width(&self) -> Option<f32> {
        self.state.lock().width
    }

    /// Last opacity set.
    #[must_use]
    pub fn opacity(&self) -> Option<f32> {
        self.state.lock().opacity
    }

    /// Every call, in order.
    #[must_use]
    pub fn ops(&self) -> Vec<SurfaceOp> {
        self.state.lock().ops.clone()
    }

    /// Removes the bar, as a whole-body swap would.
    pub fn remove(&self) {
        let mut state = self.state.lock();
        state.present = false;
        state.width = None;
        state.opacity = None;
    }
}

impl ProgressSurface for RecordingSurface {
    fn exists(&self, id: &str) -> bool {
        id == PROGRESS_BAR_ID && self.state.lock().present
    }

    fn inject(&self, _id: &str, css: &str) {
        let mut state = self.state.lock();
        state.present = true;
        state.injected += 1;
        state.ops.push(SurfaceOp::Inject(css.to_string()));
    }

    fn set_width(&self, _id: &str, percent: f32) {
        let mut state = self.state.lock();
        state.width = Some(percent);
        state.ops.push(SurfaceOp::Width(percent));
    }

    fn set_opacity(&self, _id: &str, opacity: f32) {
        let mut state = self.state.lock();
        state.opacity = Some(opacity);
        state.ops.push(SurfaceOp::Opacity(opacity));
    }
}

/// A viewport observer that records registrations.
#[derive(Debug, Default)]
pub struct RecordingViewport {
    observed: Mutex<Vec<(ElementId, u32)>>,
    unobserved: Mutex<Vec<ElementId>>,
}

impl RecordingViewport {
    /// Creates an empty observer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Elements currently observed, with their margins.
    #[must_use]
    pub fn observed(&self) -> Vec<(ElementId, u32)> {
        self.observed.lock().clone()
    }

    /// Whether `id` is currently observed.
    #[must_use]
    pub fn is_observed(&self, id: ElementId) -> bool {
        self.observed.lock().iter().any(|(observed, _)| *observed == id)
    }

    /// Every element ever unobserved.
    #[must_use]
    pub fn unobserved(&self) -> Vec<ElementId> {
        self.unobserved.lock().clone()
    }
}

impl ViewportObserver for RecordingViewport {
    fn observe(&self, element: ElementId, margin_px: u32) {
        self.observed.lock().push((element, margin_px));
    }

    fn unobserve(&self, element: ElementId) {
        self.observed.lock().retain(|(id, _)| *id != element);
        self.unobserved.lock().push(element);
    }
}

/// A document root that forwards synthetic interaction to its listeners.
#[derive(Default)]
pub struct MemoryEventRoot {
    listeners: Mutex<Vec<Arc<dyn TriggerListener>>>,
}

impl MemoryEventRoot {
    /// Creates a root with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attached listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    fn listeners(&self) -> Vec<Arc<dyn TriggerListener>> {
        self.listeners.lock().clone()
    }

    /// Delivers a click; the first intercepting listener wins.
    pub fn click(&self, event: &ClickEvent) -> ClickDisposition {
        for listener in self.listeners() {
            let disposition = listener.on_click(event);
            if disposition.prevents_default() {
                return disposition;
            }
        }
        ClickDisposition::Default
    }

    /// Moves the pointer onto `link`.
    pub fn hover(&self, link: &LinkElement) {
        for listener in self.listeners() {
            listener.on_pointer_enter(link);
        }
    }

    /// Moves the pointer off `link`.
    pub fn leave(&self, link: &LinkElement) {
        for listener in self.listeners() {
            listener.on_pointer_leave(link);
        }
    }

    /// Reports `link` as within the viewport margin.
    pub fn visible(&self, link: &LinkElement) {
        for listener in self.listeners() {
            listener.on_visible(link);
        }
    }

    /// Reports a history traversal to `url`.
    pub fn popstate(&self, url: &str) -> Option<JoinHandle<NavigationOutcome>> {
        self.listeners()
            .into_iter()
            .filter_map(|listener| listener.on_popstate(url))
            .last()
    }
}

impl EventRoot for MemoryEventRoot {
    fn attach(&self, listener: Arc<dyn TriggerListener>) {
        self.listeners.lock().push(listener);
    }
}

impl std::fmt::Debug for MemoryEventRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEventRoot")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Ids handed out by doubles that render links.
pub(crate) fn next_element_id() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::SeqCst)
}

/// Distinct element ids among `links`.
#[must_use]
pub fn element_ids(links: &[LinkElement]) -> HashSet<ElementId> {
    links.iter().map(|link| link.id).collect()
}
