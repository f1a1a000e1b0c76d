//! Event sink trait and implementations.

use parking_lot::RwLock;
use tracing::{debug, info, Level};

use super::event::{NavigationEvent, NavigationEventKind};

/// Trait for listeners that receive navigation signals.
///
/// Sinks are called synchronously, in subscription order, while the
/// navigation waits. A sink vetoes a navigation by calling
/// [`NavigationEvent::prevent_default`] on the `navigate-before` signal.
pub trait EventSink: Send + Sync {
    /// Receives an event. Must not block.
    fn emit(&self, event: &NavigationEvent);
}

/// A no-op event sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn emit(&self, _event: &NavigationEvent) {}
}

/// An event sink that logs events using the tracing framework.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    /// The log level to use.
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self { level: Level::DEBUG }
    }
}

impl LoggingEventSink {
    /// Creates a new logging event sink with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    /// Creates an info-level logging sink.
    #[must_use]
    pub fn info() -> Self {
        Self::new(Level::INFO)
    }
}

impl EventSink for LoggingEventSink {
    fn emit(&self, event: &NavigationEvent) {
        let event_type = event.kind.as_str();
        if self.level == Level::DEBUG {
            debug!(
                event_type = %event_type,
                url = %event.url,
                request_id = %event.request_id,
                "Event: {}", event_type
            );
        } else {
            info!(
                event_type = %event_type,
                url = %event.url,
                request_id = %event.request_id,
                "Event: {}", event_type
            );
        }
    }
}

/// A sink backed by a closure.
pub struct FnSink<F>
where
    F: Fn(&NavigationEvent) + Send + Sync,
{
    filter: Option<NavigationEventKind>,
    callback: F,
}

impl<F> FnSink<F>
where
    F: Fn(&NavigationEvent) + Send + Sync,
{
    /// Calls `callback` for every event.
    pub fn new(callback: F) -> Self {
        Self {
            filter: None,
            callback,
        }
    }

    /// Calls `callback` only for events of `kind`.
    pub fn only(kind: NavigationEventKind, callback: F) -> Self {
        Self {
            filter: Some(kind),
            callback,
        }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: Fn(&NavigationEvent) + Send + Sync,
{
    fn emit(&self, event: &NavigationEvent) {
        if self.filter.map_or(true, |kind| kind == event.kind) {
            (self.callback)(event);
        }
    }
}

impl<F> std::fmt::Debug for FnSink<F>
where
    F: Fn(&NavigationEvent) + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSink").field("filter", &self.filter).finish()
    }
}

/// A collecting event sink for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<NavigationEvent>>,
}

impl CollectingEventSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<NavigationEvent> {
        self.events.read().clone()
    }

    /// Returns the kinds of all collected events, in order.
    #[must_use]
    pub fn kinds(&self) -> Vec<NavigationEventKind> {
        self.events.read().iter().map(|e| e.kind).collect()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Returns events of one kind.
    #[must_use]
    pub fn events_of_kind(&self, kind: NavigationEventKind) -> Vec<NavigationEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    /// Counts events of one kind.
    #[must_use]
    pub fn count(&self, kind: NavigationEventKind) -> usize {
        self.events.read().iter().filter(|e| e.kind == kind).count()
    }
}

impl EventSink for CollectingEventSink {
    fn emit(&self, event: &NavigationEvent) {
        self.events.write().push(event.clone());
    }
}
