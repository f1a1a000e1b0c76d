//! Ordered dispatcher for navigation signals.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

use super::event::{NavigationEvent, NavigationEventKind};
use super::sink::{EventSink, FnSink};

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinkId(u64);

/// Document-scoped event dispatcher.
///
/// Sinks are invoked in subscription order. A panicking sink is logged and
/// skipped; the remaining sinks still run.
#[derive(Default)]
pub struct EventBus {
    sinks: RwLock<Vec<(SinkId, Arc<dyn EventSink>)>>,
    next_id: AtomicU64,
}

impl EventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink.
    pub fn subscribe(&self, sink: Arc<dyn EventSink>) -> SinkId {
        let id = SinkId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.sinks.write().push((id, sink));
        id
    }

    /// Adds a closure listening to one kind of event.
    pub fn on<F>(&self, kind: NavigationEventKind, callback: F) -> SinkId
    where
        F: Fn(&NavigationEvent) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(FnSink::only(kind, callback)))
    }

    /// Removes a sink. Returns whether it was subscribed.
    pub fn unsubscribe(&self, id: SinkId) -> bool {
        let mut sinks = self.sinks.write();
        let before = sinks.len();
        sinks.retain(|(sink_id, _)| *sink_id != id);
        sinks.len() != before
    }

    /// Returns the number of subscribed sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.read().len()
    }

    /// Returns true if nothing is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.read().is_empty()
    }

    /// Delivers `event` to every sink.
    ///
    /// Returns `false` when the event was cancelable and a sink vetoed it.
    pub fn dispatch(&self, event: &NavigationEvent) -> bool {
        // Snapshot so sinks may subscribe or unsubscribe while handling.
        let sinks: Vec<Arc<dyn EventSink>> =
            self.sinks.read().iter().map(|(_, sink)| Arc::clone(sink)).collect();

        for sink in sinks {
            if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                sink.emit(event);
            })) {
                warn!(event_type = %event.kind, "Event sink panicked: {:?}", e);
            }
        }

        !event.default_prevented()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus").field("sinks", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingEventSink;
    use crate::navigation::{NavigateOptions, NavigationRequest};

    fn event(kind: NavigationEventKind) -> NavigationEvent {
        let request = NavigationRequest::new("/docs", NavigateOptions::default());
        NavigationEvent::new(kind, &request)
    }

    #[test]
    fn test_dispatch_in_subscription_order() {
        let bus = EventBus::new();
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

        for label in ["first", "second"] {
            let order = order.clone();
            bus.on(NavigationEventKind::Start, move |_| order.lock().push(label));
        }

        assert!(bus.dispatch(&event(NavigationEventKind::Start)));
        assert_eq!(*order.lock(), vec!["first", "second"]);
    }

    #[test]
    fn test_veto_on_before() {
        let bus = EventBus::new();
        bus.on(NavigationEventKind::Before, NavigationEvent::prevent_default);

        assert!(!bus.dispatch(&event(NavigationEventKind::Before)));
        assert!(bus.dispatch(&event(NavigationEventKind::Start)));
    }

    #[test]
    fn test_panicking_sink_does_not_stop_dispatch() {
        let bus = EventBus::new();
        bus.on(NavigationEventKind::Start, |_| panic!("listener failure"));
        let collector = Arc::new(CollectingEventSink::new());
        bus.subscribe(collector.clone());

        bus.dispatch(&event(NavigationEventKind::Start));
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let collector = Arc::new(CollectingEventSink::new());
        let id = bus.subscribe(collector.clone());

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.dispatch(&event(NavigationEventKind::Start));
        assert!(collector.is_empty());
    }
}
