//! Debounced hover prefetch.

use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::links::ElementId;

struct PendingHover {
    element: ElementId,
    handle: JoinHandle<()>,
}

/// Holds at most one pending hover timer.
///
/// Hovering a different link replaces the timer; hovering the same link
/// again keeps it.
#[derive(Default)]
pub struct HoverDebouncer {
    pending: Mutex<Option<PendingHover>>,
}

impl HoverDebouncer {
    /// Creates an idle debouncer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `action` after `delay` unless cancelled or replaced first.
    ///
    /// Returns whether a new timer was started.
    pub fn schedule<F>(&self, element: ElementId, delay: Duration, action: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return false;
        };

        let mut pending = self.pending.lock();
        if let Some(current) = pending.as_ref() {
            if current.element == element && !current.handle.is_finished() {
                return false;
            }
        }
        if let Some(previous) = pending.take() {
            previous.handle.abort();
        }

        trace!(element = element.0, ?delay, "Hover timer started");
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        });
        *pending = Some(PendingHover { element, handle });
        true
    }

    /// Cancels any pending timer. Returns whether one was still waiting.
    pub fn cancel(&self) -> bool {
        match self.pending.lock().take() {
            Some(previous) => {
                let waiting = !previous.handle.is_finished();
                previous.handle.abort();
                waiting
            }
            None => false,
        }
    }

    /// Whether a timer is waiting to fire.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|current| !current.handle.is_finished())
    }
}

impl std::fmt::Debug for HoverDebouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoverDebouncer")
            .field("pending", &self.is_pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn bump(fired: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let fired = fired.clone();
        async move {
            fired.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_fires_after_delay() {
        let debouncer = HoverDebouncer::new();
        let fired = Arc::new(AtomicUsize::new(0));

        assert!(debouncer.schedule(ElementId(1), Duration::from_millis(10), bump(&fired)));
        assert!(debouncer.is_pending());
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test]
    async fn test_cancel_before_delay() {
        let debouncer = HoverDebouncer::new();
        let fired = Arc::new(AtomicUsize::new(0));

        debouncer.schedule(ElementId(1), Duration::from_millis(20), bump(&fired));
        assert!(debouncer.cancel());
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_other_link_replaces_timer() {
        let debouncer = HoverDebouncer::new();
        let fired = Arc::new(AtomicUsize::new(0));

        debouncer.schedule(ElementId(1), Duration::from_millis(20), bump(&fired));
        assert!(debouncer.schedule(ElementId(2), Duration::from_millis(20), bump(&fired)));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_same_link_keeps_timer() {
        let debouncer = HoverDebouncer::new();
        let fired = Arc::new(AtomicUsize::new(0));

        assert!(debouncer.schedule(ElementId(1), Duration::from_millis(20), bump(&fired)));
        assert!(!debouncer.schedule(ElementId(1), Duration::from_millis(20), bump(&fired)));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_runtime_is_noop() {
        let debouncer = HoverDebouncer::new();
        assert!(!debouncer.schedule(ElementId(1), Duration::from_millis(1), async {}));
        assert!(!debouncer.cancel());
    }
}
