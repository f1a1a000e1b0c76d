//! Assertions over collected navigation events.

use crate::events::{CollectingEventSink, NavigationEventKind};
use crate::navigation::NavigationOutcome;

/// Asserts the exact sequence of event kinds seen so far.
pub fn assert_event_sequence(sink: &CollectingEventSink, expected: &[NavigationEventKind]) {
    let kinds = sink.kinds();
    assert_eq!(
        kinds, expected,
        "Expected events {:?}, got {:?}",
        expected, kinds
    );
}

/// Asserts `navigate-complete` fired once per started navigation.
pub fn assert_complete_per_start(sink: &CollectingEventSink) {
    let starts = sink.count(NavigationEventKind::Start);
    let completes = sink.count(NavigationEventKind::Complete);
    assert_eq!(
        starts, completes,
        "Expected one navigate-complete per navigate-start, got {} starts and {} completes",
        starts, completes
    );
}

/// Asserts the outcome is a success.
pub fn assert_succeeded(outcome: &NavigationOutcome) {
    assert!(outcome.is_success(), "Expected success, got {:?}", outcome);
}

/// Asserts the outcome is a success that used prefetched content.
pub fn assert_prefetched(outcome: &NavigationOutcome) {
    assert!(
        matches!(outcome, NavigationOutcome::Succeeded { prefetched: true, .. }),
        "Expected a prefetched success, got {:?}",
        outcome
    );
}

/// Asserts the outcome is a failure of the given error kind.
pub fn assert_failed_with(outcome: &NavigationOutcome, kind: &str) {
    assert_eq!(
        outcome.error().map(crate::errors::NavigationError::kind),
        Some(kind),
        "Expected {} failure, got {:?}",
        kind,
        outcome
    );
}
