//! Cooperative cancellation for in-flight navigations.
//!
//! The navigation controller owns at most one live [`CancellationToken`].
//! Starting a new navigation cancels the previous token; the superseded
//! flow observes the cancellation at its next suspension point and settles
//! as aborted without touching the document.

mod token;

pub use token::{CancelCallback, CancellationToken};
