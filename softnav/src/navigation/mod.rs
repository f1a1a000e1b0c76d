//! The navigation state machine.
//!
//! A navigation moves through
//! `Requested → BeforeHook → Fetching → Applying → Settled`, or stops at the
//! before-hook when a listener vetoes it. Only the most recently started
//! navigation may touch the document or history; a superseded one settles
//! as [`NavigationOutcome::Aborted`] without side effects.

mod controller;
mod request;


pub use controller::NavigationController;
pub use request::{NavigateOptions, NavigationOutcome, NavigationPhase, NavigationRequest};
