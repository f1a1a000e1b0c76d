//! Lifecycle signals and the sinks that observe them.
//!
//! This module provides:
//! - [`NavigationEvent`], the payload carried by every signal
//! - [`EventBus`], an ordered, document-scoped dispatcher with veto support
//! - Sinks for logging, collecting, and closure-based listeners

mod bus;
mod event;
mod sink;

pub use bus::{EventBus, SinkId};
pub use event::{NavigationEvent, NavigationEventKind};
pub use sink::{CollectingEventSink, EventSink, FnSink, LoggingEventSink, NoOpEventSink};
