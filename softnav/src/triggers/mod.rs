//! Interaction triggers: clicks, hover and viewport prefetch, history moves.

mod binder;
mod hover;
mod listener;

pub use binder::TriggerBinder;
pub use hover::HoverDebouncer;
pub use listener::{
    ClickDisposition, ClickEvent, EventRoot, Modifiers, PointerButton, TriggerListener,
    ViewportObserver,
};
