//! Host-facing seams for user interaction.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::links::{ElementId, LinkElement};
use crate::navigation::NavigationOutcome;

/// Which pointer button produced a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    /// Usually the left button.
    #[default]
    Primary,
    /// Usually the wheel button.
    Auxiliary,
    /// Usually the right button.
    Secondary,
}

/// Keyboard modifiers held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    /// Control key.
    pub ctrl: bool,
    /// Meta / command key.
    pub meta: bool,
    /// Shift key.
    pub shift: bool,
    /// Alt / option key.
    pub alt: bool,
}

impl Modifiers {
    /// Whether any modifier is held.
    #[must_use]
    pub fn any(&self) -> bool {
        self.ctrl || self.meta || self.shift || self.alt
    }
}

/// A click that reached the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    /// The nearest anchor ancestor of the click target.
    pub link: LinkElement,
    /// Button pressed.
    pub button: PointerButton,
    /// Modifiers held.
    pub modifiers: Modifiers,
    /// Whether an earlier handler already cancelled the click.
    pub default_prevented: bool,
}

impl ClickEvent {
    /// A plain primary-button click on `link`.
    #[must_use]
    pub fn primary(link: LinkElement) -> Self {
        Self {
            link,
            button: PointerButton::Primary,
            modifiers: Modifiers::default(),
            default_prevented: false,
        }
    }

    /// Sets the modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Sets the button.
    #[must_use]
    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    /// Marks the click as already handled elsewhere.
    #[must_use]
    pub fn prevented(mut self) -> Self {
        self.default_prevented = true;
        self
    }

    /// A primary click with no modifiers that nobody else handled.
    /// Anything else keeps the browser's own behavior (new tab, save, ...).
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.button == PointerButton::Primary && !self.modifiers.any() && !self.default_prevented
    }
}

/// What the host should do with a click after the listener saw it.
#[derive(Debug)]
pub enum ClickDisposition {
    /// Let the browser follow the link normally.
    Default,
    /// Suppress the default action; a soft navigation is running.
    Intercepted(JoinHandle<NavigationOutcome>),
}

impl ClickDisposition {
    /// Whether the host must suppress the browser's default action.
    #[must_use]
    pub fn prevents_default(&self) -> bool {
        matches!(self, Self::Intercepted(_))
    }

    /// The running navigation, if the click was intercepted.
    #[must_use]
    pub fn into_handle(self) -> Option<JoinHandle<NavigationOutcome>> {
        match self {
            Self::Intercepted(handle) => Some(handle),
            Self::Default => None,
        }
    }
}

/// Receives delegated interaction signals from the host.
///
/// The host attaches one listener to the document root, so anchors inserted
/// later are covered without rebinding.
pub trait TriggerListener: Send + Sync {
    /// A click whose target has an anchor ancestor.
    fn on_click(&self, event: &ClickEvent) -> ClickDisposition;

    /// The pointer entered an anchor.
    fn on_pointer_enter(&self, link: &LinkElement);

    /// The pointer left an anchor.
    fn on_pointer_leave(&self, link: &LinkElement);

    /// An observed anchor came within the viewport margin.
    fn on_visible(&self, link: &LinkElement);

    /// The user moved through history; `url` is the document URL afterwards.
    fn on_popstate(&self, url: &str) -> Option<JoinHandle<NavigationOutcome>>;
}

/// The document root interaction listeners attach to.
pub trait EventRoot: Send + Sync {
    /// Attaches a delegated listener.
    fn attach(&self, listener: Arc<dyn TriggerListener>);
}

/// Viewport intersection observer.
pub trait ViewportObserver: Send + Sync {
    /// Starts reporting when `element` comes within `margin_px` of the
    /// viewport.
    fn observe(&self, element: ElementId, margin_px: u32);

    /// Stops reporting for `element`.
    fn unobserve(&self, element: ElementId);
}
