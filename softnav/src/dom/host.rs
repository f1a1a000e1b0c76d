//! Host-side seams for the browsing context.

use crate::errors::NavigationError;
use crate::links::LinkElement;

/// The live document.
///
/// Implementations use interior mutability; all calls happen from the single
/// active navigation flow.
pub trait Document: Send + Sync {
    /// The current document URL (reflects history pushes).
    fn url(&self) -> String;

    /// Whether an element with this id exists.
    fn has_element(&self, id: &str) -> bool;

    /// Replaces the inner content of the element with this id.
    fn set_inner_html(&self, id: &str, html: &str) -> Result<(), NavigationError>;

    /// Replaces the whole body content.
    fn set_body_html(&self, html: &str) -> Result<(), NavigationError>;

    /// The document title.
    fn title(&self) -> String;

    /// Sets the document title.
    fn set_title(&self, title: &str);

    /// Resets the viewport to the top-left corner.
    fn scroll_to_top(&self);

    /// All anchors currently rendered.
    fn links(&self) -> Vec<LinkElement>;
}

/// Session history.
pub trait History: Send + Sync {
    /// Pushes a new entry without reloading. May be refused by the browsing
    /// context.
    fn push_state(&self, url: &str) -> Result<(), NavigationError>;
}

/// The browsing context's location.
pub trait Location: Send + Sync {
    /// Performs a full, non-intercepted load of `url`.
    fn assign(&self, url: &str);
}
