//! The start/stop boundary between the controller and visual feedback.

/// Receives navigation-started and navigation-ended signals.
///
/// Both calls are fire-and-forget. Every `show` is eventually paired with
/// one `hide`, but pairs from superseded navigations may overlap.
#[cfg_attr(test, mockall::automock)]
pub trait ProgressIndicator: Send + Sync {
    /// A navigation started.
    fn show(&self);

    /// A navigation settled.
    fn hide(&self);
}

/// Indicator used when the progress bar is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpIndicator;

impl ProgressIndicator for NoOpIndicator {
    fn show(&self) {}

    fn hide(&self) {}
}
