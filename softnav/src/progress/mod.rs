//! Visual feedback while a navigation is in flight.
//!
//! The controller only sees [`ProgressIndicator`]. [`ProgressBar`] is the
//! stock implementation: a thin fixed bar at the top of the viewport drawn
//! on a host [`ProgressSurface`].

mod bar;
mod indicator;

pub use bar::{ProgressBar, ProgressBarStyle, ProgressSurface, PROGRESS_BAR_ID};
pub use indicator::{NoOpIndicator, ProgressIndicator};

#[cfg(test)]
pub use indicator::MockProgressIndicator;
