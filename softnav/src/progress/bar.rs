//! Fixed top-of-viewport progress bar.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::indicator::ProgressIndicator;
use crate::config::NavigatorConfig;

/// Element id of the injected bar.
pub const PROGRESS_BAR_ID: &str = "wisp-progress-bar";

/// Delay before the bar grows to its in-flight width.
const GROW_DELAY: Duration = Duration::from_millis(10);

/// Delay before a finished bar fades out.
const FADE_DELAY: Duration = Duration::from_millis(400);

/// Width while a navigation is in flight.
const IN_FLIGHT_WIDTH: f32 = 80.0;

/// Host drawing surface for the bar.
pub trait ProgressSurface: Send + Sync {
    /// Whether an element with `id` is in the document.
    fn exists(&self, id: &str) -> bool;

    /// Appends a new element with `id` and inline `css` to the body.
    fn inject(&self, id: &str, css: &str);

    /// Sets the element width as a percentage of the viewport.
    fn set_width(&self, id: &str, percent: f32);

    /// Sets the element opacity in `0.0..=1.0`.
    fn set_opacity(&self, id: &str, opacity: f32);
}

/// Bar color and height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressBarStyle {
    /// CSS color.
    pub color: String,
    /// CSS height.
    pub height: String,
}

impl Default for ProgressBarStyle {
    fn default() -> Self {
        let config = NavigatorConfig::default();
        Self::from_config(&config)
    }
}

impl ProgressBarStyle {
    /// Reads styling from configuration, falling back to defaults for
    /// empty values.
    #[must_use]
    pub fn from_config(config: &NavigatorConfig) -> Self {
        let or_default = |value: &str, default: &str| {
            if value.trim().is_empty() {
                default.to_string()
            } else {
                value.to_string()
            }
        };
        Self {
            color: or_default(&config.navigation_progress_bar_color, "#29d"),
            height: or_default(&config.navigation_progress_bar_height, "3px"),
        }
    }

    /// Inline CSS for the injected element.
    #[must_use]
    pub fn css(&self) -> String {
        format!(
            "position:fixed;top:0;left:0;height:{};width:0;background:{};z-index:99999;\
             transition:width 0.2s,opacity 0.4s;opacity:0;",
            self.height, self.color
        )
    }
}

struct BarState {
    surface: Arc<dyn ProgressSurface>,
    style: ProgressBarStyle,
    /// Navigations currently between show and hide.
    active: AtomicUsize,
    /// Bumped on every transition; delayed steps check it to stay current.
    generation: AtomicU64,
}

impl BarState {
    fn ensure_injected(&self) {
        if !self.surface.exists(PROGRESS_BAR_ID) {
            self.surface.inject(PROGRESS_BAR_ID, &self.style.css());
        }
    }

    fn after(self: &Arc<Self>, delay: Duration, step: fn(&Self, u64)) {
        let generation = self.generation.load(Ordering::SeqCst);
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let state = Arc::clone(self);
                runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    step(&state, generation);
                });
            }
            // Without a runtime there is nothing to animate; jump to the end state.
            Err(_) => step(self, generation),
        }
    }

    fn grow(&self, generation: u64) {
        if self.generation.load(Ordering::SeqCst) == generation {
            self.surface.set_width(PROGRESS_BAR_ID, IN_FLIGHT_WIDTH);
        }
    }

    fn fade(&self, generation: u64) {
        if self.generation.load(Ordering::SeqCst) == generation {
            self.surface.set_opacity(PROGRESS_BAR_ID, 0.0);
            self.surface.set_width(PROGRESS_BAR_ID, 0.0);
        }
    }
}

/// Progress bar driven by navigation start/stop signals.
#[derive(Clone)]
pub struct ProgressBar {
    state: Arc<BarState>,
}

impl ProgressBar {
    /// Creates a bar drawn on `surface`.
    #[must_use]
    pub fn new(surface: Arc<dyn ProgressSurface>, style: ProgressBarStyle) -> Self {
        Self {
            state: Arc::new(BarState {
                surface,
                style,
                active: AtomicUsize::new(0),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Creates a bar styled from configuration.
    #[must_use]
    pub fn from_config(surface: Arc<dyn ProgressSurface>, config: &NavigatorConfig) -> Self {
        Self::new(surface, ProgressBarStyle::from_config(config))
    }

    /// Navigations currently holding the bar open.
    #[must_use]
    pub fn active(&self) -> usize {
        self.state.active.load(Ordering::SeqCst)
    }

    /// The bar's style.
    #[must_use]
    pub fn style(&self) -> &ProgressBarStyle {
        &self.state.style
    }
}

impl ProgressIndicator for ProgressBar {
    fn show(&self) {
        let state = &self.state;
        state.active.fetch_add(1, Ordering::SeqCst);
        state.ensure_injected();
        state.generation.fetch_add(1, Ordering::SeqCst);
        state.surface.set_opacity(PROGRESS_BAR_ID, 1.0);
        state.surface.set_width(PROGRESS_BAR_ID, 0.0);
        state.after(GROW_DELAY, BarState::grow);
    }

    fn hide(&self) {
        let state = &self.state;
        let previous = state
            .active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(1)))
            .unwrap_or_default();
        if previous > 1 {
            // Another navigation still owns the bar.
            return;
        }
        if !state.surface.exists(PROGRESS_BAR_ID) {
            return;
        }
        state.generation.fetch_add(1, Ordering::SeqCst);
        state.surface.set_width(PROGRESS_BAR_ID, 100.0);
        state.after(FADE_DELAY, BarState::fade);
    }
}

impl std::fmt::Debug for ProgressBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressBar")
            .field("style", &self.state.style)
            .field("active", &self.active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSurface, SurfaceOp};

    fn bar() -> (ProgressBar, Arc<RecordingSurface>) {
        let surface = Arc::new(RecordingSurface::new());
        let config = NavigatorConfig::default().with_progress_bar_style("#f00", "4px");
        (ProgressBar::from_config(surface.clone(), &config), surface)
    }

    #[test]
    fn test_css_uses_style() {
        let style = ProgressBarStyle {
            color: "#f00".into(),
            height: "4px".into(),
        };
        let css = style.css();
        assert!(css.contains("height:4px"));
        assert!(css.contains("background:#f00"));
        assert!(css.starts_with("position:fixed"));
    }

    #[test]
    fn test_empty_style_falls_back() {
        let config = NavigatorConfig::default().with_progress_bar_style("", " ");
        let style = ProgressBarStyle::from_config(&config);
        assert_eq!(style.color, "#29d");
        assert_eq!(style.height, "3px");
    }

    #[tokio::test]
    async fn test_show_then_hide_animates() {
        let (bar, surface) = bar();

        bar.show();
        assert_eq!(surface.injected_count(), 1);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(surface.width(), Some(80.0));
        assert_eq!(surface.opacity(), Some(1.0));

        bar.hide();
        assert_eq!(surface.width(), Some(100.0));
        tokio::time::sleep(Duration::from_millis(450)).await;
        assert_eq!(surface.width(), Some(0.0));
        assert_eq!(surface.opacity(), Some(0.0));
    }

    #[tokio::test]
    async fn test_injects_once() {
        let (bar, surface) = bar();
        bar.show();
        bar.hide();
        bar.show();
        bar.hide();
        assert_eq!(surface.injected_count(), 1);
    }

    #[tokio::test]
    async fn test_reinjects_after_body_replacement() {
        let (bar, surface) = bar();
        bar.show();
        bar.hide();
        surface.remove();
        bar.show();
        assert_eq!(surface.injected_count(), 2);
    }

    #[tokio::test]
    async fn test_overlapping_navigations_keep_bar_visible() {
        let (bar, surface) = bar();

        bar.show();
        bar.show();
        bar.hide();
        assert_eq!(bar.active(), 1);
        assert!(!surface.ops().contains(&SurfaceOp::Width(100.0)));

        bar.hide();
        assert_eq!(bar.active(), 0);
        assert_eq!(surface.width(), Some(100.0));
    }

    #[test]
    fn test_without_runtime_jumps_to_end_state() {
        let (bar, surface) = bar();
        bar.show();
        assert_eq!(surface.width(), Some(80.0));
        bar.hide();
        assert_eq!(surface.width(), Some(0.0));
        assert_eq!(surface.opacity(), Some(0.0));
    }

    #[test]
    fn test_extra_hide_is_harmless() {
        let (bar, _surface) = bar();
        bar.hide();
        assert_eq!(bar.active(), 0);
    }
}
