//! Configuration for the navigator and its HTTP fetcher.
//!
//! Option names follow the host-facing camelCase keys, so a configuration
//! object written for the page script deserializes unchanged. Missing keys
//! fall back to their defaults, which is how user overrides are merged.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::errors::ConfigError;

/// Header sent with every soft-navigation request.
pub const SOFT_NAV_HEADER: &str = "X-Requested-With";

/// Value of [`SOFT_NAV_HEADER`].
pub const SOFT_NAV_HEADER_VALUE: &str = "X-Wisp-Navigate";

/// Upper bound for the hover debounce.
const MAX_PREFETCH_DELAY_MS: u64 = 10_000;

/// Top-level navigator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigatorConfig {
    /// Whether to drive the visual progress bar.
    #[serde(default = "default_true")]
    pub navigation_progress_bar: bool,
    /// CSS color of the progress bar.
    #[serde(default = "default_bar_color")]
    pub navigation_progress_bar_color: String,
    /// CSS height of the progress bar.
    #[serde(default = "default_bar_height")]
    pub navigation_progress_bar_height: String,
    /// Emit per-navigation timing diagnostics.
    #[serde(default)]
    pub enable_performance_logging: bool,
    /// Prefetch link targets after a short hover.
    #[serde(default = "default_true")]
    pub enable_prefetch_on_hover: bool,
    /// Prefetch link targets when they scroll into view.
    #[serde(default = "default_true")]
    pub enable_prefetch_on_view: bool,
    /// Hover debounce in milliseconds.
    #[serde(default = "default_prefetch_delay")]
    pub prefetch_delay: u64,
    /// Id of the element whose content is swapped.
    #[serde(default = "default_container_id")]
    pub container_id: String,
    /// Attributes that opt a link into soft navigation.
    #[serde(default = "default_marker_attributes")]
    pub marker_attributes: Vec<String>,
    /// Whether links must carry a marker attribute.
    #[serde(default = "default_true")]
    pub require_opt_in: bool,
    /// Margin around the viewport, in pixels, for visibility prefetch.
    #[serde(default = "default_viewport_margin")]
    pub prefetch_viewport_margin: u32,
    /// HTTP fetcher settings.
    #[serde(default)]
    pub fetch: FetchConfig,
}

fn default_true() -> bool {
    true
}

fn default_bar_color() -> String {
    "#29d".to_string()
}

fn default_bar_height() -> String {
    "3px".to_string()
}

fn default_prefetch_delay() -> u64 {
    65
}

fn default_container_id() -> String {
    "app".to_string()
}

fn default_marker_attributes() -> Vec<String> {
    vec!["wisp:navigate".to_string(), "wisp-navigate".to_string()]
}

fn default_viewport_margin() -> u32 {
    200
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            navigation_progress_bar: true,
            navigation_progress_bar_color: default_bar_color(),
            navigation_progress_bar_height: default_bar_height(),
            enable_performance_logging: false,
            enable_prefetch_on_hover: true,
            enable_prefetch_on_view: true,
            prefetch_delay: default_prefetch_delay(),
            container_id: default_container_id(),
            marker_attributes: default_marker_attributes(),
            require_opt_in: true,
            prefetch_viewport_margin: default_viewport_margin(),
            fetch: FetchConfig::default(),
        }
    }
}

impl NavigatorConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON configuration object.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| ConfigError::new("<json>", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML configuration document.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(input).map_err(|e| ConfigError::new("<toml>", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a `.json` or `.toml` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::new(path.display().to_string(), e.to_string()))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            Some("toml") => Self::from_toml_str(&contents),
            other => Err(ConfigError::new(
                path.display().to_string(),
                format!("unsupported config extension: {other:?}"),
            )),
        }
    }

    /// Checks option values for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.container_id.trim().is_empty() || self.container_id.contains(char::is_whitespace)
        {
            return Err(ConfigError::new(
                "containerId",
                "must be a non-empty id without whitespace",
            ));
        }
        if self.prefetch_delay > MAX_PREFETCH_DELAY_MS {
            return Err(ConfigError::new(
                "prefetchDelay",
                format!("must be at most {MAX_PREFETCH_DELAY_MS}ms"),
            ));
        }
        if self.require_opt_in && self.marker_attributes.is_empty() {
            return Err(ConfigError::new(
                "markerAttributes",
                "at least one marker is required when requireOptIn is set",
            ));
        }
        if self.navigation_progress_bar {
            if self.navigation_progress_bar_color.trim().is_empty() {
                return Err(ConfigError::new("navigationProgressBarColor", "must not be empty"));
            }
            if self.navigation_progress_bar_height.trim().is_empty() {
                return Err(ConfigError::new("navigationProgressBarHeight", "must not be empty"));
            }
        }
        if let Some(timeout) = self.fetch.timeout_seconds {
            if !timeout.is_finite() || timeout <= 0.0 {
                return Err(ConfigError::new("fetch.timeoutSeconds", "must be positive"));
            }
        }
        Ok(())
    }

    /// Hover debounce as a `Duration`.
    #[must_use]
    pub fn prefetch_delay(&self) -> Duration {
        Duration::from_millis(self.prefetch_delay)
    }

    /// Enables or disables the progress bar.
    #[must_use]
    pub fn with_progress_bar(mut self, enabled: bool) -> Self {
        self.navigation_progress_bar = enabled;
        self
    }

    /// Sets the progress bar styling.
    #[must_use]
    pub fn with_progress_bar_style(
        mut self,
        color: impl Into<String>,
        height: impl Into<String>,
    ) -> Self {
        self.navigation_progress_bar_color = color.into();
        self.navigation_progress_bar_height = height.into();
        self
    }

    /// Enables timing diagnostics.
    #[must_use]
    pub fn with_performance_logging(mut self, enabled: bool) -> Self {
        self.enable_performance_logging = enabled;
        self
    }

    /// Toggles hover prefetching.
    #[must_use]
    pub fn with_prefetch_on_hover(mut self, enabled: bool) -> Self {
        self.enable_prefetch_on_hover = enabled;
        self
    }

    /// Toggles viewport prefetching.
    #[must_use]
    pub fn with_prefetch_on_view(mut self, enabled: bool) -> Self {
        self.enable_prefetch_on_view = enabled;
        self
    }

    /// Sets the hover debounce.
    #[must_use]
    pub fn with_prefetch_delay(mut self, delay: Duration) -> Self {
        self.prefetch_delay = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the swapped container id.
    #[must_use]
    pub fn with_container_id(mut self, id: impl Into<String>) -> Self {
        self.container_id = id.into();
        self
    }

    /// Sets whether links need an opt-in marker.
    #[must_use]
    pub fn with_require_opt_in(mut self, required: bool) -> Self {
        self.require_opt_in = required;
        self
    }
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchConfig {
    /// Request timeout in seconds. `None` leaves timeouts to the network stack.
    #[serde(default)]
    pub timeout_seconds: Option<f64>,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Additional headers to include.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_user_agent() -> String {
    concat!("softnav/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: None,
            user_agent: default_user_agent(),
            headers: HashMap::new(),
        }
    }
}

impl FetchConfig {
    /// Creates a new fetch configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Gets timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs_f64)
    }

    /// Headers for a soft-navigation request, extras first so the protocol
    /// headers always win.
    #[must_use]
    pub fn request_headers(&self) -> HashMap<String, String> {
        let mut headers = self.headers.clone();
        headers.insert(SOFT_NAV_HEADER.to_string(), SOFT_NAV_HEADER_VALUE.to_string());
        headers.insert("Accept".to_string(), "text/html".to_string());
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = NavigatorConfig::default();
        assert!(config.navigation_progress_bar);
        assert_eq!(config.navigation_progress_bar_color, "#29d");
        assert_eq!(config.navigation_progress_bar_height, "3px");
        assert!(!config.enable_performance_logging);
        assert_eq!(config.container_id, "app");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_overrides_merge_with_defaults() {
        let config = NavigatorConfig::from_json_str(
            r##"{"navigationProgressBarColor": "#f00", "prefetchDelay": 150, "enablePerformanceLogging": true}"##,
        )
        .unwrap();

        assert_eq!(config.navigation_progress_bar_color, "#f00");
        assert_eq!(config.prefetch_delay(), Duration::from_millis(150));
        assert!(config.enable_performance_logging);
        assert_eq!(config.navigation_progress_bar_height, "3px");
        assert!(config.enable_prefetch_on_hover);
    }

    #[test]
    fn test_toml_config() {
        let config = NavigatorConfig::from_toml_str(
            r#"
            containerId = "main"
            enablePrefetchOnView = false

            [fetch]
            timeoutSeconds = 5.0
            "#,
        )
        .unwrap();

        assert_eq!(config.container_id, "main");
        assert!(!config.enable_prefetch_on_view);
        assert_eq!(config.fetch.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"navigationProgressBar": false}}"#).unwrap();

        let config = NavigatorConfig::from_path(file.path()).unwrap();
        assert!(!config.navigation_progress_bar);
    }

    #[test]
    fn test_from_path_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(NavigatorConfig::from_path(file.path()).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = NavigatorConfig::default().with_container_id("has space");
        assert_eq!(config.validate().unwrap_err().field, "containerId");

        let config = NavigatorConfig::default().with_prefetch_delay(Duration::from_secs(60));
        assert_eq!(config.validate().unwrap_err().field, "prefetchDelay");

        let mut config = NavigatorConfig::default();
        config.marker_attributes.clear();
        assert_eq!(config.validate().unwrap_err().field, "markerAttributes");
        assert!(config.with_require_opt_in(false).validate().is_ok());
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = NavigatorConfig::from_json_str("{not json").unwrap_err();
        assert_eq!(err.field, "<json>");
    }

    #[test]
    fn test_request_headers_protocol_wins() {
        let fetch = FetchConfig::new()
            .with_header("Accept", "application/json")
            .with_header("X-Trace", "1");
        let headers = fetch.request_headers();

        assert_eq!(headers.get("Accept").map(String::as_str), Some("text/html"));
        assert_eq!(
            headers.get(SOFT_NAV_HEADER).map(String::as_str),
            Some(SOFT_NAV_HEADER_VALUE)
        );
        assert_eq!(headers.get("X-Trace").map(String::as_str), Some("1"));
    }
}
