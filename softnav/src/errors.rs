//! Error types for soft navigation.
//!
//! Vetoed navigations are not errors; they surface as
//! [`NavigationOutcome::Vetoed`](crate::navigation::NavigationOutcome::Vetoed).
//! Everything that can go wrong between the before-hook and settlement is a
//! [`NavigationError`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The main error type for navigation operations.
///
/// Errors are `Clone` so a single shared in-flight fetch can hand the same
/// failure to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// The request never produced a response.
    #[error("Network error fetching {url}: {message}")]
    Network {
        /// The requested URL.
        url: String,
        /// Transport-level description.
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("Navigation failed: {status} for {url}")]
    Status {
        /// The requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The navigation was superseded by a newer one.
    #[error("Navigation aborted: {0}")]
    Aborted(String),

    /// The fetched document could not be interpreted.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Writing the new content into the live document failed.
    #[error("Apply error: {0}")]
    Apply(String),

    /// The browsing context refused a history update.
    #[error("History error: {0}")]
    History(String),

    /// A URL could not be resolved against the document.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration was rejected.
    #[error("{0}")]
    Config(#[from] ConfigError),
}

impl NavigationError {
    /// Creates a network error.
    #[must_use]
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a status error.
    #[must_use]
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }

    /// Whether this error is the expected result of supersession.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }

    /// Short machine-readable error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Status { .. } => "status",
            Self::Aborted(_) => "aborted",
            Self::Parse(_) => "parse",
            Self::Apply(_) => "apply",
            Self::History(_) => "history",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Config(_) => "config",
        }
    }

    /// Converts to a dictionary representation for event payloads.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("kind".to_string(), serde_json::json!(self.kind()));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        if let Self::Status { status, .. } = self {
            map.insert("status".to_string(), serde_json::json!(status));
        }
        map
    }
}

/// Error raised when configuration fails to load or validate.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Configuration error in '{field}': {message}")]
pub struct ConfigError {
    /// The offending option.
    pub field: String,
    /// What was wrong with it.
    pub message: String,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, NavigationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = NavigationError::status("/missing", 404);
        assert_eq!(err.to_string(), "Navigation failed: 404 for /missing");
        assert_eq!(err.kind(), "status");
    }

    #[test]
    fn test_aborted_is_aborted() {
        assert!(NavigationError::Aborted("superseded".into()).is_aborted());
        assert!(!NavigationError::network("/a", "refused").is_aborted());
    }

    #[test]
    fn test_to_dict_includes_status() {
        let dict = NavigationError::status("/x", 500).to_dict();
        assert_eq!(dict.get("status"), Some(&serde_json::json!(500)));
        assert_eq!(dict.get("kind"), Some(&serde_json::json!("status")));
    }

    #[test]
    fn test_config_error_converts() {
        let err: NavigationError = ConfigError::new("prefetchDelay", "too large").into();
        assert_eq!(
            err.to_string(),
            "Configuration error in 'prefetchDelay': too large"
        );
    }
}
