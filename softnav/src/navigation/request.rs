//! Navigation request, phase and outcome types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dom::SwapTarget;
use crate::errors::NavigationError;
use crate::links::strip_fragment;

/// Options a navigation is requested with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateOptions {
    /// Whether to push a history entry. Back/forward replays use `false`.
    #[serde(default = "default_push_state")]
    pub push_state: bool,
}

fn default_push_state() -> bool {
    true
}

impl Default for NavigateOptions {
    fn default() -> Self {
        Self { push_state: true }
    }
}

impl NavigateOptions {
    /// Options for a history replay: no new entry.
    #[must_use]
    pub fn replay() -> Self {
        Self { push_state: false }
    }
}

/// One navigation attempt. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationRequest {
    id: Uuid,
    url: String,
    options: NavigateOptions,
}

impl NavigationRequest {
    /// Creates a new request with a fresh id.
    #[must_use]
    pub fn new(url: impl Into<String>, options: NavigateOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            options,
        }
    }

    /// The request id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The target URL as navigated to, fragment included.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The URL fetched and cached for this request: [`Self::url`] without
    /// its fragment.
    #[must_use]
    pub fn fetch_url(&self) -> &str {
        strip_fragment(&self.url)
    }

    /// The requested options.
    #[must_use]
    pub fn options(&self) -> NavigateOptions {
        self.options
    }
}

/// Where a navigation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationPhase {
    /// Created, before-hook not yet raised.
    Requested,
    /// Passed the before-hook; previous navigation cancelled.
    BeforeHook,
    /// Waiting on the network (or a joined prefetch).
    Fetching,
    /// Writing into the live document.
    Applying,
    /// Finished.
    Settled,
}

impl NavigationPhase {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::BeforeHook => "before_hook",
            Self::Fetching => "fetching",
            Self::Applying => "applying",
            Self::Settled => "settled",
        }
    }
}

/// How a navigation settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// A before-hook listener vetoed it; nothing happened.
    Vetoed,
    /// The new content is in place.
    Succeeded {
        /// Whether the HTML came from the prefetch cache.
        prefetched: bool,
        /// Which region was replaced.
        target: SwapTarget,
    },
    /// Soft navigation failed; a full load of the URL was requested.
    Failed(NavigationError),
    /// Superseded by a newer navigation.
    Aborted,
}

impl NavigationOutcome {
    /// Returns true for [`NavigationOutcome::Succeeded`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Returns true for [`NavigationOutcome::Aborted`].
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Returns true for [`NavigationOutcome::Vetoed`].
    #[must_use]
    pub fn is_vetoed(&self) -> bool {
        matches!(self, Self::Vetoed)
    }

    /// Returns the error for a failed navigation.
    #[must_use]
    pub fn error(&self) -> Option<&NavigationError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vetoed => "vetoed",
            Self::Succeeded { .. } => "success",
            Self::Failed(_) => "error",
            Self::Aborted => "aborted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_push() {
        assert!(NavigateOptions::default().push_state);
        assert!(!NavigateOptions::replay().push_state);
    }

    #[test]
    fn test_options_deserialize_missing_push_state() {
        let options: NavigateOptions = serde_json::from_str("{}").unwrap();
        assert!(options.push_state);
        let options: NavigateOptions = serde_json::from_str(r#"{"pushState": false}"#).unwrap();
        assert!(!options.push_state);
    }

    #[test]
    fn test_requests_get_unique_ids() {
        let a = NavigationRequest::new("/a", NavigateOptions::default());
        let b = NavigationRequest::new("/a", NavigateOptions::default());
        assert_ne!(a.id(), b.id());
        assert_eq!(a.url(), "/a");
    }

    #[test]
    fn test_fetch_url_drops_fragment() {
        let request = NavigationRequest::new(
            "https://example.com/docs#install",
            NavigateOptions::default(),
        );
        assert_eq!(request.url(), "https://example.com/docs#install");
        assert_eq!(request.fetch_url(), "https://example.com/docs");
    }

    #[test]
    fn test_outcome_helpers() {
        let ok = NavigationOutcome::Succeeded {
            prefetched: true,
            target: SwapTarget::Container,
        };
        assert!(ok.is_success());
        assert_eq!(ok.as_str(), "success");

        let failed = NavigationOutcome::Failed(NavigationError::status("/x", 404));
        assert_eq!(failed.error().map(NavigationError::kind), Some("status"));
        assert!(NavigationOutcome::Aborted.is_aborted());
        assert!(NavigationOutcome::Vetoed.is_vetoed());
    }
}
