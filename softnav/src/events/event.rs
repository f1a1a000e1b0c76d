//! Navigation event type for lifecycle signals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::dom::DocumentSnapshot;
use crate::errors::NavigationError;
use crate::navigation::{NavigateOptions, NavigationRequest};

/// The lifecycle signals, in the order a successful navigation raises them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavigationEventKind {
    /// Cancelable; a listener may veto the navigation.
    #[serde(rename = "navigate-before")]
    Before,
    /// The navigation passed the before-hook and is now active.
    #[serde(rename = "navigate-start")]
    Start,
    /// The incoming document is parsed; carries the snapshot.
    #[serde(rename = "navigate-before-dom-update")]
    BeforeDomUpdate,
    /// The live document has been updated.
    #[serde(rename = "navigate-after-dom-update")]
    AfterDomUpdate,
    /// The navigation applied; carries the prefetched flag.
    #[serde(rename = "navigate-success")]
    Success,
    /// The navigation failed; carries the error.
    #[serde(rename = "navigate-error")]
    Error,
    /// Always raised once for every navigation that was not vetoed.
    #[serde(rename = "navigate-complete")]
    Complete,
}

impl NavigationEventKind {
    /// Returns the signal name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "navigate-before",
            Self::Start => "navigate-start",
            Self::BeforeDomUpdate => "navigate-before-dom-update",
            Self::AfterDomUpdate => "navigate-after-dom-update",
            Self::Success => "navigate-success",
            Self::Error => "navigate-error",
            Self::Complete => "navigate-complete",
        }
    }

    /// Whether listeners may veto this signal.
    #[must_use]
    pub fn is_cancelable(&self) -> bool {
        matches!(self, Self::Before)
    }
}

impl std::fmt::Display for NavigationEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signal raised to external listeners.
///
/// Every event carries the request's URL and options; some kinds carry an
/// extra (snapshot, prefetched flag, or error).
#[derive(Debug)]
pub struct NavigationEvent {
    /// Which signal this is.
    pub kind: NavigationEventKind,
    /// Id of the navigation request.
    pub request_id: Uuid,
    /// Target URL.
    pub url: String,
    /// Options the navigation was requested with.
    pub options: NavigateOptions,
    /// When the event was raised.
    pub timestamp: DateTime<Utc>,
    /// Parsed incoming document (`navigate-before-dom-update`).
    pub snapshot: Option<Arc<DocumentSnapshot>>,
    /// Whether the content came from the prefetch cache (`navigate-success`).
    pub prefetched: Option<bool>,
    /// The failure (`navigate-error`).
    pub error: Option<NavigationError>,
    default_prevented: AtomicBool,
}

impl NavigationEvent {
    /// Creates a new event for a request.
    #[must_use]
    pub fn new(kind: NavigationEventKind, request: &NavigationRequest) -> Self {
        Self {
            kind,
            request_id: request.id(),
            url: request.url().to_string(),
            options: request.options(),
            timestamp: Utc::now(),
            snapshot: None,
            prefetched: None,
            error: None,
            default_prevented: AtomicBool::new(false),
        }
    }

    /// Attaches the parsed document.
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: Arc<DocumentSnapshot>) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Attaches the prefetched flag.
    #[must_use]
    pub fn with_prefetched(mut self, prefetched: bool) -> Self {
        self.prefetched = Some(prefetched);
        self
    }

    /// Attaches the error.
    #[must_use]
    pub fn with_error(mut self, error: NavigationError) -> Self {
        self.error = Some(error);
        self
    }

    /// Whether listeners may veto this event.
    #[must_use]
    pub fn is_cancelable(&self) -> bool {
        self.kind.is_cancelable()
    }

    /// Vetoes the navigation. Ignored for non-cancelable events.
    pub fn prevent_default(&self) {
        if self.is_cancelable() {
            self.default_prevented.store(true, Ordering::SeqCst);
        }
    }

    /// Whether a listener vetoed this event.
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.load(Ordering::SeqCst)
    }

    /// Converts the event to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!(self.kind.as_str()));
        map.insert("request_id".to_string(), serde_json::json!(self.request_id.to_string()));
        map.insert("url".to_string(), serde_json::json!(self.url));
        map.insert(
            "options".to_string(),
            serde_json::json!({ "pushState": self.options.push_state }),
        );
        map.insert("timestamp".to_string(), serde_json::json!(self.timestamp.to_rfc3339()));

        if let Some(ref snapshot) = self.snapshot {
            map.insert("new_document".to_string(), snapshot.to_value());
        }
        if let Some(prefetched) = self.prefetched {
            map.insert("prefetched".to_string(), serde_json::json!(prefetched));
        }
        if let Some(ref error) = self.error {
            let error_map: serde_json::Map<String, serde_json::Value> =
                error.to_dict().into_iter().collect();
            map.insert("error".to_string(), serde_json::Value::Object(error_map));
        }

        map
    }
}

impl Clone for NavigationEvent {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            request_id: self.request_id,
            url: self.url.clone(),
            options: self.options,
            timestamp: self.timestamp,
            snapshot: self.snapshot.clone(),
            prefetched: self.prefetched,
            error: self.error.clone(),
            default_prevented: AtomicBool::new(self.default_prevented()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> NavigationRequest {
        NavigationRequest::new("https://example.com/about", NavigateOptions::default())
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(NavigationEventKind::Before.as_str(), "navigate-before");
        assert_eq!(
            NavigationEventKind::BeforeDomUpdate.to_string(),
            "navigate-before-dom-update"
        );
        assert_eq!(
            serde_json::to_value(NavigationEventKind::Complete).unwrap(),
            serde_json::json!("navigate-complete")
        );
    }

    #[test]
    fn test_only_before_is_cancelable() {
        let before = NavigationEvent::new(NavigationEventKind::Before, &request());
        before.prevent_default();
        assert!(before.default_prevented());

        let start = NavigationEvent::new(NavigationEventKind::Start, &request());
        start.prevent_default();
        assert!(!start.default_prevented());
    }

    #[test]
    fn test_to_dict_carries_extras() {
        let event = NavigationEvent::new(NavigationEventKind::Error, &request())
            .with_error(NavigationError::status("https://example.com/about", 404));
        let dict = event.to_dict();

        assert_eq!(dict.get("type"), Some(&serde_json::json!("navigate-error")));
        assert_eq!(dict.get("url"), Some(&serde_json::json!("https://example.com/about")));
        assert_eq!(dict["error"]["status"], serde_json::json!(404));
        assert_eq!(dict["options"]["pushState"], serde_json::json!(true));
    }

    #[test]
    fn test_clone_keeps_prevented_flag() {
        let event = NavigationEvent::new(NavigationEventKind::Before, &request());
        event.prevent_default();
        assert!(event.clone().default_prevented());
    }
}
