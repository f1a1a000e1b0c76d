//! Parsed representation of a fetched page.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use super::host::Document;
use crate::errors::NavigationError;

/// The parts of a fetched page that a navigation applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    /// The page title, whitespace-collapsed.
    pub title: String,
    /// Id of the container that was looked up.
    pub container_id: String,
    /// Inner HTML of the container, when the page has one.
    pub container_html: Option<String>,
    /// Inner HTML of the body.
    pub body_html: String,
}

/// Which region of the live document a snapshot replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapTarget {
    /// Only the matching container.
    Container,
    /// The whole body (container missing on either side).
    Body,
}

impl SwapTarget {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Body => "body",
        }
    }
}

fn selector(source: &str) -> Result<Selector, NavigationError> {
    Selector::parse(source).map_err(|e| NavigationError::Parse(format!("{source}: {e:?}")))
}

impl DocumentSnapshot {
    /// Parses fetched HTML, extracting the title, the container with
    /// `container_id`, and the body.
    pub fn parse(html: &str, container_id: &str) -> Result<Self, NavigationError> {
        let document = Html::parse_document(html);

        let title = document
            .select(&selector("title")?)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default();

        let container_html = document
            .select(&selector("[id]")?)
            .find(|el| el.value().id() == Some(container_id))
            .map(|el| el.inner_html());

        let body_html = document
            .select(&selector("body")?)
            .next()
            .map(|el| el.inner_html())
            .unwrap_or_default();

        Ok(Self {
            title,
            container_id: container_id.to_string(),
            container_html,
            body_html,
        })
    }

    /// Whether the fetched page has the container.
    #[must_use]
    pub fn has_container(&self) -> bool {
        self.container_html.is_some()
    }

    /// Converts to a JSON value for event payloads.
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "title": self.title,
            "container_id": self.container_id,
            "has_container": self.has_container(),
        })
    }
}

/// Writes `snapshot` into `document`: the container when both sides have
/// it, otherwise the whole body. The title is always replaced.
pub fn apply_snapshot(
    document: &dyn Document,
    snapshot: &DocumentSnapshot,
) -> Result<SwapTarget, NavigationError> {
    let target = match &snapshot.container_html {
        Some(html) if document.has_element(&snapshot.container_id) => {
            document.set_inner_html(&snapshot.container_id, html)?;
            SwapTarget::Container
        }
        _ => {
            document.set_body_html(&snapshot.body_html)?;
            SwapTarget::Body
        }
    };
    document.set_title(&snapshot.title);
    Ok(target)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
