//! Anchor snapshots as seen by the trigger binder.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stable identity of a rendered element, assigned by the host.
///
/// Replaced content always gets fresh ids, which is what makes viewport
/// observation one-shot per element rather than per URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

/// The attributes of an anchor element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAttributes {
    attributes: HashMap<String, String>,
}

impl LinkAttributes {
    /// Creates an empty attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an attribute set with an `href`.
    #[must_use]
    pub fn with_href(href: impl Into<String>) -> Self {
        Self::new().with("href", href)
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Adds a valueless attribute such as an opt-in marker.
    #[must_use]
    pub fn with_flag(self, name: impl Into<String>) -> Self {
        self.with(name, "")
    }

    /// Gets an attribute value. Names are case-insensitive.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Whether the attribute is present at all.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.attributes.contains_key(&name.to_ascii_lowercase())
    }

    /// The raw `href`, if any.
    #[must_use]
    pub fn href(&self) -> Option<&str> {
        self.get("href")
    }

    /// The `target` browsing context, if any.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.get("target")
    }
}

/// An anchor in the live document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkElement {
    /// Host-assigned identity.
    pub id: ElementId,
    /// The anchor's attributes.
    pub attributes: LinkAttributes,
}

impl LinkElement {
    /// Creates a new link element.
    #[must_use]
    pub fn new(id: u64, attributes: LinkAttributes) -> Self {
        Self {
            id: ElementId(id),
            attributes,
        }
    }

    /// The raw `href`, or the empty string.
    #[must_use]
    pub fn href(&self) -> &str {
        self.attributes.href().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_names_case_insensitive() {
        let attrs = LinkAttributes::with_href("/a").with("TARGET", "_self");
        assert_eq!(attrs.target(), Some("_self"));
        assert!(attrs.has("Href"));
    }

    #[test]
    fn test_flag_attribute_present_with_empty_value() {
        let attrs = LinkAttributes::new().with_flag("wisp-navigate");
        assert!(attrs.has("wisp-navigate"));
        assert_eq!(attrs.get("wisp-navigate"), Some(""));
    }

    #[test]
    fn test_link_without_href() {
        let link = LinkElement::new(1, LinkAttributes::new());
        assert_eq!(link.href(), "");
    }
}
