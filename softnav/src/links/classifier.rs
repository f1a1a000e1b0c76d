//! Decides whether an anchor is eligible for intercepted navigation.
//!
//! The predicate depends only on the anchor's attributes and the document
//! origin, so freshly swapped-in content classifies exactly like the
//! initial page without any re-binding.

use regex::Regex;
use std::sync::OnceLock;
use url::{Origin, Url};

use super::element::LinkAttributes;
use crate::config::NavigatorConfig;
use crate::errors::NavigationError;

/// Matches an explicit URI scheme prefix such as `mailto:` or `https:`.
#[allow(clippy::expect_used)]
fn scheme_regex() -> &'static Regex {
    static SCHEME: OnceLock<Regex> = OnceLock::new();
    SCHEME.get_or_init(|| {
        Regex::new(r"^([a-zA-Z][a-zA-Z0-9+.\-]*):").expect("scheme pattern is valid")
    })
}

fn join(base: &Url, href: &str) -> Result<Url, NavigationError> {
    base.join(href.trim())
        .map_err(|e| NavigationError::InvalidUrl(format!("{href}: {e}")))
}

/// Resolves `href` against `base`, keeping any fragment.
///
/// This is the URL a navigation is made to: what history records and what
/// events report.
pub fn absolute_url(base: &Url, href: &str) -> Result<String, NavigationError> {
    join(base, href).map(String::from)
}

/// Resolves `href` against `base` and strips the fragment.
///
/// The result is the key used for the prefetch cache and the request.
pub fn canonical_url(base: &Url, href: &str) -> Result<String, NavigationError> {
    let mut resolved = join(base, href)?;
    resolved.set_fragment(None);
    Ok(resolved.into())
}

/// Drops the fragment from an already absolute URL.
pub(crate) fn strip_fragment(url: &str) -> &str {
    url.split_once('#').map_or(url, |(rest, _)| rest)
}

/// Pure navigability predicate bound to a document origin.
#[derive(Debug, Clone)]
pub struct LinkClassifier {
    base: Url,
    origin: Origin,
    marker_attributes: Vec<String>,
    require_opt_in: bool,
}

impl LinkClassifier {
    /// Creates a classifier for documents served from `document_url`'s origin.
    #[must_use]
    pub fn new(document_url: &Url) -> Self {
        let defaults = NavigatorConfig::default();
        Self {
            base: document_url.clone(),
            origin: document_url.origin(),
            marker_attributes: defaults.marker_attributes,
            require_opt_in: defaults.require_opt_in,
        }
    }

    /// Creates a classifier using the marker settings from `config`.
    #[must_use]
    pub fn from_config(document_url: &Url, config: &NavigatorConfig) -> Self {
        Self {
            base: document_url.clone(),
            origin: document_url.origin(),
            marker_attributes: config.marker_attributes.clone(),
            require_opt_in: config.require_opt_in,
        }
    }

    /// Sets whether a marker attribute is required.
    #[must_use]
    pub fn with_require_opt_in(mut self, required: bool) -> Self {
        self.require_opt_in = required;
        self
    }

    /// The origin links must match.
    #[must_use]
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Whether an anchor with this `href` and these attributes should be
    /// handled by soft navigation.
    #[must_use]
    pub fn is_navigable(&self, href: &str, attributes: &LinkAttributes) -> bool {
        if self.require_opt_in
            && !self
                .marker_attributes
                .iter()
                .any(|marker| attributes.has(marker))
        {
            return false;
        }

        let href = href.trim();
        if href.is_empty() || href == "#" {
            return false;
        }

        if attributes
            .target()
            .is_some_and(|target| target.eq_ignore_ascii_case("_blank"))
        {
            return false;
        }

        if attributes.has("download") {
            return false;
        }

        if let Some(captures) = scheme_regex().captures(href) {
            let scheme = captures[1].to_ascii_lowercase();
            if scheme != "http" && scheme != "https" {
                return false;
            }
        }

        if self.is_absolute_or_protocol_relative(href) {
            return self.same_origin(href);
        }

        true
    }

    /// The canonical URL for `href` relative to the document this classifier
    /// was built for, or `None` if it does not resolve.
    #[must_use]
    pub fn resolve(&self, href: &str) -> Option<String> {
        canonical_url(&self.base, href).ok()
    }

    /// Classifies a link from its attributes alone.
    #[must_use]
    pub fn classify(&self, attributes: &LinkAttributes) -> bool {
        self.is_navigable(attributes.href().unwrap_or_default(), attributes)
    }

    fn is_absolute_or_protocol_relative(&self, href: &str) -> bool {
        href.starts_with("//") || scheme_regex().is_match(href)
    }

    fn same_origin(&self, href: &str) -> bool {
        // Protocol-relative hrefs inherit the document scheme.
        let absolute = if href.starts_with("//") {
            match &self.origin {
                Origin::Tuple(scheme, _, _) => format!("{scheme}:{href}"),
                Origin::Opaque(_) => return false,
            }
        } else {
            href.to_string()
        };

        Url::parse(&absolute)
            .map(|url| url.origin() == self.origin)
            .unwrap_or(false)
    }
}
