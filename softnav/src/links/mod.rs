//! Link attributes and the navigability predicate.

mod classifier;
mod element;

pub(crate) use classifier::strip_fragment;
pub use classifier::{absolute_url, canonical_url, LinkClassifier};
pub use element::{ElementId, LinkAttributes, LinkElement};
