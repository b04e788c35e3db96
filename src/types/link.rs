//! A single hypermedia link.
//!
//! A [`Link`] is an immutable value object: one link-relation entry of a HAL
//! document's `_links` object, carrying the HAL link attributes from the
//! [HAL draft].
//!
//! # Wire Format
//!
//! | Field | Type | Serialized |
//! |-------|------|------------|
//! | `href` | string | always |
//! | `templated` | bool | only when `true` |
//! | `type`, `name`, `title`, `hreflang`, `profile` | string | only when present |
//! | `deprecation` | bool | only when present |
//!
//! The `rel` is the key the link is stored under in its owning collection;
//! it is never serialized as a field of the link object itself.
//!
//! # Examples
//!
//! ```
//! use hal_rs::Link;
//!
//! let link = Link::new("search", "/search{?q}")
//!     .with_title("Full-text search");
//! assert!(link.templated);
//!
//! let self_link = Link::self_link("http://example.com/orders/42");
//! assert_eq!(self_link.rel, "self");
//! ```
//!
//! [HAL draft]: https://datatracker.ietf.org/doc/html/draft-kelly-json-hal

use serde::{Deserialize, Serialize};

/// The reserved rel under which curie links are registered.
pub const CURIES_REL: &str = "curies";

/// One hypermedia link with its relation name and HAL attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// The link-relation that owns this link. Map key on the wire, never a
    /// field of the link object.
    #[serde(skip)]
    pub rel: String,

    /// URI or URI-Template of the target resource.
    pub href: String,

    /// True iff `href` contains URI-Template expressions.
    #[serde(default, skip_serializing_if = "is_false")]
    pub templated: bool,

    /// Media type hint for the target resource.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    /// Language of the target resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hreflang: Option<String>,

    /// Human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Secondary key distinguishing links sharing a rel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Profile URI of the target resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Signals that the link is deprecated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<bool>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Link {
    /// Creates a link for `rel` pointing at `href`.
    ///
    /// The `templated` flag is derived: it is set iff `href` contains a
    /// URI-Template expression.
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        let href = href.into();
        Link {
            rel: rel.into(),
            templated: href.contains('{'),
            href,
            media_type: None,
            hreflang: None,
            title: None,
            name: None,
            profile: None,
            deprecation: None,
        }
    }

    /// Creates a `self` link.
    pub fn self_link(href: impl Into<String>) -> Self {
        Link::new("self", href)
    }

    /// Creates an `item` link.
    pub fn item(href: impl Into<String>) -> Self {
        Link::new("item", href)
    }

    /// Creates a curie link: rel `curies`, the given name, and a templated
    /// href that must contain the `{rel}` placeholder.
    ///
    /// The placeholder invariant is validated when the link is registered
    /// with a [`Curies`](crate::Curies) registry, not here.
    pub fn curie(name: impl Into<String>, href_template: impl Into<String>) -> Self {
        Link::new(CURIES_REL, href_template).with_name(name)
    }

    /// Sets the media type hint.
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Sets the language of the target resource.
    pub fn with_hreflang(mut self, hreflang: impl Into<String>) -> Self {
        self.hreflang = Some(hreflang.into());
        self
    }

    /// Sets the human-readable title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the secondary `name` key.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the profile URI.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Marks the link as deprecated.
    pub fn with_deprecation(mut self, deprecated: bool) -> Self {
        self.deprecation = Some(deprecated);
        self
    }

    /// Returns a copy of this link with a different href.
    ///
    /// The `templated` flag is re-derived from the new href. Used when a
    /// templated or relative href has been expanded/resolved to its final
    /// form.
    pub fn with_href(&self, href: impl Into<String>) -> Self {
        let href = href.into();
        Link {
            templated: href.contains('{'),
            href,
            ..self.clone()
        }
    }

    /// Returns true iff this link carries the reserved `curies` rel.
    pub fn is_curie(&self) -> bool {
        self.rel == CURIES_REL
    }

    /// Equivalence comparison: all fields equal except the derived
    /// `templated` flag.
    ///
    /// Collections use this to avoid storing duplicates.
    pub fn is_equivalent_to(&self, other: &Link) -> bool {
        self.rel == other.rel
            && self.href == other.href
            && self.media_type == other.media_type
            && self.hreflang == other.hreflang
            && self.title == other.title
            && self.name == other.name
            && self.profile == other.profile
            && self.deprecation == other.deprecation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templated_flag_is_derived() {
        assert!(Link::new("search", "/search{?q}").templated);
        assert!(!Link::new("self", "/orders/1").templated);
    }

    #[test]
    fn test_with_href_rederives_templated() {
        let link = Link::new("search", "/search{?q}");
        let expanded = link.with_href("/search?q=hal");
        assert!(!expanded.templated);
        assert_eq!(expanded.rel, "search");
    }

    #[test]
    fn test_equivalence_ignores_templated() {
        let a = Link::new("next", "/page/2");
        let mut b = a.clone();
        b.templated = true;
        assert!(a.is_equivalent_to(&b));

        let c = a.clone().with_title("page two");
        assert!(!a.is_equivalent_to(&c));
    }

    #[test]
    fn test_curie_constructor() {
        let curie = Link::curie("ex", "http://example.com/rels/{rel}");
        assert!(curie.is_curie());
        assert_eq!(curie.name.as_deref(), Some("ex"));
        assert!(curie.templated);
    }

    #[test]
    fn test_serialization_omits_absent_fields() {
        let link = Link::new("self", "/orders/1");
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json, serde_json::json!({"href": "/orders/1"}));
    }

    #[test]
    fn test_serialization_renames_media_type() {
        let link = Link::new("self", "/a").with_media_type("application/hal+json");
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["type"], "application/hal+json");
    }
}
