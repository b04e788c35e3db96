//! Link-relation compaction via curies.
//!
//! A curie is a templated link registered under the reserved rel `curies`
//! that compresses long link-relation URIs into `name:suffix` shorthand:
//! with curie `{name: "ex", href: "http://example.com/rels/{rel}"}`, the rel
//! `http://example.com/rels/order` and the rel `ex:order` address the same
//! relation.
//!
//! The [`Curies`] registry answers "is rel X curied/expandable, and what is
//! its curied/expanded form?". Everywhere a rel is used as a map key in this
//! crate it first passes through [`Curies::resolve`], so storage, rendering,
//! and lookup stay consistent, and callers may address a relation in either
//! form.

use crate::error::{HalError, Result};
use crate::types::link::{Link, CURIES_REL};

/// The placeholder every curie href must contain exactly once.
const REL_PLACEHOLDER: &str = "{rel}";

/// Matching/rewriting rules derived from a single curie link.
///
/// # Examples
///
/// ```
/// use hal_rs::{CurieTemplate, Link};
///
/// let template = CurieTemplate::from_link(
///     &Link::curie("ex", "http://example.com/rels/{rel}"),
/// ).unwrap();
///
/// assert!(template.matches_expanded("http://example.com/rels/order"));
/// assert!(template.matches_curied("ex:order"));
/// assert_eq!(template.to_curied("http://example.com/rels/order"), "ex:order");
/// assert_eq!(template.to_expanded("ex:order"), "http://example.com/rels/order");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurieTemplate {
    name: String,
    prefix: String,
    suffix: String,
    href: String,
}

impl CurieTemplate {
    /// Derives a template from a curie link.
    ///
    /// Fails with [`HalError::InvalidCurie`] unless the link carries the
    /// `curies` rel, a non-empty name, and an href containing exactly one
    /// `{rel}` placeholder.
    pub fn from_link(link: &Link) -> Result<CurieTemplate> {
        if !link.is_curie() {
            return Err(HalError::InvalidCurie(format!(
                "expected rel '{CURIES_REL}', got '{}'",
                link.rel
            )));
        }
        let name = match link.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                return Err(HalError::InvalidCurie(format!(
                    "curie link '{}' has no name",
                    link.href
                )))
            }
        };
        if link.href.matches(REL_PLACEHOLDER).count() != 1 {
            return Err(HalError::InvalidCurie(format!(
                "curie href '{}' must contain exactly one {REL_PLACEHOLDER} placeholder",
                link.href
            )));
        }
        // Split is safe: the placeholder occurs exactly once.
        let (prefix, suffix) = link
            .href
            .split_once(REL_PLACEHOLDER)
            .map(|(p, s)| (p.to_string(), s.to_string()))
            .unwrap_or_default();
        Ok(CurieTemplate {
            name,
            prefix,
            suffix,
            href: link.href.clone(),
        })
    }

    /// The curie's name, used as the shorthand prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The curie's templated href.
    pub fn href(&self) -> &str {
        &self.href
    }

    /// True iff `rel` matches this template in expanded or curied form.
    pub fn matches(&self, rel: &str) -> bool {
        self.matches_expanded(rel) || self.matches_curied(rel)
    }

    /// True iff `rel` is an expanded rel of this curie: it starts with the
    /// prefix before `{rel}`, ends with the suffix after it, and leaves a
    /// non-empty placeholder in between.
    pub fn matches_expanded(&self, rel: &str) -> bool {
        rel.len() > self.prefix.len() + self.suffix.len()
            && rel.starts_with(&self.prefix)
            && rel.ends_with(&self.suffix)
    }

    /// True iff `rel` is already in this curie's shorthand form.
    pub fn matches_curied(&self, rel: &str) -> bool {
        rel.starts_with(&format!("{}:", self.name))
    }

    /// Extracts the `{rel}` placeholder value from a matching rel (either
    /// form). Returns `rel` unchanged when it does not match.
    pub fn placeholder<'a>(&self, rel: &'a str) -> &'a str {
        if self.matches_curied(rel) {
            &rel[self.name.len() + 1..]
        } else if self.matches_expanded(rel) {
            &rel[self.prefix.len()..rel.len() - self.suffix.len()]
        } else {
            rel
        }
    }

    /// Rewrites a matching rel into `name:placeholder` shorthand.
    pub fn to_curied(&self, rel: &str) -> String {
        format!("{}:{}", self.name, self.placeholder(rel))
    }

    /// Rewrites a matching rel into its expanded URI form.
    pub fn to_expanded(&self, rel: &str) -> String {
        format!("{}{}{}", self.prefix, self.placeholder(rel), self.suffix)
    }
}

/// Ordered registry of curie links.
///
/// Effectively immutable once its owning document tree is built:
/// [`Curies::merge_with`] returns a new registry instead of mutating in
/// place, so a fully-built [`Representation`](crate::Representation) tree is
/// safe to read concurrently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Curies {
    registered: Vec<Link>,
}

impl Curies {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Curies::default()
    }

    /// Creates a registry from the given curie links.
    pub fn from_links<I: IntoIterator<Item = Link>>(links: I) -> Result<Curies> {
        let mut curies = Curies::new();
        for link in links {
            curies.register(link)?;
        }
        Ok(curies)
    }

    /// Registers a curie link.
    ///
    /// Fails with [`HalError::InvalidCurie`] if the link violates the curie
    /// invariants. Re-registering an href that is already present replaces
    /// the previously registered curie carrying the same name; registering a
    /// new href under an existing name inserts a second entry.
    pub fn register(&mut self, curie: Link) -> Result<()> {
        let template = CurieTemplate::from_link(&curie)?;
        if self.registered.iter().any(|c| c.href == curie.href) {
            self.registered
                .retain(|c| c.name.as_deref() != Some(template.name()));
        }
        self.registered.push(curie);
        Ok(())
    }

    /// The registered curie links, in registration order.
    pub fn links(&self) -> &[Link] {
        &self.registered
    }

    /// True iff no curie is registered.
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Rewrites `rel` into curied form.
    ///
    /// Scans registered curies front-to-back and returns the first matching
    /// template's shorthand; rels matching no curie come back unchanged.
    /// This is the function applied everywhere a rel is used as a map key.
    pub fn resolve(&self, rel: &str) -> String {
        self.templates()
            .find(|t| t.matches(rel))
            .map(|t| t.to_curied(rel))
            .unwrap_or_else(|| rel.to_string())
    }

    /// Rewrites `rel` into expanded form.
    ///
    /// A rel of shape `name:suffix` whose name is registered expands through
    /// that curie; anything else comes back unchanged.
    pub fn expand(&self, rel: &str) -> String {
        let Some((name, _)) = rel.split_once(':') else {
            return rel.to_string();
        };
        self.templates()
            .find(|t| t.name() == name)
            .map(|t| t.to_expanded(rel))
            .unwrap_or_else(|| rel.to_string())
    }

    /// Returns the union of two registries as a new value.
    ///
    /// Entries of `other` are registered after those of `self`, so `other`
    /// overrides on href collisions (same rule as [`Curies::register`]).
    /// Invalid links cannot occur here: both inputs only hold links that
    /// already passed registration.
    pub fn merge_with(&self, other: &Curies) -> Curies {
        let mut merged = self.clone();
        for link in &other.registered {
            // Links in a registry are valid by construction.
            let _ = merged.register(link.clone());
        }
        merged
    }

    fn templates(&self) -> impl Iterator<Item = CurieTemplate> + '_ {
        // from_link cannot fail for registered links.
        self.registered
            .iter()
            .filter_map(|link| CurieTemplate::from_link(link).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ex_curie() -> Link {
        Link::curie("ex", "http://example.com/rels/{rel}")
    }

    #[test]
    fn test_register_rejects_non_curie_rel() {
        let mut curies = Curies::new();
        let err = curies.register(Link::new("self", "/a")).unwrap_err();
        assert!(matches!(err, HalError::InvalidCurie(_)));
    }

    #[test]
    fn test_register_rejects_missing_placeholder() {
        let mut curies = Curies::new();
        let err = curies
            .register(Link::curie("ex", "http://example.com/rels/order"))
            .unwrap_err();
        assert!(matches!(err, HalError::InvalidCurie(_)));
    }

    #[test]
    fn test_register_rejects_empty_name() {
        let mut curies = Curies::new();
        let mut link = ex_curie();
        link.name = Some(String::new());
        assert!(curies.register(link).is_err());
    }

    #[test]
    fn test_resolve_and_expand_round_trip() {
        let curies = Curies::from_links([ex_curie()]).unwrap();
        assert_eq!(curies.resolve("http://example.com/rels/order"), "ex:order");
        assert_eq!(curies.expand("ex:order"), "http://example.com/rels/order");
        // Already-curied rels resolve to themselves.
        assert_eq!(curies.resolve("ex:order"), "ex:order");
        // Unknown rels pass through unchanged.
        assert_eq!(curies.resolve("self"), "self");
        assert_eq!(curies.expand("other:thing"), "other:thing");
    }

    #[test]
    fn test_template_matching_with_suffix() {
        let link = Link::curie("doc", "http://example.com/{rel}/index.html");
        let t = CurieTemplate::from_link(&link).unwrap();
        assert!(t.matches_expanded("http://example.com/orders/index.html"));
        assert_eq!(t.placeholder("http://example.com/orders/index.html"), "orders");
        assert_eq!(t.to_curied("doc:orders"), "doc:orders");
        assert_eq!(t.to_expanded("doc:orders"), "http://example.com/orders/index.html");
        assert!(!t.matches_expanded("http://example.com/index.html"));
    }

    #[test]
    fn test_reregister_same_href_replaces() {
        let mut curies = Curies::new();
        curies.register(ex_curie()).unwrap();
        curies.register(ex_curie()).unwrap();
        assert_eq!(curies.links().len(), 1);
    }

    #[test]
    fn test_same_name_new_href_adds_second_entry() {
        let mut curies = Curies::new();
        curies.register(ex_curie()).unwrap();
        curies
            .register(Link::curie("ex", "http://other.org/rels/{rel}"))
            .unwrap();
        assert_eq!(curies.links().len(), 2);
        // First surviving registration wins on ties.
        assert_eq!(curies.resolve("http://example.com/rels/a"), "ex:a");
        assert_eq!(curies.resolve("http://other.org/rels/a"), "ex:a");
        assert_eq!(curies.expand("ex:a"), "http://example.com/rels/a");
    }

    #[test]
    fn test_merge_with_returns_union_without_mutation() {
        let a = Curies::from_links([ex_curie()]).unwrap();
        let b = Curies::from_links([Link::curie("o", "http://other.org/{rel}")]).unwrap();
        let merged = a.merge_with(&b);
        assert_eq!(merged.links().len(), 2);
        assert_eq!(a.links().len(), 1);
        assert_eq!(merged.resolve("http://other.org/thing"), "o:thing");
    }

    #[test]
    fn test_expanded_match_requires_nonempty_placeholder() {
        let t = CurieTemplate::from_link(&ex_curie()).unwrap();
        assert!(!t.matches_expanded("http://example.com/rels/"));
    }
}
