//! The `_links` collection of a HAL resource.
//!
//! [`Links`] is an ordered mapping from link-relation to a non-empty list of
//! [`Link`]s sharing that rel, built through the curie-aware
//! [`LinksBuilder`]. Once any curie is known, map keys are stored in curied
//! form, so storage, rendering, and lookup stay consistent; lookups accept a
//! rel in either curied or expanded form.
//!
//! # Array-Rel Policy
//!
//! A per-collection set of rels (default `curies`, `item`, `items`) decides
//! whether a rel with exactly one link still renders as a one-element JSON
//! array. Rels with more than one link always render as arrays.
//!
//! # Examples
//!
//! ```
//! use hal_rs::{Link, Links};
//!
//! let links = Links::linking_to()
//!     .curi("ex", "http://example.com/rels/{rel}")
//!     .self_link("http://example.com/orders")
//!     .link(Link::new("http://example.com/rels/order", "/orders/1"))
//!     .build()
//!     .unwrap();
//!
//! // Stored under the curied key, addressable either way.
//! assert_eq!(links.first("ex:order").unwrap().href, "/orders/1");
//! assert_eq!(links.first("http://example.com/rels/order").unwrap().href, "/orders/1");
//! ```

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};

use crate::codec::SingleOrMany;
use crate::error::Result;
use crate::types::curies::Curies;
use crate::types::link::{Link, CURIES_REL};

/// Rels that render as arrays even with a single element, unless overridden.
pub fn default_array_rels() -> BTreeSet<String> {
    [CURIES_REL, "item", "items"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Ordered rel → links mapping with a curie registry and an array-rel
/// rendering policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Links {
    entries: IndexMap<String, Vec<Link>>,
    curies: Curies,
    array_rels: BTreeSet<String>,
}

impl Default for Links {
    fn default() -> Self {
        Links::empty()
    }
}

impl Links {
    /// Creates an empty collection with the default array-rel policy.
    pub fn empty() -> Self {
        Links {
            entries: IndexMap::new(),
            curies: Curies::new(),
            array_rels: default_array_rels(),
        }
    }

    /// Starts a curie-aware builder.
    pub fn linking_to() -> LinksBuilder {
        LinksBuilder::default()
    }

    /// All links registered under `rel`, addressable in curied or expanded
    /// form. Empty slice when the rel is absent.
    pub fn rel(&self, rel: &str) -> &[Link] {
        self.entries
            .get(&self.curies.resolve(rel))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The first link registered under `rel`.
    pub fn first(&self, rel: &str) -> Option<&Link> {
        self.rel(rel).first()
    }

    /// True iff at least one link is registered under `rel`.
    pub fn contains(&self, rel: &str) -> bool {
        !self.rel(rel).is_empty()
    }

    /// The rels of this collection, in insertion order (curied form).
    pub fn rels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over `(rel, links)` entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Link])> {
        self.entries
            .iter()
            .map(|(rel, links)| (rel.as_str(), links.as_slice()))
    }

    /// Removes all links under `rel` (curied or expanded form), returning
    /// them if the rel was present.
    pub fn remove(&mut self, rel: &str) -> Option<Vec<Link>> {
        self.entries.shift_remove(&self.curies.resolve(rel))
    }

    /// True iff no links are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The curie registry of this collection.
    pub fn curies(&self) -> &Curies {
        &self.curies
    }

    /// True iff `rel` (after curie resolution) renders as a JSON array even
    /// with a single element. `curies` is always an array rel.
    pub fn is_array_rel(&self, rel: &str) -> bool {
        let resolved = self.curies.resolve(rel);
        resolved == CURIES_REL || self.array_rels.contains(&resolved)
    }

    /// Merges `parent` curies into this collection and re-keys every entry
    /// through the merged registry.
    pub(crate) fn inherit_curies(&mut self, parent: &Curies) {
        self.curies = parent.merge_with(&self.curies);
        self.rekey();
    }

    /// Inserts a link, deduplicating equivalent links under the same rel.
    /// Curie links are additionally registered with the curie registry and
    /// every entry is re-keyed so no expanded key survives a late curie.
    fn insert(&mut self, mut link: Link) -> Result<()> {
        if link.is_curie() {
            self.curies.register(link.clone())?;
            self.rekey();
        }
        let key = self.curies.resolve(&link.rel);
        link.rel = key.clone();
        // Invariant: templated iff the href holds template expressions,
        // whatever the wire claimed.
        link.templated = link.href.contains('{');
        let list = self.entries.entry(key).or_default();
        if !list.iter().any(|existing| existing.is_equivalent_to(&link)) {
            list.push(link);
        }
        Ok(())
    }

    fn rekey(&mut self) {
        let old = std::mem::take(&mut self.entries);
        for (rel, links) in old {
            let key = self.curies.resolve(&rel);
            let list = self.entries.entry(key.clone()).or_default();
            for mut link in links {
                link.rel = key.clone();
                if !list.iter().any(|existing| existing.is_equivalent_to(&link)) {
                    list.push(link);
                }
            }
        }
    }
}

/// Curie-aware builder for [`Links`].
#[derive(Debug, Default)]
pub struct LinksBuilder {
    links: Vec<Link>,
    array_rels: Option<BTreeSet<String>>,
}

impl LinksBuilder {
    /// Adds a link. Equivalent links under the same rel collapse to one.
    pub fn link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    /// Adds several links.
    pub fn links<I: IntoIterator<Item = Link>>(mut self, links: I) -> Self {
        self.links.extend(links);
        self
    }

    /// Registers a curie under `name` with the given `{rel}` template.
    pub fn curi(self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.link(Link::curie(name, template))
    }

    /// Adds a `self` link.
    pub fn self_link(self, href: impl Into<String>) -> Self {
        self.link(Link::self_link(href))
    }

    /// Adds an `item` link.
    pub fn item(self, href: impl Into<String>) -> Self {
        self.link(Link::item(href))
    }

    /// Replaces the array-rel policy. `curies` is implicitly retained.
    pub fn array_rels<I, S>(mut self, rels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.array_rels = Some(rels.into_iter().map(Into::into).collect());
        self
    }

    /// Builds the collection.
    ///
    /// Fails with [`HalError::InvalidCurie`](crate::HalError::InvalidCurie)
    /// when a curie link violates the curie invariants.
    pub fn build(self) -> Result<Links> {
        let mut collection = Links::empty();
        if let Some(rels) = self.array_rels {
            collection.array_rels = rels;
        }
        // Curies first, so every subsequent key lands in curied form
        // directly; late curies are handled by insert's re-keying anyway.
        let (curies, plain): (Vec<_>, Vec<_>) =
            self.links.into_iter().partition(Link::is_curie);
        for link in curies.into_iter().chain(plain) {
            collection.insert(link)?;
        }
        Ok(collection)
    }
}

impl Serialize for Links {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (rel, links) in &self.entries {
            if links.len() > 1 || self.is_array_rel(rel) {
                map.serialize_entry(rel, links)?;
            } else {
                map.serialize_entry(rel, &links[0])?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Links {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw: IndexMap<String, SingleOrMany<Link>> = IndexMap::deserialize(deserializer)?;
        let mut builder = Links::linking_to();
        for (rel, value) in raw {
            for mut link in value.into_vec() {
                link.rel = rel.clone();
                builder = builder.link(link);
            }
        }
        builder.build().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_rel_is_absent_not_stored() {
        let links = Links::empty();
        assert!(links.rel("self").is_empty());
        assert!(links.is_empty());
    }

    #[test]
    fn test_equivalent_links_are_not_duplicated() {
        let links = Links::linking_to()
            .link(Link::new("item", "/items/1"))
            .link(Link::new("item", "/items/1"))
            .link(Link::new("item", "/items/2"))
            .build()
            .unwrap();
        assert_eq!(links.rel("item").len(), 2);
    }

    #[test]
    fn test_keys_are_stored_curied() {
        let links = Links::linking_to()
            .curi("ex", "http://example.com/rels/{rel}")
            .link(Link::new("http://example.com/rels/order", "/orders/1"))
            .build()
            .unwrap();
        assert_eq!(links.rels().collect::<Vec<_>>(), vec!["curies", "ex:order"]);
        assert_eq!(links.rel("ex:order").len(), 1);
        assert_eq!(links.rel("http://example.com/rels/order").len(), 1);
    }

    #[test]
    fn test_curie_registered_after_links_rekeys() {
        let links = Links::linking_to()
            .link(Link::new("http://example.com/rels/order", "/orders/1"))
            .curi("ex", "http://example.com/rels/{rel}")
            .build()
            .unwrap();
        assert!(links.contains("ex:order"));
    }

    #[test]
    fn test_single_self_serializes_as_object() {
        let links = Links::linking_to().self_link("/a").build().unwrap();
        let json = serde_json::to_value(&links).unwrap();
        assert_eq!(json, json!({"self": {"href": "/a"}}));
    }

    #[test]
    fn test_single_item_serializes_as_array() {
        let links = Links::linking_to().item("/items/1").build().unwrap();
        let json = serde_json::to_value(&links).unwrap();
        assert_eq!(json, json!({"item": [{"href": "/items/1"}]}));
    }

    #[test]
    fn test_curies_always_serialize_as_array() {
        let links = Links::linking_to()
            .curi("ex", "http://example.com/rels/{rel}")
            .array_rels(Vec::<String>::new())
            .build()
            .unwrap();
        let json = serde_json::to_value(&links).unwrap();
        assert!(json["curies"].is_array());
    }

    #[test]
    fn test_multi_element_rel_serializes_as_array_regardless_of_policy() {
        let links = Links::linking_to()
            .link(Link::new("alternate", "/a"))
            .link(Link::new("alternate", "/b"))
            .build()
            .unwrap();
        let json = serde_json::to_value(&links).unwrap();
        assert_eq!(json["alternate"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_deserialize_accepts_single_object_and_array() {
        let links: Links = serde_json::from_value(json!({
            "self": {"href": "/a"},
            "item": [{"href": "/items/1"}, {"href": "/items/2"}]
        }))
        .unwrap();
        assert_eq!(links.first("self").unwrap().href, "/a");
        assert_eq!(links.rel("item").len(), 2);
    }

    #[test]
    fn test_encode_decode_round_trip_preserves_order_and_links() {
        let original = Links::linking_to()
            .self_link("/orders")
            .link(Link::new("next", "/orders?page=2"))
            .item("/orders/1")
            .item("/orders/2")
            .build()
            .unwrap();
        let text = serde_json::to_string(&original).unwrap();
        let decoded: Links = serde_json::from_str(&text).unwrap();
        assert_eq!(
            decoded.rels().collect::<Vec<_>>(),
            original.rels().collect::<Vec<_>>()
        );
        for rel in original.rels() {
            assert_eq!(decoded.rel(rel), original.rel(rel));
        }
    }

    #[test]
    fn test_remove_accepts_either_form() {
        let mut links = Links::linking_to()
            .curi("ex", "http://example.com/rels/{rel}")
            .link(Link::new("ex:order", "/orders/1"))
            .build()
            .unwrap();
        let removed = links.remove("http://example.com/rels/order").unwrap();
        assert_eq!(removed.len(), 1);
        assert!(!links.contains("ex:order"));
    }
}
