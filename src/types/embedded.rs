//! The `_embedded` collection of a HAL resource.
//!
//! [`Embedded`] is an ordered mapping from link-relation to a non-empty list
//! of embedded [`Representation`]s. It inherits the curie context of its
//! owning resource: curies known to the owner are merged into every embedded
//! item, and transitively into *their* embedded items, before the items are
//! exposed — so relation lookups against embedded items work in both curied
//! and expanded form without the caller supplying the context again.
//!
//! Rendering follows the default array-rel policy: one item renders as a
//! bare object unless the rel is an array rel (`item`, `items`); several
//! items always render as an array. On input, a single object and an array
//! are both accepted for every rel.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};

use crate::codec::SingleOrMany;
use crate::types::curies::Curies;
use crate::types::links::default_array_rels;
use crate::types::representation::Representation;

/// Ordered rel → embedded representations mapping with inherited curies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Embedded {
    entries: IndexMap<String, Vec<Representation>>,
    curies: Curies,
}

impl Embedded {
    /// Creates an empty collection.
    pub fn empty() -> Self {
        Embedded::default()
    }

    /// Creates a collection with a single rel.
    pub fn with(rel: impl Into<String>, items: Vec<Representation>) -> Self {
        let mut embedded = Embedded::empty();
        embedded.insert(rel.into(), items);
        embedded
    }

    /// All embedded items under `rel`, addressable in curied or expanded
    /// form. Empty slice when the rel is absent.
    pub fn rel(&self, rel: &str) -> &[Representation] {
        self.entries
            .get(&self.curies.resolve(rel))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// True iff at least one item is embedded under `rel`.
    pub fn contains(&self, rel: &str) -> bool {
        !self.rel(rel).is_empty()
    }

    /// The rels of this collection, in insertion order (curied form).
    pub fn rels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over `(rel, items)` entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Representation])> {
        self.entries
            .iter()
            .map(|(rel, items)| (rel.as_str(), items.as_slice()))
    }

    /// True iff nothing is embedded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The curies visible to this collection (the owner's, merged with any
    /// carried by the embedded items' ancestors).
    pub fn curies(&self) -> &Curies {
        &self.curies
    }

    /// Replaces the items under `rel`. An empty list removes the rel
    /// entirely; an empty list is never stored.
    pub(crate) fn insert(&mut self, rel: String, items: Vec<Representation>) {
        let key = self.curies.resolve(&rel);
        if items.is_empty() {
            self.entries.shift_remove(&key);
        } else {
            self.entries.insert(key, items);
        }
    }

    /// Removes all items under `rel`, returning them if the rel was present.
    pub fn remove(&mut self, rel: &str) -> Option<Vec<Representation>> {
        self.entries.shift_remove(&self.curies.resolve(rel))
    }

    /// Merges `parent` curies into this collection, re-keys every entry, and
    /// pushes the merged context down into each embedded item recursively.
    pub(crate) fn inherit_curies(&mut self, parent: &Curies) {
        self.curies = parent.merge_with(&self.curies);
        let old = std::mem::take(&mut self.entries);
        for (rel, mut items) in old {
            for item in &mut items {
                item.inherit_curies(&self.curies);
            }
            let key = self.curies.resolve(&rel);
            self.entries.entry(key).or_default().extend(items);
        }
    }

    fn is_array_rel(&self, rel: &str) -> bool {
        default_array_rels().contains(&self.curies.resolve(rel))
    }
}

impl Serialize for Embedded {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (rel, items) in &self.entries {
            if items.len() > 1 || self.is_array_rel(rel) {
                map.serialize_entry(rel, items)?;
            } else {
                map.serialize_entry(rel, &items[0])?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Embedded {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: IndexMap<String, SingleOrMany<Representation>> =
            IndexMap::deserialize(deserializer)?;
        let mut embedded = Embedded::empty();
        for (rel, value) in raw {
            embedded.insert(rel, value.into_vec());
        }
        Ok(embedded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::links::Links;
    use serde_json::json;

    fn item_with_self(href: &str) -> Representation {
        Representation::new()
            .with_links(Links::linking_to().self_link(href).build().unwrap())
    }

    #[test]
    fn test_empty_list_is_never_stored() {
        let mut embedded = Embedded::with("item", vec![item_with_self("/items/1")]);
        embedded.insert("item".into(), vec![]);
        assert!(embedded.is_empty());
    }

    #[test]
    fn test_deserialize_accepts_single_object_and_array() {
        let embedded: Embedded = serde_json::from_value(json!({
            "item": [{"_links": {"self": {"href": "/items/1"}}}],
            "author": {"_links": {"self": {"href": "/people/7"}}}
        }))
        .unwrap();
        assert_eq!(embedded.rel("item").len(), 1);
        assert_eq!(embedded.rel("author").len(), 1);
    }

    #[test]
    fn test_single_item_rel_serializes_as_array() {
        let embedded = Embedded::with("item", vec![item_with_self("/items/1")]);
        let json = serde_json::to_value(&embedded).unwrap();
        assert!(json["item"].is_array());
    }

    #[test]
    fn test_single_custom_rel_serializes_as_object() {
        let embedded = Embedded::with("author", vec![item_with_self("/people/7")]);
        let json = serde_json::to_value(&embedded).unwrap();
        assert!(json["author"].is_object());
    }

    #[test]
    fn test_inherit_curies_rekeys_entries() {
        let mut embedded = Embedded::with(
            "http://example.com/rels/order",
            vec![item_with_self("/orders/1")],
        );
        let curies = Curies::from_links([crate::Link::curie(
            "ex",
            "http://example.com/rels/{rel}",
        )])
        .unwrap();
        embedded.inherit_curies(&curies);
        assert_eq!(embedded.rels().collect::<Vec<_>>(), vec!["ex:order"]);
        assert!(embedded.contains("http://example.com/rels/order"));
    }
}
