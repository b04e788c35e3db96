//! The root HAL entity.
//!
//! A [`Representation`] combines a [`Links`] collection, an [`Embedded`]
//! collection, and a bag of unmapped raw fields. It is the unit exchanged
//! over the wire and the unit returned by every
//! [`Traverson`](crate::Traverson) step.
//!
//! Because every field that is not `_links` or `_embedded` lands in the raw
//! field bag, a `Representation` is a lossless view of its document:
//! re-serializing reproduces the original content, which is what makes
//! [`Representation::embedded_as`] and [`Representation::decode_as`] able to
//! re-decode any subtree into a caller-supplied type at any time.
//!
//! Curie propagation is a pure construction step: whenever the link set
//! changes ([`with_links`](Representation::with_links) or deserialization),
//! the curies it carries are pushed down into every embedded item and
//! transitively into their embedded items. There is no shared mutable state
//! between parents and embedded children.
//!
//! # Examples
//!
//! ```
//! use hal_rs::{Link, Links, Representation};
//!
//! let order = Representation::new()
//!     .with_links(
//!         Links::linking_to()
//!             .curi("ex", "http://example.com/rels/{rel}")
//!             .self_link("http://example.com/orders/42")
//!             .build()
//!             .unwrap(),
//!     )
//!     .with_embedded("ex:item", vec![Representation::new()]);
//!
//! assert!(order.link("self").is_some());
//! assert_eq!(order.embedded_for("http://example.com/rels/item").len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{HalError, Result};
use crate::types::curies::Curies;
use crate::types::embedded::Embedded;
use crate::types::link::Link;
use crate::types::links::Links;

/// A HAL resource: links, embedded resources, and arbitrary extra fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRepresentation")]
pub struct Representation {
    #[serde(rename = "_links", skip_serializing_if = "Links::is_empty")]
    links: Links,
    #[serde(rename = "_embedded", skip_serializing_if = "Embedded::is_empty")]
    embedded: Embedded,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Wire shape prior to curie propagation. `#[serde(from)]` routes every
/// deserialization through [`From`], so a decoded `Representation` always
/// has its curies pushed down.
#[derive(Deserialize)]
struct RawRepresentation {
    #[serde(rename = "_links", default)]
    links: Links,
    #[serde(rename = "_embedded", default)]
    embedded: Embedded,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawRepresentation> for Representation {
    fn from(raw: RawRepresentation) -> Self {
        let mut rep = Representation {
            links: raw.links,
            embedded: raw.embedded,
            extra: raw.extra,
        };
        rep.propagate_curies();
        rep
    }
}

impl Representation {
    /// Creates an empty resource.
    pub fn new() -> Self {
        Representation::default()
    }

    /// Replaces the link collection and re-propagates curies into every
    /// embedded item.
    pub fn with_links(mut self, links: Links) -> Self {
        self.links = links;
        self.propagate_curies();
        self
    }

    /// Replaces the embedded items under `rel` and re-propagates curies.
    /// An empty list removes the rel.
    pub fn with_embedded(mut self, rel: impl Into<String>, items: Vec<Representation>) -> Self {
        self.embedded.insert(rel.into(), items);
        self.propagate_curies();
        self
    }

    /// Sets an extra (non-HAL) field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// The link collection.
    pub fn links(&self) -> &Links {
        &self.links
    }

    /// The embedded collection.
    pub fn embedded(&self) -> &Embedded {
        &self.embedded
    }

    /// The first link under `rel` (curied or expanded form).
    pub fn link(&self, rel: &str) -> Option<&Link> {
        self.links.first(rel)
    }

    /// All links under `rel`.
    pub fn links_for(&self, rel: &str) -> &[Link] {
        self.links.rel(rel)
    }

    /// All embedded items under `rel`.
    pub fn embedded_for(&self, rel: &str) -> &[Representation] {
        self.embedded.rel(rel)
    }

    /// An extra field by name, if present.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// The extra (non-HAL) fields of this resource.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Re-decodes the embedded items under `rel` into `T`.
    ///
    /// Fails with [`HalError::TypeMismatch`] when the items are not
    /// decodable into `T`. An absent rel yields an empty list.
    pub fn embedded_as<T: serde::de::DeserializeOwned>(&self, rel: &str) -> Result<Vec<T>> {
        self.embedded
            .rel(rel)
            .iter()
            .map(|item| {
                serde_json::to_value(item)
                    .and_then(serde_json::from_value)
                    .map_err(|e| HalError::TypeMismatch {
                        rel: rel.to_string(),
                        reason: e.to_string(),
                    })
            })
            .collect()
    }

    /// Re-decodes the whole resource into `T`.
    pub fn decode_as<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::to_value(self)
            .and_then(serde_json::from_value)
            .map_err(|e| HalError::TypeMismatch {
                rel: "self".to_string(),
                reason: e.to_string(),
            })
    }

    /// The curies visible at this resource.
    pub fn curies(&self) -> &Curies {
        self.links.curies()
    }

    /// Pushes the curies of the link set down into the embedded tree.
    fn propagate_curies(&mut self) {
        self.embedded.inherit_curies(self.links.curies());
    }

    /// Merges curies inherited from a parent resource into this one.
    pub(crate) fn inherit_curies(&mut self, parent: &Curies) {
        self.links.inherit_curies(parent);
        self.propagate_curies();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn curie_links() -> Links {
        Links::linking_to()
            .curi("x", "http://ex.org/rels/{rel}")
            .self_link("http://ex.org/")
            .build()
            .unwrap()
    }

    #[test]
    fn test_embedded_curie_propagation_is_transitive() {
        let leaf = Representation::new().with_links(
            Links::linking_to()
                .link(Link::new("http://ex.org/rels/foo", "/foo"))
                .build()
                .unwrap(),
        );
        let middle = Representation::new().with_embedded("http://ex.org/rels/inner", vec![leaf]);
        let root = Representation::new()
            .with_embedded("item", vec![middle])
            .with_links(curie_links());

        let middle = &root.embedded_for("item")[0];
        let leaf = &middle.embedded_for("x:inner")[0];
        // Deeply nested lookups work in both forms and agree.
        assert_eq!(
            leaf.link("x:foo").map(|l| &l.href),
            leaf.link("http://ex.org/rels/foo").map(|l| &l.href)
        );
        assert!(leaf.link("x:foo").is_some());
    }

    #[test]
    fn test_deserialization_propagates_curies() {
        let rep: Representation = serde_json::from_value(json!({
            "_links": {
                "curies": [{"name": "x", "href": "http://ex.org/rels/{rel}", "templated": true}]
            },
            "_embedded": {
                "http://ex.org/rels/order": {
                    "_links": {"self": {"href": "/orders/1"}},
                    "total": 42
                }
            }
        }))
        .unwrap();
        let orders = rep.embedded_for("x:order");
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].field("total"), Some(&json!(42)));
    }

    #[test]
    fn test_extra_fields_round_trip_losslessly() {
        let doc = json!({
            "_links": {"self": {"href": "/a"}},
            "total": 42.5,
            "tags": ["a", "b"]
        });
        let rep: Representation = serde_json::from_value(doc.clone()).unwrap();
        assert_eq!(serde_json::to_value(&rep).unwrap(), doc);
    }

    #[test]
    fn test_embedded_as_decodes_typed_items() {
        #[derive(Deserialize)]
        struct Order {
            total: u32,
        }
        let rep: Representation = serde_json::from_value(json!({
            "_embedded": {"item": [{"total": 1}, {"total": 2}]}
        }))
        .unwrap();
        let orders: Vec<Order> = rep.embedded_as("item").unwrap();
        assert_eq!(orders.iter().map(|o| o.total).collect::<Vec<_>>(), [1, 2]);
    }

    #[test]
    fn test_embedded_as_reports_type_mismatch() {
        #[derive(Debug, Deserialize)]
        struct Order {
            #[allow(dead_code)]
            total: u32,
        }
        let rep: Representation = serde_json::from_value(json!({
            "_embedded": {"item": [{"name": "no total"}]}
        }))
        .unwrap();
        let err = rep.embedded_as::<Order>("item").unwrap_err();
        assert!(matches!(err, HalError::TypeMismatch { .. }));
    }

    #[test]
    fn test_structural_equality() {
        let a: Representation =
            serde_json::from_value(json!({"_links": {"self": {"href": "/a"}}})).unwrap();
        let b: Representation =
            serde_json::from_value(json!({"_links": {"self": {"href": "/a"}}})).unwrap();
        assert_eq!(a, b);
    }
}
