//! Typed-embedding descriptors.
//!
//! HAL embeds resources generically: the decoder materializes every
//! `_embedded` item as a [`Representation`]. An [`EmbeddedTypeInfo`] tree
//! tells the typed decoder which concrete Rust type to materialize for the
//! items of a rel at each nesting depth:
//!
//! ```text
//! EmbeddedTypeInfo::of::<Order>("item")
//!     .nested(EmbeddedTypeInfo::of::<Customer>("customer"))
//! ```
//!
//! reads as "the items embedded under `item` decode as `Order`, and within
//! each of those, the items under `customer` decode as `Customer`".
//!
//! Descriptors are plain data consumed by
//! [`codec::decode_typed`](crate::codec::decode_typed); they are never
//! serialized. The type handle is captured as a type-erased decode callback
//! at construction, so the recursive walk stays a terminating fold over a
//! finite tree with no open-ended reflection.
//!
//! The result of a typed decode pairs each typed value with the generic
//! [`Representation`] view of the same item ([`TypedResource`] at the root,
//! [`TypedNode`] below it), so navigation can continue from any typed item.

use std::any::Any;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{HalError, Result};
use crate::types::representation::Representation;

type ErasedValue = Box<dyn Any + Send + Sync>;
type Decoder = Arc<dyn Fn(&Representation) -> serde_json::Result<ErasedValue> + Send + Sync>;

/// One node of a typed-embedding descriptor tree: a rel, a target type, and
/// the child descriptors applied to the target type's own embedded items.
#[derive(Clone)]
pub struct EmbeddedTypeInfo {
    rel: String,
    nested: Vec<EmbeddedTypeInfo>,
    decoder: Decoder,
    type_name: &'static str,
}

impl std::fmt::Debug for EmbeddedTypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedTypeInfo")
            .field("rel", &self.rel)
            .field("type", &self.type_name)
            .field("nested", &self.nested)
            .finish()
    }
}

impl EmbeddedTypeInfo {
    /// Declares that items embedded under `rel` decode as `T`.
    pub fn of<T>(rel: impl Into<String>) -> Self
    where
        T: serde::de::DeserializeOwned + Send + Sync + 'static,
    {
        EmbeddedTypeInfo {
            rel: rel.into(),
            nested: Vec::new(),
            decoder: Arc::new(|rep| {
                serde_json::to_value(rep)
                    .and_then(serde_json::from_value::<T>)
                    .map(|value| Box::new(value) as ErasedValue)
            }),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Appends a child descriptor applied to the target type's own embedded
    /// items.
    pub fn nested(mut self, child: EmbeddedTypeInfo) -> Self {
        self.nested.push(child);
        self
    }

    /// The rel this descriptor covers.
    pub fn rel(&self) -> &str {
        &self.rel
    }

    /// The child descriptors.
    pub fn children(&self) -> &[EmbeddedTypeInfo] {
        &self.nested
    }

    /// Name of the target type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn decode_item(&self, item: &Representation) -> Result<ErasedValue> {
        (self.decoder)(item).map_err(|e| HalError::TypeMismatch {
            rel: self.rel.clone(),
            reason: format!("cannot decode as {}: {e}", self.type_name),
        })
    }
}

/// A typed embedded item below the root of a typed decode.
///
/// The concrete type varies per descriptor, so values at this level are
/// type-erased; recover them with [`TypedNode::value_as`].
pub struct TypedNode {
    value: ErasedValue,
    type_name: &'static str,
    hal: Representation,
    embedded: IndexMap<String, Vec<TypedNode>>,
}

impl std::fmt::Debug for TypedNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedNode")
            .field("type", &self.type_name)
            .field("embedded_rels", &self.embedded.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TypedNode {
    pub(crate) fn new(
        value: ErasedValue,
        type_name: &'static str,
        hal: Representation,
        embedded: IndexMap<String, Vec<TypedNode>>,
    ) -> Self {
        TypedNode {
            value,
            type_name,
            hal,
            embedded,
        }
    }

    /// True iff this node's value is a `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.value.downcast_ref::<T>().is_some()
    }

    /// The typed value, if it is a `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// The typed value as a `T`, failing with
    /// [`HalError::TypeMismatch`] when the node holds a different type.
    pub fn value_as<T: 'static>(&self) -> Result<&T> {
        self.downcast_ref::<T>().ok_or_else(|| HalError::TypeMismatch {
            rel: String::new(),
            reason: format!(
                "node holds {}, not {}",
                self.type_name,
                std::any::type_name::<T>()
            ),
        })
    }

    /// The generic HAL view of this item, for continued navigation.
    pub fn hal(&self) -> &Representation {
        &self.hal
    }

    /// Typed children under `rel` (curied or expanded form). Empty when the
    /// rel was not covered by a descriptor or not present.
    pub fn embedded(&self, rel: &str) -> &[TypedNode] {
        self.embedded
            .get(&self.hal.curies().resolve(rel))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// The result of a typed decode: the root document as `T` plus the typed
/// embedded tree materialized per the descriptors.
#[derive(Debug)]
pub struct TypedResource<T> {
    value: T,
    hal: Representation,
    embedded: IndexMap<String, Vec<TypedNode>>,
}

impl<T> TypedResource<T> {
    pub(crate) fn new(
        value: T,
        hal: Representation,
        embedded: IndexMap<String, Vec<TypedNode>>,
    ) -> Self {
        TypedResource {
            value,
            hal,
            embedded,
        }
    }

    /// The root document decoded as `T`.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Consumes the resource, returning the root value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// The generic HAL view of the root document.
    pub fn hal(&self) -> &Representation {
        &self.hal
    }

    /// Typed embedded items under `rel` (curied or expanded form).
    pub fn embedded(&self, rel: &str) -> &[TypedNode] {
        self.embedded
            .get(&self.hal.curies().resolve(rel))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Order {
        total: u32,
    }

    #[test]
    fn test_descriptor_shape() {
        let info = EmbeddedTypeInfo::of::<Order>("item")
            .nested(EmbeddedTypeInfo::of::<Order>("related"));
        assert_eq!(info.rel(), "item");
        assert_eq!(info.children().len(), 1);
        assert!(info.type_name().contains("Order"));
    }

    #[test]
    fn test_decode_item_type_mismatch_names_rel_and_type() {
        let info = EmbeddedTypeInfo::of::<Order>("item");
        let not_an_order: Representation =
            serde_json::from_value(serde_json::json!({"name": "x"})).unwrap();
        let err = info.decode_item(&not_an_order).unwrap_err();
        match err {
            HalError::TypeMismatch { rel, reason } => {
                assert_eq!(rel, "item");
                assert!(reason.contains("Order"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
