//! HAL+JSON encode/decode entry points.
//!
//! Everything the codec needs is passed in explicitly — there is no
//! process-wide default configuration.
//!
//! # Input Shapes
//!
//! Wherever the wire format structurally allows a list (`_links` and
//! `_embedded` values), the decoders uniformly accept either a single JSON
//! object or an array of objects. Both shapes decode into the internal
//! list representation; there is no opt-in flag and no scalar special case.
//! [`SingleOrMany`] is the single choke point implementing this rule, for
//! the plain decoder and the typed-descriptor decoder alike.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{HalError, Result};
use crate::types::representation::Representation;
use crate::types::type_info::{EmbeddedTypeInfo, TypedNode, TypedResource};

/// A JSON value that is either one `T` or an array of `T`.
///
/// Used by the `_links` and `_embedded` deserializers so a lone object is
/// accepted wherever an array is structurally expected.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SingleOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> SingleOrMany<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            SingleOrMany::Many(items) => items,
            SingleOrMany::One(item) => vec![item],
        }
    }
}

/// Decodes HAL+JSON text into a generic [`Representation`].
///
/// Curies found in `_links` are propagated into the embedded tree before
/// the value is returned. Fails with
/// [`HalError::InvalidDocument`](crate::HalError::InvalidDocument) on empty
/// input or malformed JSON; `href` identifies the source of the text for
/// diagnostics.
pub fn parse_hal(text: &str, href: &str) -> Result<Representation> {
    if text.trim().is_empty() {
        return Err(HalError::InvalidDocument {
            href: href.to_string(),
            reason: "empty response body".to_string(),
        });
    }
    serde_json::from_str(text).map_err(|e| HalError::InvalidDocument {
        href: href.to_string(),
        reason: e.to_string(),
    })
}

/// Decodes HAL+JSON text into `T`, materializing typed embedded items per
/// the descriptor tree.
///
/// See [`decode_typed`] for the descriptor walk.
pub fn parse_hal_as<T>(
    text: &str,
    href: &str,
    type_info: &[EmbeddedTypeInfo],
) -> Result<TypedResource<T>>
where
    T: serde::de::DeserializeOwned,
{
    let rep = parse_hal(text, href)?;
    decode_typed(&rep, type_info)
}

/// Decodes an already-parsed [`Representation`] into `T` with typed
/// embedded items.
///
/// The walk is a recursive descent over the descriptor tree:
///
/// 1. the root decodes into `T` by ordinary field mapping;
/// 2. for each descriptor, the `_embedded` items for its rel are located
///    with curie resolution against the curies visible at that level
///    (inherited curies included) — an absent rel is skipped, embedding is
///    optional;
/// 3. every located item decodes into the descriptor's target type (a lone
///    object was already normalized to a one-element list on input);
/// 4. the walk recurses into each item with the descriptor's children;
/// 5. the typed items are returned in place of the generic ones, paired
///    with their generic [`Representation`] view for continued navigation.
pub fn decode_typed<T>(
    rep: &Representation,
    type_info: &[EmbeddedTypeInfo],
) -> Result<TypedResource<T>>
where
    T: serde::de::DeserializeOwned,
{
    let value: T = rep.decode_as()?;
    let embedded = decode_typed_nodes(rep, type_info)?;
    Ok(TypedResource::new(value, rep.clone(), embedded))
}

fn decode_typed_nodes(
    rep: &Representation,
    type_info: &[EmbeddedTypeInfo],
) -> Result<IndexMap<String, Vec<TypedNode>>> {
    let mut out = IndexMap::new();
    for info in type_info {
        let items = rep.embedded_for(info.rel());
        if items.is_empty() {
            tracing::trace!(rel = info.rel(), "no embedded items for descriptor, skipping");
            continue;
        }
        let mut nodes = Vec::with_capacity(items.len());
        for item in items {
            let value = info.decode_item(item)?;
            let children = decode_typed_nodes(item, info.children())?;
            nodes.push(TypedNode::new(value, info.type_name(), item.clone(), children));
        }
        out.insert(rep.curies().resolve(info.rel()), nodes);
    }
    Ok(out)
}

/// Encodes a resource as a HAL+JSON string, honoring the array-rel policy.
pub fn to_hal_string(rep: &Representation) -> Result<String> {
    serde_json::to_string(rep).map_err(|e| HalError::InvalidDocument {
        href: "<in-memory>".to_string(),
        reason: e.to_string(),
    })
}

/// Encodes a resource as a `serde_json::Value`.
pub fn to_hal_value(rep: &Representation) -> Result<serde_json::Value> {
    serde_json::to_value(rep).map_err(|e| HalError::InvalidDocument {
        href: "<in-memory>".to_string(),
        reason: e.to_string(),
    })
}
