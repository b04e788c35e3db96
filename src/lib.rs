//! hal_rs: HAL+JSON hypermedia documents and Traverson-style navigation.
//!
//! This crate models [HAL+JSON] documents — resources exposing `_links`
//! (named, possibly templated, relations to other resources) and
//! `_embedded` (inlined copies of linked resources) — and navigates them by
//! link-relation name instead of hard-coded URLs.
//!
//! - **types**: [`Link`], [`Links`], [`Embedded`], [`Representation`], the
//!   curie registry ([`Curies`]), and typed-embedding descriptors
//!   ([`EmbeddedTypeInfo`]).
//! - **codec**: HAL+JSON encode/decode, including the uniform
//!   single-object-or-array input rule and the recursive typed-embedding
//!   decode.
//! - **client**: the [`Traverson`] hop engine and the [`LinkResolver`]
//!   transport collaborator (a reqwest-backed resolver ships behind the
//!   `blocking` feature).
//!
//! # Building a document
//!
//! ```
//! use hal_rs::{Link, Links, Representation};
//!
//! let order = Representation::new()
//!     .with_links(
//!         Links::linking_to()
//!             .curi("ex", "http://example.com/rels/{rel}")
//!             .self_link("http://example.com/orders/42")
//!             .link(Link::new("http://example.com/rels/customer", "/customers/7"))
//!             .build()?,
//!     )
//!     .with_field("total", 42);
//!
//! let text = hal_rs::codec::to_hal_string(&order)?;
//! assert!(text.contains("ex:customer"));
//! # Ok::<(), hal_rs::HalError>(())
//! ```
//!
//! # Navigating
//!
//! See [`Traverson`] for the hop engine: `start_with`, fluent `follow` /
//! `follow_link` calls, and the terminal methods `get_resource[_as]`,
//! `stream[_as]`, and `paginate*`.
//!
//! [HAL+JSON]: https://datatracker.ietf.org/doc/html/draft-kelly-json-hal

pub mod client;
pub mod codec;
pub mod error;
pub mod types;

pub use error::{BoxError, HalError, Result};
pub use types::{
    Curies, CurieTemplate, Embedded, EmbeddedTypeInfo, Link, Links, LinksBuilder, Representation,
    TypedNode, TypedResource, CURIES_REL,
};

pub use client::{LinkResolver, LinkSelector, ResourceStream, Traverson, TypedStream};

#[cfg(feature = "blocking")]
pub use client::ReqwestResolver;
