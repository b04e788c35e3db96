//! Error types for HAL navigation and decoding.
//!
//! This module defines all error types that can occur when building,
//! decoding, or traversing HAL+JSON documents. The [`Result`] type alias
//! provides a convenient shorthand for operations that may fail.
//!
//! # Error Categories
//!
//! | Category | Variants | Raised by |
//! |----------|----------|-----------|
//! | Configuration | `Config`, `InvalidCurie` | caller misuse before any I/O |
//! | Navigation | `MissingLink` | a hop that cannot be satisfied |
//! | Transport/Decoding | `Transport`, `InvalidDocument` | the resolver collaborator or a malformed response |
//! | Typing | `TypeMismatch` | requesting an item as an incompatible type |
//!
//! Transport and decoding errors are always propagated, never swallowed and
//! never retried at this layer; retry policy belongs to the transport
//! collaborator.

use thiserror::Error;

/// Boxed error produced by a [`LinkResolver`](crate::client::LinkResolver).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for HAL operations.
///
/// Provides a convenient shorthand for `Result<T, HalError>`.
pub type Result<T> = std::result::Result<T, HalError>;

/// Errors that can occur while building, decoding, or traversing HAL
/// documents.
///
/// # Examples
///
/// ```
/// use hal_rs::HalError;
///
/// fn handle(err: HalError) {
///     match err {
///         HalError::MissingLink { rel, .. } => eprintln!("no such rel: {rel}"),
///         other => eprintln!("error: {other}"),
///     }
/// }
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HalError {
    /// A hop could not be satisfied: the current resource has neither a link
    /// nor an embedded item under the requested rel.
    ///
    /// Raised before the transport collaborator is consulted.
    #[error("no link or embedded item with rel '{rel}' in resource {resource}")]
    MissingLink {
        /// The link-relation that was requested.
        rel: String,
        /// Identifies the resource that lacked it (its self/context URL, or
        /// `"<in-memory>"` when none is known).
        resource: String,
    },

    /// The transport collaborator returned text that failed to decode, or
    /// returned no text at all.
    #[error("invalid document from '{href}': {reason}")]
    InvalidDocument {
        /// URL the document was fetched from.
        href: String,
        /// Decoder diagnostic.
        reason: String,
    },

    /// The transport collaborator itself failed (network error, etc.).
    ///
    /// The underlying error is wrapped, not swallowed; it is never retried
    /// by this layer.
    #[error("transport error resolving '{href}'")]
    Transport {
        /// URL that was being resolved.
        href: String,
        /// The resolver's own error.
        #[source]
        source: BoxError,
    },

    /// Items present under a rel are not decodable into the requested type.
    #[error("items for rel '{rel}' do not match the requested type: {reason}")]
    TypeMismatch {
        /// The rel whose items were requested.
        rel: String,
        /// Decoder diagnostic.
        reason: String,
    },

    /// Caller misuse: no start point, ambiguous relative-URL resolution, a
    /// still-templated href at follow time, and similar.
    ///
    /// Always fatal to the current call, never retried.
    #[error("configuration error: {0}")]
    Config(String),

    /// A link registered as a curie violates the curie invariants
    /// (`rel == "curies"`, non-empty name, exactly one `{rel}` placeholder).
    #[error("invalid curie: {0}")]
    InvalidCurie(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_link_display_names_rel_and_resource() {
        let err = HalError::MissingLink {
            rel: "next".into(),
            resource: "http://example.com/orders".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("next"));
        assert!(msg.contains("http://example.com/orders"));
    }

    #[test]
    fn test_transport_error_keeps_source() {
        use std::error::Error;
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = HalError::Transport {
            href: "http://example.com".into(),
            source: Box::new(io),
        };
        assert!(err.source().is_some());
    }
}
