//! The transport collaborator.
//!
//! The navigation engine never performs I/O itself: every fetch goes
//! through a [`LinkResolver`], a synchronous collaborator turning a
//! [`Link`] into HAL+JSON text. The engine does not inspect HTTP status
//! codes or headers and performs no content negotiation, retries, caching,
//! or pooling — all of that belongs to the resolver. Whatever error or text
//! the resolver returns is propagated unmodified (errors wrapped as
//! [`HalError::Transport`](crate::HalError::Transport), never swallowed).

use crate::error::BoxError;
use crate::types::link::Link;

/// Resolves a link to the HAL+JSON text of the resource it points at.
///
/// Implemented by anything that can fetch a document; plain closures work
/// too:
///
/// ```
/// use hal_rs::client::LinkResolver;
/// use hal_rs::Link;
///
/// let stub = |link: &Link| -> Result<String, hal_rs::BoxError> {
///     Ok(format!(r#"{{"_links":{{"self":{{"href":"{}"}}}}}}"#, link.href))
/// };
/// let text = stub.resolve(&Link::self_link("/a")).unwrap();
/// assert!(text.contains("/a"));
/// ```
pub trait LinkResolver: Send + Sync {
    /// Fetches the resource behind `link`, returning its HAL+JSON text.
    ///
    /// The href is fully expanded and resolved by the time this is called;
    /// `link.media_type` and `link.profile` are available as negotiation
    /// hints should the implementation want them.
    fn resolve(&self, link: &Link) -> Result<String, BoxError>;
}

impl<F> LinkResolver for F
where
    F: Fn(&Link) -> Result<String, BoxError> + Send + Sync,
{
    fn resolve(&self, link: &Link) -> Result<String, BoxError> {
        self(link)
    }
}

/// A ready-made resolver backed by reqwest's blocking client.
///
/// Sends `Accept: application/hal+json` (or the link's media type when one
/// is present) and returns the response body without inspecting the status
/// code, as the resolver contract prescribes.
#[cfg(feature = "blocking")]
pub struct ReqwestResolver {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "blocking")]
impl ReqwestResolver {
    /// Creates a resolver with a default blocking client.
    pub fn new() -> Self {
        ReqwestResolver {
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Creates a resolver wrapping an existing blocking client.
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        ReqwestResolver { client }
    }
}

#[cfg(feature = "blocking")]
impl Default for ReqwestResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "blocking")]
impl LinkResolver for ReqwestResolver {
    fn resolve(&self, link: &Link) -> Result<String, BoxError> {
        let accept = link
            .media_type
            .as_deref()
            .unwrap_or("application/hal+json");
        let response = self
            .client
            .get(&link.href)
            .header(reqwest::header::ACCEPT, accept)
            .send()?;
        Ok(response.text()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_resolver() {
        let resolver = |link: &Link| -> Result<String, BoxError> {
            Ok(format!("{{\"href\": \"{}\"}}", link.href))
        };
        assert!(resolver.resolve(&Link::self_link("/a")).unwrap().contains("/a"));
    }

    #[test]
    fn test_closure_resolver_error_passes_through() {
        let resolver = |_: &Link| -> Result<String, BoxError> {
            Err("connection refused".into())
        };
        let err = resolver.resolve(&Link::self_link("/a")).unwrap_err();
        assert_eq!(err.to_string(), "connection refused");
    }
}
