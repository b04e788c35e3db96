//! Hop-based navigation over HAL documents.
//!
//! A [`Traverson`] is a navigation session: a start point, an ordered queue
//! of hops, and a context URL used to resolve relative hrefs. Consumers
//! name link relations instead of hard-coding URLs:
//!
//! ```
//! use std::sync::Arc;
//! use hal_rs::{Link, Traverson};
//!
//! let resolver = Arc::new(|link: &Link| -> Result<String, hal_rs::BoxError> {
//!     match link.href.as_str() {
//!         "/a" => Ok(r#"{"_links":{"self":{"href":"/a"},"next":{"href":"/b"}}}"#.into()),
//!         "/b" => Ok(r#"{"_links":{"self":{"href":"/b"}}}"#.into()),
//!         other => Err(format!("no such resource: {other}").into()),
//!     }
//! });
//!
//! let resource = Traverson::new(resolver)
//!     .start_with("/a")
//!     .follow("next")
//!     .get_resource()
//!     .unwrap();
//! assert_eq!(resource.link("self").unwrap().href, "/b");
//! ```
//!
//! # Execution Model
//!
//! Nothing is fetched until a terminal method runs; terminals take `self`
//! by value and drain the whole hop queue, so a consumed pipeline cannot be
//! reused — the single-use constraint is enforced by the type system, not
//! by runtime state. Execution is single-threaded, synchronous, and
//! blocking: every hop calls the [`LinkResolver`] inline and waits. No
//! timeouts, retries, or caching happen at this layer.
//!
//! Each hop prefers embedded items over remote fetches: when the current
//! document already embeds the requested rel, no fetch happens, unless the
//! hop was created by a `follow_link*` variant. Templated links are
//! expanded with the hop's variables before use, and relative hrefs are
//! resolved against the context URL — the absolute URL of the most recently
//! fetched resource.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::client::hop::{Hop, LinkSelector};
use crate::client::resolver::LinkResolver;
use crate::client::template;
use crate::codec;
use crate::error::{HalError, Result};
use crate::types::link::Link;
use crate::types::representation::Representation;
use crate::types::type_info::{EmbeddedTypeInfo, TypedResource};

/// A hop-based navigation session over HAL documents.
///
/// Not safe for concurrent use; terminal methods consume the session.
pub struct Traverson {
    resolver: Arc<dyn LinkResolver>,
    start: Option<Start>,
    hops: VecDeque<Hop>,
}

impl fmt::Debug for Traverson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traverson").finish_non_exhaustive()
    }
}

enum Start {
    /// Fetch deferred until a terminal call.
    Uri(String),
    /// Start from an in-memory document.
    Resource {
        rep: Representation,
        context: Option<String>,
    },
}

/// Where navigation of the hop queue ended up.
enum FinalOutcome {
    /// The start document itself (no hops were queued).
    Document(Representation),
    /// Embedded items satisfied the final hop; nothing left to fetch.
    Embedded(Vec<Representation>),
    /// Fully expanded and resolved links of the final hop, not yet fetched.
    Links(Vec<Link>),
}

impl Traverson {
    /// Creates a session using the given transport collaborator.
    pub fn new(resolver: Arc<dyn LinkResolver>) -> Self {
        Traverson {
            resolver,
            start: None,
            hops: VecDeque::new(),
        }
    }

    /// Starts navigation at a URI. The fetch is deferred until a terminal
    /// method runs.
    pub fn start_with(mut self, uri: impl Into<String>) -> Self {
        self.start = Some(Start::Uri(uri.into()));
        self
    }

    /// Starts navigation from an in-memory document.
    ///
    /// The document's `self` link becomes the context URL. Fails with
    /// [`HalError::Config`] when the document carries relative hrefs but no
    /// `self` link to resolve them against — use
    /// [`start_with_resource_at`](Traverson::start_with_resource_at) to
    /// supply the context explicitly.
    pub fn start_with_resource(mut self, rep: Representation) -> Result<Self> {
        let context = rep.link("self").map(|l| l.href.clone());
        if context.is_none() && has_relative_hrefs(&rep) {
            return Err(HalError::Config(
                "cannot start from a representation with relative hrefs but no self link; \
                 supply a context URL"
                    .to_string(),
            ));
        }
        self.start = Some(Start::Resource { rep, context });
        Ok(self)
    }

    /// Starts navigation from an in-memory document with an explicit
    /// context URL for relative-href resolution.
    pub fn start_with_resource_at(
        mut self,
        rep: Representation,
        context_url: impl Into<String>,
    ) -> Self {
        self.start = Some(Start::Resource {
            rep,
            context: Some(context_url.into()),
        });
        self
    }

    /// Internal constructor for pagination: a session already positioned at
    /// a page.
    fn positioned(
        resolver: Arc<dyn LinkResolver>,
        rep: Representation,
        context: Option<String>,
    ) -> Self {
        Traverson {
            resolver,
            start: Some(Start::Resource { rep, context }),
            hops: VecDeque::new(),
        }
    }

    /// Enqueues a hop following `rel`. Fluent; nothing is fetched yet.
    pub fn follow(self, rel: impl Into<String>) -> Self {
        self.push(Hop::new(rel, false))
    }

    /// Enqueues a hop following `rel` with URI-Template variables.
    pub fn follow_with<I, K, V>(self, rel: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.push(Hop::new(rel, false).with_vars(vars))
    }

    /// Enqueues a hop following the links of `rel` that pass `selector`.
    pub fn follow_selected(self, rel: impl Into<String>, selector: LinkSelector) -> Self {
        self.push(Hop::new(rel, false).with_selector(selector))
    }

    /// Like [`follow`](Traverson::follow), but forces link resolution even
    /// when a matching embedded item exists — for when only a partial
    /// object is embedded and the full resource must be fetched.
    pub fn follow_link(self, rel: impl Into<String>) -> Self {
        self.push(Hop::new(rel, true))
    }

    /// [`follow_link`](Traverson::follow_link) with template variables.
    pub fn follow_link_with<I, K, V>(self, rel: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.push(Hop::new(rel, true).with_vars(vars))
    }

    /// [`follow_link`](Traverson::follow_link) with a link selector.
    pub fn follow_link_selected(self, rel: impl Into<String>, selector: LinkSelector) -> Self {
        self.push(Hop::new(rel, true).with_selector(selector))
    }

    fn push(mut self, hop: Hop) -> Self {
        self.hops.push_back(hop);
        self
    }

    /// Terminal: navigates all hops and returns the first result of the
    /// final hop as a generic [`Representation`].
    pub fn get_resource(self) -> Result<Representation> {
        self.resolve_single().map(|(rep, _)| rep)
    }

    /// Terminal: like [`get_resource`](Traverson::get_resource), decoding
    /// the result into `T` with typed embedded items per the descriptors.
    pub fn get_resource_as<T>(self, type_info: &[EmbeddedTypeInfo]) -> Result<TypedResource<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let (rep, _) = self.resolve_single()?;
        codec::decode_typed(&rep, type_info)
    }

    /// Terminal: navigates all hops and returns the finite ordered sequence
    /// of *all* results of the final hop — every matching embedded item, or
    /// every matching link fetched independently and lazily.
    pub fn stream(self) -> Result<ResourceStream> {
        let resolver = self.resolver.clone();
        let (outcome, _context) = self.navigate()?;
        let (embedded, links) = match outcome {
            FinalOutcome::Document(rep) => (vec![rep], Vec::new()),
            FinalOutcome::Embedded(items) => (items, Vec::new()),
            FinalOutcome::Links(links) => (Vec::new(), links),
        };
        Ok(ResourceStream {
            resolver,
            embedded: embedded.into_iter(),
            links: links.into_iter(),
        })
    }

    /// Terminal: like [`stream`](Traverson::stream), decoding each result
    /// into `T` with typed embedded items per the descriptors.
    pub fn stream_as<T>(self, type_info: Vec<EmbeddedTypeInfo>) -> Result<TypedStream<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        Ok(TypedStream {
            inner: self.stream()?,
            type_info,
            _marker: std::marker::PhantomData,
        })
    }

    /// Terminal: page iteration along `rel`.
    ///
    /// Resolves the current page, hands a session positioned at that page
    /// to `handler`, and advances through `rel` while the handler returns
    /// `true` and the page still carries the rel (link or embedded item).
    /// Handler errors propagate; a page without the rel ends the iteration
    /// naturally.
    pub fn paginate<F>(self, rel: &str, mut handler: F) -> Result<()>
    where
        F: FnMut(Traverson) -> Result<bool>,
    {
        let resolver = self.resolver.clone();
        let (mut page, mut context) = self.resolve_single()?;
        loop {
            let positioned = Traverson::positioned(resolver.clone(), page.clone(), context.clone());
            if !handler(positioned)? {
                return Ok(());
            }
            if !page.links().contains(rel) && !page.embedded().contains(rel) {
                tracing::debug!(rel, "page has no further rel, pagination ends");
                return Ok(());
            }
            let (next, next_context) = Traverson::positioned(resolver.clone(), page, context)
                .follow(rel)
                .resolve_single()?;
            page = next;
            context = next_context;
        }
    }

    /// [`paginate`](Traverson::paginate) along the `next` rel.
    pub fn paginate_next<F>(self, handler: F) -> Result<()>
    where
        F: FnMut(Traverson) -> Result<bool>,
    {
        self.paginate("next", handler)
    }

    /// [`paginate`](Traverson::paginate) along the `prev` rel.
    pub fn paginate_prev<F>(self, handler: F) -> Result<()>
    where
        F: FnMut(Traverson) -> Result<bool>,
    {
        self.paginate("prev", handler)
    }

    /// Typed page iteration: each page is decoded into `T` with the given
    /// descriptors and handed to the handler together with a session
    /// positioned at that page.
    pub fn paginate_as<T, F>(
        self,
        rel: &str,
        type_info: &[EmbeddedTypeInfo],
        mut handler: F,
    ) -> Result<()>
    where
        T: serde::de::DeserializeOwned,
        F: FnMut(TypedResource<T>, Traverson) -> Result<bool>,
    {
        self.paginate(rel, |positioned| {
            let resolver = positioned.resolver.clone();
            match positioned.start {
                Some(Start::Resource { rep, context }) => {
                    let typed = codec::decode_typed::<T>(&rep, type_info)?;
                    let again = Traverson::positioned(resolver, rep, context);
                    handler(typed, again)
                }
                // positioned() always sets a resource start.
                _ => Err(HalError::Config(
                    "pagination session lost its page".to_string(),
                )),
            }
        })
    }

    /// Navigates to the final hop and materializes at most one result.
    fn resolve_single(self) -> Result<(Representation, Option<String>)> {
        let resolver = self.resolver.clone();
        let (outcome, context) = self.navigate()?;
        match outcome {
            FinalOutcome::Document(rep) => Ok((rep, context)),
            FinalOutcome::Embedded(mut items) => Ok((items.swap_remove(0), context)),
            FinalOutcome::Links(links) => {
                let link = &links[0];
                let rep = fetch(resolver.as_ref(), link)?;
                Ok((rep, Some(link.href.clone())))
            }
        }
    }

    /// The hop queue fold: consumes every hop, fetching intermediate
    /// documents as generic representations, and reports how the final hop
    /// was satisfied.
    fn navigate(mut self) -> Result<(FinalOutcome, Option<String>)> {
        let start = self.start.take().ok_or_else(|| {
            HalError::Config("start_with must be called before a terminal method".to_string())
        })?;
        let (mut current, mut context) = match start {
            Start::Uri(uri) => {
                let link = Link::self_link(&uri);
                let rep = fetch(self.resolver.as_ref(), &link)?;
                (rep, Some(uri))
            }
            Start::Resource { rep, context } => (rep, context),
        };

        while let Some(hop) = self.hops.pop_front() {
            let is_last = self.hops.is_empty();
            let links: Vec<&Link> = current
                .links_for(&hop.rel)
                .iter()
                .filter(|l| hop.accepts(l))
                .collect();
            let embedded = current.embedded_for(&hop.rel);

            if !embedded.is_empty() && (!hop.ignore_embedded || links.is_empty()) {
                tracing::debug!(rel = %hop.rel, count = embedded.len(), "hop satisfied by embedded items");
                if is_last {
                    return Ok((FinalOutcome::Embedded(embedded.to_vec()), context));
                }
                current = embedded[0].clone();
                continue;
            }

            if links.is_empty() {
                return Err(HalError::MissingLink {
                    rel: hop.rel.clone(),
                    resource: describe(&current, context.as_deref()),
                });
            }

            if is_last {
                let resolved = links
                    .into_iter()
                    .map(|l| expand_and_resolve(l, &hop, context.as_deref()))
                    .collect::<Result<Vec<_>>>()?;
                return Ok((FinalOutcome::Links(resolved), context));
            }

            let link = expand_and_resolve(links[0], &hop, context.as_deref())?;
            tracing::debug!(rel = %hop.rel, href = %link.href, "hop requires a fetch");
            current = fetch(self.resolver.as_ref(), &link)?;
            context = Some(link.href.clone());
        }

        Ok((FinalOutcome::Document(current), context))
    }
}

/// Lazy sequence of all results of a traversal's final hop.
///
/// Embedded items are yielded directly; remaining links are fetched one per
/// [`next`](Iterator::next) call.
pub struct ResourceStream {
    resolver: Arc<dyn LinkResolver>,
    embedded: std::vec::IntoIter<Representation>,
    links: std::vec::IntoIter<Link>,
}

impl Iterator for ResourceStream {
    type Item = Result<Representation>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(rep) = self.embedded.next() {
            return Some(Ok(rep));
        }
        let link = self.links.next()?;
        Some(fetch(self.resolver.as_ref(), &link))
    }
}

/// Lazy typed variant of [`ResourceStream`].
pub struct TypedStream<T> {
    inner: ResourceStream,
    type_info: Vec<EmbeddedTypeInfo>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: serde::de::DeserializeOwned> Iterator for TypedStream<T> {
    type Item = Result<TypedResource<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        let rep = match self.inner.next()? {
            Ok(rep) => rep,
            Err(e) => return Some(Err(e)),
        };
        Some(codec::decode_typed(&rep, &self.type_info))
    }
}

/// Fetches and decodes one link through the transport collaborator.
fn fetch(resolver: &dyn LinkResolver, link: &Link) -> Result<Representation> {
    tracing::trace!(href = %link.href, "resolving link");
    let text = resolver
        .resolve(link)
        .map_err(|source| HalError::Transport {
            href: link.href.clone(),
            source,
        })?;
    codec::parse_hal(&text, &link.href)
}

/// Expands a templated href with the hop's variables and resolves it
/// against the context URL.
///
/// A href still carrying template expressions after expansion is a
/// programming error and fails fast, before the resolver is consulted.
fn expand_and_resolve(link: &Link, hop: &Hop, context: Option<&str>) -> Result<Link> {
    let href = if link.templated {
        template::expand(&link.href, &hop.vars)?
    } else {
        link.href.clone()
    };
    if href.contains('{') {
        return Err(HalError::Config(format!(
            "link for rel '{}' is still templated after expansion: '{href}'",
            hop.rel
        )));
    }
    Ok(link.with_href(resolve_href(context, &href)?))
}

/// Resolves a possibly-relative href against the context URL.
///
/// Absolute hrefs pass through; relative hrefs join an absolute context;
/// with no usable context the href passes through for the resolver to
/// interpret.
fn resolve_href(context: Option<&str>, href: &str) -> Result<String> {
    if Url::parse(href).is_ok() {
        return Ok(href.to_string());
    }
    match context.and_then(|c| Url::parse(c).ok()) {
        Some(base) => base
            .join(href)
            .map(Into::into)
            .map_err(|e| HalError::Config(format!("cannot resolve '{href}' against context: {e}"))),
        None => Ok(href.to_string()),
    }
}

/// Names a resource for error messages: context URL, else self link, else a
/// placeholder.
fn describe(rep: &Representation, context: Option<&str>) -> String {
    rep.link("self")
        .map(|l| l.href.clone())
        .or_else(|| context.map(String::from))
        .unwrap_or_else(|| "<in-memory>".to_string())
}

fn has_relative_hrefs(rep: &Representation) -> bool {
    rep.links()
        .iter()
        .flat_map(|(_, links)| links)
        .any(|l| Url::parse(&l.href).is_err())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_href_absolute_passthrough() {
        let href = resolve_href(Some("http://example.com/a/"), "http://other.org/x").unwrap();
        assert_eq!(href, "http://other.org/x");
    }

    #[test]
    fn test_resolve_href_joins_relative_against_context() {
        let href = resolve_href(Some("http://example.com/a/b"), "c").unwrap();
        assert_eq!(href, "http://example.com/a/c");
        let href = resolve_href(Some("http://example.com/a/b"), "/root").unwrap();
        assert_eq!(href, "http://example.com/root");
    }

    #[test]
    fn test_resolve_href_without_context_passes_through() {
        assert_eq!(resolve_href(None, "/b").unwrap(), "/b");
        assert_eq!(resolve_href(Some("/relative"), "/b").unwrap(), "/b");
    }

    #[test]
    fn test_terminal_without_start_is_config_error() {
        let resolver = Arc::new(|_: &Link| -> std::result::Result<String, crate::BoxError> {
            panic!("must not be called")
        });
        let err = Traverson::new(resolver).follow("next").get_resource().unwrap_err();
        assert!(matches!(err, HalError::Config(_)));
    }

    #[test]
    fn test_start_with_resource_rejects_ambiguous_relative_hrefs() {
        let rep: Representation = serde_json::from_value(serde_json::json!({
            "_links": {"next": {"href": "/b"}}
        }))
        .unwrap();
        let resolver = Arc::new(|_: &Link| -> std::result::Result<String, crate::BoxError> {
            panic!("must not be called")
        });
        let err = Traverson::new(resolver).start_with_resource(rep).unwrap_err();
        assert!(matches!(err, HalError::Config(_)));
    }

    #[test]
    fn test_start_with_resource_accepts_self_link_as_context() {
        let rep: Representation = serde_json::from_value(serde_json::json!({
            "_links": {"self": {"href": "http://example.com/a"}, "next": {"href": "/b"}}
        }))
        .unwrap();
        let resolver = Arc::new(|link: &Link| -> std::result::Result<String, crate::BoxError> {
            assert_eq!(link.href, "http://example.com/b");
            Ok(r#"{"_links":{"self":{"href":"http://example.com/b"}}}"#.into())
        });
        let resource = Traverson::new(resolver)
            .start_with_resource(rep)
            .unwrap()
            .follow("next")
            .get_resource()
            .unwrap();
        assert_eq!(resource.link("self").unwrap().href, "http://example.com/b");
    }

    #[test]
    fn test_still_templated_link_fails_fast() {
        let rep: Representation = serde_json::from_value(serde_json::json!({
            "_links": {
                "self": {"href": "http://example.com/"},
                "search": {"href": "http://example.com/search{broken"}
            }
        }))
        .unwrap();
        let resolver = Arc::new(|_: &Link| -> std::result::Result<String, crate::BoxError> {
            panic!("must not be called")
        });
        let err = Traverson::new(resolver)
            .start_with_resource(rep)
            .unwrap()
            .follow("search")
            .get_resource()
            .unwrap_err();
        assert!(matches!(err, HalError::Config(_)));
    }
}
