//! One step of a traversal.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::types::link::Link;

/// Predicate over candidate links of a hop.
///
/// The default selector accepts every link; pass a custom one to pick a
/// link by name, profile, media type, or anything else.
pub type LinkSelector = Arc<dyn Fn(&Link) -> bool + Send + Sync>;

/// One `follow` step in a traversal pipeline, consumed in FIFO order when a
/// terminal method runs.
#[derive(Clone)]
pub(crate) struct Hop {
    pub(crate) rel: String,
    pub(crate) selector: Option<LinkSelector>,
    pub(crate) vars: BTreeMap<String, String>,
    /// Forces link resolution even when a matching embedded item exists —
    /// used when only a partial object is embedded and the full resource
    /// must be fetched.
    pub(crate) ignore_embedded: bool,
}

impl std::fmt::Debug for Hop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hop")
            .field("rel", &self.rel)
            .field("has_selector", &self.selector.is_some())
            .field("vars", &self.vars)
            .field("ignore_embedded", &self.ignore_embedded)
            .finish()
    }
}

impl Hop {
    pub(crate) fn new(rel: impl Into<String>, ignore_embedded: bool) -> Self {
        Hop {
            rel: rel.into(),
            selector: None,
            vars: BTreeMap::new(),
            ignore_embedded,
        }
    }

    pub(crate) fn with_selector(mut self, selector: LinkSelector) -> Self {
        self.selector = Some(selector);
        self
    }

    pub(crate) fn with_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.vars
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// True iff `link` passes this hop's selector.
    pub(crate) fn accepts(&self, link: &Link) -> bool {
        self.selector.as_ref().map_or(true, |s| s(link))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selector_accepts_all() {
        let hop = Hop::new("item", false);
        assert!(hop.accepts(&Link::item("/items/1")));
    }

    #[test]
    fn test_custom_selector_filters() {
        let hop = Hop::new("item", false)
            .with_selector(Arc::new(|l: &Link| l.name.as_deref() == Some("b")));
        assert!(!hop.accepts(&Link::item("/items/1")));
        assert!(hop.accepts(&Link::item("/items/2").with_name("b")));
    }
}
