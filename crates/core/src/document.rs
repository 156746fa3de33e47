//! Pipeline output: the rewritten tree plus its navigation links

use crate::ir::Node;
use serde_json::{Map, Value, json};

/// Navigation links attached to a document
///
/// Built once per request and passed by reference into the pipeline, so
/// concurrent runs never share mutable link state. Empty URLs count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links {
    self_url: Option<String>,
    first: Option<String>,
    last: Option<String>,
    prev: Option<String>,
    next: Option<String>,
}

fn non_empty(url: impl Into<String>) -> Option<String> {
    Some(url.into()).filter(|u| !u.is_empty())
}

impl Links {
    /// No links
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `self` link
    #[must_use]
    pub fn with_self(mut self, url: impl Into<String>) -> Self {
        self.self_url = non_empty(url);
        self
    }

    /// Set the `first` page link
    #[must_use]
    pub fn with_first(mut self, url: impl Into<String>) -> Self {
        self.first = non_empty(url);
        self
    }

    /// Set the `last` page link
    #[must_use]
    pub fn with_last(mut self, url: impl Into<String>) -> Self {
        self.last = non_empty(url);
        self
    }

    /// Set the `prev` page link
    #[must_use]
    pub fn with_prev(mut self, url: impl Into<String>) -> Self {
        self.prev = non_empty(url);
        self
    }

    /// Set the `next` page link
    #[must_use]
    pub fn with_next(mut self, url: impl Into<String>) -> Self {
        self.next = non_empty(url);
        self
    }

    /// The `self` link
    #[must_use]
    pub fn self_url(&self) -> Option<&str> {
        self.self_url.as_deref()
    }

    /// The `first` page link
    #[must_use]
    pub fn first_url(&self) -> Option<&str> {
        self.first.as_deref()
    }

    /// The `last` page link
    #[must_use]
    pub fn last_url(&self) -> Option<&str> {
        self.last.as_deref()
    }

    /// The `prev` page link
    #[must_use]
    pub fn prev_url(&self) -> Option<&str> {
        self.prev.as_deref()
    }

    /// The `next` page link
    #[must_use]
    pub fn next_url(&self) -> Option<&str> {
        self.next.as_deref()
    }

    /// Set links as `(relation, url)` in self, first, last, prev, next order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("self", &self.self_url),
            ("first", &self.first),
            ("last", &self.last),
            ("prev", &self.prev),
            ("next", &self.next),
        ]
        .into_iter()
        .filter_map(|(rel, url)| url.as_deref().map(|u| (rel, u)))
    }

    /// True when no link is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Encode as `{"self": {"href": ...}, ...}`
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (rel, url) in self.iter() {
            map.insert(rel.to_owned(), json!({ "href": url }));
        }
        Value::Object(map)
    }
}

/// A transformed tree with its links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    body: Node,
    links: Links,
}

impl Document {
    pub(crate) fn new(body: Node, links: Links) -> Self {
        Self { body, links }
    }

    /// The rewritten tree
    #[must_use]
    pub fn body(&self) -> &Node {
        &self.body
    }

    /// The attached links
    #[must_use]
    pub fn links(&self) -> &Links {
        &self.links
    }

    /// Take the rewritten tree
    #[must_use]
    pub fn into_body(self) -> Node {
        self.body
    }

    /// Encode as `{"data": ..., "links": {...}}`, leaving out empty links
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("data".to_owned(), self.body.to_json());
        if !self.links.is_empty() {
            map.insert("links".to_owned(), self.links.to_json());
        }
        Value::Object(map)
    }
}
