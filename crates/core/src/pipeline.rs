//! Pass ordering and the transformer entry points
//!
//! A run resolves every type tag first, then applies, in this order: prune,
//! unwrap, flatten, per-type rename, per-type delete, case normalisation and
//! type promotion. Either the whole run succeeds or no output is produced.

use crate::codec::{MAP_TYPE_KEY, SCALAR_TYPE_KEY};
use crate::document::{Document, Links};
use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};
use crate::ir::{Node, TypeId};
use crate::mapping::{Mapping, MappingLookup};
use crate::passes;
use crate::validation::{Cursor, Limits};
use std::collections::HashSet;

/// How promoted containers are named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerKey {
    /// snake_case short class name (`App\Model\BlogPost` gives `blog_post`)
    #[default]
    TypeName,
    /// The mapping's alias
    Alias,
}

/// Configuration builder for a [`Transformer`]
#[derive(Debug, Clone)]
pub struct TransformerBuilder {
    limits: Limits,
    reserved_keys: HashSet<String>,
    container_key: ContainerKey,
}

impl Default for TransformerBuilder {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            reserved_keys: [SCALAR_TYPE_KEY, MAP_TYPE_KEY]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            container_key: ContainerKey::default(),
        }
    }
}

impl TransformerBuilder {
    /// Creates a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum nesting depth
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.limits.max_depth = depth;
        self
    }

    /// Set the node budget for materialising shared-reference graphs
    #[must_use]
    pub fn max_nodes(mut self, nodes: usize) -> Self {
        self.limits.max_nodes = nodes;
        self
    }

    /// Replace the set of keys stripped by the prune pass
    #[must_use]
    pub fn reserved_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Add one key to the set stripped by the prune pass
    #[must_use]
    pub fn reserve_key(mut self, key: impl Into<String>) -> Self {
        self.reserved_keys.insert(key.into());
        self
    }

    /// Choose how promoted containers are named
    #[must_use]
    pub fn container_key(mut self, key: ContainerKey) -> Self {
        self.container_key = key;
        self
    }

    /// Build the transformer around a mapping lookup
    #[must_use]
    pub fn build<M: MappingLookup>(self, mappings: M) -> Transformer<M> {
        Transformer {
            mappings,
            limits: self.limits,
            reserved_keys: self.reserved_keys,
            container_key: self.container_key,
        }
    }
}

/// One-way transformer from serializer IR to hypermedia documents
///
/// Holds no per-request state: links travel with each call, so one
/// transformer can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct Transformer<M> {
    mappings: M,
    limits: Limits,
    reserved_keys: HashSet<String>,
    container_key: ContainerKey,
}

impl Transformer<()> {
    /// Create a new builder
    #[must_use]
    pub fn builder() -> TransformerBuilder {
        TransformerBuilder::new()
    }
}

impl<M: MappingLookup> Transformer<M> {
    /// A transformer with default configuration
    #[must_use]
    pub fn new(mappings: M) -> Self {
        TransformerBuilder::new().build(mappings)
    }

    /// The limits enforced by every pass
    #[must_use]
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// The mapping lookup in use
    #[must_use]
    pub fn mappings(&self) -> &M {
        &self.mappings
    }

    /// Rewrite `ir` and attach `links`
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] if any type tag is unmapped,
    /// [`Error::MalformedNode`] for invariant violations and
    /// [`Error::DepthExceeded`] past the depth limit.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn transform(&self, ir: &Node, links: &Links) -> Result<Document> {
        match self.run(ir) {
            Ok(body) => Ok(Document::new(body, links.clone())),
            Err(e) => {
                tracing::warn!(error = %e, "Transformation failed");
                Err(e)
            }
        }
    }

    /// Materialise a shared-reference graph and transform it
    ///
    /// # Errors
    ///
    /// Returns [`Error::CyclicStructure`] if the graph loops back on itself,
    /// otherwise the errors of [`Transformer::transform`].
    pub fn transform_graph(&self, graph: &Graph, root: NodeId, links: &Links) -> Result<Document> {
        let tree = graph.to_tree(root, &self.limits)?;
        self.transform(&tree, links)
    }

    /// Decode a tagged JSON document and transform it
    ///
    /// # Errors
    ///
    /// Returns decoding errors or the errors of [`Transformer::transform`].
    pub fn transform_json(&self, input: &str, links: &Links) -> Result<Document> {
        let tree = Node::from_tagged_str(input, &self.limits)?;
        self.transform(&tree, links)
    }

    /// Rebuild IR from a document; always fails
    ///
    /// # Errors
    ///
    /// Always returns [`Error::UnsupportedOperation`]: renamed, hidden and
    /// flattened fields cannot be restored without the source schema.
    pub fn reverse(&self, _document: &Document) -> Result<Node> {
        Err(Error::unsupported("deserialize"))
    }

    /// Rebuild IR from an encoded document; always fails
    ///
    /// # Errors
    ///
    /// Always returns [`Error::UnsupportedOperation`].
    pub fn reverse_json(&self, _input: &str) -> Result<Node> {
        Err(Error::unsupported("deserialize"))
    }

    fn run(&self, ir: &Node) -> Result<Node> {
        let limits = &self.limits;
        let types = resolve_types(ir, &self.mappings, limits)?;
        tracing::debug!(types = types.len(), "Resolved type tags");

        let mut node = passes::prune(ir, &self.reserved_keys, limits)?;
        tracing::debug!(pass = "prune", "Pass complete");
        node = passes::unwrap_scalars(&node, limits)?;
        tracing::debug!(pass = "unwrap", "Pass complete");
        node = passes::flatten(&node, limits)?;
        tracing::debug!(pass = "flatten", "Pass complete");

        for mapping in &types {
            if mapping.rename_table().is_empty() {
                continue;
            }
            tracing::trace!(type_id = %mapping.type_id(), "Applying renames");
            node = passes::rename(&node, mapping.type_id(), mapping.rename_table(), limits)?;
        }
        tracing::debug!(pass = "rename", "Pass complete");

        for mapping in &types {
            let hidden = mapping.hidden_after_rename();
            if hidden.is_empty() {
                continue;
            }
            tracing::trace!(type_id = %mapping.type_id(), "Hiding fields");
            node = passes::delete_fields(&node, mapping.type_id(), &hidden, limits)?;
        }
        tracing::debug!(pass = "delete", "Pass complete");

        node = passes::normalize_case(&node, limits)?;
        tracing::debug!(pass = "case", "Pass complete");

        node = match self.container_key {
            ContainerKey::TypeName => passes::promote_type(&node, limits)?,
            ContainerKey::Alias => {
                let alias = |type_id: &TypeId| {
                    self.mappings
                        .lookup(type_id)
                        .map_or_else(|| type_id.container_key(), Mapping::alias)
                };
                passes::promote_type_with(&node, limits, &alias)?
            }
        };
        tracing::debug!(pass = "promote", "Pass complete");

        Ok(node)
    }
}

/// Transform `ir` with default configuration
///
/// # Errors
///
/// See [`Transformer::transform`].
pub fn transform<M: MappingLookup>(ir: &Node, mappings: M, links: &Links) -> Result<Document> {
    Transformer::new(mappings).transform(ir, links)
}

/// Check every type tag against `mappings`
///
/// Returns the mappings of the distinct types present, in order of first
/// appearance.
fn resolve_types<'m, M: MappingLookup>(
    node: &Node,
    mappings: &'m M,
    limits: &Limits,
) -> Result<Vec<&'m Mapping>> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    collect_types(node, mappings, &mut seen, &mut found, &mut Cursor::new(limits))?;
    Ok(found)
}

fn collect_types<'m, M: MappingLookup>(
    node: &Node,
    mappings: &'m M,
    seen: &mut HashSet<TypeId>,
    found: &mut Vec<&'m Mapping>,
    cursor: &mut Cursor<'_>,
) -> Result<()> {
    let Node::Composite(c) = node else {
        return Ok(());
    };

    if let Some(type_id) = c.type_id()
        && !seen.contains(type_id)
    {
        let mapping = mappings
            .lookup(type_id)
            .ok_or_else(|| Error::unknown_type(type_id.as_str(), cursor.path()))?;
        seen.insert(type_id.clone());
        found.push(mapping);
    }

    for (name, value) in c.fields() {
        cursor.descend(name, |cur| collect_types(value, mappings, seen, found, cur))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Composite;
    use crate::mapping::MappingRegistry;

    fn registry() -> MappingRegistry {
        MappingRegistry::new([
            Mapping::new("App\\Model\\Post")
                .with_alias("message")
                .rename("title", "headline")
                .hide("internalId"),
            Mapping::new("App\\Model\\User"),
        ])
        .unwrap()
    }

    #[test]
    fn test_resolve_types_in_first_appearance_order() {
        let registry = registry();
        let tree = Node::Composite(
            Composite::typed("App\\Model\\User").with_field(
                "posts",
                Composite::new()
                    .with_field("0", Composite::typed("App\\Model\\Post"))
                    .with_field("1", Composite::typed("App\\Model\\Post")),
            ),
        );
        let types = resolve_types(&tree, &registry, &Limits::default()).unwrap();
        let names: Vec<_> = types.iter().map(|m| m.type_id().as_str()).collect();
        assert_eq!(names, vec!["App\\Model\\User", "App\\Model\\Post"]);
    }

    #[test]
    fn test_unknown_type_reports_path() {
        let registry = registry();
        let tree = Node::Composite(
            Composite::typed("App\\Model\\User").with_field("pet", Composite::typed("Foo\\Bar")),
        );
        let err = Transformer::new(&registry)
            .transform(&tree, &Links::new())
            .unwrap_err();
        match err {
            Error::UnknownType { type_id, path } => {
                assert_eq!(type_id, "Foo\\Bar");
                assert_eq!(path, "$.pet");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_full_run() {
        let registry = registry();
        let tree = Node::Composite(
            Composite::typed("App\\Model\\Post")
                .with_field("@scalar", "object")
                .with_field("internalId", Composite::new().with_field("@value", 9))
                .with_field("title", Composite::new().with_field("@value", "Hello"))
                .with_field("viewCount", Composite::new().with_field("@value", 3)),
        );
        let doc = Transformer::new(&registry)
            .transform(&tree, &Links::new().with_self("/posts/1"))
            .unwrap();

        let expected = Node::Composite(Composite::new().with_field(
            "post",
            Composite::new()
                .with_field("headline", "Hello")
                .with_field("view_count", 3),
        ));
        assert_eq!(doc.body(), &expected);
        assert_eq!(doc.links().self_url(), Some("/posts/1"));
    }

    #[test]
    fn test_alias_container_key() {
        let registry = registry();
        let tree = Node::Composite(Composite::typed("App\\Model\\Post").with_field("body", "x"));
        let doc = Transformer::builder()
            .container_key(ContainerKey::Alias)
            .build(&registry)
            .transform(&tree, &Links::new())
            .unwrap();
        let keys: Vec<_> = doc.body().as_composite().unwrap().keys().collect();
        assert_eq!(keys, vec!["message"]);
    }

    #[test]
    fn test_custom_reserved_keys() {
        let registry = registry();
        let tree = Node::Composite(
            Composite::typed("App\\Model\\User")
                .with_field("_links", "internal")
                .with_field("name", "Ann")
                .with_field("age", 30),
        );
        let doc = Transformer::builder()
            .reserve_key("_links")
            .build(&registry)
            .transform(&tree, &Links::new())
            .unwrap();
        let user = doc
            .body()
            .as_composite()
            .and_then(|c| c.get("user"))
            .and_then(Node::as_composite)
            .unwrap();
        assert_eq!(user.keys().collect::<Vec<_>>(), vec!["name", "age"]);
    }

    #[test]
    fn test_reverse_always_fails() {
        let registry = registry();
        let transformer = Transformer::new(&registry);
        let doc = transformer
            .transform(&Node::from("x"), &Links::new())
            .unwrap();
        assert!(matches!(
            transformer.reverse(&doc),
            Err(Error::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            transformer.reverse_json("{}"),
            Err(Error::UnsupportedOperation { .. })
        ));
    }
}
