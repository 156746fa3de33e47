//! Shared-reference input graphs
//!
//! Producers that reuse sub-objects (the same author on every post, a parent
//! pointer back up the tree) build a [`Graph`] and hand over a root handle.
//! [`Graph::to_tree`] materialises an owned [`Node`] tree, duplicating shared
//! nodes and rejecting cycles.

use crate::error::{Error, Result};
use crate::ir::{Composite, Fields, Node, Scalar, TypeId};
use crate::validation::{Cursor, Limits, render_path};
use petgraph::algo::{astar, is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};
use std::collections::HashSet;

/// Handle to a node inside a [`Graph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(NodeIndex);

impl NodeId {
    /// Position of the node in insertion order
    #[must_use]
    pub fn index(self) -> usize {
        self.0.index()
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Scalar(Scalar),
    Composite(Option<TypeId>),
}

/// IR nodes whose composite fields are edges weighted with the field name
///
/// Field order is edge insertion order. Nodes and edges are never removed, so
/// edge indices grow monotonically and sorting by them restores that order.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    graph: DiGraph<Slot, String>,
}

impl Graph {
    /// An empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a leaf
    pub fn scalar(&mut self, value: impl Into<Scalar>) -> NodeId {
        NodeId(self.graph.add_node(Slot::Scalar(value.into())))
    }

    /// Add an empty composite
    pub fn composite(&mut self, type_id: Option<TypeId>) -> NodeId {
        NodeId(self.graph.add_node(Slot::Composite(type_id)))
    }

    /// Point field `name` of `parent` at `child`
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedNode`] if `parent` is not a composite of this
    /// graph, `child` is unknown, or `parent` already has a field `name`.
    pub fn link(&mut self, parent: NodeId, name: impl Into<String>, child: NodeId) -> Result<()> {
        let name = name.into();
        let location = format!("node #{}", parent.index());
        if self.graph.node_weight(child.0).is_none() {
            return Err(Error::malformed(
                location,
                format!("field '{name}' refers to unknown node #{}", child.index()),
            ));
        }
        match self.graph.node_weight(parent.0) {
            Some(Slot::Composite(_)) => {}
            Some(Slot::Scalar(_)) => {
                return Err(Error::malformed(location, "cannot add a field to a scalar"));
            }
            None => return Err(Error::malformed(location, "unknown node")),
        }
        if self.graph.edges(parent.0).any(|edge| *edge.weight() == name) {
            return Err(Error::malformed(location, format!("duplicate field '{name}'")));
        }
        self.graph.add_edge(parent.0, child.0, name);
        Ok(())
    }

    /// Number of nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// True when the graph holds no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Materialise the tree rooted at `root`
    ///
    /// # Errors
    ///
    /// Returns [`Error::CyclicStructure`] when a cycle is reachable from
    /// `root`, [`Error::DepthExceeded`] past the depth limit,
    /// [`Error::NodeLimitExceeded`] once shared nodes expand past the node
    /// budget and [`Error::MalformedNode`] for an unknown root.
    pub fn to_tree(&self, root: NodeId, limits: &Limits) -> Result<Node> {
        if self.graph.node_weight(root.0).is_none() {
            return Err(Error::malformed(
                "$",
                format!("unknown node #{}", root.index()),
            ));
        }
        self.reject_cycles(root.0)?;

        let mut expanded = 0;
        self.materialise(root.0, &mut expanded, &mut Cursor::new(limits))
    }

    /// Fields of a composite in insertion order
    fn fields(&self, id: NodeIndex) -> Vec<(&str, NodeIndex)> {
        let mut edges: Vec<_> = self.graph.edges(id).collect();
        edges.sort_by_key(|edge| edge.id());
        edges
            .into_iter()
            .map(|edge| (edge.weight().as_str(), edge.target()))
            .collect()
    }

    fn reject_cycles(&self, root: NodeIndex) -> Result<()> {
        if !is_cyclic_directed(&self.graph) {
            return Ok(());
        }

        let mut reachable = HashSet::new();
        let mut dfs = Dfs::new(&self.graph, root);
        while let Some(node) = dfs.next(&self.graph) {
            reachable.insert(node);
        }

        for component in tarjan_scc(&self.graph) {
            let Some(&node) = component.first() else {
                continue;
            };
            let cyclic = component.len() > 1 || self.graph.contains_edge(node, node);
            if cyclic && reachable.contains(&node) {
                return Err(Error::cyclic(self.cycle_path(root, node)));
            }
        }
        Ok(())
    }

    /// Path from `root` into the cycle through `node` and once around it
    fn cycle_path(&self, root: NodeIndex, node: NodeIndex) -> String {
        let mut nodes = self.shortest_path(root, node).unwrap_or_default();
        let back = self
            .fields(node)
            .into_iter()
            .find_map(|(_, child)| self.shortest_path(child, node));
        nodes.extend(back.unwrap_or_default());

        let segments: Vec<String> = nodes
            .windows(2)
            .filter_map(|pair| match pair {
                [from, to] => self
                    .graph
                    .find_edge(*from, *to)
                    .and_then(|edge| self.graph.edge_weight(edge))
                    .cloned(),
                _ => None,
            })
            .collect();
        render_path(&segments)
    }

    fn shortest_path(&self, from: NodeIndex, to: NodeIndex) -> Option<Vec<NodeIndex>> {
        astar(&self.graph, from, |n| n == to, |_| 1_usize, |_| 0_usize).map(|(_, path)| path)
    }

    fn materialise(
        &self,
        id: NodeIndex,
        expanded: &mut usize,
        cursor: &mut Cursor<'_>,
    ) -> Result<Node> {
        *expanded += 1;
        let limit = cursor.limits().max_nodes;
        if *expanded > limit {
            return Err(Error::node_limit_exceeded(cursor.path(), limit));
        }

        match self.graph.node_weight(id) {
            Some(Slot::Scalar(value)) => Ok(Node::Scalar(value.clone())),
            Some(Slot::Composite(type_id)) => {
                let fields = self.fields(id);
                let mut out = Fields::with_capacity(fields.len());
                for (name, child) in fields {
                    let node = cursor.descend(name, |c| self.materialise(child, expanded, c))?;
                    out.insert(name.to_owned(), node);
                }
                Ok(Node::Composite(Composite::from_parts(type_id.clone(), out)))
            }
            None => Err(Error::malformed(
                cursor.path(),
                format!("unknown node #{}", id.index()),
            )),
        }
    }
}
