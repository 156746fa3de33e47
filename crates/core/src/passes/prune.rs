use super::map_fields;
use crate::error::Result;
use crate::ir::{Composite, Node};
use crate::validation::{Cursor, Limits};
use std::collections::HashSet;

/// Remove every field named in `unwanted`, at any depth and on any type
///
/// # Errors
///
/// Returns [`crate::Error::DepthExceeded`] past the depth limit.
pub fn prune(node: &Node, unwanted: &HashSet<String>, limits: &Limits) -> Result<Node> {
    prune_node(node, unwanted, &mut Cursor::new(limits))
}

fn prune_node(node: &Node, unwanted: &HashSet<String>, cursor: &mut Cursor<'_>) -> Result<Node> {
    match node {
        Node::Scalar(_) => Ok(node.clone()),
        Node::Composite(c) => {
            let fields = map_fields(c, cursor, |name, value, cursor| {
                if unwanted.contains(name) {
                    return Ok(None);
                }
                Ok(Some((name.to_owned(), prune_node(value, unwanted, cursor)?)))
            })?;
            Ok(Node::Composite(Composite::from_parts(c.type_id().cloned(), fields)))
        }
    }
}
