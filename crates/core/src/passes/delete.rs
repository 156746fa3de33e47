use super::map_fields;
use crate::error::Result;
use crate::ir::{Composite, Node, TypeId};
use crate::validation::{Cursor, Limits};
use std::collections::HashSet;

/// Drop the `hidden` fields of composites typed `scope`
///
/// A field with the same name on a composite of another type is kept.
///
/// # Errors
///
/// Returns [`crate::Error::DepthExceeded`] past the depth limit.
pub fn delete_fields(
    node: &Node,
    scope: &TypeId,
    hidden: &HashSet<String>,
    limits: &Limits,
) -> Result<Node> {
    delete_node(node, scope, hidden, &mut Cursor::new(limits))
}

fn delete_node(
    node: &Node,
    scope: &TypeId,
    hidden: &HashSet<String>,
    cursor: &mut Cursor<'_>,
) -> Result<Node> {
    let Node::Composite(c) = node else {
        return Ok(node.clone());
    };

    let in_scope = c.type_id() == Some(scope);
    let fields = map_fields(c, cursor, |name, value, cursor| {
        if in_scope && hidden.contains(name) {
            return Ok(None);
        }
        Ok(Some((name.to_owned(), delete_node(value, scope, hidden, cursor)?)))
    })?;
    Ok(Node::Composite(Composite::from_parts(c.type_id().cloned(), fields)))
}
