use super::map_fields;
use crate::error::Result;
use crate::ir::{Composite, Node};
use crate::naming::camel_to_snake;
use crate::validation::{Cursor, Limits};

/// Rewrite every field name in the tree to snake_case, regardless of type
///
/// # Errors
///
/// Returns [`crate::Error::MalformedNode`] when two fields of one composite
/// normalise to the same name (`userId` next to `user_id`) and
/// [`crate::Error::DepthExceeded`] past the limit.
pub fn normalize_case(node: &Node, limits: &Limits) -> Result<Node> {
    normalize_node(node, &mut Cursor::new(limits))
}

fn normalize_node(node: &Node, cursor: &mut Cursor<'_>) -> Result<Node> {
    let Node::Composite(c) = node else {
        return Ok(node.clone());
    };

    let fields = map_fields(c, cursor, |name, value, cursor| {
        Ok(Some((camel_to_snake(name), normalize_node(value, cursor)?)))
    })?;
    Ok(Node::Composite(Composite::from_parts(c.type_id().cloned(), fields)))
}
