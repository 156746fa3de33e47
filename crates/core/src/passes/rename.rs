use super::map_fields;
use crate::error::Result;
use crate::ir::{Composite, Node, TypeId};
use crate::validation::{Cursor, Limits};
use indexmap::IndexMap;

/// Rename fields of composites typed `scope` according to `rename_map`
///
/// Composites of any other type keep their field names, but their children
/// are still visited, so nested `scope` instances are renamed at every level.
///
/// # Errors
///
/// Returns [`crate::Error::MalformedNode`] when a rename collides with an
/// existing field and [`crate::Error::DepthExceeded`] past the limit.
pub fn rename(
    node: &Node,
    scope: &TypeId,
    rename_map: &IndexMap<String, String>,
    limits: &Limits,
) -> Result<Node> {
    rename_node(node, scope, rename_map, &mut Cursor::new(limits))
}

fn rename_node(
    node: &Node,
    scope: &TypeId,
    rename_map: &IndexMap<String, String>,
    cursor: &mut Cursor<'_>,
) -> Result<Node> {
    let Node::Composite(c) = node else {
        return Ok(node.clone());
    };

    let in_scope = c.type_id() == Some(scope);
    let fields = map_fields(c, cursor, |name, value, cursor| {
        let child = rename_node(value, scope, rename_map, cursor)?;
        let target = rename_map
            .get(name)
            .filter(|to| in_scope && !to.is_empty())
            .map_or_else(|| name.to_owned(), Clone::clone);
        Ok(Some((target, child)))
    })?;
    Ok(Node::Composite(Composite::from_parts(c.type_id().cloned(), fields)))
}
