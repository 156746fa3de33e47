//! Scalar unwrapping and one-field flattening

use super::map_fields;
use crate::codec::SCALAR_VALUE_KEY;
use crate::error::{Error, Result};
use crate::ir::{Composite, Node};
use crate::validation::{Cursor, Limits};

/// Replace every `{"@value": v}` wrapper by `v`
///
/// The replacement is unwrapped again, so wrappers nested inside wrappers
/// disappear in a single run.
///
/// # Errors
///
/// Returns [`Error::MalformedNode`] when `@value` shares its node with other
/// fields or with a type tag, and [`Error::DepthExceeded`] past the limit.
pub fn unwrap_scalars(node: &Node, limits: &Limits) -> Result<Node> {
    unwrap_node(node, &mut Cursor::new(limits))
}

fn unwrap_node(node: &Node, cursor: &mut Cursor<'_>) -> Result<Node> {
    let Node::Composite(c) = node else {
        return Ok(node.clone());
    };

    if let Some(inner) = c.get(SCALAR_VALUE_KEY) {
        if c.len() != 1 || c.type_id().is_some() {
            return Err(Error::malformed(
                cursor.path(),
                format!("'{SCALAR_VALUE_KEY}' must be the only field of an untyped node"),
            ));
        }
        return cursor.descend(SCALAR_VALUE_KEY, |cur| unwrap_node(inner, cur));
    }

    let fields = map_fields(c, cursor, |name, value, cursor| {
        Ok(Some((name.to_owned(), unwrap_node(value, cursor)?)))
    })?;
    Ok(Node::Composite(Composite::from_parts(c.type_id().cloned(), fields)))
}

/// Collapse untyped composites holding exactly one scalar field into that scalar
///
/// Children are flattened first, so a chain of one-field wrappers collapses
/// completely. Typed composites are never collapsed.
///
/// # Errors
///
/// Returns [`Error::DepthExceeded`] past the depth limit.
pub fn flatten(node: &Node, limits: &Limits) -> Result<Node> {
    flatten_node(node, &mut Cursor::new(limits))
}

fn flatten_node(node: &Node, cursor: &mut Cursor<'_>) -> Result<Node> {
    let Node::Composite(c) = node else {
        return Ok(node.clone());
    };

    let fields = map_fields(c, cursor, |name, value, cursor| {
        Ok(Some((name.to_owned(), flatten_node(value, cursor)?)))
    })?;

    if c.type_id().is_none()
        && fields.len() == 1
        && let Some((_, Node::Scalar(only))) = fields.first()
    {
        return Ok(Node::Scalar(only.clone()));
    }
    Ok(Node::Composite(Composite::from_parts(c.type_id().cloned(), fields)))
}
