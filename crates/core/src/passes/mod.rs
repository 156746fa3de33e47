//! Tree rewrite passes
//!
//! Each pass borrows its input and returns a freshly built tree. All of them
//! walk through a [`Cursor`], so the depth limit applies everywhere and
//! errors carry the path of the offending node.

mod case;
mod delete;
mod promote;
mod prune;
mod rename;
mod scalars;

pub use case::normalize_case;
pub use delete::delete_fields;
pub use promote::{promote_type, promote_type_with};
pub use prune::prune;
pub use rename::rename;
pub use scalars::{flatten, unwrap_scalars};

use crate::error::{Error, Result};
use crate::ir::{Composite, Fields, Node};
use crate::validation::Cursor;

/// Rebuild the fields of `composite` through `f`
///
/// `f` sees each field with the cursor positioned on it and returns the new
/// name and value, or `None` to drop the field. Survivors keep their relative
/// order. Two survivors ending up under one name is a [`Error::MalformedNode`].
pub(crate) fn map_fields<F>(composite: &Composite, cursor: &mut Cursor<'_>, mut f: F) -> Result<Fields>
where
    F: FnMut(&str, &Node, &mut Cursor<'_>) -> Result<Option<(String, Node)>>,
{
    let mut out = Fields::with_capacity(composite.len());
    for (name, value) in composite.fields() {
        let Some((new_name, new_value)) = cursor.descend(name, |c| f(name, value, c))? else {
            continue;
        };
        if out.contains_key(&new_name) {
            return Err(Error::malformed(
                cursor.path(),
                format!("field '{name}' collides with existing field '{new_name}'"),
            ));
        }
        out.insert(new_name, new_value);
    }
    Ok(out)
}
