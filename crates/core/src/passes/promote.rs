use super::map_fields;
use crate::error::Result;
use crate::ir::{Composite, Fields, Node, TypeId};
use crate::validation::{Cursor, Limits};

/// Replace each typed composite by `{short_type_name: fields}`
///
/// `App\Model\BlogPost` becomes a `blog_post` container. The type tag is
/// cleared on the way, so the output carries no type tags at all.
///
/// # Errors
///
/// Returns [`crate::Error::DepthExceeded`] past the depth limit.
pub fn promote_type(node: &Node, limits: &Limits) -> Result<Node> {
    promote_type_with(node, limits, &TypeId::container_key)
}

/// Like [`promote_type`], with `key` choosing the container name for a type
///
/// # Errors
///
/// Returns [`crate::Error::DepthExceeded`] past the depth limit.
pub fn promote_type_with(
    node: &Node,
    limits: &Limits,
    key: &dyn Fn(&TypeId) -> String,
) -> Result<Node> {
    promote_node(node, key, &mut Cursor::new(limits))
}

fn promote_node(node: &Node, key: &dyn Fn(&TypeId) -> String, cursor: &mut Cursor<'_>) -> Result<Node> {
    let Node::Composite(c) = node else {
        return Ok(node.clone());
    };

    let fields = map_fields(c, cursor, |name, value, cursor| {
        Ok(Some((name.to_owned(), promote_node(value, key, cursor)?)))
    })?;
    let inner = Composite::from_parts(None, fields);

    match c.type_id() {
        None => Ok(Node::Composite(inner)),
        Some(type_id) => {
            let mut wrapper = Fields::with_capacity(1);
            wrapper.insert(key(type_id), Node::Composite(inner));
            Ok(Node::Composite(Composite::from_parts(None, wrapper)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promote_book() {
        let input = Node::Composite(Composite::typed("App\\Model\\Book").with_field("title", "Dune"));
        let out = promote_type(&input, &Limits::default()).unwrap();
        let expected = Node::Composite(
            Composite::new().with_field("book", Composite::new().with_field("title", "Dune")),
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn test_promote_nested() {
        let input = Node::Composite(
            Composite::typed("App\\Model\\BlogPost").with_field(
                "author",
                Composite::typed("App\\Model\\User").with_field("name", "Ann"),
            ),
        );
        let out = promote_type(&input, &Limits::default()).unwrap();
        let expected = Node::Composite(Composite::new().with_field(
            "blog_post",
            Composite::new().with_field(
                "author",
                Composite::new().with_field("user", Composite::new().with_field("name", "Ann")),
            ),
        ));
        assert_eq!(out, expected);
    }

    #[test]
    fn test_promote_with_custom_key() {
        let input = Node::Composite(Composite::typed("App\\Model\\Post").with_field("n", 1));
        let out = promote_type_with(&input, &Limits::default(), &|_| "message".to_owned()).unwrap();
        assert_eq!(
            out.as_composite().unwrap().keys().collect::<Vec<_>>(),
            vec!["message"]
        );
    }
}
