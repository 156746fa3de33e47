//! Property-based tests for the rewrite passes.
//!
//! These tests verify the behavioral contracts of each pass:
//! - Idempotence: running a pass twice gives the same tree as running it once
//! - Order: surviving fields keep their relative order
//! - Scope: type-scoped passes leave other types untouched
//!
//! `@value` wrappers only come from `wrapped_node_strategy`; the other trees
//! never contain them.

use hypershape_core::naming::camel_to_snake;
use hypershape_core::passes::{
    delete_fields, flatten, normalize_case, promote_type, prune, rename, unwrap_scalars,
};
use hypershape_core::{Composite, Limits, Node, TypeId};
use indexmap::IndexMap;
use proptest::prelude::*;
use std::collections::HashSet;

// =============================================================================
// Strategies for generating test data
// =============================================================================

/// Field names, including camelCase and the reserved serializer keys
fn field_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        8 => "[a-z][a-zA-Z]{0,6}".prop_map(String::from),
        1 => Just("@scalar".to_string()),
        1 => Just("@map".to_string()),
    ]
}

fn scalar_strategy() -> impl Strategy<Value = Node> {
    prop_oneof![
        Just(Node::null()),
        any::<bool>().prop_map(Node::from),
        any::<i64>().prop_map(Node::from),
        "[a-z ]{0,8}".prop_map(Node::from),
    ]
}

fn type_strategy() -> impl Strategy<Value = Option<&'static str>> {
    prop_oneof![
        Just(None),
        Just(Some("App\\Model\\Post")),
        Just(Some("App\\Model\\User")),
    ]
}

fn composite_of(type_id: Option<&'static str>, fields: Vec<(String, Node)>) -> Node {
    let mut composite = type_id.map_or_else(Composite::new, Composite::typed);
    for (name, value) in fields {
        composite.insert(name, value);
    }
    Node::Composite(composite)
}

/// Arbitrary trees without `@value` wrappers
fn node_strategy() -> impl Strategy<Value = Node> {
    scalar_strategy().prop_recursive(4, 48, 4, |inner| {
        (
            type_strategy(),
            prop::collection::vec((field_name_strategy(), inner), 0..4),
        )
            .prop_map(|(type_id, fields)| composite_of(type_id, fields))
    })
}

/// Trees where scalars, lists and whole objects may sit inside one or more
/// `{"@value": v}` wrappers
fn wrapped_node_strategy() -> impl Strategy<Value = Node> {
    scalar_strategy().prop_recursive(5, 48, 4, |inner| {
        prop_oneof![
            inner
                .clone()
                .prop_map(|value| Node::Composite(Composite::new().with_field("@value", value))),
            prop::collection::vec(inner.clone(), 0..4).prop_map(|items| {
                let fields = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| (i.to_string(), item))
                    .collect();
                composite_of(None, fields)
            }),
            (
                type_strategy(),
                prop::collection::vec(("[a-z]{1,6}", inner), 0..4),
            )
                .prop_map(|(type_id, fields)| composite_of(type_id, fields)),
        ]
    })
}

fn reserved() -> HashSet<String> {
    ["@scalar".to_string(), "@map".to_string()].into()
}

fn contains_key(node: &Node, key: &str) -> bool {
    node.as_composite().is_some_and(|c| {
        c.get(key).is_some() || c.fields().values().any(|v| contains_key(v, key))
    })
}

fn has_type_tag(node: &Node) -> bool {
    node.as_composite()
        .is_some_and(|c| c.type_id().is_some() || c.fields().values().any(has_type_tag))
}

/// True when every composite not typed `scope` kept its type and field names,
/// and every subtree below it compares the same way
fn unchanged_outside(before: &Node, after: &Node, scope: &TypeId) -> bool {
    let (Node::Composite(b), Node::Composite(a)) = (before, after) else {
        return before == after;
    };
    if b.type_id() != a.type_id() {
        return false;
    }
    if b.type_id() != Some(scope) && !b.keys().eq(a.keys()) {
        return false;
    }
    if b.len() == a.len() {
        b.fields()
            .values()
            .zip(a.fields().values())
            .all(|(x, y)| unchanged_outside(x, y, scope))
    } else {
        a.fields()
            .iter()
            .all(|(name, y)| b.get(name).is_some_and(|x| unchanged_outside(x, y, scope)))
    }
}

fn scope_has_field(node: &Node, scope: &TypeId, field: &str) -> bool {
    node.as_composite().is_some_and(|c| {
        (c.type_id() == Some(scope) && c.get(field).is_some())
            || c.fields().values().any(|v| scope_has_field(v, scope, field))
    })
}

// =============================================================================
// Idempotence
// =============================================================================

proptest! {
    #[test]
    fn prune_is_idempotent(node in node_strategy()) {
        let limits = Limits::default();
        let once = prune(&node, &reserved(), &limits).unwrap();
        let twice = prune(&once, &reserved(), &limits).unwrap();
        prop_assert!(!contains_key(&once, "@scalar"));
        prop_assert!(!contains_key(&once, "@map"));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn unwrap_without_markers_is_identity(node in node_strategy()) {
        let out = unwrap_scalars(&node, &Limits::default()).unwrap();
        prop_assert_eq!(out, node);
    }

    #[test]
    fn unwrap_is_idempotent(node in wrapped_node_strategy()) {
        let limits = Limits::default();
        let once = unwrap_scalars(&node, &limits).unwrap();
        prop_assert!(!contains_key(&once, "@value"));
        let twice = unwrap_scalars(&once, &limits).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn flatten_is_idempotent(node in node_strategy()) {
        let limits = Limits::default();
        let once = flatten(&node, &limits).unwrap();
        let twice = flatten(&once, &limits).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalize_case_is_idempotent(node in node_strategy()) {
        let limits = Limits::default();
        // Sibling names such as `aBc` and `aBC` collide; those trees are rejected
        if let Ok(once) = normalize_case(&node, &limits) {
            let twice = normalize_case(&once, &limits).unwrap();
            prop_assert_eq!(once, twice);
        }
    }

    #[test]
    fn promote_is_idempotent_and_strips_types(node in node_strategy()) {
        let limits = Limits::default();
        let once = promote_type(&node, &limits).unwrap();
        prop_assert!(!has_type_tag(&once));
        let twice = promote_type(&once, &limits).unwrap();
        prop_assert_eq!(once, twice);
    }
}

// =============================================================================
// Order and scope
// =============================================================================

proptest! {
    #[test]
    fn prune_keeps_relative_order(node in node_strategy()) {
        let Some(before) = node.as_composite() else {
            return Ok(());
        };
        let out = prune(&node, &reserved(), &Limits::default()).unwrap();
        let after = out.as_composite().unwrap();

        let expected: Vec<_> = before.keys().filter(|k| !k.starts_with('@')).collect();
        prop_assert_eq!(after.keys().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn scoped_passes_ignore_unmapped_types(node in node_strategy(), field in "[a-z]{1,6}") {
        let limits = Limits::default();
        let scope = TypeId::new("App\\Model\\Comment");

        let hidden: HashSet<String> = [field.clone()].into();
        prop_assert_eq!(&delete_fields(&node, &scope, &hidden, &limits).unwrap(), &node);

        let table: IndexMap<String, String> = [(field, "renamed".to_string())].into_iter().collect();
        prop_assert_eq!(&rename(&node, &scope, &table, &limits).unwrap(), &node);
    }

    #[test]
    fn scoped_passes_leave_other_types_untouched(
        inner in node_strategy(),
        sibling in node_strategy(),
        field in "[a-z]{1,6}",
    ) {
        let limits = Limits::default();
        let scope = TypeId::new("App\\Model\\Post");
        let node = Node::Composite(
            Composite::typed("App\\Model\\Post")
                .with_field(field.clone(), inner)
                .with_field("sibling", sibling),
        );

        let hidden: HashSet<String> = [field.clone()].into();
        let deleted = delete_fields(&node, &scope, &hidden, &limits).unwrap();
        prop_assert!(unchanged_outside(&node, &deleted, &scope));
        prop_assert!(!scope_has_field(&deleted, &scope, &field));

        // A Post that already has a `renamed` field collides and is rejected
        let table: IndexMap<String, String> =
            [(field.clone(), "renamed".to_string())].into_iter().collect();
        if let Ok(renamed) = rename(&node, &scope, &table, &limits) {
            prop_assert!(unchanged_outside(&node, &renamed, &scope));
            prop_assert!(!scope_has_field(&renamed, &scope, &field));
        }
    }

    #[test]
    fn scalars_pass_through_every_pass(scalar in scalar_strategy()) {
        let limits = Limits::default();
        let scope = TypeId::new("App\\Model\\Post");
        prop_assert_eq!(&prune(&scalar, &reserved(), &limits).unwrap(), &scalar);
        prop_assert_eq!(&flatten(&scalar, &limits).unwrap(), &scalar);
        prop_assert_eq!(&delete_fields(&scalar, &scope, &reserved(), &limits).unwrap(), &scalar);
        prop_assert_eq!(&normalize_case(&scalar, &limits).unwrap(), &scalar);
        prop_assert_eq!(&promote_type(&scalar, &limits).unwrap(), &scalar);
    }
}

// =============================================================================
// Naming
// =============================================================================

proptest! {
    #[test]
    fn camel_to_snake_is_idempotent(s in "[a-zA-Z_]{0,16}") {
        let once = camel_to_snake(&s);
        prop_assert_eq!(camel_to_snake(&once), once.clone());
        prop_assert!(!once.chars().any(char::is_uppercase));
    }

    #[test]
    fn camel_to_snake_preserves_letters(s in "[a-zA-Z]{0,16}") {
        let once = camel_to_snake(&s);
        let letters: String = once.chars().filter(|c| *c != '_').collect();
        prop_assert_eq!(letters, s.to_lowercase());
    }
}
