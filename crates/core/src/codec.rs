//! Conversion between JSON and the IR
//!
//! The upstream serializer emits JSON where objects carry their class under
//! `@type`, primitives are wrapped as `{"@scalar": kind, "@value": v}` and
//! arrays as `{"@map": "array", "@value": [...]}`. Decoding consumes the
//! `@type` key into [`Composite::type_id`]; the wrapper keys stay ordinary
//! fields so the prune and unwrap passes can deal with them.

use crate::error::{Error, Result};
use crate::ir::{Composite, Fields, Node, Scalar, TypeId};
use crate::validation::{Cursor, Limits};
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Key holding an object's class
pub const TYPE_KEY: &str = "@type";
/// Key naming the primitive kind of a wrapped scalar
pub const SCALAR_TYPE_KEY: &str = "@scalar";
/// Key holding the payload of a wrapped scalar or array
pub const SCALAR_VALUE_KEY: &str = "@value";
/// Key naming the collection kind of a wrapped array
pub const MAP_TYPE_KEY: &str = "@map";

impl Node {
    /// Decode a tagged JSON value
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedNode`] when `@type` is not a non-empty string
    /// and [`Error::DepthExceeded`] when nesting passes `limits.max_depth`.
    pub fn from_tagged_json(value: &Value, limits: &Limits) -> Result<Self> {
        let raw = Raw::deserialize(value)
            .map_err(|e| Error::serialization(format!("invalid IR document: {e}")))?;
        decode(&raw, &mut Cursor::new(limits))
    }

    /// Parse and decode a tagged JSON document
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if `input` is not valid JSON,
    /// [`Error::MalformedNode`] when an object repeats a key, otherwise the
    /// errors of [`Node::from_tagged_json`].
    pub fn from_tagged_str(input: &str, limits: &Limits) -> Result<Self> {
        let raw: Raw = serde_json::from_str(input)
            .map_err(|e| Error::serialization(format!("invalid IR document: {e}")))?;
        decode(&raw, &mut Cursor::new(limits))
    }

    /// Encode as plain JSON
    ///
    /// A composite whose keys are exactly `"0"` to `"n-1"` in order becomes an
    /// array. A composite that still carries a type tag gets it back under
    /// `@type`. An empty composite always encodes as `{}`, even when it was
    /// decoded from `[]`, since the IR keeps no marker for the difference.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Scalar(s) => s.to_json(),
            Self::Composite(c) if c.type_id().is_none() && is_sequential(c) => {
                Value::Array(c.fields().values().map(Self::to_json).collect())
            }
            Self::Composite(c) => {
                let mut map = Map::with_capacity(c.len() + 1);
                if let Some(type_id) = c.type_id() {
                    map.insert(TYPE_KEY.to_owned(), Value::String(type_id.to_string()));
                }
                for (name, value) in c.fields() {
                    map.insert(name.clone(), value.to_json());
                }
                Value::Object(map)
            }
        }
    }
}

fn is_sequential(c: &Composite) -> bool {
    !c.is_empty() && c.keys().enumerate().all(|(i, key)| key == i.to_string())
}

/// JSON as written, with object entries in order and repeated keys kept
#[derive(Debug)]
enum Raw {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Raw>),
    Object(Vec<(String, Raw)>),
}

impl<'de> Deserialize<'de> for Raw {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(RawVisitor)
    }
}

struct RawVisitor;

impl<'de> Visitor<'de> for RawVisitor {
    type Value = Raw;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Raw, E> {
        Ok(Raw::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Raw, E> {
        Ok(Raw::Null)
    }

    fn visit_some<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> std::result::Result<Raw, D::Error> {
        Raw::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Raw, E> {
        Ok(Raw::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Raw, E> {
        Ok(Raw::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Raw, E> {
        Ok(Raw::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Raw, E> {
        Number::from_f64(v)
            .map(Raw::Number)
            .ok_or_else(|| E::custom("non-finite number"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Raw, E> {
        Ok(Raw::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Raw, E> {
        Ok(Raw::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Raw, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Raw::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Raw, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry::<String, Raw>()? {
            entries.push(entry);
        }
        Ok(Raw::Object(entries))
    }
}

fn decode(value: &Raw, cursor: &mut Cursor<'_>) -> Result<Node> {
    match value {
        Raw::Null => Ok(Node::Scalar(Scalar::Null)),
        Raw::Bool(b) => Ok(Node::Scalar(Scalar::Bool(*b))),
        Raw::Number(n) => Ok(Node::Scalar(Scalar::Number(n.clone()))),
        Raw::String(s) => Ok(Node::Scalar(Scalar::String(s.clone()))),
        Raw::Array(items) => {
            let mut fields = Fields::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let key = i.to_string();
                let child = cursor.descend(&key, |c| decode(item, c))?;
                fields.insert(key, child);
            }
            Ok(Node::Composite(Composite::from_parts(None, fields)))
        }
        Raw::Object(entries) => {
            let mut type_id = None;
            let mut fields = Fields::with_capacity(entries.len());
            for (key, item) in entries {
                if key == TYPE_KEY {
                    if type_id.is_some() {
                        return Err(duplicate(cursor, key));
                    }
                    type_id = match item {
                        Raw::String(s) if !s.is_empty() => Some(TypeId::new(s.as_str())),
                        _ => {
                            return Err(Error::malformed(
                                cursor.path(),
                                format!("'{TYPE_KEY}' must be a non-empty string"),
                            ));
                        }
                    };
                    continue;
                }
                if fields.contains_key(key) {
                    return Err(duplicate(cursor, key));
                }
                let child = cursor.descend(key, |c| decode(item, c))?;
                fields.insert(key.clone(), child);
            }
            Ok(Node::Composite(Composite::from_parts(type_id, fields)))
        }
    }
}

fn duplicate(cursor: &Cursor<'_>, key: &str) -> Error {
    Error::malformed(cursor.path(), format!("duplicate field '{key}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_typed_object() {
        let value = json!({
            "@type": "App\\Model\\Book",
            "title": {"@scalar": "string", "@value": "Dune"}
        });
        let node = Node::from_tagged_json(&value, &Limits::default()).unwrap();
        let book = node.as_composite().unwrap();
        assert_eq!(book.type_id().map(TypeId::as_str), Some("App\\Model\\Book"));
        assert_eq!(book.keys().collect::<Vec<_>>(), vec!["title"]);

        let title = book.get("title").and_then(Node::as_composite).unwrap();
        assert_eq!(title.get(SCALAR_VALUE_KEY), Some(&Node::from("Dune")));
    }

    #[test]
    fn test_decode_array_uses_index_keys() {
        let node = Node::from_tagged_json(&json!(["a", "b"]), &Limits::default()).unwrap();
        let list = node.as_composite().unwrap();
        assert_eq!(list.keys().collect::<Vec<_>>(), vec!["0", "1"]);
        assert!(list.type_id().is_none());
    }

    #[test]
    fn test_decode_rejects_empty_type() {
        let err = Node::from_tagged_json(&json!({"@type": ""}), &Limits::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedNode { .. }));
    }

    #[test]
    fn test_decode_rejects_non_string_type() {
        let value = json!({"inner": {"@type": 5}});
        let err = Node::from_tagged_json(&value, &Limits::default()).unwrap_err();
        assert!(err.to_string().contains("$.inner"));
    }

    #[test]
    fn test_decode_enforces_depth() {
        let value = json!({"a": {"b": {"c": 1}}});
        let limits = Limits {
            max_depth: 2,
            ..Limits::default()
        };
        let err = Node::from_tagged_json(&value, &limits).unwrap_err();
        assert!(matches!(err, Error::DepthExceeded { limit: 2, .. }));
    }

    #[test]
    fn test_from_tagged_str_invalid_json() {
        let err = Node::from_tagged_str("{not json", &Limits::default()).unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
    }

    #[test]
    fn test_to_json_sequential_keys_become_array() {
        let node = Node::Composite(
            Composite::new()
                .with_field("0", "x")
                .with_field("1", "y"),
        );
        assert_eq!(node.to_json(), json!(["x", "y"]));

        let gap = Node::Composite(Composite::new().with_field("0", "x").with_field("2", "y"));
        assert_eq!(gap.to_json(), json!({"0": "x", "2": "y"}));
    }

    #[test]
    fn test_to_json_empty_composite_is_object() {
        assert_eq!(Node::Composite(Composite::new()).to_json(), json!({}));

        let empty_list = Node::from_tagged_str("[]", &Limits::default()).unwrap();
        assert_eq!(empty_list.to_json(), json!({}));
    }

    #[test]
    fn test_from_tagged_str_rejects_duplicate_field() {
        let input = r#"{"@type":"Book","title":"Dune","title":"Emma"}"#;
        let err = Node::from_tagged_str(input, &Limits::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedNode { ref path, .. } if path == "$"));
        assert!(err.to_string().contains("duplicate field 'title'"));
    }

    #[test]
    fn test_from_tagged_str_rejects_nested_duplicate() {
        let input = r#"{"author": {"name": "Ann", "name": "Bob"}}"#;
        let err = Node::from_tagged_str(input, &Limits::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedNode { ref path, .. } if path == "$.author"));
    }

    #[test]
    fn test_from_tagged_str_rejects_repeated_type() {
        let input = r#"{"@type": "Book", "@type": "Film"}"#;
        let err = Node::from_tagged_str(input, &Limits::default()).unwrap_err();
        assert!(err.to_string().contains("duplicate field '@type'"));
    }

    #[test]
    fn test_from_tagged_str_keeps_numbers() {
        let input = r#"{"n": -3, "big": 18446744073709551615, "f": 1.5}"#;
        let node = Node::from_tagged_str(input, &Limits::default()).unwrap();
        assert_eq!(
            node.to_json(),
            json!({"n": -3, "big": 18_446_744_073_709_551_615_u64, "f": 1.5})
        );
    }

    #[test]
    fn test_to_json_keeps_type_tag() {
        let node = Node::Composite(Composite::typed("Book").with_field("title", "Dune"));
        assert_eq!(node.to_json(), json!({"@type": "Book", "title": "Dune"}));
    }
}
