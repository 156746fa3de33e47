//! The tagged tree consumed and produced by every pass

use crate::naming::camel_to_snake;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered field map of a [`Composite`]
pub type Fields = IndexMap<String, Node>;

/// Identifier of a mapped type, e.g. `App\Model\Book`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(String);

impl TypeId {
    /// Wrap a fully qualified type name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The fully qualified name
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name without any namespace or path prefix
    ///
    /// `App\Model\Book`, `app/model/Book`, `app.model.Book` and
    /// `app::model::Book` all reduce to `Book`.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.0
            .rsplit(['\\', '/', '.', ':'])
            .next()
            .unwrap_or(&self.0)
    }

    /// The short name in snake_case, used as a container key
    #[must_use]
    pub fn container_key(&self) -> String {
        camel_to_snake(self.short_name())
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A primitive leaf value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer or floating point number
    Number(serde_json::Number),
    /// Text
    String(String),
}

impl Scalar {
    /// Convert to the equivalent JSON value
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Value::Number(n.clone()),
            Self::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// A keyed collection, optionally tagged with the type it is an instance of
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Composite {
    type_id: Option<TypeId>,
    fields: Fields,
}

impl Composite {
    /// An empty untyped composite
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty composite tagged with `type_id`
    #[must_use]
    pub fn typed(type_id: impl Into<TypeId>) -> Self {
        Self {
            type_id: Some(type_id.into()),
            fields: Fields::new(),
        }
    }

    /// Assemble a composite from its parts
    #[must_use]
    pub fn from_parts(type_id: Option<TypeId>, fields: Fields) -> Self {
        Self { type_id, fields }
    }

    /// Append a field, replacing any existing value under the same name in place
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Node>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Insert a field, returning the value it replaced
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Node>) -> Option<Node> {
        self.fields.insert(name.into(), value.into())
    }

    /// The type tag, if any
    #[must_use]
    pub fn type_id(&self) -> Option<&TypeId> {
        self.type_id.as_ref()
    }

    /// Fields in insertion order
    #[must_use]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Look up a field by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.fields.get(name)
    }

    /// Field names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when there are no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Split into type tag and fields
    #[must_use]
    pub fn into_parts(self) -> (Option<TypeId>, Fields) {
        (self.type_id, self.fields)
    }
}

/// A node of the intermediate representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Primitive leaf
    Scalar(Scalar),
    /// Keyed collection
    Composite(Composite),
}

impl Node {
    /// The null scalar
    #[must_use]
    pub const fn null() -> Self {
        Self::Scalar(Scalar::Null)
    }

    /// Borrow as a scalar
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::Composite(_) => None,
        }
    }

    /// Borrow as a composite
    #[must_use]
    pub fn as_composite(&self) -> Option<&Composite> {
        match self {
            Self::Composite(c) => Some(c),
            Self::Scalar(_) => None,
        }
    }

    /// True for leaves
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }
}

impl From<Scalar> for Node {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<Composite> for Node {
    fn from(value: Composite) -> Self {
        Self::Composite(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<i32> for Node {
    fn from(value: i32) -> Self {
        Self::Scalar(value.into())
    }
}
