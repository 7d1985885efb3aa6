//! Tagged object nodes and their property values.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number};

use crate::{Error, ObjectId, Result};

/// JSON key holding the type tag of an object.
pub const TYPE_KEY: &str = "speckle_type";

/// JSON key holding the content id of an object.
pub const ID_KEY: &str = "id";

/// Separator between the segments of an inherited type tag,
/// e.g. `Objects.Geometry.Mesh:Objects.Custom.ObjMesh`.
const TYPE_SEPARATOR: char = ':';

/// A property value attached to a [`Node`].
///
/// The set of variants is closed: scalars, nested nodes, untagged maps and
/// lists of any of them. Untagged maps are kept structurally so nodes nested
/// inside them stay reachable.
#[derive(Debug, Clone, PartialEq, Default)]
#[derive(Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Value {
    /// Missing or explicit null.
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Numeric scalar.
    Number(Number),
    /// String scalar.
    String(String),
    /// Nested tagged object.
    Node(Arc<Node>),
    /// Ordered sequence of values.
    List(Vec<Value>),
    /// Object without a type tag.
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Returns the nested node, if this value is one.
    pub fn as_node(&self) -> Option<&Arc<Node>> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Returns the string, if this value is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the nodes directly held by this value, looking through lists
    /// and untagged maps but never into another node's properties.
    pub fn nodes(&self) -> Vec<&Arc<Node>> {
        let mut out = Vec::new();
        self.collect_nodes(&mut out);
        out
    }

    fn collect_nodes<'a>(&'a self, out: &mut Vec<&'a Arc<Node>>) {
        match self {
            Self::Node(node) => out.push(node),
            Self::List(items) => items.iter().for_each(|item| item.collect_nodes(out)),
            Self::Map(entries) => entries.values().for_each(|item| item.collect_nodes(out)),
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_) => {}
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => match Node::from_map(map) {
                Ok(node) => Self::Node(Arc::new(node)),
                Err(map) => Self::Map(
                    map.into_iter()
                        .map(|(key, value)| (key, Self::from(value)))
                        .collect(),
                ),
            },
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        value.to_json()
    }
}

impl Value {
    /// Converts this value back into plain JSON.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Node(node) => node.to_json(),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<Arc<Node>> for Value {
    fn from(node: Arc<Node>) -> Self {
        Self::Node(node)
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Self::Node(Arc::new(node))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

/// A tagged object in a model version.
///
/// Nodes carry a type tag, an optional content id and an ordered property
/// map. Children are the nodes reachable through the property values.
/// Nodes are immutable once shared behind an [`Arc`].
#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub struct Node {
    id: Option<ObjectId>,
    speckle_type: String,
    properties: IndexMap<String, Value>,
}

impl Node {
    /// Type tag of the plain base object.
    pub const BASE_TYPE: &'static str = "Base";

    /// Creates an empty node with the given type tag.
    pub fn new(speckle_type: impl Into<String>) -> Self {
        Self {
            id: None,
            speckle_type: speckle_type.into(),
            properties: IndexMap::new(),
        }
    }

    /// Creates an empty plain base object.
    pub fn base() -> Self {
        Self::new(Self::BASE_TYPE)
    }

    /// Sets the content id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<ObjectId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Adds or replaces a property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds or replaces a property in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Returns the content id, if assigned.
    pub fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    /// Returns the full type tag.
    pub fn speckle_type(&self) -> &str {
        &self.speckle_type
    }

    /// Iterates the segments of the type tag, most general first.
    pub fn type_segments(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.speckle_type.split(TYPE_SEPARATOR)
    }

    /// Returns a property by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Returns the first present, non-null property among `names`.
    pub fn get_any(&self, names: &[&str]) -> Option<&Value> {
        names
            .iter()
            .filter_map(|name| self.properties.get(*name))
            .find(|value| !value.is_null())
    }

    /// Iterates over properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of properties, excluding the id and type tag.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns true when the node has no properties.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Parses a JSON object, handing the map back when it has no type tag.
    fn from_map(mut map: Map<String, serde_json::Value>) -> Result<Self, Map<String, serde_json::Value>> {
        let speckle_type = match map.get(TYPE_KEY) {
            Some(serde_json::Value::String(tag)) => tag.clone(),
            _ => return Err(map),
        };
        map.shift_remove(TYPE_KEY);

        let id = match map.shift_remove(ID_KEY) {
            Some(serde_json::Value::String(id)) => Some(ObjectId::new(id)),
            _ => None,
        };

        let properties = map
            .into_iter()
            .map(|(key, value)| (key, Value::from(value)))
            .collect();

        Ok(Self {
            id,
            speckle_type,
            properties,
        })
    }

    /// Converts this node into plain JSON, id and type tag first.
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = Map::with_capacity(self.properties.len() + 2);
        if let Some(id) = &self.id {
            map.insert(ID_KEY.to_owned(), serde_json::Value::String(id.to_string()));
        }
        map.insert(
            TYPE_KEY.to_owned(),
            serde_json::Value::String(self.speckle_type.clone()),
        );
        for (key, value) in &self.properties {
            map.insert(key.clone(), value.to_json());
        }
        serde_json::Value::Object(map)
    }
}

impl TryFrom<serde_json::Value> for Node {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(map) = value else {
            return Err(Error::serialization().with_message("Object payload is not a JSON object"));
        };

        Node::from_map(map).map_err(|_| {
            Error::serialization().with_message(format!("Object payload has no `{TYPE_KEY}` tag"))
        })
    }
}

impl From<Node> for serde_json::Value {
    fn from(node: Node) -> Self {
        node.to_json()
    }
}
