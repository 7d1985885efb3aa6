//! Object graph (de)serialization for the object endpoints.
//!
//! Uploads detach every child node: the child is written as its own object
//! and replaced in its parent by a reference carrying the child's id. Each
//! object also lists all of its descendants in a `__closure` table of
//! `id -> depth`, which the server uses to stream a whole graph back.
//!
//! Downloads reverse this. The server returns the root with all of its
//! descendants as one flat JSON array; references are resolved against it,
//! and an object referenced from several places becomes a single shared
//! node.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;
use objshape_core::object::{ID_KEY, TYPE_KEY};
use objshape_core::{Node, ObjectId, Value};
use serde_json::{Map, json};
use sha2::{Digest, Sha256};

use crate::connect::TRACING_TARGET;
use crate::error::{Error, Result};

/// Type tag of a detached child reference.
pub const REFERENCE_TYPE: &str = "reference";

/// Property holding the id of a referenced object.
pub const REFERENCED_ID_KEY: &str = "referencedId";

/// Property holding the descendant table of an object.
pub const CLOSURE_KEY: &str = "__closure";

/// Property holding the descendant count of an object.
pub const TOTAL_CHILDREN_KEY: &str = "totalChildrenCount";

/// Length of an object id in hex characters.
pub const OBJECT_ID_LEN: usize = 32;

/// Serialized size at which a new upload batch is started.
pub const MAX_BATCH_BYTES: usize = 10 * 1024 * 1024;

/// Computes the content id of a serialized object.
///
/// The id is the first 32 hex characters of the SHA-256 of the object's
/// JSON with any `id` property removed.
pub fn object_id(object: &Map<String, serde_json::Value>) -> Result<ObjectId> {
    let mut object = object.clone();
    object.shift_remove(ID_KEY);

    let bytes = serde_json::to_vec(&object)?;
    let digest = hex::encode(Sha256::digest(&bytes));
    Ok(ObjectId::new(&digest[..OBJECT_ID_LEN]))
}

/// Serialized upload of an object graph.
#[derive(Debug)]
pub struct Upload {
    /// Id of the root object.
    pub root_id: ObjectId,
    /// JSON arrays of objects, each below [`MAX_BATCH_BYTES`] unless a
    /// single object is larger.
    pub batches: Vec<String>,
    /// Number of distinct objects in all batches.
    pub object_count: usize,
}

/// Serializes `root` and its descendants into upload batches.
pub fn prepare_upload(root: &Node) -> Result<Upload> {
    let mut serializer = Serializer::default();
    let (root_id, _) = serializer.write_node(root)?;

    let object_count = serializer.objects.len();
    let mut batches = Vec::new();
    let mut batch = Vec::new();
    let mut batch_bytes = 0;

    for object in serializer.objects.into_values() {
        if !batch.is_empty() && batch_bytes + object.len() > MAX_BATCH_BYTES {
            batches.push(format!("[{}]", batch.join(",")));
            batch.clear();
            batch_bytes = 0;
        }
        batch_bytes += object.len() + 1;
        batch.push(object);
    }
    if !batch.is_empty() {
        batches.push(format!("[{}]", batch.join(",")));
    }

    tracing::debug!(
        target: TRACING_TARGET,
        root_id = %root_id,
        object_count,
        batch_count = batches.len(),
        "Prepared object upload"
    );

    Ok(Upload {
        root_id,
        batches,
        object_count,
    })
}

/// Descendant ids of an object with their minimum depth.
type Closure = IndexMap<ObjectId, u32>;

#[derive(Default)]
struct Serializer {
    /// Serialized objects by id, children before parents.
    objects: IndexMap<ObjectId, String>,
    /// Already written nodes by address.
    written: HashMap<usize, (ObjectId, Arc<Closure>)>,
}

impl Serializer {
    fn write_node(&mut self, node: &Node) -> Result<(ObjectId, Arc<Closure>)> {
        let mut closure = Closure::new();
        let mut object = Map::new();
        object.insert(TYPE_KEY.to_owned(), json!(node.speckle_type()));
        for (name, value) in node.properties() {
            let value = self.write_value(value, &mut closure)?;
            object.insert(name.to_owned(), value);
        }

        let id = object_id(&object)?;
        let mut serialized = Map::with_capacity(object.len() + 3);
        serialized.insert(ID_KEY.to_owned(), json!(id.as_str()));
        serialized.extend(object);
        serialized.insert(TOTAL_CHILDREN_KEY.to_owned(), json!(closure.len()));
        if !closure.is_empty() {
            let table: Map<_, _> = closure
                .iter()
                .map(|(id, depth)| (id.to_string(), json!(depth)))
                .collect();
            serialized.insert(CLOSURE_KEY.to_owned(), serde_json::Value::Object(table));
        }

        if !self.objects.contains_key(&id) {
            let text = serde_json::to_string(&serialized)?;
            self.objects.insert(id.clone(), text);
        }

        Ok((id, Arc::new(closure)))
    }

    fn write_child(&mut self, node: &Arc<Node>, closure: &mut Closure) -> Result<serde_json::Value> {
        let address = Arc::as_ptr(node).addr();
        let (id, child_closure) = match self.written.get(&address) {
            Some(written) => written.clone(),
            None => {
                let written = self.write_node(node)?;
                self.written.insert(address, written.clone());
                written
            }
        };

        merge_depth(closure, id.clone(), 1);
        for (descendant, depth) in child_closure.iter() {
            merge_depth(closure, descendant.clone(), depth + 1);
        }

        Ok(json!({
            REFERENCED_ID_KEY: id.as_str(),
            TYPE_KEY: REFERENCE_TYPE,
        }))
    }

    fn write_value(&mut self, value: &Value, closure: &mut Closure) -> Result<serde_json::Value> {
        Ok(match value {
            Value::Node(node) => self.write_child(node, closure)?,
            Value::List(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|item| self.write_value(item, closure))
                    .collect::<Result<_>>()?,
            ),
            Value::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| Ok((key.clone(), self.write_value(value, closure)?)))
                    .collect::<Result<_>>()?,
            ),
            scalar => scalar.to_json(),
        })
    }
}

fn merge_depth(closure: &mut Closure, id: ObjectId, depth: u32) {
    closure
        .entry(id)
        .and_modify(|current| *current = (*current).min(depth))
        .or_insert(depth);
}

/// Rebuilds the node graph rooted at `root_id` from downloaded objects.
///
/// References that cannot be found among `objects` are kept as reference
/// nodes and logged. A reference cycle is an error.
pub fn resolve(objects: Vec<serde_json::Value>, root_id: &ObjectId) -> Result<Arc<Node>> {
    let mut resolver = Resolver::new(objects)?;
    let root = resolver.resolve(root_id.as_str())?;

    tracing::debug!(
        target: TRACING_TARGET,
        root_id = %root_id,
        object_count = resolver.resolved.len(),
        unresolved = resolver.unresolved,
        "Resolved object graph"
    );

    Ok(root)
}

struct Resolver {
    /// Raw objects by id, taken out once resolved.
    pending: HashMap<String, Map<String, serde_json::Value>>,
    resolved: HashMap<String, Arc<Node>>,
    in_progress: HashSet<String>,
    unresolved: usize,
}

impl Resolver {
    fn new(objects: Vec<serde_json::Value>) -> Result<Self> {
        let mut pending = HashMap::with_capacity(objects.len());
        for object in objects {
            let serde_json::Value::Object(object) = object else {
                return Err(Error::Object("downloaded object is not a JSON object".into()));
            };
            let Some(id) = object.get(ID_KEY).and_then(serde_json::Value::as_str) else {
                return Err(Error::Object("downloaded object has no id".into()));
            };
            pending.insert(id.to_owned(), object);
        }

        Ok(Self {
            pending,
            resolved: HashMap::new(),
            in_progress: HashSet::new(),
            unresolved: 0,
        })
    }

    fn resolve(&mut self, id: &str) -> Result<Arc<Node>> {
        if let Some(node) = self.resolved.get(id) {
            return Ok(Arc::clone(node));
        }
        if self.in_progress.contains(id) {
            return Err(Error::Object(format!("reference cycle through object {id}")));
        }
        let Some(object) = self.pending.remove(id) else {
            return Err(Error::Object(format!("object {id} was not downloaded")));
        };

        self.in_progress.insert(id.to_owned());
        let node = Arc::new(self.read_node(object)?);
        self.in_progress.remove(id);

        self.resolved.insert(id.to_owned(), Arc::clone(&node));
        Ok(node)
    }

    fn read_node(&mut self, mut object: Map<String, serde_json::Value>) -> Result<Node> {
        let speckle_type = match object.shift_remove(TYPE_KEY) {
            Some(serde_json::Value::String(tag)) => tag,
            _ => return Err(Error::Object(format!("object has no `{TYPE_KEY}` tag"))),
        };
        object.shift_remove(CLOSURE_KEY);

        let mut node = Node::new(speckle_type);
        if let Some(serde_json::Value::String(id)) = object.shift_remove(ID_KEY) {
            node = node.with_id(id);
        }
        for (name, value) in object {
            let value = self.read_value(value)?;
            node.insert(name, value);
        }

        Ok(node)
    }

    fn read_value(&mut self, value: serde_json::Value) -> Result<Value> {
        match value {
            serde_json::Value::Array(items) => Ok(Value::List(
                items
                    .into_iter()
                    .map(|item| self.read_value(item))
                    .collect::<Result<_>>()?,
            )),
            serde_json::Value::Object(object) => self.read_object(object),
            scalar => Ok(Value::from(scalar)),
        }
    }

    fn read_object(&mut self, object: Map<String, serde_json::Value>) -> Result<Value> {
        let is_reference = object
            .get(TYPE_KEY)
            .and_then(serde_json::Value::as_str)
            .map(|tag| tag == REFERENCE_TYPE);

        match is_reference {
            Some(true) => {
                let Some(id) = object
                    .get(REFERENCED_ID_KEY)
                    .and_then(serde_json::Value::as_str)
                else {
                    return Err(Error::Object("reference has no referenced id".into()));
                };

                if self.resolved.contains_key(id)
                    || self.pending.contains_key(id)
                    || self.in_progress.contains(id)
                {
                    return Ok(Value::Node(self.resolve(id)?));
                }

                tracing::warn!(
                    target: TRACING_TARGET,
                    referenced_id = id,
                    "Referenced object was not downloaded, keeping the reference"
                );
                self.unresolved += 1;
                Ok(Value::from(serde_json::Value::Object(object)))
            }
            Some(false) => Ok(Value::Node(Arc::new(self.read_node(object)?))),
            None => Ok(Value::Map(
                object
                    .into_iter()
                    .map(|(key, value)| Ok((key, self.read_value(value)?)))
                    .collect::<Result<_>>()?,
            )),
        }
    }
}
