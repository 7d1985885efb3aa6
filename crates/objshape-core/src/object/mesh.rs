//! Mesh geometry.

use std::sync::Arc;

use super::{Node, Value};
use crate::kit;

/// A mesh node found in an object's display value.
///
/// The vertex and face payload stays opaque: the mesh is published exactly
/// as it was received.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh(Arc<Node>);

impl Mesh {
    /// Type tag identifying mesh geometry.
    pub const SPECKLE_TYPE: &'static str = "Objects.Geometry.Mesh";

    /// Wraps a node if the kit classifies it as a mesh.
    pub fn from_node(node: Arc<Node>) -> Option<Self> {
        (kit::classify(&node) == Some(Self::SPECKLE_TYPE)).then_some(Self(node))
    }

    /// Returns the underlying node.
    pub fn node(&self) -> &Arc<Node> {
        &self.0
    }

    /// Returns the length units of the mesh, if declared.
    pub fn units(&self) -> Option<&str> {
        self.0.get("units").and_then(Value::as_str)
    }
}

impl From<Mesh> for Value {
    fn from(mesh: Mesh) -> Self {
        Value::Node(mesh.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_node_requires_mesh_type() {
        let mesh = Node::new(Mesh::SPECKLE_TYPE).with_property("units", "mm");
        let mesh = Mesh::from_node(Arc::new(mesh)).unwrap();
        assert_eq!(mesh.units(), Some("mm"));

        assert!(Mesh::from_node(Arc::new(Node::new("Objects.Geometry.Line"))).is_none());
    }

    #[test]
    fn test_from_node_accepts_mesh_subtypes() {
        let mesh = Node::new("Objects.Geometry.Mesh:Objects.Custom.ObjMesh");
        assert!(Mesh::from_node(Arc::new(mesh)).is_some());
    }
}
