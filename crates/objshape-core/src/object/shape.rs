//! DirectShape elements and the collection they are published in.

use super::{Mesh, Node, Value};
use crate::RevitCategory;

/// A converted element: arbitrary mesh geometry tagged with a category.
///
/// A DirectShape always owns at least one mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectShape {
    name: String,
    category: RevitCategory,
    base_geometries: Vec<Mesh>,
}

impl DirectShape {
    /// Type tag of a published DirectShape.
    pub const SPECKLE_TYPE: &'static str = "Objects.BuiltElements.Revit.DirectShape";

    /// Creates a DirectShape, or `None` when `meshes` is empty.
    pub fn new(name: impl Into<String>, category: RevitCategory, meshes: Vec<Mesh>) -> Option<Self> {
        if meshes.is_empty() {
            return None;
        }

        Some(Self {
            name: name.into(),
            category,
            base_geometries: meshes,
        })
    }

    /// Human readable label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Category tag.
    pub fn category(&self) -> RevitCategory {
        self.category
    }

    /// Owned meshes, in display order.
    pub fn meshes(&self) -> &[Mesh] {
        &self.base_geometries
    }

    /// Units of the first mesh that declares any.
    pub fn units(&self) -> Option<&str> {
        self.base_geometries.iter().find_map(Mesh::units)
    }

    /// Builds the publishable node.
    ///
    /// Besides the geometry, the node carries `categoryName` and a second
    /// reference to the meshes under `@displayValue` so viewers that only
    /// look for display values render it.
    pub fn to_node(&self) -> Node {
        let meshes: Vec<Value> = self
            .base_geometries
            .iter()
            .cloned()
            .map(Value::from)
            .collect();

        let mut node = Node::new(Self::SPECKLE_TYPE)
            .with_property("name", self.name.as_str())
            .with_property("category", self.category.code())
            .with_property("categoryName", self.category.name())
            .with_property("baseGeometries", meshes.clone())
            .with_property("@displayValue", meshes);

        if let Some(units) = self.units() {
            node.insert("units", units);
        }

        node
    }
}

/// A named container forming the root object of a published version.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    name: String,
    collection_type: String,
    elements: Vec<DirectShape>,
}

impl Collection {
    /// Type tag of a collection.
    pub const SPECKLE_TYPE: &'static str = "Speckle.Core.Models.Collection";

    /// Creates a collection of converted elements.
    pub fn new(
        name: impl Into<String>,
        collection_type: impl Into<String>,
        elements: Vec<DirectShape>,
    ) -> Self {
        Self {
            name: name.into(),
            collection_type: collection_type.into(),
            elements,
        }
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Collection type tag, e.g. `Directly shaped model`.
    pub fn collection_type(&self) -> &str {
        &self.collection_type
    }

    /// Owned elements.
    pub fn elements(&self) -> &[DirectShape] {
        &self.elements
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true when the collection holds no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Builds the publishable root node.
    pub fn to_node(&self) -> Node {
        let elements: Vec<Value> = self
            .elements
            .iter()
            .map(|shape| Value::from(shape.to_node()))
            .collect();

        Node::new(Self::SPECKLE_TYPE)
            .with_property("name", self.name.as_str())
            .with_property("collectionType", self.collection_type.as_str())
            .with_property("elements", elements)
    }
}
