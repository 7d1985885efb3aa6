//! Display geometry extraction and DirectShape conversion.

use std::sync::Arc;

use crate::TRACING_TARGET_CONVERT;
use crate::category::{CategoryPolicy, RevitCategory};
use crate::object::{DirectShape, Mesh, Node};
use crate::traverse::{DISPLAY_VALUE_KEYS, traverse};

/// Returns the meshes in a node's display value.
///
/// The display value may be a single node or a list of them; entries that
/// are not meshes are dropped.
pub fn display_meshes(node: &Node) -> Vec<Mesh> {
    let Some(display_value) = node.get_any(DISPLAY_VALUE_KEYS) else {
        return Vec::new();
    };

    display_value
        .nodes()
        .into_iter()
        .filter_map(|node| Mesh::from_node(Arc::clone(node)))
        .collect()
}

/// Converts a node into a DirectShape of an already validated category.
pub fn convert_with(node: &Node, category: RevitCategory) -> Option<DirectShape> {
    let meshes = display_meshes(node);
    DirectShape::new(format!("A {category} from OBJ"), category, meshes)
}

/// Converts a node into a DirectShape tagged with `category`.
///
/// Returns `None` when the node is absent, the category is not a known
/// [`RevitCategory`] name, or the node has no mesh display geometry.
/// Unknown categories are skipped, never raised.
pub fn convert(node: Option<&Node>, category: &str) -> Option<DirectShape> {
    let category = CategoryPolicy::Skip.resolve(category)?;
    convert_with(node?, category)
}

/// Traverses `root` and converts every node with mesh display geometry.
pub fn convert_all(root: Arc<Node>, category: RevitCategory) -> Vec<DirectShape> {
    let mut visited = 0_usize;
    let shapes: Vec<DirectShape> = traverse(root)
        .filter_map(|context| {
            visited += 1;
            let shape = convert_with(&context.node, category);
            if shape.is_none() {
                tracing::debug!(
                    target: TRACING_TARGET_CONVERT,
                    speckle_type = context.node.speckle_type(),
                    object_id = context.node.id().map(|id| id.as_str()),
                    "Skipping node without mesh display value"
                );
            }
            shape
        })
        .collect();

    tracing::info!(
        target: TRACING_TARGET_CONVERT,
        visited,
        converted = shapes.len(),
        category = %category,
        "Converted display geometry"
    );

    shapes
}
