//! Tagged object model.
//!
//! A received version is a graph of [`Node`]s: each node has a type tag and
//! an ordered property map whose [`Value`]s are scalars, nested nodes, untagged
//! maps or lists of them. Conversion produces [`DirectShape`]s owning
//! [`Mesh`]es, bundled into a [`Collection`] for publishing.

mod mesh;
mod node;
mod shape;

pub use mesh::Mesh;
pub use node::{ID_KEY, Node, TYPE_KEY, Value};
pub use shape::{Collection, DirectShape};
