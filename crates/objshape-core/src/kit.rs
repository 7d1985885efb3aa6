//! Objects kit bootstrap.
//!
//! The kit is the set of object types this crate knows how to read and
//! write. The runner harness calls [`init`] before the first run; any
//! classification before that registers the kit on demand.

use std::sync::OnceLock;

use crate::TRACING_TARGET_KIT;
use crate::object::{Collection, DirectShape, Mesh, Node};

/// Type tag of chunked array payloads.
pub const DATA_CHUNK_TYPE: &str = "Speckle.Core.Models.DataChunk";

/// Type tags registered by the kit.
pub const KIT_TYPES: &[&str] = &[
    Node::BASE_TYPE,
    DATA_CHUNK_TYPE,
    Mesh::SPECKLE_TYPE,
    DirectShape::SPECKLE_TYPE,
    Collection::SPECKLE_TYPE,
];

static KIT: OnceLock<&'static [&'static str]> = OnceLock::new();

fn register() -> &'static [&'static str] {
    tracing::info!(
        target: TRACING_TARGET_KIT,
        types = ?KIT_TYPES,
        count = KIT_TYPES.len(),
        "Objects kit initialized"
    );
    KIT_TYPES
}

fn types() -> &'static [&'static str] {
    KIT.get_or_init(register)
}

/// Registers the kit types. Returns `true` on the first call only.
pub fn init() -> bool {
    let mut first = false;
    KIT.get_or_init(|| {
        first = true;
        register()
    });

    if !first {
        tracing::trace!(target: TRACING_TARGET_KIT, "Objects kit already initialized");
    }

    first
}

/// Returns true once the kit is registered.
pub fn is_initialized() -> bool {
    KIT.get().is_some()
}

/// Returns the most specific registered type of `node`.
///
/// Type tags list the inheritance chain most general first, so the last
/// registered segment wins. Returns `None` when no segment is registered.
pub fn classify(node: &Node) -> Option<&'static str> {
    let types = types();
    node.type_segments()
        .rev()
        .find_map(|segment| types.iter().copied().find(|t| *t == segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_runs_once() {
        // Other tests may have registered the kit already.
        let _ = init();
        assert!(is_initialized());
        assert!(!init());
    }

    #[test]
    fn test_classify_most_specific_type() {
        let mesh = Node::new("Objects.Geometry.Mesh:Objects.Custom.ObjMesh");
        assert_eq!(classify(&mesh), Some(Mesh::SPECKLE_TYPE));

        let chunk = Node::new(DATA_CHUNK_TYPE);
        assert_eq!(classify(&chunk), Some(DATA_CHUNK_TYPE));

        assert_eq!(classify(&Node::new("Objects.Geometry.Line")), None);
    }

    #[test]
    fn test_classify_registers_kit() {
        let _ = classify(&Node::base());
        assert!(is_initialized());
    }
}
