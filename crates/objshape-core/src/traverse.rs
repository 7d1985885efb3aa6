//! Depth-first traversal of an object graph.
//!
//! [`traverse`] yields the root and every node reachable from it exactly
//! once, in pre-order with children visited in property declaration order.
//! Nodes are identified by reference: the same shared node reached through
//! two parents is emitted once.
//!
//! Which properties are followed depends on the node:
//!
//! - structural analysis results are emitted but never descended into;
//! - nodes carrying a display value only descend into their `elements`;
//! - every other node descends into all of its properties.

use std::collections::HashSet;
use std::sync::Arc;

use crate::TRACING_TARGET_TRAVERSE;
use crate::object::Node;

/// Property names holding a node's display geometry.
pub const DISPLAY_VALUE_KEYS: &[&str] = &["displayValue", "@displayValue"];

/// Property names holding a node's child elements.
pub const ELEMENTS_KEYS: &[&str] = &["elements", "@elements"];

/// Type fragment marking analysis results, which are never descended into.
const RESULTS_TYPE: &str = "Objects.Structural.Results";

/// A visited node with the path information it was reached through.
#[derive(Debug, Clone)]
pub struct TraversalContext {
    /// The visited node.
    pub node: Arc<Node>,
    /// Property name on the parent, `None` for the root.
    pub member: Option<String>,
    /// Distance from the root.
    pub depth: usize,
}

/// Lazy depth-first iterator returned by [`traverse`].
#[derive(Debug)]
pub struct Traversal {
    // Keeps every reachable node alive so visited addresses stay unique.
    _root: Arc<Node>,
    stack: Vec<TraversalContext>,
    visited: HashSet<usize>,
}

/// Starts a traversal at `root`.
pub fn traverse(root: Arc<Node>) -> Traversal {
    Traversal {
        _root: Arc::clone(&root),
        stack: vec![TraversalContext {
            node: root,
            member: None,
            depth: 0,
        }],
        visited: HashSet::new(),
    }
}

impl Traversal {
    fn push_children(&mut self, parent: &TraversalContext) {
        let node = &parent.node;
        if node.speckle_type().contains(RESULTS_TYPE) {
            return;
        }

        let has_display_value = node.get_any(DISPLAY_VALUE_KEYS).is_some();
        let mut children = Vec::new();
        for (name, value) in node.properties() {
            if has_display_value && !ELEMENTS_KEYS.contains(&name) {
                continue;
            }

            for child in value.nodes() {
                if self.visited.contains(&Arc::as_ptr(child).addr()) {
                    continue;
                }

                children.push(TraversalContext {
                    node: Arc::clone(child),
                    member: Some(name.to_owned()),
                    depth: parent.depth + 1,
                });
            }
        }

        self.stack.extend(children.into_iter().rev());
    }
}

impl Iterator for Traversal {
    type Item = TraversalContext;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(context) = self.stack.pop() {
            if !self.visited.insert(Arc::as_ptr(&context.node).addr()) {
                continue;
            }

            tracing::trace!(
                target: TRACING_TARGET_TRAVERSE,
                speckle_type = context.node.speckle_type(),
                member = context.member.as_deref(),
                depth = context.depth,
                "Visiting node"
            );

            self.push_children(&context);
            return Some(context);
        }

        None
    }
}
