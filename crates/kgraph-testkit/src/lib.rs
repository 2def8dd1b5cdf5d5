//! Shared fixtures for building small graphs in tests across the workspace:
//! an in-memory [`TestGraph`] builder plus assertion helpers for the
//! invariants every mutation is expected to uphold.

#![warn(missing_docs)]

use kgraph_core::NodeId;
use kgraph_engine::Kernel;
use kgraph_store::StoreConfig;

/// A booted in-memory graph ready for test mutations: a fresh store, a
/// minted root, and the selection cursor parked on the root.
pub struct TestGraph {
    /// The booted kernel.
    pub kernel: Kernel,
    /// The root id, cached for convenience (equal to `kernel.root()`).
    pub root: NodeId,
}

impl TestGraph {
    /// Boot a fresh in-memory graph.
    pub fn new() -> Self {
        let kernel = Kernel::bootstrap(&StoreConfig::in_memory()).expect("bootstrap in-memory kernel");
        let root = kernel.root();
        Self { kernel, root }
    }

    /// Create `n` real children of `parent`, headed `prefix0`, `prefix1`, …
    /// Returns their ids in creation order.
    pub fn children(&mut self, parent: NodeId, prefix: &str, n: usize) -> Vec<NodeId> {
        (0..n)
            .map(|i| {
                self.kernel
                    .create_child(parent, &format!("{prefix}{i}"), None)
                    .unwrap_or_else(|e| panic!("create_child({prefix}{i}) failed: {e}"))
            })
            .collect()
    }

    /// Create a single real child of `parent` with `heading`, panicking on
    /// failure — for fixtures where the heading is known-good.
    pub fn child(&mut self, parent: NodeId, heading: &str) -> NodeId {
        self.kernel
            .create_child(parent, heading, None)
            .unwrap_or_else(|e| panic!("create_child({heading}) failed: {e}"))
    }

    /// A small three-level chain hanging off the root: `root/1/2/3`. Returns
    /// the three node ids in depth order.
    pub fn linear_chain(&mut self) -> (NodeId, NodeId, NodeId) {
        let n1 = self.child(self.root, "1");
        let n2 = self.child(n1, "2");
        let n3 = self.child(n2, "3");
        (n1, n2, n3)
    }
}

impl Default for TestGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Assert that `node` no longer exists and is absent from the order body of
/// `former_parent` — the postcondition `erase_node` (P6) promises.
pub fn assert_erased(kernel: &Kernel, node: NodeId, former_parent: NodeId) {
    assert!(!kernel.exists(node), "{node} should no longer exist");
    let order = kernel.order_ids(former_parent);
    assert!(
        !order.contains(&node),
        "{node} should be absent from {former_parent}'s order body"
    );
}

/// Assert that `parent`'s order body is exactly the resolved form of
/// `expected_children`, in the same order — the shape P2 requires.
pub fn assert_order_matches(kernel: &Kernel, parent: NodeId, expected_children: &[NodeId]) {
    let actual = kernel
        .fetch_children_ordered(parent)
        .unwrap_or_else(|e| panic!("fetch_children_ordered({parent}) failed: {e}"));
    assert_eq!(actual, expected_children, "children of {parent} out of order");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boots_with_a_root_selected() {
        let g = TestGraph::new();
        assert_eq!(g.kernel.selected(), g.root);
        assert!(g.kernel.exists(g.root));
    }

    #[test]
    fn linear_chain_has_expected_distance() {
        let mut g = TestGraph::new();
        let (_n1, _n2, n3) = g.linear_chain();
        assert_eq!(g.kernel.distance(g.root, n3).unwrap(), 3);
    }
}
