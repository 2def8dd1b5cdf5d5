//! The starting point of a view: the initial node set before any links run.

use kgraph_core::NodeId;
use kgraph_engine::Kernel;

/// Where a view's traversal starts.
#[derive(Debug, Clone, Copy)]
pub enum Anchor {
    /// The root node, addressed however the kernel currently locates it.
    AbsRoot,
    /// An explicit node id, taken as-is (not resolved).
    Node(NodeId),
    /// An alias for [`Anchor::AbsRoot`] kept distinct for readable call
    /// sites (`View::from(Anchor::Root)` reads like `view.root()...`).
    Root,
}

impl Anchor {
    /// The initial single-node set this anchor yields.
    pub fn eval(&self, kernel: &Kernel) -> Vec<NodeId> {
        match self {
            Anchor::AbsRoot | Anchor::Root => vec![kernel.root()],
            Anchor::Node(id) => vec![*id],
        }
    }
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Anchor::AbsRoot | Anchor::Root => write!(f, "root"),
            Anchor::Node(id) => write!(f, "node({id})"),
        }
    }
}
