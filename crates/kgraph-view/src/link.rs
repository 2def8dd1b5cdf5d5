//! The link vocabulary: each variant transforms an ordered, deduplicated
//! node set into a new one by a single hop of graph traversal.

use crate::predicate::Predicate;
use kgraph_core::{NodeId, Result};
use kgraph_engine::Kernel;

/// One hop of graph traversal, optionally filtered by a [`Predicate`].
#[derive(Debug, Clone)]
pub enum Link {
    /// The ordered children of each input node, filtered by the predicate.
    Child(Predicate),
    /// The parent of each input node (one hop, real or alias-destination).
    Parent,
    /// The other children of each input node's parent, filtered by the
    /// predicate (the input node itself is excluded).
    Sibling(Predicate),
    /// Same as [`Link::Sibling`] but the input node itself is eligible too.
    SiblingIncl(Predicate),
    /// Every strict ancestor of each input node (nearest first) matching the
    /// predicate.
    Ancestor(Predicate),
    /// Every strict descendant of each input node (pre-order) matching the
    /// predicate.
    Desc(Predicate),
    /// The nearest matching descendant along each branch — recursion does
    /// not continue past a match, so nested matches below one are not
    /// reported.
    DirectDesc(Predicate),
    /// Keep only input nodes with no children.
    Leaf,
    /// Replace each input node with every live alias whose resolved source
    /// is that node.
    Alias,
    /// Replace each input node with its attribute subtree root, if any.
    Attr,
    /// Replace each input node with its resolved form.
    Resolve,
    /// Replace each input node with its raw order-body entries (resolved
    /// ids, in stored order — distinct from [`Link::Child`]'s alias-mapped
    /// projection).
    Order,
    /// Require the input set to contain exactly one node; fails otherwise.
    Single,
}

fn dedup_preserve_order(mut ids: Vec<NodeId>) -> Vec<NodeId> {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(*id));
    ids
}

fn collect_desc(kernel: &Kernel, node: NodeId, pred: &Predicate, stop_at_match: bool, out: &mut Vec<NodeId>) {
    let Ok(children) = kernel.fetch_children_ordered(node) else {
        return;
    };
    for child in children {
        if pred.matches(kernel, child) {
            out.push(child);
            if stop_at_match {
                continue;
            }
        }
        collect_desc(kernel, child, pred, stop_at_match, out);
    }
}

impl Link {
    /// Apply this link to `input`, producing the next node set.
    pub fn apply(&self, kernel: &Kernel, input: &[NodeId]) -> Result<Vec<NodeId>> {
        let out = match self {
            Link::Child(pred) => {
                let mut out = Vec::new();
                for &node in input {
                    for child in kernel.fetch_children_ordered(node)? {
                        if pred.matches(kernel, child) {
                            out.push(child);
                        }
                    }
                }
                out
            }
            Link::Parent => input.iter().filter_map(|&n| kernel.fetch_parent(n)).collect(),
            Link::Sibling(pred) => {
                let mut out = Vec::new();
                for &node in input {
                    if let Some(parent) = kernel.fetch_parent(node) {
                        for sib in kernel.fetch_children_ordered(parent)? {
                            if sib != node && pred.matches(kernel, sib) {
                                out.push(sib);
                            }
                        }
                    }
                }
                out
            }
            Link::SiblingIncl(pred) => {
                let mut out = Vec::new();
                for &node in input {
                    if let Some(parent) = kernel.fetch_parent(node) {
                        for sib in kernel.fetch_children_ordered(parent)? {
                            if pred.matches(kernel, sib) {
                                out.push(sib);
                            }
                        }
                    }
                }
                out
            }
            Link::Ancestor(pred) => {
                let mut out = Vec::new();
                for &node in input {
                    let mut cur = kernel.fetch_parent(node);
                    while let Some(ancestor) = cur {
                        if pred.matches(kernel, ancestor) {
                            out.push(ancestor);
                        }
                        cur = kernel.fetch_parent(ancestor);
                    }
                }
                out
            }
            Link::Desc(pred) => {
                let mut out = Vec::new();
                for &node in input {
                    collect_desc(kernel, node, pred, false, &mut out);
                }
                out
            }
            Link::DirectDesc(pred) => {
                let mut out = Vec::new();
                for &node in input {
                    collect_desc(kernel, node, pred, true, &mut out);
                }
                out
            }
            Link::Leaf => {
                let mut out = Vec::new();
                for &node in input {
                    if kernel.fetch_children_ordered(node)?.is_empty() {
                        out.push(node);
                    }
                }
                out
            }
            Link::Alias => input.iter().flat_map(|&n| kernel.fetch_aliases(n)).collect(),
            Link::Attr => input.iter().filter_map(|&n| kernel.attr_root_of(n)).collect(),
            Link::Resolve => input.iter().map(|&n| kernel.resolve(n)).collect(),
            Link::Order => input.iter().flat_map(|&n| kernel.order_ids(n)).collect(),
            Link::Single => {
                if input.len() != 1 {
                    return Err(kgraph_core::GraphError::ambiguous_path(format!(
                        "expected exactly one node, found {}",
                        input.len()
                    )));
                }
                input.to_vec()
            }
        };
        Ok(dedup_preserve_order(out))
    }
}

impl std::fmt::Display for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Link::Child(p) => write!(f, "child({p})"),
            Link::Parent => write!(f, "parent"),
            Link::Sibling(p) => write!(f, "sibling({p})"),
            Link::SiblingIncl(p) => write!(f, "sibling_incl({p})"),
            Link::Ancestor(p) => write!(f, "ancestor({p})"),
            Link::Desc(p) => write!(f, "desc({p})"),
            Link::DirectDesc(p) => write!(f, "direct_desc({p})"),
            Link::Leaf => write!(f, "leaf"),
            Link::Alias => write!(f, "alias"),
            Link::Attr => write!(f, "attr"),
            Link::Resolve => write!(f, "resolve"),
            Link::Order => write!(f, "order"),
            Link::Single => write!(f, "single"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgraph_testkit::TestGraph;

    #[test]
    fn child_link_filters_by_heading() {
        let mut g = TestGraph::new();
        let n1 = g.child(g.root, "1");
        let _n2 = g.child(g.root, "2");
        let out = Link::Child(Predicate::Heading("1".into()))
            .apply(&g.kernel, &[g.root])
            .unwrap();
        assert_eq!(out, vec![n1]);
    }

    #[test]
    fn desc_finds_nested_matches_direct_desc_does_not_recurse_past_a_hit() {
        let mut g = TestGraph::new();
        let a = g.child(g.root, "a");
        let target = g.child(a, "target");
        let _nested = g.child(target, "target");

        let desc = Link::Desc(Predicate::Heading("target".into()))
            .apply(&g.kernel, &[g.root])
            .unwrap();
        assert_eq!(desc.len(), 2);

        let direct = Link::DirectDesc(Predicate::Heading("target".into()))
            .apply(&g.kernel, &[g.root])
            .unwrap();
        assert_eq!(direct.len(), 1);
        assert_eq!(direct[0], target);
    }

    #[test]
    fn single_rejects_non_singleton_input() {
        let mut g = TestGraph::new();
        let _n1 = g.child(g.root, "1");
        let _n2 = g.child(g.root, "2");
        let children = Link::Child(Predicate::Any).apply(&g.kernel, &[g.root]).unwrap();
        let err = Link::Single.apply(&g.kernel, &children).unwrap_err();
        assert_eq!(err.kind(), kgraph_core::ErrorKind::AmbiguousPath);
    }
}
