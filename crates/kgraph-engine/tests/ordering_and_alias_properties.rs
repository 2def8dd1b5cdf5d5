//! Property-based coverage for the ordering and alias invariants: order
//! fidelity across arbitrary permutations (P2), alias identity round-tripping
//! through resolve (P3), and swap commutativity (P8).

use kgraph_core::NodeId;
use kgraph_engine::Kernel;
use kgraph_store::StoreConfig;
use proptest::prelude::*;

fn bootstrap_with_children(n: usize) -> (Kernel, NodeId, Vec<NodeId>) {
    let mut kernel = Kernel::bootstrap(&StoreConfig::in_memory()).unwrap();
    let root = kernel.root();
    let children: Vec<NodeId> = (0..n).map(|i| kernel.create_child(root, &format!("c{i}"), None).unwrap()).collect();
    (kernel, root, children)
}

/// A deterministic Fisher-Yates shuffle driven by a proptest-supplied seed,
/// so the permutation itself stays a plain value rather than a derived
/// strategy.
fn shuffled_indices(n: usize, mut seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        let j = (seed >> 33) as usize % (i + 1);
        indices.swap(i, j);
    }
    indices
}

proptest! {
    /// P2: after `reorder_children`, the stored order exactly matches the
    /// requested permutation, for any permutation of any child count.
    #[test]
    fn reorder_children_matches_requested_permutation(
        n in 1usize..8,
        seed in any::<u64>(),
    ) {
        let (mut kernel, root, children) = bootstrap_with_children(n);
        let perm = shuffled_indices(n, seed);
        let requested: Vec<NodeId> = perm.iter().map(|&i| children[i]).collect();

        kernel.reorder_children(root, &requested).unwrap();
        let actual = kernel.fetch_children_ordered(root).unwrap();
        prop_assert_eq!(actual, requested);
    }

    /// P3: creating an alias then resolving it always recovers the original
    /// source, regardless of how many siblings surround the alias's
    /// destination.
    #[test]
    fn alias_resolve_recovers_source(
        src_siblings in 0usize..5,
        dst_siblings in 0usize..5,
    ) {
        let mut kernel = Kernel::bootstrap(&StoreConfig::in_memory()).unwrap();
        let root = kernel.root();
        for i in 0..src_siblings {
            kernel.create_child(root, &format!("s{i}"), None).unwrap();
        }
        let src = kernel.create_child(root, "src", None).unwrap();
        for i in 0..dst_siblings {
            kernel.create_child(root, &format!("d{i}"), None).unwrap();
        }
        let dst = kernel.create_child(root, "dst", None).unwrap();

        let alias_id = kernel.create_alias(src, dst).unwrap();
        prop_assert_eq!(kernel.resolve(alias_id), src);
        prop_assert!(kernel.is_alias(alias_id));
        prop_assert_eq!(kernel.fetch_parent(alias_id), Some(dst));
    }

    /// P8: swapping the same pair twice is the identity — the order of
    /// `parent`'s children after two swaps matches the order before either.
    #[test]
    fn double_swap_is_identity(n in 2usize..8) {
        let (mut kernel, root, children) = bootstrap_with_children(n);
        let before = kernel.fetch_children_ordered(root).unwrap();

        let a = children[0];
        let b = children[n - 1];
        kernel.swap_nodes(a, b).unwrap();
        kernel.swap_nodes(a, b).unwrap();

        let after = kernel.fetch_children_ordered(root).unwrap();
        prop_assert_eq!(before, after);
    }
}
