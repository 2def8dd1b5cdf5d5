//! End-to-end scenario coverage for the kernel's mutation and traversal
//! surface, following the six canonical walkthroughs a fresh graph is
//! expected to satisfy.

use kgraph_core::ErrorKind;
use kgraph_engine::Kernel;
use kgraph_store::StoreConfig;

fn bootstrap() -> Kernel {
    Kernel::bootstrap(&StoreConfig::in_memory()).unwrap()
}

fn abs_path_flat(kernel: &Kernel, mut node: kgraph_core::NodeId) -> String {
    let mut headings = Vec::new();
    while node != kernel.root() {
        if let Some(heading) = kernel.fetch_heading(node) {
            headings.push(heading);
        }
        node = kernel.fetch_parent(node).expect("node has a parent below root");
    }
    headings.reverse();
    format!("/{}", headings.join("."))
}

#[test]
fn s1_create_and_query() {
    let mut k = bootstrap();
    let root = k.root();
    let n1 = k.create_child(root, "1", None).unwrap();
    let n2 = k.create_child(n1, "2", None).unwrap();
    let n3 = k.create_child(n2, "3", None).unwrap();

    assert_eq!(abs_path_flat(&k, n3), "/1.2.3");
    assert_eq!(k.fetch_children_ordered(n1).unwrap(), vec![n2]);
    assert_eq!(k.order_ids(n1), vec![k.resolve(n2)]);
    assert_eq!(k.distance(root, n3).unwrap(), 3);
}

#[test]
fn s2_alias_basics() {
    let mut k = bootstrap();
    let root = k.root();
    let n1 = k.create_child(root, "1", None).unwrap();
    let n2 = k.create_child(root, "2", None).unwrap();

    let a = k.create_alias(n1, n2).unwrap();
    assert!(k.is_alias(a));
    assert!(k.is_top_alias(a));
    assert_eq!(k.resolve(a), n1);
    assert_eq!(k.fetch_parent(a), Some(n2));
    assert_eq!(abs_path_flat(&k, a), "/2.1");

    k.erase_node(a).unwrap();
    assert!(k.exists(n1));
    assert!(k.exists(n2));
    assert!(!k.order_ids(n2).contains(&k.resolve(n1)));
}

#[test]
fn s3_alias_propagation_chain() {
    let mut k = bootstrap();
    let root = k.root();
    let n1 = k.create_child(root, "1", None).unwrap();
    let n2 = k.create_child(root, "2", None).unwrap();
    let n3 = k.create_child(root, "3", None).unwrap();
    let n4 = k.create_child(root, "4", None).unwrap();

    let a21 = k.create_alias(n1, n2).unwrap();
    let a32 = k.create_alias(n2, n3).unwrap();
    let a43 = k.create_alias(n3, n4).unwrap();

    // Under n4 there is a chain ending in an alias resolving to n1.
    let under_a43 = k.fetch_children_ordered(a43).unwrap();
    assert_eq!(under_a43.len(), 1);
    let under_that = k.fetch_children_ordered(under_a43[0]).unwrap();
    assert_eq!(under_that.len(), 1);
    assert_eq!(k.resolve(under_that[0]), n1);

    // Erasing n1 cascade-erases a21 and the deepest alias under a32/a43.
    k.erase_node(n1).unwrap();
    assert!(!k.exists(a21));
    assert!(k.exists(a32));
    assert!(k.exists(a43));
}

#[test]
fn s3_erasing_midchain_cascades_down() {
    let mut k = bootstrap();
    let root = k.root();
    let n1 = k.create_child(root, "1", None).unwrap();
    let n2 = k.create_child(root, "2", None).unwrap();
    let n3 = k.create_child(root, "3", None).unwrap();
    let n4 = k.create_child(root, "4", None).unwrap();

    let a21 = k.create_alias(n1, n2).unwrap();
    let a32 = k.create_alias(n2, n3).unwrap();
    let _a43 = k.create_alias(n3, n4).unwrap();

    k.erase_node(n2).unwrap();
    assert!(!k.exists(a21));
    assert!(!k.exists(a32));
}

#[test]
fn s4_non_top_alias_cannot_be_erased_directly() {
    let mut k = bootstrap();
    let root = k.root();
    let n1 = k.create_child(root, "1", None).unwrap();
    let n2 = k.create_child(root, "2", None).unwrap();
    let n3 = k.create_child(root, "3", None).unwrap();

    let a21 = k.create_alias(n1, n2).unwrap();
    let a32 = k.create_alias(n2, n3).unwrap();
    let nested_under_a32 = k.fetch_children_ordered(a32).unwrap();
    assert_eq!(nested_under_a32.len(), 1);

    let err = k.erase_node(nested_under_a32[0]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidNode);

    k.erase_node(a32).unwrap();
    assert!(!k.exists(a32));
    assert!(k.exists(a21));
}

#[test]
fn s5_duplicate_heading_forbidden() {
    let mut k = bootstrap();
    let root = k.root();
    let s = k.create_child(root, "x", None).unwrap();
    let err = k.create_child(root, "x", None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateChildHeading);

    let d = k.create_child(root, "y", None).unwrap();
    k.create_child(d, "x", None).unwrap();
    let err = k.create_alias(s, d).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateChildHeading);
}

#[test]
fn s6_order_round_trip_and_swap() {
    let mut k = bootstrap();
    let root = k.root();
    let c1 = k.create_child(root, "c1", None).unwrap();
    let c2 = k.create_child(root, "c2", None).unwrap();
    let c3 = k.create_child(root, "c3", None).unwrap();

    k.reorder_children(root, &[c3, c1, c2]).unwrap();
    assert_eq!(k.fetch_children_ordered(root).unwrap(), vec![c3, c1, c2]);
    assert_eq!(k.order_ids(root), vec![c3, c1, c2]);

    k.swap_nodes(c1, c3).unwrap();
    let swapped_once = k.fetch_children_ordered(root).unwrap();
    assert_ne!(swapped_once, vec![c3, c1, c2]);

    k.swap_nodes(c1, c3).unwrap();
    let swapped_twice = k.fetch_children_ordered(root).unwrap();
    assert_eq!(swapped_twice, vec![c3, c1, c2]);
}
