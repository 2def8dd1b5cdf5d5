//! The attribute subsystem: a parallel, one-level-deep metadata subtree
//! hanging off every ordinary node, holding the genesis stamp and the order
//! body. Attribute nodes never themselves own an attribute subtree — that
//! recursion stops here, enforced by [`create_attr_node`].

use kgraph_core::{new_id, time::now_millis, GraphError, NodeId, Result, GENESIS_HEADING, ORDER_HEADING};
use kgraph_store::Store;

/// Mint a fresh attribute-root and attach it to `owner` via an
/// attribute-owner edge. `owner` must not already own one.
pub fn create_attr_node(store: &mut Store, owner: NodeId) -> Result<NodeId> {
    if store.attr_root_of(owner).is_some() {
        return Err(GraphError::attribute(format!(
            "{owner} already owns an attribute subtree"
        )));
    }
    let attr_root = new_id();
    store.create_node(attr_root)?;
    store.add_attribute_owner_edge(owner, attr_root)?;
    tracing::trace!(%owner, %attr_root, "created attribute subtree");
    Ok(attr_root)
}

fn find_attr_child(store: &Store, attr_root: NodeId, heading: &str) -> Option<NodeId> {
    store
        .children_of(attr_root)
        .into_iter()
        .find(|child| store.headings().fetch_opt(child).as_deref() == Some(heading))
}

fn find_or_create_attr_child(store: &mut Store, attr_root: NodeId, heading: &str) -> Result<NodeId> {
    if let Some(existing) = find_attr_child(store, attr_root, heading) {
        return Ok(existing);
    }
    let child = new_id();
    store.create_node(child)?;
    store.headings_mut().create(child, heading.to_string())?;
    store.bodies_mut().create(child, String::new())?;
    store.add_child_edge(attr_root, child)?;
    Ok(child)
}

fn attr_root_of(store: &Store, owner: NodeId) -> Result<NodeId> {
    store
        .attr_root_of(owner)
        .ok_or_else(|| GraphError::attribute(format!("{owner} has no attribute subtree")))
}

/// Stamp (or re-stamp) `owner`'s genesis attribute child with the current
/// wall-clock time, in milliseconds.
pub fn push_genesis(store: &mut Store, owner: NodeId) -> Result<()> {
    let attr_root = attr_root_of(store, owner)?;
    let genesis = find_or_create_attr_child(store, attr_root, GENESIS_HEADING)?;
    store.bodies_mut().replace(&genesis, now_millis().to_string())?;
    tracing::trace!(%owner, "pushed genesis stamp");
    Ok(())
}

/// The genesis timestamp recorded for `owner`, if any.
pub fn fetch_genesis(store: &Store, owner: NodeId) -> Option<u128> {
    let attr_root = store.attr_root_of(owner)?;
    let genesis = find_attr_child(store, attr_root, GENESIS_HEADING)?;
    store.bodies().fetch_opt(&genesis)?.parse().ok()
}

fn parse_order_body(text: &str) -> Vec<NodeId> {
    text.lines().filter_map(NodeId::parse).collect()
}

fn render_order_body(ids: &[NodeId]) -> String {
    ids.iter()
        .map(NodeId::to_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Append `child_resolved` to `parent`'s order body, creating the body if
/// this is `parent`'s first ordered child. No-op if already present.
pub fn push_order(store: &mut Store, parent: NodeId, child_resolved: NodeId) -> Result<()> {
    let attr_root = attr_root_of(store, parent)?;
    let order_node = find_or_create_attr_child(store, attr_root, ORDER_HEADING)?;
    let mut ids = parse_order_body(&store.bodies().fetch_opt(&order_node).unwrap_or_default());
    if !ids.contains(&child_resolved) {
        ids.push(child_resolved);
        store
            .bodies_mut()
            .replace(&order_node, render_order_body(&ids))?;
    }
    tracing::trace!(%parent, %child_resolved, "pushed order entry");
    Ok(())
}

/// Remove `child_resolved` from `parent`'s order body, preserving the order
/// of the remaining entries. The order attribute child is left in place
/// even if it becomes empty.
pub fn pop_order(store: &mut Store, parent: NodeId, child_resolved: NodeId) -> Result<()> {
    let attr_root = attr_root_of(store, parent)?;
    let order_node = find_attr_child(store, attr_root, ORDER_HEADING)
        .ok_or_else(|| GraphError::attribute(format!("{parent} has no order body")))?;
    let mut ids = parse_order_body(&store.bodies().fetch_opt(&order_node).unwrap_or_default());
    ids.retain(|id| *id != child_resolved);
    store
        .bodies_mut()
        .replace(&order_node, render_order_body(&ids))?;
    tracing::trace!(%parent, %child_resolved, "popped order entry");
    Ok(())
}

/// Overwrite `parent`'s order body outright with `new_order_resolved`.
pub fn set_order(store: &mut Store, parent: NodeId, new_order_resolved: &[NodeId]) -> Result<()> {
    let attr_root = attr_root_of(store, parent)?;
    let order_node = find_or_create_attr_child(store, attr_root, ORDER_HEADING)?;
    store
        .bodies_mut()
        .replace(&order_node, render_order_body(new_order_resolved))?;
    Ok(())
}

/// `parent`'s order body, parsed into resolved child ids, in stored order.
/// Empty if `parent` owns no attribute subtree or no order child yet.
pub fn order_ids(store: &Store, parent: NodeId) -> Vec<NodeId> {
    let Some(attr_root) = store.attr_root_of(parent) else {
        return Vec::new();
    };
    let Some(order_node) = find_attr_child(store, attr_root, ORDER_HEADING) else {
        return Vec::new();
    };
    parse_order_body(&store.bodies().fetch_opt(&order_node).unwrap_or_default())
}

/// `true` iff `node` has an ancestor reachable by the attribute-owner edge —
/// i.e. `node` is itself an attribute root, or a descendant of one (a
/// genesis/order child).
pub fn is_in_attr_tree(store: &Store, node: NodeId) -> bool {
    let mut cur = Some(node);
    while let Some(id) = cur {
        if store.attr_owner_of(id).is_some() {
            return true;
        }
        cur = store.parent_of(id);
    }
    false
}

/// `true` iff `child_resolved` appears in `parent`'s order body.
pub fn is_in_order(store: &Store, parent: NodeId, child_resolved: NodeId) -> bool {
    order_ids(store, parent).contains(&child_resolved)
}

/// Erase `owner`'s entire attribute subtree: every attribute child, then
/// the attribute root itself, then the attribute-owner edge. Called as part
/// of node erasure — attribute nodes have no independent lifecycle.
pub fn erase_attr_tree(store: &mut Store, owner: NodeId) -> Result<()> {
    let Some(attr_root) = store.attr_root_of(owner) else {
        return Ok(());
    };
    for child in store.children_of(attr_root) {
        store.headings_mut().erase(&child).ok();
        store.bodies_mut().erase(&child).ok();
        store.titles_mut().erase(&child).ok();
        store.resources_mut().erase(&child).ok();
        store.remove_child_edge(attr_root, child)?;
        store.erase_node_row(child)?;
    }
    store.remove_attribute_owner_edge(owner, attr_root)?;
    store.erase_node_row(attr_root)?;
    tracing::trace!(%owner, "erased attribute subtree");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgraph_store::StoreConfig;

    fn fresh_store() -> Store {
        Store::init_db_on_disk(&StoreConfig::in_memory()).unwrap()
    }

    #[test]
    fn create_attr_node_rejects_double_ownership() {
        let mut store = fresh_store();
        let owner = new_id();
        store.create_node(owner).unwrap();
        create_attr_node(&mut store, owner).unwrap();
        let err = create_attr_node(&mut store, owner).unwrap_err();
        assert_eq!(err.kind(), kgraph_core::ErrorKind::Attribute);
    }

    #[test]
    fn genesis_round_trips() {
        let mut store = fresh_store();
        let owner = new_id();
        store.create_node(owner).unwrap();
        create_attr_node(&mut store, owner).unwrap();
        push_genesis(&mut store, owner).unwrap();
        assert!(fetch_genesis(&store, owner).is_some());
    }

    #[test]
    fn order_push_pop_round_trip() {
        let mut store = fresh_store();
        let owner = new_id();
        store.create_node(owner).unwrap();
        create_attr_node(&mut store, owner).unwrap();

        let a = new_id();
        let b = new_id();
        push_order(&mut store, owner, a).unwrap();
        push_order(&mut store, owner, b).unwrap();
        assert_eq!(order_ids(&store, owner), vec![a, b]);
        assert!(is_in_order(&store, owner, a));

        pop_order(&mut store, owner, a).unwrap();
        assert_eq!(order_ids(&store, owner), vec![b]);
        assert!(!is_in_order(&store, owner, a));
    }

    #[test]
    fn pushing_an_already_present_id_is_a_no_op() {
        let mut store = fresh_store();
        let owner = new_id();
        store.create_node(owner).unwrap();
        create_attr_node(&mut store, owner).unwrap();
        let a = new_id();
        push_order(&mut store, owner, a).unwrap();
        push_order(&mut store, owner, a).unwrap();
        assert_eq!(order_ids(&store, owner), vec![a]);
    }

    #[test]
    fn is_in_attr_tree_covers_root_and_its_children() {
        let mut store = fresh_store();
        let owner = new_id();
        store.create_node(owner).unwrap();
        let attr_root = create_attr_node(&mut store, owner).unwrap();
        push_genesis(&mut store, owner).unwrap();

        assert!(is_in_attr_tree(&store, attr_root));
        assert!(!is_in_attr_tree(&store, owner));

        let genesis_child = find_attr_child(&store, attr_root, GENESIS_HEADING).unwrap();
        assert!(is_in_attr_tree(&store, genesis_child));
    }

    #[test]
    fn erase_attr_tree_removes_every_row() {
        let mut store = fresh_store();
        let owner = new_id();
        store.create_node(owner).unwrap();
        let attr_root = create_attr_node(&mut store, owner).unwrap();
        push_genesis(&mut store, owner).unwrap();
        push_order(&mut store, owner, new_id()).unwrap();

        erase_attr_tree(&mut store, owner).unwrap();
        assert!(!store.node_exists(attr_root));
        assert_eq!(store.attr_root_of(owner), None);
    }
}
