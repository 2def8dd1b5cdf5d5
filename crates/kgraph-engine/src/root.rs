//! Establishes or recovers the singleton root node.

use crate::attribute::{create_attr_node, push_genesis};
use kgraph_core::{new_id, GraphError, NodeId, Result, ROOT_HEADING};
use kgraph_store::Store;

const WELCOME_BODY: &str = "welcome";
const ROOT_TITLE: &str = "Root";

/// Mint a brand-new root node: heading `root`, title `Root`, a welcome
/// body, and a freshly-stamped attribute subtree. Returns the new root id.
pub fn initialize_root(store: &mut Store) -> Result<NodeId> {
    let root = new_id();
    store.create_node(root)?;
    store.headings_mut().create(root, ROOT_HEADING.to_string())?;
    store.titles_mut().create(root, ROOT_TITLE.to_string())?;
    store.bodies_mut().create(root, WELCOME_BODY.to_string())?;
    create_attr_node(store, root)?;
    push_genesis(store, root)?;
    tracing::info!(%root, "initialized fresh root");
    Ok(root)
}

/// Locate the root on a previously-populated store: pick any node and walk
/// `parent_of`, then `attr_owner_of`, upward until neither edge exists.
/// Fails with `invalid_root` if the node table is empty, or if the walk
/// does not terminate within the number of live nodes (a cycle, which
/// should be unreachable under the kernel's own invariants).
pub fn locate_root(store: &Store) -> Result<NodeId> {
    let all = store.all_node_ids();
    let Some(start) = all.first().copied() else {
        return Err(GraphError::invalid_root("store has no nodes"));
    };

    let mut cur = start;
    let mut steps = 0usize;
    let ceiling = all.len() + 1;
    loop {
        if let Some(parent) = store.parent_of(cur) {
            cur = parent;
        } else if let Some(owner) = store.attr_owner_of(cur) {
            cur = owner;
        } else {
            return Ok(cur);
        }
        steps += 1;
        if steps > ceiling {
            return Err(GraphError::invalid_root(
                "walk toward root did not terminate — edge set is not a forest",
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgraph_store::StoreConfig;

    #[test]
    fn initialize_then_locate_agree() {
        let mut store = Store::init_db_on_disk(&StoreConfig::in_memory()).unwrap();
        let root = initialize_root(&mut store).unwrap();
        assert_eq!(locate_root(&store).unwrap(), root);
    }

    #[test]
    fn locate_root_from_a_descendant() {
        let mut store = Store::init_db_on_disk(&StoreConfig::in_memory()).unwrap();
        let root = initialize_root(&mut store).unwrap();
        let child = new_id();
        store.create_node(child).unwrap();
        store.add_child_edge(root, child).unwrap();
        assert_eq!(locate_root(&store).unwrap(), root);
    }

    #[test]
    fn empty_store_has_no_root() {
        let store = Store::init_db_on_disk(&StoreConfig::in_memory()).unwrap();
        let err = locate_root(&store).unwrap_err();
        assert_eq!(err.kind(), kgraph_core::ErrorKind::InvalidRoot);
    }
}
