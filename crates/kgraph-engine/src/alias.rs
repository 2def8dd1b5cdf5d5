//! The alias store: a four-key multi-index over alias records, plus the
//! propagation engine that creates and tears down alias subtrees.
//!
//! Indexed the way the original implementation's `AliasSet` keeps separate
//! `alias_type` / `src_type` / `dst_type` / `top_type` views rather than a
//! single table scanned repeatedly — one `HashMap` per index here.

use crate::attribute::{is_in_attr_tree, order_ids, pop_order, push_order};
use kgraph_core::{combine, GraphError, NodeId, Result};
use kgraph_store::Store;
use std::collections::HashMap;

/// A single alias record: `src_id` is exactly what the caller passed to
/// [`create_alias`] (possibly itself an alias id for a propagated leaf);
/// `resolved_src_id` is its fully-resolved form; `dst_id` is the literal
/// (never resolved) destination the alias lives under; `top_id` names the
/// top alias at the root of this record's propagation chain (itself, if
/// this record is the top).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AliasRecord {
    /// `combine(resolved_src_id, dst_id)`.
    pub alias_id: NodeId,
    /// The argument passed as the alias source.
    pub src_id: NodeId,
    /// The fully resolved source.
    pub resolved_src_id: NodeId,
    /// The literal destination this alias lives under.
    pub dst_id: NodeId,
    /// The top alias this record's propagation chain descends from.
    pub top_id: NodeId,
}

/// The indexed set of all live alias records.
#[derive(Debug, Default)]
pub struct AliasStore {
    by_alias: HashMap<NodeId, AliasRecord>,
    by_src: HashMap<NodeId, Vec<NodeId>>,
    by_resolved_src: HashMap<NodeId, Vec<NodeId>>,
    by_dst: HashMap<NodeId, Vec<NodeId>>,
    by_top: HashMap<NodeId, Vec<NodeId>>,
}

fn push_index(index: &mut HashMap<NodeId, Vec<NodeId>>, key: NodeId, value: NodeId) {
    index.entry(key).or_default().push(value);
}

fn remove_index(index: &mut HashMap<NodeId, Vec<NodeId>>, key: NodeId, value: NodeId) {
    if let Some(values) = index.get_mut(&key) {
        values.retain(|id| *id != value);
        if values.is_empty() {
            index.remove(&key);
        }
    }
}

impl AliasStore {
    /// An empty alias store.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` iff `id` is the id of some alias record.
    pub fn is_alias(&self, id: NodeId) -> bool {
        self.by_alias.contains_key(&id)
    }

    /// `true` iff `resolved_src` is the resolved source of at least one alias.
    pub fn has_alias(&self, resolved_src: NodeId) -> bool {
        self.by_resolved_src
            .get(&resolved_src)
            .is_some_and(|v| !v.is_empty())
    }

    /// `true` iff `alias_id` names a record and that record is a top alias.
    pub fn is_top(&self, alias_id: NodeId) -> bool {
        self.by_alias
            .get(&alias_id)
            .is_some_and(|r| r.top_id == alias_id)
    }

    /// `true` iff `alias_id` names a live record.
    pub fn contains(&self, alias_id: NodeId) -> bool {
        self.by_alias.contains_key(&alias_id)
    }

    /// The record for `alias_id`, if live.
    pub fn get(&self, alias_id: NodeId) -> Option<AliasRecord> {
        self.by_alias.get(&alias_id).copied()
    }

    /// `resolved_src` if `id` is an alias, else `id` unchanged. Idempotent.
    pub fn resolve(&self, id: NodeId) -> NodeId {
        self.by_alias.get(&id).map_or(id, |r| r.resolved_src_id)
    }

    /// The alias records whose destination is `dst`, in creation order.
    pub fn fetch_alias_children(&self, dst: NodeId) -> Vec<NodeId> {
        self.by_dst.get(&dst).cloned().unwrap_or_default()
    }

    /// The alias ids whose resolved source is `resolved_src`.
    pub fn fetch_aliases(&self, resolved_src: NodeId) -> Vec<NodeId> {
        self.by_resolved_src.get(&resolved_src).cloned().unwrap_or_default()
    }

    /// The destinations of the aliases whose resolved source is `resolved_src`.
    pub fn fetch_dsts(&self, resolved_src: NodeId) -> Vec<NodeId> {
        self.fetch_aliases(resolved_src)
            .into_iter()
            .filter_map(|a| self.by_alias.get(&a).map(|r| r.dst_id))
            .collect()
    }

    fn insert(&mut self, record: AliasRecord) {
        push_index(&mut self.by_src, record.src_id, record.alias_id);
        push_index(&mut self.by_resolved_src, record.resolved_src_id, record.alias_id);
        push_index(&mut self.by_dst, record.dst_id, record.alias_id);
        push_index(&mut self.by_top, record.top_id, record.alias_id);
        self.by_alias.insert(record.alias_id, record);
    }

    fn remove(&mut self, alias_id: NodeId) -> Option<AliasRecord> {
        let record = self.by_alias.remove(&alias_id)?;
        remove_index(&mut self.by_src, record.src_id, alias_id);
        remove_index(&mut self.by_resolved_src, record.resolved_src_id, alias_id);
        remove_index(&mut self.by_dst, record.dst_id, alias_id);
        remove_index(&mut self.by_top, record.top_id, alias_id);
        Some(record)
    }
}

pub(crate) fn fetch_parent(store: &Store, aliases: &AliasStore, node: NodeId) -> Option<NodeId> {
    if let Some(record) = aliases.get(node) {
        Some(record.dst_id)
    } else {
        store.parent_of(node)
    }
}

pub(crate) fn is_ancestor(store: &Store, aliases: &AliasStore, ancestor: NodeId, descendant: NodeId) -> bool {
    let mut cur = fetch_parent(store, aliases, descendant);
    while let Some(p) = cur {
        if p == ancestor {
            return true;
        }
        cur = fetch_parent(store, aliases, p);
    }
    false
}

pub(crate) fn fetch_heading(store: &Store, aliases: &AliasStore, node: NodeId) -> Option<String> {
    store.headings().fetch_opt(&aliases.resolve(node))
}

pub(crate) fn child_with_heading(store: &Store, aliases: &AliasStore, parent: NodeId, heading: &str) -> Option<NodeId> {
    for child in store.children_of(parent) {
        if store.headings().fetch_opt(&child).as_deref() == Some(heading) {
            return Some(child);
        }
    }
    for alias_child in aliases.fetch_alias_children(parent) {
        if fetch_heading(store, aliases, alias_child).as_deref() == Some(heading) {
            return Some(alias_child);
        }
    }
    None
}

/// The ordered direct children of `parent`: the order body parsed into
/// resolved ids, each re-expressed as the literal alias id that is actually
/// parented at `parent` where one exists, else the resolved id itself.
///
/// Alias nodes own no order body of their own — they mirror whatever
/// `resolve(parent)` holds, so the lookup resolves `parent` first. For a
/// real `parent` this is a no-op (`resolve` is idempotent on non-alias ids).
pub fn fetch_children_ordered(store: &Store, aliases: &AliasStore, parent: NodeId) -> Result<Vec<NodeId>> {
    let resolved_ids = order_ids(store, aliases.resolve(parent));
    let alias_children = aliases.fetch_alias_children(parent);
    let mut out = Vec::with_capacity(resolved_ids.len());
    for rid in resolved_ids {
        let literal = alias_children
            .iter()
            .copied()
            .find(|a| aliases.get(*a).map(|r| r.resolved_src_id) == Some(rid))
            .unwrap_or(rid);
        out.push(literal);
    }
    Ok(out)
}

/// Create an alias: `dst` gains an alias node whose resolved source is
/// `resolve(src)`, together with one propagated leaf per existing
/// descendant of `resolve(src)` and one fan-out leaf under every existing
/// alias of `dst` itself. Returns the new alias's id.
pub fn create_alias(
    store: &mut Store,
    aliases: &mut AliasStore,
    root_id: NodeId,
    src: NodeId,
    dst: NodeId,
) -> Result<NodeId> {
    let resolved_src = aliases.resolve(src);
    let resolved_dst = aliases.resolve(dst);

    if !store.node_exists(resolved_src) {
        return Err(GraphError::src_not_found(src));
    }
    if !store.node_exists(resolved_dst) {
        return Err(GraphError::dst_not_found(dst));
    }
    if resolved_src == root_id {
        return Err(GraphError::is_root(resolved_src));
    }
    if resolved_src == resolved_dst {
        return Err(GraphError::src_equals_dst(resolved_src));
    }
    if is_ancestor(store, aliases, resolved_src, resolved_dst) {
        return Err(GraphError::src_ancestor_of_dst(resolved_src, resolved_dst));
    }
    if let Some(heading) = store.headings().fetch_opt(&resolved_src) {
        if child_with_heading(store, aliases, dst, &heading).is_some() {
            return Err(GraphError::duplicate_child_heading(dst, heading));
        }
    }

    let alias_id = combine(resolved_src, dst);
    if aliases.contains(alias_id) {
        return Err(GraphError::alias_already_exists(alias_id));
    }

    let is_top = !aliases.is_alias(dst);
    if is_top {
        store.add_alias_row(resolved_src, dst)?;
    }
    // An alias `dst` owns no attribute subtree (only real nodes and the root
    // do), so its ordering is never stored directly: `fetch_children_ordered`
    // derives it from `resolve(dst)`'s own order body instead.
    if is_top && !is_in_attr_tree(store, dst) {
        push_order(store, dst, resolved_src)?;
    }
    let top_id = if is_top {
        alias_id
    } else {
        aliases.get(dst).map(|r| r.top_id).unwrap_or(alias_id)
    };

    aliases.insert(AliasRecord {
        alias_id,
        src_id: src,
        resolved_src_id: resolved_src,
        dst_id: dst,
        top_id,
    });
    tracing::debug!(%src, %dst, %alias_id, top = is_top, "created alias");

    for child in fetch_children_ordered(store, aliases, resolved_src)? {
        create_alias(store, aliases, root_id, child, alias_id)?;
    }
    for existing in aliases.fetch_aliases(dst) {
        create_alias(store, aliases, root_id, src, existing)?;
    }

    Ok(alias_id)
}

fn erase_alias_node_internal(store: &mut Store, aliases: &mut AliasStore, alias_id: NodeId) -> Result<()> {
    let record = aliases
        .get(alias_id)
        .ok_or_else(|| GraphError::invalid_alias(alias_id))?;

    for child in aliases.fetch_alias_children(alias_id).into_iter().rev() {
        erase_alias_node_internal(store, aliases, child)?;
    }
    if !aliases.is_alias(record.dst_id) && !is_in_attr_tree(store, record.dst_id) {
        pop_order(store, record.dst_id, record.resolved_src_id)?;
    }
    if aliases.is_top(alias_id) {
        store.remove_alias_row(record.resolved_src_id, record.dst_id)?;
    }
    aliases.remove(alias_id);
    tracing::debug!(%alias_id, "erased alias node");
    Ok(())
}

/// Erase a top alias: fans out the erase to every sibling view of its
/// destination first (undoing the corresponding fan-out leaves), then
/// erases this alias's own propagated subtree, then itself.
pub fn erase_alias_root(store: &mut Store, aliases: &mut AliasStore, alias_id: NodeId) -> Result<()> {
    let record = aliases
        .get(alias_id)
        .ok_or_else(|| GraphError::invalid_alias(alias_id))?;
    if !aliases.is_top(alias_id) {
        return Err(GraphError::invalid_node(alias_id));
    }

    for sibling in aliases.fetch_aliases(record.dst_id) {
        if sibling == alias_id {
            continue;
        }
        let nested = combine(record.resolved_src_id, sibling);
        if aliases.contains(nested) {
            erase_alias_node_internal(store, aliases, nested)?;
        }
    }
    erase_alias_node_internal(store, aliases, alias_id)
}

/// Erase a non-top alias leaf directly. Used during cascade erasure of an
/// ordinary node's subtree when one of its descendants is itself the
/// resolved source of a propagated (non-top) alias.
pub fn erase_alias_leaf(store: &mut Store, aliases: &mut AliasStore, alias_id: NodeId) -> Result<()> {
    if aliases.is_top(alias_id) {
        return Err(GraphError::invalid_node(alias_id));
    }
    erase_alias_node_internal(store, aliases, alias_id)
}

fn rebuild_one(store: &Store, aliases: &mut AliasStore, resolved_src: NodeId, dst: NodeId) -> Result<NodeId> {
    let alias_id = combine(resolved_src, dst);
    let is_top = !aliases.is_alias(dst);
    let top_id = if is_top {
        alias_id
    } else {
        aliases.get(dst).map(|r| r.top_id).unwrap_or(alias_id)
    };
    aliases.insert(AliasRecord {
        alias_id,
        src_id: resolved_src,
        resolved_src_id: resolved_src,
        dst_id: dst,
        top_id,
    });
    for child in fetch_children_ordered(store, aliases, resolved_src)? {
        let child_resolved = aliases.resolve(child);
        rebuild_one(store, aliases, child_resolved, alias_id)?;
    }
    Ok(alias_id)
}

/// Rebuild the full alias index from the persisted top-alias rows, in a
/// dependency order that guarantees every propagation source is already
/// indexed before it is consulted (a row whose resolved source is another
/// pending row's destination waits for that row).
pub fn load_alias_store(store: &Store) -> Result<AliasStore> {
    let mut aliases = AliasStore::new();
    let mut pending = store.all_alias_rows();
    while !pending.is_empty() {
        let dsts_remaining: std::collections::HashSet<NodeId> =
            pending.iter().map(|(_, dst)| *dst).collect();
        let mut still_pending = Vec::new();
        let mut progressed = false;
        for (resolved_src, dst) in pending {
            if dsts_remaining.contains(&resolved_src) {
                still_pending.push((resolved_src, dst));
            } else {
                rebuild_one(store, &mut aliases, resolved_src, dst)?;
                progressed = true;
            }
        }
        if !progressed {
            return Err(GraphError::Uncategorized {
                reason: "persisted alias rows form an unresolvable dependency cycle".into(),
            });
        }
        pending = still_pending;
    }
    tracing::info!(count = aliases.by_alias.len(), "alias store rebuilt from disk");
    Ok(aliases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgraph_core::new_id;
    use kgraph_store::StoreConfig;

    fn fresh_store_with_root() -> (Store, NodeId) {
        let mut store = Store::init_db_on_disk(&StoreConfig::in_memory()).unwrap();
        let root = crate::root::initialize_root(&mut store).unwrap();
        (store, root)
    }

    fn child(store: &mut Store, parent: NodeId, heading: &str) -> NodeId {
        let id = new_id();
        store.create_node(id).unwrap();
        store.headings_mut().create(id, heading.to_string()).unwrap();
        crate::attribute::create_attr_node(store, id).unwrap();
        crate::attribute::push_genesis(store, id).unwrap();
        store.add_child_edge(parent, id).unwrap();
        push_order(store, parent, id).unwrap();
        id
    }

    #[test]
    fn basic_alias_is_top_and_resolves() {
        let (mut store, root) = fresh_store_with_root();
        let n1 = child(&mut store, root, "1");
        let n2 = child(&mut store, root, "2");
        let mut aliases = AliasStore::new();

        let a = create_alias(&mut store, &mut aliases, root, n1, n2).unwrap();
        assert!(aliases.is_alias(a));
        assert!(aliases.is_top(a));
        assert_eq!(aliases.resolve(a), n1);
        assert_eq!(fetch_parent(&store, &aliases, a), Some(n2));
        assert!(order_ids(&store, n2).contains(&n1));
    }

    #[test]
    fn alias_rejects_src_equal_dst_and_ancestor_cycles() {
        let (mut store, root) = fresh_store_with_root();
        let n1 = child(&mut store, root, "1");
        let n1a = child(&mut store, n1, "a");
        let mut aliases = AliasStore::new();

        let err = create_alias(&mut store, &mut aliases, root, n1, n1).unwrap_err();
        assert_eq!(err.kind(), kgraph_core::ErrorKind::SrcEqualsDst);

        let err = create_alias(&mut store, &mut aliases, root, n1, n1a).unwrap_err();
        assert_eq!(err.kind(), kgraph_core::ErrorKind::SrcAncestorOfDst);
    }

    #[test]
    fn alias_propagates_into_existing_descendants() {
        let (mut store, root) = fresh_store_with_root();
        let n1 = child(&mut store, root, "1");
        let n1a = child(&mut store, n1, "a");
        let n2 = child(&mut store, root, "2");
        let mut aliases = AliasStore::new();

        let a = create_alias(&mut store, &mut aliases, root, n1, n2).unwrap();
        let kids = fetch_children_ordered(&store, &aliases, a).unwrap();
        assert_eq!(kids.len(), 1);
        assert_eq!(aliases.resolve(kids[0]), n1a);
    }

    #[test]
    fn erase_alias_root_restores_destination_order() {
        let (mut store, root) = fresh_store_with_root();
        let n1 = child(&mut store, root, "1");
        let n2 = child(&mut store, root, "2");
        let mut aliases = AliasStore::new();

        let a = create_alias(&mut store, &mut aliases, root, n1, n2).unwrap();
        erase_alias_root(&mut store, &mut aliases, a).unwrap();

        assert!(!aliases.contains(a));
        assert!(!order_ids(&store, n2).contains(&n1));
        assert!(store.node_exists(n1));
        assert!(store.node_exists(n2));
    }

    #[test]
    fn erase_alias_leaf_rejects_top_alias() {
        let (mut store, root) = fresh_store_with_root();
        let n1 = child(&mut store, root, "1");
        let n2 = child(&mut store, root, "2");
        let mut aliases = AliasStore::new();
        let a = create_alias(&mut store, &mut aliases, root, n1, n2).unwrap();

        let err = erase_alias_leaf(&mut store, &mut aliases, a).unwrap_err();
        assert_eq!(err.kind(), kgraph_core::ErrorKind::InvalidNode);
    }

    #[test]
    fn load_alias_store_rebuilds_a_three_deep_chain() {
        let (mut store, root) = fresh_store_with_root();
        let n1 = child(&mut store, root, "1");
        let n2 = child(&mut store, root, "2");
        let n3 = child(&mut store, root, "3");
        let mut aliases = AliasStore::new();

        let a21 = create_alias(&mut store, &mut aliases, root, n1, n2).unwrap();
        let a32 = create_alias(&mut store, &mut aliases, root, n2, n3).unwrap();

        let rebuilt = load_alias_store(&store).unwrap();
        assert!(rebuilt.is_top(a21));
        assert!(rebuilt.is_top(a32));
        let nested_under_a32 = fetch_children_ordered(&store, &rebuilt, a32).unwrap();
        assert_eq!(nested_under_a32.len(), 1);
        assert_eq!(rebuilt.resolve(nested_under_a32[0]), n1);
    }
}
