//! The graph kernel: the public façade combining the store, the attribute
//! subsystem, and the alias engine into node/edge lifecycle, ordering
//! mutation, traversal, and the selection cursor.

use crate::alias::{self, child_with_heading, fetch_parent as alias_aware_parent, is_ancestor, AliasStore};
use crate::attribute::{self, is_in_attr_tree};
use crate::events::EventSink;
use crate::root;
use kgraph_core::{new_id, GraphError, Heading, NodeId, Result};
use kgraph_store::{Store, StoreConfig};
use std::collections::HashMap;

/// The graph kernel. Owns the store, the alias index, the root id, and the
/// selection cursor. There is exactly one writer; treat it as an explicitly
/// passed value with lifecycle `new → … → drop`.
pub struct Kernel {
    store: Store,
    aliases: AliasStore,
    root: NodeId,
    selected: NodeId,
    event_sink: Option<Box<dyn EventSink>>,
}

impl Kernel {
    /// Open a fresh graph: a new store at `config`'s location, with a newly
    /// minted root, selected.
    pub fn bootstrap(config: &StoreConfig) -> Result<Self> {
        let mut store = Store::init_db_on_disk(config)?;
        let root = root::initialize_root(&mut store)?;
        Ok(Self {
            store,
            aliases: AliasStore::new(),
            selected: root,
            root,
            event_sink: None,
        })
    }

    /// Load a previously-populated graph: locate the root and rebuild the
    /// alias index from the persisted top-alias rows.
    pub fn load(config: &StoreConfig) -> Result<Self> {
        let store = Store::init_db_on_disk(config)?;
        let root = root::locate_root(&store)?;
        let aliases = alias::load_alias_store(&store)?;
        Ok(Self {
            store,
            aliases,
            selected: root,
            root,
            event_sink: None,
        })
    }

    /// Register the collaborator that receives post-mutation events.
    pub fn set_event_sink(&mut self, sink: Box<dyn EventSink>) {
        self.event_sink = Some(sink);
    }

    /// The root node's id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The currently selected node.
    pub fn selected(&self) -> NodeId {
        self.selected
    }

    /// Flush every pending delta to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.store.flush_delta_to_disk()?;
        Ok(())
    }

    fn emit(&mut self, requisites: &[&str], payload: &[(&str, &str)]) {
        if let Some(sink) = self.event_sink.as_mut() {
            let payload: HashMap<String, String> = payload
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            sink.fire_event(requisites, &payload);
        }
    }

    /// `resolve(id)`: the fully resolved source if `id` is an alias, else `id`.
    pub fn resolve(&self, id: NodeId) -> NodeId {
        self.aliases.resolve(id)
    }

    /// `true` iff `id` is the id of a live alias record.
    pub fn is_alias(&self, id: NodeId) -> bool {
        self.aliases.is_alias(id)
    }

    /// `true` iff `id` is a live top alias.
    pub fn is_top_alias(&self, id: NodeId) -> bool {
        self.aliases.is_top(id)
    }

    /// `true` iff `id` has a live row (resolving through aliases first).
    pub fn exists(&self, id: NodeId) -> bool {
        self.store.node_exists(self.resolve(id))
    }

    /// The literal parent of `id`: the alias's destination if `id` is an
    /// alias, else the ordinary child-edge parent.
    pub fn fetch_parent(&self, id: NodeId) -> Option<NodeId> {
        alias_aware_parent(&self.store, &self.aliases, id)
    }

    /// The ordered direct children of `parent` (real or alias ids, as
    /// actually parented there).
    pub fn fetch_children_ordered(&self, parent: NodeId) -> Result<Vec<NodeId>> {
        alias::fetch_children_ordered(&self.store, &self.aliases, self.resolve(parent))
    }

    /// `parent`'s raw order body, parsed into resolved child ids. Lower-level
    /// than [`Kernel::fetch_children_ordered`] — exposed for assertions that
    /// want to check the order body directly rather than its alias-mapped
    /// projection.
    pub fn order_ids(&self, parent: NodeId) -> Vec<NodeId> {
        attribute::order_ids(&self.store, self.resolve(parent))
    }

    /// `id`'s heading, resolving through aliases.
    pub fn fetch_heading(&self, id: NodeId) -> Option<String> {
        self.store.headings().fetch_opt(&self.resolve(id))
    }

    /// `id`'s title, resolving through aliases.
    pub fn fetch_title(&self, id: NodeId) -> Option<String> {
        self.store.titles().fetch_opt(&self.resolve(id))
    }

    /// `id`'s body, resolving through aliases.
    pub fn fetch_body(&self, id: NodeId) -> Option<String> {
        self.store.bodies().fetch_opt(&self.resolve(id))
    }

    /// `id`'s attribute subtree root, if it owns one.
    pub fn attr_root_of(&self, id: NodeId) -> Option<NodeId> {
        self.store.attr_root_of(self.resolve(id))
    }

    /// The alias ids whose resolved source is `id`.
    pub fn fetch_aliases(&self, id: NodeId) -> Vec<NodeId> {
        self.aliases.fetch_aliases(self.resolve(id))
    }

    // -- Node lifecycle -----------------------------------------------------

    /// Create a new real child of `parent` with the given heading and
    /// optional title. Fails on an invalid heading, a missing parent, or a
    /// heading collision with an existing sibling.
    pub fn create_child(&mut self, parent: NodeId, heading: &str, title: Option<&str>) -> Result<NodeId> {
        Heading::parse(heading).ok_or_else(|| GraphError::invalid_heading(heading))?;
        let resolved_parent = self.resolve(parent);
        if !self.store.node_exists(resolved_parent) {
            return Err(GraphError::parent_not_found(parent));
        }
        if child_with_heading(&self.store, &self.aliases, resolved_parent, heading).is_some() {
            return Err(GraphError::duplicate_child_heading(resolved_parent, heading.to_string()));
        }

        let id = new_id();
        self.store.create_node(id)?;
        self.store.headings_mut().create(id, heading.to_string())?;
        if let Some(title) = title {
            self.store.titles_mut().create(id, title.to_string())?;
        }
        self.store.add_child_edge(resolved_parent, id)?;
        attribute::create_attr_node(&mut self.store, id)?;
        attribute::push_genesis(&mut self.store, id)?;
        attribute::push_order(&mut self.store, resolved_parent, id)?;

        for existing_alias in self.aliases.fetch_aliases(resolved_parent) {
            alias::create_alias(&mut self.store, &mut self.aliases, self.root, id, existing_alias)?;
        }

        tracing::debug!(%parent, %id, heading, "created child");
        self.emit(
            &["subject.network", "verb.created", "object.node"],
            &[("node_id", &id.to_text()), ("child_node", &id.to_text())],
        );
        Ok(id)
    }

    fn erase_subtree(&mut self, node: NodeId) -> Result<()> {
        for child in self.fetch_children_ordered(node)?.into_iter().rev() {
            if self.aliases.is_alias(child) {
                if self.aliases.is_top(child) {
                    alias::erase_alias_root(&mut self.store, &mut self.aliases, child)?;
                } else {
                    alias::erase_alias_leaf(&mut self.store, &mut self.aliases, child)?;
                }
            } else {
                self.erase_subtree(child)?;
                self.store.remove_child_edge(node, child).ok();
            }
        }

        for alias_id in self.aliases.fetch_aliases(node) {
            if self.aliases.is_top(alias_id) {
                alias::erase_alias_root(&mut self.store, &mut self.aliases, alias_id)?;
            } else {
                alias::erase_alias_leaf(&mut self.store, &mut self.aliases, alias_id)?;
            }
        }

        attribute::erase_attr_tree(&mut self.store, node)?;
        self.store.headings_mut().erase(&node).ok();
        self.store.titles_mut().erase(&node).ok();
        self.store.bodies_mut().erase(&node).ok();
        self.store.resources_mut().erase(&node).ok();
        self.store.erase_node_row(node)?;
        Ok(())
    }

    /// Erase `id`. Returns the node the caller should now select. Fails if
    /// `id` is the root, a non-top alias, or does not exist.
    pub fn erase_node(&mut self, id: NodeId) -> Result<NodeId> {
        if id == self.root {
            return Err(GraphError::is_root(id));
        }
        if self.aliases.is_alias(id) && !self.aliases.is_top(id) {
            return Err(GraphError::invalid_node(Some(id)));
        }
        if !self.exists(id) {
            return Err(GraphError::not_found(id));
        }

        let next_selection = if self.selected == id || is_ancestor(&self.store, &self.aliases, id, self.selected) {
            Some(self.fetch_next_selected_as_if_erased(id)?)
        } else {
            None
        };

        let parent = self.fetch_parent(id);
        if self.aliases.is_alias(id) {
            alias::erase_alias_root(&mut self.store, &mut self.aliases, id)?;
        } else {
            let resolved = self.resolve(id);
            self.erase_subtree(resolved)?;
            if let Some(parent) = parent {
                self.store.remove_child_edge(parent, resolved).ok();
                if !is_in_attr_tree(&self.store, parent) {
                    attribute::pop_order(&mut self.store, parent, resolved)?;
                }
            }
        }

        if let Some(next) = next_selection {
            self.selected = next;
        }

        tracing::debug!(%id, "erased node");
        self.emit(
            &["subject.network", "verb.erased", "object.node"],
            &[("node_id", &id.to_text())],
        );
        Ok(self.selected)
    }

    // -- Ordering & movement -------------------------------------------------

    /// Move `from` to become a child of `to`. If `from` is an alias, this
    /// re-creates it under the new destination (its id is re-minted, since
    /// it is derived from source+destination).
    pub fn move_node(&mut self, from: NodeId, to: NodeId) -> Result<NodeId> {
        let resolved_to = self.resolve(to);
        if !self.exists(from) {
            return Err(GraphError::not_found(from));
        }
        if !self.store.node_exists(resolved_to) {
            return Err(GraphError::not_found(to));
        }
        if self.aliases.is_alias(to) {
            return Err(GraphError::invalid_node(Some(to)));
        }
        if from == self.root {
            return Err(GraphError::is_root(from));
        }
        if is_ancestor(&self.store, &self.aliases, from, resolved_to) {
            return Err(GraphError::is_lineal(from, resolved_to));
        }
        let heading = self
            .fetch_heading(from)
            .ok_or_else(|| GraphError::invalid_node(Some(from)))?;
        if let Some(_existing) = child_with_heading(&self.store, &self.aliases, resolved_to, &heading) {
            return Err(GraphError::duplicate_child_heading(resolved_to, heading));
        }

        if self.aliases.is_alias(from) {
            let resolved_src = self.resolve(from);
            alias::erase_alias_root(&mut self.store, &mut self.aliases, from)?;
            let new_id = alias::create_alias(&mut self.store, &mut self.aliases, self.root, resolved_src, resolved_to)?;
            self.emit(
                &["subject.network", "verb.moved", "object.node"],
                &[("old_parent_node", &from.to_text()), ("new_parent_node", &to.to_text())],
            );
            return Ok(new_id);
        }

        let old_parent = self
            .fetch_parent(from)
            .ok_or_else(|| GraphError::invalid_node(Some(from)))?;
        self.store.remove_child_edge(old_parent, from)?;
        if !is_in_attr_tree(&self.store, old_parent) {
            attribute::pop_order(&mut self.store, old_parent, from)?;
        }
        self.store.add_child_edge(resolved_to, from)?;
        attribute::push_order(&mut self.store, resolved_to, from)?;

        self.emit(
            &["subject.network", "verb.moved", "object.node"],
            &[
                ("old_parent_node", &old_parent.to_text()),
                ("new_parent_node", &resolved_to.to_text()),
            ],
        );
        Ok(resolved_to)
    }

    /// Swap the positions of `a` and `b`. Fails if either is root or if one
    /// is an ancestor of the other.
    pub fn swap_nodes(&mut self, a: NodeId, b: NodeId) -> Result<(NodeId, NodeId)> {
        if a == self.root || b == self.root {
            return Err(GraphError::is_root(self.root));
        }
        if is_ancestor(&self.store, &self.aliases, a, b) || is_ancestor(&self.store, &self.aliases, b, a) {
            return Err(GraphError::is_lineal(a, b));
        }
        let parent_a = self.fetch_parent(a).ok_or_else(|| GraphError::invalid_node(Some(a)))?;
        let parent_b = self.fetch_parent(b).ok_or_else(|| GraphError::invalid_node(Some(b)))?;

        if parent_a == parent_b {
            let mut order = attribute::order_ids(&self.store, parent_a);
            let resolved_a = self.resolve(a);
            let resolved_b = self.resolve(b);
            let (ia, ib) = (
                order.iter().position(|x| *x == resolved_a),
                order.iter().position(|x| *x == resolved_b),
            );
            if let (Some(ia), Some(ib)) = (ia, ib) {
                order.swap(ia, ib);
            }
            attribute::set_order(&mut self.store, parent_a, &order)?;
        } else {
            let resolved_a = self.resolve(a);
            let resolved_b = self.resolve(b);
            // Capture each parent's current order, substituting the
            // counterpart node at the swapped node's position, before
            // moving anything: `move_node` appends at the destination's
            // order tail, which would otherwise lose each node's original
            // position once the swap lands.
            let mut order_a = attribute::order_ids(&self.store, parent_a);
            let mut order_b = attribute::order_ids(&self.store, parent_b);
            if let Some(pos) = order_a.iter().position(|x| *x == resolved_a) {
                order_a[pos] = resolved_b;
            }
            if let Some(pos) = order_b.iter().position(|x| *x == resolved_b) {
                order_b[pos] = resolved_a;
            }

            self.move_node(a, parent_b)?;
            self.move_node(b, parent_a)?;

            attribute::set_order(&mut self.store, parent_a, &order_a)?;
            attribute::set_order(&mut self.store, parent_b, &order_b)?;
        }

        self.emit(
            &["subject.network", "verb.moved", "object.node"],
            &[("from_node", &a.to_text()), ("to_node", &b.to_text())],
        );
        Ok((b, a))
    }

    /// Overwrite `parent`'s child order outright. `new_order` must be a
    /// permutation of `parent`'s current (unresolved) children.
    pub fn reorder_children(&mut self, parent: NodeId, new_order: &[NodeId]) -> Result<()> {
        let resolved_parent = self.resolve(parent);
        let current = self.fetch_children_ordered(resolved_parent)?;
        let mut sorted_current = current.clone();
        let mut sorted_new = new_order.to_vec();
        sorted_current.sort();
        sorted_new.sort();
        if sorted_current != sorted_new {
            return Err(GraphError::invalid_ordering(
                resolved_parent,
                "new_order is not a permutation of the current children",
            ));
        }
        let resolved_order: Vec<NodeId> = new_order.iter().map(|id| self.resolve(*id)).collect();
        attribute::set_order(&mut self.store, resolved_parent, &resolved_order)?;
        Ok(())
    }

    // -- Alias delegation -----------------------------------------------------

    /// Create an alias of `src` under `dst`.
    pub fn create_alias(&mut self, src: NodeId, dst: NodeId) -> Result<NodeId> {
        let alias_id = alias::create_alias(&mut self.store, &mut self.aliases, self.root, src, dst)?;
        self.emit(
            &["subject.network", "verb.created", "object.alias"],
            &[("alias_id", &alias_id.to_text())],
        );
        Ok(alias_id)
    }

    // -- Field updates ---------------------------------------------------------

    /// Overwrite `id`'s heading. Fails if a sibling already holds the new
    /// heading.
    pub fn update_heading(&mut self, id: NodeId, heading: &str) -> Result<()> {
        Heading::parse(heading).ok_or_else(|| GraphError::invalid_heading(heading))?;
        let resolved = self.resolve(id);
        if let Some(parent) = self.fetch_parent(id) {
            if let Some(existing) = child_with_heading(&self.store, &self.aliases, parent, heading) {
                if self.resolve(existing) != resolved {
                    return Err(GraphError::duplicate_child_heading(parent, heading.to_string()));
                }
            }
        }
        self.store.headings_mut().replace(&resolved, heading.to_string())?;
        Ok(())
    }

    /// Overwrite `id`'s title.
    pub fn update_title(&mut self, id: NodeId, title: &str) -> Result<()> {
        let resolved = self.resolve(id);
        if self.store.titles().contains(&resolved) {
            self.store.titles_mut().replace(&resolved, title.to_string())?;
        } else {
            self.store.titles_mut().create(resolved, title.to_string())?;
        }
        Ok(())
    }

    /// Overwrite `id`'s body.
    pub fn update_body(&mut self, id: NodeId, body: &str) -> Result<()> {
        let resolved = self.resolve(id);
        if self.store.bodies().contains(&resolved) {
            self.store.bodies_mut().replace(&resolved, body.to_string())?;
        } else {
            self.store.bodies_mut().create(resolved, body.to_string())?;
        }
        Ok(())
    }

    // -- Sibling traversal -----------------------------------------------------

    fn siblings_of(&self, id: NodeId) -> Result<(NodeId, Vec<NodeId>)> {
        let parent = self.fetch_parent(id).ok_or_else(|| GraphError::invalid_node(Some(id)))?;
        let siblings = self.fetch_children_ordered(parent)?;
        Ok((parent, siblings))
    }

    /// The sibling immediately preceding `n`, or `n` itself if it is first.
    pub fn fetch_above(&self, n: NodeId) -> Result<NodeId> {
        let (_, siblings) = self.siblings_of(n)?;
        let idx = siblings
            .iter()
            .position(|x| *x == n)
            .ok_or_else(|| GraphError::invalid_node(Some(n)))?;
        Ok(siblings[idx.saturating_sub(1)])
    }

    /// The sibling immediately following `n`, or `n` itself if it is last.
    pub fn fetch_below(&self, n: NodeId) -> Result<NodeId> {
        let (_, siblings) = self.siblings_of(n)?;
        let idx = siblings
            .iter()
            .position(|x| *x == n)
            .ok_or_else(|| GraphError::invalid_node(Some(n)))?;
        Ok(siblings[(idx + 1).min(siblings.len() - 1)])
    }

    /// The recommended next selection after erasing `n`: above, else below,
    /// else the parent.
    pub fn fetch_next_selected_as_if_erased(&self, n: NodeId) -> Result<NodeId> {
        if let Ok(above) = self.fetch_above(n) {
            if above != n {
                return Ok(above);
            }
        }
        if let Ok(below) = self.fetch_below(n) {
            if below != n {
                return Ok(below);
            }
        }
        self.fetch_parent(n).ok_or_else(|| GraphError::invalid_node(Some(n)))
    }

    fn select(&mut self, to: NodeId) -> Result<()> {
        if !self.exists(to) {
            return Err(GraphError::not_found(to));
        }
        let from = self.selected;
        self.selected = to;
        self.emit(
            &["subject.network", "verb.selected", "object.node"],
            &[("from_node", &from.to_text()), ("to_node", &to.to_text())],
        );
        Ok(())
    }

    /// Move the selection cursor to `id`.
    pub fn select_node(&mut self, id: NodeId) -> Result<()> {
        self.select(id)
    }

    /// Step the selection cursor to the parent of the current selection.
    pub fn travel_up(&mut self) -> Result<()> {
        let parent = self
            .fetch_parent(self.selected)
            .ok_or_else(|| GraphError::invalid_node(Some(self.selected)))?;
        self.select(parent)
    }

    /// Step the selection cursor into the median child of the current
    /// selection.
    pub fn travel_right(&mut self) -> Result<()> {
        let children = self.fetch_children_ordered(self.selected)?;
        if children.is_empty() {
            return Err(GraphError::invalid_node(Some(self.selected)));
        }
        let median = children[children.len() / 2];
        self.select(median)
    }

    /// Step the selection cursor back to wherever it came from — same as
    /// `travel_up`, kept distinct for symmetry with `travel_right`.
    pub fn travel_left(&mut self) -> Result<()> {
        self.travel_up()
    }

    /// Step the selection cursor to the previous sibling.
    pub fn travel_down(&mut self) -> Result<()> {
        let above = self.fetch_above(self.selected)?;
        self.select(above)
    }

    /// Step the selection cursor to the next sibling.
    pub fn travel_next(&mut self) -> Result<()> {
        let below = self.fetch_below(self.selected)?;
        self.select(below)
    }

    /// Jump the selection cursor to the first sibling.
    pub fn travel_top(&mut self) -> Result<()> {
        let (_, siblings) = self.siblings_of(self.selected)?;
        let first = *siblings.first().ok_or_else(|| GraphError::invalid_node(Some(self.selected)))?;
        self.select(first)
    }

    /// Jump the selection cursor to the last sibling.
    pub fn travel_bottom(&mut self) -> Result<()> {
        let (_, siblings) = self.siblings_of(self.selected)?;
        let last = *siblings.last().ok_or_else(|| GraphError::invalid_node(Some(self.selected)))?;
        self.select(last)
    }

    /// Hop count from `ancestor` down to `descendant` along the parent
    /// chain. Pre-condition: `ancestor` is lineally related to `descendant`.
    pub fn distance(&self, ancestor: NodeId, descendant: NodeId) -> Result<usize> {
        let mut cur = descendant;
        let mut hops = 0usize;
        while cur != ancestor {
            let parent = self
                .fetch_parent(cur)
                .ok_or_else(|| GraphError::invalid_lineage(ancestor, descendant))?;
            cur = parent;
            hops += 1;
        }
        Ok(hops)
    }

    fn median_window(items: &[NodeId], max: usize) -> Vec<NodeId> {
        if items.len() <= max || max == 0 {
            return items.to_vec();
        }
        let center = items.len() / 2;
        let half = max / 2;
        let start = center.saturating_sub(half);
        let end = (start + max).min(items.len());
        items[start..end].to_vec()
    }

    /// The breadth- and depth-limited neighborhood around `n` used for
    /// rendering: the left-lineal chain up to `horizontal_max` ancestors,
    /// each with its median-window of up to `vertical_max` siblings, plus
    /// `n`'s own median-window of children.
    pub fn fetch_visible_nodes_from(
        &self,
        n: NodeId,
        horizontal_max: usize,
        vertical_max: usize,
    ) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut chain = vec![n];
        let mut cur = n;
        while let Some(parent) = self.fetch_parent(cur) {
            if chain.len() >= horizontal_max {
                break;
            }
            chain.push(parent);
            cur = parent;
        }
        for node in &chain {
            if let Ok((_, siblings)) = self.siblings_of(*node) {
                for s in Self::median_window(&siblings, vertical_max) {
                    if seen.insert(s) {
                        out.push(s);
                    }
                }
            } else if seen.insert(*node) {
                out.push(*node);
            }
        }
        if let Ok(children) = self.fetch_children_ordered(n) {
            for c in Self::median_window(&children, vertical_max) {
                if seen.insert(c) {
                    out.push(c);
                }
            }
        }
        if seen.insert(n) {
            out.push(n);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bootstrap() -> Kernel {
        Kernel::bootstrap(&StoreConfig::in_memory()).unwrap()
    }

    #[test]
    fn create_and_query_path() {
        let mut k = bootstrap();
        let root = k.root();
        let n1 = k.create_child(root, "1", None).unwrap();
        let n2 = k.create_child(n1, "2", None).unwrap();
        let n3 = k.create_child(n2, "3", None).unwrap();

        assert_eq!(k.distance(root, n3).unwrap(), 3);
        assert_eq!(k.fetch_children_ordered(n1).unwrap(), vec![n2]);
        assert!(attribute::order_ids(&k.store, n1).contains(&n2));
        let _ = n3;
    }

    #[test]
    fn duplicate_heading_is_rejected() {
        let mut k = bootstrap();
        let root = k.root();
        k.create_child(root, "x", None).unwrap();
        let err = k.create_child(root, "x", None).unwrap_err();
        assert_eq!(err.kind(), kgraph_core::ErrorKind::DuplicateChildHeading);
    }

    #[test]
    fn alias_basics() {
        let mut k = bootstrap();
        let root = k.root();
        let n1 = k.create_child(root, "1", None).unwrap();
        let n2 = k.create_child(root, "2", None).unwrap();
        let a = k.create_alias(n1, n2).unwrap();

        assert!(k.is_alias(a));
        assert!(k.is_top_alias(a));
        assert_eq!(k.resolve(a), n1);
        assert_eq!(k.fetch_parent(a), Some(n2));

        k.erase_node(a).unwrap();
        assert!(k.exists(n1));
        assert!(k.exists(n2));
        assert!(!attribute::order_ids(&k.store, n2).contains(&n1));
    }

    #[test]
    fn non_top_alias_cannot_be_erased_directly() {
        let mut k = bootstrap();
        let root = k.root();
        let n1 = k.create_child(root, "1", None).unwrap();
        let n1a = k.create_child(n1, "a", None).unwrap();
        let n2 = k.create_child(root, "2", None).unwrap();
        let n3 = k.create_child(root, "3", None).unwrap();

        let a21 = k.create_alias(n1, n2).unwrap();
        let _a32 = k.create_alias(n2, n3).unwrap();

        let nested = k.fetch_children_ordered(_a32).unwrap();
        assert_eq!(nested.len(), 1);
        let err = k.erase_node(nested[0]).unwrap_err();
        assert_eq!(err.kind(), kgraph_core::ErrorKind::InvalidNode);

        k.erase_node(a21).unwrap();
        let _ = n1a;
    }

    #[test]
    fn order_round_trip_and_swap() {
        let mut k = bootstrap();
        let root = k.root();
        let c1 = k.create_child(root, "c1", None).unwrap();
        let c2 = k.create_child(root, "c2", None).unwrap();
        let c3 = k.create_child(root, "c3", None).unwrap();

        k.reorder_children(root, &[c3, c1, c2]).unwrap();
        assert_eq!(k.fetch_children_ordered(root).unwrap(), vec![c3, c1, c2]);

        k.swap_nodes(c1, c3).unwrap();
        let after_first_swap = k.fetch_children_ordered(root).unwrap();
        k.swap_nodes(c1, c3).unwrap();
        let after_second_swap = k.fetch_children_ordered(root).unwrap();
        assert_eq!(after_second_swap, vec![c3, c1, c2]);
        assert_ne!(after_first_swap, after_second_swap);
    }

    #[test]
    fn swap_nodes_across_parents_preserves_both_order_bodies() {
        let mut k = bootstrap();
        let root = k.root();
        let p1 = k.create_child(root, "p1", None).unwrap();
        let p2 = k.create_child(root, "p2", None).unwrap();
        let a = k.create_child(p1, "a", None).unwrap();
        let b1 = k.create_child(p2, "b1", None).unwrap();
        let b2 = k.create_child(p2, "b2", None).unwrap();
        let b3 = k.create_child(p2, "b3", None).unwrap();

        k.swap_nodes(a, b2).unwrap();

        assert_eq!(k.fetch_parent(a), Some(p2));
        assert_eq!(k.fetch_parent(b2), Some(p1));
        assert_eq!(k.fetch_children_ordered(p1).unwrap(), vec![b2]);
        assert_eq!(k.fetch_children_ordered(p2).unwrap(), vec![b1, a, b3]);
    }
}
