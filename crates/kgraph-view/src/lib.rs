//! The path/query view layer: an anchor plus an ordered chain of links,
//! consumed by a terminal actor. Modeled as tagged-variant sum types (an
//! [`Anchor`], a [`Link`] per hop, a [`Predicate`] per filter) rather than
//! trait-object dispatch, per the graph kernel's own design notes.

#![warn(missing_docs)]

mod anchor;
mod link;
mod predicate;

pub use anchor::Anchor;
pub use link::Link;
pub use predicate::Predicate;

use kgraph_core::{GraphError, NodeId, Result};
use kgraph_engine::Kernel;
use std::collections::BTreeSet;

/// A composable graph query: an anchor plus zero or more links.
#[derive(Debug, Clone)]
pub struct View {
    anchor: Anchor,
    links: Vec<Link>,
}

impl View {
    /// Start a view at `anchor`.
    pub fn new(anchor: Anchor) -> Self {
        Self {
            anchor,
            links: Vec::new(),
        }
    }

    /// Start a view at the root.
    pub fn root() -> Self {
        Self::new(Anchor::Root)
    }

    /// Start a view at an explicit node.
    pub fn at(node: NodeId) -> Self {
        Self::new(Anchor::Node(node))
    }

    fn with_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    /// Append a `child` link.
    pub fn child(self, pred: Predicate) -> Self {
        self.with_link(Link::Child(pred))
    }
    /// Append a `child` link matching a heading exactly — the common case.
    pub fn child_heading(self, heading: impl Into<String>) -> Self {
        self.child(Predicate::Heading(heading.into()))
    }
    /// Append a `parent` link.
    pub fn parent(self) -> Self {
        self.with_link(Link::Parent)
    }
    /// Append a `sibling` link.
    pub fn sibling(self, pred: Predicate) -> Self {
        self.with_link(Link::Sibling(pred))
    }
    /// Append a `sibling_incl` link.
    pub fn sibling_incl(self, pred: Predicate) -> Self {
        self.with_link(Link::SiblingIncl(pred))
    }
    /// Append an `ancestor` link.
    pub fn ancestor(self, pred: Predicate) -> Self {
        self.with_link(Link::Ancestor(pred))
    }
    /// Append a `desc` link.
    pub fn desc(self, pred: Predicate) -> Self {
        self.with_link(Link::Desc(pred))
    }
    /// Append a `direct_desc` link.
    pub fn direct_desc(self, pred: Predicate) -> Self {
        self.with_link(Link::DirectDesc(pred))
    }
    /// Append a `leaf` link.
    pub fn leaf(self) -> Self {
        self.with_link(Link::Leaf)
    }
    /// Append an `alias` link.
    pub fn alias(self) -> Self {
        self.with_link(Link::Alias)
    }
    /// Append an `attr` link.
    pub fn attr(self) -> Self {
        self.with_link(Link::Attr)
    }
    /// Append a `resolve` link.
    pub fn resolve(self) -> Self {
        self.with_link(Link::Resolve)
    }
    /// Append an `order` link.
    pub fn order(self) -> Self {
        self.with_link(Link::Order)
    }
    /// Append a `single` link.
    pub fn single(self) -> Self {
        self.with_link(Link::Single)
    }

    /// Evaluate the full chain against `kernel`, returning the resulting
    /// node set (deduplicated, order preserved where the links define one).
    pub fn eval(&self, kernel: &Kernel) -> Result<Vec<NodeId>> {
        let mut current = self.anchor.eval(kernel);
        for link in &self.links {
            current = link.apply(kernel, &current)?;
        }
        Ok(current)
    }

    fn eval_singleton(&self, kernel: &Kernel) -> Result<NodeId> {
        let nodes = self.eval(kernel)?;
        match nodes.as_slice() {
            [] => Err(GraphError::invalid_path(self.to_string())),
            [single] => Ok(*single),
            _ => Err(GraphError::ambiguous_path(self.to_string())),
        }
    }

    // -- Actors ---------------------------------------------------------------

    /// Require the view to resolve to exactly one node; return it.
    pub fn fetch_node(&self, kernel: &Kernel) -> Result<NodeId> {
        self.eval_singleton(kernel)
    }

    /// Walk the chain; if the final `child(heading)` link resolves to
    /// nothing, create that child under the preceding (singleton) node.
    pub fn fetch_or_create_node(&self, kernel: &mut Kernel) -> Result<NodeId> {
        let mut current = self.anchor.eval(kernel);
        for link in &self.links {
            let next = link.apply(kernel, &current)?;
            current = if next.is_empty() {
                if let (Link::Child(Predicate::Heading(heading)), [parent]) = (link, current.as_slice()) {
                    vec![kernel.create_child(*parent, heading, None)?]
                } else {
                    next
                }
            } else {
                next
            };
        }
        match current.as_slice() {
            [single] => Ok(*single),
            [] => Err(GraphError::invalid_path(self.to_string())),
            _ => Err(GraphError::ambiguous_path(self.to_string())),
        }
    }

    /// Require the final link to be `child(heading)` and to currently
    /// resolve to nothing; create that child under the prefix's singleton
    /// node.
    pub fn create_node(&self, kernel: &mut Kernel) -> Result<NodeId> {
        let (prefix, last) = self
            .links
            .split_last()
            .map(|(last, rest)| (rest, last.clone()))
            .ok_or_else(|| GraphError::invalid_path("create_node requires at least one link".to_string()))?;
        let Link::Child(Predicate::Heading(heading)) = last else {
            return Err(GraphError::invalid_path(
                "create_node requires the final link to be child(heading)".to_string(),
            ));
        };

        let mut parent_set = self.anchor.eval(kernel);
        for link in prefix {
            parent_set = link.apply(kernel, &parent_set)?;
        }
        let [parent] = parent_set.as_slice() else {
            return Err(GraphError::ambiguous_path(self.to_string()));
        };

        if !Link::Child(Predicate::Heading(heading.clone()))
            .apply(kernel, &[*parent])?
            .is_empty()
        {
            return Err(GraphError::duplicate_child_heading(*parent, heading));
        }

        kernel.create_child(*parent, &heading, None)
    }

    /// Require the view to resolve to exactly one node; erase it.
    pub fn erase_node(&self, kernel: &mut Kernel) -> Result<NodeId> {
        let node = self.eval_singleton(kernel)?;
        kernel.erase_node(node)
    }

    /// `true` iff the view resolves to at least one node.
    pub fn exists(&self, kernel: &Kernel) -> bool {
        self.eval(kernel).map(|nodes| !nodes.is_empty()).unwrap_or(false)
    }

    /// The view's resolved nodes as a deduplicated, unordered set.
    pub fn to_node_set(&self, kernel: &Kernel) -> Result<BTreeSet<NodeId>> {
        Ok(self.eval(kernel)?.into_iter().collect())
    }

    /// The view's resolved nodes' headings, as a set (nodes with no heading
    /// are omitted).
    pub fn to_heading_set(&self, kernel: &Kernel) -> Result<BTreeSet<String>> {
        Ok(self
            .eval(kernel)?
            .into_iter()
            .filter_map(|n| kernel.fetch_heading(n))
            .collect())
    }

    /// The view's resolved nodes, in traversal order, with duplicates
    /// removed.
    pub fn to_node_vec(&self, kernel: &Kernel) -> Result<Vec<NodeId>> {
        self.eval(kernel)
    }

    /// The singleton result's heading.
    pub fn fetch_heading(&self, kernel: &Kernel) -> Result<Option<String>> {
        Ok(kernel.fetch_heading(self.eval_singleton(kernel)?))
    }

    /// The singleton result's title.
    pub fn fetch_title(&self, kernel: &Kernel) -> Result<Option<String>> {
        Ok(kernel.fetch_title(self.eval_singleton(kernel)?))
    }

    /// The singleton result's body.
    pub fn fetch_body(&self, kernel: &Kernel) -> Result<Option<String>> {
        Ok(kernel.fetch_body(self.eval_singleton(kernel)?))
    }

    /// Overwrite the singleton result's body.
    pub fn update_body(&self, kernel: &mut Kernel, body: &str) -> Result<()> {
        let node = self.eval_singleton(kernel)?;
        kernel.update_body(node, body)
    }

    /// The root-relative dotted heading path of the singleton result, with a
    /// leading `/` (e.g. `/1.2.3`).
    pub fn abs_path_flat(&self, kernel: &Kernel) -> Result<String> {
        let node = self.eval_singleton(kernel)?;
        let mut headings = Vec::new();
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == kernel.root() {
                break;
            }
            if let Some(heading) = kernel.fetch_heading(id) {
                headings.push(heading);
            }
            cur = kernel.fetch_parent(id);
        }
        headings.reverse();
        Ok(format!("/{}", headings.join(".")))
    }

    /// The number of nodes the view currently resolves to.
    pub fn count(&self, kernel: &Kernel) -> usize {
        self.eval(kernel).map(|nodes| nodes.len()).unwrap_or(0)
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.anchor)?;
        for link in &self.links {
            write!(f, ".{link}")?;
        }
        Ok(())
    }
}
