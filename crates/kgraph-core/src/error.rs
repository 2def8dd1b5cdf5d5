//! The unified error type for the graph kernel.
//!
//! Every fallible operation returns `Result<T, GraphError>`. Callers and
//! tests are expected to match on [`GraphError::kind`], not on the
//! formatted message — the message is for humans, the kind is the contract.

use crate::id::NodeId;
use serde::{Deserialize, Serialize};

/// The error kind, independent of whatever context a [`GraphError`] carries.
///
/// Grouped by the layer that raises them: node, alias, store, and ordering
/// kinds, plus an escape hatch for assertion-style failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Node kinds.
    InvalidNode,
    InvalidHeading,
    InvalidParent,
    InvalidRoot,
    IsRoot,
    IsLineal,
    DuplicateChildHeading,
    ParentNotFound,
    NotFound,
    InvalidLineage,
    AmbiguousPath,
    InvalidPath,
    /// Alias kinds.
    InvalidAlias,
    SrcNotFound,
    DstNotFound,
    SrcEqualsDst,
    SrcAncestorOfDst,
    AliasAlreadyExists,
    /// Store kinds.
    DataAlreadyExists,
    EntryNotFound,
    UpdateFailed,
    /// Invariant kinds.
    InvalidOrdering,
    Attribute,
    /// Reserved for assertion-style failures of documented invariants.
    Uncategorized,
}

/// The unified error type returned by every fallible kernel operation.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
pub enum GraphError {
    /// `node` does not satisfy the heading/existence expectations of the
    /// operation that rejected it.
    #[error("invalid node: {node:?}")]
    InvalidNode {
        /// The offending node, if one was named.
        node: Option<NodeId>,
    },

    /// `heading` fails the heading grammar (§ heading).
    #[error("invalid heading: {heading:?}")]
    InvalidHeading {
        /// The rejected heading text.
        heading: String,
    },

    /// `parent` is not a valid resolved parent for the attempted mutation.
    #[error("invalid parent: {parent:?}")]
    InvalidParent {
        /// The offending parent id.
        parent: NodeId,
    },

    /// The root could not be established or located on load.
    #[error("invalid root: {reason}")]
    InvalidRoot {
        /// Why the root lookup failed.
        reason: String,
    },

    /// The operation does not permit operating on the root node.
    #[error("operation not permitted on root: {node}")]
    IsRoot {
        /// The root node id.
        node: NodeId,
    },

    /// `ancestor` and `descendant` are lineally related where the operation
    /// requires them not to be (or vice versa).
    #[error("{ancestor} and {descendant} are lineally related")]
    IsLineal {
        /// The ancestor side of the relation.
        ancestor: NodeId,
        /// The descendant side of the relation.
        descendant: NodeId,
    },

    /// `parent` already has a child with `heading`.
    #[error("{parent} already has a child with heading {heading:?}")]
    DuplicateChildHeading {
        /// The parent under which the heading collides.
        parent: NodeId,
        /// The colliding heading text.
        heading: String,
    },

    /// `parent` could not be resolved to an existing node.
    #[error("parent not found: {parent}")]
    ParentNotFound {
        /// The missing parent id.
        parent: NodeId,
    },

    /// `node` does not exist.
    #[error("not found: {node}")]
    NotFound {
        /// The missing node id.
        node: NodeId,
    },

    /// `descendant` is not actually a descendant of `ancestor`.
    #[error("{descendant} is not a descendant of {ancestor}")]
    InvalidLineage {
        /// The claimed ancestor.
        ancestor: NodeId,
        /// The node that turned out not to be its descendant.
        descendant: NodeId,
    },

    /// A path query resolved to more than one node where exactly one was required.
    #[error("ambiguous path: {path}")]
    AmbiguousPath {
        /// The textual path that was ambiguous.
        path: String,
    },

    /// A path query's textual form could not be parsed.
    #[error("invalid path: {path}")]
    InvalidPath {
        /// The textual path that failed to parse.
        path: String,
    },

    /// An alias operation's endpoints are fundamentally invalid (not a
    /// specific missing-endpoint case — see [`GraphError::SrcNotFound`] /
    /// [`GraphError::DstNotFound`]).
    #[error("invalid alias: {alias}")]
    InvalidAlias {
        /// The offending alias id.
        alias: NodeId,
    },

    /// The alias source does not exist.
    #[error("alias source not found: {src}")]
    SrcNotFound {
        /// The missing source id.
        src: NodeId,
    },

    /// The alias destination does not exist.
    #[error("alias destination not found: {dst}")]
    DstNotFound {
        /// The missing destination id.
        dst: NodeId,
    },

    /// The resolved source and destination of a proposed alias are the same node.
    #[error("alias source and destination resolve to the same node: {node}")]
    SrcEqualsDst {
        /// The shared resolved node.
        node: NodeId,
    },

    /// The resolved source is an ancestor of the resolved destination (would
    /// create a cycle).
    #[error("alias source {src} is an ancestor of destination {dst}")]
    SrcAncestorOfDst {
        /// The resolved source.
        src: NodeId,
        /// The resolved destination.
        dst: NodeId,
    },

    /// An alias with this id already exists.
    #[error("alias already exists: {alias}")]
    AliasAlreadyExists {
        /// The colliding alias id.
        alias: NodeId,
    },

    /// A store `create` targeted a key that is already present.
    #[error("data already exists for key {key}")]
    DataAlreadyExists {
        /// The colliding key, rendered for diagnostics.
        key: String,
    },

    /// A store `update`/`erase` targeted a key that is absent.
    #[error("entry not found for key {key}")]
    EntryNotFound {
        /// The missing key, rendered for diagnostics.
        key: String,
    },

    /// A store `update` failed for a reason other than a missing key.
    #[error("update failed for key {key}: {reason}")]
    UpdateFailed {
        /// The key whose update failed.
        key: String,
        /// Why the update failed.
        reason: String,
    },

    /// An order body's id set diverges from its parent's resolved child set.
    #[error("invalid ordering at {parent}: {reason}")]
    InvalidOrdering {
        /// The parent whose order body is inconsistent.
        parent: NodeId,
        /// A description of the divergence.
        reason: String,
    },

    /// The attribute subsystem rejected the operation (e.g. an attribute
    /// node would have gained attributes of its own).
    #[error("attribute subsystem rejected operation: {reason}")]
    Attribute {
        /// A description of why the attribute subsystem refused.
        reason: String,
    },

    /// An internal invariant failed in a way no specific kind above names.
    #[error("uncategorized invariant failure: {reason}")]
    Uncategorized {
        /// A description of the failed invariant.
        reason: String,
    },
}

impl GraphError {
    /// The error's kind, for matching independent of message text.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidNode { .. } => ErrorKind::InvalidNode,
            Self::InvalidHeading { .. } => ErrorKind::InvalidHeading,
            Self::InvalidParent { .. } => ErrorKind::InvalidParent,
            Self::InvalidRoot { .. } => ErrorKind::InvalidRoot,
            Self::IsRoot { .. } => ErrorKind::IsRoot,
            Self::IsLineal { .. } => ErrorKind::IsLineal,
            Self::DuplicateChildHeading { .. } => ErrorKind::DuplicateChildHeading,
            Self::ParentNotFound { .. } => ErrorKind::ParentNotFound,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidLineage { .. } => ErrorKind::InvalidLineage,
            Self::AmbiguousPath { .. } => ErrorKind::AmbiguousPath,
            Self::InvalidPath { .. } => ErrorKind::InvalidPath,
            Self::InvalidAlias { .. } => ErrorKind::InvalidAlias,
            Self::SrcNotFound { .. } => ErrorKind::SrcNotFound,
            Self::DstNotFound { .. } => ErrorKind::DstNotFound,
            Self::SrcEqualsDst { .. } => ErrorKind::SrcEqualsDst,
            Self::SrcAncestorOfDst { .. } => ErrorKind::SrcAncestorOfDst,
            Self::AliasAlreadyExists { .. } => ErrorKind::AliasAlreadyExists,
            Self::DataAlreadyExists { .. } => ErrorKind::DataAlreadyExists,
            Self::EntryNotFound { .. } => ErrorKind::EntryNotFound,
            Self::UpdateFailed { .. } => ErrorKind::UpdateFailed,
            Self::InvalidOrdering { .. } => ErrorKind::InvalidOrdering,
            Self::Attribute { .. } => ErrorKind::Attribute,
            Self::Uncategorized { .. } => ErrorKind::Uncategorized,
        }
    }

    /// Build an [`ErrorKind::InvalidNode`] error, optionally naming the node.
    pub fn invalid_node(node: impl Into<Option<NodeId>>) -> Self {
        Self::InvalidNode { node: node.into() }
    }

    /// Build an [`ErrorKind::InvalidHeading`] error.
    pub fn invalid_heading(heading: impl Into<String>) -> Self {
        Self::InvalidHeading {
            heading: heading.into(),
        }
    }

    /// Build a [`ErrorKind::DuplicateChildHeading`] error.
    pub fn duplicate_child_heading(parent: NodeId, heading: impl Into<String>) -> Self {
        Self::DuplicateChildHeading {
            parent,
            heading: heading.into(),
        }
    }

    /// Build a [`ErrorKind::NotFound`] error.
    pub fn not_found(node: NodeId) -> Self {
        Self::NotFound { node }
    }

    /// Build a [`ErrorKind::DataAlreadyExists`] error.
    pub fn data_already_exists(key: impl Into<String>) -> Self {
        Self::DataAlreadyExists { key: key.into() }
    }

    /// Build a [`ErrorKind::EntryNotFound`] error.
    pub fn entry_not_found(key: impl Into<String>) -> Self {
        Self::EntryNotFound { key: key.into() }
    }

    /// Build a [`ErrorKind::UpdateFailed`] error.
    pub fn update_failed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UpdateFailed {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`ErrorKind::InvalidRoot`] error.
    pub fn invalid_root(reason: impl Into<String>) -> Self {
        Self::InvalidRoot {
            reason: reason.into(),
        }
    }

    /// Build a [`ErrorKind::IsRoot`] error.
    pub fn is_root(node: NodeId) -> Self {
        Self::IsRoot { node }
    }

    /// Build a [`ErrorKind::IsLineal`] error.
    pub fn is_lineal(ancestor: NodeId, descendant: NodeId) -> Self {
        Self::IsLineal {
            ancestor,
            descendant,
        }
    }

    /// Build a [`ErrorKind::InvalidLineage`] error.
    pub fn invalid_lineage(ancestor: NodeId, descendant: NodeId) -> Self {
        Self::InvalidLineage {
            ancestor,
            descendant,
        }
    }

    /// Build a [`ErrorKind::ParentNotFound`] error.
    pub fn parent_not_found(parent: NodeId) -> Self {
        Self::ParentNotFound { parent }
    }

    /// Build a [`ErrorKind::InvalidParent`] error.
    pub fn invalid_parent(parent: NodeId) -> Self {
        Self::InvalidParent { parent }
    }

    /// Build a [`ErrorKind::SrcNotFound`] error.
    pub fn src_not_found(src: NodeId) -> Self {
        Self::SrcNotFound { src }
    }

    /// Build a [`ErrorKind::DstNotFound`] error.
    pub fn dst_not_found(dst: NodeId) -> Self {
        Self::DstNotFound { dst }
    }

    /// Build a [`ErrorKind::SrcEqualsDst`] error.
    pub fn src_equals_dst(node: NodeId) -> Self {
        Self::SrcEqualsDst { node }
    }

    /// Build a [`ErrorKind::SrcAncestorOfDst`] error.
    pub fn src_ancestor_of_dst(src: NodeId, dst: NodeId) -> Self {
        Self::SrcAncestorOfDst { src, dst }
    }

    /// Build a [`ErrorKind::AliasAlreadyExists`] error.
    pub fn alias_already_exists(alias: NodeId) -> Self {
        Self::AliasAlreadyExists { alias }
    }

    /// Build a [`ErrorKind::InvalidAlias`] error.
    pub fn invalid_alias(alias: NodeId) -> Self {
        Self::InvalidAlias { alias }
    }

    /// Build a [`ErrorKind::InvalidOrdering`] error.
    pub fn invalid_ordering(parent: NodeId, reason: impl Into<String>) -> Self {
        Self::InvalidOrdering {
            parent,
            reason: reason.into(),
        }
    }

    /// Build a [`ErrorKind::Attribute`] error.
    pub fn attribute(reason: impl Into<String>) -> Self {
        Self::Attribute {
            reason: reason.into(),
        }
    }

    /// Build a [`ErrorKind::AmbiguousPath`] error.
    pub fn ambiguous_path(path: impl Into<String>) -> Self {
        Self::AmbiguousPath { path: path.into() }
    }

    /// Build a [`ErrorKind::InvalidPath`] error.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_independent_of_message() {
        let node = NodeId::new();
        let a = GraphError::not_found(node);
        let b = GraphError::NotFound { node: NodeId::new() };
        assert_eq!(a.kind(), b.kind());
        assert_eq!(a.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn duplicate_child_heading_carries_context() {
        let parent = NodeId::new();
        let err = GraphError::duplicate_child_heading(parent, "x");
        assert_eq!(err.kind(), ErrorKind::DuplicateChildHeading);
        assert!(err.to_string().contains('x'));
    }
}
