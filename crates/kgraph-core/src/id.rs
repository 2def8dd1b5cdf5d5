//! 128-bit node identifiers and the alias identity combiner.
//!
//! Real nodes get a freshly minted [`NodeId`]. Alias nodes never mint one —
//! their identifier is *derived* from their resolved source and their
//! destination via [`combine`], which is involutive under its second
//! argument: `combine(combine(a, b), b) == a`. That lets the kernel recover
//! an alias's resolved source from nothing but its own id and its parent.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A 128-bit identifier for a node, real or alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Mint a fresh, random identifier for a real node.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID (used when loading rows back from the store).
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Canonical textual form, as stored in the `uuid`/`*_uuid` columns.
    pub fn to_text(&self) -> String {
        self.0.as_hyphenated().to_string()
    }

    /// Parse the canonical textual form written by [`NodeId::to_text`].
    pub fn parse(text: &str) -> Option<Self> {
        Uuid::parse_str(text).ok().map(Self)
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for NodeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<NodeId> for Uuid {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Mint a fresh node identifier. Thin wrapper kept for call-site symmetry
/// with [`combine`] (`new_id()` / `combine(a, b)`, per the identifier
/// service's two pure operations).
pub fn new_id() -> NodeId {
    NodeId::new()
}

/// Derive an alias identifier from its resolved source and destination.
///
/// Implemented as a byte-wise XOR over the 128-bit representation, which is
/// involutive under the second argument: `combine(combine(a, b), b) == a`.
/// This is how `resolve` recovers a source id from nothing but an alias id
/// and its (known) destination.
pub fn combine(a: NodeId, b: NodeId) -> NodeId {
    let a_bytes = a.0.as_bytes();
    let b_bytes = b.0.as_bytes();
    let mut out = [0u8; 16];
    for i in 0..16 {
        out[i] = a_bytes[i] ^ b_bytes[i];
    }
    NodeId::from_uuid(Uuid::from_bytes(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_is_involutive_under_second_argument() {
        let a = NodeId::new();
        let b = NodeId::new();
        let combined = combine(a, b);
        assert_eq!(combine(combined, b), a);
    }

    #[test]
    fn combine_is_commutative_but_id_space_distinguishes_roles() {
        // XOR is commutative, so combine(a, b) == combine(b, a); callers must
        // not confuse which argument is the destination, even though the
        // combiner itself can't tell them apart.
        let a = NodeId::new();
        let b = NodeId::new();
        assert_eq!(combine(a, b), combine(b, a));
    }

    #[test]
    fn to_text_round_trips_through_parse() {
        let id = NodeId::new();
        let text = id.to_text();
        assert_eq!(NodeId::parse(&text), Some(id));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(NodeId::parse("not-a-uuid"), None);
    }

    proptest::proptest! {
        #[test]
        fn combine_involution_holds_for_arbitrary_bytes(
            a_bytes: [u8; 16],
            b_bytes: [u8; 16],
        ) {
            let a = NodeId::from_uuid(Uuid::from_bytes(a_bytes));
            let b = NodeId::from_uuid(Uuid::from_bytes(b_bytes));
            let combined = combine(a, b);
            proptest::prop_assert_eq!(combine(combined, b), a);
        }
    }
}
