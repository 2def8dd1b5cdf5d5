//! The graph kernel: node and edge lifecycle, the attribute subsystem, the
//! alias engine, and the selection cursor, built on top of `kgraph-store`'s
//! delta-layered cache.

#![warn(missing_docs)]

mod alias;
mod attribute;
mod events;
mod kernel;
mod root;

pub use alias::{AliasRecord, AliasStore};
pub use attribute::{fetch_genesis, is_in_attr_tree, is_in_order, order_ids};
pub use events::{EventSink, RecordingSink};
pub use kernel::Kernel;
pub use root::{initialize_root, locate_root};
