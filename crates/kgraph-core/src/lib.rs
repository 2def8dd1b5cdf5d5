//! Foundation types for the kgraph personal knowledge graph engine.
//!
//! This crate has no I/O and no dependency on the rest of the workspace —
//! it provides the identifier service, the heading grammar, and the unified
//! error taxonomy that every other `kgraph-*` crate builds on.

#![warn(missing_docs)]

mod error;
mod heading;
mod id;
/// Wall-clock timestamp helpers (genesis stamps only).
pub mod time;

pub use error::{ErrorKind, GraphError};
pub use heading::{
    is_valid_heading, is_valid_heading_char, Heading, GENESIS_HEADING, ORDER_HEADING,
    ROOT_HEADING,
};
pub use id::{combine, new_id, NodeId};

/// Convenient alias for `Result<T, GraphError>`, used throughout the workspace.
pub type Result<T> = std::result::Result<T, GraphError>;
