#![warn(missing_docs)]
//! The delta-layered table cache and its on-disk (SQLite) mirror.
//!
//! [`Table`] holds one relation's baseline plus pending deltas. [`Store`]
//! owns one `Table` per relation named in the schema and reconciles all of
//! them against a single `rusqlite` connection in one transaction per
//! [`Store::flush_delta_to_disk`] call.

mod error;
mod schema;
mod store;
mod table;

pub use error::StoreError;
pub use schema::CREATE_TABLES_SQL;
pub use store::{open, Store, StoreConfig};
pub use table::{Action, DeltaItem, FlushOp, Table};
