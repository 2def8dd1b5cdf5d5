//! Disk-level failures, kept separate from [`kgraph_core::GraphError`]
//! because they originate below the delta-layer abstraction (schema setup,
//! the backing `rusqlite` connection) rather than from a business rule.

use kgraph_core::GraphError;

/// Failures from opening, loading, or flushing the on-disk store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing SQLite connection returned an error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A row read back from disk could not be decoded (e.g. a non-UUID
    /// `uuid` column).
    #[error("corrupt row in table {table}: {reason}")]
    CorruptRow {
        /// The table the bad row came from.
        table: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

impl From<StoreError> for GraphError {
    fn from(err: StoreError) -> Self {
        GraphError::Uncategorized {
            reason: err.to_string(),
        }
    }
}
