//! The delta-layered table cache: one [`Table`] per logical relation, plus
//! the flush/load machinery that reconciles them with the on-disk SQLite
//! mirror described in `SPEC_FULL.md` §6.1.

use crate::error::StoreError;
use crate::schema::CREATE_TABLES_SQL;
use crate::table::{FlushOp, Table};
use kgraph_core::{GraphError, NodeId, Result as GraphResult};
use rusqlite::Connection;
use std::path::Path;

/// Where (or whether) the store's backing SQLite file lives.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    location: StoreLocation,
}

#[derive(Debug, Clone)]
enum StoreLocation {
    File(std::path::PathBuf),
    Memory,
}

impl StoreConfig {
    /// Open (or create) the database at `path` on disk.
    pub fn file(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            location: StoreLocation::File(path.into()),
        }
    }

    /// An ephemeral, process-local database — used by tests and by callers
    /// that don't need persistence at all.
    pub fn in_memory() -> Self {
        Self {
            location: StoreLocation::Memory,
        }
    }
}

/// The delta-layered table cache. Every read and write in the graph kernel
/// goes through this type.
pub struct Store {
    conn: Connection,
    nodes: Table<NodeId, ()>,
    headings: Table<NodeId, String>,
    titles: Table<NodeId, String>,
    bodies: Table<NodeId, String>,
    resources: Table<NodeId, Vec<u8>>,
    children: Table<(NodeId, NodeId), ()>,
    attribute_owner: Table<(NodeId, NodeId), ()>,
    aliases: Table<(NodeId, NodeId), ()>,
}

impl Store {
    /// Open (or create) the schema at `config`'s location and eagerly
    /// materialize every table's baseline. Caches start with empty delta
    /// lists — `init_db_on_disk`, per §4.2.
    pub fn init_db_on_disk(config: &StoreConfig) -> Result<Self, StoreError> {
        let conn = match &config.location {
            StoreLocation::File(path) => Connection::open(path)?,
            StoreLocation::Memory => Connection::open_in_memory()?,
        };
        conn.execute_batch(CREATE_TABLES_SQL)?;

        let mut store = Self {
            conn,
            nodes: Table::new(),
            headings: Table::new(),
            titles: Table::new(),
            bodies: Table::new(),
            resources: Table::new(),
            children: Table::new(),
            attribute_owner: Table::new(),
            aliases: Table::new(),
        };
        store.load_baselines()?;
        tracing::info!("store opened and baselines loaded");
        Ok(store)
    }

    fn load_baselines(&mut self) -> Result<(), StoreError> {
        {
            let mut stmt = self.conn.prepare("SELECT uuid FROM nodes")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            for text in rows {
                let text = text?;
                let id = parse_id("nodes", &text)?;
                self.nodes.load_baseline(id, ());
            }
        }
        load_scalar(&self.conn, "headings", "heading", &mut self.headings)?;
        load_scalar(&self.conn, "titles", "title", &mut self.titles)?;
        load_scalar(&self.conn, "bodies", "body", &mut self.bodies)?;
        load_bytes(&self.conn, "resources", "resource", &mut self.resources)?;
        load_edges(
            &self.conn,
            "children",
            "parent_uuid",
            "child_uuid",
            &mut self.children,
        )?;
        load_edges(
            &self.conn,
            "attributes",
            "parent_uuid",
            "child_uuid",
            &mut self.attribute_owner,
        )?;
        load_edges(&self.conn, "aliases", "src_uuid", "dst_uuid", &mut self.aliases)?;
        Ok(())
    }

    /// Collapse every table's deltas down to disk in a single transaction.
    /// All-or-nothing: on failure the in-memory state (including deltas) is
    /// left exactly as it was, for retry.
    pub fn flush_delta_to_disk(&mut self) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;

        flush_unit(&tx, "nodes", &["uuid"], &self.nodes)?;
        flush_scalar(&tx, "headings", "heading", &self.headings)?;
        flush_scalar(&tx, "titles", "title", &self.titles)?;
        flush_scalar(&tx, "bodies", "body", &self.bodies)?;
        flush_bytes(&tx, "resources", "resource", &self.resources)?;
        flush_edges(&tx, "children", "parent_uuid", "child_uuid", &self.children)?;
        flush_edges(
            &tx,
            "attributes",
            "parent_uuid",
            "child_uuid",
            &self.attribute_owner,
        )?;
        flush_edges(&tx, "aliases", "src_uuid", "dst_uuid", &self.aliases)?;

        tx.commit()?;

        self.nodes.collapse();
        self.headings.collapse();
        self.titles.collapse();
        self.bodies.collapse();
        self.resources.collapse();
        self.children.collapse();
        self.attribute_owner.collapse();
        self.aliases.collapse();

        tracing::info!("flush complete");
        Ok(())
    }

    // -- Node table -------------------------------------------------------

    /// `true` iff `id` has a live row in the node table.
    pub fn node_exists(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    /// Insert a fresh node row.
    pub fn create_node(&mut self, id: NodeId) -> GraphResult<()> {
        self.nodes.create(id, ())
    }

    /// Remove a node row.
    pub fn erase_node_row(&mut self, id: NodeId) -> GraphResult<()> {
        self.nodes.erase(&id)
    }

    /// Every node id with a live row, in id order.
    pub fn all_node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter_effective().map(|(k, _)| *k).collect()
    }

    // -- Headings / titles / bodies / resources ----------------------------

    /// Access to the `headings` table.
    pub fn headings(&self) -> &Table<NodeId, String> {
        &self.headings
    }
    /// Mutable access to the `headings` table.
    pub fn headings_mut(&mut self) -> &mut Table<NodeId, String> {
        &mut self.headings
    }
    /// Access to the `titles` table.
    pub fn titles(&self) -> &Table<NodeId, String> {
        &self.titles
    }
    /// Mutable access to the `titles` table.
    pub fn titles_mut(&mut self) -> &mut Table<NodeId, String> {
        &mut self.titles
    }
    /// Access to the `bodies` table.
    pub fn bodies(&self) -> &Table<NodeId, String> {
        &self.bodies
    }
    /// Mutable access to the `bodies` table.
    pub fn bodies_mut(&mut self) -> &mut Table<NodeId, String> {
        &mut self.bodies
    }
    /// Access to the `resources` table.
    pub fn resources(&self) -> &Table<NodeId, Vec<u8>> {
        &self.resources
    }
    /// Mutable access to the `resources` table.
    pub fn resources_mut(&mut self) -> &mut Table<NodeId, Vec<u8>> {
        &mut self.resources
    }

    // -- Child edges --------------------------------------------------------

    /// Add the child edge `(parent, child)`.
    pub fn add_child_edge(&mut self, parent: NodeId, child: NodeId) -> GraphResult<()> {
        self.children.create((parent, child), ())
    }

    /// Remove the child edge `(parent, child)`.
    pub fn remove_child_edge(&mut self, parent: NodeId, child: NodeId) -> GraphResult<()> {
        self.children.erase(&(parent, child))
    }

    /// The children of `parent`, in no particular order (callers needing
    /// sibling order consult the order body, not this table).
    pub fn children_of(&self, parent: NodeId) -> Vec<NodeId> {
        self.children
            .iter_effective()
            .filter(|((p, _), _)| *p == parent)
            .map(|((_, c), _)| *c)
            .collect()
    }

    /// The parent of `child`, if a child edge names one.
    pub fn parent_of(&self, child: NodeId) -> Option<NodeId> {
        self.children
            .iter_effective()
            .find(|((_, c), _)| *c == child)
            .map(|((p, _), _)| *p)
    }

    // -- Attribute-owner edges ------------------------------------------

    /// Record that `owner` owns attribute subtree root `attr_root`.
    pub fn add_attribute_owner_edge(&mut self, owner: NodeId, attr_root: NodeId) -> GraphResult<()> {
        self.attribute_owner.create((owner, attr_root), ())
    }

    /// Remove the attribute-owner edge rooted at `attr_root`.
    pub fn remove_attribute_owner_edge(&mut self, owner: NodeId, attr_root: NodeId) -> GraphResult<()> {
        self.attribute_owner.erase(&(owner, attr_root))
    }

    /// The attribute subtree root owned by `owner`, if any.
    pub fn attr_root_of(&self, owner: NodeId) -> Option<NodeId> {
        self.attribute_owner
            .iter_effective()
            .find(|((o, _), _)| *o == owner)
            .map(|((_, r), _)| *r)
    }

    /// The owner of attribute subtree root `attr_root`, if `attr_root` is
    /// in fact an attribute root.
    pub fn attr_owner_of(&self, attr_root: NodeId) -> Option<NodeId> {
        self.attribute_owner
            .iter_effective()
            .find(|((_, r), _)| *r == attr_root)
            .map(|((o, _), _)| *o)
    }

    // -- Persisted (top) alias edges --------------------------------------

    /// Persist the top-alias row `(resolved_src, dst)`.
    pub fn add_alias_row(&mut self, resolved_src: NodeId, dst: NodeId) -> GraphResult<()> {
        self.aliases.create((resolved_src, dst), ())
    }

    /// Remove the persisted top-alias row `(resolved_src, dst)`.
    pub fn remove_alias_row(&mut self, resolved_src: NodeId, dst: NodeId) -> GraphResult<()> {
        self.aliases.erase(&(resolved_src, dst))
    }

    /// Every persisted `(resolved_src, dst)` top-alias row.
    pub fn all_alias_rows(&self) -> Vec<(NodeId, NodeId)> {
        self.aliases.iter_effective().map(|(k, _)| *k).collect()
    }
}

fn parse_id(table: &'static str, text: &str) -> Result<NodeId, StoreError> {
    NodeId::parse(text).ok_or_else(|| StoreError::CorruptRow {
        table,
        reason: format!("not a uuid: {text:?}"),
    })
}

fn load_scalar(
    conn: &Connection,
    table: &'static str,
    value_col: &str,
    dest: &mut Table<NodeId, String>,
) -> Result<(), StoreError> {
    let sql = format!("SELECT uuid, {value_col} FROM {table}");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    for row in rows {
        let (id_text, value) = row?;
        let id = parse_id(table, &id_text)?;
        dest.load_baseline(id, value);
    }
    Ok(())
}

fn load_bytes(
    conn: &Connection,
    table: &'static str,
    value_col: &str,
    dest: &mut Table<NodeId, Vec<u8>>,
) -> Result<(), StoreError> {
    let sql = format!("SELECT uuid, {value_col} FROM {table}");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?))
    })?;
    for row in rows {
        let (id_text, value) = row?;
        let id = parse_id(table, &id_text)?;
        dest.load_baseline(id, value);
    }
    Ok(())
}

fn load_edges(
    conn: &Connection,
    table: &'static str,
    col_a: &str,
    col_b: &str,
    dest: &mut Table<(NodeId, NodeId), ()>,
) -> Result<(), StoreError> {
    let sql = format!("SELECT {col_a}, {col_b} FROM {table}");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    for row in rows {
        let (a_text, b_text) = row?;
        let a = parse_id(table, &a_text)?;
        let b = parse_id(table, &b_text)?;
        dest.load_baseline((a, b), ());
    }
    Ok(())
}

fn flush_unit(
    tx: &rusqlite::Transaction<'_>,
    table: &str,
    cols: &[&str],
    data: &Table<NodeId, ()>,
) -> Result<(), StoreError> {
    let col = cols[0];
    for (key, op) in data.flush_plan() {
        match op {
            FlushOp::Insert(()) | FlushOp::Update(()) => {
                let sql = format!("INSERT OR REPLACE INTO {table} ({col}) VALUES (?1)");
                tx.execute(&sql, [key.to_text()])?;
            }
            FlushOp::Delete => {
                let sql = format!("DELETE FROM {table} WHERE {col} = ?1");
                tx.execute(&sql, [key.to_text()])?;
            }
            FlushOp::NoOp => {}
        }
    }
    Ok(())
}

fn flush_scalar(
    tx: &rusqlite::Transaction<'_>,
    table: &str,
    value_col: &str,
    data: &Table<NodeId, String>,
) -> Result<(), StoreError> {
    for (key, op) in data.flush_plan() {
        match op {
            FlushOp::Insert(v) | FlushOp::Update(v) => {
                let sql = format!(
                    "INSERT OR REPLACE INTO {table} (uuid, {value_col}) VALUES (?1, ?2)"
                );
                tx.execute(&sql, rusqlite::params![key.to_text(), v])?;
            }
            FlushOp::Delete => {
                let sql = format!("DELETE FROM {table} WHERE uuid = ?1");
                tx.execute(&sql, [key.to_text()])?;
            }
            FlushOp::NoOp => {}
        }
    }
    Ok(())
}

fn flush_bytes(
    tx: &rusqlite::Transaction<'_>,
    table: &str,
    value_col: &str,
    data: &Table<NodeId, Vec<u8>>,
) -> Result<(), StoreError> {
    for (key, op) in data.flush_plan() {
        match op {
            FlushOp::Insert(v) | FlushOp::Update(v) => {
                let sql = format!(
                    "INSERT OR REPLACE INTO {table} (uuid, {value_col}) VALUES (?1, ?2)"
                );
                tx.execute(&sql, rusqlite::params![key.to_text(), v])?;
            }
            FlushOp::Delete => {
                let sql = format!("DELETE FROM {table} WHERE uuid = ?1");
                tx.execute(&sql, [key.to_text()])?;
            }
            FlushOp::NoOp => {}
        }
    }
    Ok(())
}

fn flush_edges(
    tx: &rusqlite::Transaction<'_>,
    table: &str,
    col_a: &str,
    col_b: &str,
    data: &Table<(NodeId, NodeId), ()>,
) -> Result<(), StoreError> {
    for ((a, b), op) in data.flush_plan() {
        match op {
            FlushOp::Insert(()) | FlushOp::Update(()) => {
                let sql = format!(
                    "INSERT OR REPLACE INTO {table} ({col_a}, {col_b}) VALUES (?1, ?2)"
                );
                tx.execute(&sql, rusqlite::params![a.to_text(), b.to_text()])?;
            }
            FlushOp::Delete => {
                let sql = format!("DELETE FROM {table} WHERE {col_a} = ?1 AND {col_b} = ?2");
                tx.execute(&sql, rusqlite::params![a.to_text(), b.to_text()])?;
            }
            FlushOp::NoOp => {}
        }
    }
    Ok(())
}

/// Convenience: open a file-backed store, creating the file if absent.
pub fn open(path: impl AsRef<Path>) -> Result<Store, StoreError> {
    Store::init_db_on_disk(&StoreConfig::file(path.as_ref().to_path_buf()))
}
