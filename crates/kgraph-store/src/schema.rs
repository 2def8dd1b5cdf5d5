//! The on-disk schema: eight tables, fixed column names and types so the
//! database a graph persists to is portable across kernel versions.

/// DDL applied once, on first open, via `CREATE TABLE IF NOT EXISTS`.
pub const CREATE_TABLES_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS nodes (
    uuid TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS children (
    parent_uuid TEXT NOT NULL,
    child_uuid  TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS headings (
    uuid    TEXT NOT NULL,
    heading TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS titles (
    uuid  TEXT NOT NULL,
    title TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS bodies (
    uuid TEXT NOT NULL,
    body TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS aliases (
    src_uuid TEXT NOT NULL,
    dst_uuid TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS attributes (
    parent_uuid TEXT NOT NULL,
    child_uuid  TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS resources (
    uuid     TEXT NOT NULL,
    resource BLOB NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS nodes_uuid_idx ON nodes(uuid);
CREATE UNIQUE INDEX IF NOT EXISTS children_pair_idx ON children(parent_uuid, child_uuid);
CREATE UNIQUE INDEX IF NOT EXISTS headings_uuid_idx ON headings(uuid);
CREATE UNIQUE INDEX IF NOT EXISTS titles_uuid_idx ON titles(uuid);
CREATE UNIQUE INDEX IF NOT EXISTS bodies_uuid_idx ON bodies(uuid);
CREATE UNIQUE INDEX IF NOT EXISTS aliases_pair_idx ON aliases(src_uuid, dst_uuid);
CREATE UNIQUE INDEX IF NOT EXISTS attributes_pair_idx ON attributes(parent_uuid, child_uuid);
CREATE UNIQUE INDEX IF NOT EXISTS resources_uuid_idx ON resources(uuid);
"#;
