//! A single delta-layered table: a baseline value per key, plus an ordered
//! list of deltas recording every mutation since the last flush.
//!
//! The effective value of a row is its last delta's value, if any, else its
//! baseline. No mutation ever rewrites baseline directly — only
//! [`Table::collapse`], called once per successful [flush][crate::Store::flush_delta_to_disk],
//! does that.

use kgraph_core::GraphError;
use std::collections::BTreeMap;

/// What kind of mutation produced a [`DeltaItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The row did not exist before this delta (or was erased and is being
    /// recreated).
    Created,
    /// The row existed and its value changed.
    Changed,
    /// The row was erased.
    Erased,
}

/// A single recorded mutation layered atop a row's baseline.
#[derive(Debug, Clone)]
pub struct DeltaItem<V> {
    /// The value after this delta, or `None` for [`Action::Erased`].
    pub value: Option<V>,
    /// What kind of mutation this was.
    pub action: Action,
    /// Monotonically increasing id, assigned by the owning [`Table`].
    pub txn_id: u64,
}

#[derive(Debug, Clone, Default)]
struct Row<V> {
    baseline: Option<V>,
    deltas: Vec<DeltaItem<V>>,
}

impl<V: Clone> Row<V> {
    fn effective(&self) -> Option<&V> {
        match self.deltas.last() {
            Some(d) => d.value.as_ref(),
            None => self.baseline.as_ref(),
        }
    }
}

/// The outcome of reconciling one row's effective value against its
/// baseline, used to drive [flush][crate::Store::flush_delta_to_disk].
#[derive(Debug, Clone)]
pub enum FlushOp<V> {
    /// The row has no baseline and an effective value: `INSERT`.
    Insert(V),
    /// The row has a baseline and a different effective value: `UPDATE`.
    Update(V),
    /// The row has a baseline but no effective value: `DELETE`.
    Delete,
    /// Baseline already matches effective value: nothing to do.
    NoOp,
}

/// A delta-layered cache table over keys `K` and values `V`.
///
/// Uses a `BTreeMap` rather than a hash map so that flush plans and
/// `iter_effective` are produced in a deterministic key order — useful both
/// for reproducible flushes and for tests that enumerate whole tables.
#[derive(Debug, Clone)]
pub struct Table<K, V> {
    rows: BTreeMap<K, Row<V>>,
    next_txn: u64,
}

impl<K, V> Default for Table<K, V>
where
    K: Ord,
{
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_txn: 0,
        }
    }
}

impl<K, V> Table<K, V>
where
    K: Ord + Clone + std::fmt::Debug,
    V: Clone + PartialEq,
{
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn bump_txn(&mut self) -> u64 {
        let id = self.next_txn;
        self.next_txn += 1;
        id
    }

    /// Seed a row's baseline directly, with no deltas. Used only when
    /// loading from disk.
    pub fn load_baseline(&mut self, key: K, value: V) {
        self.rows.insert(
            key,
            Row {
                baseline: Some(value),
                deltas: Vec::new(),
            },
        );
    }

    /// `true` iff `key` has an effective value (not erased, or never erased).
    pub fn contains(&self, key: &K) -> bool {
        self.rows
            .get(key)
            .map(|r| r.effective().is_some())
            .unwrap_or(false)
    }

    /// The effective value for `key`, or `entry_not_found`.
    pub fn fetch(&self, key: &K) -> Result<V, GraphError> {
        self.rows
            .get(key)
            .and_then(|r| r.effective())
            .cloned()
            .ok_or_else(|| GraphError::entry_not_found(format!("{key:?}")))
    }

    /// The effective value for `key`, or `None` if absent — for call sites
    /// that want existence-checking without the error path.
    pub fn fetch_opt(&self, key: &K) -> Option<V> {
        self.rows.get(key).and_then(|r| r.effective()).cloned()
    }

    /// Record a `created` delta for `key`. Fails with `data_already_exists`
    /// if `key` already has an effective value.
    pub fn create(&mut self, key: K, value: V) -> Result<(), GraphError> {
        if self.contains(&key) {
            return Err(GraphError::data_already_exists(format!("{key:?}")));
        }
        let txn_id = self.bump_txn();
        self.rows
            .entry(key)
            .or_insert_with(|| Row {
                baseline: None,
                deltas: Vec::new(),
            })
            .deltas
            .push(DeltaItem {
                value: Some(value),
                action: Action::Created,
                txn_id,
            });
        Ok(())
    }

    /// Record a `changed` delta computed from the current effective value.
    /// Fails with `entry_not_found` if `key` is absent.
    pub fn update<F>(&mut self, key: &K, f: F) -> Result<(), GraphError>
    where
        F: FnOnce(&V) -> V,
    {
        let current = self
            .fetch_opt(key)
            .ok_or_else(|| GraphError::entry_not_found(format!("{key:?}")))?;
        let next = f(&current);
        let txn_id = self.bump_txn();
        let row = self
            .rows
            .get_mut(key)
            .expect("contains() just confirmed presence");
        row.deltas.push(DeltaItem {
            value: Some(next),
            action: Action::Changed,
            txn_id,
        });
        Ok(())
    }

    /// Record a `changed` delta that replaces the value outright, regardless
    /// of its previous content. Still fails with `entry_not_found` if `key`
    /// is absent — replacing a row that doesn't exist is an update, not a
    /// create.
    pub fn replace(&mut self, key: &K, value: V) -> Result<(), GraphError> {
        self.update(key, |_| value.clone())
    }

    /// Record an `erased` delta for `key`. Fails with `entry_not_found` if
    /// `key` is already absent.
    pub fn erase(&mut self, key: &K) -> Result<(), GraphError> {
        if !self.contains(key) {
            return Err(GraphError::entry_not_found(format!("{key:?}")));
        }
        let txn_id = self.bump_txn();
        let row = self
            .rows
            .get_mut(key)
            .expect("contains() just confirmed presence");
        row.deltas.push(DeltaItem {
            value: None,
            action: Action::Erased,
            txn_id,
        });
        Ok(())
    }

    /// Iterate over every key with a present effective value, in key order.
    pub fn iter_effective(&self) -> impl Iterator<Item = (&K, &V)> {
        self.rows
            .iter()
            .filter_map(|(k, r)| r.effective().map(|v| (k, v)))
    }

    /// Compute the flush plan: one [`FlushOp`] per row that has pending
    /// deltas. Rows with an empty delta list are untouched — they already
    /// match baseline.
    pub fn flush_plan(&self) -> Vec<(K, FlushOp<V>)> {
        self.rows
            .iter()
            .filter(|(_, r)| !r.deltas.is_empty())
            .map(|(k, r)| {
                let op = match (&r.baseline, r.effective()) {
                    (None, Some(v)) => FlushOp::Insert(v.clone()),
                    (Some(_), Some(v)) => FlushOp::Update(v.clone()),
                    (Some(_), None) => FlushOp::Delete,
                    (None, None) => FlushOp::NoOp,
                };
                (k.clone(), op)
            })
            .collect()
    }

    /// Collapse every row's deltas into baseline. Called only after every
    /// statement in [`Table::flush_plan`] has been durably applied.
    pub fn collapse(&mut self) {
        for row in self.rows.values_mut() {
            if !row.deltas.is_empty() {
                row.baseline = row.effective().cloned();
                row.deltas.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_fetch() {
        let mut t: Table<u32, String> = Table::new();
        t.create(1, "a".into()).unwrap();
        assert_eq!(t.fetch(&1).unwrap(), "a");
    }

    #[test]
    fn duplicate_create_fails() {
        let mut t: Table<u32, String> = Table::new();
        t.create(1, "a".into()).unwrap();
        let err = t.create(1, "b".into()).unwrap_err();
        assert_eq!(err.kind(), kgraph_core::ErrorKind::DataAlreadyExists);
    }

    #[test]
    fn update_absent_fails() {
        let mut t: Table<u32, String> = Table::new();
        let err = t.update(&1, |v| v.clone()).unwrap_err();
        assert_eq!(err.kind(), kgraph_core::ErrorKind::EntryNotFound);
    }

    #[test]
    fn erase_then_contains_false() {
        let mut t: Table<u32, String> = Table::new();
        t.create(1, "a".into()).unwrap();
        t.erase(&1).unwrap();
        assert!(!t.contains(&1));
        assert!(t.fetch(&1).is_err());
    }

    #[test]
    fn recreate_after_erase_is_allowed() {
        let mut t: Table<u32, String> = Table::new();
        t.create(1, "a".into()).unwrap();
        t.erase(&1).unwrap();
        t.create(1, "b".into()).unwrap();
        assert_eq!(t.fetch(&1).unwrap(), "b");
    }

    #[test]
    fn flush_plan_classifies_insert_update_delete() {
        let mut t: Table<u32, String> = Table::new();
        t.load_baseline(10, "baseline".into());
        t.create(1, "new".into()).unwrap();
        t.replace(&10, "changed".into()).unwrap();
        t.load_baseline(20, "will-delete".into());
        t.erase(&20).unwrap();

        let plan = t.flush_plan();
        assert_eq!(plan.len(), 3);
        let find = |k: u32| plan.iter().find(|(key, _)| *key == k).unwrap();
        assert!(matches!(find(1).1, FlushOp::Insert(ref v) if v == "new"));
        assert!(matches!(find(10).1, FlushOp::Update(ref v) if v == "changed"));
        assert!(matches!(find(20).1, FlushOp::Delete));
    }

    #[test]
    fn collapse_clears_deltas_and_settles_baseline() {
        let mut t: Table<u32, String> = Table::new();
        t.create(1, "a".into()).unwrap();
        t.collapse();
        assert!(t.flush_plan().is_empty());
        assert_eq!(t.fetch(&1).unwrap(), "a");
    }

    #[test]
    fn untouched_rows_are_absent_from_flush_plan() {
        let mut t: Table<u32, String> = Table::new();
        t.load_baseline(1, "a".into());
        assert!(t.flush_plan().is_empty());
    }
}
