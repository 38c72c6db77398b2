// Copyright 2026 the keydb authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Transaction engine (SPEC_FULL.md §4.4).
//!
//! Nesting in the source is detected through a process-local contextual
//! binding: whatever transaction happens to be "current" on the calling
//! task. §9's redesign guidance replaces that with an explicit parent
//! handle. Here that handle is [`Nested`]: `begin_nested` detaches the
//! overlays out of the parent into a standalone child, and the caller must
//! explicitly fold the child back with [`Nested::commit`] or discard its
//! mutations with [`Nested::abort`] — there is no task-local or process-wide
//! state involved anywhere in this module.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use keydb_error::Result;

use crate::datum_key::{self, DatumValue};
use crate::store::{StorageBackend, WriteOp};

/// A column's timestamp as supplied by the caller. SPEC_FULL.md §9 records
/// the commit-time policy: regardless of which variant is supplied, `commit`
/// always stamps the physical datum with the wall-clock time of the commit.
/// The distinction is preserved in the type only so a future implementation
/// can honor `At` without a schema change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timestamp {
    Auto,
    At(i64),
}

/// A `(name, value, timestamp)` triple as given to `put_columns`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: Vec<u8>,
    pub value: Vec<u8>,
    pub timestamp: Timestamp,
}

impl Column {
    pub fn new(name: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            timestamp: Timestamp::Auto,
        }
    }
}

/// A value not yet assigned a commit timestamp reads back with this
/// sentinel. `commit` never actually persists it: the physical write always
/// uses the wall-clock time of the commit (see [`Timestamp`]).
const UNCOMMITTED_TIMESTAMP: i64 = i64::MIN;

fn preview_timestamp(ts: Timestamp) -> i64 {
    match ts {
        Timestamp::At(ts) => ts,
        Timestamp::Auto => UNCOMMITTED_TIMESTAMP,
    }
}

fn now_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the Unix epoch")
        .as_micros() as u64
}

/// The five per-transaction overlays of SPEC_FULL.md §4.4, keyed first by
/// table.
#[derive(Clone, Debug, Default)]
pub struct Overlays {
    pub(crate) added_keys: HashMap<Vec<u8>, HashSet<Vec<u8>>>,
    pub(crate) deleted_keys: HashMap<Vec<u8>, HashSet<Vec<u8>>>,
    pub(crate) added: HashMap<Vec<u8>, HashMap<Vec<u8>, HashMap<Vec<u8>, (Vec<u8>, Timestamp)>>>,
    pub(crate) deleted: HashMap<Vec<u8>, HashMap<Vec<u8>, HashSet<Vec<u8>>>>,
}

/// Isolation level, chosen at `begin` (SPEC_FULL.md §4.4).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Isolation {
    /// `read_view` is re-acquired on every read; later commits by others
    /// become visible mid-transaction.
    ReadCommitted,
    /// A snapshot epoch is pinned at `begin` and used for every read.
    RepeatableRead,
}

/// A session transaction: overlays plus a fixed read view.
pub struct Transaction<S: StorageBackend> {
    backend: Arc<S>,
    ks_id: u32,
    isolation: Isolation,
    snapshot_epoch: Option<u64>,
    overlays: Overlays,
    /// Writes queued directly against the batch, bypassing the overlays —
    /// used only by `load` (SPEC_FULL.md §4.6), which must preserve the
    /// timestamps embedded in a dump rather than stamping the commit's wall
    /// clock over them.
    raw_batch: Vec<WriteOp>,
}

impl<S: StorageBackend> Transaction<S> {
    pub fn begin(backend: Arc<S>, ks_id: u32, isolation: Isolation) -> Self {
        let snapshot_epoch = match isolation {
            Isolation::ReadCommitted => None,
            Isolation::RepeatableRead => Some(backend.current_epoch()),
        };
        tracing::debug!(ks_id, ?isolation, "begin transaction");
        Self {
            backend,
            ks_id,
            isolation,
            snapshot_epoch,
            overlays: Overlays::default(),
            raw_batch: Vec::new(),
        }
    }

    pub fn isolation(&self) -> Isolation {
        self.isolation
    }

    /// Queues a write directly against the commit batch, bypassing the
    /// overlays and their visibility rules entirely. Used by `load`.
    pub(crate) fn queue_raw_write(&mut self, op: WriteOp) {
        self.raw_batch.push(op);
    }

    pub(crate) fn backend(&self) -> &S {
        &self.backend
    }

    pub(crate) fn ks_id(&self) -> u32 {
        self.ks_id
    }

    pub(crate) fn overlays(&self) -> &Overlays {
        &self.overlays
    }

    /// The epoch every read in this transaction is evaluated against:
    /// read-committed transactions re-fetch the current epoch on every call,
    /// repeatable-read transactions always see the epoch pinned at `begin`.
    pub(crate) fn read_epoch(&self) -> u64 {
        match self.snapshot_epoch {
            Some(epoch) => epoch,
            None => self.backend.current_epoch(),
        }
    }

    /// Detaches a nested transaction sharing this transaction's overlays.
    /// `self` is left with empty overlays until the returned [`Nested`] is
    /// folded back in.
    pub fn begin_nested(&mut self) -> Nested<S> {
        let rollback = self.overlays.clone();
        let overlays = std::mem::take(&mut self.overlays);
        Nested {
            child: Transaction {
                backend: self.backend.clone(),
                ks_id: self.ks_id,
                isolation: self.isolation,
                snapshot_epoch: self.snapshot_epoch,
                overlays,
                raw_batch: Vec::new(),
            },
            rollback,
        }
    }

    /// `put_columns` (SPEC_FULL.md §4.4).
    pub fn put_columns(&mut self, table: &[u8], key: &[u8], columns: Vec<Column>) {
        self.overlays
            .added_keys
            .entry(table.to_vec())
            .or_default()
            .insert(key.to_vec());
        if let Some(deleted_keys) = self.overlays.deleted_keys.get_mut(table) {
            deleted_keys.remove(key);
        }
        let deleted_cols = self
            .overlays
            .deleted
            .entry(table.to_vec())
            .or_default()
            .entry(key.to_vec())
            .or_default();
        let added_cols = self
            .overlays
            .added
            .entry(table.to_vec())
            .or_default()
            .entry(key.to_vec())
            .or_default();
        for col in columns {
            deleted_cols.remove(&col.name);
            added_cols.insert(col.name, (col.value, col.timestamp));
        }
    }

    /// `delete_columns` (SPEC_FULL.md §4.4).
    pub fn delete_columns(&mut self, table: &[u8], key: &[u8], columns: &[Vec<u8>]) {
        if let Some(added_cols) = self
            .overlays
            .added
            .get_mut(table)
            .and_then(|keys| keys.get_mut(key))
        {
            for c in columns {
                added_cols.remove(c);
            }
            if added_cols.is_empty() {
                if let Some(added_keys) = self.overlays.added_keys.get_mut(table) {
                    added_keys.remove(key);
                }
            }
        }
        let deleted_cols = self
            .overlays
            .deleted
            .entry(table.to_vec())
            .or_default()
            .entry(key.to_vec())
            .or_default();
        for c in columns {
            deleted_cols.insert(c.clone());
        }
    }

    /// `delete_key` (SPEC_FULL.md §4.4): enumerates live columns and deletes
    /// each of them, then marks the key itself as deleted.
    pub fn delete_key(&mut self, table: &[u8], key: &[u8]) -> Result<()> {
        let live: Vec<Vec<u8>> = self
            .get_columns(table, key)?
            .into_iter()
            .map(|(name, _, _)| name)
            .collect();
        self.delete_columns(table, key, &live);
        self.overlays
            .deleted_keys
            .entry(table.to_vec())
            .or_default()
            .insert(key.to_vec());
        Ok(())
    }

    /// Reads one column, applying the visibility rules of SPEC_FULL.md
    /// §4.4: a pending delete shadows everything, a pending put shadows the
    /// store, otherwise the store (at this transaction's read view) decides.
    pub fn get_column(
        &self,
        table: &[u8],
        key: &[u8],
        column: &[u8],
    ) -> Result<Option<(Vec<u8>, i64)>> {
        if self
            .overlays
            .deleted
            .get(table)
            .and_then(|keys| keys.get(key))
            .is_some_and(|cols| cols.contains(column))
        {
            return Ok(None);
        }
        if let Some((value, ts)) = self
            .overlays
            .added
            .get(table)
            .and_then(|keys| keys.get(key))
            .and_then(|cols| cols.get(column))
        {
            return Ok(Some((value.clone(), preview_timestamp(*ts))));
        }
        self.get_column_from_store(table, key, column)
    }

    fn get_column_from_store(
        &self,
        table: &[u8],
        key: &[u8],
        column: &[u8],
    ) -> Result<Option<(Vec<u8>, i64)>> {
        let epoch = self.read_epoch();
        let start = datum_key::encode_column_prefix(self.ks_id, table, key, column);
        let end = datum_key::encode_column_successor(self.ks_id, table, key, column);
        let iter = self.backend.iter_range(start, end, epoch);
        if !iter.valid() {
            return Ok(None);
        }
        let decoded = datum_key::decode_datum_key(iter.key())?;
        match datum_key::decode_datum_value(iter.value())? {
            DatumValue::Tombstone => Ok(None),
            DatumValue::Put(value) => Ok(Some((value, decoded.timestamp_us as i64))),
        }
    }

    /// `get_column_values`: a projection of [`Transaction::get_column`] over
    /// a fixed column list.
    pub fn get_column_values(
        &self,
        table: &[u8],
        key: &[u8],
        columns: &[Vec<u8>],
    ) -> Result<Vec<Option<Vec<u8>>>> {
        columns
            .iter()
            .map(|c| Ok(self.get_column(table, key, c)?.map(|(value, _)| value)))
            .collect()
    }

    /// Every live `(column, value, timestamp)` of `(table, key)`, merging the
    /// store with the pending overlays, sorted by column name ascending.
    pub fn get_columns(&self, table: &[u8], key: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>, i64)>> {
        let epoch = self.read_epoch();
        let start = datum_key::encode_key_prefix(self.ks_id, table, key);
        let end = datum_key::encode_key_successor(self.ks_id, table, key);
        let mut iter = self.backend.iter_range(start, end, epoch);

        let mut live: BTreeMap<Vec<u8>, (Vec<u8>, i64)> = BTreeMap::new();
        let mut seen = HashSet::new();
        while iter.valid() {
            let decoded = datum_key::decode_datum_key(iter.key())?;
            if seen.insert(decoded.column.clone()) {
                if let DatumValue::Put(value) = datum_key::decode_datum_value(iter.value())? {
                    live.insert(decoded.column, (value, decoded.timestamp_us as i64));
                }
            }
            iter.next();
        }

        if let Some(deleted_cols) = self.overlays.deleted.get(table).and_then(|m| m.get(key)) {
            for c in deleted_cols {
                live.remove(c);
            }
        }
        if let Some(added_cols) = self.overlays.added.get(table).and_then(|m| m.get(key)) {
            for (name, (value, ts)) in added_cols {
                live.insert(name.clone(), (value.clone(), preview_timestamp(*ts)));
            }
        }

        Ok(live
            .into_iter()
            .map(|(name, (value, ts))| (name, value, ts))
            .collect())
    }

    pub fn exists_key(&self, table: &[u8], key: &[u8]) -> Result<bool> {
        Ok(!self.get_columns(table, key)?.is_empty())
    }

    /// Commits the outermost transaction (SPEC_FULL.md §4.4): every pending
    /// delete becomes a tombstone write, every pending put becomes a live
    /// write, both stamped with the commit's wall-clock time, flushed as one
    /// atomic, synced batch.
    pub fn commit(self) -> Result<()> {
        let ts = now_micros();
        let mut ops = self.raw_batch.clone();

        for (table, keys) in &self.overlays.deleted {
            for (key, columns) in keys {
                for column in columns {
                    let phys = datum_key::encode_datum_key(self.ks_id, table, key, column, ts);
                    ops.push(WriteOp::Put(
                        phys,
                        datum_key::encode_datum_value(&DatumValue::Tombstone),
                    ));
                }
            }
        }
        for (table, keys) in &self.overlays.added {
            for (key, columns) in keys {
                for (column, (value, _)) in columns {
                    let phys = datum_key::encode_datum_key(self.ks_id, table, key, column, ts);
                    ops.push(WriteOp::Put(
                        phys,
                        datum_key::encode_datum_value(&DatumValue::Put(value.clone())),
                    ));
                }
            }
        }

        let op_count = ops.len();
        if !ops.is_empty() {
            self.backend.write_batch(ops, true)?;
        }
        tracing::debug!(ks_id = self.ks_id, op_count, "committed transaction");
        Ok(())
    }

    /// Discards every pending overlay without touching the backend.
    pub fn abort(self) {
        tracing::debug!(ks_id = self.ks_id, "aborted transaction");
    }
}

/// A nested transaction detached from its parent by
/// [`Transaction::begin_nested`]. Must be explicitly folded back with
/// [`Nested::commit`] or discarded with [`Nested::abort`]; dropping it
/// without calling either leaves the parent's overlays empty, which is
/// almost certainly not what the caller wants, so both paths must be used
/// deliberately.
pub struct Nested<S: StorageBackend> {
    child: Transaction<S>,
    rollback: Overlays,
}

impl<S: StorageBackend> Nested<S> {
    pub fn transaction(&self) -> &Transaction<S> {
        &self.child
    }

    pub fn transaction_mut(&mut self) -> &mut Transaction<S> {
        &mut self.child
    }

    /// Folds the child's (possibly mutated) overlays back into `parent`.
    pub fn commit(self, parent: &mut Transaction<S>) {
        parent.overlays = self.child.overlays;
    }

    /// Restores `parent`'s overlays to their state at `begin_nested`,
    /// discarding every mutation the child made.
    pub fn abort(self, parent: &mut Transaction<S>) {
        parent.overlays = self.rollback;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyspace::KeyspaceRegistry;
    use crate::memory_store::MemoryBackingStore;

    fn engine() -> (Arc<MemoryBackingStore>, u32) {
        let backend = Arc::new(MemoryBackingStore::new());
        let registry = KeyspaceRegistry::load(&*backend).unwrap();
        let ks_id = registry.register(&*backend, "users").unwrap();
        (backend, ks_id)
    }

    #[test]
    fn put_then_commit_then_get_column_values() {
        let (backend, ks_id) = engine();
        let mut txn = Transaction::begin(backend.clone(), ks_id, Isolation::ReadCommitted);
        txn.put_columns(
            b"t",
            b"alice",
            vec![Column::new("name", "A"), Column::new("age", "30")],
        );
        txn.commit().unwrap();

        let read = Transaction::begin(backend, ks_id, Isolation::ReadCommitted);
        let values = read
            .get_column_values(b"t", b"alice", &[b"name".to_vec(), b"missing".to_vec()])
            .unwrap();
        assert_eq!(values, vec![Some(b"A".to_vec()), None]);
    }

    #[test]
    fn nested_transaction_commit_wins_on_outer_commit() {
        let (backend, ks_id) = engine();
        let mut outer = Transaction::begin(backend.clone(), ks_id, Isolation::ReadCommitted);
        outer.put_columns(b"t", b"k1", vec![Column::new("c", "1")]);

        let mut nested = outer.begin_nested();
        nested
            .transaction_mut()
            .put_columns(b"t", b"k1", vec![Column::new("c", "2")]);
        nested.commit(&mut outer);

        outer.commit().unwrap();

        let read = Transaction::begin(backend, ks_id, Isolation::ReadCommitted);
        let (value, _) = read.get_column(b"t", b"k1", b"c").unwrap().unwrap();
        assert_eq!(value, b"2");
    }

    #[test]
    fn nested_transaction_abort_discards_its_own_writes_only() {
        let (backend, ks_id) = engine();
        let mut outer = Transaction::begin(backend.clone(), ks_id, Isolation::ReadCommitted);
        outer.put_columns(b"t", b"k1", vec![Column::new("c", "1")]);

        let mut nested = outer.begin_nested();
        nested
            .transaction_mut()
            .put_columns(b"t", b"k1", vec![Column::new("c", "2")]);
        nested.abort(&mut outer);

        outer.commit().unwrap();

        let read = Transaction::begin(backend, ks_id, Isolation::ReadCommitted);
        let (value, _) = read.get_column(b"t", b"k1", b"c").unwrap().unwrap();
        assert_eq!(value, b"1");
    }

    #[test]
    fn delete_key_removes_every_live_column() {
        let (backend, ks_id) = engine();
        let mut txn = Transaction::begin(backend.clone(), ks_id, Isolation::ReadCommitted);
        txn.put_columns(b"t", b"k", vec![Column::new("a", "1"), Column::new("b", "2")]);
        txn.commit().unwrap();

        let mut txn = Transaction::begin(backend.clone(), ks_id, Isolation::ReadCommitted);
        txn.delete_key(b"t", b"k").unwrap();
        txn.commit().unwrap();

        let read = Transaction::begin(backend, ks_id, Isolation::ReadCommitted);
        assert!(!read.exists_key(b"t", b"k").unwrap());
    }

    #[test]
    fn repeatable_read_is_stable_across_an_external_commit() {
        let (backend, ks_id) = engine();
        let mut setup = Transaction::begin(backend.clone(), ks_id, Isolation::ReadCommitted);
        setup.put_columns(b"t", b"k", vec![Column::new("c", "1")]);
        setup.commit().unwrap();

        let rr = Transaction::begin(backend.clone(), ks_id, Isolation::RepeatableRead);

        let mut other = Transaction::begin(backend.clone(), ks_id, Isolation::ReadCommitted);
        other.put_columns(b"t", b"k", vec![Column::new("c", "2")]);
        other.commit().unwrap();

        let (value, _) = rr.get_column(b"t", b"k", b"c").unwrap().unwrap();
        assert_eq!(value, b"1", "repeatable-read must not observe the external commit");

        let rc = Transaction::begin(backend, ks_id, Isolation::ReadCommitted);
        let (value, _) = rc.get_column(b"t", b"k", b"c").unwrap().unwrap();
        assert_eq!(value, b"2", "read-committed must observe the external commit");
    }
}
