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

//! Query planner (SPEC_FULL.md §4.5): range, slice, count and table-listing
//! operations over a transaction's merged view of the store and its
//! overlays.
//!
//! [`fold_over_data`] is the low-level streaming primitive: it walks the
//! physical store directly (tombstones are never surfaced to the callback)
//! and is what [`count_keys`] and [`list_tables`] are built on. [`get_slice`]
//! needs the full per-key overlay merge (uncommitted puts shadowing the
//! store, pending deletes hiding committed columns), which
//! [`crate::Transaction::get_columns`] already implements correctly, so
//! `get_slice` composes key discovery through `fold_over_data` with a
//! per-key call into `get_columns` rather than threading the overlay merge
//! through the fold callback itself.

use std::collections::HashSet;

use keydb_error::Result;

use crate::datum_key::{self, DatumValue};
use crate::store::StorageBackend;
use crate::txn::Transaction;

/// One step of a [`fold_over_data`] walk.
pub enum FoldControl<T> {
    Continue,
    SkipKey,
    ContinueWith(T),
    SkipKeyWith(T),
    FinishFold(T),
}

/// Streams every live `(key, column, timestamp)` of `table` in
/// `[first_key, up_to_key)`, ascending, starting at `first_column` within
/// `first_key` if given. `SkipKey` re-seeks past the remainder of the
/// current key instead of iterating through its other columns — cheaper
/// than a linear scan once a key's column budget is known to be exhausted.
pub fn fold_over_data<S, T, F>(
    txn: &Transaction<S>,
    table: &[u8],
    first_key: Option<&[u8]>,
    up_to_key: Option<&[u8]>,
    first_column: Option<&[u8]>,
    init: T,
    mut callback: F,
) -> Result<T>
where
    S: StorageBackend,
    T: Clone,
    F: FnMut(&[u8], &[u8], i64, &T) -> FoldControl<T>,
{
    let ks_id = txn.ks_id();
    let epoch = txn.read_epoch();
    let start = match (first_key, first_column) {
        (Some(key), Some(column)) => datum_key::encode_column_prefix(ks_id, table, key, column),
        (Some(key), None) => datum_key::encode_key_prefix(ks_id, table, key),
        (None, _) => datum_key::encode_table_prefix(ks_id, table),
    };
    let end = match up_to_key {
        Some(key) => datum_key::encode_key_prefix(ks_id, table, key),
        None => datum_key::encode_table_successor(ks_id, table),
    };

    let mut acc = init;
    let mut iter = txn.backend().iter_range(start, end.clone(), epoch);
    let mut last_seen: Option<(Vec<u8>, Vec<u8>)> = None;

    while iter.valid() {
        let decoded = datum_key::decode_datum_key(iter.key())?;
        if last_seen.as_ref() == Some(&(decoded.key.clone(), decoded.column.clone())) {
            iter.next();
            continue;
        }
        last_seen = Some((decoded.key.clone(), decoded.column.clone()));

        if matches!(
            datum_key::decode_datum_value(iter.value())?,
            DatumValue::Tombstone
        ) {
            iter.next();
            continue;
        }

        match callback(&decoded.key, &decoded.column, decoded.timestamp_us as i64, &acc) {
            FoldControl::Continue => iter.next(),
            FoldControl::ContinueWith(next) => {
                acc = next;
                iter.next();
            }
            FoldControl::SkipKey => {
                let seek = datum_key::encode_key_successor(ks_id, table, &decoded.key);
                iter = txn.backend().iter_range(seek, end.clone(), epoch);
            }
            FoldControl::SkipKeyWith(next) => {
                acc = next;
                let seek = datum_key::encode_key_successor(ks_id, table, &decoded.key);
                iter = txn.backend().iter_range(seek, end.clone(), epoch);
            }
            FoldControl::FinishFold(result) => return Ok(result),
        }
    }
    Ok(acc)
}

/// Either an explicit key set or a half-open range (`first` inclusive,
/// `up_to` exclusive).
pub enum KeyRange {
    Keys(Vec<Vec<u8>>),
    Range {
        first: Option<Vec<u8>>,
        up_to: Option<Vec<u8>>,
    },
}

/// A column selection, compiled once into a [`ColumnPredicate`].
pub enum ColumnSelector {
    All,
    Columns(Vec<Vec<u8>>),
    ColumnRange {
        first: Option<Vec<u8>>,
        up_to: Option<Vec<u8>>,
        reverse: bool,
    },
}

/// The compiled form of a [`ColumnSelector`] (SPEC_FULL.md §4.5): a small
/// explicit list is matched linearly, a larger one through a hash set, and a
/// range through lexicographic bounds comparison.
enum ColumnPredicate {
    All,
    Linear(Vec<Vec<u8>>),
    HashSet(HashSet<Vec<u8>>),
    Range {
        first: Option<Vec<u8>>,
        up_to: Option<Vec<u8>>,
        reverse: bool,
    },
}

const LINEAR_SCAN_THRESHOLD: usize = 5;

impl ColumnPredicate {
    fn compile(selector: &ColumnSelector) -> Self {
        match selector {
            ColumnSelector::All => ColumnPredicate::All,
            ColumnSelector::Columns(cols) if cols.len() < LINEAR_SCAN_THRESHOLD => {
                ColumnPredicate::Linear(cols.clone())
            }
            ColumnSelector::Columns(cols) => ColumnPredicate::HashSet(cols.iter().cloned().collect()),
            ColumnSelector::ColumnRange {
                first,
                up_to,
                reverse,
            } => ColumnPredicate::Range {
                first: first.clone(),
                up_to: up_to.clone(),
                reverse: *reverse,
            },
        }
    }

    fn matches(&self, column: &[u8]) -> bool {
        match self {
            ColumnPredicate::All => true,
            ColumnPredicate::Linear(cols) => cols.iter().any(|c| c.as_slice() == column),
            ColumnPredicate::HashSet(set) => set.contains(column),
            ColumnPredicate::Range { first, up_to, .. } => {
                first.as_deref().map_or(true, |f| column >= f)
                    && up_to.as_deref().map_or(true, |u| column < u)
            }
        }
    }

    fn reverse(&self) -> bool {
        matches!(self, ColumnPredicate::Range { reverse: true, .. })
    }
}

/// One key's result within a [`Slice`].
pub struct SliceRow {
    pub key: Vec<u8>,
    pub last_column: Option<Vec<u8>>,
    pub columns: Vec<(Vec<u8>, Vec<u8>)>,
}

/// The result of [`get_slice`]: the last key visited (for pagination) plus
/// the rows themselves.
pub struct Slice {
    pub last_key: Option<Vec<u8>>,
    pub rows: Vec<SliceRow>,
}

fn in_bounds(key: &[u8], first: Option<&[u8]>, up_to: Option<&[u8]>) -> bool {
    first.map_or(true, |f| key >= f) && up_to.map_or(true, |u| key < u)
}

fn collect_keys_in_range<S: StorageBackend>(
    txn: &Transaction<S>,
    table: &[u8],
    first: Option<&[u8]>,
    up_to: Option<&[u8]>,
    max_keys: usize,
) -> Result<Vec<Vec<u8>>> {
    let mut keys: Vec<Vec<u8>> = fold_over_data(
        txn,
        table,
        first,
        up_to,
        None,
        Vec::new(),
        |key, _column, _ts, acc: &Vec<Vec<u8>>| {
            if acc.last().map(|k| k.as_slice()) == Some(key) {
                FoldControl::Continue
            } else if acc.len() >= max_keys {
                FoldControl::FinishFold(acc.clone())
            } else {
                let mut next = acc.clone();
                next.push(key.to_vec());
                FoldControl::SkipKeyWith(next)
            }
        },
    )?;

    if let Some(overlay_keys) = txn.overlays().added_keys.get(table) {
        let deleted = txn.overlays().deleted_keys.get(table);
        for key in overlay_keys {
            if in_bounds(key, first, up_to)
                && !deleted.is_some_and(|d| d.contains(key))
                && !keys.contains(key)
            {
                keys.push(key.clone());
            }
        }
    }
    keys.sort();
    keys.truncate(max_keys);
    Ok(keys)
}

/// `get_slice` (SPEC_FULL.md §4.5): merges the store with pending overlays,
/// returns columns in ascending name order with the overlay winning ties.
pub fn get_slice<S: StorageBackend>(
    txn: &Transaction<S>,
    table: &[u8],
    key_range: &KeyRange,
    columns: &ColumnSelector,
    max_keys: usize,
    max_columns: usize,
) -> Result<Slice> {
    let predicate = ColumnPredicate::compile(columns);
    let keys = match key_range {
        KeyRange::Keys(explicit) => {
            let deleted = txn.overlays().deleted_keys.get(table);
            explicit
                .iter()
                .filter(|key| !deleted.is_some_and(|d| d.contains(*key)))
                .cloned()
                .collect::<Vec<_>>()
        }
        KeyRange::Range { first, up_to } => {
            collect_keys_in_range(txn, table, first.as_deref(), up_to.as_deref(), max_keys)?
        }
    };

    let mut rows = Vec::with_capacity(keys.len().min(max_keys));
    let mut last_key = None;
    for key in keys.into_iter().take(max_keys) {
        let mut cols: Vec<(Vec<u8>, Vec<u8>, i64)> = txn
            .get_columns(table, &key)?
            .into_iter()
            .filter(|(name, _, _)| predicate.matches(name))
            .collect();
        if predicate.reverse() {
            cols.reverse();
        }
        cols.truncate(max_columns);
        if predicate.reverse() {
            cols.reverse();
        }
        let last_column = cols.last().map(|(name, _, _)| name.clone());
        last_key = Some(key.clone());
        rows.push(SliceRow {
            key,
            last_column,
            columns: cols.into_iter().map(|(name, value, _)| (name, value)).collect(),
        });
    }
    Ok(Slice { last_key, rows })
}

/// `get_slice_values`: a projection of [`get_slice`] over a fixed column
/// list, in the order the columns were requested.
pub fn get_slice_values<S: StorageBackend>(
    txn: &Transaction<S>,
    table: &[u8],
    key_range: &KeyRange,
    columns: &[Vec<u8>],
    max_keys: usize,
) -> Result<Vec<(Vec<u8>, Vec<Option<Vec<u8>>>)>> {
    let slice = get_slice(
        txn,
        table,
        key_range,
        &ColumnSelector::Columns(columns.to_vec()),
        max_keys,
        columns.len().max(1),
    )?;
    Ok(slice
        .rows
        .into_iter()
        .map(|row| {
            let values = columns
                .iter()
                .map(|wanted| {
                    row.columns
                        .iter()
                        .find(|(name, _)| name == wanted)
                        .map(|(_, value)| value.clone())
                })
                .collect();
            (row.key, values)
        })
        .collect())
}

/// `count_keys` (SPEC_FULL.md §4.5): counts distinct live keys in
/// `[first, up_to)` without materializing their columns, adjusting for
/// not-yet-committed overlay adds and deletes.
pub fn count_keys<S: StorageBackend>(
    txn: &Transaction<S>,
    table: &[u8],
    first: Option<&[u8]>,
    up_to: Option<&[u8]>,
) -> Result<usize> {
    let committed: HashSet<Vec<u8>> = fold_over_data(
        txn,
        table,
        first,
        up_to,
        None,
        HashSet::new(),
        |key, _column, _ts, acc: &HashSet<Vec<u8>>| {
            if acc.contains(key) {
                FoldControl::Continue
            } else {
                let mut next = acc.clone();
                next.insert(key.to_vec());
                FoldControl::SkipKeyWith(next)
            }
        },
    )?;

    let mut count = committed.len();
    if let Some(added_keys) = txn.overlays().added_keys.get(table) {
        for key in added_keys {
            if in_bounds(key, first, up_to) && !committed.contains(key) {
                count += 1;
            }
        }
    }
    if let Some(deleted_keys) = txn.overlays().deleted_keys.get(table) {
        for key in deleted_keys {
            if in_bounds(key, first, up_to) && committed.contains(key) {
                count -= 1;
            }
        }
    }
    Ok(count)
}

/// `list_tables` (SPEC_FULL.md §4.5): repeatedly seeks to
/// `table_successor(ks_id, last_table)`, in ascending byte order. A table
/// "exists" the moment any datum (live or tombstoned) carries its prefix, so
/// this walks the raw store without consulting overlays.
pub fn list_tables<S: StorageBackend>(txn: &Transaction<S>) -> Result<Vec<Vec<u8>>> {
    let ks_id = txn.ks_id();
    let epoch = txn.read_epoch();
    let end = datum_key::encode_keyspace_successor(ks_id);
    let mut tables = Vec::new();
    let mut cursor = datum_key::encode_keyspace_prefix(ks_id);
    loop {
        let iter = txn.backend().iter_range(cursor, end.clone(), epoch);
        if !iter.valid() {
            break;
        }
        let decoded = datum_key::decode_datum_key(iter.key())?;
        cursor = datum_key::encode_table_successor(ks_id, &decoded.table);
        tables.push(decoded.table);
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyspace::KeyspaceRegistry;
    use crate::memory_store::MemoryBackingStore;
    use crate::txn::{Column, Isolation};
    use std::sync::Arc;

    fn engine() -> (Arc<MemoryBackingStore>, u32) {
        let backend = Arc::new(MemoryBackingStore::new());
        let registry = KeyspaceRegistry::load(&*backend).unwrap();
        let ks_id = registry.register(&*backend, "ks").unwrap();
        (backend, ks_id)
    }

    #[test]
    fn count_keys_reflects_inserts_and_a_pending_delete() {
        let (backend, ks_id) = engine();
        for key in [b"a".as_slice(), b"b", b"c"] {
            let mut txn = Transaction::begin(backend.clone(), ks_id, Isolation::ReadCommitted);
            txn.put_columns(b"t", key, vec![Column::new("c", "1")]);
            txn.commit().unwrap();
        }

        let read = Transaction::begin(backend.clone(), ks_id, Isolation::ReadCommitted);
        assert_eq!(count_keys(&read, b"t", None, None).unwrap(), 3);

        let mut txn = Transaction::begin(backend, ks_id, Isolation::ReadCommitted);
        txn.delete_key(b"t", b"b").unwrap();
        assert_eq!(count_keys(&txn, b"t", None, None).unwrap(), 2);
    }

    #[test]
    fn list_tables_is_ascending_and_empty_keyspace_is_empty() {
        let (backend, ks_id) = engine();
        let read = Transaction::begin(backend.clone(), ks_id, Isolation::ReadCommitted);
        assert_eq!(list_tables(&read).unwrap(), Vec::<Vec<u8>>::new());

        for table in [b"zzz".as_slice(), b"aaa"] {
            let mut txn = Transaction::begin(backend.clone(), ks_id, Isolation::ReadCommitted);
            txn.put_columns(table, b"k", vec![Column::new("c", "v")]);
            txn.commit().unwrap();
        }
        let read = Transaction::begin(backend, ks_id, Isolation::ReadCommitted);
        assert_eq!(list_tables(&read).unwrap(), vec![b"aaa".to_vec(), b"zzz".to_vec()]);
    }

    #[test]
    fn get_slice_merges_store_and_uncommitted_overlay() {
        let (backend, ks_id) = engine();
        let mut txn = Transaction::begin(backend.clone(), ks_id, Isolation::ReadCommitted);
        txn.put_columns(b"t", b"alice", vec![Column::new("name", "A")]);
        txn.commit().unwrap();

        let mut txn = Transaction::begin(backend, ks_id, Isolation::ReadCommitted);
        txn.put_columns(b"t", b"bob", vec![Column::new("name", "B")]);
        let slice = get_slice(
            &txn,
            b"t",
            &KeyRange::Range {
                first: None,
                up_to: None,
            },
            &ColumnSelector::All,
            10,
            10,
        )
        .unwrap();
        let keys: Vec<_> = slice.rows.iter().map(|r| r.key.clone()).collect();
        assert_eq!(keys, vec![b"alice".to_vec(), b"bob".to_vec()]);
    }

    #[test]
    fn get_slice_with_reversed_column_range_keeps_top_n_in_ascending_order() {
        let (backend, ks_id) = engine();
        let mut txn = Transaction::begin(backend, ks_id, Isolation::ReadCommitted);
        txn.put_columns(
            b"t",
            b"k",
            vec![
                Column::new("a", "1"),
                Column::new("b", "2"),
                Column::new("c", "3"),
                Column::new("d", "4"),
            ],
        );
        let slice = get_slice(
            &txn,
            b"t",
            &KeyRange::Keys(vec![b"k".to_vec()]),
            &ColumnSelector::ColumnRange {
                first: None,
                up_to: None,
                reverse: true,
            },
            10,
            2,
        )
        .unwrap();
        let names: Vec<_> = slice.rows[0].columns.iter().map(|(name, _)| name.clone()).collect();
        assert_eq!(names, vec![b"c".to_vec(), b"d".to_vec()]);
    }
}
