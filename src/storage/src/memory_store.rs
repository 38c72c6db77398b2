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

//! In-memory reference implementation of [`StorageBackend`]
//! (SPEC_FULL.md §4.3).
//!
//! Grounded on the teacher's `MemoryStateStore`: a [`BTreeMap`] keyed by
//! `(key, Reverse(epoch))` under a [`RwLock`], scanned through a batching
//! iterator that trades lock-hold time for copying. It never does GC, so
//! memory usage only grows; like the teacher's equivalent, this should never
//! be used in production.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::ops::Bound::{self, Excluded, Included, Unbounded};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use keydb_error::Result;
use parking_lot::RwLock;

use crate::store::{KvIterator, StorageBackend, WriteOp};

mod batched_iter {
    use itertools::Itertools;

    use super::*;

    /// Iterates a range of a locked `BTreeMap` in batches, trading copying
    /// overhead for fewer lock acquisitions. Not a consistent snapshot of the
    /// map across batches; callers handle MVCC themselves via the epoch
    /// embedded in the key.
    pub struct Iter {
        inner: Arc<RwLock<BTreeMap<KeyWithEpoch, Option<Vec<u8>>>>>,
        range: (Bound<KeyWithEpoch>, Bound<KeyWithEpoch>),
        current: std::vec::IntoIter<(KeyWithEpoch, Option<Vec<u8>>)>,
    }

    impl Iter {
        const BATCH_SIZE: usize = 256;

        pub fn new(
            inner: Arc<RwLock<BTreeMap<KeyWithEpoch, Option<Vec<u8>>>>>,
            range: (Bound<KeyWithEpoch>, Bound<KeyWithEpoch>),
        ) -> Self {
            Self {
                inner,
                range,
                current: Vec::new().into_iter(),
            }
        }

        fn refill(&mut self) {
            debug_assert!(self.current.len() == 0);
            let batch: Vec<_> = self
                .inner
                .read()
                .range((self.range.0.clone(), self.range.1.clone()))
                .take(Self::BATCH_SIZE)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect_vec();
            if let Some((last_key, _)) = batch.last() {
                self.range.0 = Bound::Excluded(last_key.clone());
            }
            self.current = batch.into_iter();
        }
    }

    impl Iterator for Iter {
        type Item = (KeyWithEpoch, Option<Vec<u8>>);

        fn next(&mut self) -> Option<Self::Item> {
            match self.current.next() {
                Some(item) => Some(item),
                None => {
                    self.refill();
                    self.current.next()
                }
            }
        }
    }
}

type KeyWithEpoch = (Vec<u8>, Reverse<u64>);

fn to_key_range(start: Vec<u8>, end: Vec<u8>) -> (Bound<KeyWithEpoch>, Bound<KeyWithEpoch>) {
    (
        Included((start, Reverse(u64::MAX))),
        Excluded((end, Reverse(u64::MAX))),
    )
}

/// Test/dev-only in-memory backend. See the module doc comment.
#[derive(Default)]
pub struct MemoryBackingStore {
    inner: Arc<RwLock<BTreeMap<KeyWithEpoch, Option<Vec<u8>>>>>,
    epoch: AtomicU64,
}

impl MemoryBackingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackingStore {
    fn get(&self, key: &[u8], epoch: u64) -> Result<Option<Vec<u8>>> {
        let inner = self.inner.read();
        let start = (key.to_vec(), Reverse(epoch));
        for ((k, Reverse(ver)), value) in inner.range(start..) {
            if k.as_slice() != key {
                break;
            }
            if *ver > epoch {
                continue;
            }
            return Ok(value.clone());
        }
        Ok(None)
    }

    fn write_batch(&self, ops: Vec<WriteOp>, _sync: bool) -> Result<u64> {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let mut inner = self.inner.write();
        for op in ops {
            match op {
                WriteOp::Put(key, value) => {
                    inner.insert((key, Reverse(epoch)), Some(value));
                }
                WriteOp::Delete(key) => {
                    inner.insert((key, Reverse(epoch)), None);
                }
            }
        }
        Ok(epoch)
    }

    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    fn iter_range(&self, start: Vec<u8>, end: Vec<u8>, epoch: u64) -> Box<dyn KvIterator + '_> {
        let range = to_key_range(start, end);
        let inner = batched_iter::Iter::new(self.inner.clone(), range);
        Box::new(MemoryIterator::new(inner, epoch))
    }

    fn approximate_size(&self, start: &[u8], end: &[u8]) -> u64 {
        let inner = self.inner.read();
        let range = to_key_range(start.to_vec(), end.to_vec());
        inner
            .range(range)
            .map(|((k, _), v)| (k.len() + v.as_ref().map_or(0, Vec::len)) as u64)
            .sum()
    }
}

struct MemoryIterator {
    inner: std::iter::Fuse<batched_iter::Iter>,
    epoch: u64,
    current: Option<(Vec<u8>, Vec<u8>)>,
    last_key_seen: Option<Vec<u8>>,
}

impl MemoryIterator {
    fn new(inner: batched_iter::Iter, epoch: u64) -> Self {
        let mut iter = Self {
            inner: inner.fuse(),
            epoch,
            current: None,
            last_key_seen: None,
        };
        iter.advance();
        iter
    }

    fn advance(&mut self) {
        for ((key, Reverse(ver)), value) in self.inner.by_ref() {
            if ver > self.epoch {
                continue;
            }
            if self.last_key_seen.as_ref() == Some(&key) {
                continue;
            }
            self.last_key_seen = Some(key.clone());
            if let Some(value) = value {
                self.current = Some((key, value));
                return;
            }
        }
        self.current = None;
    }
}

impl KvIterator for MemoryIterator {
    fn valid(&self) -> bool {
        self.current.is_some()
    }

    fn next(&mut self) {
        self.advance();
    }

    fn key(&self) -> &[u8] {
        &self.current.as_ref().expect("next() called past end").0
    }

    fn value(&self) -> &[u8] {
        &self.current.as_ref().expect("next() called past end").1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(iter: &mut dyn KvIterator) -> Vec<(Vec<u8>, Vec<u8>)> {
        let mut out = Vec::new();
        while iter.valid() {
            out.push((iter.key().to_vec(), iter.value().to_vec()));
            iter.next();
        }
        out
    }

    #[test]
    fn test_snapshot_isolation() {
        let store = MemoryBackingStore::new();
        let e0 = store
            .write_batch(
                vec![
                    WriteOp::Put(b"a".to_vec(), b"v1".to_vec()),
                    WriteOp::Put(b"b".to_vec(), b"v1".to_vec()),
                ],
                true,
            )
            .unwrap();
        let e1 = store
            .write_batch(
                vec![
                    WriteOp::Put(b"a".to_vec(), b"v2".to_vec()),
                    WriteOp::Delete(b"b".to_vec()),
                ],
                true,
            )
            .unwrap();

        assert_eq!(store.get(b"a", e0).unwrap(), Some(b"v1".to_vec()));
        assert_eq!(store.get(b"b", e0).unwrap(), Some(b"v1".to_vec()));
        assert_eq!(store.get(b"a", e1).unwrap(), Some(b"v2".to_vec()));
        assert_eq!(store.get(b"b", e1).unwrap(), None);
        assert_eq!(store.get(b"c", e1).unwrap(), None);

        let mut it = store.iter_range(b"a".to_vec(), b"c".to_vec(), e0);
        assert_eq!(
            collect(&mut *it),
            vec![
                (b"a".to_vec(), b"v1".to_vec()),
                (b"b".to_vec(), b"v1".to_vec())
            ]
        );

        let mut it = store.iter_range(b"a".to_vec(), b"c".to_vec(), e1);
        assert_eq!(collect(&mut *it), vec![(b"a".to_vec(), b"v2".to_vec())]);
    }

    #[test]
    fn read_committed_sees_every_committed_epoch() {
        let store = MemoryBackingStore::new();
        store
            .write_batch(vec![WriteOp::Put(b"k".to_vec(), b"1".to_vec())], true)
            .unwrap();
        assert_eq!(
            store.get(b"k", store.current_epoch()).unwrap(),
            Some(b"1".to_vec())
        );
        store
            .write_batch(vec![WriteOp::Put(b"k".to_vec(), b"2".to_vec())], true)
            .unwrap();
        assert_eq!(
            store.get(b"k", store.current_epoch()).unwrap(),
            Some(b"2".to_vec())
        );
    }

    #[test]
    fn approximate_size_counts_keys_and_values() {
        let store = MemoryBackingStore::new();
        store
            .write_batch(vec![WriteOp::Put(b"k".to_vec(), b"value".to_vec())], true)
            .unwrap();
        assert_eq!(store.approximate_size(b"a", b"z"), 1 + 5);
    }
}
