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

//! The storage primitive contract the engine consumes from a backing store
//! (SPEC_FULL.md §4.3).
//!
//! The source describes `snapshot()` returning an opaque `read_view`. Here a
//! read view is simply an epoch number: every write batch is assigned the
//! next epoch, and a read at epoch `e` sees every write committed at or
//! before `e` and none after — the same scheme the teacher's in-memory store
//! uses internally (`(key, Reverse(epoch)) -> value`), promoted here to the
//! primitive's public contract instead of being an implementation detail of
//! one backend. Read-committed transactions simply re-read
//! [`StorageBackend::current_epoch`] on every operation instead of pinning
//! one.

use keydb_error::Result;

/// A single mutation in a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOp {
    Put(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

/// A positioned cursor over a key range at a fixed epoch. Keys are visited in
/// ascending byte-lexicographic order; deleted or superseded versions are
/// never surfaced — `value()` always returns the live value at the iterator's
/// epoch.
pub trait KvIterator {
    fn valid(&self) -> bool;
    fn next(&mut self);
    fn key(&self) -> &[u8];
    fn value(&self) -> &[u8];
}

/// Thin facade over an ordered key/value store (SPEC_FULL.md §4.3).
///
/// All methods are synchronous: the concurrency model (§5) schedules work off
/// the hot path when a real backend needs to block on I/O, so the contract
/// itself carries no `async`.
pub trait StorageBackend: Send + Sync {
    /// Point lookup of the live value of `key` as of `epoch`.
    fn get(&self, key: &[u8], epoch: u64) -> Result<Option<Vec<u8>>>;

    /// Atomically applies `ops`, returning the epoch assigned to the batch.
    /// `sync` requests the backend fsync before returning; the in-memory
    /// reference backend ignores it.
    fn write_batch(&self, ops: Vec<WriteOp>, sync: bool) -> Result<u64>;

    /// The most recently committed epoch. Used by read-committed
    /// transactions, which re-acquire this on every read instead of pinning
    /// a snapshot.
    fn current_epoch(&self) -> u64;

    /// Iterates `[start, end)` at `epoch`, inclusive-exclusive, ascending.
    fn iter_range(&self, start: Vec<u8>, end: Vec<u8>, epoch: u64) -> Box<dyn KvIterator + '_>;

    /// Size estimate for `[start, end)`, for statistics only.
    fn approximate_size(&self, start: &[u8], end: &[u8]) -> u64;
}
