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

//! The storage engine: physical key layout, the storage-primitive contract,
//! an in-memory reference backend, the keyspace registry, the transaction
//! engine, the query planner, and backup/restore (SPEC_FULL.md §4).

mod backup;
mod datum_key;
mod engine;
mod keyspace;
mod memory_store;
mod planner;
mod replication;
mod store;
mod txn;

pub use backup::{dump_chunk, load_chunk, Cursor, MAX_CHUNK};
pub use datum_key::{DatumKey, DatumValue, MAX_KEYSPACE_ID};
pub use engine::Engine;
pub use keyspace::{Keyspace, KeyspaceRegistry};
pub use memory_store::MemoryBackingStore;
pub use planner::{
    count_keys, fold_over_data, get_slice, get_slice_values, list_tables, ColumnSelector,
    FoldControl, KeyRange, Slice, SliceRow,
};
pub use replication::{decode_update_frame, encode_update_frame, Ack, ReplicationProducer, ReplicationSink};
pub use store::{KvIterator, StorageBackend, WriteOp};
pub use txn::{Column, Isolation, Nested, Timestamp, Transaction};
