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

//! Keyspace registry (SPEC_FULL.md §3, §4.2).
//!
//! A keyspace's id is dense and assigned at first registration, then
//! persisted under the metadata prefix so it survives a restart. The
//! in-process map is an `RwLock`-guarded `HashMap`, read-locked on every
//! lookup and write-locked only on `register_keyspace`, matching §5's "lock-
//! free read, write-locked on register_keyspace" requirement well enough for
//! a `parking_lot::RwLock` (uncontended reads never block each other).

use std::collections::HashMap;

use keydb_error::{LogicalError, Result};
use parking_lot::RwLock;

use crate::datum_key::{self, MAX_KEYSPACE_ID};
use crate::store::{StorageBackend, WriteOp};

/// `(name, id)` pair, per SPEC_FULL.md §3.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keyspace {
    pub name: String,
    pub id: u32,
}

/// Tracks the name-to-id mapping for every registered keyspace.
pub struct KeyspaceRegistry {
    by_name: RwLock<HashMap<String, u32>>,
}

impl KeyspaceRegistry {
    /// Loads the registry from `backend`'s metadata prefix.
    pub fn load<S: StorageBackend + ?Sized>(backend: &S) -> Result<Self> {
        let mut by_name = HashMap::new();
        let epoch = backend.current_epoch();
        let (start, end) = datum_key::metadata_range();
        let mut iter = backend.iter_range(start, end, epoch);
        while iter.valid() {
            let name = datum_key::decode_metadata_keyspace_name(iter.key())?;
            let id = datum_key::decode_keyspace_id_value(iter.value())?;
            by_name.insert(name, id);
            iter.next();
        }
        Ok(Self {
            by_name: RwLock::new(by_name),
        })
    }

    /// Returns the id for `name`, registering it with a freshly assigned
    /// dense id and persisting the mapping if it is not already known.
    pub fn register<S: StorageBackend + ?Sized>(&self, backend: &S, name: &str) -> Result<u32> {
        if let Some(&id) = self.by_name.read().get(name) {
            return Ok(id);
        }
        let mut by_name = self.by_name.write();
        if let Some(&id) = by_name.get(name) {
            return Ok(id);
        }
        let id = by_name.len() as u32;
        if id >= MAX_KEYSPACE_ID {
            return Err(LogicalError::ReadOnlyViolation(
                "keyspace id space exhausted".into(),
            )
            .into());
        }
        backend.write_batch(
            vec![WriteOp::Put(
                datum_key::encode_metadata_keyspace_key(name),
                datum_key::encode_keyspace_id_value(id),
            )],
            true,
        )?;
        by_name.insert(name.to_string(), id);
        tracing::info!(keyspace = name, id, "registered keyspace");
        Ok(id)
    }

    /// Looks up an already-registered keyspace id, without creating one.
    pub fn lookup(&self, name: &str) -> Result<u32> {
        self.by_name
            .read()
            .get(name)
            .copied()
            .ok_or_else(|| LogicalError::UnknownKeyspace(name.to_string()).into())
    }
}
