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

//! Top-level engine handle (SPEC_FULL.md §2): owns the backing store and
//! the keyspace registry, and is the entry point a request handler uses to
//! resolve a keyspace name to an id and open a transaction against it.

use std::sync::Arc;

use keydb_error::Result;

use crate::keyspace::KeyspaceRegistry;
use crate::store::StorageBackend;
use crate::txn::{Isolation, Transaction};

pub struct Engine<S: StorageBackend> {
    backend: Arc<S>,
    keyspaces: KeyspaceRegistry,
}

impl<S: StorageBackend> Engine<S> {
    /// Opens an engine over `backend`, recovering the keyspace registry from
    /// its metadata prefix.
    pub fn open(backend: Arc<S>) -> Result<Self> {
        let keyspaces = KeyspaceRegistry::load(&*backend)?;
        Ok(Self { backend, keyspaces })
    }

    /// Registers `name` if unknown, returning its dense id either way.
    pub fn register_keyspace(&self, name: &str) -> Result<u32> {
        self.keyspaces.register(&*self.backend, name)
    }

    /// Looks up an already-registered keyspace, without creating one.
    pub fn lookup_keyspace(&self, name: &str) -> Result<u32> {
        self.keyspaces.lookup(name)
    }

    /// Opens a transaction against `keyspace` at the requested isolation
    /// level.
    pub fn begin(&self, keyspace: &str, isolation: Isolation) -> Result<Transaction<S>> {
        let ks_id = self.keyspaces.lookup(keyspace)?;
        Ok(Transaction::begin(self.backend.clone(), ks_id, isolation))
    }

    pub fn backend(&self) -> &Arc<S> {
        &self.backend
    }
}
