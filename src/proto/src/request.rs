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

//! The request taxonomy carried inside a command-plane frame's payload
//! (SPEC_FULL.md §6). The concrete byte encoding of this tagged union is
//! out of scope per §1; this module fixes only the variant shape the engine
//! understands, leaving serialization to a transport layer built on top of
//! `keydb_storage::Engine`.

/// One request against a keyspace, addressed by name (resolved against the
/// engine's registry before a transaction is opened or reused).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    RegisterKeyspace { name: String },
    Begin { keyspace: String, repeatable_read: bool },
    Commit { txn_id: u64 },
    Abort { txn_id: u64 },
    PutColumns {
        txn_id: u64,
        table: Vec<u8>,
        key: Vec<u8>,
        columns: Vec<(Vec<u8>, Vec<u8>)>,
    },
    DeleteColumns {
        txn_id: u64,
        table: Vec<u8>,
        key: Vec<u8>,
        columns: Vec<Vec<u8>>,
    },
    DeleteKey { txn_id: u64, table: Vec<u8>, key: Vec<u8> },
    GetColumn {
        txn_id: u64,
        table: Vec<u8>,
        key: Vec<u8>,
        column: Vec<u8>,
    },
    GetColumns { txn_id: u64, table: Vec<u8>, key: Vec<u8> },
    CountKeys {
        txn_id: u64,
        table: Vec<u8>,
        first: Option<Vec<u8>>,
        up_to: Option<Vec<u8>>,
    },
    ListTables { txn_id: u64 },
}

/// The request id's low bit distinguishes await-blocking requests (odd)
/// from the rest (even), per SPEC_FULL.md §5 — used to avoid collisions
/// while a long-held wait is outstanding.
pub fn is_await_blocking(request_id: u64) -> bool {
    request_id % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_parity_matches_the_await_blocking_convention() {
        assert!(is_await_blocking(1));
        assert!(!is_await_blocking(2));
    }
}
