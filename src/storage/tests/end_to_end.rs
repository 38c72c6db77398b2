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

//! Black-box scenarios from SPEC_FULL.md §8, driven only through `Engine`.

use std::sync::Arc;

use keydb_storage::{count_keys, list_tables, Column, Engine, Isolation, MemoryBackingStore};

fn engine() -> Engine<MemoryBackingStore> {
    Engine::open(Arc::new(MemoryBackingStore::new())).unwrap()
}

#[test]
fn put_columns_then_get_column_values() {
    let engine = engine();
    engine.register_keyspace("users").unwrap();

    let mut txn = engine.begin("users", Isolation::ReadCommitted).unwrap();
    txn.put_columns(
        b"t",
        b"alice",
        vec![Column::new("name", "A"), Column::new("age", "30")],
    );
    txn.commit().unwrap();

    let read = engine.begin("users", Isolation::ReadCommitted).unwrap();
    let values = read
        .get_column_values(b"t", b"alice", &[b"name".to_vec(), b"missing".to_vec()])
        .unwrap();
    assert_eq!(values, vec![Some(b"A".to_vec()), None]);
}

#[test]
fn nested_transaction_commits_into_the_parent_and_wins_on_outer_commit() {
    let engine = engine();
    engine.register_keyspace("ks").unwrap();

    let mut outer = engine.begin("ks", Isolation::ReadCommitted).unwrap();
    outer.put_columns(b"t", b"k1", vec![Column::new("c", "1")]);

    let mut nested = outer.begin_nested();
    nested
        .transaction_mut()
        .put_columns(b"t", b"k1", vec![Column::new("c", "2")]);
    nested.commit(&mut outer);

    outer.commit().unwrap();

    let read = engine.begin("ks", Isolation::ReadCommitted).unwrap();
    let (value, _) = read.get_column(b"t", b"k1", b"c").unwrap().unwrap();
    assert_eq!(value, b"2");
}

#[test]
fn repeatable_read_is_stable_while_read_committed_sees_external_commits() {
    let engine = engine();
    engine.register_keyspace("ks").unwrap();

    let mut setup = engine.begin("ks", Isolation::ReadCommitted).unwrap();
    setup.put_columns(b"t", b"k", vec![Column::new("c", "1")]);
    setup.commit().unwrap();

    let rr = engine.begin("ks", Isolation::RepeatableRead).unwrap();

    let mut other = engine.begin("ks", Isolation::ReadCommitted).unwrap();
    other.put_columns(b"t", b"k", vec![Column::new("c", "2")]);
    other.commit().unwrap();

    let (value, _) = rr.get_column(b"t", b"k", b"c").unwrap().unwrap();
    assert_eq!(value, b"1");

    let rc = engine.begin("ks", Isolation::ReadCommitted).unwrap();
    let (value, _) = rc.get_column(b"t", b"k", b"c").unwrap().unwrap();
    assert_eq!(value, b"2");
}

#[test]
fn count_keys_reflects_inserts_then_a_same_transaction_delete() {
    let engine = engine();
    engine.register_keyspace("ks").unwrap();

    for key in [b"a".as_slice(), b"b", b"c"] {
        let mut txn = engine.begin("ks", Isolation::ReadCommitted).unwrap();
        txn.put_columns(b"t", key, vec![Column::new("c", "1")]);
        txn.commit().unwrap();
    }

    let read = engine.begin("ks", Isolation::ReadCommitted).unwrap();
    assert_eq!(count_keys(&read, b"t", None, None).unwrap(), 3);

    let mut txn = engine.begin("ks", Isolation::ReadCommitted).unwrap();
    txn.delete_key(b"t", b"b").unwrap();
    assert_eq!(count_keys(&txn, b"t", None, None).unwrap(), 2);
}

#[test]
fn list_tables_is_ascending_and_a_fresh_keyspace_is_empty() {
    let engine = engine();
    engine.register_keyspace("empty").unwrap();
    let read = engine.begin("empty", Isolation::ReadCommitted).unwrap();
    assert_eq!(list_tables(&read).unwrap(), Vec::<Vec<u8>>::new());

    engine.register_keyspace("populated").unwrap();
    for table in [b"zzz".as_slice(), b"aaa", b"mmm"] {
        let mut txn = engine.begin("populated", Isolation::ReadCommitted).unwrap();
        txn.put_columns(table, b"k", vec![Column::new("c", "v")]);
        txn.commit().unwrap();
    }
    let read = engine.begin("populated", Isolation::ReadCommitted).unwrap();
    assert_eq!(
        list_tables(&read).unwrap(),
        vec![b"aaa".to_vec(), b"mmm".to_vec(), b"zzz".to_vec()]
    );
}

#[test]
fn delete_key_removes_every_column_and_exists_key_is_false() {
    let engine = engine();
    engine.register_keyspace("ks").unwrap();

    let mut txn = engine.begin("ks", Isolation::ReadCommitted).unwrap();
    txn.put_columns(b"t", b"k", vec![Column::new("a", "1"), Column::new("b", "2")]);
    txn.commit().unwrap();

    let mut txn = engine.begin("ks", Isolation::ReadCommitted).unwrap();
    txn.delete_key(b"t", b"k").unwrap();
    txn.commit().unwrap();

    let read = engine.begin("ks", Isolation::ReadCommitted).unwrap();
    assert!(!read.exists_key(b"t", b"k").unwrap());
}
