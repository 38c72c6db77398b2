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

//! Physical key layout (SPEC_FULL.md §4.2).
//!
//! ```text
//! metadata_key = 0x00 ∥ self_delimited(keyspace_name)
//! datum_key    = 0x01 ∥ enc_u32_be(ks_id)
//!                     ∥ self_delimited(table)
//!                     ∥ self_delimited(key)
//!                     ∥ self_delimited(column)
//!                     ∥ enc_u64_be(MAX_U64 - timestamp_us)
//! ```
//!
//! The leading tag byte is what makes the metadata prefix disjoint from the
//! datum-key prefix (invariant 4): `0x00` sorts before `0x01` regardless of
//! what follows, so metadata keys never interleave with real data even
//! though both live in the same flat backing store.
//!
//! `ks_id` is a plain big-endian `u32`, not one of `keydb_codec`'s signed
//! `positive_int64` family — there is no negative case to reject, and a
//! 4-byte fixed-width field keeps every datum key the same shape after the
//! tag byte, which is what lets `encode_table_successor` work by incrementing
//! raw bytes.

use keydb_codec::{Codec, SelfDelimitedStringCodec};
use keydb_error::{EncodingError, Result};

const METADATA_TAG: u8 = 0x00;
const DATUM_TAG: u8 = 0x01;

/// Reserved `ks_id` used only by [`end_of_db_key`]; never assigned to a real
/// keyspace.
pub const MAX_KEYSPACE_ID: u32 = u32::MAX - 1;

fn table_codec() -> SelfDelimitedStringCodec {
    SelfDelimitedStringCodec
}

fn encode_u32_be(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn decode_u32_be(bytes: &[u8]) -> Result<(u32, usize)> {
    if bytes.len() < 4 {
        return Err(EncodingError::IncompleteFragment("ks_id".into()).into());
    }
    Ok((u32::from_be_bytes(bytes[..4].try_into().unwrap()), 4))
}

fn encode_u64_be(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn decode_u64_be(bytes: &[u8]) -> Result<(u64, usize)> {
    if bytes.len() < 8 {
        return Err(EncodingError::IncompleteFragment("timestamp".into()).into());
    }
    Ok((u64::from_be_bytes(bytes[..8].try_into().unwrap()), 8))
}

/// Returns the smallest byte string strictly greater than every string with
/// `prefix` as a prefix. Used to skip past an entire table or keyspace
/// without iterating through it. Panics if `prefix` is all `0xFF` bytes,
/// which cannot happen for any prefix produced by this module (every one
/// ends in a `self_delimited` terminator, whose final byte is `0x00`).
fn next_prefix(prefix: &[u8]) -> Vec<u8> {
    let mut out = prefix.to_vec();
    while let Some(last) = out.pop() {
        if last != 0xFF {
            out.push(last + 1);
            return out;
        }
    }
    unreachable!("next_prefix called on an all-0xFF prefix, which datum_key never produces");
}

/// A fully decoded datum key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatumKey {
    pub ks_id: u32,
    pub table: Vec<u8>,
    pub key: Vec<u8>,
    pub column: Vec<u8>,
    /// Real timestamp in microseconds, already un-complemented.
    pub timestamp_us: u64,
}

/// Encodes a full datum key.
pub fn encode_datum_key(
    ks_id: u32,
    table: &[u8],
    key: &[u8],
    column: &[u8],
    timestamp_us: u64,
) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(DATUM_TAG);
    encode_u32_be(&mut out, ks_id);
    table_codec().encode(&mut out, &table.to_vec()).expect("table encode is infallible");
    table_codec().encode(&mut out, &key.to_vec()).expect("key encode is infallible");
    table_codec().encode(&mut out, &column.to_vec()).expect("column encode is infallible");
    encode_u64_be(&mut out, u64::MAX - timestamp_us);
    out
}

/// Decodes a full datum key. Fails with [`EncodingError::BadEncoding`] if
/// `bytes` does not carry the datum tag.
pub fn decode_datum_key(bytes: &[u8]) -> Result<DatumKey> {
    let tag = *bytes
        .first()
        .ok_or_else(|| EncodingError::IncompleteFragment("datum_key tag".into()))?;
    if tag != DATUM_TAG {
        return Err(EncodingError::BadEncoding("datum_key: not a datum key".into()).into());
    }
    let mut offset = 1;
    let (ks_id, len) = decode_u32_be(&bytes[offset..])?;
    offset += len;
    let (table, len) = table_codec().decode(&bytes[offset..])?;
    offset += len;
    let (key, len) = table_codec().decode(&bytes[offset..])?;
    offset += len;
    let (column, len) = table_codec().decode(&bytes[offset..])?;
    offset += len;
    let (complement, _) = decode_u64_be(&bytes[offset..])?;
    Ok(DatumKey {
        ks_id,
        table,
        key,
        column,
        timestamp_us: u64::MAX - complement,
    })
}

/// The smallest key at or above every datum of `(ks_id, table, key)`, i.e.
/// the encoding with an empty column and the maximal timestamp complement
/// (timestamp 0).
pub fn encode_key_prefix(ks_id: u32, table: &[u8], key: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(DATUM_TAG);
    encode_u32_be(&mut out, ks_id);
    table_codec().encode(&mut out, &table.to_vec()).unwrap();
    table_codec().encode(&mut out, &key.to_vec()).unwrap();
    out
}

/// The smallest key strictly greater than any datum of `(ks_id, table, key)`.
pub fn encode_key_successor(ks_id: u32, table: &[u8], key: &[u8]) -> Vec<u8> {
    next_prefix(&encode_key_prefix(ks_id, table, key))
}

/// The smallest key at or above every version of `(ks_id, table, key, column)`.
pub fn encode_column_prefix(ks_id: u32, table: &[u8], key: &[u8], column: &[u8]) -> Vec<u8> {
    let mut out = encode_key_prefix(ks_id, table, key);
    table_codec().encode(&mut out, &column.to_vec()).unwrap();
    out
}

/// The smallest key strictly greater than any version of
/// `(ks_id, table, key, column)`.
pub fn encode_column_successor(ks_id: u32, table: &[u8], key: &[u8], column: &[u8]) -> Vec<u8> {
    next_prefix(&encode_column_prefix(ks_id, table, key, column))
}

/// A physical datum's value, as actually stored in the backing store: either
/// a live value or a tombstone. Deletes are modelled as a *new* physical key
/// at the commit timestamp carrying [`DatumValue::Tombstone`], not as a
/// removal of an existing key — the existing key at an older timestamp must
/// survive for the lifetime of any repeatable-read snapshot that still sees
/// it (SPEC_FULL.md invariant 2).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatumValue {
    Put(Vec<u8>),
    Tombstone,
}

const VALUE_TOMBSTONE_TAG: u8 = 0x00;
const VALUE_PUT_TAG: u8 = 0x01;

pub fn encode_datum_value(value: &DatumValue) -> Vec<u8> {
    match value {
        DatumValue::Tombstone => vec![VALUE_TOMBSTONE_TAG],
        DatumValue::Put(bytes) => {
            let mut out = Vec::with_capacity(1 + bytes.len());
            out.push(VALUE_PUT_TAG);
            out.extend_from_slice(bytes);
            out
        }
    }
}

pub fn decode_datum_value(bytes: &[u8]) -> Result<DatumValue> {
    match bytes.first() {
        Some(&VALUE_TOMBSTONE_TAG) => Ok(DatumValue::Tombstone),
        Some(&VALUE_PUT_TAG) => Ok(DatumValue::Put(bytes[1..].to_vec())),
        _ => Err(EncodingError::BadEncoding("datum_value: unknown tag".into()).into()),
    }
}

/// The smallest key at or above every datum of `(ks_id, table)`.
pub fn encode_table_prefix(ks_id: u32, table: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(DATUM_TAG);
    encode_u32_be(&mut out, ks_id);
    table_codec().encode(&mut out, &table.to_vec()).unwrap();
    out
}

/// The smallest key strictly greater than any datum of `(ks_id, table)`;
/// used by `list_tables` to skip directly to the next table.
pub fn encode_table_successor(ks_id: u32, table: &[u8]) -> Vec<u8> {
    next_prefix(&encode_table_prefix(ks_id, table))
}

/// The smallest key at or above every datum of `ks_id`.
pub fn encode_keyspace_prefix(ks_id: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(DATUM_TAG);
    encode_u32_be(&mut out, ks_id);
    out
}

/// The smallest key strictly greater than any datum in `ks_id`.
pub fn encode_keyspace_successor(ks_id: u32) -> Vec<u8> {
    next_prefix(&encode_keyspace_prefix(ks_id))
}

/// Sentinel above every real datum key, for bounding iterators
/// (SPEC_FULL.md invariant 3).
pub fn end_of_db_key() -> Vec<u8> {
    encode_keyspace_prefix(MAX_KEYSPACE_ID + 1)
}

/// `[start, end)` bounding every metadata key.
pub fn metadata_range() -> (Vec<u8>, Vec<u8>) {
    (vec![METADATA_TAG], vec![DATUM_TAG])
}

/// Encodes the metadata key storing a keyspace's assigned id.
pub fn encode_metadata_keyspace_key(name: &str) -> Vec<u8> {
    let mut out = vec![METADATA_TAG];
    table_codec()
        .encode(&mut out, &name.as_bytes().to_vec())
        .expect("keyspace name encode is infallible");
    out
}

/// Decodes the keyspace name back out of a metadata key produced by
/// [`encode_metadata_keyspace_key`].
pub fn decode_metadata_keyspace_name(bytes: &[u8]) -> Result<String> {
    let tag = *bytes
        .first()
        .ok_or_else(|| EncodingError::IncompleteFragment("metadata_key tag".into()))?;
    if tag != METADATA_TAG {
        return Err(EncodingError::BadEncoding("metadata_key: not a metadata key".into()).into());
    }
    let (name, _) = table_codec().decode(&bytes[1..])?;
    String::from_utf8(name)
        .map_err(|_| EncodingError::BadEncoding("metadata_key: name is not utf-8".into()).into())
}

pub fn encode_keyspace_id_value(id: u32) -> Vec<u8> {
    id.to_be_bytes().to_vec()
}

pub fn decode_keyspace_id_value(bytes: &[u8]) -> Result<u32> {
    let (id, _) = decode_u32_be(bytes)?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datum_key_roundtrips() {
        let key = encode_datum_key(1, b"t", b"k1", b"c", 1_000);
        let decoded = decode_datum_key(&key).unwrap();
        assert_eq!(decoded.ks_id, 1);
        assert_eq!(decoded.table, b"t");
        assert_eq!(decoded.key, b"k1");
        assert_eq!(decoded.column, b"c");
        assert_eq!(decoded.timestamp_us, 1_000);
    }

    #[test]
    fn newest_timestamp_sorts_first() {
        let older = encode_datum_key(1, b"t", b"k", b"c", 100);
        let newer = encode_datum_key(1, b"t", b"k", b"c", 200);
        assert!(newer < older, "descending timestamp: newest must sort first");
    }

    #[test]
    fn ks_id_dominates_ordering() {
        let a = encode_datum_key(1, b"zzz", b"k", b"c", 0);
        let b = encode_datum_key(2, b"aaa", b"k", b"c", 0);
        assert!(a < b);
    }

    #[test]
    fn metadata_keys_sort_before_all_datum_keys() {
        let meta = encode_metadata_keyspace_key("users");
        let datum = encode_datum_key(0, b"", b"", b"", 0);
        assert!(meta < datum);
    }

    #[test]
    fn end_of_db_key_sorts_after_every_real_datum() {
        let datum = encode_datum_key(MAX_KEYSPACE_ID, vec![0xFFu8; 4].as_slice(), b"k", b"c", 0);
        assert!(datum < end_of_db_key());
    }

    #[test]
    fn table_successor_skips_the_whole_table_but_not_the_next_one() {
        let last_of_t1 = encode_datum_key(1, b"t1", &[0xFFu8; 4], b"zz", 0);
        let successor = encode_table_successor(1, b"t1");
        assert!(successor > last_of_t1);

        let first_of_t2 = encode_datum_key(1, b"t2", b"", b"", u64::MAX);
        assert!(successor <= first_of_t2);
    }

    #[test]
    fn key_successor_skips_the_whole_key_but_stays_within_the_table() {
        let last_of_k1 = encode_datum_key(1, b"t", b"k1", b"zz", 0);
        let successor = encode_key_successor(1, b"t", b"k1");
        assert!(successor > last_of_k1);

        let first_of_k2 = encode_datum_key(1, b"t", b"k2", b"", u64::MAX);
        assert!(successor <= first_of_k2);
    }

    #[test]
    fn keyspace_id_value_roundtrips() {
        let bytes = encode_keyspace_id_value(42);
        assert_eq!(decode_keyspace_id_value(&bytes).unwrap(), 42);
    }

    #[test]
    fn column_successor_skips_every_version_of_one_column() {
        let oldest_version = encode_datum_key(1, b"t", b"k", b"c", 0);
        let successor = encode_column_successor(1, b"t", b"k", b"c");
        assert!(successor > oldest_version);

        let next_column = encode_datum_key(1, b"t", b"k", b"d", u64::MAX);
        assert!(successor <= next_column);
    }

    #[test]
    fn datum_value_roundtrips_put_and_tombstone() {
        let put = DatumValue::Put(b"v".to_vec());
        assert_eq!(decode_datum_value(&encode_datum_value(&put)).unwrap(), put);
        assert_eq!(
            decode_datum_value(&encode_datum_value(&DatumValue::Tombstone)).unwrap(),
            DatumValue::Tombstone
        );
    }
}
