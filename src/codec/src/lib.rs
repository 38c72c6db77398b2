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

//! Order-preserving key codec library (SPEC_FULL.md §4.1).
//!
//! A [`Codec`] maps a typed value to a byte string such that byte-lexicographic
//! order on the encodings matches the logical order of the values. The
//! datum-key schema in `keydb_storage` is built entirely out of the codecs
//! defined here; nothing in this crate knows about keyspaces or tables.

mod choice;
mod custom;
mod primitive;
mod string;
mod tuple;

pub use choice::{Choice2Codec, Choice3Codec, Choice4Codec, Choice5Codec};
pub use custom::CustomCodec;
pub use primitive::{BoolCodec, ByteCodec, PositiveInt64Codec, PositiveInt64ComplementCodec};
pub use string::{SelfDelimitedStringCodec, StringzCodec, StringzUnsafeCodec};
pub use tuple::{Tuple2Codec, Tuple3Codec, Tuple4Codec, Tuple5Codec};

use keydb_error::EncodingError;

pub type Result<T> = std::result::Result<T, EncodingError>;

/// An order-preserving encoding for values of type [`Codec::Value`].
///
/// Implementors must satisfy, for every representable `x`, `y`:
/// - `decode(encode(x)) == (x, len)` (round-trip),
/// - `x < y` iff `encode(x) < encode(y)` under byte-lexicographic order,
/// - `min() <= x <= max()`,
/// - `succ`/`pred` saturate at `max`/`min` rather than wrapping or panicking.
pub trait Codec {
    type Value: Clone + std::fmt::Debug + PartialEq + Eq + PartialOrd + Ord;

    /// Appends the encoding of `value` to `out`.
    fn encode(&self, out: &mut Vec<u8>, value: &Self::Value) -> Result<()>;

    /// Decodes a value from the front of `bytes`, returning it along with the
    /// number of bytes consumed. Implementations must not read past the
    /// self-delimited boundary of the encoding.
    fn decode(&self, bytes: &[u8]) -> Result<(Self::Value, usize)>;

    /// The smallest representable value.
    fn min(&self) -> Self::Value;

    /// The largest representable value.
    fn max(&self) -> Self::Value;

    /// The next representable value after `value`, saturating at `max()`.
    fn succ(&self, value: &Self::Value) -> Self::Value;

    /// The representable value immediately before `value`, saturating at
    /// `min()`.
    fn pred(&self, value: &Self::Value) -> Self::Value;

    /// Pretty-prints a value for diagnostics and test failure messages.
    fn pp(&self, value: &Self::Value) -> String {
        format!("{:?}", value)
    }

    /// Convenience: encodes into a fresh `Vec<u8>`.
    fn encode_to_vec(&self, value: &Self::Value) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode(&mut out, value)?;
        Ok(out)
    }
}

#[cfg(test)]
mod law_tests {
    //! Generic codec-law checks, run against every concrete codec in this
    //! crate's own test modules via [`assert_codec_laws`]. Kept here so the
    //! law itself is defined once; each codec's tests supply representative
    //! values (see SPEC_FULL.md §8, properties 1-5).
    use super::*;

    pub fn assert_roundtrip<C: Codec>(codec: &C, value: &C::Value) {
        let bytes = codec.encode_to_vec(value).expect("encode");
        let (decoded, len) = codec.decode(&bytes).expect("decode");
        assert_eq!(len, bytes.len(), "decode must consume exactly what encode wrote");
        assert_eq!(&decoded, value, "round-trip mismatch for {}", codec.pp(value));
    }

    pub fn assert_order<C: Codec>(codec: &C, lo: &C::Value, hi: &C::Value) {
        assert!(lo <= hi, "test setup: lo must be <= hi");
        let lo_bytes = codec.encode_to_vec(lo).expect("encode lo");
        let hi_bytes = codec.encode_to_vec(hi).expect("encode hi");
        assert!(
            lo_bytes <= hi_bytes,
            "order preservation violated: {} -> {:?}, {} -> {:?}",
            codec.pp(lo),
            lo_bytes,
            codec.pp(hi),
            hi_bytes
        );
    }

    pub fn assert_bounds<C: Codec>(codec: &C, value: &C::Value) {
        assert!(&codec.min() <= value);
        assert!(value <= &codec.max());
    }

    pub fn assert_saturation<C: Codec>(codec: &C) {
        assert_eq!(codec.succ(&codec.max()), codec.max());
        assert_eq!(codec.pred(&codec.min()), codec.min());
    }
}

#[cfg(test)]
pub(crate) use law_tests::{assert_bounds, assert_order, assert_roundtrip, assert_saturation};
