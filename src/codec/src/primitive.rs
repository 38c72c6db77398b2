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

use keydb_error::EncodingError;

use crate::{Codec, Result};

/// One raw byte, natural order.
#[derive(Clone, Copy, Debug, Default)]
pub struct ByteCodec;

impl Codec for ByteCodec {
    type Value = u8;

    fn encode(&self, out: &mut Vec<u8>, value: &u8) -> Result<()> {
        out.push(*value);
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> Result<(u8, usize)> {
        let b = *bytes
            .first()
            .ok_or_else(|| EncodingError::IncompleteFragment("byte".into()))?;
        Ok((b, 1))
    }

    fn min(&self) -> u8 {
        u8::MIN
    }

    fn max(&self) -> u8 {
        u8::MAX
    }

    fn succ(&self, value: &u8) -> u8 {
        value.saturating_add(1)
    }

    fn pred(&self, value: &u8) -> u8 {
        value.saturating_sub(1)
    }
}

/// One byte, `false = 0`, `true = 1`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoolCodec;

impl Codec for BoolCodec {
    type Value = bool;

    fn encode(&self, out: &mut Vec<u8>, value: &bool) -> Result<()> {
        out.push(if *value { 1 } else { 0 });
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> Result<(bool, usize)> {
        let b = *bytes
            .first()
            .ok_or_else(|| EncodingError::IncompleteFragment("bool".into()))?;
        if b > 1 {
            return Err(EncodingError::BadEncoding("bool".into()));
        }
        Ok((b == 1, 1))
    }

    fn min(&self) -> bool {
        false
    }

    fn max(&self) -> bool {
        true
    }

    fn succ(&self, _value: &bool) -> bool {
        true // saturates at max()
    }

    fn pred(&self, _value: &bool) -> bool {
        false // saturates at min()
    }
}

/// Big-endian `i64`, preserves order for non-negative values only. Negative
/// values are rejected at encode time: this codec is for counters, epochs and
/// other quantities that are never negative, not a general integer codec.
#[derive(Clone, Copy, Debug, Default)]
pub struct PositiveInt64Codec;

impl Codec for PositiveInt64Codec {
    type Value = i64;

    fn encode(&self, out: &mut Vec<u8>, value: &i64) -> Result<()> {
        if *value < 0 {
            return Err(EncodingError::UnsatisfiedConstraint(format!(
                "positive_int64: {} is negative",
                value
            )));
        }
        out.extend_from_slice(&value.to_be_bytes());
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> Result<(i64, usize)> {
        if bytes.len() < 8 {
            return Err(EncodingError::IncompleteFragment("positive_int64".into()));
        }
        let v = i64::from_be_bytes(bytes[..8].try_into().unwrap());
        Ok((v, 8))
    }

    fn min(&self) -> i64 {
        0
    }

    fn max(&self) -> i64 {
        i64::MAX
    }

    fn succ(&self, value: &i64) -> i64 {
        value.saturating_add(1)
    }

    fn pred(&self, value: &i64) -> i64 {
        (value.saturating_sub(1)).max(0)
    }
}

/// Big-endian encoding of `i64::MAX - x`: reverses the natural order of `x`.
/// Used for the descending timestamp component of the datum-key schema
/// (SPEC_FULL.md §4.2) so that the newest version of a column sorts first.
#[derive(Clone, Copy, Debug, Default)]
pub struct PositiveInt64ComplementCodec;

impl Codec for PositiveInt64ComplementCodec {
    type Value = i64;

    fn encode(&self, out: &mut Vec<u8>, value: &i64) -> Result<()> {
        if *value < 0 {
            return Err(EncodingError::UnsatisfiedConstraint(format!(
                "positive_int64_complement: {} is negative",
                value
            )));
        }
        let complement = i64::MAX - value;
        out.extend_from_slice(&complement.to_be_bytes());
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> Result<(i64, usize)> {
        if bytes.len() < 8 {
            return Err(EncodingError::IncompleteFragment(
                "positive_int64_complement".into(),
            ));
        }
        let complement = i64::from_be_bytes(bytes[..8].try_into().unwrap());
        Ok((i64::MAX - complement, 8))
    }

    fn min(&self) -> i64 {
        0
    }

    fn max(&self) -> i64 {
        i64::MAX
    }

    // `succ`/`pred` are defined over the *logical* value `x`, not its
    // encoding, so they still move towards `max`/`min` of `x` and saturate
    // there; the reversal only affects the byte order of the encoding.
    fn succ(&self, value: &i64) -> i64 {
        value.saturating_add(1)
    }

    fn pred(&self, value: &i64) -> i64 {
        (value.saturating_sub(1)).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_bounds, assert_order, assert_roundtrip, assert_saturation};

    #[test]
    fn byte_laws() {
        let c = ByteCodec;
        for v in [0u8, 1, 42, 254, 255] {
            assert_roundtrip(&c, &v);
            assert_bounds(&c, &v);
        }
        assert_order(&c, &3, &200);
        assert_saturation(&c);
    }

    #[test]
    fn bool_laws() {
        let c = BoolCodec;
        assert_roundtrip(&c, &true);
        assert_roundtrip(&c, &false);
        assert_order(&c, &false, &true);
        assert_saturation(&c);
    }

    #[test]
    fn bool_rejects_garbage_byte() {
        let c = BoolCodec;
        assert!(c.decode(&[2]).is_err());
    }

    #[test]
    fn positive_int64_laws() {
        let c = PositiveInt64Codec;
        for v in [0i64, 1, 5000, i64::MAX] {
            assert_roundtrip(&c, &v);
            assert_bounds(&c, &v);
        }
        assert_order(&c, &5, &6);
        assert_order(&c, &0, &i64::MAX);
        assert_saturation(&c);
    }

    #[test]
    fn positive_int64_rejects_negative() {
        let c = PositiveInt64Codec;
        assert!(matches!(
            c.encode_to_vec(&-1),
            Err(EncodingError::UnsatisfiedConstraint(_))
        ));
    }

    #[test]
    fn positive_int64_complement_reverses_order() {
        let c = PositiveInt64ComplementCodec;
        for v in [0i64, 1, 5000, i64::MAX] {
            assert_roundtrip(&c, &v);
        }
        // 5 > 6 logically reversed: encode(6) < encode(5).
        let enc5 = c.encode_to_vec(&5).unwrap();
        let enc6 = c.encode_to_vec(&6).unwrap();
        assert!(enc6 < enc5, "complement codec must reverse byte order");
        assert_saturation(&c);
    }

    #[test]
    fn tuple3_complement_scenario_from_spec() {
        // encode(tuple3(stringz, positive_int64_complement, byte), ("x", 5, 7))
        // must be strictly greater than encode(("x", 6, 0)).
        use crate::{ByteCodec, StringzCodec, Tuple3Codec};
        let c = Tuple3Codec::new(StringzCodec, PositiveInt64ComplementCodec, ByteCodec);
        let a = c
            .encode_to_vec(&(b"x".to_vec(), 5, 7))
            .expect("encode a");
        let b = c
            .encode_to_vec(&(b"x".to_vec(), 6, 0))
            .expect("encode b");
        assert!(a > b, "complement component must dominate ordering");
        assert_eq!(c.decode(&a).unwrap().0, (b"x".to_vec(), 5, 7));
    }
}
