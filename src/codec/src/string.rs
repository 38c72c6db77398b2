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

/// Self-terminating, order-preserving encoding of an arbitrary byte string.
///
/// Every `0x00` byte in the input is escaped to `0x00 0xFF`, and the whole
/// string is terminated by `0x00 0x00`. This keeps the encoding self-delimited
/// within a tuple (the decoder knows exactly where it ends without needing a
/// length prefix) while preserving lexicographic order: `""` sorts before
/// `"\0..."`, which sorts before any string whose first byte is non-zero,
/// because the terminator `0x00 0x00` is lexicographically smaller than the
/// escape sequence `0x00 0xFF` that continues a string containing an embedded
/// nul.
#[derive(Clone, Copy, Debug, Default)]
pub struct SelfDelimitedStringCodec;

impl Codec for SelfDelimitedStringCodec {
    type Value = Vec<u8>;

    fn encode(&self, out: &mut Vec<u8>, value: &Vec<u8>) -> Result<()> {
        for &b in value {
            if b == 0x00 {
                out.push(0x00);
                out.push(0xFF);
            } else {
                out.push(b);
            }
        }
        out.push(0x00);
        out.push(0x00);
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> Result<(Vec<u8>, usize)> {
        let mut out = Vec::new();
        let mut i = 0;
        loop {
            let b = *bytes
                .get(i)
                .ok_or_else(|| EncodingError::IncompleteFragment("self_delimited_string".into()))?;
            if b != 0x00 {
                out.push(b);
                i += 1;
                continue;
            }
            let next = *bytes.get(i + 1).ok_or_else(|| {
                EncodingError::IncompleteFragment("self_delimited_string".into())
            })?;
            match next {
                0x00 => return Ok((out, i + 2)),
                0xFF => {
                    out.push(0x00);
                    i += 2;
                }
                _ => return Err(EncodingError::BadEncoding("self_delimited_string".into())),
            }
        }
    }

    fn min(&self) -> Vec<u8> {
        Vec::new()
    }

    fn max(&self) -> Vec<u8> {
        // There is no finite largest byte string under this order; by
        // convention we treat an unbounded run of 0xFF as "as large as it
        // needs to be" for the purposes of forming open range bounds
        // (`maxK` in the tuple codec never actually encodes this value, it
        // only uses it as a sentinel before a range is materialised).
        vec![0xFF; 256]
    }

    fn succ(&self, value: &Vec<u8>) -> Vec<u8> {
        let mut v = value.clone();
        v.push(0x00);
        v
    }

    fn pred(&self, value: &Vec<u8>) -> Vec<u8> {
        let mut v = value.clone();
        if v.pop().is_none() {
            // already min()
        }
        v
    }

    fn pp(&self, value: &Vec<u8>) -> String {
        String::from_utf8_lossy(value).into_owned()
    }
}

/// Null-terminated encoding. Fails at encode time if the string contains an
/// embedded `\0`, since that would be indistinguishable from the terminator.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringzCodec;

impl Codec for StringzCodec {
    type Value = Vec<u8>;

    fn encode(&self, out: &mut Vec<u8>, value: &Vec<u8>) -> Result<()> {
        if value.contains(&0x00) {
            return Err(EncodingError::UnsatisfiedConstraint(
                "stringz: value contains an embedded nul byte".into(),
            ));
        }
        out.extend_from_slice(value);
        out.push(0x00);
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> Result<(Vec<u8>, usize)> {
        let end = bytes
            .iter()
            .position(|&b| b == 0x00)
            .ok_or_else(|| EncodingError::IncompleteFragment("stringz".into()))?;
        Ok((bytes[..end].to_vec(), end + 1))
    }

    fn min(&self) -> Vec<u8> {
        Vec::new()
    }

    fn max(&self) -> Vec<u8> {
        vec![0xFF; 256]
    }

    fn succ(&self, value: &Vec<u8>) -> Vec<u8> {
        let mut v = value.clone();
        v.push(0x01);
        v
    }

    fn pred(&self, value: &Vec<u8>) -> Vec<u8> {
        let mut v = value.clone();
        v.pop();
        v
    }

    fn pp(&self, value: &Vec<u8>) -> String {
        String::from_utf8_lossy(value).into_owned()
    }
}

/// Like [`StringzCodec`] but skips the embedded-nul check. Callers are
/// responsible for guaranteeing the invariant holds; used internally where a
/// value is known by construction not to contain `\0` (e.g. table names
/// derived from a validated catalog) and the check would be pure overhead.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringzUnsafeCodec;

impl Codec for StringzUnsafeCodec {
    type Value = Vec<u8>;

    fn encode(&self, out: &mut Vec<u8>, value: &Vec<u8>) -> Result<()> {
        out.extend_from_slice(value);
        out.push(0x00);
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> Result<(Vec<u8>, usize)> {
        StringzCodec.decode(bytes)
    }

    fn min(&self) -> Vec<u8> {
        Vec::new()
    }

    fn max(&self) -> Vec<u8> {
        vec![0xFF; 256]
    }

    fn succ(&self, value: &Vec<u8>) -> Vec<u8> {
        StringzCodec.succ(value)
    }

    fn pred(&self, value: &Vec<u8>) -> Vec<u8> {
        StringzCodec.pred(value)
    }

    fn pp(&self, value: &Vec<u8>) -> String {
        String::from_utf8_lossy(value).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_order, assert_roundtrip};

    #[test]
    fn self_delimited_roundtrip() {
        let c = SelfDelimitedStringCodec;
        for v in [
            b"".to_vec(),
            b"hello".to_vec(),
            b"with\0nul".to_vec(),
            vec![0x00, 0x00, 0x00],
        ] {
            assert_roundtrip(&c, &v);
        }
    }

    #[test]
    fn self_delimited_order_empty_lt_nul_lt_other() {
        let c = SelfDelimitedStringCodec;
        assert_order(&c, &b"".to_vec(), &b"\0".to_vec());
        assert_order(&c, &b"\0".to_vec(), &b"a".to_vec());
    }

    #[test]
    fn self_delimited_is_self_terminating_within_a_tuple() {
        // A second value concatenated right after must decode independently.
        let c = SelfDelimitedStringCodec;
        let mut buf = Vec::new();
        c.encode(&mut buf, &b"abc".to_vec()).unwrap();
        c.encode(&mut buf, &b"de".to_vec()).unwrap();
        let (first, len1) = c.decode(&buf).unwrap();
        assert_eq!(first, b"abc");
        let (second, _len2) = c.decode(&buf[len1..]).unwrap();
        assert_eq!(second, b"de");
    }

    #[test]
    fn stringz_roundtrip_and_rejects_nul() {
        let c = StringzCodec;
        assert_roundtrip(&c, &b"table_name".to_vec());
        assert!(matches!(
            c.encode_to_vec(&b"with\0nul".to_vec()),
            Err(EncodingError::UnsatisfiedConstraint(_))
        ));
    }

    #[test]
    fn stringz_unsafe_skips_the_check() {
        let c = StringzUnsafeCodec;
        // Would be rejected by StringzCodec; unsafe variant writes it anyway
        // (and would not round-trip faithfully, which is the caller's risk).
        assert!(c.encode_to_vec(&b"with\0nul".to_vec()).is_ok());
    }
}
