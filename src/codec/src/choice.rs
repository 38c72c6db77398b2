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

//! Tagged-union codecs: a one-byte tag `0..n-1` followed by the chosen
//! component's encoding. The tag ordering *is* the variant ordering, so
//! `Choice2(A::min())` sorts before `Choice2(B::min())` regardless of how
//! `A` and `B` compare to each other. Each arity is hand-written rather than
//! generated: the shapes are identical but `min`/`max` need to name the
//! first/last variant specifically, which isn't worth a macro for four
//! cases.

use keydb_error::EncodingError;

use crate::{Codec, Result};

/// Tagged union of two alternatives.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Choice2Value<A, B> {
    First(A),
    Second(B),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Choice2Codec<A, B>(pub A, pub B);

impl<A: Codec, B: Codec> Choice2Codec<A, B> {
    pub fn new(a: A, b: B) -> Self {
        Self(a, b)
    }
}

impl<A: Codec, B: Codec> Codec for Choice2Codec<A, B> {
    type Value = Choice2Value<A::Value, B::Value>;

    fn encode(&self, out: &mut Vec<u8>, value: &Self::Value) -> Result<()> {
        match value {
            Choice2Value::First(v) => {
                out.push(0);
                self.0.encode(out, v)
            }
            Choice2Value::Second(v) => {
                out.push(1);
                self.1.encode(out, v)
            }
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<(Self::Value, usize)> {
        let tag = *bytes
            .first()
            .ok_or_else(|| EncodingError::IncompleteFragment("choice2".into()))?;
        match tag {
            0 => {
                let (v, len) = self.0.decode(&bytes[1..])?;
                Ok((Choice2Value::First(v), len + 1))
            }
            1 => {
                let (v, len) = self.1.decode(&bytes[1..])?;
                Ok((Choice2Value::Second(v), len + 1))
            }
            other => Err(EncodingError::UnknownTag(other)),
        }
    }

    fn min(&self) -> Self::Value {
        Choice2Value::First(self.0.min())
    }

    fn max(&self) -> Self::Value {
        Choice2Value::Second(self.1.max())
    }

    fn succ(&self, value: &Self::Value) -> Self::Value {
        match value {
            Choice2Value::First(v) => Choice2Value::First(self.0.succ(v)),
            Choice2Value::Second(v) => Choice2Value::Second(self.1.succ(v)),
        }
    }

    fn pred(&self, value: &Self::Value) -> Self::Value {
        match value {
            Choice2Value::First(v) => Choice2Value::First(self.0.pred(v)),
            Choice2Value::Second(v) => Choice2Value::Second(self.1.pred(v)),
        }
    }

    fn pp(&self, value: &Self::Value) -> String {
        match value {
            Choice2Value::First(v) => format!("First({})", self.0.pp(v)),
            Choice2Value::Second(v) => format!("Second({})", self.1.pp(v)),
        }
    }
}

/// Tagged union of three alternatives.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Choice3Value<A, B, C> {
    First(A),
    Second(B),
    Third(C),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Choice3Codec<A, B, C>(pub A, pub B, pub C);

impl<A: Codec, B: Codec, C: Codec> Choice3Codec<A, B, C> {
    pub fn new(a: A, b: B, c: C) -> Self {
        Self(a, b, c)
    }
}

impl<A: Codec, B: Codec, C: Codec> Codec for Choice3Codec<A, B, C> {
    type Value = Choice3Value<A::Value, B::Value, C::Value>;

    fn encode(&self, out: &mut Vec<u8>, value: &Self::Value) -> Result<()> {
        match value {
            Choice3Value::First(v) => {
                out.push(0);
                self.0.encode(out, v)
            }
            Choice3Value::Second(v) => {
                out.push(1);
                self.1.encode(out, v)
            }
            Choice3Value::Third(v) => {
                out.push(2);
                self.2.encode(out, v)
            }
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<(Self::Value, usize)> {
        let tag = *bytes
            .first()
            .ok_or_else(|| EncodingError::IncompleteFragment("choice3".into()))?;
        match tag {
            0 => {
                let (v, len) = self.0.decode(&bytes[1..])?;
                Ok((Choice3Value::First(v), len + 1))
            }
            1 => {
                let (v, len) = self.1.decode(&bytes[1..])?;
                Ok((Choice3Value::Second(v), len + 1))
            }
            2 => {
                let (v, len) = self.2.decode(&bytes[1..])?;
                Ok((Choice3Value::Third(v), len + 1))
            }
            other => Err(EncodingError::UnknownTag(other)),
        }
    }

    fn min(&self) -> Self::Value {
        Choice3Value::First(self.0.min())
    }

    fn max(&self) -> Self::Value {
        Choice3Value::Third(self.2.max())
    }

    fn succ(&self, value: &Self::Value) -> Self::Value {
        match value {
            Choice3Value::First(v) => Choice3Value::First(self.0.succ(v)),
            Choice3Value::Second(v) => Choice3Value::Second(self.1.succ(v)),
            Choice3Value::Third(v) => Choice3Value::Third(self.2.succ(v)),
        }
    }

    fn pred(&self, value: &Self::Value) -> Self::Value {
        match value {
            Choice3Value::First(v) => Choice3Value::First(self.0.pred(v)),
            Choice3Value::Second(v) => Choice3Value::Second(self.1.pred(v)),
            Choice3Value::Third(v) => Choice3Value::Third(self.2.pred(v)),
        }
    }

    fn pp(&self, value: &Self::Value) -> String {
        match value {
            Choice3Value::First(v) => format!("First({})", self.0.pp(v)),
            Choice3Value::Second(v) => format!("Second({})", self.1.pp(v)),
            Choice3Value::Third(v) => format!("Third({})", self.2.pp(v)),
        }
    }
}

/// Tagged union of four alternatives.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Choice4Value<A, B, C, D> {
    First(A),
    Second(B),
    Third(C),
    Fourth(D),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Choice4Codec<A, B, C, D>(pub A, pub B, pub C, pub D);

impl<A: Codec, B: Codec, C: Codec, D: Codec> Choice4Codec<A, B, C, D> {
    pub fn new(a: A, b: B, c: C, d: D) -> Self {
        Self(a, b, c, d)
    }
}

impl<A: Codec, B: Codec, C: Codec, D: Codec> Codec for Choice4Codec<A, B, C, D> {
    type Value = Choice4Value<A::Value, B::Value, C::Value, D::Value>;

    fn encode(&self, out: &mut Vec<u8>, value: &Self::Value) -> Result<()> {
        match value {
            Choice4Value::First(v) => {
                out.push(0);
                self.0.encode(out, v)
            }
            Choice4Value::Second(v) => {
                out.push(1);
                self.1.encode(out, v)
            }
            Choice4Value::Third(v) => {
                out.push(2);
                self.2.encode(out, v)
            }
            Choice4Value::Fourth(v) => {
                out.push(3);
                self.3.encode(out, v)
            }
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<(Self::Value, usize)> {
        let tag = *bytes
            .first()
            .ok_or_else(|| EncodingError::IncompleteFragment("choice4".into()))?;
        match tag {
            0 => {
                let (v, len) = self.0.decode(&bytes[1..])?;
                Ok((Choice4Value::First(v), len + 1))
            }
            1 => {
                let (v, len) = self.1.decode(&bytes[1..])?;
                Ok((Choice4Value::Second(v), len + 1))
            }
            2 => {
                let (v, len) = self.2.decode(&bytes[1..])?;
                Ok((Choice4Value::Third(v), len + 1))
            }
            3 => {
                let (v, len) = self.3.decode(&bytes[1..])?;
                Ok((Choice4Value::Fourth(v), len + 1))
            }
            other => Err(EncodingError::UnknownTag(other)),
        }
    }

    fn min(&self) -> Self::Value {
        Choice4Value::First(self.0.min())
    }

    fn max(&self) -> Self::Value {
        Choice4Value::Fourth(self.3.max())
    }

    fn succ(&self, value: &Self::Value) -> Self::Value {
        match value {
            Choice4Value::First(v) => Choice4Value::First(self.0.succ(v)),
            Choice4Value::Second(v) => Choice4Value::Second(self.1.succ(v)),
            Choice4Value::Third(v) => Choice4Value::Third(self.2.succ(v)),
            Choice4Value::Fourth(v) => Choice4Value::Fourth(self.3.succ(v)),
        }
    }

    fn pred(&self, value: &Self::Value) -> Self::Value {
        match value {
            Choice4Value::First(v) => Choice4Value::First(self.0.pred(v)),
            Choice4Value::Second(v) => Choice4Value::Second(self.1.pred(v)),
            Choice4Value::Third(v) => Choice4Value::Third(self.2.pred(v)),
            Choice4Value::Fourth(v) => Choice4Value::Fourth(self.3.pred(v)),
        }
    }

    fn pp(&self, value: &Self::Value) -> String {
        match value {
            Choice4Value::First(v) => format!("First({})", self.0.pp(v)),
            Choice4Value::Second(v) => format!("Second({})", self.1.pp(v)),
            Choice4Value::Third(v) => format!("Third({})", self.2.pp(v)),
            Choice4Value::Fourth(v) => format!("Fourth({})", self.3.pp(v)),
        }
    }
}

/// Tagged union of five alternatives.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Choice5Value<A, B, C, D, E> {
    First(A),
    Second(B),
    Third(C),
    Fourth(D),
    Fifth(E),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Choice5Codec<A, B, C, D, E>(pub A, pub B, pub C, pub D, pub E);

impl<A: Codec, B: Codec, C: Codec, D: Codec, E: Codec> Choice5Codec<A, B, C, D, E> {
    pub fn new(a: A, b: B, c: C, d: D, e: E) -> Self {
        Self(a, b, c, d, e)
    }
}

impl<A: Codec, B: Codec, C: Codec, D: Codec, E: Codec> Codec for Choice5Codec<A, B, C, D, E> {
    type Value = Choice5Value<A::Value, B::Value, C::Value, D::Value, E::Value>;

    fn encode(&self, out: &mut Vec<u8>, value: &Self::Value) -> Result<()> {
        match value {
            Choice5Value::First(v) => {
                out.push(0);
                self.0.encode(out, v)
            }
            Choice5Value::Second(v) => {
                out.push(1);
                self.1.encode(out, v)
            }
            Choice5Value::Third(v) => {
                out.push(2);
                self.2.encode(out, v)
            }
            Choice5Value::Fourth(v) => {
                out.push(3);
                self.3.encode(out, v)
            }
            Choice5Value::Fifth(v) => {
                out.push(4);
                self.4.encode(out, v)
            }
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<(Self::Value, usize)> {
        let tag = *bytes
            .first()
            .ok_or_else(|| EncodingError::IncompleteFragment("choice5".into()))?;
        match tag {
            0 => {
                let (v, len) = self.0.decode(&bytes[1..])?;
                Ok((Choice5Value::First(v), len + 1))
            }
            1 => {
                let (v, len) = self.1.decode(&bytes[1..])?;
                Ok((Choice5Value::Second(v), len + 1))
            }
            2 => {
                let (v, len) = self.2.decode(&bytes[1..])?;
                Ok((Choice5Value::Third(v), len + 1))
            }
            3 => {
                let (v, len) = self.3.decode(&bytes[1..])?;
                Ok((Choice5Value::Fourth(v), len + 1))
            }
            4 => {
                let (v, len) = self.4.decode(&bytes[1..])?;
                Ok((Choice5Value::Fifth(v), len + 1))
            }
            other => Err(EncodingError::UnknownTag(other)),
        }
    }

    fn min(&self) -> Self::Value {
        Choice5Value::First(self.0.min())
    }

    fn max(&self) -> Self::Value {
        Choice5Value::Fifth(self.4.max())
    }

    fn succ(&self, value: &Self::Value) -> Self::Value {
        match value {
            Choice5Value::First(v) => Choice5Value::First(self.0.succ(v)),
            Choice5Value::Second(v) => Choice5Value::Second(self.1.succ(v)),
            Choice5Value::Third(v) => Choice5Value::Third(self.2.succ(v)),
            Choice5Value::Fourth(v) => Choice5Value::Fourth(self.3.succ(v)),
            Choice5Value::Fifth(v) => Choice5Value::Fifth(self.4.succ(v)),
        }
    }

    fn pred(&self, value: &Self::Value) -> Self::Value {
        match value {
            Choice5Value::First(v) => Choice5Value::First(self.0.pred(v)),
            Choice5Value::Second(v) => Choice5Value::Second(self.1.pred(v)),
            Choice5Value::Third(v) => Choice5Value::Third(self.2.pred(v)),
            Choice5Value::Fourth(v) => Choice5Value::Fourth(self.3.pred(v)),
            Choice5Value::Fifth(v) => Choice5Value::Fifth(self.4.pred(v)),
        }
    }

    fn pp(&self, value: &Self::Value) -> String {
        match value {
            Choice5Value::First(v) => format!("First({})", self.0.pp(v)),
            Choice5Value::Second(v) => format!("Second({})", self.1.pp(v)),
            Choice5Value::Third(v) => format!("Third({})", self.2.pp(v)),
            Choice5Value::Fourth(v) => format!("Fourth({})", self.3.pp(v)),
            Choice5Value::Fifth(v) => format!("Fifth({})", self.4.pp(v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_order, assert_roundtrip, ByteCodec, StringzCodec};

    #[test]
    fn choice2_tag_dominates_component_order() {
        let c = Choice2Codec::new(ByteCodec, StringzCodec);
        assert_roundtrip(&c, &Choice2Value::First(255));
        assert_roundtrip(&c, &Choice2Value::Second(b"a".to_vec()));
        // Even though 255 is the largest byte, the tag must still dominate:
        // every First(_) sorts before every Second(_).
        let first_max = c.encode_to_vec(&Choice2Value::First(255)).unwrap();
        let second_min = c
            .encode_to_vec(&Choice2Value::Second(Vec::new()))
            .unwrap();
        assert!(first_max < second_min);
        assert_order(
            &c,
            &Choice2Value::First(0),
            &Choice2Value::Second(Vec::new()),
        );
    }

    #[test]
    fn choice2_unknown_tag_errors() {
        let c = Choice2Codec::new(ByteCodec, ByteCodec);
        assert!(matches!(
            c.decode(&[2, 0]),
            Err(EncodingError::UnknownTag(2))
        ));
    }

    #[test]
    fn choice3_roundtrip_each_variant() {
        let c = Choice3Codec::new(ByteCodec, ByteCodec, ByteCodec);
        assert_roundtrip(&c, &Choice3Value::First(1));
        assert_roundtrip(&c, &Choice3Value::Second(2));
        assert_roundtrip(&c, &Choice3Value::Third(3));
    }

    #[test]
    fn choice5_min_max_use_outermost_tags() {
        let c = Choice5Codec::new(ByteCodec, ByteCodec, ByteCodec, ByteCodec, ByteCodec);
        assert_eq!(c.min(), Choice5Value::First(0));
        assert_eq!(c.max(), Choice5Value::Fifth(255));
    }
}
