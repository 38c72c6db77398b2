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

//! Composite codecs formed by concatenating component encodings.
//!
//! Order preservation of a tuple follows from each component being
//! self-delimited: comparing the concatenation byte-by-byte is equivalent to
//! comparing component-by-component, because no component's encoding is a
//! proper prefix of another's (see SPEC_FULL.md §4.1).
//!
//! The source's GADT-based arity tracking (SPEC_FULL.md §9) becomes plain
//! hand-written structs here: each `TupleNCodec` fixes its arity `N` in the
//! type system, and the `min_k`/`max_k`/`lower_k`/`upper_k` operations reject
//! `k >= N` with `EncodingError::UnsatisfiedConstraint` at runtime.

use keydb_error::EncodingError;

use crate::{Codec, Result};

macro_rules! decode_component {
    ($codec:expr, $bytes:expr, $offset:expr) => {{
        let (value, len) = $codec.decode(&$bytes[$offset..])?;
        $offset += len;
        value
    }};
}

/// Concatenation of two component codecs.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tuple2Codec<C0, C1>(pub C0, pub C1);

impl<C0: Codec, C1: Codec> Tuple2Codec<C0, C1> {
    pub fn new(c0: C0, c1: C1) -> Self {
        Self(c0, c1)
    }

    /// Keeps the first `k` components of `x`, replaces the rest with
    /// `min()` of their codecs.
    pub fn min_k(&self, k: usize, x: &(C0::Value, C1::Value)) -> Result<(C0::Value, C1::Value)> {
        match k {
            0 => Ok((self.0.min(), self.1.min())),
            1 => Ok((x.0.clone(), self.1.min())),
            2 => Ok(x.clone()),
            _ => Err(EncodingError::UnsatisfiedConstraint(format!(
                "min_k: k={} exceeds tuple arity 2",
                k
            ))),
        }
    }

    /// Keeps the first `k` components of `x`, replaces the rest with
    /// `max()` of their codecs.
    pub fn max_k(&self, k: usize, x: &(C0::Value, C1::Value)) -> Result<(C0::Value, C1::Value)> {
        match k {
            0 => Ok((self.0.max(), self.1.max())),
            1 => Ok((x.0.clone(), self.1.max())),
            2 => Ok(x.clone()),
            _ => Err(EncodingError::UnsatisfiedConstraint(format!(
                "max_k: k={} exceeds tuple arity 2",
                k
            ))),
        }
    }

    /// `x` with the component at position `k` replaced by its predecessor,
    /// and every later component reset to `max()` — the exclusive lower
    /// bound of "everything at or above `x` with the `k`-prefix held fixed".
    pub fn lower_k(&self, k: usize, x: &(C0::Value, C1::Value)) -> Result<(C0::Value, C1::Value)> {
        match k {
            0 => Ok((self.0.pred(&x.0), self.1.max())),
            1 => Ok((x.0.clone(), self.1.pred(&x.1))),
            _ => Err(EncodingError::UnsatisfiedConstraint(format!(
                "lower_k: k={} out of range for tuple arity 2",
                k
            ))),
        }
    }

    /// `x` with the component at position `k` replaced by its successor,
    /// and every later component reset to `min()`.
    pub fn upper_k(&self, k: usize, x: &(C0::Value, C1::Value)) -> Result<(C0::Value, C1::Value)> {
        match k {
            0 => Ok((self.0.succ(&x.0), self.1.min())),
            1 => Ok((x.0.clone(), self.1.succ(&x.1))),
            _ => Err(EncodingError::UnsatisfiedConstraint(format!(
                "upper_k: k={} out of range for tuple arity 2",
                k
            ))),
        }
    }
}

impl<C0: Codec, C1: Codec> Codec for Tuple2Codec<C0, C1> {
    type Value = (C0::Value, C1::Value);

    fn encode(&self, out: &mut Vec<u8>, value: &Self::Value) -> Result<()> {
        self.0.encode(out, &value.0)?;
        self.1.encode(out, &value.1)?;
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> Result<(Self::Value, usize)> {
        let mut offset = 0;
        let v0 = decode_component!(self.0, bytes, offset);
        let v1 = decode_component!(self.1, bytes, offset);
        Ok(((v0, v1), offset))
    }

    fn min(&self) -> Self::Value {
        (self.0.min(), self.1.min())
    }

    fn max(&self) -> Self::Value {
        (self.0.max(), self.1.max())
    }

    fn succ(&self, value: &Self::Value) -> Self::Value {
        // Right-to-left carry: bump the last component; if it didn't move
        // (already saturated at max), carry into the previous one.
        let bumped1 = self.1.succ(&value.1);
        if bumped1 != value.1 {
            (value.0.clone(), bumped1)
        } else {
            (self.0.succ(&value.0), self.1.min())
        }
    }

    fn pred(&self, value: &Self::Value) -> Self::Value {
        let dropped1 = self.1.pred(&value.1);
        if dropped1 != value.1 {
            (value.0.clone(), dropped1)
        } else {
            (self.0.pred(&value.0), self.1.max())
        }
    }

    fn pp(&self, value: &Self::Value) -> String {
        format!("({}, {})", self.0.pp(&value.0), self.1.pp(&value.1))
    }
}

/// Concatenation of three component codecs.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tuple3Codec<C0, C1, C2>(pub C0, pub C1, pub C2);

impl<C0: Codec, C1: Codec, C2: Codec> Tuple3Codec<C0, C1, C2> {
    pub fn new(c0: C0, c1: C1, c2: C2) -> Self {
        Self(c0, c1, c2)
    }

    pub fn min_k(
        &self,
        k: usize,
        x: &(C0::Value, C1::Value, C2::Value),
    ) -> Result<(C0::Value, C1::Value, C2::Value)> {
        match k {
            0 => Ok((self.0.min(), self.1.min(), self.2.min())),
            1 => Ok((x.0.clone(), self.1.min(), self.2.min())),
            2 => Ok((x.0.clone(), x.1.clone(), self.2.min())),
            3 => Ok(x.clone()),
            _ => Err(EncodingError::UnsatisfiedConstraint(format!(
                "min_k: k={} exceeds tuple arity 3",
                k
            ))),
        }
    }

    pub fn max_k(
        &self,
        k: usize,
        x: &(C0::Value, C1::Value, C2::Value),
    ) -> Result<(C0::Value, C1::Value, C2::Value)> {
        match k {
            0 => Ok((self.0.max(), self.1.max(), self.2.max())),
            1 => Ok((x.0.clone(), self.1.max(), self.2.max())),
            2 => Ok((x.0.clone(), x.1.clone(), self.2.max())),
            3 => Ok(x.clone()),
            _ => Err(EncodingError::UnsatisfiedConstraint(format!(
                "max_k: k={} exceeds tuple arity 3",
                k
            ))),
        }
    }

    pub fn lower_k(
        &self,
        k: usize,
        x: &(C0::Value, C1::Value, C2::Value),
    ) -> Result<(C0::Value, C1::Value, C2::Value)> {
        match k {
            0 => Ok((self.0.pred(&x.0), self.1.max(), self.2.max())),
            1 => Ok((x.0.clone(), self.1.pred(&x.1), self.2.max())),
            2 => Ok((x.0.clone(), x.1.clone(), self.2.pred(&x.2))),
            _ => Err(EncodingError::UnsatisfiedConstraint(format!(
                "lower_k: k={} out of range for tuple arity 3",
                k
            ))),
        }
    }

    pub fn upper_k(
        &self,
        k: usize,
        x: &(C0::Value, C1::Value, C2::Value),
    ) -> Result<(C0::Value, C1::Value, C2::Value)> {
        match k {
            0 => Ok((self.0.succ(&x.0), self.1.min(), self.2.min())),
            1 => Ok((x.0.clone(), self.1.succ(&x.1), self.2.min())),
            2 => Ok((x.0.clone(), x.1.clone(), self.2.succ(&x.2))),
            _ => Err(EncodingError::UnsatisfiedConstraint(format!(
                "upper_k: k={} out of range for tuple arity 3",
                k
            ))),
        }
    }
}

impl<C0: Codec, C1: Codec, C2: Codec> Codec for Tuple3Codec<C0, C1, C2> {
    type Value = (C0::Value, C1::Value, C2::Value);

    fn encode(&self, out: &mut Vec<u8>, value: &Self::Value) -> Result<()> {
        self.0.encode(out, &value.0)?;
        self.1.encode(out, &value.1)?;
        self.2.encode(out, &value.2)?;
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> Result<(Self::Value, usize)> {
        let mut offset = 0;
        let v0 = decode_component!(self.0, bytes, offset);
        let v1 = decode_component!(self.1, bytes, offset);
        let v2 = decode_component!(self.2, bytes, offset);
        Ok(((v0, v1, v2), offset))
    }

    fn min(&self) -> Self::Value {
        (self.0.min(), self.1.min(), self.2.min())
    }

    fn max(&self) -> Self::Value {
        (self.0.max(), self.1.max(), self.2.max())
    }

    fn succ(&self, value: &Self::Value) -> Self::Value {
        let bumped2 = self.2.succ(&value.2);
        if bumped2 != value.2 {
            return (value.0.clone(), value.1.clone(), bumped2);
        }
        let bumped1 = self.1.succ(&value.1);
        if bumped1 != value.1 {
            return (value.0.clone(), bumped1, self.2.min());
        }
        (self.0.succ(&value.0), self.1.min(), self.2.min())
    }

    fn pred(&self, value: &Self::Value) -> Self::Value {
        let dropped2 = self.2.pred(&value.2);
        if dropped2 != value.2 {
            return (value.0.clone(), value.1.clone(), dropped2);
        }
        let dropped1 = self.1.pred(&value.1);
        if dropped1 != value.1 {
            return (value.0.clone(), dropped1, self.2.max());
        }
        (self.0.pred(&value.0), self.1.max(), self.2.max())
    }

    fn pp(&self, value: &Self::Value) -> String {
        format!(
            "({}, {}, {})",
            self.0.pp(&value.0),
            self.1.pp(&value.1),
            self.2.pp(&value.2)
        )
    }
}

/// Concatenation of four component codecs.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tuple4Codec<C0, C1, C2, C3>(pub C0, pub C1, pub C2, pub C3);

impl<C0: Codec, C1: Codec, C2: Codec, C3: Codec> Tuple4Codec<C0, C1, C2, C3> {
    pub fn new(c0: C0, c1: C1, c2: C2, c3: C3) -> Self {
        Self(c0, c1, c2, c3)
    }

    pub fn min_k(
        &self,
        k: usize,
        x: &(C0::Value, C1::Value, C2::Value, C3::Value),
    ) -> Result<(C0::Value, C1::Value, C2::Value, C3::Value)> {
        match k {
            0 => Ok((self.0.min(), self.1.min(), self.2.min(), self.3.min())),
            1 => Ok((x.0.clone(), self.1.min(), self.2.min(), self.3.min())),
            2 => Ok((x.0.clone(), x.1.clone(), self.2.min(), self.3.min())),
            3 => Ok((x.0.clone(), x.1.clone(), x.2.clone(), self.3.min())),
            4 => Ok(x.clone()),
            _ => Err(EncodingError::UnsatisfiedConstraint(format!(
                "min_k: k={} exceeds tuple arity 4",
                k
            ))),
        }
    }

    pub fn max_k(
        &self,
        k: usize,
        x: &(C0::Value, C1::Value, C2::Value, C3::Value),
    ) -> Result<(C0::Value, C1::Value, C2::Value, C3::Value)> {
        match k {
            0 => Ok((self.0.max(), self.1.max(), self.2.max(), self.3.max())),
            1 => Ok((x.0.clone(), self.1.max(), self.2.max(), self.3.max())),
            2 => Ok((x.0.clone(), x.1.clone(), self.2.max(), self.3.max())),
            3 => Ok((x.0.clone(), x.1.clone(), x.2.clone(), self.3.max())),
            4 => Ok(x.clone()),
            _ => Err(EncodingError::UnsatisfiedConstraint(format!(
                "max_k: k={} exceeds tuple arity 4",
                k
            ))),
        }
    }

    pub fn lower_k(
        &self,
        k: usize,
        x: &(C0::Value, C1::Value, C2::Value, C3::Value),
    ) -> Result<(C0::Value, C1::Value, C2::Value, C3::Value)> {
        match k {
            0 => Ok((self.0.pred(&x.0), self.1.max(), self.2.max(), self.3.max())),
            1 => Ok((x.0.clone(), self.1.pred(&x.1), self.2.max(), self.3.max())),
            2 => Ok((x.0.clone(), x.1.clone(), self.2.pred(&x.2), self.3.max())),
            3 => Ok((x.0.clone(), x.1.clone(), x.2.clone(), self.3.pred(&x.3))),
            _ => Err(EncodingError::UnsatisfiedConstraint(format!(
                "lower_k: k={} out of range for tuple arity 4",
                k
            ))),
        }
    }

    pub fn upper_k(
        &self,
        k: usize,
        x: &(C0::Value, C1::Value, C2::Value, C3::Value),
    ) -> Result<(C0::Value, C1::Value, C2::Value, C3::Value)> {
        match k {
            0 => Ok((self.0.succ(&x.0), self.1.min(), self.2.min(), self.3.min())),
            1 => Ok((x.0.clone(), self.1.succ(&x.1), self.2.min(), self.3.min())),
            2 => Ok((x.0.clone(), x.1.clone(), self.2.succ(&x.2), self.3.min())),
            3 => Ok((x.0.clone(), x.1.clone(), x.2.clone(), self.3.succ(&x.3))),
            _ => Err(EncodingError::UnsatisfiedConstraint(format!(
                "upper_k: k={} out of range for tuple arity 4",
                k
            ))),
        }
    }
}

impl<C0: Codec, C1: Codec, C2: Codec, C3: Codec> Codec for Tuple4Codec<C0, C1, C2, C3> {
    type Value = (C0::Value, C1::Value, C2::Value, C3::Value);

    fn encode(&self, out: &mut Vec<u8>, value: &Self::Value) -> Result<()> {
        self.0.encode(out, &value.0)?;
        self.1.encode(out, &value.1)?;
        self.2.encode(out, &value.2)?;
        self.3.encode(out, &value.3)?;
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> Result<(Self::Value, usize)> {
        let mut offset = 0;
        let v0 = decode_component!(self.0, bytes, offset);
        let v1 = decode_component!(self.1, bytes, offset);
        let v2 = decode_component!(self.2, bytes, offset);
        let v3 = decode_component!(self.3, bytes, offset);
        Ok(((v0, v1, v2, v3), offset))
    }

    fn min(&self) -> Self::Value {
        (self.0.min(), self.1.min(), self.2.min(), self.3.min())
    }

    fn max(&self) -> Self::Value {
        (self.0.max(), self.1.max(), self.2.max(), self.3.max())
    }

    fn succ(&self, value: &Self::Value) -> Self::Value {
        let bumped3 = self.3.succ(&value.3);
        if bumped3 != value.3 {
            return (value.0.clone(), value.1.clone(), value.2.clone(), bumped3);
        }
        let bumped2 = self.2.succ(&value.2);
        if bumped2 != value.2 {
            return (value.0.clone(), value.1.clone(), bumped2, self.3.min());
        }
        let bumped1 = self.1.succ(&value.1);
        if bumped1 != value.1 {
            return (value.0.clone(), bumped1, self.2.min(), self.3.min());
        }
        (self.0.succ(&value.0), self.1.min(), self.2.min(), self.3.min())
    }

    fn pred(&self, value: &Self::Value) -> Self::Value {
        let dropped3 = self.3.pred(&value.3);
        if dropped3 != value.3 {
            return (value.0.clone(), value.1.clone(), value.2.clone(), dropped3);
        }
        let dropped2 = self.2.pred(&value.2);
        if dropped2 != value.2 {
            return (value.0.clone(), value.1.clone(), dropped2, self.3.max());
        }
        let dropped1 = self.1.pred(&value.1);
        if dropped1 != value.1 {
            return (value.0.clone(), dropped1, self.2.max(), self.3.max());
        }
        (self.0.pred(&value.0), self.1.max(), self.2.max(), self.3.max())
    }

    fn pp(&self, value: &Self::Value) -> String {
        format!(
            "({}, {}, {}, {})",
            self.0.pp(&value.0),
            self.1.pp(&value.1),
            self.2.pp(&value.2),
            self.3.pp(&value.3)
        )
    }
}

/// Concatenation of five component codecs.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tuple5Codec<C0, C1, C2, C3, C4>(pub C0, pub C1, pub C2, pub C3, pub C4);

impl<C0: Codec, C1: Codec, C2: Codec, C3: Codec, C4: Codec> Tuple5Codec<C0, C1, C2, C3, C4> {
    pub fn new(c0: C0, c1: C1, c2: C2, c3: C3, c4: C4) -> Self {
        Self(c0, c1, c2, c3, c4)
    }

    #[allow(clippy::type_complexity)]
    pub fn min_k(
        &self,
        k: usize,
        x: &(C0::Value, C1::Value, C2::Value, C3::Value, C4::Value),
    ) -> Result<(C0::Value, C1::Value, C2::Value, C3::Value, C4::Value)> {
        match k {
            0 => Ok((self.0.min(), self.1.min(), self.2.min(), self.3.min(), self.4.min())),
            1 => Ok((x.0.clone(), self.1.min(), self.2.min(), self.3.min(), self.4.min())),
            2 => Ok((x.0.clone(), x.1.clone(), self.2.min(), self.3.min(), self.4.min())),
            3 => Ok((x.0.clone(), x.1.clone(), x.2.clone(), self.3.min(), self.4.min())),
            4 => Ok((x.0.clone(), x.1.clone(), x.2.clone(), x.3.clone(), self.4.min())),
            5 => Ok(x.clone()),
            _ => Err(EncodingError::UnsatisfiedConstraint(format!(
                "min_k: k={} exceeds tuple arity 5",
                k
            ))),
        }
    }

    #[allow(clippy::type_complexity)]
    pub fn max_k(
        &self,
        k: usize,
        x: &(C0::Value, C1::Value, C2::Value, C3::Value, C4::Value),
    ) -> Result<(C0::Value, C1::Value, C2::Value, C3::Value, C4::Value)> {
        match k {
            0 => Ok((self.0.max(), self.1.max(), self.2.max(), self.3.max(), self.4.max())),
            1 => Ok((x.0.clone(), self.1.max(), self.2.max(), self.3.max(), self.4.max())),
            2 => Ok((x.0.clone(), x.1.clone(), self.2.max(), self.3.max(), self.4.max())),
            3 => Ok((x.0.clone(), x.1.clone(), x.2.clone(), self.3.max(), self.4.max())),
            4 => Ok((x.0.clone(), x.1.clone(), x.2.clone(), x.3.clone(), self.4.max())),
            5 => Ok(x.clone()),
            _ => Err(EncodingError::UnsatisfiedConstraint(format!(
                "max_k: k={} exceeds tuple arity 5",
                k
            ))),
        }
    }

    #[allow(clippy::type_complexity)]
    pub fn lower_k(
        &self,
        k: usize,
        x: &(C0::Value, C1::Value, C2::Value, C3::Value, C4::Value),
    ) -> Result<(C0::Value, C1::Value, C2::Value, C3::Value, C4::Value)> {
        match k {
            0 => Ok((self.0.pred(&x.0), self.1.max(), self.2.max(), self.3.max(), self.4.max())),
            1 => Ok((x.0.clone(), self.1.pred(&x.1), self.2.max(), self.3.max(), self.4.max())),
            2 => Ok((x.0.clone(), x.1.clone(), self.2.pred(&x.2), self.3.max(), self.4.max())),
            3 => Ok((x.0.clone(), x.1.clone(), x.2.clone(), self.3.pred(&x.3), self.4.max())),
            4 => Ok((x.0.clone(), x.1.clone(), x.2.clone(), x.3.clone(), self.4.pred(&x.4))),
            _ => Err(EncodingError::UnsatisfiedConstraint(format!(
                "lower_k: k={} out of range for tuple arity 5",
                k
            ))),
        }
    }

    #[allow(clippy::type_complexity)]
    pub fn upper_k(
        &self,
        k: usize,
        x: &(C0::Value, C1::Value, C2::Value, C3::Value, C4::Value),
    ) -> Result<(C0::Value, C1::Value, C2::Value, C3::Value, C4::Value)> {
        match k {
            0 => Ok((self.0.succ(&x.0), self.1.min(), self.2.min(), self.3.min(), self.4.min())),
            1 => Ok((x.0.clone(), self.1.succ(&x.1), self.2.min(), self.3.min(), self.4.min())),
            2 => Ok((x.0.clone(), x.1.clone(), self.2.succ(&x.2), self.3.min(), self.4.min())),
            3 => Ok((x.0.clone(), x.1.clone(), x.2.clone(), self.3.succ(&x.3), self.4.min())),
            4 => Ok((x.0.clone(), x.1.clone(), x.2.clone(), x.3.clone(), self.4.succ(&x.4))),
            _ => Err(EncodingError::UnsatisfiedConstraint(format!(
                "upper_k: k={} out of range for tuple arity 5",
                k
            ))),
        }
    }
}

impl<C0: Codec, C1: Codec, C2: Codec, C3: Codec, C4: Codec> Codec
    for Tuple5Codec<C0, C1, C2, C3, C4>
{
    type Value = (C0::Value, C1::Value, C2::Value, C3::Value, C4::Value);

    fn encode(&self, out: &mut Vec<u8>, value: &Self::Value) -> Result<()> {
        self.0.encode(out, &value.0)?;
        self.1.encode(out, &value.1)?;
        self.2.encode(out, &value.2)?;
        self.3.encode(out, &value.3)?;
        self.4.encode(out, &value.4)?;
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> Result<(Self::Value, usize)> {
        let mut offset = 0;
        let v0 = decode_component!(self.0, bytes, offset);
        let v1 = decode_component!(self.1, bytes, offset);
        let v2 = decode_component!(self.2, bytes, offset);
        let v3 = decode_component!(self.3, bytes, offset);
        let v4 = decode_component!(self.4, bytes, offset);
        Ok(((v0, v1, v2, v3, v4), offset))
    }

    fn min(&self) -> Self::Value {
        (self.0.min(), self.1.min(), self.2.min(), self.3.min(), self.4.min())
    }

    fn max(&self) -> Self::Value {
        (self.0.max(), self.1.max(), self.2.max(), self.3.max(), self.4.max())
    }

    fn succ(&self, value: &Self::Value) -> Self::Value {
        let bumped4 = self.4.succ(&value.4);
        if bumped4 != value.4 {
            return (value.0.clone(), value.1.clone(), value.2.clone(), value.3.clone(), bumped4);
        }
        let bumped3 = self.3.succ(&value.3);
        if bumped3 != value.3 {
            return (value.0.clone(), value.1.clone(), value.2.clone(), bumped3, self.4.min());
        }
        let bumped2 = self.2.succ(&value.2);
        if bumped2 != value.2 {
            return (value.0.clone(), value.1.clone(), bumped2, self.3.min(), self.4.min());
        }
        let bumped1 = self.1.succ(&value.1);
        if bumped1 != value.1 {
            return (value.0.clone(), bumped1, self.2.min(), self.3.min(), self.4.min());
        }
        (self.0.succ(&value.0), self.1.min(), self.2.min(), self.3.min(), self.4.min())
    }

    fn pred(&self, value: &Self::Value) -> Self::Value {
        let dropped4 = self.4.pred(&value.4);
        if dropped4 != value.4 {
            return (value.0.clone(), value.1.clone(), value.2.clone(), value.3.clone(), dropped4);
        }
        let dropped3 = self.3.pred(&value.3);
        if dropped3 != value.3 {
            return (value.0.clone(), value.1.clone(), value.2.clone(), dropped3, self.4.max());
        }
        let dropped2 = self.2.pred(&value.2);
        if dropped2 != value.2 {
            return (value.0.clone(), value.1.clone(), dropped2, self.3.max(), self.4.max());
        }
        let dropped1 = self.1.pred(&value.1);
        if dropped1 != value.1 {
            return (value.0.clone(), dropped1, self.2.max(), self.3.max(), self.4.max());
        }
        (self.0.pred(&value.0), self.1.max(), self.2.max(), self.3.max(), self.4.max())
    }

    fn pp(&self, value: &Self::Value) -> String {
        format!(
            "({}, {}, {}, {}, {})",
            self.0.pp(&value.0),
            self.1.pp(&value.1),
            self.2.pp(&value.2),
            self.3.pp(&value.3),
            self.4.pp(&value.4)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_order, assert_roundtrip, ByteCodec, PositiveInt64Codec};

    #[test]
    fn tuple2_concatenation_preserves_order() {
        let c = Tuple2Codec::new(PositiveInt64Codec, ByteCodec);
        assert_roundtrip(&c, &(1, 2));
        assert_order(&c, &(1, 2), &(1, 3));
        assert_order(&c, &(1, 255), &(2, 0));
    }

    #[test]
    fn tuple2_min_k_max_k() {
        let c = Tuple2Codec::new(PositiveInt64Codec, ByteCodec);
        let x = (5i64, 10u8);
        assert_eq!(c.min_k(1, &x).unwrap(), (5, 0));
        assert_eq!(c.max_k(1, &x).unwrap(), (5, 255));
        assert_eq!(c.min_k(0, &x).unwrap(), (0, 0));
        assert!(c.min_k(3, &x).is_err());
    }

    #[test]
    fn tuple2_lower_k_upper_k() {
        let c = Tuple2Codec::new(PositiveInt64Codec, ByteCodec);
        let x = (5i64, 10u8);
        assert_eq!(c.upper_k(1, &x).unwrap(), (5, 11));
        assert_eq!(c.lower_k(1, &x).unwrap(), (5, 9));
    }

    #[test]
    fn tuple2_succ_carries_right_to_left() {
        let c = Tuple2Codec::new(PositiveInt64Codec, ByteCodec);
        // Last component at max: bump must carry into the first component.
        assert_eq!(c.succ(&(5, 255)), (6, 0));
        assert_eq!(c.pred(&(5, 0)), (4, 255));
    }

    #[test]
    fn tuple3_succ_carries_through_two_levels() {
        let c = Tuple3Codec::new(ByteCodec, ByteCodec, ByteCodec);
        assert_eq!(c.succ(&(1, 255, 255)), (2, 0, 0));
        assert_eq!(c.pred(&(1, 0, 0)), (0, 255, 255));
    }

    #[test]
    fn tuple5_bounds_and_roundtrip() {
        let c = Tuple5Codec::new(
            PositiveInt64Codec,
            ByteCodec,
            ByteCodec,
            ByteCodec,
            ByteCodec,
        );
        let v = (1i64, 2u8, 3u8, 4u8, 5u8);
        assert_roundtrip(&c, &v);
        assert_eq!(c.min_k(2, &v).unwrap(), (1, 2, 0, 0, 0));
        assert!(c.min_k(6, &v).is_err());
    }
}
