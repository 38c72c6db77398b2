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

//! Re-labels an existing codec with an external representation
//! (SPEC_FULL.md §4.1: `custom(underlying, to_internal, of_internal, pp)`).
//!
//! `CustomCodec` carries no bytes of its own: it converts `V` to and from the
//! underlying codec's value type `U` at the boundary and otherwise delegates
//! every operation, so order preservation is inherited for free as long as
//! `to_internal`/`of_internal` are inverses and monotonic.

use crate::{Codec, Result};

pub struct CustomCodec<U, V, I, O, P>
where
    U: Codec,
    I: Fn(&V) -> U::Value,
    O: Fn(&U::Value) -> V,
    P: Fn(&V) -> String,
{
    underlying: U,
    to_internal: I,
    of_internal: O,
    pp: P,
}

impl<U, V, I, O, P> CustomCodec<U, V, I, O, P>
where
    U: Codec,
    I: Fn(&V) -> U::Value,
    O: Fn(&U::Value) -> V,
    P: Fn(&V) -> String,
{
    pub fn new(underlying: U, to_internal: I, of_internal: O, pp: P) -> Self {
        Self {
            underlying,
            to_internal,
            of_internal,
            pp,
        }
    }
}

impl<U, V, I, O, P> Codec for CustomCodec<U, V, I, O, P>
where
    U: Codec,
    V: Clone + std::fmt::Debug + PartialEq + Eq + PartialOrd + Ord,
    I: Fn(&V) -> U::Value,
    O: Fn(&U::Value) -> V,
    P: Fn(&V) -> String,
{
    type Value = V;

    fn encode(&self, out: &mut Vec<u8>, value: &V) -> Result<()> {
        self.underlying.encode(out, &(self.to_internal)(value))
    }

    fn decode(&self, bytes: &[u8]) -> Result<(V, usize)> {
        let (internal, len) = self.underlying.decode(bytes)?;
        Ok(((self.of_internal)(&internal), len))
    }

    fn min(&self) -> V {
        (self.of_internal)(&self.underlying.min())
    }

    fn max(&self) -> V {
        (self.of_internal)(&self.underlying.max())
    }

    fn succ(&self, value: &V) -> V {
        let internal = (self.to_internal)(value);
        (self.of_internal)(&self.underlying.succ(&internal))
    }

    fn pred(&self, value: &V) -> V {
        let internal = (self.to_internal)(value);
        (self.of_internal)(&self.underlying.pred(&internal))
    }

    fn pp(&self, value: &V) -> String {
        (self.pp)(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_order, assert_roundtrip, PositiveInt64Codec};

    #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
    struct Seconds(i64);

    fn seconds_codec() -> CustomCodec<
        PositiveInt64Codec,
        Seconds,
        impl Fn(&Seconds) -> i64,
        impl Fn(&i64) -> Seconds,
        impl Fn(&Seconds) -> String,
    > {
        CustomCodec::new(
            PositiveInt64Codec,
            |s: &Seconds| s.0,
            |i: &i64| Seconds(*i),
            |s: &Seconds| format!("{}s", s.0),
        )
    }

    #[test]
    fn relabels_without_changing_order() {
        let c = seconds_codec();
        assert_roundtrip(&c, &Seconds(0));
        assert_roundtrip(&c, &Seconds(42));
        assert_order(&c, &Seconds(1), &Seconds(2));
    }

    #[test]
    fn pp_uses_the_supplied_formatter() {
        let c = seconds_codec();
        assert_eq!(c.pp(&Seconds(5)), "5s");
    }

    #[test]
    fn min_max_delegate_to_underlying() {
        let c = seconds_codec();
        assert_eq!(c.min(), Seconds(0));
        assert_eq!(c.max(), Seconds(i64::MAX));
    }
}
