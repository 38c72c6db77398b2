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

//! Replication producer (SPEC_FULL.md §4.6, §9).
//!
//! The transport itself (the live socket, the consumer process) is out of
//! scope per §1; this module is the abstract producer side of the contract:
//! framing a committed batch as `(length_prefix, payload, CRC32C)` and
//! resending on `Nack`.
//!
//! §9's "weak-referenced streams" note: a production receiving loop must
//! keep its stream handle alive for as long as unacknowledged updates are
//! outstanding, even with no external consumer reference. `ReplicationProducer`
//! holds its `Arc<T>` sink handle for its own lifetime rather than a `Weak`
//! one, so nothing can drop the sink out from under an in-flight send; a
//! caller that wants cancellation drops the whole producer, not just its own
//! reference to the sink.

use std::sync::Arc;

use keydb_error::{EncodingError, ProtocolError, Result};

/// One committed batch, framed for the wire: `length_prefix(4 LE) ∥ payload
/// ∥ crc32c(payload)(4 LE)`.
pub fn encode_update_frame(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + payload.len() + 4);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&crc32c::crc32c(payload).to_le_bytes());
    out
}

/// Decodes one frame from the front of `bytes`, returning the payload slice
/// and the number of bytes consumed.
pub fn decode_update_frame(bytes: &[u8]) -> Result<(&[u8], usize)> {
    if bytes.len() < 4 {
        return Err(EncodingError::IncompleteFragment("update frame length".into()).into());
    }
    let len = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
    if bytes.len() < 4 + len + 4 {
        return Err(EncodingError::IncompleteFragment("update frame body".into()).into());
    }
    let payload = &bytes[4..4 + len];
    let crc = u32::from_le_bytes(bytes[4 + len..4 + len + 4].try_into().unwrap());
    if crc32c::crc32c(payload) != crc {
        return Err(ProtocolError::CorruptedFrame.into());
    }
    Ok((payload, 4 + len + 4))
}

/// One-byte acknowledgement from a replication consumer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ack {
    Ack,
    Nack,
}

/// The consumer side of one replication connection, as seen by the
/// producer: accepts a pre-framed update and returns whether the consumer
/// accepted it.
pub trait ReplicationSink: Send + Sync {
    fn send_frame(&self, frame: &[u8]) -> Result<Ack>;
}

const MAX_RESENDS: u32 = 3;

/// Streams committed batches to a [`ReplicationSink`], resending on `Nack`
/// up to [`MAX_RESENDS`] times before giving up.
pub struct ReplicationProducer<T: ReplicationSink> {
    sink: Arc<T>,
}

impl<T: ReplicationSink> ReplicationProducer<T> {
    pub fn new(sink: Arc<T>) -> Self {
        Self { sink }
    }

    /// Publishes one committed batch, retrying on `Nack`.
    pub fn publish(&self, payload: &[u8]) -> Result<()> {
        let frame = encode_update_frame(payload);
        for attempt in 0..=MAX_RESENDS {
            match self.sink.send_frame(&frame)? {
                Ack::Ack => {
                    tracing::debug!(attempt, bytes = payload.len(), "replicated batch");
                    return Ok(());
                }
                Ack::Nack => {
                    tracing::warn!(attempt, "replication consumer nacked, resending");
                }
            }
        }
        Err(ProtocolError::Closed.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn update_frame_roundtrips_and_detects_corruption() {
        let frame = encode_update_frame(b"batch-bytes");
        let (payload, consumed) = decode_update_frame(&frame).unwrap();
        assert_eq!(payload, b"batch-bytes");
        assert_eq!(consumed, frame.len());

        let mut corrupted = frame.clone();
        *corrupted.last_mut().unwrap() ^= 0xFF;
        assert!(decode_update_frame(&corrupted).is_err());
    }

    struct FlakySink {
        nacks_remaining: AtomicUsize,
    }

    impl ReplicationSink for FlakySink {
        fn send_frame(&self, _frame: &[u8]) -> Result<Ack> {
            if self.nacks_remaining.load(Ordering::SeqCst) > 0 {
                self.nacks_remaining.fetch_sub(1, Ordering::SeqCst);
                Ok(Ack::Nack)
            } else {
                Ok(Ack::Ack)
            }
        }
    }

    #[test]
    fn publish_resends_until_acked() {
        let sink = Arc::new(FlakySink {
            nacks_remaining: AtomicUsize::new(2),
        });
        let producer = ReplicationProducer::new(sink);
        producer.publish(b"payload").unwrap();
    }

    struct AlwaysNack;
    impl ReplicationSink for AlwaysNack {
        fn send_frame(&self, _frame: &[u8]) -> Result<Ack> {
            Ok(Ack::Nack)
        }
    }

    #[test]
    fn publish_gives_up_after_max_resends() {
        let producer = ReplicationProducer::new(Arc::new(AlwaysNack));
        assert!(producer.publish(b"payload").is_err());
    }
}
