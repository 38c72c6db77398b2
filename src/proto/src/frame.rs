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

//! Command-plane frame encode/decode (SPEC_FULL.md §6): a pure in-memory
//! contract, no socket I/O — the `cmd` binary's accept loop is the only
//! thing that touches a live `TcpStream`.
//!
//! ```text
//! frame = request_id(8 LE)
//!       ∥ payload_len(4 LE)
//!       ∥ crc32c(request_id ∥ payload_len)(4 LE)
//!       ∥ payload(payload_len bytes)
//!       ∥ crc32c(payload) XOR crc32c(header)(4 LE)
//! ```
//!
//! The trailer is deliberately the XOR of the payload checksum and the
//! header checksum rather than a plain payload checksum — SPEC_FULL.md §9
//! records this as a known quirk carried over from the source rather than
//! silently "fixed", so `decode_frame` checks against that exact relation.

use keydb_error::{ProtocolError, Result};

const HEADER_LEN: usize = 8 + 4 + 4;
const TRAILER_LEN: usize = 4;

/// A decoded frame borrowing its payload from the input buffer.
#[derive(Debug, PartialEq, Eq)]
pub struct Frame<'a> {
    pub request_id: u64,
    pub payload: &'a [u8],
}

/// Encodes one frame. `request_id` parity matters to the caller (SPEC_FULL.md
/// §5: odd ids for await-blocking requests, even otherwise) but not to the
/// framing itself.
pub fn encode_frame(request_id: u64, payload: &[u8]) -> Vec<u8> {
    let mut header = Vec::with_capacity(HEADER_LEN);
    header.extend_from_slice(&request_id.to_le_bytes());
    header.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    let header_crc = crc32c::crc32c(&header);
    header.extend_from_slice(&header_crc.to_le_bytes());

    let trailer_crc = crc32c::crc32c(payload) ^ header_crc;

    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len() + TRAILER_LEN);
    frame.extend_from_slice(&header);
    frame.extend_from_slice(payload);
    frame.extend_from_slice(&trailer_crc.to_le_bytes());
    frame
}

/// Decodes one frame from the front of `bytes`, returning it along with the
/// number of bytes consumed. A corrupt header closes the connection; a
/// payload-length mismatch fails only the pending response (SPEC_FULL.md
/// §7) — both are surfaced as distinct [`ProtocolError`] variants so the
/// caller can apply the right propagation rule.
pub fn decode_frame(bytes: &[u8]) -> Result<(Frame<'_>, usize)> {
    if bytes.len() < HEADER_LEN {
        return Err(ProtocolError::CorruptedFrame.into());
    }
    let request_id = u64::from_le_bytes(bytes[0..8].try_into().unwrap());
    let payload_len = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
    let header_crc = u32::from_le_bytes(bytes[12..16].try_into().unwrap());
    if crc32c::crc32c(&bytes[0..12]) != header_crc {
        return Err(ProtocolError::CorruptedFrame.into());
    }

    let payload_len = payload_len as usize;
    let available = bytes.len().saturating_sub(HEADER_LEN + TRAILER_LEN);
    if available < payload_len {
        return Err(ProtocolError::InconsistentLength {
            expected: payload_len as u32,
            actual: available as u32,
        }
        .into());
    }

    let payload = &bytes[HEADER_LEN..HEADER_LEN + payload_len];
    let trailer_offset = HEADER_LEN + payload_len;
    let trailer_crc =
        u32::from_le_bytes(bytes[trailer_offset..trailer_offset + TRAILER_LEN].try_into().unwrap());
    if trailer_crc != crc32c::crc32c(payload) ^ header_crc {
        return Err(ProtocolError::CorruptedFrame.into());
    }

    Ok((Frame { request_id, payload }, trailer_offset + TRAILER_LEN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_roundtrips() {
        let frame = encode_frame(42, b"hello");
        let (decoded, consumed) = decode_frame(&frame).unwrap();
        assert_eq!(decoded.request_id, 42);
        assert_eq!(decoded.payload, b"hello");
        assert_eq!(consumed, frame.len());
    }

    #[test]
    fn empty_payload_roundtrips() {
        let frame = encode_frame(1, b"");
        let (decoded, consumed) = decode_frame(&frame).unwrap();
        assert_eq!(decoded.payload, b"" as &[u8]);
        assert_eq!(consumed, frame.len());
    }

    #[test]
    fn corrupted_header_is_rejected() {
        let mut frame = encode_frame(7, b"payload");
        frame[0] ^= 0xFF;
        assert!(matches!(
            decode_frame(&frame),
            Err(keydb_error::Error::Protocol(ProtocolError::CorruptedFrame))
        ));
    }

    #[test]
    fn truncated_payload_is_an_inconsistent_length() {
        let frame = encode_frame(7, b"payload");
        let truncated = &frame[..frame.len() - 3];
        assert!(matches!(
            decode_frame(truncated),
            Err(keydb_error::Error::Protocol(ProtocolError::InconsistentLength { .. }))
        ));
    }

    #[test]
    fn trailer_is_literally_the_xor_of_payload_and_header_crc() {
        let payload = b"payload";
        let frame = encode_frame(7, payload);
        let header_crc = u32::from_le_bytes(frame[12..16].try_into().unwrap());
        let trailer_crc = u32::from_le_bytes(frame[frame.len() - 4..].try_into().unwrap());
        assert_eq!(trailer_crc, crc32c::crc32c(payload) ^ header_crc);
    }
}
