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

//! Data-plane protocol (backup + replication), SPEC_FULL.md §6:
//!
//! ```text
//! request  = op_code(4 LE) ∥ op-specific fields
//! response = checksummed_int(4 LE + crc32c)
//! ```

use keydb_error::{EncodingError, ProtocolError, Result};

/// Data-plane request op codes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    GetFile { dump_id: u64, offset: u64, name: String },
    GetUpdates { dump_id: u64 },
}

const OP_GET_FILE: u32 = 0;
const OP_GET_UPDATES: u32 = 1;

/// Data-plane response codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseCode {
    Ok,
    Other,
    UnknownDump,
    UnknownFile,
}

impl ResponseCode {
    fn to_u32(self) -> u32 {
        match self {
            ResponseCode::Ok => 0,
            ResponseCode::Other => 1,
            ResponseCode::UnknownDump => 2,
            ResponseCode::UnknownFile => 3,
        }
    }

    fn from_u32(value: u32) -> Result<Self> {
        match value {
            0 => Ok(ResponseCode::Ok),
            1 => Ok(ResponseCode::Other),
            2 => Ok(ResponseCode::UnknownDump),
            3 => Ok(ResponseCode::UnknownFile),
            other => Err(EncodingError::BadEncoding(format!("unknown response code {other}")).into()),
        }
    }
}

/// Encodes a checksummed response code: `code(4 LE) ∥ crc32c(code)(4 LE)`.
pub fn encode_response(code: ResponseCode) -> [u8; 8] {
    let mut out = [0u8; 8];
    let bytes = code.to_u32().to_le_bytes();
    out[0..4].copy_from_slice(&bytes);
    out[4..8].copy_from_slice(&crc32c::crc32c(&bytes).to_le_bytes());
    out
}

pub fn decode_response(bytes: &[u8]) -> Result<ResponseCode> {
    if bytes.len() < 8 {
        return Err(EncodingError::IncompleteFragment("data-plane response".into()).into());
    }
    let code_bytes: [u8; 4] = bytes[0..4].try_into().unwrap();
    let crc = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
    if crc32c::crc32c(&code_bytes) != crc {
        return Err(ProtocolError::CorruptedFrame.into());
    }
    ResponseCode::from_u32(u32::from_le_bytes(code_bytes))
}

/// Version tuple exchanged during the data-plane handshake; a major
/// mismatch aborts the connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProtocolVersion {
    pub major: u16,
    pub minor: u16,
    pub bugfix: u16,
}

impl ProtocolVersion {
    pub fn is_compatible_with(&self, other: &ProtocolVersion) -> bool {
        self.major == other.major
    }
}

pub fn encode_request(request: &Request) -> Vec<u8> {
    let mut out = Vec::new();
    match request {
        Request::GetFile { dump_id, offset, name } => {
            out.extend_from_slice(&OP_GET_FILE.to_le_bytes());
            out.extend_from_slice(&dump_id.to_le_bytes());
            out.extend_from_slice(&offset.to_le_bytes());
            out.extend_from_slice(&(name.len() as u32).to_le_bytes());
            out.extend_from_slice(name.as_bytes());
        }
        Request::GetUpdates { dump_id } => {
            out.extend_from_slice(&OP_GET_UPDATES.to_le_bytes());
            out.extend_from_slice(&dump_id.to_le_bytes());
        }
    }
    out
}

pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    if bytes.len() < 4 {
        return Err(EncodingError::IncompleteFragment("data-plane op code".into()).into());
    }
    let op = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
    match op {
        OP_GET_FILE => {
            if bytes.len() < 4 + 8 + 8 + 4 {
                return Err(EncodingError::IncompleteFragment("GetFile".into()).into());
            }
            let dump_id = u64::from_le_bytes(bytes[4..12].try_into().unwrap());
            let offset = u64::from_le_bytes(bytes[12..20].try_into().unwrap());
            let name_len = u32::from_le_bytes(bytes[20..24].try_into().unwrap()) as usize;
            if bytes.len() < 24 + name_len {
                return Err(EncodingError::IncompleteFragment("GetFile name".into()).into());
            }
            let name = String::from_utf8(bytes[24..24 + name_len].to_vec())
                .map_err(|_| EncodingError::BadEncoding("GetFile name is not utf-8".into()))?;
            Ok(Request::GetFile { dump_id, offset, name })
        }
        OP_GET_UPDATES => {
            if bytes.len() < 12 {
                return Err(EncodingError::IncompleteFragment("GetUpdates".into()).into());
            }
            let dump_id = u64::from_le_bytes(bytes[4..12].try_into().unwrap());
            Ok(Request::GetUpdates { dump_id })
        }
        other => Err(EncodingError::BadEncoding(format!("unknown data-plane op code {other}")).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_file_roundtrips() {
        let req = Request::GetFile {
            dump_id: 1,
            offset: 4096,
            name: "table.dat".into(),
        };
        assert_eq!(decode_request(&encode_request(&req)).unwrap(), req);
    }

    #[test]
    fn get_updates_roundtrips() {
        let req = Request::GetUpdates { dump_id: 7 };
        assert_eq!(decode_request(&encode_request(&req)).unwrap(), req);
    }

    #[test]
    fn response_code_roundtrips_and_detects_corruption() {
        let encoded = encode_response(ResponseCode::UnknownDump);
        assert_eq!(decode_response(&encoded).unwrap(), ResponseCode::UnknownDump);

        let mut corrupted = encoded;
        corrupted[0] ^= 0xFF;
        assert!(decode_response(&corrupted).is_err());
    }

    #[test]
    fn major_version_mismatch_is_incompatible() {
        let a = ProtocolVersion { major: 1, minor: 0, bugfix: 0 };
        let b = ProtocolVersion { major: 2, minor: 0, bugfix: 0 };
        assert!(!a.is_compatible_with(&b));
    }
}
