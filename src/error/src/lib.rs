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

//! Error taxonomy shared by every crate in the workspace.
//!
//! Each concern (encoding, wire protocol, logical misuse) gets its own small
//! `thiserror` enum; [`Error`] joins them with `#[from]` at the crate
//! boundary so callers can propagate with plain `?`.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures raised by the order-preserving codec layer (`keydb_codec`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("unsatisfied constraint: {0}")]
    UnsatisfiedConstraint(String),
    #[error("incomplete fragment while decoding {0}")]
    IncompleteFragment(String),
    #[error("bad encoding for {0}")]
    BadEncoding(String),
    #[error("unknown choice tag {0}")]
    UnknownTag(u8),
}

/// Failures raised by the framed request protocol (`keydb_proto`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("corrupted frame header")]
    CorruptedFrame,
    #[error("inconsistent payload length: expected {expected}, found {actual}")]
    InconsistentLength { expected: u32, actual: u32 },
    #[error("connection closed")]
    Closed,
    #[error("incompatible protocol version: {0}.{1}.{2}")]
    BadVersion(u16, u16, u16),
}

/// Misuse of the engine that does not corrupt the connection or abort a
/// transaction: the client simply gets told no.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogicalError {
    #[error("unknown keyspace {0:?}")]
    UnknownKeyspace(String),
    #[error("read-only violation: {0}")]
    ReadOnlyViolation(String),
}

/// Umbrella error for the whole engine. Encoding and storage errors abort the
/// current transaction; protocol errors close the connection; logical errors
/// surface to the client without other side effects (see SPEC_FULL.md §7).
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Logical(#[from] LogicalError),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("transaction aborted: {cause}")]
    TransactionAborted { cause: Box<Error> },
}

impl Error {
    /// Wraps `self` as the cause of an aborted transaction.
    pub fn into_aborted(self) -> Error {
        Error::TransactionAborted {
            cause: Box::new(self),
        }
    }

    /// True for errors that must also close the owning connection, per the
    /// propagation rules in SPEC_FULL.md §7.
    pub fn closes_connection(&self) -> bool {
        matches!(self, Error::Protocol(_))
    }
}
