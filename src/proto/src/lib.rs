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

//! Wire contracts (SPEC_FULL.md §6): the command-plane frame, the request
//! taxonomy it carries, and the data-plane protocol used for backup and
//! replication. No socket I/O lives here — see the `cmd` binary's accept
//! loop for the only code that touches a live `TcpStream`.

pub mod dataplane;
pub mod frame;
pub mod request;

pub use dataplane::{ProtocolVersion, ResponseCode};
pub use frame::{decode_frame, encode_frame, Frame};
pub use request::Request;
