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

//! Process configuration (SPEC_FULL.md §1's ambient-stack note): a
//! `serde`-deserialized struct loaded from TOML, in the spirit of the
//! teacher's per-component config structs.

use std::net::SocketAddr;
use std::path::PathBuf;

use keydb_error::Result;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub iterator_pool_size: usize,
    pub sync_on_commit: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:6413".parse().unwrap(),
            data_dir: PathBuf::from("./data"),
            iterator_pool_size: 1_000,
            sync_on_commit: true,
        }
    }
}

impl Config {
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!(e))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!(e).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable_without_a_config_file() {
        let cfg = Config::default();
        assert_eq!(cfg.iterator_pool_size, 1_000);
        assert!(cfg.sync_on_commit);
    }

    #[test]
    fn partial_toml_overrides_only_the_given_fields() {
        let toml = "sync_on_commit = false\n";
        let cfg: Config = toml::from_str(toml).unwrap();
        assert!(!cfg.sync_on_commit);
        assert_eq!(cfg.iterator_pool_size, 1_000);
    }
}
