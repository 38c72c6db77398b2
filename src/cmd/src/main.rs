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

//! CLI entry point. `server` is the one subcommand actually implemented
//! here; `dump`/`load`/`repl` are out of scope (SPEC_FULL.md §1) and are
//! represented only as stubs that announce as much and exit `2`.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use keydb_storage::{Engine, MemoryBackingStore};

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "keydb", version, about = "keydb storage engine CLI")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Runs the server, accepting command-plane connections.
    Server {
        #[arg(long)]
        keyspace: String,
        #[arg(long, default_value = "127.0.0.1")]
        server: String,
        #[arg(long, default_value_t = 6413)]
        port: u16,
    },
    /// Streams a keyspace dump to a file. Not implemented in this build.
    Dump {
        #[arg(long)]
        keyspace: String,
        #[arg(long)]
        server: String,
        #[arg(long)]
        port: u16,
    },
    /// Loads a keyspace dump from a file. Not implemented in this build.
    Load {
        #[arg(long)]
        keyspace: String,
        #[arg(long)]
        server: String,
        #[arg(long)]
        port: u16,
    },
    /// Interactive REPL against a running server. Not implemented in this
    /// build.
    Repl {
        #[arg(long)]
        keyspace: String,
        #[arg(long)]
        server: String,
        #[arg(long)]
        port: u16,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let _config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::error!(error = %e, path = %path.display(), "failed to load config");
                return ExitCode::from(2);
            }
        },
        None => Config::default(),
    };

    match cli.command {
        Command::Server { keyspace, server, port } => run_server(&keyspace, &server, port),
        Command::Dump { .. } | Command::Load { .. } | Command::Repl { .. } => {
            eprintln!("not implemented in this build");
            ExitCode::from(2)
        }
    }
}

fn run_server(keyspace: &str, server: &str, port: u16) -> ExitCode {
    let engine = match Engine::open(Arc::new(MemoryBackingStore::new())) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!(error = %e, "failed to open engine");
            return ExitCode::from(2);
        }
    };
    if let Err(e) = engine.register_keyspace(keyspace) {
        tracing::error!(error = %e, keyspace, "failed to register keyspace");
        return ExitCode::from(2);
    }
    tracing::info!(keyspace, %server, port, "engine ready (accept loop not wired up in this build)");
    ExitCode::SUCCESS
}
