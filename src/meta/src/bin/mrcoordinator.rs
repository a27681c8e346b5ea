// Copyright 2024 MapReduce-RS Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Binary entry point for the coordinator. Takes the set of input
//! files as positional arguments and the number of reduce tasks,
//! matching the Go original's `mrcoordinator` CLI.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use mr_common::{CoordinatorConfig, Tier};

#[derive(Parser, Debug)]
#[command(name = "mrcoordinator", about = "MapReduce coordinator")]
struct Opts {
    /// Input files to split into map tasks.
    #[arg(required = true)]
    input_files: Vec<String>,

    #[arg(long, default_value = "127.0.0.1:8000")]
    listen_addr: SocketAddr,

    #[arg(long, default_value_t = 10)]
    n_reduce: u32,

    #[arg(long, value_enum, default_value = "no-fault-tolerance")]
    tier: CliTier,

    #[arg(long)]
    checkpoint_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum CliTier {
    NoFaultTolerance,
    Speculative,
    Replicated,
    Gossip,
}

impl From<CliTier> for Tier {
    fn from(t: CliTier) -> Self {
        match t {
            CliTier::NoFaultTolerance => Tier::NoFaultTolerance,
            CliTier::Speculative => Tier::Speculative,
            CliTier::Replicated => Tier::Replicated,
            CliTier::Gossip => Tier::Gossip,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mr_runtime::init_logger();
    let opts = Opts::parse();

    let mut config = CoordinatorConfig::for_tier(opts.tier.into());
    if let Some(path) = opts.checkpoint_file {
        config.checkpoint_file = Some(path);
    }

    tracing::info!(tier = ?config.tier, listen_addr = %opts.listen_addr, "starting coordinator");

    let server = mr_meta::rpc::server::serve(opts.listen_addr, config, opts.input_files, opts.n_reduce).await?;

    server.loop_handle.await?;
    server.shutdown.shutdown();
    if let Some(backup) = server.backup_handle {
        let _ = backup.await;
    }

    Ok(())
}
