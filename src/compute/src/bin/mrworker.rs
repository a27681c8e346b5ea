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

//! Binary entry point for a worker. Ships with a trivial word-count
//! map/reduce pair so the binary is runnable standalone, matching the
//! original's `mrworker.go` example harness — real jobs are expected
//! to link `mr_worker` as a library and supply their own functions.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use mr_common_service::ShutdownHandle;
use mr_rpc_client::CoordinatorClient;
use mr_worker::failure_sink::CoordinatorFailureSink;
use mr_worker::gossip::GossipEngine;
use mr_worker::task_exec::KeyValue;
use mr_worker::worker_loop::{self, WorkerLoopConfig};

#[derive(Parser, Debug)]
#[command(name = "mrworker", about = "MapReduce worker")]
struct Opts {
    #[arg(long)]
    worker_id: u64,

    #[arg(long, default_value = "127.0.0.1:8000")]
    coordinator_addr: String,

    #[arg(long, default_value = ".")]
    working_dir: PathBuf,

    /// Peers participating in gossip, as `id=host:port` (T4 only).
    #[arg(long, value_parser = parse_peer)]
    peer: Vec<(u64, String)>,

    #[arg(long)]
    gossip_listen_addr: Option<SocketAddr>,
}

fn parse_peer(s: &str) -> Result<(u64, String), String> {
    let (id, addr) = s.split_once('=').ok_or_else(|| "expected id=host:port".to_string())?;
    let id = id.parse::<u64>().map_err(|e| e.to_string())?;
    Ok((id, addr.to_string()))
}

fn word_count_map(file_name: &str, contents: &str) -> Vec<KeyValue> {
    let _ = file_name;
    contents
        .split_whitespace()
        .map(|word| KeyValue { key: word.to_lowercase(), value: "1".to_string() })
        .collect()
}

fn word_count_reduce(_key: &str, values: &[String]) -> String {
    values.len().to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mr_runtime::init_logger();
    let opts = Opts::parse();

    tracing::info!(worker_id = opts.worker_id, coordinator = %opts.coordinator_addr, "starting worker");

    if let Some(gossip_addr) = opts.gossip_listen_addr {
        let peer_addrs: HashMap<u64, String> = opts.peer.iter().cloned().collect();
        let all_workers: Vec<u64> = std::iter::once(opts.worker_id).chain(peer_addrs.keys().copied()).collect();

        let client = CoordinatorClient::connect(opts.coordinator_addr.clone()).await?;
        let sink = Arc::new(CoordinatorFailureSink::new(client));
        let engine = Arc::new(GossipEngine::new(opts.worker_id, &all_workers, peer_addrs, sink));

        let shutdown = ShutdownHandle::new();
        mr_worker::rpc::server::serve(gossip_addr, engine.health_table(), &shutdown);
        engine.start(shutdown.subscribe());
    }

    let config = WorkerLoopConfig {
        worker_id: opts.worker_id,
        coordinator_addr: opts.coordinator_addr,
        working_dir: opts.working_dir,
        wait_interval: Duration::from_secs(1),
    };

    worker_loop::run(config, &word_count_map, &word_count_reduce).await
}
