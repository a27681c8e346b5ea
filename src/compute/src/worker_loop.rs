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

//! The heartbeat-driven main loop, ported from the original's
//! `Worker(mapFn, reduceFn)`: heartbeat, dispatch on the returned job
//! type, report the outcome, repeat until told the job is complete.

use std::path::PathBuf;
use std::time::Duration;

use mr_common::{JobType, WorkerId};
use mr_rpc_client::CoordinatorClient;

use crate::task_exec::{run_map_task, run_reduce_task, MapFn, ReduceFn};

pub struct WorkerLoopConfig {
    pub worker_id: WorkerId,
    pub coordinator_addr: String,
    pub working_dir: PathBuf,
    pub wait_interval: Duration,
}

/// Drives one worker end to end. Returns once the coordinator reports
/// the job `Complete`.
pub async fn run(config: WorkerLoopConfig, map_fn: &dyn MapFn, reduce_fn: &dyn ReduceFn) -> anyhow::Result<()> {
    let mut client = CoordinatorClient::connect(config.coordinator_addr.clone()).await?;

    loop {
        let reply = client.heartbeat(config.worker_id).await?;
        match reply.job_type {
            JobType::Map => {
                let success = run_map_task(map_fn, reply.task_id, &reply.file_name, reply.n_reduce, &config.working_dir).is_ok();
                client.report(reply.task_id, success, config.worker_id).await?;
            }
            JobType::Reduce => {
                let success = run_reduce_task(reduce_fn, reply.task_id, &config.working_dir).is_ok();
                client.report(reply.task_id, success, config.worker_id).await?;
            }
            JobType::Wait => {
                tokio::time::sleep(config.wait_interval).await;
            }
            JobType::Complete => return Ok(()),
        }
    }
}
