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

use crate::{TaskId, WorkerId};

/// Error kinds the scheduling core recognizes.
///
/// Most of these are non-fatal: a `TaskTimeout` or `WorkerDeath` is a
/// re-dispatch signal, not a failure to report to the caller. Only
/// [`Error::RpcListen`] aborts a binary's `main`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("task {0} timed out")]
    TaskTimeout(TaskId),

    #[error("worker {0} presumed dead")]
    WorkerDeath(WorkerId),

    #[error("report for task {0} ignored: task is already done")]
    ReportMismatch(TaskId),

    #[error("checkpoint write failed: {0}")]
    CheckpointIo(#[from] std::io::Error),

    #[error("checkpoint decode failed: {0}")]
    CheckpointDecode(#[from] serde_json::Error),

    #[error("rpc listener failed: {0}")]
    RpcListen(String),
}

pub type Result<T> = std::result::Result<T, Error>;
