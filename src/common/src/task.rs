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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type TaskId = u64;
pub type WorkerId = u64;

/// Identity used in place of a real worker for an assignee-less task.
pub const NO_WORKER: WorkerId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Idle,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Map,
    Reduce,
}

impl Phase {
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Map => Some(Phase::Reduce),
            Phase::Reduce => None,
        }
    }
}

/// What a heartbeat reply tells the worker to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobType {
    Map,
    Reduce,
    Wait,
    Complete,
}

/// One unit of work in the current phase's task table.
///
/// Invariants (see spec §3): exactly one status at a time; a `Done` task
/// is never reassigned; only `InProgress` tasks carry a non-zero
/// `worker_id`; a task whose worker is declared dead goes back to `Idle`
/// with `worker_id = NO_WORKER` and `backup_tasks` cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub file_name: String,
    pub status: TaskStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub worker_id: WorkerId,
    /// Outstanding speculative duplicates of this task. The spec treats
    /// "is this non-empty" as the only predicate the scheduler needs;
    /// individual duplicate task ids are not tracked separately.
    pub backup_tasks: Vec<TaskId>,
}

impl Task {
    pub fn new_idle(id: TaskId, file_name: impl Into<String>) -> Self {
        Task {
            id,
            file_name: file_name.into(),
            status: TaskStatus::Idle,
            start_time: None,
            worker_id: NO_WORKER,
            backup_tasks: Vec::new(),
        }
    }

    pub fn has_backup(&self) -> bool {
        !self.backup_tasks.is_empty()
    }
}
