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

use crate::{JobType, TaskId};

/// The coordinator's reply to a heartbeat (spec §6).
#[derive(Debug, Clone, PartialEq)]
pub struct HeartbeatReply {
    pub job_type: JobType,
    pub task_id: TaskId,
    pub file_name: String,
    pub n_reduce: u32,
}

impl HeartbeatReply {
    pub fn wait() -> Self {
        HeartbeatReply {
            job_type: JobType::Wait,
            task_id: 0,
            file_name: String::new(),
            n_reduce: 0,
        }
    }

    pub fn complete() -> Self {
        HeartbeatReply {
            job_type: JobType::Complete,
            task_id: 0,
            file_name: String::new(),
            n_reduce: 0,
        }
    }
}
