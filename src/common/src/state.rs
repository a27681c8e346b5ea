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

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Phase, Task, WorkerId};

/// The checkpoint payload (spec §3, §6). The timestamp doubles as the
/// primary's lease token once the file lands on disk and its mtime is
/// read back by the backup coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorState {
    pub tasks: Vec<Task>,
    pub phase: Phase,
    pub worker_leases: HashMap<WorkerId, DateTime<Utc>>,
    pub timestamp: DateTime<Utc>,
}
