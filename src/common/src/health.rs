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

use crate::WorkerId;

/// Liveness verdict for a peer, monotonic in the sense that `Dead` is
/// terminal for the duration of the job (spec §3, P5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HealthStatus {
    Alive,
    Suspect,
    Dead,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthEntry {
    pub status: HealthStatus,
    pub last_seen: DateTime<Utc>,
    pub suspicion_count: u32,
    pub last_update: DateTime<Utc>,
}

impl HealthEntry {
    pub fn alive_now(now: DateTime<Utc>) -> Self {
        HealthEntry {
            status: HealthStatus::Alive,
            last_seen: now,
            suspicion_count: 0,
            last_update: now,
        }
    }
}

/// A worker's view of cluster liveness, exchanged verbatim in gossip
/// push-pull rounds.
pub type HealthSnapshot = std::collections::HashMap<WorkerId, HealthEntry>;
