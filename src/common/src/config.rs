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

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A named profile of fault-tolerance features enabled (spec §1).
///
/// Ordered so `tier >= Tier::Speculative` reads naturally at call sites,
/// matching the Go original's `FaultToleranceTier` iota comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    /// T1 — no fault tolerance.
    NoFaultTolerance,
    /// T2 — centralized timeout + speculative execution.
    Speculative,
    /// T3 — T2 plus checkpointed state and backup coordinator failover.
    Replicated,
    /// T4 — T3 plus decentralized gossip failure detection.
    Gossip,
}

pub mod timing {
    use std::time::Duration;

    pub const TASK_TIMEOUT: Duration = Duration::from_secs(10);
    pub const CHECKPOINT_MIN_INTERVAL: Duration = Duration::from_millis(100);
    pub const LEASE_TIMEOUT: Duration = Duration::from_secs(5);
    pub const BACKUP_POLL_INTERVAL: Duration = Duration::from_secs(1);
    pub const GOSSIP_INTERVAL: Duration = Duration::from_millis(100);
    pub const SUSPICION_TIMEOUT: Duration = Duration::from_millis(300);
    pub const CONSENSUS_THRESHOLD: u32 = 3;
    pub const GOSSIP_FANOUT: usize = 3;
    pub const DEFAULT_SPECULATIVE_THRESHOLD: f64 = 0.8;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    pub tier: Tier,
    pub speculative_threshold: f64,
    /// Empty disables persistence entirely.
    pub checkpoint_file: Option<PathBuf>,
    pub backup_coordinator: bool,
    pub gossip_enabled: bool,
    pub task_timeout: Duration,
    pub checkpoint_min_interval: Duration,
    pub lease_timeout: Duration,
}

impl CoordinatorConfig {
    pub fn for_tier(tier: Tier) -> Self {
        let (checkpoint_file, backup_coordinator, gossip_enabled) = match tier {
            Tier::NoFaultTolerance | Tier::Speculative => (None, false, false),
            Tier::Replicated => (Some(PathBuf::from("mr-state.json")), true, false),
            Tier::Gossip => (Some(PathBuf::from("mr-state.json")), true, true),
        };
        CoordinatorConfig {
            tier,
            speculative_threshold: timing::DEFAULT_SPECULATIVE_THRESHOLD,
            checkpoint_file,
            backup_coordinator,
            gossip_enabled,
            task_timeout: timing::TASK_TIMEOUT,
            checkpoint_min_interval: timing::CHECKPOINT_MIN_INTERVAL,
            lease_timeout: timing::LEASE_TIMEOUT,
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        CoordinatorConfig::for_tier(Tier::NoFaultTolerance)
    }
}
