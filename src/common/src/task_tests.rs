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

use crate::{CoordinatorConfig, Task, TaskStatus, Tier, NO_WORKER};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_is_idle_and_unowned() {
        let t = Task::new_idle(3, "a.txt");
        assert_eq!(t.status, TaskStatus::Idle);
        assert_eq!(t.worker_id, NO_WORKER);
        assert!(!t.has_backup());
    }

    #[test]
    fn tier_ordering_matches_fault_tolerance_strength() {
        assert!(Tier::Gossip > Tier::Replicated);
        assert!(Tier::Replicated > Tier::Speculative);
        assert!(Tier::Speculative > Tier::NoFaultTolerance);
    }

    #[test]
    fn tier3_config_enables_checkpoint_and_backup() {
        let cfg = CoordinatorConfig::for_tier(Tier::Replicated);
        assert!(cfg.checkpoint_file.is_some());
        assert!(cfg.backup_coordinator);
        assert!(!cfg.gossip_enabled);
    }
}
