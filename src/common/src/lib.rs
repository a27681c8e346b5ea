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

//! Shared types for the MapReduce coordinator and its worker protocol:
//! the task table's data model, fault-tolerance tier configuration, the
//! gossip health model, and the crate-wide error type. Kept dependency-
//! light so both `mr_meta` and `mr_worker` can sit on top of it without
//! pulling in RPC or storage concerns.

pub mod config;
pub mod error;
pub mod health;
pub mod reply;
pub mod state;
pub mod task;

#[cfg(test)]
mod task_tests;

pub use config::{CoordinatorConfig, Tier};
pub use error::{Error, Result};
pub use health::{HealthEntry, HealthSnapshot, HealthStatus};
pub use reply::HeartbeatReply;
pub use state::CoordinatorState;
pub use task::{JobType, Phase, Task, TaskId, TaskStatus, WorkerId, NO_WORKER};
