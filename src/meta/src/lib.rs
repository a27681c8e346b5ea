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

//! The coordinator crate: a scheduler owning the task table, a
//! rate-limited checkpointer, backup-coordinator failover, and the
//! gRPC surface workers heartbeat against.

pub mod backup;
pub mod checkpoint;
pub mod coordinator;
pub mod rpc;
pub mod scheduler;
