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

//! The worker crate: task execution, the gossip health table and
//! protocol, and the RPC surface a `Gossip`-tier worker exposes to its
//! neighbors.

pub mod failure_sink;
pub mod gossip;
pub mod health_table;
pub mod rpc;
pub mod task_exec;
pub mod worker_loop;
