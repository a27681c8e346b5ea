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

//! Service scaffolding shared by the coordinator and worker binaries:
//! a graceful-shutdown watch-channel helper and a request-logging tonic
//! middleware layer. Mirrors the role `risingwave_common_service` plays
//! for the teacher's meta and compute nodes.

mod logging;
mod shutdown;

pub use logging::LoggingMiddlewareLayer;
pub use shutdown::ShutdownHandle;
