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

//! Generated tonic/prost types for the coordinator and gossip RPC
//! surface (spec §6). This crate is intentionally a thin wrapper around
//! `tonic_build` output — conversions to/from the domain types in
//! `mr_common` live in `mr_rpc_client` and the service implementations,
//! the way `risingwave_pb` stays free of `risingwave_common`.

tonic::include_proto!("mr");
