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

use chrono::Utc;
use mr_common::HealthEntry;
use mr_pb::gossip_service_server::GossipService;
use mr_pb::{GossipRequest, GossipResponse};
use mr_rpc_client::{health_table_from_proto, health_table_to_proto};
use tonic::{Request, Response, Status};

use crate::health_table::HealthTable;

#[derive(Clone)]
pub struct GossipServiceImpl {
    health: HealthTable,
}

impl GossipServiceImpl {
    pub fn new(health: HealthTable) -> Self {
        GossipServiceImpl { health }
    }
}

#[tonic::async_trait]
impl GossipService for GossipServiceImpl {
    async fn gossip(&self, request: Request<GossipRequest>) -> std::result::Result<Response<GossipResponse>, Status> {
        let req = request.into_inner();
        let incoming = health_table_from_proto(&req.health_table);
        self.health.merge(&incoming).await;
        self.health.update(req.worker_id, HealthEntry::alive_now(Utc::now())).await;

        let reply = self.health.get_all().await;
        Ok(Response::new(GossipResponse {
            health_table: health_table_to_proto(&reply),
        }))
    }
}
