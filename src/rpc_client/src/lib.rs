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

//! Typed tonic-channel clients used by workers to call the coordinator
//! and by gossip peers to call one another, mirroring the role
//! `risingwave_rpc_client` plays between compute nodes and the meta
//! service.

mod convert;

use chrono::Utc;
use mr_common::{HealthSnapshot, HeartbeatReply, TaskId, WorkerId};
use tonic::transport::Channel;
use tonic::Status;

pub use convert::{health_table_from_proto, health_table_to_proto};

/// A worker-side handle to the coordinator's RPC surface
/// (`CoordinatorService`: Heartbeat, Report, FailureReport).
#[derive(Clone)]
pub struct CoordinatorClient {
    inner: mr_pb::coordinator_service_client::CoordinatorServiceClient<Channel>,
}

impl CoordinatorClient {
    pub async fn connect(addr: impl Into<String>) -> Result<Self, tonic::transport::Error> {
        let inner = mr_pb::coordinator_service_client::CoordinatorServiceClient::connect(addr.into()).await?;
        Ok(CoordinatorClient { inner })
    }

    pub async fn heartbeat(&mut self, worker_id: WorkerId) -> Result<HeartbeatReply, Status> {
        let resp = self
            .inner
            .heartbeat(mr_pb::HeartbeatRequest { worker_id })
            .await?
            .into_inner();
        Ok(HeartbeatReply {
            job_type: convert::job_type_from_proto(resp.job_type),
            task_id: resp.task_id,
            file_name: resp.file_name,
            n_reduce: resp.n_reduce,
        })
    }

    pub async fn report(&mut self, task_id: TaskId, success: bool, worker_id: WorkerId) -> Result<(), Status> {
        self.inner
            .report(mr_pb::ReportRequest {
                task_id,
                success,
                worker_id,
            })
            .await?;
        Ok(())
    }

    pub async fn failure_report(&mut self, worker_id: WorkerId) -> Result<(), Status> {
        self.inner
            .failure_report(mr_pb::FailureReportRequest { worker_id })
            .await?;
        Ok(())
    }
}

/// A peer-to-peer handle used by the gossip engine to push-pull health
/// tables with a neighbor (`GossipService`: Gossip).
#[derive(Clone)]
pub struct GossipClient {
    inner: mr_pb::gossip_service_client::GossipServiceClient<Channel>,
}

impl GossipClient {
    pub async fn connect(addr: impl Into<String>) -> Result<Self, tonic::transport::Error> {
        let inner = mr_pb::gossip_service_client::GossipServiceClient::connect(addr.into()).await?;
        Ok(GossipClient { inner })
    }

    pub async fn gossip(&mut self, worker_id: WorkerId, table: &HealthSnapshot) -> Result<HealthSnapshot, Status> {
        let resp = self
            .inner
            .gossip(mr_pb::GossipRequest {
                worker_id,
                health_table: convert::health_table_to_proto(table),
                timestamp_unix_millis: Utc::now().timestamp_millis(),
            })
            .await?
            .into_inner();
        Ok(convert::health_table_from_proto(&resp.health_table))
    }
}
