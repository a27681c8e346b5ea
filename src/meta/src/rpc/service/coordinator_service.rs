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

use mr_pb::coordinator_service_server::CoordinatorService;
use mr_pb::{
    FailureReportRequest, FailureReportResponse, HeartbeatRequest, HeartbeatResponse, ReportRequest,
    ReportResponse,
};
use tonic::{Request, Response, Status};

use crate::coordinator::Coordinator;

fn job_type_to_proto(job_type: mr_common::JobType) -> i32 {
    use mr_common::JobType;
    match job_type {
        JobType::Map => mr_pb::JobType::Map as i32,
        JobType::Reduce => mr_pb::JobType::Reduce as i32,
        JobType::Wait => mr_pb::JobType::Wait as i32,
        JobType::Complete => mr_pb::JobType::Complete as i32,
    }
}

#[derive(Clone)]
pub struct CoordinatorServiceImpl {
    coordinator: Coordinator,
}

impl CoordinatorServiceImpl {
    pub fn new(coordinator: Coordinator) -> Self {
        CoordinatorServiceImpl { coordinator }
    }
}

#[tonic::async_trait]
impl CoordinatorService for CoordinatorServiceImpl {
    async fn heartbeat(
        &self,
        request: Request<HeartbeatRequest>,
    ) -> std::result::Result<Response<HeartbeatResponse>, Status> {
        let req = request.into_inner();
        let reply = self.coordinator.heartbeat(req.worker_id).await;
        Ok(Response::new(HeartbeatResponse {
            job_type: job_type_to_proto(reply.job_type),
            task_id: reply.task_id,
            file_name: reply.file_name,
            n_reduce: reply.n_reduce,
        }))
    }

    async fn report(
        &self,
        request: Request<ReportRequest>,
    ) -> std::result::Result<Response<ReportResponse>, Status> {
        let req = request.into_inner();
        self.coordinator.report(req.task_id, req.success).await;
        Ok(Response::new(ReportResponse {}))
    }

    async fn failure_report(
        &self,
        request: Request<FailureReportRequest>,
    ) -> std::result::Result<Response<FailureReportResponse>, Status> {
        let req = request.into_inner();
        self.coordinator.failure_report(req.worker_id).await;
        Ok(Response::new(FailureReportResponse {}))
    }
}
