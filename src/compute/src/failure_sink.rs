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

//! Bridges the gossip engine's local consensus verdict back to the
//! coordinator (spec §4.4: "report suspected failures to the
//! coordinator via FailureReport").

use mr_common::WorkerId;
use mr_rpc_client::CoordinatorClient;
use tokio::sync::Mutex;

use crate::gossip::FailureSink;

pub struct CoordinatorFailureSink {
    client: Mutex<CoordinatorClient>,
}

impl CoordinatorFailureSink {
    pub fn new(client: CoordinatorClient) -> Self {
        CoordinatorFailureSink { client: Mutex::new(client) }
    }
}

#[async_trait::async_trait]
impl FailureSink for CoordinatorFailureSink {
    async fn report_worker_failure(&self, worker_id: WorkerId) {
        if let Err(e) = self.client.lock().await.failure_report(worker_id).await {
            tracing::warn!(error = %e, worker_id, "failed to relay worker failure to coordinator");
        }
    }
}
