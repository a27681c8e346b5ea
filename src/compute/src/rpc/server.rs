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

//! Starts the worker's `GossipService` listener (T4 only — lower
//! tiers never bind a port, since nothing calls a worker).

use std::net::SocketAddr;

use mr_common_service::{LoggingMiddlewareLayer, ShutdownHandle};
use mr_pb::gossip_service_server::GossipServiceServer;

use crate::health_table::HealthTable;
use crate::rpc::service::gossip_service::GossipServiceImpl;

pub fn serve(listen_addr: SocketAddr, health: HealthTable, shutdown: &ShutdownHandle) -> tokio::task::JoinHandle<()> {
    let svc = GossipServiceImpl::new(health);
    let mut shutdown_rx = shutdown.subscribe();

    tokio::spawn(async move {
        let result = tonic::transport::Server::builder()
            .layer(LoggingMiddlewareLayer)
            .add_service(GossipServiceServer::new(svc))
            .serve_with_shutdown(listen_addr, async move {
                let _ = shutdown_rx.changed().await;
            })
            .await;
        if let Err(e) = result {
            tracing::error!(error = %e, "gossip rpc server exited with error");
        }
    })
}
