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

//! Bootstraps the coordinator's gRPC listener, mirroring the teacher's
//! `rpc_serve`: build the service table, layer on request logging, and
//! serve until a shutdown signal fires.

use std::net::SocketAddr;
use std::path::PathBuf;

use mr_common::{CoordinatorConfig, Result, Tier};
use mr_common_service::{LoggingMiddlewareLayer, ShutdownHandle};
use mr_pb::coordinator_service_server::CoordinatorServiceServer;
use tokio::task::JoinHandle;

use crate::backup::BackupMonitor;
use crate::coordinator::Coordinator;
use crate::rpc::service::coordinator_service::CoordinatorServiceImpl;

pub struct CoordinatorServer {
    pub coordinator: Coordinator,
    pub shutdown: ShutdownHandle,
    pub loop_handle: JoinHandle<()>,
    pub backup_handle: Option<JoinHandle<()>>,
}

/// Starts the coordinator loop, the RPC listener, and — for T3+ — a
/// backup monitor watching the same checkpoint file.
pub async fn serve(
    listen_addr: SocketAddr,
    config: CoordinatorConfig,
    input_files: Vec<String>,
    n_reduce: u32,
) -> Result<CoordinatorServer> {
    let (coordinator, loop_handle) =
        Coordinator::from_checkpoint_or_new(config.clone(), input_files, n_reduce).await?;

    let shutdown = ShutdownHandle::new();

    let backup_handle = if config.tier >= Tier::Replicated && config.backup_coordinator {
        if let Some(path) = config.checkpoint_file.clone() {
            Some(spawn_backup_monitor(coordinator.clone(), path, &config, shutdown.subscribe()))
        } else {
            None
        }
    } else {
        None
    };

    let svc = CoordinatorServiceImpl::new(coordinator.clone());
    let mut shutdown_rx = shutdown.subscribe();

    tokio::spawn(async move {
        let result = tonic::transport::Server::builder()
            .layer(LoggingMiddlewareLayer)
            .add_service(CoordinatorServiceServer::new(svc))
            .serve_with_shutdown(listen_addr, async move {
                let _ = shutdown_rx.changed().await;
            })
            .await;
        if let Err(e) = result {
            tracing::error!(error = %e, "coordinator rpc server exited with error");
        }
    });

    Ok(CoordinatorServer {
        coordinator,
        shutdown,
        loop_handle,
        backup_handle,
    })
}

fn spawn_backup_monitor(
    coordinator: Coordinator,
    path: PathBuf,
    config: &CoordinatorConfig,
    shutdown_rx: tokio::sync::watch::Receiver<()>,
) -> JoinHandle<()> {
    let monitor = BackupMonitor::new(path, config.lease_timeout, mr_common::config::timing::BACKUP_POLL_INTERVAL);
    tokio::spawn(async move {
        if let Some(state) = monitor.monitor(shutdown_rx).await {
            tracing::info!("backup coordinator taking over as primary");
            coordinator.replace_state(state).await;
        }
    })
}
