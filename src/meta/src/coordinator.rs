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

//! The single-writer event loop that owns the `Scheduler` and ties it
//! to checkpointing and backup failover. Every mutation is funneled
//! through one `mpsc` channel so the task table is never touched from
//! two tasks at once — no `Mutex` needed (spec §9: "the canonical
//! design is the stricter of the two").

use std::path::PathBuf;

use mr_common::{CoordinatorConfig, HeartbeatReply, TaskId, WorkerId};
use tokio::sync::{mpsc, oneshot};

use crate::checkpoint::{load_checkpoint, Checkpointer};
use crate::scheduler::Scheduler;

enum SchedulerEvent {
    Heartbeat {
        worker_id: WorkerId,
        ack: oneshot::Sender<HeartbeatReply>,
    },
    Report {
        task_id: TaskId,
        success: bool,
        ack: oneshot::Sender<()>,
    },
    FailureReport {
        worker_id: WorkerId,
        ack: oneshot::Sender<()>,
    },
    /// Installed by backup failover once it has taken over.
    ReplaceState {
        state: mr_common::CoordinatorState,
    },
}

/// A cheaply-cloneable handle to the running coordinator loop. RPC
/// service implementations hold one of these and never see the
/// `Scheduler` directly.
#[derive(Clone)]
pub struct Coordinator {
    tx: mpsc::Sender<SchedulerEvent>,
}

impl Coordinator {
    /// Starts a fresh job with no prior checkpoint.
    pub fn spawn(config: CoordinatorConfig, input_files: Vec<String>, n_reduce: u32) -> (Self, tokio::task::JoinHandle<()>) {
        let scheduler = Scheduler::new(config.clone(), input_files, n_reduce);
        Self::spawn_with(config, scheduler)
    }

    /// Resumes from a checkpoint on disk if one is present, otherwise
    /// starts fresh — used by `mrcoordinator` on startup for T3+.
    pub async fn from_checkpoint_or_new(
        config: CoordinatorConfig,
        input_files: Vec<String>,
        n_reduce: u32,
    ) -> mr_common::Result<(Self, tokio::task::JoinHandle<()>)> {
        let scheduler = match &config.checkpoint_file {
            Some(path) => match load_checkpoint(path).await? {
                Some(state) => Scheduler::from_state(config.clone(), state, n_reduce),
                None => Scheduler::new(config.clone(), input_files, n_reduce),
            },
            None => Scheduler::new(config.clone(), input_files, n_reduce),
        };
        Ok(Self::spawn_with(config, scheduler))
    }

    fn spawn_with(config: CoordinatorConfig, scheduler: Scheduler) -> (Self, tokio::task::JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(1024);
        let checkpointer = config.checkpoint_file.clone().map(|path| Checkpointer::new(path, config.checkpoint_min_interval));
        let handle = tokio::spawn(run_loop(scheduler, rx, checkpointer, config));
        (Coordinator { tx }, handle)
    }

    pub async fn heartbeat(&self, worker_id: WorkerId) -> HeartbeatReply {
        let (ack, rx) = oneshot::channel();
        let _ = self.tx.send(SchedulerEvent::Heartbeat { worker_id, ack }).await;
        rx.await.unwrap_or_else(|_| HeartbeatReply::wait())
    }

    pub async fn report(&self, task_id: TaskId, success: bool) {
        let (ack, rx) = oneshot::channel();
        let _ = self.tx.send(SchedulerEvent::Report { task_id, success, ack }).await;
        let _ = rx.await;
    }

    pub async fn failure_report(&self, worker_id: WorkerId) {
        let (ack, rx) = oneshot::channel();
        let _ = self.tx.send(SchedulerEvent::FailureReport { worker_id, ack }).await;
        let _ = rx.await;
    }

    /// Installs a state loaded by backup failover. Fire-and-forget:
    /// the loop applies it on its next turn.
    pub async fn replace_state(&self, state: mr_common::CoordinatorState) {
        let _ = self.tx.send(SchedulerEvent::ReplaceState { state }).await;
    }
}

async fn run_loop(
    mut scheduler: Scheduler,
    mut rx: mpsc::Receiver<SchedulerEvent>,
    mut checkpointer: Option<Checkpointer>,
    config: CoordinatorConfig,
) {
    while let Some(event) = rx.recv().await {
        let force_checkpoint = match event {
            SchedulerEvent::Heartbeat { worker_id, ack } => {
                let (reply, phase_transitioned) = scheduler.handle_heartbeat(worker_id);
                let _ = ack.send(reply);
                phase_transitioned
            }
            SchedulerEvent::Report { task_id, success, ack } => {
                scheduler.handle_report(task_id, success);
                let _ = ack.send(());
                config.tier >= mr_common::Tier::Replicated
            }
            SchedulerEvent::FailureReport { worker_id, ack } => {
                scheduler.handle_failure_report(worker_id);
                let _ = ack.send(());
                config.tier >= mr_common::Tier::Replicated
            }
            SchedulerEvent::ReplaceState { state } => {
                let n_reduce = scheduler.n_reduce();
                scheduler = Scheduler::from_state(config.clone(), state, n_reduce);
                true
            }
        };

        if let Some(checkpointer) = checkpointer.as_mut() {
            let state = scheduler.snapshot();
            if let Err(e) = checkpointer.maybe_write(&state, force_checkpoint).await {
                tracing::warn!(error = %e, "checkpoint write failed");
            }
        }

        if scheduler.is_done() {
            tracing::info!("job complete, coordinator loop exiting");
            break;
        }
    }
}

/// Where the checkpoint file lives for a given config, used by the
/// backup coordinator to know what to watch.
pub fn checkpoint_path(config: &CoordinatorConfig) -> Option<PathBuf> {
    config.checkpoint_file.clone()
}
