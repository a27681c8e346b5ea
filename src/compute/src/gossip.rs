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

//! The push-pull gossip protocol itself (spec §4.4, T4): periodic
//! rounds against a random fanout of neighbors, a separate suspicion
//! checker promoting stale entries to `Dead`, and a callback into the
//! coordinator once consensus is reached. Ported from the original's
//! `GossipProtocol`, splitting its two goroutines into two tokio tasks
//! joined by one shutdown channel.

use std::sync::Arc;

use chrono::Utc;
use mr_common::{config::timing, HealthEntry, HealthStatus, WorkerId};
use mr_rpc_client::GossipClient;
use rand::seq::SliceRandom;
use tokio::sync::watch;
use tokio::time;

use crate::health_table::HealthTable;

/// Invoked once a peer's suspicion count crosses the consensus
/// threshold, to let the worker relay the verdict to the coordinator
/// via `FailureReport`.
#[async_trait::async_trait]
pub trait FailureSink: Send + Sync {
    async fn report_worker_failure(&self, worker_id: WorkerId);
}

pub struct GossipEngine {
    worker_id: WorkerId,
    neighbors: Vec<WorkerId>,
    health: HealthTable,
    peer_addrs: std::collections::HashMap<WorkerId, String>,
    failure_sink: Arc<dyn FailureSink>,
}

impl GossipEngine {
    pub fn new(
        worker_id: WorkerId,
        all_workers: &[WorkerId],
        peer_addrs: std::collections::HashMap<WorkerId, String>,
        failure_sink: Arc<dyn FailureSink>,
    ) -> Self {
        let peers: Vec<WorkerId> = all_workers.iter().copied().filter(|id| *id != worker_id).collect();
        let health = HealthTable::seeded_alive(&peers, Utc::now());
        let neighbors = select_neighbors(worker_id, all_workers, timing::GOSSIP_FANOUT);
        GossipEngine {
            worker_id,
            neighbors,
            health,
            peer_addrs,
            failure_sink,
        }
    }

    pub fn health_table(&self) -> HealthTable {
        self.health.clone()
    }

    /// Spawns the gossip round task and the suspicion-checker task.
    /// Both stop once `shutdown` fires, mirroring `Stop()` closing the
    /// original's `stopChan`.
    pub fn start(self: Arc<Self>, mut shutdown: watch::Receiver<()>) -> (tokio::task::JoinHandle<()>, tokio::task::JoinHandle<()>) {
        let gossip = self.clone();
        let mut gossip_shutdown = shutdown.clone();
        let gossip_handle = tokio::spawn(async move {
            let mut ticker = time::interval(timing::GOSSIP_INTERVAL);
            loop {
                tokio::select! {
                    _ = gossip_shutdown.changed() => return,
                    _ = ticker.tick() => gossip.send_gossip().await,
                }
            }
        });

        let checker = self;
        let checker_handle = tokio::spawn(async move {
            let mut ticker = time::interval(timing::SUSPICION_TIMEOUT);
            loop {
                tokio::select! {
                    _ = shutdown.changed() => return,
                    _ = ticker.tick() => checker.check_suspicions().await,
                }
            }
        });

        (gossip_handle, checker_handle)
    }

    /// Fans out to every neighbor concurrently (spec §4.5 step 2, §5:
    /// "every gossip round fans out to k neighbors in parallel"),
    /// mirroring the original's one-goroutine-per-neighbor round.
    async fn send_gossip(&self) {
        let table = self.health.get_all().await;
        let round = self.neighbors.iter().filter_map(|neighbor_id| {
            let addr = self.peer_addrs.get(neighbor_id)?;
            Some(self.gossip_neighbor(*neighbor_id, addr.clone(), table.clone()))
        });
        futures::future::join_all(round).await;
    }

    async fn gossip_neighbor(&self, neighbor_id: WorkerId, addr: String, table: mr_common::HealthSnapshot) {
        match self.gossip_once(&addr, table).await {
            Ok(peer_table) => {
                self.health.merge(&peer_table).await;
                self.health.update(neighbor_id, HealthEntry::alive_now(Utc::now())).await;
            }
            Err(_) => self.mark_unreachable(neighbor_id).await,
        }
    }

    async fn gossip_once(
        &self,
        addr: &str,
        table: mr_common::HealthSnapshot,
    ) -> anyhow::Result<mr_common::HealthSnapshot> {
        let mut client = GossipClient::connect(addr.to_string()).await?;
        let reply = client.gossip(self.worker_id, &table).await?;
        Ok(reply)
    }

    async fn mark_unreachable(&self, neighbor_id: WorkerId) {
        let now = Utc::now();
        match self.health.get(neighbor_id).await {
            None => (),
            Some(mut entry) => {
                if entry.status == HealthStatus::Alive {
                    entry.status = HealthStatus::Suspect;
                    entry.suspicion_count = 1;
                } else {
                    entry.suspicion_count += 1;
                }
                entry.last_update = now;
                self.health.update(neighbor_id, entry).await;
            }
        }
    }

    async fn check_suspicions(&self) {
        for (worker_id, entry) in self.health.get_all().await {
            if entry.status == HealthStatus::Dead {
                continue;
            }
            if matches!(entry.status, HealthStatus::Suspect) && entry.suspicion_count >= timing::CONSENSUS_THRESHOLD {
                let mut dead = entry;
                dead.status = HealthStatus::Dead;
                dead.last_update = Utc::now();
                self.health.update(worker_id, dead).await;
                self.failure_sink.report_worker_failure(worker_id).await;
            }
        }
    }
}

fn select_neighbors(worker_id: WorkerId, all_workers: &[WorkerId], fanout: usize) -> Vec<WorkerId> {
    let mut candidates: Vec<WorkerId> = all_workers.iter().copied().filter(|w| *w != worker_id).collect();
    candidates.shuffle(&mut rand::thread_rng());
    candidates.truncate(fanout.min(candidates.len()));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_neighbors_excludes_self_and_respects_fanout() {
        let all = vec![1, 2, 3, 4, 5];
        let neighbors = select_neighbors(1, &all, 3);
        assert_eq!(neighbors.len(), 3);
        assert!(!neighbors.contains(&1));
    }

    struct NoopSink;
    #[async_trait::async_trait]
    impl FailureSink for NoopSink {
        async fn report_worker_failure(&self, _worker_id: WorkerId) {}
    }

    #[tokio::test]
    async fn suspicion_past_threshold_promotes_to_dead_and_reports() {
        use std::sync::atomic::{AtomicBool, Ordering};

        struct FlagSink(Arc<AtomicBool>);
        #[async_trait::async_trait]
        impl FailureSink for FlagSink {
            async fn report_worker_failure(&self, _worker_id: WorkerId) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let flag = Arc::new(AtomicBool::new(false));
        let engine = GossipEngine::new(1, &[1, 2], std::collections::HashMap::new(), Arc::new(FlagSink(flag.clone())));
        let now = Utc::now();
        engine
            .health
            .update(2, HealthEntry { status: HealthStatus::Suspect, last_seen: now, suspicion_count: 3, last_update: now })
            .await;
        engine.check_suspicions().await;

        assert!(flag.load(Ordering::SeqCst));
        assert_eq!(engine.health.get(2).await.unwrap().status, HealthStatus::Dead);
    }

    #[tokio::test]
    async fn unreachable_neighbor_escalates_from_alive_to_suspect() {
        let engine = GossipEngine::new(1, &[1, 2], std::collections::HashMap::new(), Arc::new(NoopSink));
        engine.health.update(2, HealthEntry::alive_now(Utc::now())).await;
        engine.mark_unreachable(2).await;
        let entry = engine.health.get(2).await.unwrap();
        assert_eq!(entry.status, HealthStatus::Suspect);
        assert_eq!(entry.suspicion_count, 1);
    }
}
