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

//! The per-worker view of cluster liveness (spec §4.4). Grounded on
//! the original's `HealthTable`: a `Mutex`-guarded map with
//! `Update`/`Get`/`GetAll`/`Merge`, ported here onto a `tokio::sync::RwLock`
//! since reads (a full `GetAll` snapshot taken every gossip round) vastly
//! outnumber writes.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use mr_common::{HealthEntry, HealthSnapshot, HealthStatus, WorkerId};
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct HealthTable {
    inner: Arc<RwLock<HashMap<WorkerId, HealthEntry>>>,
}

impl HealthTable {
    pub fn new() -> Self {
        HealthTable::default()
    }

    /// Builds a table pre-seeded with a set of peers as `Alive`, for a
    /// worker's startup view of the cluster (spec §4.5).
    pub fn seeded_alive(peers: &[WorkerId], now: chrono::DateTime<Utc>) -> Self {
        let table = peers.iter().map(|id| (*id, HealthEntry::alive_now(now))).collect();
        HealthTable { inner: Arc::new(RwLock::new(table)) }
    }

    pub async fn update(&self, worker_id: WorkerId, entry: HealthEntry) {
        self.inner.write().await.insert(worker_id, entry);
    }

    pub async fn get(&self, worker_id: WorkerId) -> Option<HealthEntry> {
        self.inner.read().await.get(&worker_id).cloned()
    }

    pub async fn get_all(&self) -> HealthSnapshot {
        self.inner.read().await.clone()
    }

    /// Last-writer-wins merge of a peer's table into ours (spec P6):
    /// a strictly newer `last_update` replaces our entry outright
    /// (unless ours is already `Dead`, which is terminal and is never
    /// downgraded); otherwise a higher `suspicion_count` still
    /// ratchets ours up, and a peer's `Suspect` verdict can promote
    /// our `Alive` entry even when our copy is nominally fresher.
    pub async fn merge(&self, other: &HealthSnapshot) {
        let mut table = self.inner.write().await;
        let now = Utc::now();
        for (worker_id, incoming) in other {
            if *worker_id == mr_common::NO_WORKER {
                continue;
            }
            match table.get_mut(worker_id) {
                None => {
                    table.insert(
                        *worker_id,
                        HealthEntry {
                            status: incoming.status,
                            last_seen: incoming.last_seen,
                            suspicion_count: incoming.suspicion_count,
                            last_update: now,
                        },
                    );
                }
                Some(existing) if existing.status == HealthStatus::Dead => {
                    if incoming.suspicion_count > existing.suspicion_count {
                        existing.suspicion_count = incoming.suspicion_count;
                    }
                }
                Some(existing) if incoming.last_update > existing.last_update => {
                    *existing = HealthEntry {
                        status: incoming.status,
                        last_seen: incoming.last_seen,
                        suspicion_count: incoming.suspicion_count,
                        last_update: now,
                    };
                }
                Some(existing) => {
                    if incoming.suspicion_count > existing.suspicion_count {
                        existing.suspicion_count = incoming.suspicion_count;
                        if incoming.status == HealthStatus::Suspect && existing.status == HealthStatus::Alive {
                            existing.status = HealthStatus::Suspect;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn newer_entry_replaces_stale_one_outright() {
        let table = HealthTable::new();
        let old = Utc::now();
        table
            .update(1, HealthEntry { status: HealthStatus::Alive, last_seen: old, suspicion_count: 0, last_update: old })
            .await;

        let newer = old + chrono::Duration::seconds(1);
        let mut incoming = HashMap::new();
        incoming.insert(1, HealthEntry { status: HealthStatus::Suspect, last_seen: newer, suspicion_count: 2, last_update: newer });
        table.merge(&incoming).await;

        let entry = table.get(1).await.unwrap();
        assert_eq!(entry.status, HealthStatus::Suspect);
        assert_eq!(entry.suspicion_count, 2);
    }

    #[tokio::test]
    async fn stale_but_higher_suspicion_still_ratchets_count_and_can_promote_status() {
        let table = HealthTable::new();
        let now = Utc::now();
        table
            .update(1, HealthEntry { status: HealthStatus::Alive, last_seen: now, suspicion_count: 0, last_update: now })
            .await;

        let older = now - chrono::Duration::seconds(1);
        let mut incoming = HashMap::new();
        incoming.insert(1, HealthEntry { status: HealthStatus::Suspect, last_seen: older, suspicion_count: 5, last_update: older });
        table.merge(&incoming).await;

        let entry = table.get(1).await.unwrap();
        assert_eq!(entry.suspicion_count, 5);
        assert_eq!(entry.status, HealthStatus::Suspect);
    }

    #[tokio::test]
    async fn worker_zero_is_never_merged() {
        let table = HealthTable::new();
        let now = Utc::now();
        let mut incoming = HashMap::new();
        incoming.insert(mr_common::NO_WORKER, HealthEntry { status: HealthStatus::Dead, last_seen: now, suspicion_count: 9, last_update: now });
        table.merge(&incoming).await;
        assert!(table.get(mr_common::NO_WORKER).await.is_none());
    }

    #[tokio::test]
    async fn dead_entry_is_never_downgraded_by_a_newer_alive_report() {
        let table = HealthTable::new();
        let now = Utc::now();
        table
            .update(1, HealthEntry { status: HealthStatus::Dead, last_seen: now, suspicion_count: 3, last_update: now })
            .await;

        let newer = now + chrono::Duration::seconds(5);
        let mut incoming = HashMap::new();
        incoming.insert(1, HealthEntry { status: HealthStatus::Alive, last_seen: newer, suspicion_count: 0, last_update: newer });
        table.merge(&incoming).await;

        assert_eq!(table.get(1).await.unwrap().status, HealthStatus::Dead);
    }
}
