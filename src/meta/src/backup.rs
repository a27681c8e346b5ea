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

//! Backup-coordinator failover (spec §4.5, T3+). A standby polls the
//! checkpoint file's mtime; once it has gone stale past the lease
//! timeout, the standby loads the last checkpoint and takes over as
//! primary. This deliberately keeps the original's file-mtime lease
//! instead of the teacher's etcd-backed `ElectionClient` — the spec's
//! failover model is the simpler single-file scheme, not a quorum
//! election (see DESIGN.md).

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mr_common::CoordinatorState;
use tokio::sync::watch;
use tokio::time;

use crate::checkpoint::load_checkpoint;

/// Polls a checkpoint file's mtime and reports a loaded state once the
/// primary is presumed dead. `active` flips once and stays flipped —
/// a standby only ever takes over once per process lifetime.
pub struct BackupMonitor {
    checkpoint_file: PathBuf,
    lease_timeout: Duration,
    poll_interval: Duration,
    active: Arc<AtomicBool>,
}

impl BackupMonitor {
    pub fn new(checkpoint_file: PathBuf, lease_timeout: Duration, poll_interval: Duration) -> Self {
        BackupMonitor {
            checkpoint_file,
            lease_timeout,
            poll_interval,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Runs until the primary's lease is observed expired, then
    /// returns the state to resume from. Bails out early if `shutdown`
    /// fires first.
    pub async fn monitor(&self, mut shutdown: watch::Receiver<()>) -> Option<CoordinatorState> {
        let mut ticker = time::interval(self.poll_interval);
        loop {
            tokio::select! {
                _ = shutdown.changed() => return None,
                _ = ticker.tick() => {
                    if self.check_primary_failure().await {
                        return self.failover().await;
                    }
                }
            }
        }
    }

    async fn check_primary_failure(&self) -> bool {
        match tokio::fs::metadata(&self.checkpoint_file).await {
            Ok(meta) => match meta.modified() {
                Ok(modified) => modified.elapsed().unwrap_or_default() > self.lease_timeout,
                Err(_) => false,
            },
            Err(_) => false,
        }
    }

    async fn failover(&self) -> Option<CoordinatorState> {
        if self.active.swap(true, Ordering::SeqCst) {
            return None;
        }
        match load_checkpoint(&self.checkpoint_file).await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, "backup failover could not load checkpoint");
                self.active.store(false, Ordering::SeqCst);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mr_common::{Phase, Task};
    use std::collections::HashMap;

    #[tokio::test]
    async fn stale_checkpoint_triggers_failover_with_loaded_state() {
        let path = std::env::temp_dir().join(format!("mr-backup-test-{}", std::process::id()));
        let state = CoordinatorState {
            tasks: vec![Task::new_idle(0, "a.txt")],
            phase: Phase::Map,
            worker_leases: HashMap::new(),
            timestamp: chrono::Utc::now(),
        };
        tokio::fs::write(&path, serde_json::to_vec(&state).unwrap()).await.unwrap();

        let monitor = BackupMonitor::new(path.clone(), Duration::from_millis(0), Duration::from_millis(1));
        let (_tx, rx) = watch::channel(());
        let loaded = monitor.monitor(rx).await;
        assert!(loaded.is_some());
        assert!(monitor.is_active());
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn shutdown_signal_stops_monitoring_without_failover() {
        let path = std::env::temp_dir().join("mr-backup-test-missing");
        let _ = tokio::fs::remove_file(&path).await;
        let monitor = BackupMonitor::new(path, Duration::from_secs(5), Duration::from_millis(1));
        let (tx, rx) = watch::channel(());
        drop(tx);
        let loaded = monitor.monitor(rx).await;
        assert!(loaded.is_none());
        assert!(!monitor.is_active());
    }
}
