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

//! Self-describing JSON checkpoints of coordinator state, written
//! atomically via a temp-file rename (spec §6, T3+). Grounded on the
//! teacher's `hummock::model` snapshotting idiom of serializing the
//! in-memory table to a versioned blob, adapted here to a single flat
//! file since there is no versioned compaction history to keep.

use std::path::{Path, PathBuf};
use std::time::Instant;

use mr_common::{CoordinatorState, Error, Result};
use tokio::fs;

/// Rate-limited writer: a write younger than `min_interval` is skipped
/// unless `force` is set, so a pathological heartbeat storm can't turn
/// every RPC into a disk write.
pub struct Checkpointer {
    path: PathBuf,
    min_interval: std::time::Duration,
    last_write: Option<Instant>,
}

impl Checkpointer {
    pub fn new(path: PathBuf, min_interval: std::time::Duration) -> Self {
        Checkpointer {
            path,
            min_interval,
            last_write: None,
        }
    }

    /// Writes `state` unless the rate limit says to skip it. Returns
    /// whether a write actually happened.
    pub async fn maybe_write(&mut self, state: &CoordinatorState, force: bool) -> Result<bool> {
        if !force {
            if let Some(last) = self.last_write {
                if last.elapsed() < self.min_interval {
                    return Ok(false);
                }
            }
        }
        self.write(state).await?;
        Ok(true)
    }

    pub async fn write(&mut self, state: &CoordinatorState) -> Result<()> {
        let data = serde_json::to_vec_pretty(state)
            .map_err(|e| Error::CheckpointIo(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        let tmp = tmp_path(&self.path);
        fs::write(&tmp, &data).await?;
        fs::rename(&tmp, &self.path).await?;
        self.last_write = Some(Instant::now());
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".tmp");
    PathBuf::from(s)
}

/// Loads a checkpoint from disk if present. A missing file is not an
/// error — it just means there is nothing to resume from yet.
pub async fn load_checkpoint(path: &Path) -> Result<Option<CoordinatorState>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mr_common::{Phase, Task};
    use std::collections::HashMap;

    fn sample_state() -> CoordinatorState {
        CoordinatorState {
            tasks: vec![Task::new_idle(0, "a.txt")],
            phase: Phase::Map,
            worker_leases: HashMap::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn write_then_load_round_trips() {
        let dir = std::env::temp_dir().join(format!("mr-ckpt-test-{}", std::process::id()));
        let mut ckpt = Checkpointer::new(dir.clone(), std::time::Duration::ZERO);
        ckpt.write(&sample_state()).await.unwrap();
        let loaded = load_checkpoint(&dir).await.unwrap().unwrap();
        assert_eq!(loaded.tasks.len(), 1);
        let _ = std::fs::remove_file(&dir);
    }

    #[tokio::test]
    async fn missing_checkpoint_file_loads_as_none() {
        let dir = std::env::temp_dir().join("mr-ckpt-test-does-not-exist");
        let _ = std::fs::remove_file(&dir);
        assert!(load_checkpoint(&dir).await.unwrap().is_none());
    }
}
