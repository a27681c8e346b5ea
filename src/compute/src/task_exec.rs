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

//! Executes one map or reduce task against files on disk (spec §2,
//! §4.1). The `key`/`value` transformation itself is user-supplied —
//! this module only owns the intermediate-file bucketing, the
//! hash-partitioning, and the atomic rename-into-place that the
//! original's `doMapTask`/`doReduceTask` perform around it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

/// A user-supplied map function, analogous to the Go original's
/// `func(string, string) []KeyValue`.
pub trait MapFn: Send + Sync {
    fn map(&self, file_name: &str, contents: &str) -> Vec<KeyValue>;
}

/// A user-supplied reduce function, analogous to `func(string, []string) string`.
pub trait ReduceFn: Send + Sync {
    fn reduce(&self, key: &str, values: &[String]) -> String;
}

impl<F: Fn(&str, &str) -> Vec<KeyValue> + Send + Sync> MapFn for F {
    fn map(&self, file_name: &str, contents: &str) -> Vec<KeyValue> {
        self(file_name, contents)
    }
}

impl<F: Fn(&str, &[String]) -> String + Send + Sync> ReduceFn for F {
    fn reduce(&self, key: &str, values: &[String]) -> String {
        self(key, values)
    }
}

/// FNV-1a, matching the original's `ihash` partitioner bit for bit so
/// a given key always lands in the same reduce bucket.
pub fn ihash(key: &str) -> u32 {
    const OFFSET_BASIS: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;
    let mut hash = OFFSET_BASIS;
    for byte in key.as_bytes() {
        hash ^= *byte as u32;
        hash = hash.wrapping_mul(PRIME);
    }
    hash & 0x7fff_ffff
}

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Runs a map task: reads `file_name`, partitions the key-value pairs
/// produced by `map_fn` into `n_reduce` buckets by `ihash(key) %
/// n_reduce`, and writes each bucket atomically to `mr-<task_id>-<i>`.
pub fn run_map_task(map_fn: &dyn MapFn, task_id: u64, file_name: &str, n_reduce: u32, dir: &Path) -> Result<(), ExecError> {
    let contents = std::fs::read_to_string(file_name)?;
    let kvs = map_fn.map(file_name, &contents);

    let mut buckets: Vec<Vec<u8>> = vec![Vec::new(); n_reduce as usize];
    for kv in &kvs {
        let bucket = (ihash(&kv.key) % n_reduce) as usize;
        serde_json::to_writer(&mut buckets[bucket], kv)?;
        buckets[bucket].push(b'\n');
    }

    for (i, data) in buckets.into_iter().enumerate() {
        let final_path = dir.join(format!("mr-{task_id}-{i}"));
        atomic_write(&final_path, &data)?;
    }

    Ok(())
}

/// Runs a reduce task for bucket `reduce_id`: globs every
/// `mr-<task>-<reduce_id>` intermediate file written during the map
/// phase, groups values by key, and writes `mr-out-<reduce_id>` with
/// one `reduceFn`-summarized line per key in sorted order.
///
/// Scans the directory rather than iterating a known map-task count,
/// since by the time any reduce task runs the map phase is complete
/// but its task count isn't otherwise threaded through the heartbeat
/// reply (matching the original's `filepath.Glob`-based discovery).
pub fn run_reduce_task(reduce_fn: &dyn ReduceFn, reduce_id: u64, dir: &Path) -> Result<(), ExecError> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let suffix = format!("-{reduce_id}");
    let mut intermediate_paths = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if let Some(rest) = name.strip_prefix("mr-") {
            if rest.ends_with(&suffix) && rest[..rest.len() - suffix.len()].parse::<u64>().is_ok() {
                intermediate_paths.push(entry.path());
            }
        }
    }

    for path in &intermediate_paths {
        let contents = std::fs::read_to_string(path)?;
        for line in contents.lines() {
            if line.is_empty() {
                continue;
            }
            let kv: KeyValue = serde_json::from_str(line)?;
            grouped.entry(kv.key).or_default().push(kv.value);
        }
    }

    let mut out = String::new();
    for (key, values) in &grouped {
        let summary = reduce_fn.reduce(key, values);
        out.push_str(&format!("{key} {summary}\n"));
    }

    let final_path = dir.join(format!("mr-out-{reduce_id}"));
    atomic_write(&final_path, out.as_bytes())?;

    for path in intermediate_paths {
        let _ = std::fs::remove_file(path);
    }

    Ok(())
}

fn atomic_write(final_path: &Path, data: &[u8]) -> std::io::Result<()> {
    let tmp_path: PathBuf = {
        let mut s = final_path.as_os_str().to_owned();
        s.push(".tmp");
        PathBuf::from(s)
    };
    std::fs::write(&tmp_path, data)?;
    std::fs::rename(&tmp_path, final_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn split_map(_file: &str, contents: &str) -> Vec<KeyValue> {
        contents.split_whitespace().map(|w| KeyValue { key: w.to_string(), value: "1".to_string() }).collect()
    }

    fn count_reduce(_key: &str, values: &[String]) -> String {
        values.len().to_string()
    }

    #[test]
    fn ihash_is_deterministic_and_stays_within_range() {
        assert_eq!(ihash("hello"), ihash("hello"));
        assert!(ihash("hello") < 0x8000_0000);
    }

    #[test]
    fn map_then_reduce_round_trip_counts_words() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.txt");
        std::fs::write(&input, "foo bar foo").unwrap();

        run_map_task(&split_map, 0, input.to_str().unwrap(), 2, dir.path()).unwrap();

        for i in 0..2u64 {
            let _ = run_reduce_task(&count_reduce, i, dir.path());
        }

        let mut total = String::new();
        for i in 0..2u64 {
            let p = dir.path().join(format!("mr-out-{i}"));
            if let Ok(s) = std::fs::read_to_string(p) {
                total.push_str(&s);
            }
        }
        assert!(total.contains("foo 2"));
        assert!(total.contains("bar 1"));
    }
}
