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

use tokio::sync::watch;

/// A broadcast-style shutdown signal shared by every `tonic` server a
/// binary runs, mirroring the `watch::channel` the teacher's meta
/// server uses to tear down leader/follower services together
/// (`meta/src/rpc/server.rs`).
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: watch::Sender<()>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(());
        ShutdownHandle { tx }
    }

    /// Signal every subscriber to stop. Idempotent — a second call is a
    /// no-op once all receivers have dropped.
    pub fn shutdown(&self) {
        let _ = self.tx.send(());
    }

    pub fn subscribe(&self) -> watch::Receiver<()> {
        self.tx.subscribe()
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}
