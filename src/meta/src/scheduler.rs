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

//! The task table and the scheduling decisions made against it:
//! assignment, timeout detection, speculative backups and phase
//! transitions (spec §3, §4.1–§4.2). Every mutation goes through
//! `Scheduler`, which owns the table outright — there is no lock here,
//! only a single caller (the event loop in `coordinator.rs`).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use mr_common::{
    CoordinatorConfig, CoordinatorState, HeartbeatReply, JobType, Phase, Task, TaskId, TaskStatus,
    Tier, WorkerId, NO_WORKER,
};

/// The task table plus whatever bookkeeping the fault-tolerance tier
/// needs on top of it.
pub struct Scheduler {
    config: CoordinatorConfig,
    phase: Phase,
    tasks: Vec<Task>,
    n_reduce: u32,
    worker_leases: HashMap<WorkerId, DateTime<Utc>>,
    done: bool,
}

impl Scheduler {
    pub fn new(config: CoordinatorConfig, input_files: Vec<String>, n_reduce: u32) -> Self {
        let tasks = input_files
            .into_iter()
            .enumerate()
            .map(|(i, f)| Task::new_idle(i as TaskId, f))
            .collect();
        Scheduler {
            config,
            phase: Phase::Map,
            tasks,
            n_reduce,
            worker_leases: HashMap::new(),
            done: false,
        }
    }

    /// Rehydrates a scheduler from a loaded checkpoint (spec §6, T3+).
    pub fn from_state(config: CoordinatorConfig, state: CoordinatorState, n_reduce: u32) -> Self {
        let done = state.phase == Phase::Reduce && state.tasks.iter().all(|t| t.status == TaskStatus::Done);
        Scheduler {
            config,
            phase: state.phase,
            tasks: state.tasks,
            n_reduce,
            worker_leases: state.worker_leases,
            done,
        }
    }

    pub fn snapshot(&self) -> CoordinatorState {
        CoordinatorState {
            tasks: self.tasks.clone(),
            phase: self.phase,
            worker_leases: self.worker_leases.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn tier(&self) -> Tier {
        self.config.tier
    }

    pub fn n_reduce(&self) -> u32 {
        self.n_reduce
    }

    /// Entry point for a worker's heartbeat: refresh its lease, then
    /// decide what to hand it (spec §4.1). Returns the reply plus
    /// whether the caller should force an out-of-band checkpoint
    /// because this heartbeat just advanced the task's phase.
    pub fn handle_heartbeat(&mut self, worker_id: WorkerId) -> (HeartbeatReply, bool) {
        self.update_worker_lease(worker_id);

        if self.done {
            return (HeartbeatReply::complete(), false);
        }

        let (task_assigned, tasks_in_progress, reply) = self.assign_task(worker_id);

        let (final_reply, phase_transitioned) = if tasks_in_progress && !task_assigned {
            (HeartbeatReply::wait(), false)
        } else if !tasks_in_progress && self.phase == Phase::Map {
            self.advance_phase(Phase::Reduce);
            let (assigned_again, _, reply_again) = self.assign_task(worker_id);
            let r = if assigned_again { reply_again.unwrap() } else { HeartbeatReply::wait() };
            (r, true)
        } else if !tasks_in_progress && self.phase == Phase::Reduce {
            self.done = true;
            (HeartbeatReply::complete(), false)
        } else {
            (reply.unwrap(), false)
        };

        if self.config.tier >= Tier::Speculative {
            self.mark_speculative_duplicates();
        }

        (final_reply, phase_transitioned)
    }

    fn update_worker_lease(&mut self, worker_id: WorkerId) {
        self.worker_leases.insert(worker_id, Utc::now());
    }

    fn advance_phase(&mut self, next: Phase) {
        let n_reduce = self.n_reduce;
        self.phase = next;
        self.tasks = match next {
            Phase::Reduce => (0..n_reduce as TaskId)
                .map(|i| Task::new_idle(i, format!("reduce-{i}")))
                .collect(),
            Phase::Map => unreachable!("phase only ever advances forward"),
        };
    }

    /// Scans the task table once, in order, and returns the first
    /// actionable decision: `Idle` tasks are claimed immediately; an
    /// `InProgress` task that has run past `task_timeout` either gets
    /// a speculative backup marker (Tier >= Speculative, no backup
    /// outstanding yet) or is rewound and reassigned to whichever
    /// worker is calling right now — no check that this caller differs
    /// from the task's current owner, matching the original's
    /// `assignTask`. `tasks_in_progress` reports whether any task was
    /// seen in flight, so the caller can tell "everyone is waiting on
    /// work still running" from "the phase is exhausted".
    fn assign_task(&mut self, worker_id: WorkerId) -> (bool, bool, Option<HeartbeatReply>) {
        let timeout = self.config.task_timeout;
        let now = Utc::now();
        let mut tasks_in_progress = false;

        for task in self.tasks.iter_mut() {
            match task.status {
                TaskStatus::Idle => {
                    let reply = start_task(task, worker_id, self.phase, self.n_reduce);
                    return (true, true, Some(reply));
                }
                TaskStatus::InProgress => {
                    tasks_in_progress = true;
                    let timed_out = task
                        .start_time
                        .map(|start| now.signed_duration_since(start).to_std().unwrap_or_default() > timeout)
                        .unwrap_or(false);
                    if !timed_out {
                        continue;
                    }
                    if self.config.tier >= Tier::Speculative && !task.has_backup() {
                        task.backup_tasks.push(task.id);
                        return (false, true, None);
                    }
                    let reply = start_task(task, worker_id, self.phase, self.n_reduce);
                    return (true, true, Some(reply));
                }
                TaskStatus::Done => {}
            }
        }

        (false, tasks_in_progress, None)
    }

    /// After every heartbeat (Tier >= Speculative), if the fraction of
    /// `Done` tasks in the current phase has crossed
    /// `speculative_threshold`, every remaining `InProgress` task with
    /// no outstanding backup is marked for speculative duplication —
    /// independent of, and in addition to, the per-task timeout check
    /// in `assign_task`. Grounded on the original's
    /// `checkSpeculativeExecution`.
    fn mark_speculative_duplicates(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        let done = self.tasks.iter().filter(|t| t.status == TaskStatus::Done).count();
        let ratio = done as f64 / self.tasks.len() as f64;
        if ratio < self.config.speculative_threshold {
            return;
        }
        for task in self.tasks.iter_mut() {
            if task.status == TaskStatus::InProgress && !task.has_backup() {
                task.backup_tasks.push(task.id);
            }
        }
    }

    /// A worker reports the outcome of a task it was assigned (spec
    /// §4.3). Stale reports (task already `Done`, or a task id the
    /// table doesn't have) are ignored rather than causing a panic —
    /// unlike the Go original's unchecked slice index, this never
    /// trusts the caller's task id.
    ///
    /// Returns whether the task was found and still live (a stale or
    /// unknown id is a no-op that returns `false`).
    pub fn handle_report(&mut self, task_id: TaskId, success: bool) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) else {
            return false;
        };
        if task.status == TaskStatus::Done {
            return false;
        }
        if success {
            task.status = TaskStatus::Done;
            task.backup_tasks.clear();
        } else {
            // The original leaves stale backup markers in place on a
            // failed report; only a worker-failure verdict clears them.
            task.status = TaskStatus::Idle;
            task.worker_id = NO_WORKER;
            task.start_time = None;
        }
        true
    }

    /// A worker (or the gossip health table) has declared `worker_id`
    /// dead (spec §4.4, P5). Any task it was holding goes back to
    /// `Idle` so it can be reassigned.
    pub fn handle_failure_report(&mut self, worker_id: WorkerId) -> bool {
        let mut changed = false;
        for task in self.tasks.iter_mut() {
            if task.status == TaskStatus::InProgress && task.worker_id == worker_id {
                task.status = TaskStatus::Idle;
                task.worker_id = NO_WORKER;
                task.start_time = None;
                task.backup_tasks.clear();
                changed = true;
            }
        }
        self.worker_leases.remove(&worker_id);
        changed
    }
}

fn start_task(task: &mut Task, worker_id: WorkerId, phase: Phase, n_reduce: u32) -> HeartbeatReply {
    task.status = TaskStatus::InProgress;
    task.worker_id = worker_id;
    task.start_time = Some(Utc::now());
    // Deliberately does not clear `backup_tasks`: the original's
    // `startTask` doesn't either, so a row that already has a backup
    // marker stays flagged across reassignment until it succeeds or a
    // worker-failure verdict clears it.

    HeartbeatReply {
        job_type: match phase {
            Phase::Map => JobType::Map,
            Phase::Reduce => JobType::Reduce,
        },
        task_id: task.id,
        file_name: task.file_name.clone(),
        n_reduce,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(tier: Tier) -> CoordinatorConfig {
        CoordinatorConfig::for_tier(tier)
    }

    #[test]
    fn first_heartbeat_assigns_a_map_task() {
        let mut s = Scheduler::new(cfg(Tier::NoFaultTolerance), vec!["a.txt".into()], 2);
        let (reply, _) = s.handle_heartbeat(1);
        assert_eq!(reply.job_type, JobType::Map);
        assert_eq!(reply.file_name, "a.txt");
    }

    #[test]
    fn exhausted_map_phase_transitions_to_reduce() {
        let mut s = Scheduler::new(cfg(Tier::NoFaultTolerance), vec!["a.txt".into()], 2);
        let (reply, _) = s.handle_heartbeat(1);
        assert_eq!(reply.task_id, 0);
        s.handle_report(0, true);

        // The heartbeat that notices the map phase is exhausted also
        // carries out the phase transition and immediately tries to
        // assign from the freshly-created reduce tasks in the same
        // round, matching the original's `initReducePhase` followed by
        // an unconditional re-`assignTask` call.
        let (reply, transitioned) = s.handle_heartbeat(1);
        assert!(transitioned);
        assert_eq!(reply.job_type, JobType::Reduce);
    }

    #[test]
    fn all_tasks_done_reports_complete() {
        let mut s = Scheduler::new(cfg(Tier::NoFaultTolerance), vec![], 0);
        let (reply, _) = s.handle_heartbeat(1);
        assert_eq!(reply.job_type, JobType::Wait);
        let (reply, _) = s.handle_heartbeat(1);
        assert_eq!(reply.job_type, JobType::Complete);
        assert!(s.is_done());
    }

    #[test]
    fn stalled_task_gets_backup_marker_then_is_reclaimed_by_any_caller() {
        let mut config = cfg(Tier::Speculative);
        config.task_timeout = chrono::Duration::zero().to_std().unwrap();
        let mut s = Scheduler::new(config, vec!["a.txt".into()], 1);
        let (reply, _) = s.handle_heartbeat(1);
        assert_eq!(reply.job_type, JobType::Map);

        // The next heartbeat to see the stalled task — even from the
        // same worker that is holding it — only marks a backup and
        // replies Wait; it is not handed the row again this round.
        let (reply, _) = s.handle_heartbeat(1);
        assert_eq!(reply.job_type, JobType::Wait);
        assert!(s.tasks[0].has_backup());

        // With a backup already outstanding, the very next heartbeat —
        // here from the same worker id again — reclaims the row
        // unconditionally, matching the original's `startTask` call
        // with no same-caller exclusion.
        let (reply, _) = s.handle_heartbeat(1);
        assert_eq!(reply.job_type, JobType::Map);
        assert_eq!(s.tasks[0].worker_id, 1);
    }

    #[test]
    fn speculative_threshold_marks_every_lagging_task_once_crossed() {
        let mut config = cfg(Tier::Speculative);
        config.speculative_threshold = 0.5;
        let mut s = Scheduler::new(config, vec!["a.txt".into(), "b.txt".into()], 1);

        let (r1, _) = s.handle_heartbeat(1);
        assert_eq!(r1.task_id, 0);
        let (r2, _) = s.handle_heartbeat(2);
        assert_eq!(r2.task_id, 1);

        // One of two tasks finishes: 1/2 done crosses the 0.5 threshold,
        // so the other (still InProgress, no backup yet) gets marked.
        s.handle_report(0, true);
        s.handle_heartbeat(1);
        assert!(s.tasks[1].has_backup());
    }

    #[test]
    fn invalid_report_task_id_is_ignored_not_panicking() {
        let mut s = Scheduler::new(cfg(Tier::NoFaultTolerance), vec!["a.txt".into()], 1);
        s.handle_heartbeat(1);
        assert!(!s.handle_report(999, true));
    }

    #[test]
    fn failure_report_frees_the_worker_s_task() {
        let mut s = Scheduler::new(cfg(Tier::Speculative), vec!["a.txt".into()], 1);
        s.handle_heartbeat(1);
        assert!(s.handle_failure_report(1));
        assert_eq!(s.tasks[0].status, TaskStatus::Idle);
        assert_eq!(s.tasks[0].worker_id, NO_WORKER);
    }
}
