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

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use mr_common::{HealthEntry, HealthSnapshot, HealthStatus, JobType, WorkerId};

pub fn job_type_to_proto(job_type: JobType) -> mr_pb::JobType {
    match job_type {
        JobType::Map => mr_pb::JobType::Map,
        JobType::Reduce => mr_pb::JobType::Reduce,
        JobType::Wait => mr_pb::JobType::Wait,
        JobType::Complete => mr_pb::JobType::Complete,
    }
}

pub fn job_type_from_proto(job_type: i32) -> JobType {
    match mr_pb::JobType::from_i32(job_type).unwrap_or(mr_pb::JobType::Wait) {
        mr_pb::JobType::Map => JobType::Map,
        mr_pb::JobType::Reduce => JobType::Reduce,
        mr_pb::JobType::Wait => JobType::Wait,
        mr_pb::JobType::Complete => JobType::Complete,
    }
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).single().unwrap_or_else(Utc::now)
}

pub fn health_entry_to_proto(entry: &HealthEntry) -> mr_pb::HealthEntry {
    let status = match entry.status {
        HealthStatus::Alive => mr_pb::HealthStatus::Alive,
        HealthStatus::Suspect => mr_pb::HealthStatus::Suspect,
        HealthStatus::Dead => mr_pb::HealthStatus::Dead,
    };
    mr_pb::HealthEntry {
        status: status as i32,
        last_seen_unix_millis: entry.last_seen.timestamp_millis(),
        suspicion_count: entry.suspicion_count,
        last_update_unix_millis: entry.last_update.timestamp_millis(),
    }
}

pub fn health_entry_from_proto(entry: &mr_pb::HealthEntry) -> HealthEntry {
    let status = match mr_pb::HealthStatus::from_i32(entry.status).unwrap_or(mr_pb::HealthStatus::Alive) {
        mr_pb::HealthStatus::Alive => HealthStatus::Alive,
        mr_pb::HealthStatus::Suspect => HealthStatus::Suspect,
        mr_pb::HealthStatus::Dead => HealthStatus::Dead,
    };
    HealthEntry {
        status,
        last_seen: millis_to_datetime(entry.last_seen_unix_millis),
        suspicion_count: entry.suspicion_count,
        last_update: millis_to_datetime(entry.last_update_unix_millis),
    }
}

pub fn health_table_to_proto(table: &HealthSnapshot) -> HashMap<u64, mr_pb::HealthEntry> {
    table
        .iter()
        .map(|(id, entry)| (*id, health_entry_to_proto(entry)))
        .collect()
}

pub fn health_table_from_proto(table: &HashMap<u64, mr_pb::HealthEntry>) -> HealthSnapshot {
    table
        .iter()
        .map(|(id, entry)| (*id as WorkerId, health_entry_from_proto(entry)))
        .collect()
}
