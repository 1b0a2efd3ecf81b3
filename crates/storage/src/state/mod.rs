// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store contents: the job queue, build log records, per-branch
//! watermarks, and agent heartbeats.
//!
//! Every mutation the store offers is a method here, so the in-memory
//! and file-backed stores share one implementation and differ only in
//! how they hold and persist the state.

mod build_logs;
mod fields;
mod jobs;

use std::collections::BTreeMap;

use forge_core::{BuildJob, BuildLogId, BuildLogRecord, JobId};
use serde::{Deserialize, Serialize};

pub use jobs::CiJobQuery;

/// Everything a store holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    #[serde(default)]
    pub jobs: BTreeMap<JobId, BuildJob>,
    #[serde(default)]
    pub build_logs: BTreeMap<BuildLogId, BuildLogRecord>,
    /// branch -> key -> changelist
    #[serde(default)]
    pub watermarks: BTreeMap<String, BTreeMap<String, i64>>,
    /// machine -> last heartbeat (epoch ms)
    #[serde(default)]
    pub heartbeats: BTreeMap<String, u64>,
    #[serde(default)]
    next_job_id: i64,
    #[serde(default)]
    next_build_log_id: i64,
}

impl StoreState {
    /// Watermark for `branch`, zero when never written.
    pub fn watermark(&self, branch: &str, key: &str) -> i64 {
        self.watermarks.get(branch).and_then(|keys| keys.get(key)).copied().unwrap_or(0)
    }

    pub fn set_watermark(&mut self, branch: &str, key: &str, value: i64) {
        self.watermarks.entry(branch.to_string()).or_default().insert(key.to_string(), value);
    }

    pub fn heartbeat(&mut self, machine: &str, now_ms: u64) {
        self.heartbeats.insert(machine.to_string(), now_ms);
    }

    fn issue_job_id(&mut self) -> JobId {
        let floor = self.jobs.keys().next_back().map(|id| id.get()).unwrap_or(0);
        self.next_job_id = self.next_job_id.max(floor) + 1;
        JobId::new(self.next_job_id)
    }

    fn issue_build_log_id(&mut self) -> BuildLogId {
        let floor = self.build_logs.keys().next_back().map(|id| id.get()).unwrap_or(0);
        self.next_build_log_id = self.next_build_log_id.max(floor) + 1;
        BuildLogId::new(self.next_build_log_id)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
