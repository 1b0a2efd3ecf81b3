// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

use crate::id::{BuildLogId, JobId};

/// One record per job run. Records are never deleted; `ended_ms` is
/// stamped exactly once when the run reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLogRecord {
    pub id: BuildLogId,
    pub job: JobId,
    pub machine: String,
    pub command: String,
    pub changelist: Option<i64>,
    pub started_ms: u64,
    pub ended_ms: Option<u64>,
    pub current_status: String,
}

impl BuildLogRecord {
    /// Status a record carries until its first step reports.
    pub const SPAWNING: &'static str = "Spawning";

    pub fn is_finished(&self) -> bool {
        self.ended_ms.is_some()
    }
}
