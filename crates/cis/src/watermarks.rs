// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watermark keys the scanner keeps per branch.

use crate::registry::TaskId;

/// Newest changelist the change scan has processed
pub const LAST_ATTEMPTED_OVERALL: &str = "LastAttemptedOverall";
pub const LAST_GOOD_OVERALL: &str = "LastGoodOverall";
pub const LAST_FAIL_OVERALL: &str = "LastFailOverall";

/// Newest changelist this task was queued for. Negative disables the task.
pub fn last_attempted(task: TaskId) -> String {
    format!("LastAttempted{}", task)
}

pub fn last_good(task: TaskId) -> String {
    format!("LastGood{}", task)
}

pub fn last_fail(task: TaskId) -> String {
    format!("LastFail{}", task)
}
