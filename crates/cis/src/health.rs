// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-task health: the rolling last-good and last-failed changelists.

use std::time::Duration;

use forge_core::{BuildJob, BuildLogId};
use forge_storage::{CiJobQuery, JobStore, StoreError};

use crate::error::CisError;
use crate::registry::TaskId;
use crate::watermarks;

/// CI runs spawned longer ago than this are not considered.
pub const STALENESS_HORIZON: Duration = Duration::from_secs(4 * 60 * 60);

/// Persisted markers a health update starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Baseline {
    pub last_good: i64,
    pub last_fail: i64,
}

impl Baseline {
    /// Good unless the last failure is the more recent marker.
    pub fn is_good(&self) -> bool {
        self.last_good >= self.last_fail
    }

    /// Changelist the baseline state was last observed at.
    pub fn current(&self) -> i64 {
        if self.is_good() {
            self.last_good
        } else {
            self.last_fail
        }
    }
}

/// Result of one task's health update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHealth {
    pub last_good: i64,
    pub last_fail: i64,
    pub good: bool,
    /// The state flipped (an odd number of times) during this update
    pub success_changed: bool,
    /// Changelist of the latest flip, -1 when none
    pub changer: i64,
    /// Build log of the run that flipped the state
    pub changer_log: Option<BuildLogId>,
    /// Evaluation stopped at a run that has not finished
    pub in_flight: bool,
}

impl TaskHealth {
    /// A task CIS does not run on this branch.
    pub fn disabled() -> Self {
        Self {
            last_good: -1,
            last_fail: -1,
            good: true,
            success_changed: false,
            changer: -1,
            changer_log: None,
            in_flight: false,
        }
    }

    /// Both markers hold real changelists.
    pub fn is_valid(&self) -> bool {
        self.last_good > 0 && self.last_fail > 0
    }

    /// The marker tracking the current state.
    fn marker_mut(&mut self) -> &mut i64 {
        if self.good {
            &mut self.last_good
        } else {
            &mut self.last_fail
        }
    }
}

/// Walk finished CI runs (ascending by changelist) forward from `baseline`.
///
/// `last_processed` is the branch's newest scanned changelist; with no
/// run in flight the current state is assumed to hold up to it.
pub fn evaluate(baseline: Baseline, last_processed: i64, runs: &[BuildJob]) -> TaskHealth {
    let mut health = TaskHealth {
        last_good: baseline.last_good,
        last_fail: baseline.last_fail,
        good: baseline.is_good(),
        ..TaskHealth::disabled()
    };

    for run in runs {
        let changelist = run.label_changelist().unwrap_or(-1);
        if !run.complete {
            // Assume the current state holds up to the change before it.
            *health.marker_mut() = changelist - 1;
            health.in_flight = true;
            break;
        }

        if run.succeeded != health.good {
            health.good = run.succeeded;
            health.success_changed = !health.success_changed;
            health.changer = changelist;
            health.changer_log = run.build_log;
        }
        *health.marker_mut() = changelist;
    }

    if !health.in_flight {
        *health.marker_mut() = last_processed;
    }

    if health.last_good < 0 {
        health.last_good = health.last_fail - 1;
    }
    if health.last_fail < 0 {
        health.last_fail = health.last_good - 1;
    }
    health
}

/// Bring `task`'s markers on `branch` up to date and persist them.
///
/// A negative `LastAttempted<Task>` means the task is disabled; it reports
/// [`TaskHealth::disabled`] and the store is left alone. When the store
/// cannot be read the task reads as good and nothing is written; if only
/// the run query failed, the loaded markers are reported unchanged.
pub fn update_last_good_and_failed<S: JobStore>(
    store: &S,
    branch: &str,
    task: TaskId,
    now_ms: u64,
    horizon: Duration,
) -> Result<TaskHealth, CisError> {
    let loaded = load(store, branch, task);
    let (baseline, last_processed) = match loaded {
        Ok(Some(loaded)) => loaded,
        Ok(None) => return Ok(TaskHealth::disabled()),
        Err(e) => return Ok(fail_open(branch, task, &e, None)),
    };

    let query = CiJobQuery {
        branch: branch.to_string(),
        name: task.job_name(),
        label_above: baseline.current(),
        spawned_after_ms: now_ms.saturating_sub(horizon.as_millis() as u64),
    };
    let runs = match store.ci_job_results(&query) {
        Ok(runs) => runs,
        Err(e) => return Ok(fail_open(branch, task, &e, Some(baseline))),
    };

    let health = evaluate(baseline, last_processed, &runs);
    tracing::info!(
        branch,
        task = %task,
        old_good = baseline.last_good,
        old_fail = baseline.last_fail,
        last_good = health.last_good,
        last_fail = health.last_fail,
        changer = health.changer,
        good = health.good,
        changed = health.success_changed,
        runs = runs.len(),
        "CIS monitor values updated"
    );

    store.set_watermark(branch, &watermarks::last_good(task), health.last_good)?;
    store.set_watermark(branch, &watermarks::last_fail(task), health.last_fail)?;
    Ok(health)
}

fn load<S: JobStore>(store: &S, branch: &str, task: TaskId) -> Result<Option<(Baseline, i64)>, StoreError> {
    if store.watermark(branch, &watermarks::last_attempted(task))? < 0 {
        return Ok(None);
    }
    let baseline = Baseline {
        last_good: store.watermark(branch, &watermarks::last_good(task))?,
        last_fail: store.watermark(branch, &watermarks::last_fail(task))?,
    };
    let last_processed = store.watermark(branch, watermarks::LAST_ATTEMPTED_OVERALL)?;
    Ok(Some((baseline, last_processed)))
}

fn fail_open(branch: &str, task: TaskId, error: &StoreError, baseline: Option<Baseline>) -> TaskHealth {
    tracing::warn!(branch, task = %task, %error, "CIS health unreadable, treating task as good");
    match baseline {
        Some(baseline) => TaskHealth {
            last_good: baseline.last_good,
            last_fail: baseline.last_fail,
            ..TaskHealth::disabled()
        },
        None => TaskHealth::disabled(),
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
