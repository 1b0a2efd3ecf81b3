// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job queue transitions.

use forge_core::{BuildJob, JobId, JobOutcome, JobStatus, NewJob, Table};

use super::StoreState;
use crate::StoreError;

/// Selects finished CI runs for the health scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiJobQuery {
    pub branch: String,
    pub name: String,
    /// Only runs whose label changelist is strictly above this
    pub label_above: i64,
    /// Only runs spawned strictly after this instant (epoch ms)
    pub spawned_after_ms: u64,
}

impl StoreState {
    pub fn insert_job(&mut self, job: NewJob) -> JobId {
        let id = self.issue_job_id();
        self.jobs.insert(id, job.into_job(id));
        id
    }

    pub fn job(&self, id: JobId) -> Result<&BuildJob, StoreError> {
        self.jobs.get(&id).ok_or(StoreError::NotFound { table: Table::Jobs, id: id.get() })
    }

    fn job_mut(&mut self, id: JobId) -> Result<&mut BuildJob, StoreError> {
        self.jobs.get_mut(&id).ok_or(StoreError::NotFound { table: Table::Jobs, id: id.get() })
    }

    /// The signed poll value for `machine`.
    ///
    /// A pending kill on the machine's own job wins (`-id`). A machine
    /// that already owns an active job gets `0`. Otherwise the oldest
    /// queued job is offered (`+id`), or `0` when the queue is empty.
    pub fn poll(&self, machine: &str) -> i64 {
        let owned = |job: &&BuildJob| job.machine.as_deref() == Some(machine);

        if let Some(job) = self.jobs.values().filter(owned).find(|j| j.status == JobStatus::Killing) {
            return -job.id.get();
        }
        if self.jobs.values().filter(owned).any(|j| j.status == JobStatus::Building) {
            return 0;
        }
        self.jobs
            .values()
            .find(|j| j.status == JobStatus::Connected && !j.complete)
            .map(|j| j.id.get())
            .unwrap_or(0)
    }

    /// Take ownership of a queued job. Returns false when another agent
    /// got there first or the job is no longer queued.
    pub fn claim(&mut self, id: JobId, machine: &str) -> Result<bool, StoreError> {
        let job = self.job_mut(id)?;
        if job.status != JobStatus::Connected || job.complete {
            return Ok(false);
        }
        job.status = JobStatus::Building;
        job.machine = Some(machine.to_string());
        Ok(true)
    }

    /// Ask for a job to stop. A running job moves to `Killing` for its
    /// owner to observe; a queued job is cancelled outright.
    pub fn request_kill(&mut self, id: JobId) -> Result<bool, StoreError> {
        let job = self.job_mut(id)?;
        match job.status {
            JobStatus::Building => {
                job.status = JobStatus::Killing;
                job.killed = true;
                Ok(true)
            }
            JobStatus::Connected => {
                job.status = JobStatus::Dead;
                job.complete = true;
                job.succeeded = false;
                job.killed = true;
                Ok(true)
            }
            JobStatus::Killing | JobStatus::Zombied | JobStatus::Dead => Ok(false),
        }
    }

    /// Mark a job finished.
    pub fn release(&mut self, id: JobId, outcome: JobOutcome) -> Result<(), StoreError> {
        let job = self.job_mut(id)?;
        job.status = JobStatus::Dead;
        job.complete = true;
        job.succeeded = outcome == JobOutcome::Succeeded;
        job.killed |= outcome == JobOutcome::Killed;
        Ok(())
    }

    /// Flag active jobs whose owner has gone quiet.
    ///
    /// A job is stale when its machine's last heartbeat is older than
    /// `stale_before_ms`, or when `machine` names its owner explicitly.
    pub fn mark_zombies(&mut self, stale_before_ms: u64, machine: Option<&str>) -> Vec<JobId> {
        let mut zombied = Vec::new();
        for job in self.jobs.values_mut().filter(|j| j.status.is_active()) {
            let owner = job.machine.as_deref().unwrap_or_default();
            let last_seen = self.heartbeats.get(owner).copied().unwrap_or(0);
            if last_seen < stale_before_ms || machine == Some(owner) {
                job.status = JobStatus::Zombied;
                zombied.push(job.id);
            }
        }
        for id in &zombied {
            let log = self.jobs.get(id).and_then(|j| j.build_log);
            if let Some(record) = log.and_then(|log| self.build_logs.get_mut(&log)) {
                record.current_status = "Zombied".to_string();
            }
        }
        zombied
    }

    /// Finished CI runs for one task on a branch, oldest changelist first.
    ///
    /// Primary jobs and killed jobs are excluded, as are runs whose
    /// label is not a changelist number.
    pub fn ci_job_results(&self, query: &CiJobQuery) -> Vec<BuildJob> {
        let mut rows: Vec<(i64, &BuildJob)> = self
            .jobs
            .values()
            .filter(|j| j.branch == query.branch && j.name == query.name)
            .filter(|j| !j.primary && !j.killed)
            .filter(|j| j.spawn_time_ms > query.spawned_after_ms)
            .filter_map(|j| j.label_changelist().map(|cl| (cl, j)))
            .filter(|(cl, _)| *cl > query.label_above)
            .collect();
        rows.sort_by_key(|(cl, job)| (*cl, job.id));
        rows.into_iter().map(|(_, job)| job.clone()).collect()
    }
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
