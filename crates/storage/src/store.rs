// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The store contract shared by agents, the CIS scanner, and the CLI.

use forge_core::{
    BuildJob, BuildLogId, BuildLogRecord, FieldValue, JobId, JobOutcome, NewJob, Table,
};

use crate::state::{CiJobQuery, StoreState};
use crate::StoreError;

/// Shared job store.
///
/// Implementors provide atomic read and read-modify-write access to a
/// [`StoreState`]; every operation is built on those two primitives, so
/// a single call is a single transaction.
pub trait JobStore: Clone + Send + Sync + 'static {
    fn read<R>(&self, f: impl FnOnce(&StoreState) -> R) -> Result<R, StoreError>;

    fn transact<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> Result<R, StoreError>;

    /// Signed poll value: `0` idle, `-id` kill, `+id` claimable.
    fn poll(&self, machine: &str) -> Result<i64, StoreError> {
        self.read(|s| s.poll(machine))
    }

    fn claim(&self, id: JobId, machine: &str) -> Result<bool, StoreError> {
        self.transact(|s| s.claim(id, machine))?
    }

    fn job(&self, id: JobId) -> Result<BuildJob, StoreError> {
        self.read(|s| s.job(id).cloned())?
    }

    fn jobs(&self) -> Result<Vec<BuildJob>, StoreError> {
        self.read(|s| s.jobs.values().cloned().collect())
    }

    fn insert_job(&self, job: NewJob) -> Result<JobId, StoreError> {
        self.transact(|s| s.insert_job(job))
    }

    fn release(&self, id: JobId, outcome: JobOutcome) -> Result<(), StoreError> {
        self.transact(|s| s.release(id, outcome))?
    }

    fn request_kill(&self, id: JobId) -> Result<bool, StoreError> {
        self.transact(|s| s.request_kill(id))?
    }

    fn create_build_log(
        &self,
        job: JobId,
        machine: &str,
        command: &str,
        started_ms: u64,
    ) -> Result<BuildLogId, StoreError> {
        self.transact(|s| s.create_build_log(job, machine, command, started_ms))?
    }

    fn build_log(&self, id: BuildLogId) -> Result<BuildLogRecord, StoreError> {
        self.read(|s| s.build_log(id).cloned())?
    }

    fn set_build_log_status(&self, id: BuildLogId, status: &str) -> Result<(), StoreError> {
        self.transact(|s| s.set_build_log_status(id, status))?
    }

    fn set_build_log_changelist(&self, id: BuildLogId, changelist: i64) -> Result<(), StoreError> {
        self.transact(|s| s.set_build_log_changelist(id, changelist))?
    }

    fn finish_build_log(&self, id: BuildLogId, ended_ms: u64, status: &str) -> Result<bool, StoreError> {
        self.transact(|s| s.finish_build_log(id, ended_ms, status))?
    }

    fn get_field(&self, table: Table, id: i64, field: &str) -> Result<Option<FieldValue>, StoreError> {
        self.read(|s| s.get_field(table, id, field))?
    }

    fn set_field(&self, table: Table, id: i64, field: &str, value: FieldValue) -> Result<(), StoreError> {
        self.transact(|s| s.set_field(table, id, field, value))?
    }

    fn watermark(&self, branch: &str, key: &str) -> Result<i64, StoreError> {
        self.read(|s| s.watermark(branch, key))
    }

    fn set_watermark(&self, branch: &str, key: &str, value: i64) -> Result<(), StoreError> {
        self.transact(|s| s.set_watermark(branch, key, value))
    }

    fn heartbeat(&self, machine: &str, now_ms: u64) -> Result<(), StoreError> {
        self.transact(|s| s.heartbeat(machine, now_ms))
    }

    fn mark_zombies(&self, stale_before_ms: u64, machine: Option<&str>) -> Result<Vec<JobId>, StoreError> {
        self.transact(|s| s.mark_zombies(stale_before_ms, machine))
    }

    fn ci_job_results(&self, query: &CiJobQuery) -> Result<Vec<BuildJob>, StoreError> {
        self.read(|s| s.ci_job_results(query))
    }
}
