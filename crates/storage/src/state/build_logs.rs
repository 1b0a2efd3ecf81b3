// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use forge_core::{BuildLogId, BuildLogRecord, JobId, Table};

use super::StoreState;
use crate::StoreError;

impl StoreState {
    /// Open a build log record for a job run and link it from the job.
    pub fn create_build_log(
        &mut self,
        job: JobId,
        machine: &str,
        command: &str,
        started_ms: u64,
    ) -> Result<BuildLogId, StoreError> {
        if !self.jobs.contains_key(&job) {
            return Err(StoreError::NotFound { table: Table::Jobs, id: job.get() });
        }
        let id = self.issue_build_log_id();
        self.build_logs.insert(
            id,
            BuildLogRecord {
                id,
                job,
                machine: machine.to_string(),
                command: command.to_string(),
                changelist: None,
                started_ms,
                ended_ms: None,
                current_status: BuildLogRecord::SPAWNING.to_string(),
            },
        );
        if let Some(row) = self.jobs.get_mut(&job) {
            row.build_log = Some(id);
        }
        Ok(id)
    }

    pub fn build_log(&self, id: BuildLogId) -> Result<&BuildLogRecord, StoreError> {
        self.build_logs.get(&id).ok_or(StoreError::NotFound { table: Table::BuildLogs, id: id.get() })
    }

    fn build_log_mut(&mut self, id: BuildLogId) -> Result<&mut BuildLogRecord, StoreError> {
        self.build_logs
            .get_mut(&id)
            .ok_or(StoreError::NotFound { table: Table::BuildLogs, id: id.get() })
    }

    pub fn set_build_log_status(&mut self, id: BuildLogId, status: &str) -> Result<(), StoreError> {
        self.build_log_mut(id)?.current_status = status.to_string();
        Ok(())
    }

    pub fn set_build_log_changelist(&mut self, id: BuildLogId, changelist: i64) -> Result<(), StoreError> {
        self.build_log_mut(id)?.changelist = Some(changelist).filter(|cl| *cl > 0);
        Ok(())
    }

    /// Stamp the end of a run. Only the first call takes effect; the
    /// return value says whether this call was it.
    pub fn finish_build_log(
        &mut self,
        id: BuildLogId,
        ended_ms: u64,
        status: &str,
    ) -> Result<bool, StoreError> {
        let record = self.build_log_mut(id)?;
        if record.is_finished() {
            return Ok(false);
        }
        record.ended_ms = Some(ended_ms);
        record.current_status = status.to_string();
        Ok(true)
    }
}
