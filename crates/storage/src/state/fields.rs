// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Column access by name.
//!
//! Job rows accept arbitrary extra columns; build log records only
//! expose their fixed columns.

use forge_core::{BuildJob, BuildLogId, BuildLogRecord, FieldValue, JobId, JobStatus, Table};

use super::StoreState;
use crate::StoreError;

impl StoreState {
    pub fn get_field(&self, table: Table, id: i64, field: &str) -> Result<Option<FieldValue>, StoreError> {
        match table {
            Table::Jobs => Ok(job_column(self.job(JobId::new(id))?, field)),
            Table::BuildLogs => build_log_column(self.build_log(BuildLogId::new(id))?, field),
        }
    }

    pub fn set_field(
        &mut self,
        table: Table,
        id: i64,
        field: &str,
        value: FieldValue,
    ) -> Result<(), StoreError> {
        match table {
            Table::Jobs => {
                let job = self
                    .jobs
                    .get_mut(&JobId::new(id))
                    .ok_or(StoreError::NotFound { table, id })?;
                set_job_column(job, field, value)
            }
            Table::BuildLogs => {
                let record = self
                    .build_logs
                    .get_mut(&BuildLogId::new(id))
                    .ok_or(StoreError::NotFound { table, id })?;
                set_build_log_column(record, field, value)
            }
        }
    }
}

fn job_column(job: &BuildJob, field: &str) -> Option<FieldValue> {
    let value = match field {
        "id" => job.id.get().into(),
        "name" => job.name.clone().into(),
        "command" => job.command.clone().into(),
        "branch" => job.branch.clone().into(),
        "platform" => job.platform.clone().into(),
        "game" => job.game.clone().into(),
        "configuration" => job.configuration.clone().into(),
        "label" => job.label.clone().into(),
        "primary" => job.primary.into(),
        "status" => job.status.to_string().into(),
        "machine" => job.machine.clone()?.into(),
        "complete" => job.complete.into(),
        "succeeded" => job.succeeded.into(),
        "killed" => job.killed.into(),
        "spawn_time_ms" => (job.spawn_time_ms as i64).into(),
        "build_log" => job.build_log?.get().into(),
        other => return job.extra.get(other).cloned(),
    };
    Some(value)
}

fn set_job_column(job: &mut BuildJob, field: &str, value: FieldValue) -> Result<(), StoreError> {
    match field {
        "id" => return Err(StoreError::UnknownField { table: Table::Jobs, field: field.to_string() }),
        "name" => job.name = text(field, value)?,
        "command" => job.command = text(field, value)?,
        "branch" => job.branch = text(field, value)?,
        "platform" => job.platform = text(field, value)?,
        "game" => job.game = text(field, value)?,
        "configuration" => job.configuration = text(field, value)?,
        "label" => {
            job.label = match value {
                FieldValue::Int(cl) => cl.to_string(),
                other => text(field, other)?,
            }
        }
        "primary" => job.primary = boolean(field, value)?,
        "status" => {
            let raw = text(field, value)?;
            job.status = raw
                .parse::<JobStatus>()
                .map_err(|_| StoreError::TypeMismatch { field: field.to_string(), value: raw })?;
        }
        "machine" => {
            let machine = text(field, value)?;
            job.machine = Some(machine).filter(|m| !m.is_empty());
        }
        "complete" => job.complete = boolean(field, value)?,
        "succeeded" => job.succeeded = boolean(field, value)?,
        "killed" => job.killed = boolean(field, value)?,
        "spawn_time_ms" => job.spawn_time_ms = int(field, value)?.max(0) as u64,
        "build_log" => {
            job.build_log = Some(BuildLogId::new(int(field, value)?)).filter(|id| id.is_set())
        }
        other => {
            job.extra.insert(other.to_string(), value);
        }
    }
    Ok(())
}

fn build_log_column(record: &BuildLogRecord, field: &str) -> Result<Option<FieldValue>, StoreError> {
    let value = match field {
        "id" => Some(record.id.get().into()),
        "job" => Some(record.job.get().into()),
        "machine" => Some(record.machine.clone().into()),
        "command" => Some(record.command.clone().into()),
        "changelist" => record.changelist.map(FieldValue::from),
        "started_ms" => Some((record.started_ms as i64).into()),
        "ended_ms" => record.ended_ms.map(|ms| FieldValue::from(ms as i64)),
        "current_status" => Some(record.current_status.clone().into()),
        other => {
            return Err(StoreError::UnknownField { table: Table::BuildLogs, field: other.to_string() })
        }
    };
    Ok(value)
}

fn set_build_log_column(
    record: &mut BuildLogRecord,
    field: &str,
    value: FieldValue,
) -> Result<(), StoreError> {
    match field {
        "machine" => record.machine = text(field, value)?,
        "command" => record.command = text(field, value)?,
        "changelist" => record.changelist = Some(int(field, value)?).filter(|cl| *cl > 0),
        "started_ms" => record.started_ms = int(field, value)?.max(0) as u64,
        "ended_ms" => record.ended_ms = Some(int(field, value)?.max(0) as u64),
        "current_status" => record.current_status = text(field, value)?,
        other => {
            return Err(StoreError::UnknownField { table: Table::BuildLogs, field: other.to_string() })
        }
    }
    Ok(())
}

fn mismatch(field: &str, value: &FieldValue) -> StoreError {
    StoreError::TypeMismatch { field: field.to_string(), value: format!("{:?}", value) }
}

fn text(field: &str, value: FieldValue) -> Result<String, StoreError> {
    match value {
        FieldValue::Text(s) => Ok(s),
        other => Err(mismatch(field, &other)),
    }
}

fn int(field: &str, value: FieldValue) -> Result<i64, StoreError> {
    value.as_int().ok_or_else(|| mismatch(field, &value))
}

fn boolean(field: &str, value: FieldValue) -> Result<bool, StoreError> {
    value.as_bool().ok_or_else(|| mismatch(field, &value))
}

#[cfg(test)]
#[path = "fields_tests.rs"]
mod tests;
