// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use forge_core::NewJob;

fn state_with_job() -> (StoreState, i64) {
    let mut state = StoreState::default();
    let id = state.insert_job(NewJob::new("nightly", "Jobs/Nightly", "UE3").label("QA_APPROVED"));
    (state, id.get())
}

#[yare::parameterized(
    name      = { "name", FieldValue::Text("nightly".into()) },
    label     = { "label", FieldValue::Text("QA_APPROVED".into()) },
    status    = { "status", FieldValue::Text("connected".into()) },
    complete  = { "complete", FieldValue::Bool(false) },
    platform  = { "platform", FieldValue::Text("Win32".into()) },
)]
fn job_columns_read_by_name(field: &str, expected: FieldValue) {
    let (state, id) = state_with_job();
    assert_eq!(state.get_field(Table::Jobs, id, field).unwrap(), Some(expected));
}

#[test]
fn unset_machine_reads_as_none() {
    let (state, id) = state_with_job();
    assert_eq!(state.get_field(Table::Jobs, id, "machine").unwrap(), None);
}

#[test]
fn unknown_job_column_round_trips_through_extra() {
    let (mut state, id) = state_with_job();
    state.set_field(Table::Jobs, id, "Killing", FieldValue::Bool(true)).unwrap();
    assert_eq!(state.get_field(Table::Jobs, id, "Killing").unwrap(), Some(FieldValue::Bool(true)));
    assert_eq!(state.get_field(Table::Jobs, id, "Unset").unwrap(), None);
}

#[test]
fn integer_label_is_stored_as_text() {
    let (mut state, id) = state_with_job();
    state.set_field(Table::Jobs, id, "label", FieldValue::Int(4411)).unwrap();
    assert_eq!(state.job(JobId::new(id)).unwrap().label_changelist(), Some(4411));
}

#[test]
fn status_column_is_parsed() {
    let (mut state, id) = state_with_job();
    state.set_field(Table::Jobs, id, "status", "Killing".into()).unwrap();
    assert_eq!(state.job(JobId::new(id)).unwrap().status, JobStatus::Killing);

    let err = state.set_field(Table::Jobs, id, "status", "Sleeping".into()).unwrap_err();
    assert!(matches!(err, StoreError::TypeMismatch { .. }));
}

#[test]
fn wrong_type_is_rejected() {
    let (mut state, id) = state_with_job();
    let err = state.set_field(Table::Jobs, id, "complete", "yes".into()).unwrap_err();
    assert!(matches!(err, StoreError::TypeMismatch { .. }));
}

#[test]
fn id_is_read_only() {
    let (mut state, id) = state_with_job();
    assert!(state.set_field(Table::Jobs, id, "id", FieldValue::Int(7)).is_err());
}

#[test]
fn build_log_columns() {
    let (mut state, id) = state_with_job();
    let log = state.create_build_log(JobId::new(id), "build-01", "Jobs/Nightly", 10).unwrap();

    state.set_field(Table::BuildLogs, log.get(), "current_status", "Building".into()).unwrap();
    assert_eq!(
        state.get_field(Table::BuildLogs, log.get(), "current_status").unwrap(),
        Some(FieldValue::Text("Building".into()))
    );
    assert_eq!(state.get_field(Table::BuildLogs, log.get(), "ended_ms").unwrap(), None);

    let err = state.get_field(Table::BuildLogs, log.get(), "Killing").unwrap_err();
    assert!(matches!(err, StoreError::UnknownField { .. }));
}

#[test]
fn missing_row_is_not_found() {
    let state = StoreState::default();
    let err = state.get_field(Table::Jobs, 3, "name").unwrap_err();
    assert!(matches!(err, StoreError::NotFound { table: Table::Jobs, id: 3 }));
}
