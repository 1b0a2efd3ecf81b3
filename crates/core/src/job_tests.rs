// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    connected = { JobStatus::Connected, false, false },
    building = { JobStatus::Building, true, false },
    killing = { JobStatus::Killing, true, false },
    zombied = { JobStatus::Zombied, false, true },
    dead = { JobStatus::Dead, false, true },
)]
fn status_classification(status: JobStatus, active: bool, terminal: bool) {
    assert_eq!(status.is_active(), active);
    assert_eq!(status.is_terminal(), terminal);
    assert_eq!(status.to_string().parse::<JobStatus>(), Ok(status));
}

#[test]
fn status_parse_rejects_unknown() {
    assert_eq!("paused".parse::<JobStatus>(), Err(ParseStatusError("paused".to_string())));
}

#[yare::parameterized(
    changelist = { "1234", Some(1234) },
    padded = { " 77 ", Some(77) },
    label_name = { "QA_APPROVED", None },
    empty = { "", None },
    zero = { "0", None },
)]
fn label_changelist(label: &str, expected: Option<i64>) {
    let job = BuildJob::builder().label(label).build();
    assert_eq!(job.label_changelist(), expected);
}

#[test]
fn new_job_materializes_as_connected() {
    let job = NewJob::new("CIS Code Builder (Gear)", "Jobs/CISCodeBuilderGear", "UE3")
        .game("Gear")
        .label("501")
        .spawn_time_ms(9)
        .into_job(JobId::new(4));

    assert_eq!(job.id, JobId::new(4));
    assert_eq!(job.status, JobStatus::Connected);
    assert_eq!(job.platform, "Win32");
    assert_eq!(job.game, "Gear");
    assert_eq!(job.label_changelist(), Some(501));
    assert!(job.machine.is_none());
    assert!(!job.complete);
}

#[test]
fn outcome_renders_final_status() {
    assert_eq!(JobOutcome::Failed.to_string(), "Failed");
    assert_eq!(JobOutcome::Killed.to_string(), "Killed");
}
