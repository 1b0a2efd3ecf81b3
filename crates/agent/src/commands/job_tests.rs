// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use forge_core::{FakeClock, JobOutcome, JobStatus};
use forge_storage::MemoryStore;

fn exit_code(err: &anyhow::Error) -> Option<i32> {
    err.downcast_ref::<ExitError>().map(|e| e.code)
}

#[test]
fn submit_stamps_spawn_time() {
    let store = MemoryStore::new();
    let clock = FakeClock::new();

    let id = submit(&store, NewJob::new("Nightly", "Jobs/Nightly", "UE3").label("4520"), &clock).unwrap();

    let job = store.job(id).unwrap();
    assert_eq!(job.spawn_time_ms, FakeClock::START_EPOCH_MS);
    assert_eq!(job.label, "4520");
    assert_eq!(job.status, JobStatus::Connected);
}

#[test]
fn list_hides_finished_jobs_unless_all() {
    let store = MemoryStore::new();
    let clock = FakeClock::new();
    let done = submit(&store, NewJob::new("Done", "Jobs/Done", "UE3"), &clock).unwrap();
    let queued = submit(&store, NewJob::new("Queued", "Jobs/Queued", "UE3"), &clock).unwrap();
    store.release(done, JobOutcome::Succeeded).unwrap();

    let open: Vec<JobId> = list(&store, false).unwrap().iter().map(|j| j.id).collect();
    assert_eq!(open, vec![queued]);
    let every: Vec<JobId> = list(&store, true).unwrap().iter().map(|j| j.id).collect();
    assert_eq!(every, vec![done, queued]);
}

#[test]
fn kill_cancels_queued_job() {
    let store = MemoryStore::new();
    let id = submit(&store, NewJob::new("Nightly", "Jobs/Nightly", "UE3"), &FakeClock::new()).unwrap();

    kill(&store, id).unwrap();

    let job = store.job(id).unwrap();
    assert!(job.complete);
    assert!(!job.succeeded);
}

#[test]
fn kill_of_finished_or_unknown_job_fails() {
    let store = MemoryStore::new();
    let id = submit(&store, NewJob::new("Nightly", "Jobs/Nightly", "UE3"), &FakeClock::new()).unwrap();
    store.release(id, JobOutcome::Failed).unwrap();

    let err = kill(&store, id).unwrap_err();
    assert_eq!(exit_code(&err), Some(crate::exit_error::EXIT_FAILED));
    let err = kill(&store, JobId::new(99)).unwrap_err();
    assert_eq!(exit_code(&err), Some(crate::exit_error::EXIT_FAILED));
}

#[test]
fn reap_zombies_jobs_of_silent_machines() {
    let store = MemoryStore::new();
    let clock = FakeClock::new();
    let quiet = submit(&store, NewJob::new("Quiet", "Jobs/Quiet", "UE3"), &clock).unwrap();
    let alive = submit(&store, NewJob::new("Alive", "Jobs/Alive", "UE3"), &clock).unwrap();
    store.claim(quiet, "builder-01").unwrap();
    store.claim(alive, "builder-02").unwrap();
    store.heartbeat("builder-01", clock.epoch_ms()).unwrap();
    clock.advance(Duration::from_secs(600));
    store.heartbeat("builder-02", clock.epoch_ms()).unwrap();

    let reaped = reap(&store, &clock, Duration::from_secs(300), None).unwrap();

    assert_eq!(reaped, vec![quiet]);
    assert_eq!(store.job(quiet).unwrap().status, JobStatus::Zombied);
    assert_eq!(store.job(alive).unwrap().status, JobStatus::Building);
}

#[test]
fn reap_named_machine_regardless_of_heartbeat() {
    let store = MemoryStore::new();
    let clock = FakeClock::new();
    let id = submit(&store, NewJob::new("Nightly", "Jobs/Nightly", "UE3"), &clock).unwrap();
    store.claim(id, "builder-01").unwrap();
    store.heartbeat("builder-01", clock.epoch_ms()).unwrap();

    let reaped = reap(&store, &clock, Duration::from_secs(300), Some("builder-01")).unwrap();
    assert_eq!(reaped, vec![id]);
}

#[test]
fn job_list_text() {
    let store = MemoryStore::new();
    let id = submit(&store, NewJob::new("CIS Example", "CIS/Example", "UE3").label("4521"), &FakeClock::new()).unwrap();
    store.claim(id, "builder-01").unwrap();

    let mut out = Vec::new();
    format_job_list(&mut out, &list(&store, true).unwrap());
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("ID  NAME"));
    for cell in ["CIS Example", "CIS/Example", "4521", "builder-01", "building"] {
        assert!(lines[1].contains(cell), "missing {cell} in {}", lines[1]);
    }
}

#[yare::parameterized(
    queued = { false, false, JobStatus::Connected, "connected" },
    passed = { true, true, JobStatus::Dead, "succeeded" },
    failed = { true, false, JobStatus::Dead, "dead (failed)" },
)]
fn status_column(complete: bool, succeeded: bool, status: JobStatus, expected: &str) {
    let mut job = NewJob::new("Nightly", "Jobs/Nightly", "UE3").into_job(JobId::new(1));
    job.complete = complete;
    job.succeeded = succeeded;
    job.status = status;
    assert_eq!(status_text(&job), expected);
}

#[test]
fn empty_job_list() {
    let mut out = Vec::new();
    format_job_list(&mut out, &[]);
    assert_eq!(String::from_utf8(out).unwrap(), "No jobs\n");
}
