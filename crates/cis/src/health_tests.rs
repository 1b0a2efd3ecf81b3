// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use forge_core::test_support::ci_result;
use forge_core::{Clock, FakeClock, NewJob};
use forge_storage::{MemoryStore, StoreState};

const BRANCH: &str = "UE3";

fn run(changelist: i64, succeeded: bool) -> BuildJob {
    ci_result(changelist, "CIS Code Builder (Example)", BRANCH, changelist, succeeded)
}

fn running(changelist: i64) -> BuildJob {
    BuildJob { complete: false, ..run(changelist, false) }
}

#[test]
fn failure_after_good_baseline_flips_state() {
    let baseline = Baseline { last_good: 100, last_fail: 90 };
    let health = evaluate(baseline, 105, &[run(105, false)]);

    assert_eq!(health.last_good, 100);
    assert_eq!(health.last_fail, 105);
    assert!(!health.good);
    assert!(health.success_changed);
    assert_eq!(health.changer, 105);
}

#[test]
fn matching_results_only_advance_the_marker() {
    let baseline = Baseline { last_good: 100, last_fail: 90 };
    let health = evaluate(baseline, 104, &[run(101, true), run(103, true)]);

    assert!(health.good);
    assert!(!health.success_changed);
    assert_eq!(health.changer, -1);
    // Promoted to the newest scanned changelist.
    assert_eq!(health.last_good, 104);
    assert_eq!(health.last_fail, 90);
}

#[test]
fn fix_after_failure_reports_changer_and_log() {
    let baseline = Baseline { last_good: 80, last_fail: 90 };
    let mut fixed = run(95, true);
    fixed.build_log = Some(BuildLogId::new(7));
    let health = evaluate(baseline, 97, &[run(92, false), fixed]);

    assert!(health.good);
    assert!(health.success_changed);
    assert_eq!(health.changer, 95);
    assert_eq!(health.changer_log, Some(BuildLogId::new(7)));
    assert_eq!(health.last_fail, 92);
    assert_eq!(health.last_good, 97);
}

#[test]
fn flip_and_flip_back_is_no_change() {
    let baseline = Baseline { last_good: 100, last_fail: 90 };
    let health = evaluate(baseline, 110, &[run(101, false), run(102, true)]);

    assert!(health.good);
    assert!(!health.success_changed);
    assert_eq!(health.changer, 102);
    assert_eq!(health.last_fail, 101);
    assert_eq!(health.last_good, 110);
}

#[test]
fn run_in_flight_stops_evaluation() {
    let baseline = Baseline { last_good: 100, last_fail: 90 };
    let health = evaluate(baseline, 120, &[run(101, true), running(105), run(110, false)]);

    assert!(health.in_flight);
    assert!(health.good);
    assert_eq!(health.last_good, 104);
    assert_eq!(health.last_fail, 90);
}

#[test]
fn unset_marker_is_derived_from_the_other() {
    let health = evaluate(Baseline { last_good: 0, last_fail: 0 }, 50, &[]);
    assert_eq!(health.last_good, 50);
    assert_eq!(health.last_fail, 0);

    let health = evaluate(Baseline { last_good: -1, last_fail: 60 }, 70, &[]);
    assert!(!health.good);
    assert_eq!(health.last_fail, 70);
    assert_eq!(health.last_good, 69);
}

fn seeded(good: i64, fail: i64, processed: i64) -> MemoryStore {
    let mut state = StoreState::default();
    state.set_watermark(BRANCH, &watermarks::last_attempted(TaskId::Example), processed);
    state.set_watermark(BRANCH, &watermarks::last_good(TaskId::Example), good);
    state.set_watermark(BRANCH, &watermarks::last_fail(TaskId::Example), fail);
    state.set_watermark(BRANCH, watermarks::LAST_ATTEMPTED_OVERALL, processed);
    MemoryStore::with_state(state)
}

fn queue_run(store: &MemoryStore, task: TaskId, changelist: i64, spawned_ms: u64) -> forge_core::JobId {
    let def = task.def();
    let job = def
        .command()
        .to_new_job(task.job_name(), BRANCH)
        .label(changelist.to_string())
        .spawn_time_ms(spawned_ms);
    store.insert_job(job).unwrap()
}

#[test]
fn update_reads_runs_and_persists_markers() {
    let clock = FakeClock::new();
    let now = clock.epoch_ms();
    let store = seeded(100, 90, 105);
    let id = queue_run(&store, TaskId::Example, 105, now - 1_000);
    store.claim(id, "builder-01").unwrap();
    store.release(id, forge_core::JobOutcome::Failed).unwrap();

    let health = update_last_good_and_failed(&store, BRANCH, TaskId::Example, now, STALENESS_HORIZON).unwrap();

    assert_eq!((health.last_good, health.last_fail), (100, 105));
    assert!(health.success_changed);
    assert_eq!(store.watermark(BRANCH, "LastGoodExample").unwrap(), 100);
    assert_eq!(store.watermark(BRANCH, "LastFailExample").unwrap(), 105);
}

#[test]
fn killed_run_does_not_break_the_task() {
    let clock = FakeClock::new();
    let now = clock.epoch_ms();
    let store = seeded(100, 90, 105);
    let id = queue_run(&store, TaskId::Example, 105, now - 1_000);
    store.claim(id, "builder-01").unwrap();
    assert!(store.request_kill(id).unwrap());
    store.release(id, forge_core::JobOutcome::Killed).unwrap();

    let health = update_last_good_and_failed(&store, BRANCH, TaskId::Example, now, STALENESS_HORIZON).unwrap();

    assert!(health.good);
    assert!(!health.success_changed);
    assert_eq!((health.last_good, health.last_fail), (105, 90));
}

#[test]
fn cancelled_queued_run_is_ignored() {
    let clock = FakeClock::new();
    let now = clock.epoch_ms();
    let store = seeded(100, 90, 105);
    let id = queue_run(&store, TaskId::Example, 103, now - 1_000);
    assert!(store.request_kill(id).unwrap());

    let health = update_last_good_and_failed(&store, BRANCH, TaskId::Example, now, STALENESS_HORIZON).unwrap();

    assert!(health.good);
    assert_eq!(health.last_fail, 90);
}

#[test]
fn stale_and_foreign_runs_are_ignored() {
    let clock = FakeClock::new();
    let now = clock.epoch_ms();
    let store = seeded(100, 90, 106);
    let stale = queue_run(&store, TaskId::Example, 103, now - STALENESS_HORIZON.as_millis() as u64 - 1);
    let other_task = queue_run(&store, TaskId::Gear, 104, now);
    let primary = store
        .insert_job(
            NewJob::new(TaskId::Example.job_name(), "Jobs/CISCodeBuilderExample", BRANCH)
                .label("105")
                .primary(true)
                .spawn_time_ms(now),
        )
        .unwrap();
    for id in [stale, other_task, primary] {
        store.claim(id, "builder-01").unwrap();
        store.release(id, forge_core::JobOutcome::Failed).unwrap();
    }

    let health = update_last_good_and_failed(&store, BRANCH, TaskId::Example, now, STALENESS_HORIZON).unwrap();

    assert!(health.good);
    assert!(!health.success_changed);
    assert_eq!(health.last_good, 106);
}

#[test]
fn disabled_task_leaves_store_untouched() {
    let store = seeded(100, 90, -1);
    let before = store.snapshot();

    let health = update_last_good_and_failed(&store, BRANCH, TaskId::Example, 0, STALENESS_HORIZON).unwrap();

    assert_eq!(health, TaskHealth::disabled());
    assert!(!health.is_valid());
    assert_eq!(store.snapshot(), before);
}

/// A store whose every access fails.
#[derive(Clone)]
struct UnreadableStore;

impl JobStore for UnreadableStore {
    fn read<R>(&self, _f: impl FnOnce(&StoreState) -> R) -> Result<R, StoreError> {
        Err(StoreError::Locked("held by forge-admin".to_string()))
    }

    fn transact<R>(&self, _f: impl FnOnce(&mut StoreState) -> R) -> Result<R, StoreError> {
        Err(StoreError::Locked("held by forge-admin".to_string()))
    }
}

#[test]
fn unreadable_store_fails_open() {
    let health =
        update_last_good_and_failed(&UnreadableStore, BRANCH, TaskId::Tools, 0, STALENESS_HORIZON).unwrap();
    assert!(health.good);
    assert!(!health.is_valid());
}

/// Watermarks read fine but the run query fails.
#[derive(Clone)]
struct QueryFailingStore(MemoryStore);

impl JobStore for QueryFailingStore {
    fn read<R>(&self, f: impl FnOnce(&StoreState) -> R) -> Result<R, StoreError> {
        self.0.read(f)
    }

    fn transact<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> Result<R, StoreError> {
        self.0.transact(f)
    }

    fn ci_job_results(&self, _query: &CiJobQuery) -> Result<Vec<BuildJob>, StoreError> {
        Err(StoreError::Locked("held by forge-admin".to_string()))
    }
}

#[test]
fn failed_run_query_keeps_loaded_markers() {
    let store = QueryFailingStore(seeded(100, 90, 105));
    let before = store.0.snapshot();

    let health = update_last_good_and_failed(&store, BRANCH, TaskId::Example, 0, STALENESS_HORIZON).unwrap();

    assert!(health.good);
    assert!(health.is_valid());
    assert_eq!((health.last_good, health.last_fail), (100, 90));
    assert!(!health.success_changed);
    assert_eq!(store.0.snapshot(), before);
}
