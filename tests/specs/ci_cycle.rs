// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A break and its fix travelling through scan, build and monitor.

use forge_adapters::NotificationKind;
use forge_cis::{watermarks, ScanMode, TaskId};
use forge_core::JobOutcome;
use forge_storage::JobStore;

use crate::prelude::*;

const PS3_COMMAND: &str = "Jobs/CISCodeBuilderSonyPS3";
const PS3_FILE: &str = "Development/Src/PS3/PS3Drv.cpp";

fn branch() -> Branch {
    let branch = Branch::new(healthy_state(100, 90));
    branch.script(PS3_COMMAND, "// CIS compile\nsync\nmsvcbuild UnrealEngine3\n");
    branch
}

fn task_health(report: &forge_cis::MonitorReport, task: TaskId) -> forge_cis::TaskHealth {
    report.tasks.iter().find(|(t, _)| *t == task).map(|(_, h)| h.clone()).unwrap()
}

#[tokio::test]
async fn break_then_fix_mails_the_fix() {
    let mut b = branch();

    // A PS3 change breaks the compile.
    b.submit(101, &[PS3_FILE]);
    let scan = b.cis.process_changes(ScanMode::Incremental).await.unwrap();
    assert_eq!(scan.spawned.len(), 1);
    assert_eq!(scan.spawned[0].task, TaskId::SonyPs3);
    b.process.exit_with(1, "PS3Drv.cpp(12) : error C2065: 'gcm' : undeclared identifier\n");
    let job = b.run(scan.spawned[0].job).await;
    assert!(!job.succeeded);
    assert_eq!(b.notify.sent_of(NotificationKind::Failed).len(), 1);

    let report = b.cis.update_monitor_values().await.unwrap();
    assert!(!report.good);
    assert_eq!(report.overall, Some((100, 101)));
    assert_eq!(report.fixed_by, None);
    let ps3 = task_health(&report, TaskId::SonyPs3);
    assert_eq!((ps3.last_good, ps3.last_fail, ps3.changer), (100, 101, 101));
    assert_eq!(b.watermark(&watermarks::last_fail(TaskId::SonyPs3)), 101);
    assert!(b.notify.sent_of(NotificationKind::Cis).is_empty());

    // The follow-up change fixes it.
    b.submit(102, &["Development/Src/PS3/PS3Audio.cpp"]);
    let scan = b.cis.process_changes(ScanMode::Incremental).await.unwrap();
    assert_eq!(scan.range, Some((102, 102)));
    let job = b.run(scan.spawned[0].job).await;
    assert!(job.succeeded);

    let report = b.cis.update_monitor_values().await.unwrap();
    assert!(report.good);
    assert_eq!(report.overall, Some((102, 101)));
    assert_eq!(report.fixed_by, Some(102));
    assert_eq!(b.watermark(watermarks::LAST_GOOD_OVERALL), 102);
    assert_eq!(b.watermark(watermarks::LAST_FAIL_OVERALL), 101);

    let fixed = b.notify.sent_of(NotificationKind::Cis);
    assert_eq!(fixed.len(), 1);
    assert_eq!(fixed[0].subject, "[CIS][UE3][FIXED] Fixed in changelist 102");
    assert_eq!(fixed[0].recipients, vec![CIS_ADDRESS]);
    assert!(fixed[0].body.contains("Last good changelist before the break: 100"));
}

#[tokio::test]
async fn agent_syncs_cis_job_to_its_changelist() {
    let mut b = branch();
    b.submit(101, &[PS3_FILE]);
    b.submit(105, &["Engine/Src/UnrealScriptTest.cpp"]);

    let scan = b.cis.process_changes(ScanMode::Changelist(101)).await.unwrap();
    let job = b.run(scan.spawned[0].job).await;

    assert!(job.succeeded);
    let log = b.store.build_log(job.build_log.unwrap()).unwrap();
    assert_eq!(log.changelist, Some(101));
    // Single-changelist scans leave the scan position alone.
    assert_eq!(b.watermark(watermarks::LAST_ATTEMPTED_OVERALL), 100);
}

#[tokio::test]
async fn unfinished_run_holds_the_monitor_back() {
    let mut b = branch();
    b.submit(101, &[PS3_FILE]);
    let scan = b.cis.process_changes(ScanMode::Incremental).await.unwrap();
    let id = scan.spawned[0].job;
    assert!(b.store.claim(id, "builder-02").unwrap());

    let report = b.cis.update_monitor_values().await.unwrap();
    let ps3 = task_health(&report, TaskId::SonyPs3);
    assert!(ps3.in_flight);
    assert_eq!(ps3.last_good, 100);
    assert!(report.good);

    b.store.release(id, JobOutcome::Succeeded).unwrap();
    let report = b.cis.update_monitor_values().await.unwrap();
    let ps3 = task_health(&report, TaskId::SonyPs3);
    assert!(!ps3.in_flight);
    assert_eq!(ps3.last_good, 101);
    assert_eq!(report.overall, Some((101, 90)));
    // Still good throughout, so nothing was fixed.
    assert_eq!(report.fixed_by, None);
}
