// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use forge_cis::{SpawnedTask, TaskHealth, TaskId};
use forge_core::JobId;

fn render(f: impl FnOnce(&mut Vec<u8>)) -> String {
    let mut out = Vec::new();
    f(&mut out);
    String::from_utf8(out).unwrap()
}

#[yare::parameterized(
    incremental = { None, false, false, ScanMode::Incremental },
    changelist = { Some(4521), false, false, ScanMode::Changelist(4521) },
    head = { None, true, false, ScanMode::Head },
    refresh = { None, false, true, ScanMode::Refresh },
)]
fn flags_pick_scan_mode(changelist: Option<i64>, head: bool, refresh: bool, expected: ScanMode) {
    assert_eq!(scan_mode(changelist, head, refresh), expected);
}

#[test]
fn scan_report_lists_queued_tasks() {
    let report = ScanReport {
        disabled: false,
        range: Some((101, 103)),
        changelists: 2,
        spawned: vec![
            SpawnedTask { task: TaskId::SonyPs3, changelist: 101, job: JobId::new(1) },
            SpawnedTask { task: TaskId::Udk, changelist: 102, job: JobId::new(2) },
        ],
    };
    let text = render(|out| format_scan(out, &report));
    assert_eq!(
        text,
        "Changelists 101..103: 2 to check\n\
         Queued SonyPS3 @ 101 (job 1)\n\
         Queued UDK @ 102 (job 2)\n"
    );
}

#[test]
fn disabled_scan_report() {
    let report = ScanReport { disabled: true, ..ScanReport::default() };
    assert_eq!(render(|out| format_scan(out, &report)), "CIS is not initialised on this branch\n");
}

#[test]
fn empty_scan_report() {
    assert_eq!(render(|out| format_scan(out, &ScanReport::default())), "No CIS jobs queued\n");
}

#[test]
fn monitor_report_with_fix() {
    let mut broken = TaskHealth::disabled();
    broken.last_good = 90;
    broken.last_fail = 105;
    broken.good = false;
    let report = MonitorReport {
        tasks: vec![(TaskId::Example, broken)],
        overall: Some((90, 105)),
        good: false,
        fixed_by: Some(95),
    };
    let text = render(|out| format_monitor(out, &report));
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("TASK"));
    assert!(lines[1].starts_with("Example"));
    assert!(lines[1].contains("BROKEN"));
    assert_eq!(lines[2], "Branch BROKEN (last good 90, last failed 105)");
    assert_eq!(lines[3], "Fixed in changelist 95");
}

#[test]
fn monitor_report_without_overall() {
    let report = MonitorReport { tasks: vec![(TaskId::Gear, TaskHealth::disabled())], ..MonitorReport::default() };
    let text = render(|out| format_monitor(out, &report));
    assert!(text.ends_with("Branch state not updated; a task is disabled or unreadable\n"));
}
