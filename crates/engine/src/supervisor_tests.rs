// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use forge_adapters::{FakeProcessAdapter, FakeRun, ProcessAdapter, SpawnSpec};

const TEN_MINUTES: Duration = Duration::from_secs(600);

fn supervise(fake: &FakeProcessAdapter, started: Instant) -> ProcessSupervisor<forge_adapters::FakeProcessHandle> {
    let handle = fake.spawn(&SpawnSpec::new("devenv")).unwrap();
    ProcessSupervisor::new(handle, "devenv".to_string(), started, TEN_MINUTES)
}

#[yare::parameterized(
    clean    = { ProcessExit::Exited(0), ErrorKind::None },
    nonzero  = { ProcessExit::Exited(1), ErrorKind::Process },
    signal   = { ProcessExit::Signalled, ErrorKind::Process },
    killed   = { ProcessExit::Killed, ErrorKind::Process },
)]
fn exit_maps_to_error_kind(exit: ProcessExit, expected: ErrorKind) {
    assert_eq!(Finish::Exited(exit).error_kind(), expected);
}

#[test]
fn timed_out_maps_to_timed_out() {
    assert_eq!(Finish::TimedOut.error_kind(), ErrorKind::TimedOut);
}

#[test]
fn finished_tool_is_reported() {
    let fake = FakeProcessAdapter::new();
    fake.exit_with(0, "");
    let start = Instant::now();
    let mut sup = supervise(&fake, start);
    assert_eq!(sup.poll(start), Some(Finish::Exited(ProcessExit::Exited(0))));
}

#[test]
fn running_tool_within_timeout_keeps_running() {
    let fake = FakeProcessAdapter::new();
    fake.push(FakeRun::Hang);
    let start = Instant::now();
    let mut sup = supervise(&fake, start);
    assert_eq!(sup.poll(start + Duration::from_secs(599)), None);
    assert_eq!(fake.kills(), 0);
}

#[test]
fn overdue_tool_is_killed_once_and_reports_timeout() {
    let fake = FakeProcessAdapter::new();
    fake.push(FakeRun::Hang);
    let start = Instant::now();
    let mut sup = supervise(&fake, start);

    let late = start + Duration::from_secs(601);
    assert_eq!(sup.poll(late), Some(Finish::TimedOut));
    assert_eq!(sup.poll(late), Some(Finish::TimedOut));
    assert_eq!(fake.kills(), 1);
}

#[test]
fn finish_is_cached() {
    let fake = FakeProcessAdapter::new();
    fake.exit_with(2, "");
    let start = Instant::now();
    let mut sup = supervise(&fake, start);
    let first = sup.poll(start);
    // Later polls past the timeout must not turn an exit into a timeout.
    assert_eq!(sup.poll(start + Duration::from_secs(3600)), first);
    sup.kill();
    assert_eq!(fake.kills(), 0);
}
