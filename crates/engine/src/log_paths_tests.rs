// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn job_log() {
    assert_eq!(job_log_path(Path::new("/state/logs"), JobId::new(42)), PathBuf::from("/state/logs/job/42.log"));
}

#[yare::parameterized(
    first = { 1, CommandToken::Sync, "/state/logs/job/7/01-sync.log" },
    build = { 12, CommandToken::MsvcBuild, "/state/logs/job/7/12-msvcbuild.log" },
)]
fn step_log(index: u32, token: CommandToken, expected: &str) {
    assert_eq!(step_log_path(Path::new("/state/logs"), JobId::new(7), index, token), PathBuf::from(expected));
}
