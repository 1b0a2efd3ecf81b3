// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

fn read_log(logger: &JobLogger, job: JobId) -> String {
    fs::read_to_string(log_paths::job_log_path(logger.log_dir(), job)).unwrap()
}

#[test]
fn lines_carry_timestamp_and_mode() {
    let dir = tempdir().unwrap();
    let logger = JobLogger::new(dir.path().to_path_buf());
    logger.info(JobId::new(3), "init", "claimed by build-01");

    let content = read_log(&logger, JobId::new(3));
    let line = content.lines().next().unwrap();
    assert!(line.ends_with(" [init] claimed by build-01"), "got {line}");
    let ts = line.split(' ').next().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok(), "bad timestamp {ts}");
}

#[test]
fn levels_prefix_problems() {
    let dir = tempdir().unwrap();
    let logger = JobLogger::new(dir.path().to_path_buf());
    logger.warn(JobId::new(3), "exit", "revert failed");
    logger.error(JobId::new(3), "finalise", "Illegal command: 'x'");

    let content = read_log(&logger, JobId::new(3));
    assert!(content.contains("[exit] warn: revert failed"));
    assert!(content.contains("[finalise] error: Illegal command: 'x'"));
}

#[test]
fn fenced_block_wraps_content() {
    let dir = tempdir().unwrap();
    let logger = JobLogger::new(dir.path().to_path_buf());
    logger.append_fenced(JobId::new(5), "init", "changes", "Change 101 by jdoe: fix");

    let content = read_log(&logger, JobId::new(5));
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("[init] ```changes"));
    assert_eq!(lines[1], "Change 101 by jdoe: fix");
    assert!(lines[2].ends_with("[init] ```"));
}

#[test]
fn unwritable_directory_is_not_fatal() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    let logger = JobLogger::new(blocker);
    logger.info(JobId::new(1), "init", "still running");
}

#[test]
fn step_log_appends_lines() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("job/1/01-sync.log");
    append_step_log(&path, &["one".to_string()]);
    append_step_log(&path, &["two".to_string()]);
    assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
}
