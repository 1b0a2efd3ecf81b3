// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Where job logs live under the log directory.

use std::path::{Path, PathBuf};

use forge_core::JobId;
use forge_script::CommandToken;

/// `<log_dir>/job/<id>.log`
pub fn job_log_path(log_dir: &Path, job: JobId) -> PathBuf {
    log_dir.join("job").join(format!("{}.log", job))
}

/// `<log_dir>/job/<id>/<NN>-<token>.log`
pub fn step_log_path(log_dir: &Path, job: JobId, index: u32, token: CommandToken) -> PathBuf {
    log_dir.join("job").join(job.to_string()).join(format!("{:02}-{}.log", index, token))
}

#[cfg(test)]
#[path = "log_paths_tests.rs"]
mod tests;
