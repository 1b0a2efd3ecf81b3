// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only logger for per-job activity logs.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use forge_core::JobId;
use tracing::Level;

use crate::log_paths;

/// Per-job activity log.
///
/// Every entry is emitted as a `tracing` event carrying `job_id` and is
/// appended to `<log_dir>/job/<job_id>.log` as
/// `2026-01-30T08:14:09Z [mode] message`.
///
/// Failures are logged via tracing and never propagate.
#[derive(Debug, Clone)]
pub struct JobLogger {
    log_dir: PathBuf,
}

impl JobLogger {
    pub fn new(log_dir: PathBuf) -> Self {
        Self { log_dir }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn info(&self, job: JobId, mode: &str, message: &str) {
        self.log(Level::INFO, job, mode, message);
    }

    pub fn warn(&self, job: JobId, mode: &str, message: &str) {
        self.log(Level::WARN, job, mode, message);
    }

    pub fn error(&self, job: JobId, mode: &str, message: &str) {
        self.log(Level::ERROR, job, mode, message);
    }

    pub fn log(&self, level: Level, job: JobId, mode: &str, message: &str) {
        let job_id = job.get();
        match level {
            Level::ERROR => tracing::error!(job_id, mode, "{}", message),
            Level::WARN => tracing::warn!(job_id, mode, "{}", message),
            Level::INFO => tracing::info!(job_id, mode, "{}", message),
            _ => tracing::debug!(job_id, mode, "{}", message),
        }

        let line = match level {
            Level::ERROR => format!("error: {}", message),
            Level::WARN => format!("warn: {}", message),
            _ => message.to_string(),
        };
        self.append(job, mode, &line);
    }

    /// Append a fenced block (change lists, failure detail).
    ///
    /// ```text
    /// {timestamp} [{mode}] ```{label}
    /// {content}
    /// {timestamp} [{mode}] ```
    /// ```
    pub fn append_fenced(&self, job: JobId, mode: &str, label: &str, content: &str) {
        let path = log_paths::job_log_path(&self.log_dir, job);
        if let Err(e) = write_fenced(&path, mode, label, content) {
            tracing::warn!(job_id = job.get(), error = %e, "failed to write job log");
        }
    }

    fn append(&self, job: JobId, mode: &str, message: &str) {
        let path = log_paths::job_log_path(&self.log_dir, job);
        if let Err(e) = write_line(&path, mode, message) {
            tracing::warn!(job_id = job.get(), error = %e, "failed to write job log");
        }
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn open_append(path: &Path) -> std::io::Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn write_line(path: &Path, mode: &str, message: &str) -> std::io::Result<()> {
    let mut file = open_append(path)?;
    writeln!(file, "{} [{}] {}", timestamp(), mode, message)
}

fn write_fenced(path: &Path, mode: &str, label: &str, content: &str) -> std::io::Result<()> {
    let mut file = open_append(path)?;
    writeln!(file, "{} [{}] ```{}", timestamp(), mode, label)?;
    write!(file, "{}", content)?;
    if !content.ends_with('\n') {
        writeln!(file)?;
    }
    writeln!(file, "{} [{}] ```", timestamp(), mode)
}

/// Append raw lines to a step's captured log.
pub(crate) fn append_step_log(path: &Path, lines: &[String]) {
    let result = open_append(path).and_then(|mut file| {
        for line in lines {
            writeln!(file, "{}", line)?;
        }
        Ok(())
    });
    if let Err(e) = result {
        tracing::warn!(path = %path.display(), error = %e, "failed to write step log");
    }
}

#[cfg(test)]
#[path = "job_logger_tests.rs"]
mod tests;
