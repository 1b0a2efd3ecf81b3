// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timeout-checked supervision of one spawned tool.

use std::time::{Duration, Instant};

use forge_adapters::{ProcessExit, ProcessHandle};
use forge_core::ErrorKind;

/// How a supervised tool finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    Exited(ProcessExit),
    TimedOut,
}

impl Finish {
    pub fn error_kind(self) -> ErrorKind {
        match self {
            Finish::Exited(exit) if exit.success() => ErrorKind::None,
            Finish::Exited(_) => ErrorKind::Process,
            Finish::TimedOut => ErrorKind::TimedOut,
        }
    }
}

/// Watches a running tool from the agent loop.
///
/// [`poll`](Self::poll) is the only entry point the loop uses. A tool that
/// outlives `timeout` is killed; the finish is reported once its output
/// log has been closed, and from then on every poll returns the same value.
pub struct ProcessSupervisor<H> {
    handle: H,
    command: String,
    started: Instant,
    timeout: Duration,
    timed_out: bool,
    finished: Option<Finish>,
}

impl<H: ProcessHandle> ProcessSupervisor<H> {
    pub fn new(handle: H, command: String, started: Instant, timeout: Duration) -> Self {
        Self { handle, command, started, timeout, timed_out: false, finished: None }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn pid(&self) -> Option<u32> {
        self.handle.pid()
    }

    /// `None` while the tool is running.
    pub fn poll(&mut self, now: Instant) -> Option<Finish> {
        if self.finished.is_some() {
            return self.finished;
        }

        if !self.timed_out && now.saturating_duration_since(self.started) > self.timeout {
            tracing::warn!(
                command = %self.command,
                timeout_secs = self.timeout.as_secs(),
                "tool timed out, killing"
            );
            self.timed_out = true;
            self.handle.kill();
        }

        let exit = self.handle.exit()?;
        let finish = if self.timed_out { Finish::TimedOut } else { Finish::Exited(exit) };
        tracing::debug!(command = %self.command, ?exit, "tool finished");
        self.finished = Some(finish);
        self.finished
    }

    /// Force-kill the tool. Safe to call repeatedly.
    pub fn kill(&mut self) {
        if self.finished.is_none() {
            self.handle.kill();
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
