// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent process lifecycle: the single-instance lock and the tick loop.

use std::fs::File;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use forge_adapters::{NotifyAdapter, ProcessAdapter, SccAdapter};
use forge_core::Clock;
use forge_engine::Agent;
use forge_storage::JobStore;
use fs2::FileExt;
use thiserror::Error;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Failed to acquire lock {0}: agent already running?")]
    LockFailed(PathBuf, #[source] std::io::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Exclusive hold on `<state_dir>/agent.pid`, released on drop.
#[derive(Debug)]
pub struct AgentLock {
    path: PathBuf,
    // NOTE(lifetime): the open handle carries the lock
    _file: File,
}

impl AgentLock {
    pub fn acquire(path: &Path) -> Result<Self, LifecycleError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // Open without truncating so a running agent's pid survives a failed attempt.
        let mut file = std::fs::OpenOptions::new().write(true).create(true).truncate(false).open(path)?;
        file.try_lock_exclusive().map_err(|e| LifecycleError::LockFailed(path.to_path_buf(), e))?;

        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;
        Ok(Self { path: path.to_path_buf(), _file: file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for AgentLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove pid file");
        }
    }
}

/// Tick `agent` every `tick` until `shutdown` resolves, then abort the
/// active job.
///
/// Store errors from a tick are logged and the loop carries on; the next
/// tick retries from the same state.
pub async fn run_loop<S, V, N, P, C>(
    agent: &mut Agent<S, V, N, P, C>,
    tick: Duration,
    shutdown: impl Future<Output = ()>,
) where
    S: JobStore,
    V: SccAdapter,
    N: NotifyAdapter,
    P: ProcessAdapter,
    C: Clock,
{
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    tracing::info!(machine = agent.machine(), tick_ms = tick.as_millis() as u64, "agent started");
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = interval.tick() => {
                if let Err(e) = agent.tick().await {
                    tracing::warn!(machine = agent.machine(), error = %e, "agent tick failed");
                }
            }
        }
    }

    if let Some(job) = agent.active_job() {
        tracing::info!(machine = agent.machine(), job_id = %job.id, "shutting down with an active job, killing it");
    }
    if let Err(e) = agent.abort().await {
        tracing::warn!(machine = agent.machine(), error = %e, "failed to abort active job");
    }
    tracing::info!(machine = agent.machine(), "agent stopped");
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
