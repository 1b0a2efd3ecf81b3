// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `forge run`: the build agent.

use anyhow::Result;
use forge_adapters::{P4CliAdapter, TokioProcessAdapter};
use forge_core::SystemClock;
use forge_engine::{Agent, AgentDeps};

use super::Context;
use crate::exit_error::{ExitError, EXIT_LOCKED};
use crate::lifecycle::{run_loop, AgentLock, LifecycleError};
use crate::notifier::Notifier;

pub async fn handle(ctx: &Context) -> Result<()> {
    let lock = match AgentLock::acquire(&ctx.paths.lock) {
        Ok(lock) => lock,
        Err(e @ LifecycleError::LockFailed(..)) => return Err(ExitError::new(EXIT_LOCKED, e.to_string()).into()),
        Err(e) => return Err(e.into()),
    };

    let deps = AgentDeps {
        store: ctx.store()?,
        scc: P4CliAdapter::new(ctx.config.p4_program()),
        notifier: Notifier::from_config(&ctx.config, &ctx.paths),
        process: TokioProcessAdapter,
    };
    let settings = ctx.config.agent_settings(&ctx.paths);
    tracing::info!(
        machine = %settings.machine,
        scripts = %settings.scripts_dir.display(),
        lock = %lock.path().display(),
        "starting build agent"
    );
    let mut agent = Agent::new(deps, settings, SystemClock);

    run_loop(&mut agent, ctx.config.tick(), shutdown_signal()).await;
    drop(lock);
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("interrupt received, stopping agent"),
        _ = terminate => tracing::info!("terminate received, stopping agent"),
    }
}
