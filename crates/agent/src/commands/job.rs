// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `forge job`: queue, inspect and kill build jobs in the shared store.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Subcommand};
use forge_core::{BuildJob, Clock, JobId, NewJob, SystemClock};
use forge_storage::{JobStore, StoreError};

use super::Context;
use crate::exit_error::ExitError;
use crate::output::{OutputFormat, Table};

/// Heartbeat age after which a building job counts as abandoned
const DEFAULT_STALE_SECS: u64 = 300;

#[derive(Args)]
pub struct JobArgs {
    #[command(subcommand)]
    pub command: JobCommand,
}

#[derive(Subcommand)]
pub enum JobCommand {
    /// Queue a job for the next idle agent
    Submit {
        /// Display name
        #[arg(long)]
        name: String,
        /// Script command reference, e.g. `Jobs/Nightly`
        #[arg(long)]
        command: String,
        #[arg(long, default_value = "UE3")]
        branch: String,
        #[arg(long, default_value = "Win32")]
        platform: String,
        #[arg(long, default_value = "All")]
        game: String,
        #[arg(long = "config", default_value = "Release")]
        configuration: String,
        /// Label to build; a bare changelist number for CIS-style jobs
        #[arg(long, default_value = "")]
        label: String,
        /// Primary builds report to the success list and own last-good labels
        #[arg(long)]
        primary: bool,
    },
    /// List jobs (unfinished only, unless --all)
    List {
        #[arg(long)]
        all: bool,
        #[arg(short = 'o', long, value_enum, default_value_t)]
        output: OutputFormat,
    },
    /// Ask the owning agent to kill a job; queued jobs are cancelled directly
    Kill { id: i64 },
    /// Mark building jobs whose agent stopped heartbeating as zombied
    Reap {
        #[arg(long, default_value_t = DEFAULT_STALE_SECS)]
        stale_secs: u64,
        /// Only reap jobs owned by this machine
        #[arg(long)]
        machine: Option<String>,
    },
}

pub fn handle(command: JobCommand, ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let mut out = std::io::stdout();
    match command {
        JobCommand::Submit { name, command, branch, platform, game, configuration, label, primary } => {
            let job = NewJob::new(name, command, branch)
                .platform(platform)
                .game(game)
                .configuration(configuration)
                .label(label)
                .primary(primary);
            let id = submit(&store, job, &SystemClock)?;
            println!("{}", id);
        }
        JobCommand::List { all, output } => {
            let jobs = list(&store, all)?;
            match output {
                OutputFormat::Text => format_job_list(&mut out, &jobs),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&jobs)?),
            }
        }
        JobCommand::Kill { id } => {
            kill(&store, JobId::new(id))?;
            println!("Kill requested for job {}", id);
        }
        JobCommand::Reap { stale_secs, machine } => {
            let reaped = reap(&store, &SystemClock, Duration::from_secs(stale_secs), machine.as_deref())?;
            if reaped.is_empty() {
                println!("No abandoned jobs");
            }
            for id in reaped {
                println!("Zombied job {}", id);
            }
        }
    }
    Ok(())
}

pub fn submit(store: &impl JobStore, job: NewJob, clock: &impl Clock) -> Result<JobId> {
    let job = job.spawn_time_ms(clock.epoch_ms());
    let id = store.insert_job(job)?;
    tracing::info!(job = %id, "job queued");
    Ok(id)
}

/// Jobs in id order.
pub fn list(store: &impl JobStore, all: bool) -> Result<Vec<BuildJob>> {
    let mut jobs = store.jobs()?;
    if !all {
        jobs.retain(|job| !job.complete);
    }
    jobs.sort_by_key(|job| job.id);
    Ok(jobs)
}

pub fn kill(store: &impl JobStore, id: JobId) -> Result<()> {
    match store.request_kill(id) {
        Ok(true) => Ok(()),
        Ok(false) => Err(ExitError::failed(format!("job {} is not running", id)).into()),
        Err(StoreError::NotFound { .. }) => Err(ExitError::failed(format!("no job {}", id)).into()),
        Err(e) => Err(e.into()),
    }
}

pub fn reap(store: &impl JobStore, clock: &impl Clock, stale: Duration, machine: Option<&str>) -> Result<Vec<JobId>> {
    let stale_before = clock.epoch_ms().saturating_sub(stale.as_millis() as u64);
    let reaped = store.mark_zombies(stale_before, machine)?;
    if !reaped.is_empty() {
        tracing::warn!(count = reaped.len(), "zombied abandoned jobs");
    }
    Ok(reaped)
}

pub fn format_job_list(out: &mut (impl Write + ?Sized), jobs: &[BuildJob]) {
    if jobs.is_empty() {
        let _ = writeln!(out, "No jobs");
        return;
    }

    let mut table = Table::new(vec!["ID", "NAME", "COMMAND", "BRANCH", "LABEL", "MACHINE", "STATUS"]);
    for job in jobs {
        table.row(vec![
            job.id.to_string(),
            job.name.clone(),
            job.command.clone(),
            job.branch.clone(),
            if job.label.is_empty() { "-".to_string() } else { job.label.clone() },
            job.machine.clone().unwrap_or_else(|| "-".to_string()),
            status_text(job),
        ]);
    }
    table.render(out);
}

fn status_text(job: &BuildJob) -> String {
    match (job.complete, job.succeeded) {
        (true, true) => "succeeded".to_string(),
        (true, false) => format!("{} (failed)", job.status),
        (false, _) => job.status.to_string(),
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
