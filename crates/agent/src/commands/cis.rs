// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `forge cis`: scan new changelists and refresh branch health.

use std::io::Write;

use anyhow::Result;
use clap::{ArgGroup, Args, Subcommand};
use forge_adapters::P4CliAdapter;
use forge_cis::{CisDeps, CisEngine, MonitorReport, ScanMode, ScanReport};
use forge_core::SystemClock;

use super::Context;
use crate::notifier::Notifier;
use crate::output::Table;

#[derive(Args)]
pub struct CisArgs {
    #[command(subcommand)]
    pub command: CisCommand,
}

#[derive(Subcommand)]
pub enum CisCommand {
    /// Queue CI builds for changelists submitted since the last scan
    #[command(group(ArgGroup::new("mode").args(["changelist", "head", "refresh"])))]
    Scan {
        /// Only look at this changelist; watermarks are left alone
        #[arg(long)]
        changelist: Option<i64>,
        /// Only look at the head changelist; watermarks are left alone
        #[arg(long)]
        head: bool,
        /// Queue every task at head and move per-task watermarks up
        #[arg(long)]
        refresh: bool,
    },
    /// Fold finished CI builds into last-good/last-failed and mail fixes
    Monitor {},
}

pub fn scan_mode(changelist: Option<i64>, head: bool, refresh: bool) -> ScanMode {
    match (changelist, head, refresh) {
        (Some(cl), _, _) => ScanMode::Changelist(cl),
        (None, true, _) => ScanMode::Head,
        (None, false, true) => ScanMode::Refresh,
        (None, false, false) => ScanMode::Incremental,
    }
}

pub async fn handle(command: CisCommand, ctx: &Context) -> Result<()> {
    let deps = CisDeps {
        store: ctx.store()?,
        scc: P4CliAdapter::new(ctx.config.p4_program()),
        notifier: Notifier::from_config(&ctx.config, &ctx.paths),
    };
    let engine = CisEngine::new(deps, ctx.config.cis_settings(&ctx.paths), SystemClock);
    let mut out = std::io::stdout();

    match command {
        CisCommand::Scan { changelist, head, refresh } => {
            let report = engine.process_changes(scan_mode(changelist, head, refresh)).await?;
            format_scan(&mut out, &report);
        }
        CisCommand::Monitor {} => {
            let report = engine.update_monitor_values().await?;
            format_monitor(&mut out, &report);
        }
    }
    Ok(())
}

pub fn format_scan(out: &mut (impl Write + ?Sized), report: &ScanReport) {
    if report.disabled {
        let _ = writeln!(out, "CIS is not initialised on this branch");
        return;
    }
    if let Some((first, last)) = report.range {
        let _ = writeln!(out, "Changelists {}..{}: {} to check", first, last, report.changelists);
    }
    if report.spawned.is_empty() {
        let _ = writeln!(out, "No CIS jobs queued");
        return;
    }
    for spawned in &report.spawned {
        let _ = writeln!(out, "Queued {} @ {} (job {})", spawned.task, spawned.changelist, spawned.job);
    }
}

pub fn format_monitor(out: &mut (impl Write + ?Sized), report: &MonitorReport) {
    let mut table = Table::new(vec!["TASK", "STATE", "LAST GOOD", "LAST FAILED"]);
    for (task, health) in &report.tasks {
        table.row(vec![
            task.to_string(),
            if health.good { "good" } else { "BROKEN" }.to_string(),
            health.last_good.to_string(),
            health.last_fail.to_string(),
        ]);
    }
    table.render(out);
    match report.overall {
        Some((good, fail)) => {
            let state = if report.good { "good" } else { "BROKEN" };
            let _ = writeln!(out, "Branch {} (last good {}, last failed {})", state, good, fail);
        }
        None => {
            let _ = writeln!(out, "Branch state not updated; a task is disabled or unreadable");
        }
    }
    if let Some(changelist) = report.fixed_by {
        let _ = writeln!(out, "Fixed in changelist {}", changelist);
    }
}

#[cfg(test)]
#[path = "cis_tests.rs"]
mod tests;
