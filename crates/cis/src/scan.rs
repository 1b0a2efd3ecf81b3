// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The CIS scanner: queue builds for new changelists and roll the
//! per-task health markers up into branch-wide figures.
//!
//! Both passes are driven from outside (`forge cis scan`, `forge cis
//! monitor`) and never run concurrently with each other.

use std::path::PathBuf;
use std::time::Duration;

use forge_adapters::{NotifyAdapter, SccAdapter};
use forge_core::{ChangeList, Clock, JobId};
use forge_engine::cis_fixed_subject;
use forge_storage::JobStore;
use tracing::Instrument;

use crate::classify::{ChangeClassifier, DirtySet};
use crate::error::CisError;
use crate::health::{update_last_good_and_failed, TaskHealth, STALENESS_HORIZON};
use crate::registry::TaskId;
use crate::watermarks;

/// Scanner dependencies (adapters and store)
pub struct CisDeps<S, V, N> {
    pub store: S,
    pub scc: V,
    pub notifier: N,
}

#[derive(Debug, Clone)]
pub struct CisSettings {
    pub branch: String,
    /// Depot prefix the branch lives under
    pub depot_root: String,
    /// Where watch folders are checked; `None` skips the check
    pub workspace_root: Option<PathBuf>,
    pub staleness: Duration,
    pub cis_addresses: Vec<String>,
}

impl CisSettings {
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            depot_root: "//depot".to_string(),
            workspace_root: None,
            staleness: STALENESS_HORIZON,
            cis_addresses: Vec::new(),
        }
    }

    fn branch_spec(&self) -> String {
        format!("{}/{}/...", self.depot_root.trim_end_matches('/'), self.branch)
    }
}

/// Which changelists a scan looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Everything after `LastAttemptedOverall` up to head; advances watermarks
    Incremental,
    /// One changelist, watermarks untouched
    Changelist(i64),
    /// The head changelist, watermarks untouched
    Head,
    /// Every task at head; advances per-task watermarks
    Refresh,
}

forge_core::simple_display! {
    ScanMode {
        Incremental => "incremental",
        Changelist(..) => "changelist",
        Head => "head",
        Refresh => "refresh",
    }
}

/// One queued CI build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnedTask {
    pub task: TaskId,
    pub changelist: i64,
    pub job: JobId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// `LastAttemptedOverall` was missing or non-positive
    pub disabled: bool,
    /// Inclusive range scanned, `None` when it was empty
    pub range: Option<(i64, i64)>,
    pub changelists: usize,
    pub spawned: Vec<SpawnedTask>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorReport {
    pub tasks: Vec<(TaskId, TaskHealth)>,
    /// Branch-wide (LastGoodOverall, LastFailOverall), when written
    pub overall: Option<(i64, i64)>,
    pub good: bool,
    /// Changelist named in the fixed mail, when one was sent
    pub fixed_by: Option<i64>,
}

pub struct CisEngine<S, V, N, C> {
    store: S,
    scc: V,
    notifier: N,
    clock: C,
    settings: CisSettings,
    classifier: ChangeClassifier,
}

impl<S, V, N, C> CisEngine<S, V, N, C>
where
    S: JobStore,
    V: SccAdapter,
    N: NotifyAdapter,
    C: Clock,
{
    pub fn new(deps: CisDeps<S, V, N>, settings: CisSettings, clock: C) -> Self {
        Self {
            store: deps.store,
            scc: deps.scc,
            notifier: deps.notifier,
            clock,
            classifier: ChangeClassifier::new(&settings.depot_root, &settings.branch),
            settings,
        }
    }

    pub fn settings(&self) -> &CisSettings {
        &self.settings
    }

    /// Queue CI builds for changelists submitted since the last scan.
    pub async fn process_changes(&self, mode: ScanMode) -> Result<ScanReport, CisError> {
        let span = tracing::info_span!("cis.scan", branch = %self.settings.branch, %mode);
        self.process_changes_inner(mode).instrument(span).await
    }

    async fn process_changes_inner(&self, mode: ScanMode) -> Result<ScanReport, CisError> {
        let branch = self.settings.branch.as_str();
        let last_processed = self.store.watermark(branch, watermarks::LAST_ATTEMPTED_OVERALL)?;
        if last_processed <= 0 {
            tracing::warn!(branch, last_processed, "CIS not initialised for branch, skipping scan");
            return Ok(ScanReport { disabled: true, ..ScanReport::default() });
        }

        let latest = self.scc.get_most_recent_build(&self.settings.branch_spec()).await?;
        let (first, last, update) = match mode {
            ScanMode::Incremental => (last_processed + 1, latest, true),
            ScanMode::Changelist(n) => (n, n, false),
            ScanMode::Head => (latest, latest, false),
            ScanMode::Refresh => {
                tracing::info!(branch, changelist = latest, "refreshing every CIS task");
                let spawned = self.spawn_all(latest)?;
                return Ok(ScanReport { range: Some((latest, latest)), spawned, ..ScanReport::default() });
            }
        };

        if last < first {
            tracing::info!(branch, last_processed, latest, "No new changes have been checked in!");
            return Ok(ScanReport::default());
        }
        if !update {
            tracing::info!(branch, changelist = first, "building single changelist, monitor values untouched");
        }

        let report = self.spawn_cis_tasks(first, last, update).await?;
        Ok(report)
    }

    /// Classify `first..=last` oldest-first and queue a build per dirty task.
    ///
    /// With `update`, enabled tasks and `LastAttemptedOverall` advance to
    /// the scanned changelists; watermarks never move backwards.
    pub async fn spawn_cis_tasks(&self, first: i64, last: i64, update: bool) -> Result<ScanReport, CisError> {
        let branch = self.settings.branch.as_str();
        let mut changes: Vec<ChangeList> =
            self.scc.get_changes_in_range(&self.settings.branch_spec(), first, last).await?;
        changes.sort_by_key(|c| c.number);

        let mut report =
            ScanReport { range: Some((first, last)), changelists: changes.len(), ..ScanReport::default() };

        if changes.is_empty() {
            tracing::info!(branch, first, last, "None of the new changes require CIS jobs!");
        } else {
            let attempted = self.last_attempted_all()?;
            let now = self.clock.epoch_ms();
            let mut dirty = DirtySet::new();
            for change in &changes {
                self.classifier.mark_changelist(change, &mut dirty);
                tracing::debug!(branch, changelist = change.number, dirty = dirty.len(), "processing changelist");
                for (task, last_attempted) in &attempted {
                    if *last_attempted <= 0 {
                        continue;
                    }
                    if task.def().compile_allowed && dirty.clear(*task) {
                        report.spawned.push(self.spawn(*task, change.number, now)?);
                    }
                    if update {
                        self.advance(&watermarks::last_attempted(*task), change.number)?;
                    }
                }
            }
        }

        if update {
            self.advance(watermarks::LAST_ATTEMPTED_OVERALL, last)?;
        }
        tracing::info!(
            branch,
            first,
            last,
            changelists = report.changelists,
            spawned = report.spawned.len(),
            "CIS scan complete"
        );
        Ok(report)
    }

    /// Recompute every task's health and the branch-wide figures.
    pub async fn update_monitor_values(&self) -> Result<MonitorReport, CisError> {
        let branch = self.settings.branch.as_str();
        let now = self.clock.epoch_ms();
        let mut report = MonitorReport { good: true, ..MonitorReport::default() };

        let mut lowest_good = i64::MAX;
        let mut highest_fail = 0;
        let mut changer: Option<i64> = None;
        let mut all_valid = true;

        for task in TaskId::ALL {
            let health = update_last_good_and_failed(&self.store, branch, task, now, self.settings.staleness)?;
            if health.is_valid() {
                if health.good && health.success_changed {
                    changer = Some(changer.map_or(health.changer, |c| c.max(health.changer)));
                }
                report.good &= health.good;
                lowest_good = lowest_good.min(health.last_good);
                highest_fail = highest_fail.max(health.last_fail);
            } else {
                all_valid = false;
            }
            report.tasks.push((task, health));
        }

        tracing::info!(branch, last_good = lowest_good, last_fail = highest_fail, good = report.good, "overall CIS values");

        if !all_valid {
            tracing::info!(branch, "CIS disabled; database not updated");
            return Ok(report);
        }

        if let Some(changer) = changer.filter(|_| report.good) {
            let old_good = self.store.watermark(branch, watermarks::LAST_GOOD_OVERALL)?;
            self.send_fixed(old_good, changer).await;
            report.fixed_by = Some(changer);
        }

        self.store.set_watermark(branch, watermarks::LAST_GOOD_OVERALL, lowest_good)?;
        self.store.set_watermark(branch, watermarks::LAST_FAIL_OVERALL, highest_fail)?;
        report.overall = Some((lowest_good, highest_fail));
        Ok(report)
    }

    fn spawn_all(&self, changelist: i64) -> Result<Vec<SpawnedTask>, CisError> {
        let now = self.clock.epoch_ms();
        let mut spawned = Vec::new();
        for (task, last_attempted) in self.last_attempted_all()? {
            if last_attempted <= 0 {
                continue;
            }
            if task.def().compile_allowed {
                spawned.push(self.spawn(task, changelist, now)?);
            }
            self.advance(&watermarks::last_attempted(task), changelist)?;
        }
        Ok(spawned)
    }

    fn spawn(&self, task: TaskId, changelist: i64, now_ms: u64) -> Result<SpawnedTask, CisError> {
        let job = task
            .def()
            .command()
            .to_new_job(task.job_name(), self.settings.branch.as_str())
            .label(changelist.to_string())
            .spawn_time_ms(now_ms);
        let id = self.store.insert_job(job)?;
        tracing::info!(branch = %self.settings.branch, task = %task, changelist, job_id = %id, "queued CIS build");
        Ok(SpawnedTask { task, changelist, job: id })
    }

    /// Each task's `LastAttempted` watermark, -1 where its watch folders
    /// are missing from the workspace.
    fn last_attempted_all(&self) -> Result<Vec<(TaskId, i64)>, CisError> {
        let branch = self.settings.branch.as_str();
        let mut out = Vec::with_capacity(TaskId::ALL.len());
        for task in TaskId::ALL {
            let mut value = self.store.watermark(branch, &watermarks::last_attempted(task))?;
            if value > 0 && !self.watch_folders_present(task) {
                tracing::debug!(branch, task = %task, "watch folder missing, task disabled");
                value = -1;
            }
            out.push((task, value));
        }
        Ok(out)
    }

    fn watch_folders_present(&self, task: TaskId) -> bool {
        let Some(root) = &self.settings.workspace_root else {
            return true;
        };
        task.def().watch_folders.iter().all(|folder| root.join(folder).is_dir())
    }

    fn advance(&self, key: &str, changelist: i64) -> Result<(), CisError> {
        let branch = self.settings.branch.as_str();
        let current = self.store.watermark(branch, key)?;
        if changelist > current {
            self.store.set_watermark(branch, key, changelist)?;
        }
        Ok(())
    }

    async fn send_fixed(&self, old_good: i64, changer: i64) {
        let branch = self.settings.branch.as_str();
        let subject = cis_fixed_subject(branch, changer);
        let body = format!(
            "CIS ({}) is good again.\n\nLast good changelist before the break: {}\nFixed in changelist: {}\n",
            branch, old_good, changer
        );
        if let Err(e) = self.notifier.send_cis(&self.settings.cis_addresses, &subject, &body).await {
            tracing::warn!(branch, changelist = changer, error = %e, "failed to send CIS fixed mail");
        }
    }
}

#[cfg(test)]
#[path = "scan_tests.rs"]
mod tests;
