// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A branch with one build agent and one CIS scanner sharing a store.

use std::path::Path;

use forge_adapters::{FakeNotifyAdapter, FakeProcessAdapter, FakeSccAdapter};
use forge_cis::{watermarks, CisDeps, CisEngine, CisSettings, TaskId};
use forge_core::test_support::changelist;
use forge_core::{BuildJob, FakeClock, JobId};
use forge_engine::{Agent, AgentDeps, AgentSettings};
use forge_script::{script_path, ToolPaths};
use forge_storage::{JobStore, MemoryStore, StoreState};
use tempfile::TempDir;

pub const BRANCH: &str = "UE3";
pub const MACHINE: &str = "builder-01";
pub const CIS_ADDRESS: &str = "cis@example.com";

pub type TestAgent = Agent<MemoryStore, FakeSccAdapter, FakeNotifyAdapter, FakeProcessAdapter, FakeClock>;
pub type TestCis = CisEngine<MemoryStore, FakeSccAdapter, FakeNotifyAdapter, FakeClock>;

pub struct Branch {
    pub agent: TestAgent,
    pub cis: TestCis,
    pub store: MemoryStore,
    pub scc: FakeSccAdapter,
    pub notify: FakeNotifyAdapter,
    pub process: FakeProcessAdapter,
    pub dir: TempDir,
}

/// Every task scanned up to `processed` and good since then, last failed at `failed`.
pub fn healthy_state(processed: i64, failed: i64) -> StoreState {
    let mut state = StoreState::default();
    state.set_watermark(BRANCH, watermarks::LAST_ATTEMPTED_OVERALL, processed);
    for task in TaskId::ALL {
        state.set_watermark(BRANCH, &watermarks::last_attempted(task), processed);
        state.set_watermark(BRANCH, &watermarks::last_good(task), processed);
        state.set_watermark(BRANCH, &watermarks::last_fail(task), failed);
    }
    state
}

impl Branch {
    pub fn new(state: StoreState) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::with_state(state);
        let scc = FakeSccAdapter::new();
        let notify = FakeNotifyAdapter::new();
        let process = FakeProcessAdapter::new();
        let clock = FakeClock::new();

        let mut settings = AgentSettings::new(MACHINE, dir.path().join("scripts"), dir.path().join("logs"));
        settings.script_defaults.tools =
            ToolPaths { msvc: Some("devenv.com".into()), make: Some("make".into()), game: None };
        settings.fail_addresses = vec!["build-breaks@example.com".to_string()];
        let agent = Agent::new(
            AgentDeps { store: store.clone(), scc: scc.clone(), notifier: notify.clone(), process: process.clone() },
            settings,
            clock.clone(),
        );

        let mut cis_settings = CisSettings::new(BRANCH);
        cis_settings.cis_addresses = vec![CIS_ADDRESS.to_string()];
        let cis = CisEngine::new(
            CisDeps { store: store.clone(), scc: scc.clone(), notifier: notify.clone() },
            cis_settings,
            clock.clone(),
        );

        Self { agent, cis, store, scc, notify, process, dir }
    }

    pub fn scripts_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("scripts")
    }

    pub fn script(&self, command: &str, body: &str) {
        write_script(&self.scripts_dir(), command, body);
    }

    /// Submit a changelist touching `files` (paths under the branch root).
    pub fn submit(&self, number: i64, files: &[&str]) {
        let files: Vec<String> = files.iter().map(|f| format!("//depot/{}/{}", BRANCH, f)).collect();
        let files: Vec<&str> = files.iter().map(String::as_str).collect();
        self.scc.add_change(changelist(number, &files));
    }

    /// Tick the agent until `id` is released.
    pub async fn run(&mut self, id: JobId) -> BuildJob {
        for _ in 0..50 {
            self.agent.tick().await.unwrap();
            let job = self.store.job(id).unwrap();
            if job.complete && self.agent.active_job().is_none() {
                return job;
            }
        }
        panic!("job {} never finished", id);
    }

    pub fn watermark(&self, key: &str) -> i64 {
        self.store.watermark(BRANCH, key).unwrap()
    }
}

pub fn write_script(scripts: &Path, command: &str, body: &str) {
    let path = script_path(scripts, command);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
}
