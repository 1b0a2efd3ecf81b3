// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agents on separate handles to one file-backed store.

use std::collections::BTreeSet;
use std::path::Path;

use forge_adapters::{FakeNotifyAdapter, FakeProcessAdapter, FakeSccAdapter};
use forge_core::{FakeClock, JobId, JobStatus, NewJob};
use forge_engine::{Agent, AgentDeps, AgentSettings};
use forge_storage::{FileStore, JobStore};

use crate::prelude::write_script;

const COMMAND: &str = "Jobs/Nightly";

type FileAgent = Agent<FileStore, FakeSccAdapter, FakeNotifyAdapter, FakeProcessAdapter, FakeClock>;

fn agent(root: &Path, store: &Path, machine: &str) -> FileAgent {
    let mut settings = AgentSettings::new(machine, root.join("scripts"), root.join("logs").join(machine));
    settings.script_defaults.tools.msvc = Some("devenv.com".into());
    let deps = AgentDeps {
        store: FileStore::open(store).unwrap(),
        scc: FakeSccAdapter::new(),
        notifier: FakeNotifyAdapter::new(),
        process: FakeProcessAdapter::new(),
    };
    Agent::new(deps, settings, FakeClock::new())
}

fn finished(store: &FileStore, ids: &[JobId]) -> bool {
    ids.iter().all(|id| store.job(*id).unwrap().complete)
}

#[tokio::test]
async fn two_agents_split_the_queue() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    write_script(&dir.path().join("scripts"), COMMAND, "sync 4411\nmsvcbuild Example\n");

    let submitter = FileStore::open(&path).unwrap();
    let ids = vec![
        submitter.insert_job(NewJob::new("Nightly PC", COMMAND, "UE3")).unwrap(),
        submitter.insert_job(NewJob::new("Nightly PS3", COMMAND, "UE3").platform("PS3")).unwrap(),
    ];

    let mut a = agent(dir.path(), &path, "builder-a");
    let mut b = agent(dir.path(), &path, "builder-b");
    for _ in 0..50 {
        a.tick().await.unwrap();
        b.tick().await.unwrap();
        if finished(&submitter, &ids) {
            break;
        }
    }

    let jobs: Vec<_> = ids.iter().map(|id| submitter.job(*id).unwrap()).collect();
    assert!(jobs.iter().all(|j| j.complete && j.succeeded && j.status == JobStatus::Dead));
    let machines: BTreeSet<_> = jobs.iter().filter_map(|j| j.machine.clone()).collect();
    similar_asserts::assert_eq!(machines, BTreeSet::from(["builder-a".to_string(), "builder-b".to_string()]));

    let heartbeats = submitter.read(|s| s.heartbeats.keys().cloned().collect::<Vec<_>>()).unwrap();
    assert_eq!(heartbeats, vec!["builder-a".to_string(), "builder-b".to_string()]);
}

#[tokio::test]
async fn store_document_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let id = {
        let store = FileStore::open(&path).unwrap();
        let id = store.insert_job(NewJob::new("Nightly", COMMAND, "UE3").label("4411")).unwrap();
        store.set_watermark("UE3", "LastAttemptedOverall", 4411).unwrap();
        id
    };

    let doc: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(doc["v"], 1);
    assert!(doc["updated_at"].is_string());

    let reopened = FileStore::open(&path).unwrap();
    let job = reopened.job(id).unwrap();
    assert_eq!(job.label_changelist(), Some(4411));
    assert_eq!(reopened.watermark("UE3", "LastAttemptedOverall").unwrap(), 4411);
}
