// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Revision-control client boundary.
//!
//! Every operation returns an explicit [`SccError`]; callers decide which
//! build error kind a failure maps to.

mod p4;
mod ztag;

pub use p4::P4CliAdapter;

use async_trait::async_trait;
use forge_core::ChangeList;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SccError {
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`p4 {command}` failed: {message}")]
    CommandFailed { command: String, message: String },
    #[error("unexpected output from `p4 {command}`: {detail}")]
    Parse { command: String, detail: String },
    #[error("{0}")]
    Rejected(String),
}

/// A label resolved to the changelist it was taken at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelInfo {
    pub name: String,
    pub changelist: i64,
    pub description: String,
}

/// Narrow revision-control contract used by the dispatcher and CIS.
#[async_trait]
pub trait SccAdapter: Clone + Send + Sync + 'static {
    /// Select the client workspace for subsequent operations.
    fn use_client(&self, client: Option<&str>);

    async fn get_client_root(&self) -> Result<String, SccError>;

    /// Sync `file_spec` to `changelist`; returns the server's report lines.
    async fn sync_to_changelist(&self, file_spec: &str, changelist: i64) -> Result<Vec<String>, SccError>;

    /// Open files for edit; returns the depot paths opened.
    async fn checkout_file_spec(&self, file_spec: &str) -> Result<Vec<String>, SccError>;

    async fn revert(&self, file_specs: &[String]) -> Result<(), SccError>;

    /// Submit the given open files; returns the submitted changelist.
    async fn submit(&self, description: &str, files: &[String]) -> Result<i64, SccError>;

    /// Accept-merge every pending resolve in the client.
    async fn auto_resolve(&self) -> Result<(), SccError>;

    /// Newest submitted changelist touching `file_spec`.
    async fn get_most_recent_build(&self, file_spec: &str) -> Result<i64, SccError>;

    /// Submitted changelists in `first..=last` touching `file_spec`, with files.
    async fn get_changes_in_range(
        &self,
        file_spec: &str,
        first: i64,
        last: i64,
    ) -> Result<Vec<ChangeList>, SccError>;

    async fn get_label_info(&self, label: &str) -> Result<LabelInfo, SccError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{LabelInfo, SccAdapter, SccError};
    use async_trait::async_trait;
    use forge_core::ChangeList;
    use parking_lot::Mutex;
    use std::collections::{BTreeMap, HashSet};
    use std::sync::Arc;

    /// Recorded revision-control call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum SccCall {
        UseClient(Option<String>),
        GetClientRoot,
        Sync { file_spec: String, changelist: i64 },
        Checkout(String),
        Revert(Vec<String>),
        Submit { description: String, files: Vec<String> },
        AutoResolve,
        MostRecentBuild(String),
        ChangesInRange { first: i64, last: i64 },
        LabelInfo(String),
    }

    struct FakeSccState {
        calls: Vec<SccCall>,
        client_root: Result<String, String>,
        head: i64,
        changes: Vec<ChangeList>,
        labels: BTreeMap<String, i64>,
        /// Operation names ("sync", "submit", ...) that fail, with remaining count
        failures: BTreeMap<&'static str, u32>,
        opened: HashSet<String>,
        next_change: i64,
    }

    /// In-memory revision-control client for tests.
    #[derive(Clone)]
    pub struct FakeSccAdapter {
        inner: Arc<Mutex<FakeSccState>>,
    }

    impl Default for FakeSccAdapter {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeSccState {
                    calls: Vec::new(),
                    client_root: Ok("/build/ue3".to_string()),
                    head: 0,
                    changes: Vec::new(),
                    labels: BTreeMap::new(),
                    failures: BTreeMap::new(),
                    opened: HashSet::new(),
                    next_change: 10_000,
                })),
            }
        }
    }

    impl FakeSccAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<SccCall> {
            self.inner.lock().calls.clone()
        }

        pub fn revert_calls(&self) -> Vec<Vec<String>> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    SccCall::Revert(files) => Some(files),
                    _ => None,
                })
                .collect()
        }

        pub fn set_client_root(&self, root: &str) {
            self.inner.lock().client_root = Ok(root.to_string());
        }

        pub fn fail_client_root(&self, message: &str) {
            self.inner.lock().client_root = Err(message.to_string());
        }

        /// Submitted changelists the server knows about. Also moves head.
        pub fn add_change(&self, change: ChangeList) {
            let mut inner = self.inner.lock();
            inner.head = inner.head.max(change.number);
            inner.changes.push(change);
        }

        pub fn set_head(&self, head: i64) {
            self.inner.lock().head = head;
        }

        pub fn add_label(&self, name: &str, changelist: i64) {
            self.inner.lock().labels.insert(name.to_string(), changelist);
        }

        /// Fail the next `times` calls of `op` (e.g. "sync", "checkout", "submit").
        pub fn fail(&self, op: &'static str, times: u32) {
            self.inner.lock().failures.insert(op, times);
        }
    }

    impl FakeSccState {
        fn check(&mut self, op: &'static str) -> Result<(), SccError> {
            match self.failures.get_mut(op) {
                Some(n) if *n > 0 => {
                    *n -= 1;
                    Err(SccError::Rejected(format!("{} rejected by server", op)))
                }
                _ => Ok(()),
            }
        }
    }

    #[async_trait]
    impl SccAdapter for FakeSccAdapter {
        fn use_client(&self, client: Option<&str>) {
            self.inner.lock().calls.push(SccCall::UseClient(client.map(str::to_string)));
        }

        async fn get_client_root(&self) -> Result<String, SccError> {
            let mut inner = self.inner.lock();
            inner.calls.push(SccCall::GetClientRoot);
            inner.client_root.clone().map_err(SccError::Rejected)
        }

        async fn sync_to_changelist(&self, file_spec: &str, changelist: i64) -> Result<Vec<String>, SccError> {
            let mut inner = self.inner.lock();
            inner.calls.push(SccCall::Sync { file_spec: file_spec.to_string(), changelist });
            inner.check("sync")?;
            Ok(vec![format!("{}@{} - synced", file_spec, changelist)])
        }

        async fn checkout_file_spec(&self, file_spec: &str) -> Result<Vec<String>, SccError> {
            let mut inner = self.inner.lock();
            inner.calls.push(SccCall::Checkout(file_spec.to_string()));
            inner.check("checkout")?;
            inner.opened.insert(file_spec.to_string());
            Ok(vec![file_spec.to_string()])
        }

        async fn revert(&self, file_specs: &[String]) -> Result<(), SccError> {
            let mut inner = self.inner.lock();
            inner.calls.push(SccCall::Revert(file_specs.to_vec()));
            inner.check("revert")?;
            for spec in file_specs {
                inner.opened.remove(spec);
            }
            Ok(())
        }

        async fn submit(&self, description: &str, files: &[String]) -> Result<i64, SccError> {
            let mut inner = self.inner.lock();
            inner.calls.push(SccCall::Submit {
                description: description.to_string(),
                files: files.to_vec(),
            });
            inner.check("submit")?;
            inner.next_change += 1;
            let number = inner.next_change;
            inner.head = inner.head.max(number);
            Ok(number)
        }

        async fn auto_resolve(&self) -> Result<(), SccError> {
            let mut inner = self.inner.lock();
            inner.calls.push(SccCall::AutoResolve);
            inner.check("resolve")
        }

        async fn get_most_recent_build(&self, file_spec: &str) -> Result<i64, SccError> {
            let mut inner = self.inner.lock();
            inner.calls.push(SccCall::MostRecentBuild(file_spec.to_string()));
            inner.check("head")?;
            Ok(inner.head)
        }

        async fn get_changes_in_range(
            &self,
            _file_spec: &str,
            first: i64,
            last: i64,
        ) -> Result<Vec<ChangeList>, SccError> {
            let mut inner = self.inner.lock();
            inner.calls.push(SccCall::ChangesInRange { first, last });
            inner.check("changes")?;
            let mut found: Vec<ChangeList> = inner
                .changes
                .iter()
                .filter(|c| c.number >= first && c.number <= last)
                .cloned()
                .collect();
            // Servers list newest first.
            found.sort_by(|a, b| b.number.cmp(&a.number));
            Ok(found)
        }

        async fn get_label_info(&self, label: &str) -> Result<LabelInfo, SccError> {
            let mut inner = self.inner.lock();
            inner.calls.push(SccCall::LabelInfo(label.to_string()));
            match inner.labels.get(label) {
                Some(cl) => Ok(LabelInfo {
                    name: label.to_string(),
                    changelist: *cl,
                    description: String::new(),
                }),
                None => Err(SccError::Rejected(format!("label {} does not exist", label))),
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSccAdapter, SccCall};
