// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `p4` command-line client.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use forge_core::ChangeList;
use parking_lot::Mutex;
use tracing::field::Empty;
use tracing::Instrument;

use super::ztag::{self, Record};
use super::{LabelInfo, SccAdapter, SccError};

/// Shells out to `p4 -ztag` and parses the tagged output.
#[derive(Clone, Debug)]
pub struct P4CliAdapter {
    program: PathBuf,
    client: Arc<Mutex<Option<String>>>,
}

impl P4CliAdapter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), client: Arc::new(Mutex::new(None)) }
    }

    async fn run(&self, args: &[&str]) -> Result<Vec<Record>, SccError> {
        let command = args.join(" ");
        let span = tracing::info_span!("scc.p4", cmd = %command, exit_code = Empty, duration_ms = Empty);

        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.arg("-ztag");
        let client = self.client.lock().clone();
        if let Some(client) = client {
            cmd.arg("-c").arg(client);
        }
        cmd.args(args).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());

        let start = Instant::now();
        let output = cmd.output().instrument(span.clone()).await.map_err(|source| SccError::Spawn {
            program: self.program.display().to_string(),
            source,
        })?;
        span.record("exit_code", output.status.code().unwrap_or(-1));
        span.record("duration_ms", start.elapsed().as_millis() as u64);

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = if stderr.trim().is_empty() { stdout.trim() } else { stderr.trim() };
            return Err(SccError::CommandFailed { command, message: message.to_string() });
        }
        Ok(ztag::parse(&stdout))
    }

    async fn changelist_of(&self, args: &[&str]) -> Result<i64, SccError> {
        let records = self.run(args).await?;
        let first = records.first().ok_or_else(|| SccError::Parse {
            command: args.join(" "),
            detail: "no changes reported".to_string(),
        })?;
        change_number(first, &args.join(" "))
    }

    async fn describe(&self, number: i64) -> Result<ChangeList, SccError> {
        let number_arg = number.to_string();
        let records = self.run(&["describe", "-s", &number_arg]).await?;
        if records.is_empty() {
            return Err(SccError::Parse {
                command: format!("describe -s {}", number),
                detail: "empty description".to_string(),
            });
        }
        // The header and the file list arrive as separate tagged blocks.
        let merged = records.into_iter().fold(Record::new(), |mut acc, r| {
            acc.extend(r);
            acc
        });
        Ok(changelist_from_describe(number, &merged))
    }
}

fn change_number(record: &Record, command: &str) -> Result<i64, SccError> {
    record.get("change").and_then(|c| c.trim().parse().ok()).ok_or_else(|| SccError::Parse {
        command: command.to_string(),
        detail: "missing change field".to_string(),
    })
}

pub(super) fn changelist_from_describe(number: i64, record: &Record) -> ChangeList {
    ChangeList::new(number)
        .with_description(
            record.get("user").cloned().unwrap_or_default(),
            record.get("desc").cloned().unwrap_or_default(),
        )
        .with_files(ztag::indexed(record, "depotFile"))
}

#[async_trait]
impl SccAdapter for P4CliAdapter {
    fn use_client(&self, client: Option<&str>) {
        *self.client.lock() = client.map(str::to_string);
    }

    async fn get_client_root(&self) -> Result<String, SccError> {
        let records = self.run(&["info"]).await?;
        records
            .iter()
            .find_map(|r| r.get("clientRoot"))
            .filter(|root| !root.is_empty() && root.as_str() != "*unknown*")
            .cloned()
            .ok_or_else(|| SccError::Parse {
                command: "info".to_string(),
                detail: "no client root".to_string(),
            })
    }

    async fn sync_to_changelist(&self, file_spec: &str, changelist: i64) -> Result<Vec<String>, SccError> {
        let spec = format!("{}@{}", file_spec, changelist);
        let records = self.run(&["sync", &spec]).await?;
        Ok(records
            .iter()
            .filter_map(|r| {
                let file = r.get("depotFile")?;
                let action = r.get("action").map(String::as_str).unwrap_or("updated");
                Some(format!("{} - {}", file, action))
            })
            .collect())
    }

    async fn checkout_file_spec(&self, file_spec: &str) -> Result<Vec<String>, SccError> {
        let records = self.run(&["edit", file_spec]).await?;
        Ok(records.iter().filter_map(|r| r.get("depotFile").cloned()).collect())
    }

    async fn revert(&self, file_specs: &[String]) -> Result<(), SccError> {
        if file_specs.is_empty() {
            return Ok(());
        }
        let mut args = vec!["revert"];
        args.extend(file_specs.iter().map(String::as_str));
        self.run(&args).await.map(|_| ())
    }

    async fn submit(&self, description: &str, files: &[String]) -> Result<i64, SccError> {
        // Checkouts land in the default changelist, so submit that whole.
        tracing::debug!(files = files.len(), "submitting default changelist");
        let records = self.run(&["submit", "-d", description]).await?;
        records
            .iter()
            .find_map(|r| r.get("submittedChange"))
            .and_then(|c| c.parse().ok())
            .ok_or_else(|| SccError::Parse {
                command: "submit".to_string(),
                detail: "no submitted change".to_string(),
            })
    }

    async fn auto_resolve(&self) -> Result<(), SccError> {
        self.run(&["resolve", "-am"]).await.map(|_| ())
    }

    async fn get_most_recent_build(&self, file_spec: &str) -> Result<i64, SccError> {
        self.changelist_of(&["changes", "-m1", "-s", "submitted", file_spec]).await
    }

    async fn get_changes_in_range(
        &self,
        file_spec: &str,
        first: i64,
        last: i64,
    ) -> Result<Vec<ChangeList>, SccError> {
        let spec = format!("{}@{},{}", file_spec, first, last);
        let records = self.run(&["changes", "-s", "submitted", &spec]).await?;
        let mut changes = Vec::with_capacity(records.len());
        for record in &records {
            let number = change_number(record, "changes")?;
            changes.push(self.describe(number).await?);
        }
        Ok(changes)
    }

    async fn get_label_info(&self, label: &str) -> Result<LabelInfo, SccError> {
        let spec = format!("//...@{}", label);
        let changelist = self.changelist_of(&["changes", "-m1", &spec]).await?;
        Ok(LabelInfo { name: label.to_string(), changelist, description: String::new() })
    }
}

#[cfg(test)]
#[path = "p4_tests.rs"]
mod tests;
