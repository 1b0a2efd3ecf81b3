// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queued build jobs and their lifecycle status.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::field::FieldValue;
use crate::id::{BuildLogId, JobId};

/// Lifecycle of a job row as seen by every agent sharing the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Queued and waiting for an agent
    #[default]
    Connected,
    /// Claimed and running on `machine`
    Building,
    /// Kill requested; the owning agent picks this up on its next poll
    Killing,
    /// Owner stopped heartbeating mid-build; needs manual attention
    Zombied,
    /// Finished, one way or another
    Dead,
}

impl JobStatus {
    /// Owned by an agent right now
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Building | JobStatus::Killing)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Zombied | JobStatus::Dead)
    }
}

crate::simple_display! {
    JobStatus {
        Connected => "connected",
        Building => "building",
        Killing => "killing",
        Zombied => "zombied",
        Dead => "dead",
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown job status `{0}`")]
pub struct ParseStatusError(pub String);

impl FromStr for JobStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "connected" => Ok(JobStatus::Connected),
            "building" => Ok(JobStatus::Building),
            "killing" => Ok(JobStatus::Killing),
            "zombied" => Ok(JobStatus::Zombied),
            "dead" => Ok(JobStatus::Dead),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// How a job run ended. The display form is the final status string
/// stamped on the build log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobOutcome {
    Succeeded,
    Failed,
    Killed,
}

crate::simple_display! {
    JobOutcome {
        Succeeded => "Succeeded",
        Failed => "Failed",
        Killed => "Killed",
    }
}

/// A row in the job queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildJob {
    pub id: JobId,
    pub name: String,
    /// Script reference, resolved against the agent's scripts directory
    pub command: String,
    pub branch: String,
    pub platform: String,
    pub game: String,
    pub configuration: String,
    /// Changelist number for CIS jobs, a label name otherwise (may be empty)
    pub label: String,
    pub primary: bool,
    pub status: JobStatus,
    pub machine: Option<String>,
    pub complete: bool,
    pub succeeded: bool,
    /// Set once a kill is requested and kept after release
    #[serde(default)]
    pub killed: bool,
    pub spawn_time_ms: u64,
    pub build_log: Option<BuildLogId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, FieldValue>,
}

impl BuildJob {
    /// The label as a changelist number, when it is one.
    pub fn label_changelist(&self) -> Option<i64> {
        self.label.trim().parse::<i64>().ok().filter(|cl| *cl > 0)
    }
}

crate::builder! {
    pub struct BuildJobBuilder => BuildJob {
        into {
            name: String = "nightly",
            command: String = "Jobs/Nightly",
            branch: String = "UE3",
            platform: String = "Win32",
            game: String = "Example",
            configuration: String = "Release",
            label: String = "",
        }
        set {
            id: JobId = JobId::new(1),
            primary: bool = false,
            status: JobStatus = JobStatus::Connected,
            machine: Option<String> = None,
            complete: bool = false,
            succeeded: bool = false,
            killed: bool = false,
            spawn_time_ms: u64 = 0,
            build_log: Option<BuildLogId> = None,
            extra: BTreeMap<String, FieldValue> = BTreeMap::new(),
        }
    }
}

/// A job about to be inserted into the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJob {
    pub name: String,
    pub command: String,
    pub branch: String,
    pub platform: String,
    pub game: String,
    pub configuration: String,
    pub label: String,
    pub primary: bool,
    pub spawn_time_ms: u64,
}

impl NewJob {
    pub fn new(name: impl Into<String>, command: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            branch: branch.into(),
            platform: "Win32".to_string(),
            game: "All".to_string(),
            configuration: "Release".to_string(),
            label: String::new(),
            primary: false,
            spawn_time_ms: 0,
        }
    }

    crate::setters! {
        into {
            platform: String,
            game: String,
            configuration: String,
            label: String,
        }
        set {
            primary: bool,
            spawn_time_ms: u64,
        }
    }

    /// Materialize the queued row once the store has issued an id.
    pub fn into_job(self, id: JobId) -> BuildJob {
        BuildJob {
            id,
            name: self.name,
            command: self.command,
            branch: self.branch,
            platform: self.platform,
            game: self.game,
            configuration: self.configuration,
            label: self.label,
            primary: self.primary,
            status: JobStatus::Connected,
            machine: None,
            complete: false,
            succeeded: false,
            killed: false,
            spawn_time_ms: self.spawn_time_ms,
            build_log: None,
            extra: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
