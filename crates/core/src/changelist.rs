// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Changelists and per-target command definitions.

use serde::{Deserialize, Serialize};

use crate::job::NewJob;

/// An atomic, numbered set of source-control file changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeList {
    pub number: i64,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub description: String,
    /// Depot paths, in the order the server reported them
    #[serde(default)]
    pub files: Vec<String>,
}

impl ChangeList {
    pub fn new(number: i64) -> Self {
        Self { number, ..Self::default() }
    }

    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, user: impl Into<String>, description: impl Into<String>) -> Self {
        self.user = user.into();
        self.description = description.into();
        self
    }

    /// `Change 1234 by user: first line of description`
    pub fn summary(&self) -> String {
        let first = self.description.lines().next().unwrap_or("").trim();
        format!("Change {} by {}: {}", self.number, self.user, first)
    }
}

/// What a target builds: static per target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDefinition {
    pub platform: String,
    pub game: String,
    pub configuration: String,
    pub script: String,
}

impl CommandDefinition {
    /// Queue row that runs this definition.
    pub fn to_new_job(&self, name: impl Into<String>, branch: impl Into<String>) -> NewJob {
        NewJob::new(name, self.script.clone(), branch)
            .platform(self.platform.clone())
            .game(self.game.clone())
            .configuration(self.configuration.clone())
    }
}

#[cfg(test)]
#[path = "changelist_tests.rs"]
mod tests;
