// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `forge.toml`: agent, tool, classifier, CIS, and notification settings.
//!
//! Every section and key is optional. Relative paths resolve against the
//! directory holding the config file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use forge_cis::CisSettings;
use forge_engine::{AgentSettings, Signatures};
use forge_script::{ScriptConfig, ToolPaths};
use serde::Deserialize;
use thiserror::Error;

use crate::env;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub agent: AgentSection,
    pub tools: ToolsSection,
    pub classifier: Signatures,
    pub cis: CisSection,
    pub notify: NotifySection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentSection {
    pub machine: Option<String>,
    pub scripts_dir: Option<PathBuf>,
    /// Shared job store document
    pub store: Option<PathBuf>,
    pub workspace_root: Option<PathBuf>,
    pub client_root: Option<String>,
    pub tick_ms: u64,
    pub heartbeat_secs: u64,
    pub default_timeout_minutes: u64,
    /// `;` or `,` separated
    pub default_fail_address: Option<String>,
    pub default_success_address: Option<String>,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            machine: None,
            scripts_dir: None,
            store: None,
            workspace_root: None,
            client_root: None,
            tick_ms: 100,
            heartbeat_secs: 30,
            default_timeout_minutes: 10,
            default_fail_address: None,
            default_success_address: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsSection {
    pub msvc: Option<PathBuf>,
    pub make: Option<PathBuf>,
    pub game: Option<PathBuf>,
    /// Perforce command-line client
    pub p4: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CisSection {
    pub branch: String,
    pub depot_root: String,
    pub staleness_hours: u64,
    pub cis_address: Option<String>,
}

impl Default for CisSection {
    fn default() -> Self {
        Self { branch: "UE3".to_string(), depot_root: "//depot".to_string(), staleness_hours: 4, cis_address: None }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyKind {
    #[default]
    Outbox,
    Desktop,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotifySection {
    pub kind: NotifyKind,
    pub outbox_dir: Option<PathBuf>,
}

/// Files and directories under the state directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePaths {
    pub state_dir: PathBuf,
    pub config: PathBuf,
    pub lock: PathBuf,
    pub logs: PathBuf,
}

impl StatePaths {
    /// Resolve from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let state_dir = env::state_dir()?;
        let config = env::config_path().unwrap_or_else(|| state_dir.join("forge.toml"));
        Ok(Self::new(state_dir, config))
    }

    pub fn new(state_dir: PathBuf, config: PathBuf) -> Self {
        Self { lock: state_dir.join("agent.pid"), logs: state_dir.join("logs"), config, state_dir }
    }
}

impl Config {
    /// Read `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path: path.to_path_buf(), source }),
        };
        Self::parse(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// `FORGE_MACHINE`, then `[agent] machine`, then the host name.
    pub fn machine(&self) -> String {
        env::machine().or_else(|| self.agent.machine.clone()).unwrap_or_else(env::host_name)
    }

    pub fn tick(&self) -> Duration {
        env::tick_interval().unwrap_or(Duration::from_millis(self.agent.tick_ms.max(1)))
    }

    pub fn store_path(&self, paths: &StatePaths) -> PathBuf {
        resolve(paths, self.agent.store.as_deref()).unwrap_or_else(|| paths.state_dir.join("store.json"))
    }

    pub fn scripts_dir(&self, paths: &StatePaths) -> PathBuf {
        resolve(paths, self.agent.scripts_dir.as_deref()).unwrap_or_else(|| paths.state_dir.join("scripts"))
    }

    pub fn outbox_dir(&self, paths: &StatePaths) -> PathBuf {
        resolve(paths, self.notify.outbox_dir.as_deref()).unwrap_or_else(|| paths.state_dir.join("outbox"))
    }

    pub fn p4_program(&self) -> PathBuf {
        self.tools.p4.clone().unwrap_or_else(|| PathBuf::from("p4"))
    }

    pub fn agent_settings(&self, paths: &StatePaths) -> AgentSettings {
        let mut settings = AgentSettings::new(self.machine(), self.scripts_dir(paths), paths.logs.clone());
        settings.workspace_root = resolve(paths, self.agent.workspace_root.as_deref());
        settings.client_root = self.agent.client_root.clone();
        settings.heartbeat = Duration::from_secs(self.agent.heartbeat_secs.max(1));
        settings.script_defaults = ScriptConfig {
            timeout: Duration::from_secs(self.agent.default_timeout_minutes.saturating_mul(60)),
            tools: ToolPaths {
                msvc: self.tools.msvc.clone(),
                make: self.tools.make.clone(),
                game: self.tools.game.clone(),
            },
            ..ScriptConfig::default()
        };
        settings.fail_addresses = addresses(self.agent.default_fail_address.as_deref());
        settings.success_addresses = addresses(self.agent.default_success_address.as_deref());
        settings.signatures = self.classifier.clone();
        settings
    }

    pub fn cis_settings(&self, paths: &StatePaths) -> CisSettings {
        let mut settings = CisSettings::new(self.cis.branch.clone());
        settings.depot_root = self.cis.depot_root.clone();
        settings.workspace_root = resolve(paths, self.agent.workspace_root.as_deref());
        settings.staleness = Duration::from_secs(self.cis.staleness_hours.saturating_mul(60 * 60));
        settings.cis_addresses = addresses(self.cis.cis_address.as_deref());
        settings
    }
}

fn resolve(paths: &StatePaths, path: Option<&Path>) -> Option<PathBuf> {
    let path = path?;
    if path.is_absolute() {
        return Some(path.to_path_buf());
    }
    let base = paths.config.parent().unwrap_or(paths.state_dir.as_path());
    Some(base.join(path))
}

/// Split a mail list on `;` and `,`, dropping blanks.
pub fn addresses(list: Option<&str>) -> Vec<String> {
    list.unwrap_or_default()
        .split([';', ','])
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
