// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod cis;
pub mod job;
pub mod run;
pub mod script;

use anyhow::{Context as _, Result};
use forge_storage::FileStore;

use crate::config::{Config, StatePaths};

/// What every command starts from: resolved paths and the parsed config.
#[derive(Debug, Clone)]
pub struct Context {
    pub paths: StatePaths,
    pub config: Config,
}

impl Context {
    pub fn load() -> Result<Self> {
        let paths = StatePaths::load()?;
        let config = Config::load(&paths.config)?;
        Ok(Self { paths, config })
    }

    pub fn store(&self) -> Result<FileStore> {
        let path = self.config.store_path(&self.paths);
        FileStore::open(&path).with_context(|| format!("opening job store {}", path.display()))
    }
}
