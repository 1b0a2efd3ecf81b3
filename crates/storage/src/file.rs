// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed store shared by every agent on a host (or a network share).
//!
//! The whole state lives in one JSON document. Each operation takes an
//! advisory lock on a sidecar `.lock` file, loads the document, applies
//! the change, and atomically replaces the document (tmp + rename).

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::state::StoreState;
use crate::{JobStore, StoreError};

/// Current document schema version
pub const CURRENT_STORE_VERSION: u32 = 1;

/// The on-disk document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(rename = "v")]
    pub version: u32,
    pub state: StoreState,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileStore {
    /// Open (or lazily create) the store document at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let lock_path = path.with_extension("lock");
        Ok(Self { path, lock_path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_file(&self) -> Result<File, StoreError> {
        Ok(OpenOptions::new().create(true).truncate(false).write(true).open(&self.lock_path)?)
    }

    fn load(&self) -> Result<StoreState, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StoreState::default()),
            Err(e) => return Err(e.into()),
        };
        let doc: StoreDocument = serde_json::from_slice(&bytes)?;
        if doc.version != CURRENT_STORE_VERSION {
            return Err(StoreError::Version { found: doc.version, expected: CURRENT_STORE_VERSION });
        }
        Ok(doc.state)
    }

    fn save(&self, state: StoreState) -> Result<(), StoreError> {
        let doc = StoreDocument { version: CURRENT_STORE_VERSION, state, updated_at: Utc::now() };
        let tmp = self.path.with_extension("tmp");
        {
            let mut file = File::create(&tmp)?;
            serde_json::to_writer(&mut file, &doc)?;
            file.flush()?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl JobStore for FileStore {
    fn read<R>(&self, f: impl FnOnce(&StoreState) -> R) -> Result<R, StoreError> {
        let lock = self.lock_file()?;
        FileExt::lock_shared(&lock)?;
        let result = self.load().map(|state| f(&state));
        let _ = FileExt::unlock(&lock);
        result
    }

    fn transact<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> Result<R, StoreError> {
        let lock = self.lock_file()?;
        FileExt::lock_exclusive(&lock)?;
        let result = self.load().and_then(|mut state| {
            let out = f(&mut state);
            self.save(state)?;
            Ok(out)
        });
        if let Err(e) = FileExt::unlock(&lock) {
            tracing::warn!(path = %self.lock_path.display(), error = %e, "failed to release store lock");
        }
        result
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
