// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use parking_lot::Mutex;

use crate::state::StoreState;
use crate::{JobStore, StoreError};

/// Process-local store. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: StoreState) -> Self {
        Self { state: Arc::new(Mutex::new(state)) }
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> StoreState {
        self.state.lock().clone()
    }
}

impl JobStore for MemoryStore {
    fn read<R>(&self, f: impl FnOnce(&StoreState) -> R) -> Result<R, StoreError> {
        Ok(f(&self.state.lock()))
    }

    fn transact<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> Result<R, StoreError> {
        Ok(f(&mut self.state.lock()))
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
