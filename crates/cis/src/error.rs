// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use forge_adapters::SccError;
use forge_storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CisError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("revision control error: {0}")]
    Scc(#[from] SccError),
}
