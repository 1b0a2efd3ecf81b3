// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use forge_storage::StoreError;
use thiserror::Error;

/// Failures that stop an agent tick. Build failures are not errors here;
/// they end the job and are reported through notifications.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
