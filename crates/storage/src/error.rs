// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use forge_core::Table;
use thiserror::Error;

/// Errors raised by a [`crate::JobStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store is locked by another process: {0}")]
    Locked(String),
    #[error("unsupported store version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
    #[error("no row {id} in {table}")]
    NotFound { table: Table, id: i64 },
    #[error("no column `{field}` in {table}")]
    UnknownField { table: Table, field: String },
    #[error("column `{field}` cannot hold {value}")]
    TypeMismatch { field: String, value: String },
}
