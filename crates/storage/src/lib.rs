// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! forge-storage: the shared job queue, build log records, and CIS
//! watermarks

mod error;
mod file;
mod memory;
mod state;
mod store;

pub use error::StoreError;
pub use file::{FileStore, StoreDocument, CURRENT_STORE_VERSION};
pub use memory::MemoryStore;
pub use state::{CiJobQuery, StoreState};
pub use store::JobStore;
