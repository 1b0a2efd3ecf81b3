// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Row identifiers issued by the job store.
//!
//! Ids are positive integers. Zero means "none" and negative values only
//! appear on the poll channel, where `-id` is a kill request for `id`.

/// Define a newtype over a store-issued `i64` row id.
///
/// Generates `new()`, `get()`, `is_set()`, `Display`, and `From<i64>`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            pub const fn get(self) -> i64 {
                self.0
            }

            /// True for ids the store actually issued
            pub const fn is_set(self) -> bool {
                self.0 > 0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

define_id! {
    /// Identifier of a [`BuildJob`](crate::BuildJob) row.
    pub struct JobId;
}

define_id! {
    /// Identifier of a [`BuildLogRecord`](crate::BuildLogRecord) row.
    pub struct BuildLogId;
}

/// What a store poll asks the agent to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollSignal {
    Idle,
    Kill(JobId),
    Claim(JobId),
}

impl PollSignal {
    /// Decode the signed poll channel: `0` idle, `-id` kill, `+id` claim.
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            0 => PollSignal::Idle,
            n if n < 0 => PollSignal::Kill(JobId::new(-n)),
            n => PollSignal::Claim(JobId::new(n)),
        }
    }

    pub fn to_raw(self) -> i64 {
        match self {
            PollSignal::Idle => 0,
            PollSignal::Kill(id) => -id.get(),
            PollSignal::Claim(id) => id.get(),
        }
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
