// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    none = { ErrorKind::None, ErrorCategory::None, "None" },
    no_script = { ErrorKind::NoScript, ErrorCategory::Script, "NoScript" },
    illegal = { ErrorKind::IllegalCommand, ErrorCategory::Script, "IllegalCommand" },
    sync = { ErrorKind::SccSync, ErrorCategory::SourceControl, "SCC_Sync" },
    checkout = { ErrorKind::SccCheckout, ErrorCategory::SourceControl, "SCC_Checkout" },
    submit = { ErrorKind::SccSubmit, ErrorCategory::SourceControl, "SCC_Submit" },
    revert = { ErrorKind::SccRevert, ErrorCategory::SourceControl, "SCC_Revert" },
    changes = { ErrorKind::SccGetChanges, ErrorCategory::SourceControl, "SCC_GetChanges" },
    client_root = { ErrorKind::SccGetClientRoot, ErrorCategory::SourceControl, "SCC_GetClientRoot" },
    process = { ErrorKind::Process, ErrorCategory::Process, "Process" },
    timed_out = { ErrorKind::TimedOut, ErrorCategory::Process, "TimedOut" },
)]
fn kind_category_and_name(kind: ErrorKind, category: ErrorCategory, name: &str) {
    assert_eq!(kind.category(), category);
    assert_eq!(kind.to_string(), name);
}

#[test]
fn only_none_is_not_an_error() {
    let errors: Vec<_> = ErrorKind::ALL.iter().filter(|k| !k.is_error()).collect();
    assert_eq!(errors, vec![&ErrorKind::None]);
}
