// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const DESCRIBE: &str = "\
... change 4411
... user jdoe
... desc Fix PS3 shader cache

... depotFile0 //depot/UE3/Development/Src/PS3/PS3Drv.cpp
... depotFile1 //depot/UE3/Engine/Config/BaseEngine.ini
";

#[test]
fn describe_record_becomes_changelist() {
    // The blank line inside describe output splits the header from the files.
    let records = ztag::parse(DESCRIBE);
    let mut merged = Record::new();
    for record in records {
        merged.extend(record);
    }
    let cl = changelist_from_describe(4411, &merged);
    assert_eq!(cl.number, 4411);
    assert_eq!(cl.user, "jdoe");
    assert_eq!(
        cl.files,
        vec![
            "//depot/UE3/Development/Src/PS3/PS3Drv.cpp",
            "//depot/UE3/Engine/Config/BaseEngine.ini",
        ]
    );
}

#[test]
fn change_number_requires_change_field() {
    let records = ztag::parse("... user jdoe\n");
    assert!(matches!(change_number(&records[0], "changes"), Err(SccError::Parse { .. })));
}

#[tokio::test]
async fn missing_binary_is_a_spawn_error() {
    let p4 = P4CliAdapter::new("/nonexistent/forge-p4");
    let err = p4.get_client_root().await.unwrap_err();
    assert!(matches!(err, SccError::Spawn { .. }), "got {err:?}");
}

#[test]
fn use_client_is_shared_between_clones() {
    let p4 = P4CliAdapter::new("p4");
    let clone = p4.clone();
    clone.use_client(Some("build-ue3"));
    assert_eq!(p4.client.lock().as_deref(), Some("build-ue3"));
}
