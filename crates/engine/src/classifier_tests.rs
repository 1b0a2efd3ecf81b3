// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn errors_only() -> ClassifyMode {
    ClassifyMode::checks(true, false)
}

#[test]
fn clean_log_succeeds() {
    let log = "Compiling Core.cpp\nLinking UT3.exe\nBuild: 1 succeeded, 0 failed\n";
    assert_eq!(LogClassifier::default().classify(log, errors_only()), SUCCEEDED);
}

#[test]
fn empty_log_succeeds() {
    assert_eq!(LogClassifier::default().classify("", errors_only()), SUCCEEDED);
}

#[test]
fn msvc_error_is_reported() {
    let log = "Compiling Foo.cpp\nFoo.cpp(12) : error C2143: syntax error : missing ';'\nDone\n";
    let status = LogClassifier::default().classify(log, errors_only());
    assert!(status.contains(" : error C2143"), "got {status}");
    assert!(!status.contains("Done"));
}

#[yare::parameterized(
    msvc  = { "Foo.cpp(3) : error C1004: unexpected end-of-file" },
    gcc   = { "Foo.cpp:3: error: expected ';' before '}' token" },
    fatal = { "Foo.cpp(1): fatal error C1083: Cannot open include file" },
    ucc   = { "Error, Unrecognized type 'Pawnn'" },
)]
fn error_signatures(line: &str) {
    let status = LogClassifier::default().classify(line, errors_only());
    assert_eq!(status, line);
}

#[test]
fn signatures_are_case_sensitive() {
    let log = "Foo.cpp(3) : ERROR C1004\nerror, not really";
    assert_eq!(LogClassifier::default().classify(log, errors_only()), SUCCEEDED);
}

#[test]
fn errors_ignored_when_checking_is_off() {
    let log = "Foo.cpp(3) : error C1004";
    let mode = ClassifyMode::checks(false, false);
    assert_eq!(LogClassifier::default().classify(log, mode), SUCCEEDED);
}

#[test]
fn warnings_only_when_enabled() {
    let log = "Foo.cpp(7) : warning C4100: unreferenced formal parameter";
    let classifier = LogClassifier::default();
    assert_eq!(classifier.classify(log, errors_only()), SUCCEEDED);
    assert_eq!(classifier.classify(log, ClassifyMode::checks(true, true)), log);
}

#[test]
fn separators_alone_do_not_fail() {
    let log = "------ Build started: Project: Core ------\n------ Build started: Project: Engine ------\n";
    assert_eq!(LogClassifier::default().classify(log, errors_only()), SUCCEEDED);
}

#[test]
fn separators_give_context_to_errors() {
    let log = "------ Build started: Project: Core ------\nCore.cpp\nCore.cpp(9) : error C2065\n";
    let status = LogClassifier::default().classify(log, errors_only());
    assert_eq!(status, "------ Build started: Project: Core ------\nCore.cpp(9) : error C2065");
}

#[test]
fn full_log_mode_keeps_every_line() {
    let log = "//depot/UE3/... - file(s) up-to-date.\nRequest rejected by server\n";
    let status = LogClassifier::default().classify(log, ClassifyMode::full_log());
    assert_eq!(status, "//depot/UE3/... - file(s) up-to-date.\nRequest rejected by server");
}

#[test]
fn custom_signatures_replace_defaults() {
    let classifier = LogClassifier::new(Signatures {
        errors: vec!["FAILED:".to_string()],
        ..Signatures::default()
    });
    assert_eq!(classifier.classify("Foo.cpp(3) : error C1004", errors_only()), SUCCEEDED);
    assert_eq!(classifier.classify("FAILED: cook", errors_only()), "FAILED: cook");
}

#[test]
fn missing_file_reads_as_clean() {
    let dir = tempfile::tempdir().unwrap();
    let status = LogClassifier::default().classify_file(&dir.path().join("none.log"), errors_only());
    assert_eq!(status, SUCCEEDED);
}

#[test]
fn file_with_error_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("01-msvcbuild.log");
    std::fs::write(&path, "Bar.cpp(1) : error C2143\n").unwrap();
    let status = LogClassifier::default().classify_file(&path, errors_only());
    assert_eq!(status, "Bar.cpp(1) : error C2143");
}
