// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    status = { "status", Some(Directive::Status) },
    buildconfig = { "buildconfig", Some(Directive::Setting(Setting::Configuration)) },
    cookmaps_alias = { "cookmaps", Some(Directive::Action(CommandToken::Cook)) },
    msvcfull = { "msvcfull", Some(Directive::Action(CommandToken::MsvcFull)) },
    unknown = { "deploy", None },
    uppercase_not_normalized_here = { "SYNC", None },
)]
fn keyword_lookup(keyword: &str, expected: Option<Directive>) {
    assert_eq!(lookup(keyword), expected);
}

#[yare::parameterized(
    bare = { "", true },
    on = { "on", true },
    off = { "OFF", false },
    zero = { "0", false },
)]
fn toggles(value: &str, expected: bool) {
    let mut config = ScriptConfig::default();
    apply(&mut config, Setting::CheckWarnings, value).unwrap();
    assert_eq!(config.check_warnings, expected);
}

#[test]
fn toggle_rejects_garbage() {
    let mut config = ScriptConfig::default();
    assert!(apply(&mut config, Setting::CheckErrors, "maybe").is_err());
    assert!(config.check_errors);
}

#[test]
fn timeout_rejects_non_numeric() {
    let mut config = ScriptConfig::default();
    let err = apply(&mut config, Setting::Timeout, "soon").unwrap_err();
    assert!(err.contains("soon"));
    assert_eq!(config.timeout, ScriptConfig::DEFAULT_TIMEOUT);
}

#[test]
fn timeout_out_of_range_is_rejected() {
    let mut config = ScriptConfig::default();
    let err = apply(&mut config, Setting::Timeout, "999999999999999999").unwrap_err();
    assert!(err.contains("out of range"));
    assert_eq!(config.timeout, ScriptConfig::DEFAULT_TIMEOUT);
}

#[test]
fn addresses_split_on_common_separators() {
    let mut config = ScriptConfig::default();
    apply(&mut config, Setting::FailAddress, "a@x.com; b@x.com,c@x.com").unwrap();
    assert_eq!(config.fail_addresses, vec!["a@x.com", "b@x.com", "c@x.com"]);
}

#[test]
fn empty_platform_is_rejected() {
    let mut config = ScriptConfig::default();
    assert!(apply(&mut config, Setting::Platform, "").is_err());
}
