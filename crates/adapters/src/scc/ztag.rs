// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parser for `p4 -ztag` tagged output.
//!
//! Records are runs of `... key value` lines separated by blank lines.

use std::collections::BTreeMap;

pub(crate) type Record = BTreeMap<String, String>;

pub(crate) fn parse(output: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut current = Record::new();
    for line in output.lines() {
        let Some(tagged) = line.strip_prefix("... ") else {
            if line.trim().is_empty() && !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            continue;
        };
        let (key, value) = match tagged.split_once(' ') {
            Some((k, v)) => (k, v),
            None => (tagged, ""),
        };
        // A repeated key starts a new record even without a blank line.
        if current.contains_key(key) {
            records.push(std::mem::take(&mut current));
        }
        current.insert(key.to_string(), value.to_string());
    }
    if !current.is_empty() {
        records.push(current);
    }
    records
}

/// Indexed fields (`depotFile0`, `depotFile1`, ...) in index order.
pub(crate) fn indexed<'a>(record: &'a Record, prefix: &str) -> Vec<&'a str> {
    let mut values: Vec<(usize, &str)> = record
        .iter()
        .filter_map(|(k, v)| {
            let index = k.strip_prefix(prefix)?.parse::<usize>().ok()?;
            Some((index, v.as_str()))
        })
        .collect();
    values.sort_by_key(|(i, _)| *i);
    values.into_iter().map(|(_, v)| v).collect()
}

#[cfg(test)]
#[path = "ztag_tests.rs"]
mod tests;
