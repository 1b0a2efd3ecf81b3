// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_is_monotonic() {
    let clock = SystemClock;
    let t1 = clock.now();
    std::thread::sleep(Duration::from_millis(1));
    assert!(clock.now() > t1);
}

#[test]
fn system_clock_epoch_is_after_2020() {
    assert!(SystemClock.epoch_ms() > 1_577_836_800_000);
}

#[test]
fn fake_clock_advance_moves_both_times() {
    let clock = FakeClock::new();
    let t1 = clock.now();
    clock.advance(Duration::from_secs(90));
    assert_eq!(clock.now().duration_since(t1), Duration::from_secs(90));
    assert_eq!(clock.epoch_ms(), FakeClock::START_EPOCH_MS + 90_000);
}

#[test]
fn fake_clock_clones_share_time() {
    let clock = FakeClock::new();
    let other = clock.clone();
    other.advance(Duration::from_secs(30));
    assert_eq!(clock.epoch_ms(), other.epoch_ms());
}

#[test]
fn fake_clock_utc_renders_start_of_2026() {
    let clock = FakeClock::new();
    assert_eq!(clock.utc().to_rfc3339(), "2026-01-01T00:00:00+00:00");
}

#[test]
fn set_epoch_ms_leaves_instant_alone() {
    let clock = FakeClock::new();
    let before = clock.now();
    clock.set_epoch_ms(5);
    assert_eq!(clock.epoch_ms(), 5);
    assert_eq!(clock.now(), before);
}
