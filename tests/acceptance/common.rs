//! Common utilities for acceptance tests.

#![allow(dead_code)] // Not every helper is used by every test module

use trc_common::{CounterKind, HardwarePort, TimerConfig};
use trc_timestamp::{SimulatedCounter, TimestampClock, TimestampClockBuilder};

/// Counter clock used when a test does not care about wall-clock time.
pub const TEST_FREQUENCY_HZ: u32 = 1_000_000;

/// Simulated counter matching `kind`.
///
/// `period` is ignored for free-running kinds, which are 32 bits wide.
pub fn counter_for(kind: CounterKind, period: u64) -> SimulatedCounter {
    let direction = kind.inherent_direction().unwrap_or_default();
    if kind.is_free_running() {
        SimulatedCounter::free_running(direction, 32, TEST_FREQUENCY_HZ)
    } else {
        SimulatedCounter::periodic(direction, period, TEST_FREQUENCY_HZ)
    }
}

/// Application-defined clock with explicit settings, not yet started.
pub fn application_clock(
    counter: &SimulatedCounter,
    kind: CounterKind,
    period: u64,
    divisor: u32,
    priority_order: u8,
) -> TimestampClock<SimulatedCounter> {
    let timer = TimerConfig {
        kind: Some(kind),
        period: (!kind.is_free_running()).then_some(period),
        divisor: Some(divisor),
        ..TimerConfig::default()
    };
    TimestampClockBuilder::new(counter.clone())
        .port(HardwarePort::ApplicationDefined)
        .timer(timer)
        .irq_priority_order(priority_order)
        .build()
        .expect("valid application-defined timer")
}

/// Start `clock` with the counter at `raw`, then move the counter to
/// `next_raw` and take one timestamp.
pub fn delta_between(
    counter: &SimulatedCounter,
    clock: &mut TimestampClock<SimulatedCounter>,
    raw: u64,
    next_raw: u64,
) -> u64 {
    counter.set_raw(raw);
    clock.start().expect("session starts");
    counter.set_raw(next_raw);
    clock.timestamp().expect("session is running").delta
}

