//! Worked timestamp examples.
//!
//! # Acceptance Criteria
//!
//! - Every counter kind absorbs exactly one wraparound
//! - The divisor discards the remainder
//! - Extension triggers strictly above 255 (8-bit) and 65535 (16-bit)
//! - Cumulative time does not depend on whether extension triggered

use super::common::{application_clock, counter_for, delta_between};
use trc_common::{CountDirection, CounterKind, IrqPriorityOrder, TraceError};
use trc_timestamp::{
    compare_priority, needs_extension, split_delta, EventWidth, SimulatedCounter,
    TimestampClockBuilder, Urgency, XtsKind,
};

#[test]
fn test_free_running_increasing_wraps_at_32_bits() {
    let counter = counter_for(CounterKind::FreeRunningIncreasing, 0);
    let mut clock = application_clock(&counter, CounterKind::FreeRunningIncreasing, 0, 1, 0);

    assert_eq!(delta_between(&counter, &mut clock, 0xFFFF_FFF0, 0x0000_0005), 21);
}

#[test]
fn test_free_running_decreasing_wraps_at_32_bits() {
    let counter = counter_for(CounterKind::FreeRunningDecreasing, 0);
    let mut clock = application_clock(&counter, CounterKind::FreeRunningDecreasing, 0, 1, 0);

    assert_eq!(delta_between(&counter, &mut clock, 0x0000_0005, 0xFFFF_FFF0), 21);
}

#[test]
fn test_periodic_decreasing_wraps_at_period() {
    let counter = counter_for(CounterKind::PeriodicDecreasing, 1_000);
    let mut clock = application_clock(&counter, CounterKind::PeriodicDecreasing, 1_000, 1, 0);

    assert_eq!(delta_between(&counter, &mut clock, 50, 980), 70);
}

#[test]
fn test_periodic_increasing_wraps_at_period() {
    let counter = counter_for(CounterKind::PeriodicIncreasing, 1_000);
    let mut clock = application_clock(&counter, CounterKind::PeriodicIncreasing, 1_000, 1, 0);

    assert_eq!(delta_between(&counter, &mut clock, 980, 50), 70);
}

#[test]
fn test_custom_timer_follows_declared_direction() {
    let counter = SimulatedCounter::periodic(CountDirection::Decreasing, 1_000, 1_000_000);
    let mut clock = TimestampClockBuilder::new(counter.clone())
        .port(trc_common::HardwarePort::ApplicationDefined)
        .timer(trc_common::TimerConfig {
            kind: Some(CounterKind::CustomTimer),
            direction: Some(CountDirection::Decreasing),
            ..Default::default()
        })
        .irq_priority_order(1)
        .build()
        .unwrap();

    // Period comes from the counter
    assert_eq!(clock.descriptor().period(), 1_000);
    assert_eq!(delta_between(&counter, &mut clock, 50, 980), 70);
}

#[test]
fn test_divisor_and_extension() {
    let counter = counter_for(CounterKind::FreeRunningIncreasing, 0);
    let mut clock = application_clock(&counter, CounterKind::FreeRunningIncreasing, 0, 4, 0);
    counter.set_raw(0);
    clock.start().unwrap();

    counter.set_raw(100);
    let first = clock.timestamp_event(EventWidth::Narrow).unwrap();
    assert_eq!(first.timestamp.delta, 25);
    assert!(first.split.extension.is_none());

    counter.set_raw(1_300);
    let second = clock.timestamp_event(EventWidth::Narrow).unwrap();
    assert_eq!(second.timestamp.delta, 300);
    assert_eq!(second.split.extension.map(|xts| xts.kind), Some(XtsKind::Xts8));
    assert_eq!(second.timestamp.cumulative, 325);
}

#[test]
fn test_extension_does_not_change_cumulative() {
    let deltas = [10_u64, 300, 70_000, 5];

    let mut totals = Vec::new();
    for width in [EventWidth::Narrow, EventWidth::Wide] {
        let counter = counter_for(CounterKind::FreeRunningIncreasing, 0);
        let mut clock = application_clock(&counter, CounterKind::FreeRunningIncreasing, 0, 1, 0);
        counter.set_raw(0);
        clock.start().unwrap();

        let mut last = 0;
        for delta in deltas {
            counter.advance(delta);
            last = clock.timestamp_event(width).unwrap().timestamp.cumulative;
        }
        totals.push(last);
    }

    assert_eq!(totals, [70_315, 70_315]);
}

#[test]
fn test_extension_boundaries_are_exact() {
    assert!(!needs_extension(255, EventWidth::Narrow));
    assert!(needs_extension(256, EventWidth::Narrow));
    assert!(!needs_extension(65_535, EventWidth::Wide));
    assert!(needs_extension(65_536, EventWidth::Wide));

    assert!(split_delta(255, EventWidth::Narrow).extension.is_none());
    assert!(split_delta(256, EventWidth::Narrow).extension.is_some());
    assert!(split_delta(65_535, EventWidth::Wide).extension.is_none());
    assert!(split_delta(65_536, EventWidth::Wide).extension.is_some());
}

#[test]
fn test_priority_example() {
    assert_eq!(
        compare_priority(2, 5, IrqPriorityOrder::LowerIsMoreUrgent),
        Urgency::FirstMoreUrgent
    );
    assert_eq!(
        compare_priority(2, 5, IrqPriorityOrder::HigherIsMoreUrgent),
        Urgency::SecondMoreUrgent
    );
}

#[test]
fn test_invalid_priority_order_rejected() {
    let counter = counter_for(CounterKind::FreeRunningIncreasing, 0);
    let result = TimestampClockBuilder::new(counter)
        .kind(CounterKind::FreeRunningIncreasing)
        .irq_priority_order(2)
        .build();
    assert_eq!(result.unwrap_err(), TraceError::InvalidPriorityOrder(2));
}
