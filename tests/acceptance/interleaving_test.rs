//! Task/ISR interleaving acceptance tests.
//!
//! A task thread timestamps events while scoped threads play nested
//! interrupt handlers of different priorities.
//!
//! # Acceptance Criteria
//!
//! - Cumulative ticks never decrease in program order of any context
//! - No ticks are lost or double-counted across contexts
//! - Timestamps keep working after a wraparound of a periodic counter

use super::common::{application_clock, counter_for};
use crossbeam_utils::thread;
use trc_common::{CounterKind, IrqPriorityOrder};
use trc_timestamp::{sort_most_urgent_first, with_critical_section, EventWidth};

#[derive(Debug, Clone, Copy)]
struct IsrRecord {
    priority: u32,
    cumulative: u64,
}

#[test]
fn test_nested_isrs_keep_time_monotonic() {
    const TASK_EVENTS: u64 = 3_000;
    const ISR_EVENTS: u64 = 1_000;

    let counter = counter_for(CounterKind::PeriodicDecreasing, 48_000);
    let mut clock = application_clock(&counter, CounterKind::PeriodicDecreasing, 48_000, 1, 0);
    clock.start().unwrap();

    let (task_seen, isr_records) = thread::scope(|s| {
        let isrs: Vec<_> = [5_u32, 2]
            .into_iter()
            .map(|priority| {
                let (clock, counter) = (&clock, &counter);
                s.spawn(move |_| {
                    let mut records = Vec::new();
                    for _ in 0..ISR_EVENTS {
                        counter.advance(11);
                        let stamp = clock.timestamp_event(EventWidth::Narrow).unwrap();
                        records.push(IsrRecord {
                            priority,
                            cumulative: stamp.timestamp.cumulative,
                        });
                    }
                    records
                })
            })
            .collect();

        let mut task_seen = Vec::new();
        for _ in 0..TASK_EVENTS {
            counter.advance(29);
            task_seen.push(clock.timestamp().unwrap().cumulative);
        }

        let records: Vec<IsrRecord> = isrs
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();
        (task_seen, records)
    })
    .unwrap();

    assert!(task_seen.windows(2).all(|pair| pair[0] <= pair[1]));
    for priority in [5, 2] {
        let seen: Vec<u64> = isr_records
            .iter()
            .filter(|record| record.priority == priority)
            .map(|record| record.cumulative)
            .collect();
        assert!(seen.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    // The run wraps the 48_000-tick period twice; no gap between
    // consecutive events comes close to a full period
    let expected = TASK_EVENTS * 29 + 2 * ISR_EVENTS * 11;
    assert!(expected > 48_000);
    assert_eq!(clock.cumulative_ticks(), expected);

    let mut annotated = isr_records;
    sort_most_urgent_first(&mut annotated, IrqPriorityOrder::LowerIsMoreUrgent, |r| r.priority);
    assert_eq!(annotated.first().map(|r| r.priority), Some(2));
    assert_eq!(annotated.last().map(|r| r.priority), Some(5));
}

#[test]
fn test_guard_nests_inside_application_critical_section() {
    let counter = counter_for(CounterKind::FreeRunningIncreasing, 0);
    let mut clock = application_clock(&counter, CounterKind::FreeRunningIncreasing, 0, 1, 0);
    clock.start().unwrap();
    counter.advance(64);

    // An application already holding the section may still timestamp
    let stamp = with_critical_section(|_| clock.timestamp().unwrap());
    assert_eq!(stamp.delta, 64);
    assert_eq!(stamp.cumulative, 64);
}
