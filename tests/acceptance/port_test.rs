//! Hardware port preset acceptance tests.
//!
//! # Acceptance Criteria
//!
//! - Presets supply kind, divisor and priority order
//! - Explicit configuration overrides a preset
//! - Incomplete or inconsistent configuration prevents session start
//! - The frequency override is only accepted before start

use super::common::counter_for;
use std::io::Write;
use std::time::Duration;
use trc_common::{
    CountDirection, CounterKind, HardwarePort, IrqPriorityOrder, SessionState, TraceConfig,
    TraceError,
};
use trc_timestamp::{SimulatedCounter, TimestampClock, TimestampClockBuilder};

#[test]
fn test_presets_resolve_against_counter() {
    let cases = [
        (
            HardwarePort::Win32,
            CounterKind::FreeRunningIncreasing,
            1,
            IrqPriorityOrder::HigherIsMoreUrgent,
        ),
        (
            HardwarePort::ArmCortexM,
            CounterKind::FreeRunningIncreasing,
            4,
            IrqPriorityOrder::LowerIsMoreUrgent,
        ),
        (
            HardwarePort::ArmCortexMSysTick,
            CounterKind::PeriodicDecreasing,
            4,
            IrqPriorityOrder::LowerIsMoreUrgent,
        ),
        (
            HardwarePort::RenesasRx600,
            CounterKind::PeriodicDecreasing,
            1,
            IrqPriorityOrder::HigherIsMoreUrgent,
        ),
        (
            HardwarePort::XilinxMicroblaze,
            CounterKind::PeriodicDecreasing,
            16,
            IrqPriorityOrder::LowerIsMoreUrgent,
        ),
        (
            HardwarePort::Zephyr,
            CounterKind::FreeRunningIncreasing,
            4,
            IrqPriorityOrder::LowerIsMoreUrgent,
        ),
        (
            HardwarePort::PowerPcZ4,
            CounterKind::PeriodicDecreasing,
            1,
            IrqPriorityOrder::HigherIsMoreUrgent,
        ),
    ];

    for (port, kind, divisor, order) in cases {
        let config = TraceConfig {
            port,
            ..TraceConfig::default()
        };
        let counter = counter_for(kind, 10_000);
        let clock = TimestampClock::from_config(&config, counter)
            .unwrap_or_else(|e| panic!("{port}: {e}"));

        assert_eq!(clock.descriptor().kind(), kind, "{port}");
        assert_eq!(clock.descriptor().divisor(), divisor, "{port}");
        assert_eq!(clock.irq_order(), order, "{port}");
        if !kind.is_free_running() {
            assert_eq!(clock.descriptor().period(), 10_000, "{port}");
        }
    }
}

#[test]
fn test_preset_frequency_wins_over_counter() {
    let config = TraceConfig {
        port: HardwarePort::XmosXcoreAi,
        ..TraceConfig::default()
    };
    let counter = SimulatedCounter::free_running(CountDirection::Increasing, 32, 1_000);
    let clock = TimestampClock::from_config(&config, counter).unwrap();

    assert_eq!(clock.frequency_hz(), 100_000_000);
    assert_eq!(clock.resolution_hz(), 25_000_000);
}

#[test]
fn test_hw_independent_requires_priority_order() {
    let config = TraceConfig {
        port: HardwarePort::HwIndependent,
        ..TraceConfig::default()
    };
    let counter = counter_for(CounterKind::FreeRunningIncreasing, 0);

    let err = TimestampClock::from_config(&config, counter).unwrap_err();
    assert_eq!(err, TraceError::MissingSetting("irq.priority_order"));
}

#[test]
fn test_hw_independent_advances_with_os_ticks() {
    // Kernel tick count at 1 kHz
    let ticks = SimulatedCounter::free_running(CountDirection::Increasing, 32, 1_000);
    let mut clock = TimestampClockBuilder::new(ticks.clone())
        .port(HardwarePort::HwIndependent)
        .irq_priority_order(0)
        .build()
        .unwrap();
    assert_eq!(clock.descriptor().kind(), CounterKind::FreeRunningIncreasing);
    assert_eq!(clock.frequency_hz(), 1_000);
    clock.start().unwrap();

    let cumulative: Vec<u64> = (0..5)
        .map(|_| {
            ticks.advance(1_000);
            clock.timestamp().unwrap().cumulative
        })
        .collect();
    assert_eq!(cumulative, [1_000, 2_000, 3_000, 4_000, 5_000]);
    assert_eq!(clock.ticks_to_duration(5_000), Duration::from_secs(5));
}

#[test]
fn test_inconsistent_timer_prevents_start() {
    let config = TraceConfig::from_toml(
        r#"
        port = "application_defined"

        [timer]
        kind = "free_running_increasing"
        period = 1000

        [irq]
        priority_order = 0
        "#,
    )
    .unwrap();
    let counter = counter_for(CounterKind::FreeRunningIncreasing, 0);

    assert!(matches!(
        TimestampClock::from_config(&config, counter),
        Err(TraceError::PeriodMismatch { period: 1000, .. })
    ));
}

#[test]
fn test_config_file_with_frequency_override() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        port = "arm_cortex_m"

        [timer]
        frequency_hz = 48000000
        "#
    )
    .unwrap();

    let config = TraceConfig::from_file(file.path()).unwrap();
    let counter = counter_for(CounterKind::FreeRunningIncreasing, 0);
    let mut clock = TimestampClock::from_config(&config, counter).unwrap();
    assert_eq!(clock.ticks_to_duration(12), Duration::from_micros(1));

    // Doubling the clock halves the duration of each stored tick
    clock.set_frequency(96_000_000).unwrap();
    assert_eq!(clock.ticks_to_duration(24), Duration::from_micros(1));

    clock.start().unwrap();
    assert_eq!(
        clock.set_frequency(48_000_000),
        Err(TraceError::FrequencyLocked {
            state: SessionState::Running.to_string()
        })
    );
    assert_eq!(clock.frequency_hz(), 96_000_000);
}
