//! Tick-to-wall-clock conversion helpers.
//!
//! Stored ticks are hardware ticks divided by the divisor, so one stored
//! tick lasts `divisor / frequency_hz` seconds.

use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Effective timestamp resolution in Hz (`frequency_hz / divisor`).
#[must_use]
pub fn resolution_hz(frequency_hz: u32, divisor: u32) -> u32 {
    frequency_hz / divisor.max(1)
}

/// Convert stored ticks to a wall-clock duration.
///
/// Saturates at `Duration::MAX`. A zero frequency yields `Duration::ZERO`;
/// validated timer descriptors never carry one.
#[must_use]
pub fn ticks_to_duration(stored_ticks: u64, frequency_hz: u32, divisor: u32) -> Duration {
    if frequency_hz == 0 {
        return Duration::ZERO;
    }
    let hw_ticks = u128::from(stored_ticks) * u128::from(divisor.max(1));
    let nanos = hw_ticks * NANOS_PER_SEC / u128::from(frequency_hz);
    let secs = nanos / NANOS_PER_SEC;
    if secs > u128::from(u64::MAX) {
        return Duration::MAX;
    }
    Duration::new(secs as u64, (nanos % NANOS_PER_SEC) as u32)
}
