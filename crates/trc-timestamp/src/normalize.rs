//! Timestamp normalization.
//!
//! Turns consecutive raw counter readings into stored tick deltas and a
//! running 64-bit total. The normalizer itself is stateless; the mutable
//! [`TimestampState`] is owned by the session and only touched inside the
//! critical section.

use crate::descriptor::{TimerDescriptor, WrapArithmetic};
use serde::Serialize;

/// Per-session timestamp state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimestampState {
    /// Raw count at the previous timestamp, reduced into range.
    pub last_raw: u64,
    /// Sum of all stored deltas since session start.
    pub cumulative_ticks: u64,
}

/// Result of timestamping one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timestamp {
    /// Hardware ticks since the previous event, before the divisor.
    pub raw_ticks: u64,
    /// Stored ticks since the previous event (`raw_ticks / divisor`).
    pub delta: u64,
    /// Stored ticks since session start.
    pub cumulative: u64,
}

/// Hardware ticks elapsed between two raw readings of the described counter.
///
/// Exactly one wraparound is absorbed; see [`WrapArithmetic::elapsed`].
#[must_use]
pub fn compute_delta(previous_raw: u64, current_raw: u64, descriptor: &TimerDescriptor) -> u64 {
    descriptor
        .wrap_arithmetic()
        .elapsed(previous_raw, current_raw)
}

/// Apply the divisor. The remainder is discarded, not carried.
#[must_use]
pub fn scale_ticks(ticks: u64, divisor: u32) -> u64 {
    ticks / u64::from(divisor.max(1))
}

/// Delta and cumulative computation for one session.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    arithmetic: WrapArithmetic,
    divisor: u32,
}

impl Normalizer {
    /// Build a normalizer for a validated descriptor.
    #[must_use]
    pub fn new(descriptor: &TimerDescriptor) -> Self {
        Self {
            arithmetic: descriptor.wrap_arithmetic(),
            divisor: descriptor.divisor(),
        }
    }

    /// Fresh state anchored at the counter's current reading.
    #[must_use]
    pub fn reset(&self, raw: u64) -> TimestampState {
        TimestampState {
            last_raw: self.arithmetic.reduce(raw),
            cumulative_ticks: 0,
        }
    }

    /// Advance `state` to the reading `raw`.
    pub fn advance(&self, state: &mut TimestampState, raw: u64) -> Timestamp {
        let current = self.arithmetic.reduce(raw);
        let raw_ticks = self.arithmetic.elapsed(state.last_raw, current);
        let delta = scale_ticks(raw_ticks, self.divisor);

        state.last_raw = current;
        state.cumulative_ticks = state.cumulative_ticks.saturating_add(delta);

        Timestamp {
            raw_ticks,
            delta,
            cumulative: state.cumulative_ticks,
        }
    }

    /// True if the delta is close to the one-wraparound accuracy bound.
    #[must_use]
    pub fn is_near_wrap(&self, timestamp: &Timestamp) -> bool {
        self.arithmetic.is_near_wrap(timestamp.raw_ticks)
    }

    /// Wraparound arithmetic in use.
    #[must_use]
    pub fn arithmetic(&self) -> WrapArithmetic {
        self.arithmetic
    }
}
