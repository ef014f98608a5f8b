//! Timestamp delta statistics.
//!
//! Tracks stored-tick deltas in a ring buffer so the divisor can be tuned:
//! most deltas should stay below the 16-bit inline ceiling to avoid
//! frequent extension (XTS) events.

use serde::Serialize;

/// Per-session timestamp statistics.
#[derive(Debug)]
pub struct TimestampStats {
    /// Ring buffer of stored-tick deltas.
    samples: Box<[u64]>,
    /// Current write position in the ring buffer.
    write_pos: usize,
    /// Number of samples collected (saturates at buffer size).
    sample_count: usize,
    /// Total events timestamped.
    total_events: u64,
    min_delta: u64,
    max_delta: u64,
    /// Sum of all deltas for mean calculation; wide enough for any session.
    sum_delta: u128,
    /// Events that needed an extension event first.
    extended_events: u64,
    /// Deltas covering more than half the counter modulus.
    near_wrap_events: u64,
}

impl TimestampStats {
    /// Create a new collector retaining `histogram_size` recent deltas.
    #[must_use]
    pub fn new(histogram_size: usize) -> Self {
        let size = histogram_size.max(1);
        Self {
            samples: vec![0u64; size].into_boxed_slice(),
            write_pos: 0,
            sample_count: 0,
            total_events: 0,
            min_delta: u64::MAX,
            max_delta: 0,
            sum_delta: 0,
            extended_events: 0,
            near_wrap_events: 0,
        }
    }

    /// Record one timestamped event.
    ///
    /// Allocation-free; safe to call from the tracing path.
    pub fn record(&mut self, stored_ticks: u64, extended: bool, near_wrap: bool) {
        self.samples[self.write_pos] = stored_ticks;
        self.write_pos = (self.write_pos + 1) % self.samples.len();
        self.sample_count = self.sample_count.saturating_add(1).min(self.samples.len());

        self.total_events += 1;
        self.min_delta = self.min_delta.min(stored_ticks);
        self.max_delta = self.max_delta.max(stored_ticks);
        self.sum_delta += u128::from(stored_ticks);

        if extended {
            self.extended_events += 1;
        }
        if near_wrap {
            self.near_wrap_events += 1;
        }
    }

    /// Total events recorded.
    #[must_use]
    pub fn total_events(&self) -> u64 {
        self.total_events
    }

    /// Events that needed an extension event.
    #[must_use]
    pub fn extended_events(&self) -> u64 {
        self.extended_events
    }

    /// Events whose delta came close to the one-wraparound accuracy bound.
    #[must_use]
    pub fn near_wrap_events(&self) -> u64 {
        self.near_wrap_events
    }

    /// Delta at `percentile` (0.0 to 100.0) over the retained samples.
    ///
    /// Returns `None` if no samples have been collected or if percentile is out of range.
    #[must_use]
    pub fn percentile(&self, percentile: f64) -> Option<u64> {
        if self.sample_count == 0 || !(0.0..=100.0).contains(&percentile) {
            return None;
        }

        let mut sorted: Vec<u64> = self.samples[..self.sample_count].to_vec();
        sorted.sort_unstable();

        let idx = ((percentile / 100.0) * (sorted.len() - 1) as f64).round() as usize;
        Some(sorted[idx.min(sorted.len() - 1)])
    }

    /// Smallest divisor keeping the `percentile` delta at or below `ceiling`.
    ///
    /// `current_divisor` is the divisor the recorded deltas were scaled by.
    #[must_use]
    pub fn suggest_divisor(
        &self,
        current_divisor: u32,
        percentile: f64,
        ceiling: u64,
    ) -> Option<u32> {
        let stored = self.percentile(percentile)?;
        let hw_ticks = u128::from(stored) * u128::from(current_divisor.max(1));
        let ceiling = u128::from(ceiling.max(1));
        let divisor = hw_ticks.div_ceil(ceiling).max(1);
        Some(u32::try_from(divisor).unwrap_or(u32::MAX))
    }

    /// Get a snapshot of current statistics.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        let any = self.total_events > 0;
        StatsSnapshot {
            total_events: self.total_events,
            min_delta: any.then_some(self.min_delta),
            max_delta: any.then_some(self.max_delta),
            mean_delta: any.then(|| {
                let mean = self.sum_delta / u128::from(self.total_events);
                u64::try_from(mean).unwrap_or(u64::MAX)
            }),
            extended_events: self.extended_events,
            near_wrap_events: self.near_wrap_events,
            sample_count: self.sample_count,
        }
    }

    /// Reset all statistics to initial state.
    pub fn reset(&mut self) {
        self.samples.fill(0);
        self.write_pos = 0;
        self.sample_count = 0;
        self.total_events = 0;
        self.min_delta = u64::MAX;
        self.max_delta = 0;
        self.sum_delta = 0;
        self.extended_events = 0;
        self.near_wrap_events = 0;
    }
}

/// Immutable snapshot of statistics for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Total events recorded.
    pub total_events: u64,
    /// Smallest stored delta.
    pub min_delta: Option<u64>,
    /// Largest stored delta.
    pub max_delta: Option<u64>,
    /// Mean stored delta.
    pub mean_delta: Option<u64>,
    /// Events preceded by an extension event.
    pub extended_events: u64,
    /// Events close to the wraparound accuracy bound.
    pub near_wrap_events: u64,
    /// Number of samples in the histogram.
    pub sample_count: usize,
}

impl StatsSnapshot {
    /// Fraction of events that needed an extension event.
    #[must_use]
    pub fn extension_ratio(&self) -> f64 {
        if self.total_events == 0 {
            0.0
        } else {
            self.extended_events as f64 / self.total_events as f64
        }
    }
}
