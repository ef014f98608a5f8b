//! Simulation report rendering.

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use trc_common::port::HardwarePort;
use trc_common::stats::{StatsSnapshot, TimestampStats};
use trc_timestamp::{EventWidth, SimulatedCounter, TimestampClock};

/// Percentile used for the divisor suggestion.
const DIVISOR_PERCENTILE: f64 = 99.0;

/// ISR events seen at one raw priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IsrSummary {
    /// Raw ISR priority.
    pub priority: u32,
    /// Events recorded at this priority.
    pub events: u64,
}

/// Outcome of a simulated session.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// Hardware port preset.
    pub port: String,
    /// Counter kind.
    pub kind: String,
    /// Divisor in effect.
    pub divisor: u32,
    /// Counter frequency in Hz.
    pub frequency_hz: u32,
    /// Stored ticks per second.
    pub resolution_hz: u32,
    /// Inline delta width.
    pub event_width: String,
    /// Delta statistics.
    pub stats: StatsSnapshot,
    /// 99th percentile stored delta.
    pub p99_delta: Option<u64>,
    /// Divisor that would keep the 99th percentile delta inline.
    pub suggested_divisor: Option<u32>,
    /// Stored ticks since session start.
    pub cumulative_ticks: u64,
    /// Traced time represented by `cumulative_ticks`.
    pub traced_time: String,
    /// Host time spent running the simulation.
    pub wall_time: String,
    /// ISR events per priority, most urgent first.
    pub isr_by_urgency: Vec<IsrSummary>,
}

impl SimulationReport {
    /// Assemble a report from a finished session.
    pub fn new(
        port: HardwarePort,
        clock: &TimestampClock<SimulatedCounter>,
        width: EventWidth,
        stats: &TimestampStats,
        cumulative_ticks: u64,
        isr_by_urgency: Vec<IsrSummary>,
        wall_time: Duration,
    ) -> Self {
        let divisor = clock.descriptor().divisor();
        Self {
            port: port.to_string(),
            kind: clock.descriptor().kind().to_string(),
            divisor,
            frequency_hz: clock.frequency_hz(),
            resolution_hz: clock.resolution_hz(),
            event_width: width.to_string(),
            stats: stats.snapshot(),
            p99_delta: stats.percentile(DIVISOR_PERCENTILE),
            suggested_divisor: stats.suggest_divisor(divisor, DIVISOR_PERCENTILE, width.ceiling()),
            cumulative_ticks,
            traced_time: humantime::format_duration(clock.ticks_to_duration(cumulative_ticks))
                .to_string(),
            wall_time: humantime::format_duration(wall_time).to_string(),
            isr_by_urgency,
        }
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Port:            {}", self.port)?;
        writeln!(f, "Counter:         {}", self.kind)?;
        writeln!(
            f,
            "Resolution:      {} Hz ({} Hz / {})",
            self.resolution_hz, self.frequency_hz, self.divisor
        )?;
        writeln!(f, "Event width:     {}", self.event_width)?;
        writeln!(f, "Events:          {}", self.stats.total_events)?;
        writeln!(
            f,
            "Extended (XTS):  {} ({:.1}%)",
            self.stats.extended_events,
            self.stats.extension_ratio() * 100.0
        )?;
        writeln!(f, "Near wrap:       {}", self.stats.near_wrap_events)?;
        if let (Some(min), Some(mean), Some(max)) =
            (self.stats.min_delta, self.stats.mean_delta, self.stats.max_delta)
        {
            writeln!(f, "Delta min/avg/max: {min}/{mean}/{max} ticks")?;
        }
        if let Some(p99) = self.p99_delta {
            writeln!(f, "Delta p99:       {p99} ticks")?;
        }
        if let Some(suggested) = self.suggested_divisor {
            if suggested != self.divisor {
                writeln!(f, "Suggested divisor: {suggested}")?;
            }
        }
        writeln!(
            f,
            "Traced time:     {} ({} ticks)",
            self.traced_time, self.cumulative_ticks
        )?;
        writeln!(f, "Wall time:       {}", self.wall_time)?;
        for isr in &self.isr_by_urgency {
            writeln!(f, "ISR priority {:>3}: {} events", isr.priority, isr.events)?;
        }
        Ok(())
    }
}
