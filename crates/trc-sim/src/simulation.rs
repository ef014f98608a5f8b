//! Simulated recorder session.
//!
//! A task thread and a simulated interrupt thread timestamp events against
//! one shared [`SimulatedCounter`], advancing it by the configured tick
//! steps. ISR events preempt the task at the configured rate.

use crate::report::{IsrSummary, SimulationReport};
use anyhow::{anyhow, Context, Result};
use crossbeam_utils::thread;
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, info, warn};
use trc_common::config::{TraceConfig, DEFAULT_WIDTH_BITS};
use trc_common::kind::CounterKind;
use trc_common::stats::TimestampStats;
use trc_timestamp::{
    sort_most_urgent_first, EventWidth, HardwareCounter, SimulatedCounter, StampedEvent,
    TimestampClock,
};

/// Ticks an ISR lets elapse before timestamping its event.
const ISR_ENTRY_TICKS: u64 = 40;

/// Retained deltas for percentile estimates.
const HISTOGRAM_SIZE: usize = 4_096;

/// Build a simulated counter matching the effective timer configuration.
///
/// # Errors
///
/// Returns an error if the configuration names no counter kind.
pub fn counter_for(config: &TraceConfig) -> Result<SimulatedCounter> {
    let timer = config.effective_timer();
    let kind = timer
        .kind
        .ok_or_else(|| anyhow!("port {} defines no timer kind; set timer.kind", config.port))?;
    let direction = kind
        .inherent_direction()
        .or(timer.direction)
        .unwrap_or_default();
    let frequency_hz = timer
        .frequency_hz
        .unwrap_or(config.simulation.counter_frequency_hz);

    let counter = match kind {
        CounterKind::FreeRunningIncreasing | CounterKind::FreeRunningDecreasing => {
            let width = timer.width_bits.unwrap_or(DEFAULT_WIDTH_BITS);
            SimulatedCounter::free_running(direction, width, frequency_hz)
        }
        CounterKind::PeriodicIncreasing
        | CounterKind::PeriodicDecreasing
        | CounterKind::CustomTimer => {
            let period = timer.period.unwrap_or(config.simulation.counter_period);
            SimulatedCounter::periodic(direction, period, frequency_hz)
        }
    };

    debug!(
        %kind,
        %direction,
        period = counter.period(),
        frequency_hz,
        "Simulated counter created"
    );
    Ok(counter)
}

/// Shared per-run bookkeeping.
struct Recorder {
    stats: TimestampStats,
    isr_events: Vec<u32>,
    near_wrap_warned: bool,
}

impl Recorder {
    fn record(&mut self, event: &StampedEvent) {
        self.stats.record(
            event.timestamp.delta,
            event.split.extension.is_some(),
            event.near_wrap,
        );
        if event.near_wrap && !self.near_wrap_warned {
            self.near_wrap_warned = true;
            warn!(
                raw_ticks = event.timestamp.raw_ticks,
                "Delta exceeds half the counter range; events may be too sparse to detect wraparound"
            );
        }
    }
}

/// Run a simulated session and collect a report.
///
/// # Errors
///
/// Returns an error if the session cannot be started or a timestamp fails.
pub fn run(
    mut clock: TimestampClock<SimulatedCounter>,
    config: &TraceConfig,
    width: EventWidth,
) -> Result<SimulationReport> {
    let sim = &config.simulation;
    let steps: &[u64] = if sim.tick_steps.is_empty() {
        &[1]
    } else {
        &sim.tick_steps
    };
    let isr_count = if sim.isr_every == 0 || sim.isr_priorities.is_empty() {
        0
    } else {
        sim.events / sim.isr_every
    };

    clock.start().context("Failed to start timestamp session")?;
    info!(
        events = sim.events,
        isr_events = isr_count,
        %width,
        "Simulation started"
    );

    let recorder = Mutex::new(Recorder {
        stats: TimestampStats::new(HISTOGRAM_SIZE),
        isr_events: Vec::new(),
        near_wrap_warned: false,
    });
    let counter = clock.counter().clone();
    let started = Instant::now();

    thread::scope(|s| -> Result<()> {
        let isr = s.spawn(|_| -> Result<()> {
            for n in 0..isr_count {
                let priority = sim.isr_priorities[(n as usize) % sim.isr_priorities.len()];
                counter.advance(ISR_ENTRY_TICKS);
                let event = clock.timestamp_event(width)?;
                let mut recorder = lock(&recorder)?;
                recorder.record(&event);
                recorder.isr_events.push(priority);
                drop(recorder);
                std::thread::yield_now();
            }
            Ok(())
        });

        for n in 0..sim.events {
            counter.advance(steps[(n as usize) % steps.len()]);
            let event = clock.timestamp_event(width)?;
            lock(&recorder)?.record(&event);
            if !sim.pace.is_zero() {
                std::thread::sleep(sim.pace);
            }
        }

        isr.join()
            .map_err(|_| anyhow!("simulated ISR thread panicked"))?
    })
    .map_err(|_| anyhow!("simulation thread panicked"))??;

    let wall_time = started.elapsed();
    let cumulative = clock.cumulative_ticks();
    clock.stop().context("Failed to stop timestamp session")?;

    let recorder = recorder
        .into_inner()
        .map_err(|_| anyhow!("recorder lock poisoned"))?;
    let isr_summary = summarize_isrs(&recorder.isr_events, &clock);

    info!(
        events = recorder.stats.total_events(),
        extended = recorder.stats.extended_events(),
        near_wrap = recorder.stats.near_wrap_events(),
        ?wall_time,
        "Simulation finished"
    );

    Ok(SimulationReport::new(
        config.port,
        &clock,
        width,
        &recorder.stats,
        cumulative,
        isr_summary,
        wall_time,
    ))
}

fn lock(recorder: &Mutex<Recorder>) -> Result<std::sync::MutexGuard<'_, Recorder>> {
    recorder
        .lock()
        .map_err(|_| anyhow!("recorder lock poisoned"))
}

/// Count ISR events per priority, most urgent first.
fn summarize_isrs(
    priorities: &[u32],
    clock: &TimestampClock<SimulatedCounter>,
) -> Vec<IsrSummary> {
    let mut summary: Vec<IsrSummary> = Vec::new();
    for &priority in priorities {
        match summary.iter_mut().find(|s| s.priority == priority) {
            Some(entry) => entry.events += 1,
            None => summary.push(IsrSummary {
                priority,
                events: 1,
            }),
        }
    }
    sort_most_urgent_first(&mut summary, clock.irq_order(), |s| s.priority);
    summary
}
