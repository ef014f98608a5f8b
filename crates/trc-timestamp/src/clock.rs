//! Timestamp clock for one recorder session.
//!
//! The clock owns the hardware counter, the validated descriptor and the
//! per-session [`TimestampState`]. Lifecycle calls (`set_frequency`,
//! `start`, `stop`) take `&mut self` and happen before or after tracing;
//! [`TimestampClock::timestamp`] takes `&self` and may be called from task
//! and interrupt context concurrently.

use crate::counter::HardwareCounter;
use crate::critical::CriticalSectionGuard;
use crate::descriptor::TimerDescriptor;
use crate::extension::{split_delta, DeltaSplit, EventWidth};
use crate::irq::{compare_priority, Urgency};
use crate::normalize::{Normalizer, Timestamp, TimestampState};
use critical_section::Mutex;
use std::cell::Cell;
use std::time::Duration;
use tracing::{debug, info, trace};
use trc_common::config::{TimerConfig, TraceConfig};
use trc_common::error::{TraceError, TraceResult};
use trc_common::kind::{CounterKind, IrqPriorityOrder};
use trc_common::port::HardwarePort;
use trc_common::state::SessionState;
use trc_common::time;

/// One-time port initialization, run when the session starts.
pub type InitHook<C> = Box<dyn FnOnce(&C) + Send + Sync>;

/// A timestamped event ready for the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StampedEvent {
    /// Delta and cumulative ticks.
    pub timestamp: Timestamp,
    /// Inline bits and optional XTS event for the event's width.
    pub split: DeltaSplit,
    /// Delta covered more than half the counter modulus.
    pub near_wrap: bool,
}

/// Hardware timestamp source for a recorder session.
pub struct TimestampClock<C: HardwareCounter> {
    counter: C,
    descriptor: TimerDescriptor,
    irq_order: IrqPriorityOrder,
    normalizer: Normalizer,
    session: SessionState,
    state: Mutex<Cell<TimestampState>>,
    init_hook: Option<InitHook<C>>,
}

impl<C: HardwareCounter> TimestampClock<C> {
    /// Create a clock over a validated descriptor.
    pub fn new(descriptor: TimerDescriptor, irq_order: IrqPriorityOrder, counter: C) -> Self {
        debug!(
            kind = %descriptor.kind(),
            period = descriptor.period(),
            divisor = descriptor.divisor(),
            frequency_hz = descriptor.frequency_hz(),
            "Timestamp clock configured"
        );
        Self {
            counter,
            normalizer: Normalizer::new(&descriptor),
            descriptor,
            irq_order,
            session: SessionState::Configured,
            state: Mutex::new(Cell::new(TimestampState::default())),
            init_hook: None,
        }
    }

    /// Create a clock from configuration, resolving unset timer fields
    /// from the port preset and then from the counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the timer or IRQ priority configuration is
    /// missing or inconsistent.
    pub fn from_config(config: &TraceConfig, counter: C) -> TraceResult<Self> {
        let descriptor = TimerDescriptor::resolve(&config.effective_timer(), &counter)?;
        let irq_order = config.irq_priority_order()?;
        Ok(Self::new(descriptor, irq_order, counter))
    }

    /// Register the one-time initialization hook, replacing any earlier one.
    pub fn set_init_hook(&mut self, hook: impl FnOnce(&C) + Send + Sync + 'static) {
        self.init_hook = Some(Box::new(hook));
    }

    /// Override the counter frequency before the session starts.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::FrequencyLocked`] once the session has started,
    /// or [`TraceError::InvalidFrequency`] for 0 Hz.
    pub fn set_frequency(&mut self, frequency_hz: u32) -> TraceResult<()> {
        if !self.session.is_configurable() {
            return Err(TraceError::FrequencyLocked {
                state: self.session.to_string(),
            });
        }
        let previous = self.descriptor.frequency_hz();
        self.descriptor.override_frequency(frequency_hz)?;
        info!(previous, frequency_hz, "Timestamp frequency overridden");
        Ok(())
    }

    /// Start the session.
    ///
    /// Runs the init hook (at most once per clock), then anchors the
    /// timestamp state at the counter's current reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is not in the configured state.
    pub fn start(&mut self) -> TraceResult<()> {
        self.session.transition_to(SessionState::Running)?;

        if let Some(hook) = self.init_hook.take() {
            debug!("Running timestamp init hook");
            hook(&self.counter);
        }

        let anchored = {
            let guard = CriticalSectionGuard::enter();
            let fresh = self.normalizer.reset(self.counter.read_raw());
            self.state.borrow(guard.token()).set(fresh);
            fresh
        };

        info!(
            kind = %self.descriptor.kind(),
            resolution_hz = self.resolution_hz(),
            start_raw = anchored.last_raw,
            "Timestamp session started"
        );
        Ok(())
    }

    /// Stop the session. A stopped clock cannot be restarted.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is already stopped.
    pub fn stop(&mut self) -> TraceResult<()> {
        self.session.transition_to(SessionState::Stopped)?;
        info!(
            cumulative_ticks = self.cumulative_ticks(),
            "Timestamp session stopped"
        );
        Ok(())
    }

    /// Timestamp one event.
    ///
    /// Reads the counter and updates the session state inside the critical
    /// section; calls are serialized, so the cumulative value never
    /// decreases across task and interrupt contexts.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::SessionNotRunning`] outside a running session.
    pub fn timestamp(&self) -> TraceResult<Timestamp> {
        if !self.session.is_running() {
            return Err(TraceError::SessionNotRunning {
                state: self.session.to_string(),
            });
        }

        let stamp = {
            let guard = CriticalSectionGuard::enter();
            let cell = self.state.borrow(guard.token());
            let mut state = cell.get();
            let stamp = self.normalizer.advance(&mut state, self.counter.read_raw());
            cell.set(state);
            stamp
        };

        trace!(
            delta = stamp.delta,
            cumulative = stamp.cumulative,
            "Event timestamped"
        );
        Ok(stamp)
    }

    /// Timestamp one event of the given inline width and split its delta.
    ///
    /// # Errors
    ///
    /// See [`TimestampClock::timestamp`].
    pub fn timestamp_event(&self, width: EventWidth) -> TraceResult<StampedEvent> {
        let timestamp = self.timestamp()?;
        Ok(StampedEvent {
            timestamp,
            split: split_delta(timestamp.delta, width),
            near_wrap: self.normalizer.is_near_wrap(&timestamp),
        })
    }

    /// Stored ticks since session start.
    pub fn cumulative_ticks(&self) -> u64 {
        critical_section::with(|cs| self.state.borrow(cs).get().cumulative_ticks)
    }

    /// Compare two raw ISR priorities under the configured order.
    pub fn compare_priority(&self, a: u32, b: u32) -> Urgency {
        compare_priority(a, b, self.irq_order)
    }

    /// Configured IRQ priority order.
    pub fn irq_order(&self) -> IrqPriorityOrder {
        self.irq_order
    }

    /// Effective counter frequency in Hz.
    pub fn frequency_hz(&self) -> u32 {
        self.descriptor.frequency_hz()
    }

    /// Stored ticks per second.
    pub fn resolution_hz(&self) -> u32 {
        time::resolution_hz(self.descriptor.frequency_hz(), self.descriptor.divisor())
    }

    /// Wall-clock span of `stored_ticks` at the current frequency.
    pub fn ticks_to_duration(&self, stored_ticks: u64) -> Duration {
        time::ticks_to_duration(
            stored_ticks,
            self.descriptor.frequency_hz(),
            self.descriptor.divisor(),
        )
    }

    /// Timer descriptor in effect.
    pub fn descriptor(&self) -> &TimerDescriptor {
        &self.descriptor
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.session
    }

    /// Underlying counter.
    pub fn counter(&self) -> &C {
        &self.counter
    }
}

impl<C: HardwareCounter> std::fmt::Debug for TimestampClock<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimestampClock")
            .field("descriptor", &self.descriptor)
            .field("irq_order", &self.irq_order)
            .field("session", &self.session)
            .field("init_hook", &self.init_hook.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for configuring a timestamp clock.
pub struct TimestampClockBuilder<C: HardwareCounter> {
    counter: C,
    config: TraceConfig,
    init_hook: Option<InitHook<C>>,
}

impl<C: HardwareCounter> TimestampClockBuilder<C> {
    /// Create a new builder over the given counter.
    pub fn new(counter: C) -> Self {
        Self {
            counter,
            config: TraceConfig::default(),
            init_hook: None,
        }
    }

    /// Select the hardware port preset.
    pub fn port(mut self, port: HardwarePort) -> Self {
        self.config.port = port;
        self
    }

    /// Replace the timer configuration.
    pub fn timer(mut self, timer: TimerConfig) -> Self {
        self.config.timer = timer;
        self
    }

    /// Set the counter kind.
    pub fn kind(mut self, kind: CounterKind) -> Self {
        self.config.timer.kind = Some(kind);
        self
    }

    /// Set the divisor.
    pub fn divisor(mut self, divisor: u32) -> Self {
        self.config.timer.divisor = Some(divisor);
        self
    }

    /// Set the counter frequency instead of reading it from the counter.
    pub fn frequency_hz(mut self, frequency_hz: u32) -> Self {
        self.config.timer.frequency_hz = Some(frequency_hz);
        self
    }

    /// Set the raw IRQ priority order (0 or 1).
    pub fn irq_priority_order(mut self, order: u8) -> Self {
        self.config.irq.priority_order = Some(order);
        self
    }

    /// Register the one-time initialization hook.
    pub fn on_start(mut self, hook: impl FnOnce(&C) + Send + Sync + 'static) -> Self {
        self.init_hook = Some(Box::new(hook));
        self
    }

    /// Build the clock.
    ///
    /// # Errors
    ///
    /// See [`TimestampClock::from_config`].
    pub fn build(self) -> TraceResult<TimestampClock<C>> {
        let mut clock = TimestampClock::from_config(&self.config, self.counter)?;
        clock.init_hook = self.init_hook;
        Ok(clock)
    }
}
