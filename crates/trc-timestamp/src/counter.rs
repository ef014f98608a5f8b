//! Hardware counter capability.
//!
//! A port implements [`HardwareCounter`] over its timer registers. On the
//! host, [`SimulatedCounter`] stands in for the hardware and can be shared
//! between a task thread and simulated interrupt handlers.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use trc_common::kind::CountDirection;

use crate::descriptor::Modulus;

/// Capability interface of a timestamp counter.
pub trait HardwareCounter {
    /// Read the current raw count.
    ///
    /// Called with the critical section held; must not block.
    fn read_raw(&self) -> u64;

    /// Ticks until the counter wraps, or 0 for a free-running counter.
    fn period(&self) -> u64 {
        0
    }

    /// Counter clock rate in Hz as reported by the hardware.
    fn frequency_hz(&self) -> u32;
}

impl<C: HardwareCounter + ?Sized> HardwareCounter for &C {
    fn read_raw(&self) -> u64 {
        (**self).read_raw()
    }

    fn period(&self) -> u64 {
        (**self).period()
    }

    fn frequency_hz(&self) -> u32 {
        (**self).frequency_hz()
    }
}

impl<C: HardwareCounter + ?Sized> HardwareCounter for Arc<C> {
    fn read_raw(&self) -> u64 {
        (**self).read_raw()
    }

    fn period(&self) -> u64 {
        (**self).period()
    }

    fn frequency_hz(&self) -> u32 {
        (**self).frequency_hz()
    }
}

#[derive(Debug)]
struct CounterRegisters {
    raw: AtomicU64,
    direction: CountDirection,
    modulus: Modulus,
    frequency_hz: AtomicU32,
    reads: AtomicU64,
    resets: AtomicU64,
}

/// Thread-safe software counter.
///
/// Clones share the same registers, so a test can advance the counter
/// while a [`TimestampClock`](crate::clock::TimestampClock) reads it.
#[derive(Debug, Clone)]
pub struct SimulatedCounter {
    regs: Arc<CounterRegisters>,
}

impl SimulatedCounter {
    /// Free-running counter `width_bits` wide (clamped to 1..=64), starting at 0.
    #[must_use]
    pub fn free_running(direction: CountDirection, width_bits: u8, frequency_hz: u32) -> Self {
        Self::with_modulus(direction, Modulus::from_width(width_bits), frequency_hz)
    }

    /// Periodic counter reloading every `period` ticks, starting at 0.
    #[must_use]
    pub fn periodic(direction: CountDirection, period: u64, frequency_hz: u32) -> Self {
        Self::with_modulus(direction, Modulus::Period(period.max(1)), frequency_hz)
    }

    fn with_modulus(direction: CountDirection, modulus: Modulus, frequency_hz: u32) -> Self {
        Self {
            regs: Arc::new(CounterRegisters {
                raw: AtomicU64::new(0),
                direction,
                modulus,
                frequency_hz: AtomicU32::new(frequency_hz),
                reads: AtomicU64::new(0),
                resets: AtomicU64::new(0),
            }),
        }
    }

    /// Current raw value without counting a read.
    #[must_use]
    pub fn raw(&self) -> u64 {
        self.regs.raw.load(Ordering::Acquire)
    }

    /// Overwrite the raw value.
    ///
    /// The value is stored as given so tests can inject out-of-range readings.
    pub fn set_raw(&self, raw: u64) {
        self.regs.raw.store(raw, Ordering::Release);
    }

    /// Let `ticks` hardware ticks elapse, wrapping at the modulus.
    pub fn advance(&self, ticks: u64) {
        let modulus = self.regs.modulus;
        let decreasing = self.direction() == CountDirection::Decreasing;
        // Closure never returns None
        let _ = self
            .regs
            .raw
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                Some(step(modulus, modulus.reduce(raw), ticks, decreasing))
            });
    }

    /// Reset the count to 0, as a port init hook would.
    pub fn reset(&self) {
        self.regs.raw.store(0, Ordering::Release);
        self.regs.resets.fetch_add(1, Ordering::AcqRel);
    }

    /// Change the reported clock rate.
    pub fn set_frequency_hz(&self, frequency_hz: u32) {
        self.regs.frequency_hz.store(frequency_hz, Ordering::Release);
    }

    /// Counting direction.
    #[must_use]
    pub fn direction(&self) -> CountDirection {
        self.regs.direction
    }

    /// Number of [`HardwareCounter::read_raw`] calls so far.
    #[must_use]
    pub fn read_count(&self) -> u64 {
        self.regs.reads.load(Ordering::Acquire)
    }

    /// Number of [`SimulatedCounter::reset`] calls so far.
    #[must_use]
    pub fn reset_count(&self) -> u64 {
        self.regs.resets.load(Ordering::Acquire)
    }
}

fn step(modulus: Modulus, raw: u64, ticks: u64, decreasing: bool) -> u64 {
    match modulus {
        Modulus::PowerOfTwo { mask } => {
            if decreasing {
                raw.wrapping_sub(ticks) & mask
            } else {
                raw.wrapping_add(ticks) & mask
            }
        }
        Modulus::Period(period) => {
            let period = u128::from(period);
            let ticks = u128::from(ticks) % period;
            let raw = u128::from(raw);
            let next = if decreasing {
                (raw + period - ticks) % period
            } else {
                (raw + ticks) % period
            };
            // `next < period <= u64::MAX`
            u64::try_from(next).unwrap_or(0)
        }
    }
}

impl HardwareCounter for SimulatedCounter {
    fn read_raw(&self) -> u64 {
        self.regs.reads.fetch_add(1, Ordering::AcqRel);
        self.raw()
    }

    fn period(&self) -> u64 {
        match self.regs.modulus {
            Modulus::PowerOfTwo { .. } => 0,
            Modulus::Period(period) => period,
        }
    }

    fn frequency_hz(&self) -> u32 {
        self.regs.frequency_hz.load(Ordering::Acquire)
    }
}
