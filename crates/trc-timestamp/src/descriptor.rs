//! Timer descriptors and counter classification.
//!
//! A [`TimerDescriptor`] is the validated, immutable description of the
//! timestamp counter for one recorder session. Classifying it yields the
//! [`WrapArithmetic`] used for every delta, fixed once at construction.

use crate::counter::HardwareCounter;
use serde::Serialize;
use trc_common::config::{TimerConfig, DEFAULT_WIDTH_BITS};
use trc_common::error::{TraceError, TraceResult};
use trc_common::kind::{CountDirection, CounterKind};

/// Validated timestamp counter description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerDescriptor {
    kind: CounterKind,
    direction: CountDirection,
    width_bits: u8,
    period: u64,
    divisor: u32,
    frequency_hz: u32,
}

impl TimerDescriptor {
    /// Describe a counter whose kind implies its direction.
    ///
    /// `period` must be 0 for free-running kinds and non-zero otherwise.
    /// Free-running counters default to 32 bits; see [`Self::with_width`].
    ///
    /// # Errors
    ///
    /// Returns an error for [`CounterKind::CustomTimer`] (use [`Self::custom`]),
    /// or if any setting violates the kind's constraints.
    pub fn new(
        kind: CounterKind,
        period: u64,
        divisor: u32,
        frequency_hz: u32,
    ) -> TraceResult<Self> {
        let direction = kind
            .inherent_direction()
            .ok_or(TraceError::MissingSetting("timer.direction"))?;
        Self::validated(kind, direction, DEFAULT_WIDTH_BITS, period, divisor, frequency_hz)
    }

    /// Describe a custom timer independent of the OS tick.
    ///
    /// # Errors
    ///
    /// Returns an error if `period` is 0, `divisor` is 0 or `frequency_hz` is 0.
    pub fn custom(
        direction: CountDirection,
        period: u64,
        divisor: u32,
        frequency_hz: u32,
    ) -> TraceResult<Self> {
        Self::validated(
            CounterKind::CustomTimer,
            direction,
            DEFAULT_WIDTH_BITS,
            period,
            divisor,
            frequency_hz,
        )
    }

    /// Set the native width of a free-running counter.
    ///
    /// # Errors
    ///
    /// Returns an error if `width_bits` is outside 1..=64, or if the kind
    /// wraps at its period instead.
    pub fn with_width(mut self, width_bits: u8) -> TraceResult<Self> {
        self.check_width_applies(width_bits)?;
        self.width_bits = width_bits;
        self.validate()?;
        Ok(self)
    }

    /// Resolve a descriptor from configuration, reading anything left
    /// unset from the hardware counter.
    ///
    /// `timer` is expected to already carry the port preset
    /// (see [`TimerConfig::merged_with`]). Periodic kinds without a
    /// configured period take [`HardwareCounter::period`]; a missing
    /// frequency is taken from [`HardwareCounter::frequency_hz`]; a
    /// missing divisor is 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind is unset, a custom timer has no
    /// direction, a configured direction contradicts the kind, a width is
    /// configured for a periodic kind, or the resolved values are invalid.
    pub fn resolve<C>(timer: &TimerConfig, counter: &C) -> TraceResult<Self>
    where
        C: HardwareCounter + ?Sized,
    {
        let kind = timer.kind.ok_or(TraceError::MissingSetting("timer.kind"))?;

        let direction = match (kind.inherent_direction(), timer.direction) {
            (Some(inherent), Some(configured)) if inherent != configured => {
                return Err(TraceError::DirectionMismatch {
                    kind: kind.to_string(),
                    direction: configured.to_string(),
                });
            }
            (Some(inherent), _) => inherent,
            (None, Some(configured)) => configured,
            (None, None) => return Err(TraceError::MissingSetting("timer.direction")),
        };

        if let Some(width_bits) = timer.width_bits {
            if !kind.is_free_running() {
                return Err(TraceError::WidthMismatch {
                    kind: kind.to_string(),
                    width: width_bits,
                });
            }
        }

        let period = match timer.period {
            Some(period) => period,
            None if kind.is_free_running() => 0,
            None => counter.period(),
        };

        Self::validated(
            kind,
            direction,
            timer.width_bits.unwrap_or(DEFAULT_WIDTH_BITS),
            period,
            timer.divisor.unwrap_or(1),
            timer
                .frequency_hz
                .unwrap_or_else(|| counter.frequency_hz()),
        )
    }

    fn validated(
        kind: CounterKind,
        direction: CountDirection,
        width_bits: u8,
        period: u64,
        divisor: u32,
        frequency_hz: u32,
    ) -> TraceResult<Self> {
        let descriptor = Self {
            kind,
            direction,
            width_bits,
            period,
            divisor,
            frequency_hz,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    fn check_width_applies(&self, width_bits: u8) -> TraceResult<()> {
        if self.kind.is_free_running() {
            Ok(())
        } else {
            Err(TraceError::WidthMismatch {
                kind: self.kind.to_string(),
                width: width_bits,
            })
        }
    }

    fn validate(&self) -> TraceResult<()> {
        if self.divisor < 1 {
            return Err(TraceError::InvalidDivisor(self.divisor));
        }
        if self.frequency_hz == 0 {
            return Err(TraceError::InvalidFrequency);
        }
        if !(1..=64).contains(&self.width_bits) {
            return Err(TraceError::InvalidWidth(self.width_bits));
        }
        let period_ok = if self.kind.is_free_running() {
            self.period == 0
        } else {
            self.period > 0
        };
        if !period_ok {
            return Err(TraceError::PeriodMismatch {
                kind: self.kind.to_string(),
                period: self.period,
            });
        }
        Ok(())
    }

    /// Counter kind.
    #[must_use]
    pub fn kind(&self) -> CounterKind {
        self.kind
    }

    /// Counting direction.
    #[must_use]
    pub fn direction(&self) -> CountDirection {
        self.direction
    }

    /// Native width of free-running counters.
    #[must_use]
    pub fn width_bits(&self) -> u8 {
        self.width_bits
    }

    /// Ticks until wraparound; 0 for free-running kinds.
    #[must_use]
    pub fn period(&self) -> u64 {
        self.period
    }

    /// Prescaler applied before storage.
    #[must_use]
    pub fn divisor(&self) -> u32 {
        self.divisor
    }

    /// Counter clock rate in Hz.
    #[must_use]
    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    pub(crate) fn override_frequency(&mut self, frequency_hz: u32) -> TraceResult<()> {
        if frequency_hz == 0 {
            return Err(TraceError::InvalidFrequency);
        }
        self.frequency_hz = frequency_hz;
        Ok(())
    }

    /// Classify the counter into its wraparound arithmetic.
    #[must_use]
    pub fn wrap_arithmetic(&self) -> WrapArithmetic {
        let modulus = if self.kind.is_free_running() {
            Modulus::from_width(self.width_bits)
        } else {
            Modulus::Period(self.period)
        };
        WrapArithmetic {
            direction: self.direction,
            modulus,
        }
    }
}

/// Value range of a counter before it wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Modulus {
    /// `2^width`, represented by its bit mask.
    PowerOfTwo {
        /// `2^width - 1`.
        mask: u64,
    },
    /// Explicit period.
    Period(u64),
}

impl Modulus {
    /// Modulus of a free-running counter `width_bits` wide (clamped to 1..=64).
    #[must_use]
    pub fn from_width(width_bits: u8) -> Self {
        let width = width_bits.clamp(1, 64);
        let mask = if width == 64 {
            u64::MAX
        } else {
            (1u64 << width) - 1
        };
        Self::PowerOfTwo { mask }
    }

    /// Bring a raw reading into `0..modulus`.
    #[must_use]
    pub fn reduce(&self, raw: u64) -> u64 {
        match *self {
            Self::PowerOfTwo { mask } => raw & mask,
            Self::Period(period) => raw % period.max(1),
        }
    }

    /// Largest delta that is still below half the modulus.
    #[must_use]
    pub fn half(&self) -> u64 {
        match *self {
            Self::PowerOfTwo { mask } => mask >> 1,
            Self::Period(period) => period / 2,
        }
    }
}

/// Wraparound arithmetic for one counter classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WrapArithmetic {
    direction: CountDirection,
    modulus: Modulus,
}

impl WrapArithmetic {
    /// Counting direction.
    #[must_use]
    pub fn direction(&self) -> CountDirection {
        self.direction
    }

    /// Counter modulus.
    #[must_use]
    pub fn modulus(&self) -> Modulus {
        self.modulus
    }

    /// Bring a raw reading into range.
    #[must_use]
    pub fn reduce(&self, raw: u64) -> u64 {
        self.modulus.reduce(raw)
    }

    /// Ticks elapsed from `previous` to `current`, absorbing one wraparound.
    ///
    /// More than one wraparound between the two readings cannot be detected;
    /// the result is then short by a multiple of the modulus.
    #[must_use]
    pub fn elapsed(&self, previous: u64, current: u64) -> u64 {
        let previous = self.reduce(previous);
        let current = self.reduce(current);
        let (from, to) = match self.direction {
            CountDirection::Increasing => (previous, current),
            CountDirection::Decreasing => (current, previous),
        };
        match self.modulus {
            Modulus::PowerOfTwo { mask } => to.wrapping_sub(from) & mask,
            Modulus::Period(period) => {
                if to >= from {
                    to - from
                } else {
                    // Both operands are reduced below `period`
                    period - from + to
                }
            }
        }
    }

    /// True if `raw_ticks` covers more than half the modulus.
    ///
    /// Such deltas leave little margin before a second, undetectable
    /// wraparound.
    #[must_use]
    pub fn is_near_wrap(&self, raw_ticks: u64) -> bool {
        raw_ticks > self.modulus.half()
    }
}
